//! Disjoint sets over dense indices.

/// A union-find structure whose elements are numbered from zero in order of addition.
#[derive(Debug, Default, Clone)]
pub struct DisjointSet {
    parents: Vec<usize>,
}

impl DisjointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element forming a class of its own.
    pub fn add_root(&mut self) -> usize {
        let id = self.parents.len();
        self.parents.push(id);
        id
    }

    /// Add an element belonging to the class of `member`.
    pub fn attach(&mut self, member: usize) -> usize {
        let root = self.find(member);
        let id = self.parents.len();
        self.parents.push(root);
        id
    }

    /// Return the representative of the class containing `x`.
    pub fn find(&self, mut x: usize) -> usize {
        while let Some(&parent) = self.parents.get(x) {
            if parent == x {
                break;
            }
            x = parent;
        }
        x
    }

    pub fn same(&self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}
