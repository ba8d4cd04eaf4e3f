//! Parse trees.

use std::fmt;

/// A parse tree built by [`TreeBuilder`](crate::actions::TreeBuilder).
///
/// Inner nodes are labeled with the nonterminal of the reduced production,
/// and terminals become leaves holding the raw token values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tree<R> {
    Leaf(R),
    Node { symbol: String, children: Vec<Tree<R>> },
}

impl<R> Tree<R> {
    pub fn node(symbol: impl Into<String>, children: Vec<Tree<R>>) -> Self {
        Self::Node {
            symbol: symbol.into(),
            children,
        }
    }

    /// Return the nonterminal name if this is an inner node.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::Node { symbol, .. } => Some(symbol),
            Self::Leaf(..) => None,
        }
    }

    pub fn children(&self) -> &[Tree<R>] {
        match self {
            Self::Node { children, .. } => children,
            Self::Leaf(..) => &[],
        }
    }

    /// Iterate over all nodes in pre-order.
    pub fn pre_order(&self) -> PreOrder<'_, R> {
        PreOrder { stack: vec![self] }
    }

    /// Iterate over the raw values of the leaves, from left to right.
    pub fn leaves(&self) -> impl Iterator<Item = &R> + '_ {
        self.pre_order().filter_map(|node| match node {
            Self::Leaf(raw) => Some(raw),
            Self::Node { .. } => None,
        })
    }
}

impl<R: fmt::Display> fmt::Display for Tree<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(raw) => write!(f, "{}", raw),
            Self::Node { symbol, children } => {
                write!(f, "{}(", symbol)?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                f.write_str(")")
            }
        }
    }
}

#[derive(Debug)]
pub struct PreOrder<'t, R> {
    stack: Vec<&'t Tree<R>>,
}

impl<'t, R> Iterator for PreOrder<'t, R> {
    type Item = &'t Tree<R>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}
