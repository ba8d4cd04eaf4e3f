//! The LR(1) automaton with core-grouped rows.

use crate::{
    disjoint_set::DisjointSet,
    grammar::{Grammar, SymbolID},
    item::{LRItemCore, LRItemSet, State},
    types::Map,
    util::display_fn,
};
use std::{collections::VecDeque, fmt};

#[derive(Debug, thiserror::Error)]
pub enum DFAError {
    #[error("the grammar has no start symbol")]
    EmptyGrammar,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeID(u32);

impl NodeID {
    pub const START: Self = Self(0);

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S#{:03}", self.0)
    }
}

impl fmt::Display for NodeID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The number of a row in the synthesized table.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowID(u32);

impl RowID {
    pub const INITIAL: Self = Self(0);

    pub(crate) const fn new(raw: usize) -> Self {
        Self(raw as u32)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for RowID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row#{:03}", self.0)
    }
}

impl fmt::Display for RowID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug)]
pub struct DFANode {
    state: State,
    edges: Map<SymbolID, NodeID>,
}

impl DFANode {
    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn items(&self) -> &LRItemSet {
        self.state.items()
    }

    pub fn edges(&self) -> impl Iterator<Item = (SymbolID, NodeID)> + '_ {
        self.edges.iter().map(|(symbol, target)| (*symbol, *target))
    }
}

/// The automaton of LR(1) states.
///
/// States with equal cores but different lookaheads stay distinct nodes,
/// and are grouped into one row through a disjoint set.
#[derive(Debug)]
pub struct DFA {
    nodes: Map<NodeID, DFANode>,
    groups: DisjointSet,
    rows: Vec<RowID>,
    num_rows: usize,
}

impl DFA {
    pub fn generate(g: &Grammar) -> Result<Self, DFAError> {
        let _span = tracing::debug_span!("dfa").entered();
        let start = g.start_symbol().ok_or(DFAError::EmptyGrammar)?;

        let mut gen = DFAGenerator {
            g,
            nodes: Map::default(),
            same_cores: Map::default(),
            groups: DisjointSet::new(),
            pending: VecDeque::new(),
            merged: 0,
        };
        gen.classify(State::initial(g, start));
        gen.populate_nodes();
        Ok(gen.finalize())
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeID, &DFANode)> + '_ {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    pub fn node(&self, id: NodeID) -> &DFANode {
        &self.nodes[&id]
    }

    pub fn start_node(&self) -> NodeID {
        NodeID::START
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Return the row that the node is merged into.
    pub fn row_of(&self, id: NodeID) -> RowID {
        self.rows[id.index()]
    }

    /// Return the number of rows, that is, the number of core groups.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Return the disjoint set of node indices grouped by their cores.
    pub fn core_groups(&self) -> &DisjointSet {
        &self.groups
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for (i, (id, node)) in self.nodes().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                writeln!(f, "#### State {:02} (row {})", id, self.row_of(id))?;
                writeln!(f, "## items")?;
                write!(f, "{}", node.state.display(g))?;
                writeln!(f, "## edges")?;
                for (symbol, target) in node.edges() {
                    writeln!(f, "- {} => {:02}", g.symbol_name(symbol), target)?;
                }
            }
            Ok(())
        })
    }
}

// === DFAGenerator ===

#[derive(Debug)]
struct DFAGenerator<'g> {
    g: &'g Grammar,
    nodes: Map<NodeID, DFANode>,
    same_cores: Map<Vec<LRItemCore>, Vec<NodeID>>,
    groups: DisjointSet,
    pending: VecDeque<NodeID>,
    merged: usize,
}

impl DFAGenerator<'_> {
    fn populate_nodes(&mut self) {
        // 新規にノードが生成されなくなるまで繰り返す
        while let Some(id) = self.pending.pop_front() {
            let symbols = self.nodes[&id].state.edges(self.g);
            for symbol in symbols {
                // 新規ノードの番号をそのまま状態の番号として使う
                let code = self.nodes.len();
                let Some(next) = self.nodes[&id].state.goto(self.g, symbol, code) else {
                    continue;
                };
                let target = self.classify(next);
                self.nodes[&id].edges.insert(symbol, target);
                tracing::trace!(from = ?id, to = ?target, ?symbol, "edge");
            }
        }
    }

    /// Find the node for a state, allocating a new one unless an identical
    /// state already exists.
    fn classify(&mut self, state: State) -> NodeID {
        let cores: Vec<LRItemCore> = state.cores().collect();

        let class = match self.same_cores.get(&cores) {
            Some(candidates) => {
                let same = candidates
                    .iter()
                    .find(|candidate| self.nodes[*candidate].state.lookahead_eq(&state));
                if let Some(&same) = same {
                    return same;
                }
                candidates.first().copied()
            }
            None => None,
        };

        let id = NodeID(self.nodes.len() as u32);
        match class {
            Some(member) => {
                self.groups.attach(member.index());
                self.merged += 1;
            }
            None => {
                self.groups.add_root();
            }
        }
        self.nodes.insert(
            id,
            DFANode {
                state,
                edges: Map::default(),
            },
        );
        self.same_cores.entry(cores).or_default().push(id);
        self.pending.push_back(id);
        id
    }

    fn finalize(self) -> DFA {
        // 同じコアを持つノードの代表元ごとに行番号を振り直す
        let mut row_ids: Map<usize, RowID> = Map::default();
        let rows: Vec<RowID> = (0..self.nodes.len())
            .map(|index| {
                let root = self.groups.find(index);
                let next = RowID::new(row_ids.len());
                *row_ids.entry(root).or_insert(next)
            })
            .collect();

        tracing::debug!(
            nodes = self.nodes.len(),
            rows = row_ids.len(),
            merged = self.merged,
            "generated automaton"
        );

        DFA {
            nodes: self.nodes,
            groups: self.groups,
            rows,
            num_rows: row_ids.len(),
        }
    }
}
