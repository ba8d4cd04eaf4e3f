//! LR(1) items and item sets.

use crate::{
    grammar::{Grammar, NonterminalID, ProductionID, SymbolID, TerminalID, TerminalSet},
    types::Map,
    util::display_fn,
};
use std::{collections::BTreeMap, fmt};

// LR(1) item
// X: Y1 Y2 ... Yn という構文規則があったとき、それにマーカ位置を付与したもの
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LRItemCore {
    pub production: ProductionID,
    pub marker: usize,
}

impl LRItemCore {
    pub const fn new(production: ProductionID) -> Self {
        Self {
            production,
            marker: 0,
        }
    }

    /// Return the symbol right after the marker, or `None` at the reduce position.
    pub fn next_symbol(&self, g: &Grammar) -> Option<SymbolID> {
        g.production(self.production).right().get(self.marker).copied()
    }

    pub fn is_reducible(&self, g: &Grammar) -> bool {
        self.marker >= g.production(self.production).right().len()
    }

    pub fn advance(self) -> Self {
        Self {
            marker: self.marker + 1,
            ..self
        }
    }

    // `(E -> E . + T)`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            let production = g.production(self.production);
            write!(f, "({} ->", g.nonterminal_name(production.left()))?;
            for (i, symbol) in production.right().iter().enumerate() {
                if i == self.marker {
                    f.write_str(" .")?;
                }
                write!(f, " {}", g.symbol_name(*symbol))?;
            }
            if self.marker >= production.right().len() {
                f.write_str(" .")?;
            }
            f.write_str(")")
        })
    }
}

//  - key: core item
//  - value: 紐付けられた先読み記号
pub type LRItemSet = BTreeMap<LRItemCore, TerminalSet>;

/// Merge an item into `items`, unioning the lookaheads of an item with the same core.
///
/// Returns whether `items` has changed.
pub fn merge_item(items: &mut LRItemSet, core: LRItemCore, lookaheads: &TerminalSet) -> bool {
    match items.get_mut(&core) {
        Some(slot) => slot.union_with(lookaheads),
        None => {
            items.insert(core, lookaheads.clone());
            true
        }
    }
}

/// クロージャ展開
pub fn closure(g: &Grammar, items: &mut LRItemSet) {
    let first_sets = g.first_sets();
    let mut changed = true;
    while changed {
        changed = false;

        let mut added: Map<LRItemCore, TerminalSet> = Map::default();
        for (core, lookaheads) in &*items {
            let right = g.production(core.production).right();

            // [X -> ... @ Y beta]
            //  Y: one nonterminal symbol
            let (y_symbol, beta) = match &right[core.marker.min(right.len())..] {
                [SymbolID::N(y_symbol), beta @ ..] => (*y_symbol, beta),
                _ => continue,
            };

            // First(beta) に加え、beta が空になりうる場合はこの item の先読み記号を引き継ぐ
            let x = first_sets.get(beta, lookaheads);
            for &production in g.alternatives(y_symbol) {
                added
                    .entry(LRItemCore::new(production))
                    .or_default()
                    .union_with(&x);
            }
        }

        for (core, lookaheads) in added {
            changed |= merge_item(items, core, &lookaheads);
        }
    }
}

/// A closed set of LR(1) items, identified by the code given at construction.
#[derive(Debug, Clone)]
pub struct State {
    code: usize,
    items: LRItemSet,
}

impl State {
    /// Build the initial state from the alternatives of `start`, looking ahead the end of input.
    pub fn initial(g: &Grammar, start: NonterminalID) -> Self {
        let eoi: TerminalSet = Some(TerminalID::EOI).into_iter().collect();
        let mut items = LRItemSet::new();
        for &production in g.alternatives(start) {
            merge_item(&mut items, LRItemCore::new(production), &eoi);
        }
        closure(g, &mut items);
        Self { code: 0, items }
    }

    /// Compute the successor state on `symbol`, or `None` if no item can advance over it.
    pub fn goto(&self, g: &Grammar, symbol: SymbolID, code: usize) -> Option<Self> {
        let mut items = LRItemSet::new();
        for (core, lookaheads) in &self.items {
            if core.next_symbol(g) == Some(symbol) {
                merge_item(&mut items, core.advance(), lookaheads);
            }
        }
        if items.is_empty() {
            return None;
        }
        closure(g, &mut items);
        Some(Self { code, items })
    }

    pub fn code(&self) -> usize {
        self.code
    }

    pub fn items(&self) -> &LRItemSet {
        &self.items
    }

    pub fn cores(&self) -> impl Iterator<Item = LRItemCore> + '_ {
        self.items.keys().copied()
    }

    /// Return whether both states have the same items, ignoring lookaheads.
    pub fn core_eq(&self, other: &Self) -> bool {
        self.items.len() == other.items.len() && self.cores().eq(other.cores())
    }

    /// Return whether both states have the same items with the same lookaheads.
    pub fn lookahead_eq(&self, other: &Self) -> bool {
        self.items == other.items
    }

    /// Return the symbols that have an outgoing transition, in item order.
    pub fn edges(&self, g: &Grammar) -> Vec<SymbolID> {
        let mut edges = vec![];
        for core in self.items.keys() {
            if let Some(symbol) = core.next_symbol(g) {
                if !edges.contains(&symbol) {
                    edges.push(symbol);
                }
            }
        }
        edges
    }

    /// Return the items at the reduce position.
    pub fn reducible<'a>(
        &'a self,
        g: &'a Grammar,
    ) -> impl Iterator<Item = (LRItemCore, &'a TerminalSet)> + 'a {
        self.items
            .iter()
            .filter(move |(core, _)| core.is_reducible(g))
            .map(|(core, lookaheads)| (*core, lookaheads))
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for (core, lookaheads) in &self.items {
                writeln!(f, "- {}  {}", core.display(g), lookaheads.display(g))?;
            }
            Ok(())
        })
    }
}
