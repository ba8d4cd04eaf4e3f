//! Calculation of first set function.

use crate::{
    grammar::{Grammar, NonterminalID, SymbolID, TerminalSet},
    types::{Map, Queue, Set},
};

#[derive(Debug)]
pub struct FirstSets {
    nullables: Set<NonterminalID>,
    map: Map<NonterminalID, TerminalSet>,
}

impl FirstSets {
    /// Return `FIRST(symbol)` of a nonterminal symbol.
    pub fn first(&self, symbol: NonterminalID) -> &TerminalSet {
        &self.map[&symbol]
    }

    pub fn is_nullable(&self, symbol: NonterminalID) -> bool {
        self.nullables.contains(&symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NonterminalID, &TerminalSet)> + '_ {
        self.map.iter().map(|(id, set)| (*id, set))
    }

    /// Return `FIRST(symbols)` together with whether `symbols` can derive the empty sequence.
    pub fn first_of(&self, symbols: &[SymbolID]) -> (TerminalSet, bool) {
        let mut res = TerminalSet::default();
        for symbol in symbols {
            match symbol {
                SymbolID::T(t) => {
                    res.insert(*t);
                    return (res, false);
                }
                SymbolID::N(n) => {
                    res.union_with(self.first(*n));
                    if !self.is_nullable(*n) {
                        return (res, false);
                    }
                }
            }
        }
        (res, true)
    }

    /// `First(prefix lookaheads)`
    pub fn get(&self, prefix: &[SymbolID], lookaheads: &TerminalSet) -> TerminalSet {
        let (mut res, nullable) = self.first_of(prefix);
        if nullable {
            res.union_with(lookaheads);
        }
        res
    }
}

/// Calculate the first sets of all nonterminal symbols.
///
/// This is the non-caching variant of [`Grammar::first_sets`].
pub fn compute(g: &Grammar, nullables: &Set<NonterminalID>) -> FirstSets {
    let mut solver = Solver {
        g,
        nullables,
        map: Map::default(),
        visited: Set::default(),
        dependents: Map::default(),
    };

    // 開始記号から到達可能な記号を先に辿り、残りはその後に処理する
    let mut roots = g.reachable_nonterminals();
    roots.extend(g.nonterminals().map(|(id, _)| id));
    for root in roots {
        if !solver.visited.contains(&root) {
            solver.run(root);
        }
    }
    solver.propagate();

    let mut map = solver.map;
    map.sort_keys();
    tracing::debug!(symbols = map.len(), "computed first sets");
    FirstSets {
        nullables: nullables.clone(),
        map,
    }
}

#[derive(Debug, Copy, Clone)]
struct Frame {
    nt: NonterminalID,
    alt: usize,
    sym: usize,
}

struct Solver<'g> {
    g: &'g Grammar,
    nullables: &'g Set<NonterminalID>,
    map: Map<NonterminalID, TerminalSet>,
    visited: Set<NonterminalID>,
    // FIRST(key) flows into FIRST(value)
    dependents: Map<NonterminalID, Set<NonterminalID>>,
}

impl Solver<'_> {
    fn run(&mut self, root: NonterminalID) {
        let g = self.g;
        let mut stack = vec![self.enter(root)];

        while let Some(frame) = stack.last_mut() {
            let Some(&production) = g.alternatives(frame.nt).get(frame.alt) else {
                stack.pop();
                continue;
            };
            let nt = frame.nt;

            match g.production(production).right().get(frame.sym) {
                // The whole alternative was nullable and contributed nothing more.
                None => {
                    frame.alt += 1;
                    frame.sym = 0;
                }
                Some(SymbolID::T(t)) => {
                    self.map[&nt].insert(*t);
                    frame.alt += 1;
                    frame.sym = 0;
                }
                Some(SymbolID::N(n)) => {
                    let n = *n;
                    if n != nt {
                        self.dependents.entry(n).or_default().insert(nt);
                    }
                    if !self.visited.contains(&n) {
                        // Come back to the same symbol after `n` has been explored.
                        let child = self.enter(n);
                        stack.push(child);
                        continue;
                    }

                    if n != nt {
                        let added = self.map[&n].clone();
                        self.map[&nt].union_with(&added);
                    }
                    if self.nullables.contains(&n) {
                        frame.sym += 1;
                    } else {
                        frame.alt += 1;
                        frame.sym = 0;
                    }
                }
            }
        }
    }

    fn enter(&mut self, nt: NonterminalID) -> Frame {
        self.visited.insert(nt);
        self.map.insert(nt, TerminalSet::default());
        Frame { nt, alt: 0, sym: 0 }
    }

    /// Flow the sets of symbols finished early into the ones that depended on them
    /// while they were still being explored.
    fn propagate(&mut self) {
        let mut queue: Queue<NonterminalID> = self.map.keys().copied().collect();
        while let Some(source) = queue.pop() {
            let Some(dependents) = self.dependents.get(&source) else {
                continue;
            };
            let added = self.map[&source].clone();
            for dependent in dependents {
                if self.map[dependent].union_with(&added) {
                    queue.push(*dependent);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_names(g: &Grammar, name: &str) -> Vec<String> {
        let Some(SymbolID::N(n)) = g.symbol(name) else {
            panic!("not a nonterminal: {}", name);
        };
        g.first_sets()
            .first(n)
            .iter()
            .map(|t| g.terminal_name(t).to_owned())
            .collect()
    }

    #[test]
    fn through_nullable_prefix() {
        let g = Grammar::define(|g| {
            g.rule("S", ["A", "B", "c"]);
            g.rule("A", ["a"]);
            g.rule("A", [""]);
            g.rule("B", ["b"]);
            g.rule("B", [""]);
        })
        .unwrap();
        assert_eq!(first_names(&g, "S"), ["c", "a", "b"]);
        assert_eq!(first_names(&g, "A"), ["a"]);
    }

    #[test]
    fn left_recursion() {
        let g = Grammar::define(|g| {
            g.rule("E", ["E", "+", "T"]);
            g.rule("E", ["T"]);
            g.rule("T", ["T", "*", "F"]);
            g.rule("T", ["F"]);
            g.rule("F", ["(", "E", ")"]);
            g.rule("F", ["id"]);
        })
        .unwrap();
        for name in ["E", "T", "F"] {
            assert_eq!(first_names(&g, name), ["(", "id"], "FIRST({})", name);
        }
    }

    #[test]
    fn cycle_through_dependents() {
        // FIRST(B) depends on A while A is still on the stack.
        let g = Grammar::define(|g| {
            g.rule("A", ["B"]);
            g.rule("A", ["a"]);
            g.rule("B", ["A", "b"]);
            g.rule("B", ["C"]);
            g.rule("C", ["c"]);
        })
        .unwrap();
        assert_eq!(first_names(&g, "A"), ["a", "c"]);
        assert_eq!(first_names(&g, "B"), ["a", "c"]);
    }

    #[test]
    fn unreachable_symbols_are_included() {
        let g = Grammar::define(|g| {
            g.rule("S", ["s"]);
            g.rule("U", ["u", "S"]);
        })
        .unwrap();
        assert_eq!(first_names(&g, "U"), ["u"]);
    }

    #[test]
    fn first_of_sequence() {
        let g = Grammar::define(|g| {
            g.rule("S", ["A", "x"]);
            g.rule("A", ["a"]);
            g.rule("A", [""]);
        })
        .unwrap();
        let first = g.first_sets();
        let Some(SymbolID::N(a)) = g.symbol("A") else {
            unreachable!()
        };
        let Some(x) = g.symbol("x") else { unreachable!() };

        let (set, nullable) = first.first_of(&[SymbolID::N(a)]);
        assert!(nullable);
        assert_eq!(set.len(), 1);

        let (set, nullable) = first.first_of(&[SymbolID::N(a), x]);
        assert!(!nullable);
        assert_eq!(set.len(), 2);

        let (set, nullable) = first.first_of(&[]);
        assert!(nullable && set.is_empty());

        let eoi: TerminalSet = [crate::grammar::TerminalID::EOI].into_iter().collect();
        assert_eq!(first.get(&[SymbolID::N(a)], &eoi).len(), 2);
    }
}
