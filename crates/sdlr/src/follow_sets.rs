//! Calculation of follow set function.

use crate::{
    first_sets::FirstSets,
    grammar::{Grammar, NonterminalID, SymbolID, TerminalID, TerminalSet},
    types::{Map, Set},
};

#[derive(Debug)]
pub struct FollowSets {
    map: Map<NonterminalID, TerminalSet>,
}

impl FollowSets {
    /// Return `FOLLOW(symbol)`.
    pub fn follow(&self, symbol: NonterminalID) -> &TerminalSet {
        &self.map[&symbol]
    }

    pub fn iter(&self) -> impl Iterator<Item = (NonterminalID, &TerminalSet)> + '_ {
        self.map.iter().map(|(id, set)| (*id, set))
    }
}

/// Calculate the follow sets of all nonterminal symbols.
///
/// This is the non-caching variant of [`Grammar::follow_sets`].
pub fn compute(g: &Grammar, first_sets: &FirstSets) -> FollowSets {
    let mut map: Map<NonterminalID, TerminalSet> = g
        .nonterminals()
        .map(|(id, _)| (id, TerminalSet::default()))
        .collect();
    if let Some(start) = g.start_symbol() {
        map[&start].insert(TerminalID::EOI);
    }

    // FOLLOW(key) flows into FOLLOW(value)
    let mut inherits: Map<NonterminalID, Set<NonterminalID>> = Map::default();

    for production in g.productions() {
        let right = production.right();

        // X -> ... Y beta  =>  FOLLOW(Y) \supseteq FIRST(beta)
        for (i, symbol) in right.iter().enumerate() {
            if let SymbolID::N(n) = symbol {
                let (first, _) = first_sets.first_of(&right[i + 1..]);
                map[n].union_with(&first);
            }
        }

        // X -> ... Y beta  (beta =>* ε)  =>  FOLLOW(Y) \supseteq FOLLOW(X)
        for symbol in right.iter().rev() {
            let SymbolID::N(n) = symbol else {
                break;
            };
            if *n != production.left() {
                inherits.entry(production.left()).or_default().insert(*n);
            }
            if !first_sets.is_nullable(*n) {
                break;
            }
        }
    }

    let bases = map.clone();
    for (source, base) in &bases {
        let mut met = Set::default();
        met.insert(*source);
        let mut stack = vec![*source];
        while let Some(current) = stack.pop() {
            let Some(dependents) = inherits.get(&current) else {
                continue;
            };
            for dependent in dependents {
                if met.insert(*dependent) {
                    map[dependent].union_with(base);
                    stack.push(*dependent);
                }
            }
        }
    }

    tracing::debug!(symbols = map.len(), "computed follow sets");
    FollowSets { map }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn follow_names(g: &Grammar, name: &str) -> Vec<String> {
        let Some(SymbolID::N(n)) = g.symbol(name) else {
            panic!("not a nonterminal: {}", name);
        };
        g.follow_sets()
            .follow(n)
            .iter()
            .map(|t| g.terminal_name(t).to_owned())
            .collect()
    }

    #[test]
    fn expression_grammar() {
        let g = Grammar::define(|g| {
            g.rule("E", ["T", "E'"]);
            g.rule("E'", ["+", "T", "E'"]);
            g.rule("E'", [""]);
            g.rule("T", ["F", "T'"]);
            g.rule("T'", ["*", "F", "T'"]);
            g.rule("T'", [""]);
            g.rule("F", ["(", "E", ")"]);
            g.rule("F", ["id"]);
        })
        .unwrap();
        assert_eq!(follow_names(&g, "E"), ["$", ")"]);
        assert_eq!(follow_names(&g, "E'"), ["$", ")"]);
        assert_eq!(follow_names(&g, "T"), ["$", "+", ")"]);
        assert_eq!(follow_names(&g, "T'"), ["$", "+", ")"]);
        assert_eq!(follow_names(&g, "F"), ["$", "+", "*", ")"]);
    }

    #[test]
    fn first_of_whole_suffix() {
        // FOLLOW(A) sees `c` past the nullable B.
        let g = Grammar::define(|g| {
            g.rule("S", ["A", "B", "c"]);
            g.rule("A", ["a"]);
            g.rule("B", ["b"]);
            g.rule("B", [""]);
        })
        .unwrap();
        assert_eq!(follow_names(&g, "A"), ["c", "b"]);
        assert_eq!(follow_names(&g, "S"), ["$"]);
    }

    #[test]
    fn transitive_inheritance() {
        let g = Grammar::define(|g| {
            g.rule("S", ["A", "x"]);
            g.rule("A", ["B"]);
            g.rule("B", ["C"]);
            g.rule("C", ["c"]);
        })
        .unwrap();
        assert_eq!(follow_names(&g, "C"), ["x"]);
        assert_eq!(follow_names(&g, "S"), ["$"]);
    }
}
