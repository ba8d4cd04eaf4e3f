//! Calculation of the nullable nonterminal symbols.

use crate::{
    grammar::{Grammar, NonterminalID, SymbolID},
    types::{Map, Set},
};

/// Calculate the set of nonterminals that derive the empty sequence.
///
/// This is the non-caching variant of [`Grammar::nullables`].
pub fn compute(g: &Grammar) -> Set<NonterminalID> {
    let mut solver = Solver {
        g,
        status: Map::default(),
        parked: Set::default(),
        waiting: Map::default(),
        stack: vec![],
    };
    for (root, _) in g.nonterminals() {
        if !solver.status.contains_key(&root) {
            solver.run(root);
        }
    }

    let nullables: Set<NonterminalID> = g
        .nonterminals()
        .map(|(id, _)| id)
        .filter(|id| solver.status.get(id) == Some(&Status::Nullable))
        .collect();
    tracing::debug!(nullables = nullables.len(), "computed nullable symbols");
    nullables
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum Status {
    /// The frame of this symbol is still on the stack.
    Visiting,
    /// Every alternative has been tried, but some of them wait for another symbol.
    Pending,
    Nullable,
    NonNullable,
}

/// The position in an alternative of `nt`.
///
/// A resumed cursor is a copy woken up after the symbol it waited on
/// turned out to be nullable, and only walks its own alternative.
#[derive(Debug, Copy, Clone)]
struct Cursor {
    nt: NonterminalID,
    alt: usize,
    sym: usize,
    resumed: bool,
}

impl Cursor {
    fn new(nt: NonterminalID) -> Self {
        Self {
            nt,
            alt: 0,
            sym: 0,
            resumed: false,
        }
    }
}

struct Solver<'g> {
    g: &'g Grammar,
    status: Map<NonterminalID, Status>,
    parked: Set<NonterminalID>,
    waiting: Map<NonterminalID, Vec<Cursor>>,
    stack: Vec<Cursor>,
}

impl Solver<'_> {
    fn run(&mut self, root: NonterminalID) {
        let g = self.g;
        self.status.insert(root, Status::Visiting);
        self.stack.push(Cursor::new(root));

        while let Some(&cursor) = self.stack.last() {
            if self.status.get(&cursor.nt) == Some(&Status::Nullable) {
                self.stack.pop();
                continue;
            }

            let alternatives = g.alternatives(cursor.nt);
            let Some(&production) = alternatives.get(cursor.alt) else {
                self.stack.pop();
                let status = if self.parked.contains(&cursor.nt) {
                    Status::Pending
                } else {
                    Status::NonNullable
                };
                self.status.insert(cursor.nt, status);
                continue;
            };

            match g.production(production).right().get(cursor.sym) {
                None => {
                    self.stack.pop();
                    self.status.insert(cursor.nt, Status::Nullable);
                    self.wake(cursor.nt);
                }
                Some(SymbolID::T(..)) => self.abandon(),
                Some(SymbolID::N(n)) => match self.status.get(n).copied() {
                    None => {
                        self.status.insert(*n, Status::Visiting);
                        self.stack.push(Cursor::new(*n));
                    }
                    Some(Status::Nullable) => {
                        if let Some(top) = self.stack.last_mut() {
                            top.sym += 1;
                        }
                    }
                    Some(Status::NonNullable) => self.abandon(),
                    Some(Status::Visiting | Status::Pending) => {
                        self.waiting.entry(*n).or_default().push(cursor);
                        self.parked.insert(cursor.nt);
                        self.abandon();
                    }
                },
            }
        }

        // Nothing left can wake the remaining waiters.
        for status in self.status.values_mut() {
            if *status == Status::Pending {
                *status = Status::NonNullable;
            }
        }
        self.waiting.clear();
        self.parked.clear();
    }

    /// Give up the alternative under the top cursor.
    fn abandon(&mut self) {
        match self.stack.last_mut() {
            Some(top) if !top.resumed => {
                top.alt += 1;
                top.sym = 0;
            }
            _ => {
                self.stack.pop();
            }
        }
    }

    fn wake(&mut self, nt: NonterminalID) {
        for cursor in self.waiting.swap_remove(&nt).unwrap_or_default() {
            if self.status.get(&cursor.nt) == Some(&Status::Nullable) {
                continue;
            }
            self.stack.push(Cursor {
                sym: cursor.sym + 1,
                resumed: true,
                ..cursor
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nullable_names(g: &Grammar) -> Vec<&str> {
        compute(g)
            .into_iter()
            .map(|n| g.nonterminal_name(n))
            .collect()
    }

    #[test]
    fn direct_and_indirect() {
        let g = Grammar::define(|g| {
            g.rule("S", ["A", "B", "c"]);
            g.rule("A", [""]);
            g.rule("A", ["a"]);
            g.rule("B", ["A", "A"]);
            g.rule("C", ["c"]);
        })
        .unwrap();
        assert_eq!(nullable_names(&g), ["A", "B"]);
    }

    #[test]
    fn mutual_recursion_through_epsilon() {
        // A and B refer to each other before the epsilon alternative of C is found.
        let g = Grammar::define(|g| {
            g.rule("A", ["B", "x"]);
            g.rule("A", ["B"]);
            g.rule("B", ["A"]);
            g.rule("B", ["C"]);
            g.rule("C", ["c"]);
            g.rule("C", [""]);
        })
        .unwrap();
        assert_eq!(nullable_names(&g), ["A", "B", "C"]);
    }

    #[test]
    fn left_recursion_without_base_is_not_nullable() {
        let g = Grammar::define(|g| {
            g.rule("A", ["A", "B"]);
            g.rule("B", ["A"]);
            g.rule("B", ["b"]);
        })
        .unwrap();
        assert!(nullable_names(&g).is_empty());
    }

    #[test]
    fn waiter_wakes_after_pending() {
        // D parks on E while E is on the stack, and is exhausted before
        // E turns out to be nullable through G.
        let g = Grammar::define(|g| {
            g.rule("S", ["E"]);
            g.rule("E", ["D", "F"]);
            g.rule("D", ["E"]);
            g.rule("D", ["d"]);
            g.rule("F", ["f"]);
            g.rule("E", ["G"]);
            g.rule("G", [""]);
        })
        .unwrap();
        assert_eq!(nullable_names(&g), ["S", "E", "D", "G"]);
    }

    #[test]
    fn cached_variant_agrees() {
        let g = Grammar::define(|g| {
            g.rule("S", ["T", "S"]);
            g.rule("S", [""]);
            g.rule("T", ["t"]);
        })
        .unwrap();
        assert_eq!(g.nullables(), &compute(&g));
        assert!(g.is_nullable(g.start_symbol().unwrap()));
    }
}
