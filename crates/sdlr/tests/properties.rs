//! Exhaustive checks over all small grammars against straightforward fixed-point definitions.

use sdlr::{
    grammar::{Grammar, NonterminalID, SymbolID, TerminalID, TerminalSet},
    runtime::ActionList,
    table::LRTable,
};
use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;

const SYMBOLS: [&str; 4] = ["A", "B", "a", "b"];

/// Every right-hand side of length at most two.
fn right_sides() -> Vec<Vec<&'static str>> {
    let mut sides = vec![vec![]];
    for x in SYMBOLS {
        sides.push(vec![x]);
    }
    for x in SYMBOLS {
        for y in SYMBOLS {
            sides.push(vec![x, y]);
        }
    }
    sides
}

/// Every choice of one or two distinct right-hand sides.
fn alternatives() -> Vec<Vec<Vec<&'static str>>> {
    let sides = right_sides();
    let mut choices = vec![];
    for (i, x) in sides.iter().enumerate() {
        choices.push(vec![x.clone()]);
        for y in &sides[i + 1..] {
            choices.push(vec![x.clone(), y.clone()]);
        }
    }
    choices
}

fn small_grammars(step: usize) -> impl Iterator<Item = Grammar> {
    let choices = alternatives();
    let mut grammars = vec![];
    for (i, a) in choices.iter().enumerate() {
        for b in choices.iter().skip(i % step).step_by(step) {
            grammars.push(Grammar::from_rules([("A", a.clone()), ("B", b.clone())]).unwrap());
        }
    }
    grammars.into_iter()
}

struct Naive {
    nullable: BTreeSet<NonterminalID>,
    first: BTreeMap<NonterminalID, BTreeSet<TerminalID>>,
    follow: BTreeMap<NonterminalID, BTreeSet<TerminalID>>,
}

impl Naive {
    fn compute(g: &Grammar) -> Self {
        let mut nullable = BTreeSet::new();
        loop {
            let mut changed = false;
            for p in g.productions() {
                let all = p.right().iter().all(|s| match s {
                    SymbolID::T(..) => false,
                    SymbolID::N(n) => nullable.contains(n),
                });
                if all {
                    changed |= nullable.insert(p.left());
                }
            }
            if !changed {
                break;
            }
        }

        let mut first: BTreeMap<_, BTreeSet<_>> =
            g.nonterminals().map(|(n, _)| (n, BTreeSet::new())).collect();
        loop {
            let mut changed = false;
            for p in g.productions() {
                let (set, _) = first_of(&nullable, &first, p.right());
                for t in set {
                    changed |= first.get_mut(&p.left()).unwrap().insert(t);
                }
            }
            if !changed {
                break;
            }
        }

        let mut follow: BTreeMap<_, BTreeSet<_>> =
            g.nonterminals().map(|(n, _)| (n, BTreeSet::new())).collect();
        follow
            .get_mut(&g.start_symbol().unwrap())
            .unwrap()
            .insert(TerminalID::EOI);
        loop {
            let mut changed = false;
            for p in g.productions() {
                for (i, s) in p.right().iter().enumerate() {
                    let SymbolID::N(n) = s else { continue };
                    let (mut set, rest_nullable) = first_of(&nullable, &first, &p.right()[i + 1..]);
                    if rest_nullable {
                        set.extend(follow[&p.left()].iter().copied());
                    }
                    for t in set {
                        changed |= follow.get_mut(n).unwrap().insert(t);
                    }
                }
            }
            if !changed {
                break;
            }
        }

        Self {
            nullable,
            first,
            follow,
        }
    }
}

fn first_of(
    nullable: &BTreeSet<NonterminalID>,
    first: &BTreeMap<NonterminalID, BTreeSet<TerminalID>>,
    symbols: &[SymbolID],
) -> (BTreeSet<TerminalID>, bool) {
    let mut set = BTreeSet::new();
    for s in symbols {
        match s {
            SymbolID::T(t) => {
                set.insert(*t);
                return (set, false);
            }
            SymbolID::N(n) => {
                set.extend(first[n].iter().copied());
                if !nullable.contains(n) {
                    return (set, false);
                }
            }
        }
    }
    (set, true)
}

fn to_btree(set: &TerminalSet) -> BTreeSet<TerminalID> {
    set.iter().collect()
}

/// Whether `symbols` derives `input`, by iterating the derivability of
/// every nonterminal over every substring until nothing changes.
fn derives(g: &Grammar, input: &[TerminalID]) -> bool {
    let n = input.len();
    let mut table: BTreeSet<(NonterminalID, usize, usize)> = BTreeSet::new();

    fn seq(
        table: &BTreeSet<(NonterminalID, usize, usize)>,
        input: &[TerminalID],
        symbols: &[SymbolID],
        i: usize,
        j: usize,
    ) -> bool {
        match symbols {
            [] => i == j,
            [SymbolID::T(t), rest @ ..] => {
                i < j && input[i] == *t && seq(table, input, rest, i + 1, j)
            }
            [SymbolID::N(x), rest @ ..] => {
                (i..=j).any(|k| table.contains(&(*x, i, k)) && seq(table, input, rest, k, j))
            }
        }
    }

    loop {
        let mut changed = false;
        for p in g.productions() {
            for i in 0..=n {
                for j in i..=n {
                    if !table.contains(&(p.left(), i, j)) && seq(&table, input, p.right(), i, j) {
                        table.insert((p.left(), i, j));
                        changed = true;
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }

    g.start_symbol()
        .map_or(false, |s| table.contains(&(s, 0, n)))
}

fn sentences(max_len: usize) -> Vec<Vec<&'static str>> {
    let mut all = vec![vec![]];
    let mut last = vec![vec![]];
    for _ in 0..max_len {
        let mut next = vec![];
        for prefix in &last {
            for t in ["a", "b"] {
                let mut s: Vec<&str> = prefix.clone();
                s.push(t);
                next.push(s);
            }
        }
        all.extend(next.iter().cloned());
        last = next;
    }
    all
}

#[test]
fn sets_agree_with_naive_fixed_point() {
    let mut checked = 0;
    for g in small_grammars(7) {
        let naive = Naive::compute(&g);

        let nullable: BTreeSet<_> = g.nullables().iter().copied().collect();
        assert_eq!(nullable, naive.nullable, "nullables of\n{}", g);

        for (n, _) in g.nonterminals() {
            assert_eq!(
                to_btree(g.first_sets().first(n)),
                naive.first[&n],
                "FIRST({}) of\n{}",
                g.nonterminal_name(n),
                g
            );
            assert_eq!(
                to_btree(g.follow_sets().follow(n)),
                naive.follow[&n],
                "FOLLOW({}) of\n{}",
                g.nonterminal_name(n),
                g
            );
        }

        let start = g.start_symbol().unwrap();
        assert!(g.follow_sets().follow(start).contains(TerminalID::EOI));
        checked += 1;
    }
    assert!(checked > 7000);
}

#[test]
fn nullable_is_monotone_under_adding_empty_alternative() {
    for g in small_grammars(31) {
        let mut rules: Vec<(String, Vec<Vec<String>>)> = g
            .nonterminals()
            .map(|(n, name)| {
                let alternatives = g
                    .alternatives(n)
                    .iter()
                    .map(|p| {
                        g.production(*p)
                            .right()
                            .iter()
                            .map(|s| g.symbol_name(*s).to_owned())
                            .collect()
                    })
                    .collect();
                (name.to_owned(), alternatives)
            })
            .collect();
        let Some(b) = rules.iter_mut().find(|(name, _)| name == "B") else {
            unreachable!()
        };
        if b.1.iter().any(Vec::is_empty) {
            continue;
        }
        b.1.push(vec![]);
        let extended = Grammar::from_rules(rules).unwrap();

        for (n, name) in g.nonterminals() {
            if g.is_nullable(n) {
                let Some(SymbolID::N(m)) = extended.symbol(name) else {
                    unreachable!()
                };
                assert!(extended.is_nullable(m), "{} in\n{}", name, extended);
            }
        }
    }
}

#[test]
fn conflict_free_tables_recognize_the_language() {
    let sentences = sentences(4);
    let mut tables = 0;
    for g in small_grammars(13) {
        let Ok(table) = LRTable::generate(&g) else {
            continue;
        };
        tables += 1;

        for sentence in &sentences {
            let ids: Vec<TerminalID> = match sentence
                .iter()
                .map(|t| match g.symbol(t) {
                    Some(SymbolID::T(id)) => Some(id),
                    _ => None,
                })
                .collect::<Option<_>>()
            {
                Some(ids) => ids,
                // the sentence uses a terminal the grammar does not know
                None => continue,
            };

            let expected = derives(&g, &ids);
            let tokens = sentence.iter().map(|t| Ok::<_, Infallible>((*t, ())));
            let accepted = table
                .evaluator(ActionList::uniform(|_, _| Some(())))
                .evaluate(tokens)
                .is_ok();
            assert_eq!(
                accepted, expected,
                "sentence {:?} in\n{}\n{}",
                sentence,
                g,
                table.display()
            );
        }
    }
    assert!(tables > 0);
}
