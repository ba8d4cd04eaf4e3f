//! Context-free grammars.

use crate::{
    first_sets::{self, FirstSets},
    follow_sets::{self, FollowSets},
    nullables,
    types::{Map, Set},
    util::{display_fn, write_joined},
};
use std::{cell::OnceCell, fmt};

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerminalID(u16);
impl TerminalID {
    /// Reserved symbol used as a terminal symbol that means the end of input.
    pub const EOI: Self = Self(0);
    const OFFSET: u16 = 1;

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}
impl fmt::Debug for TerminalID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            &Self::EOI => write!(f, "T#End"),
            _ => write!(f, "T#{:03}", self.0),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonterminalID(u16);
impl NonterminalID {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}
impl fmt::Debug for NonterminalID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N#{:03}", self.0)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolID {
    T(TerminalID),
    N(NonterminalID),
}
impl fmt::Debug for SymbolID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::T(t) => write!(f, "{:?}", t),
            Self::N(n) => write!(f, "{:?}", n),
        }
    }
}

/// The production code, assigned in declaration order.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductionID(u16);
impl ProductionID {
    pub const fn code(self) -> usize {
        self.0 as usize
    }
}
impl fmt::Debug for ProductionID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P#{:03}", self.0)
    }
}

/// The set of terminal symbols, used for lookaheads, FIRST and FOLLOW.
#[derive(Debug, Default, Clone)]
pub struct TerminalSet {
    inner: bit_set::BitSet,
}
impl TerminalSet {
    pub fn contains(&self, id: TerminalID) -> bool {
        self.inner.contains(id.index())
    }
    pub fn insert(&mut self, id: TerminalID) -> bool {
        self.inner.insert(id.index())
    }
    pub fn remove(&mut self, id: TerminalID) -> bool {
        self.inner.remove(id.index())
    }
    /// Add all elements of `other`, and return whether `self` has changed.
    pub fn union_with(&mut self, other: &Self) -> bool {
        if other.inner.is_subset(&self.inner) {
            return false;
        }
        self.inner.union_with(&other.inner);
        true
    }
    pub fn is_subset(&self, other: &Self) -> bool {
        self.inner.is_subset(&other.inner)
    }
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
    pub fn len(&self) -> usize {
        self.inner.len()
    }
    pub fn iter(&self) -> impl Iterator<Item = TerminalID> + '_ {
        // Only raw ids of `TerminalID` are ever inserted.
        self.inner.iter().map(|raw| TerminalID(raw as u16))
    }

    // `{a, b, $}`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            f.write_str("{")?;
            write_joined(f, ", ", self.iter().map(|t| g.terminal_name(t)))?;
            f.write_str("}")
        })
    }
}
impl PartialEq for TerminalSet {
    fn eq(&self, other: &Self) -> bool {
        self.inner.iter().eq(other.inner.iter())
    }
}
impl Eq for TerminalSet {}
impl FromIterator<TerminalID> for TerminalSet {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = TerminalID>,
    {
        Self {
            inner: iter.into_iter().map(TerminalID::index).collect(),
        }
    }
}

/// A pair of a nonterminal symbol and one of its alternatives.
#[derive(Debug)]
pub struct Production {
    id: ProductionID,
    left: NonterminalID,
    right: Vec<SymbolID>,
}
impl Production {
    pub fn id(&self) -> ProductionID {
        self.id
    }

    /// Return the left-hand side of this production.
    pub fn left(&self) -> NonterminalID {
        self.left
    }

    /// Return the right-hand side of this production.
    pub fn right(&self) -> &[SymbolID] {
        &self.right[..]
    }

    // `"LHS -> R1 R2 R3"`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            write!(f, "{} -> ", g.nonterminal_name(self.left))?;
            write_right(f, g, &self.right)
        })
    }
}

fn write_right(f: &mut fmt::Formatter<'_>, g: &Grammar, right: &[SymbolID]) -> fmt::Result {
    if right.is_empty() {
        return f.write_str("ε");
    }
    write_joined(f, " ", right.iter().map(|s| g.symbol_name(*s)))
}

/// The grammar definition used to derive the parse tables.
///
/// The first non-terminal symbol defined is the start symbol.
/// Derived properties are computed on first use and cached.
#[derive(Debug)]
pub struct Grammar {
    terminals: Map<TerminalID, String>,
    nonterminals: Map<NonterminalID, String>,
    productions: Map<ProductionID, Production>,
    alternatives: Map<NonterminalID, Vec<ProductionID>>,
    symbols: Map<String, SymbolID>,
    alphabet: Vec<SymbolID>,
    nullables: OnceCell<Set<NonterminalID>>,
    first_sets: OnceCell<FirstSets>,
    follow_sets: OnceCell<FollowSets>,
}

impl Grammar {
    /// Define a grammar using the specified function.
    pub fn define<F>(f: F) -> Result<Self, GrammarDefError>
    where
        F: FnOnce(&mut GrammarDef),
    {
        let mut def = GrammarDef::default();
        f(&mut def);
        Self::from_rules(def.entries)
    }

    /// Build a grammar from an ordered list of `(nonterminal, alternatives)`.
    ///
    /// Repeated entries for the same nonterminal are appended to its first entry.
    /// An empty string inside an alternative is the epsilon marker and is dropped.
    pub fn from_rules<I, L, A, R, S>(entries: I) -> Result<Self, GrammarDefError>
    where
        I: IntoIterator<Item = (L, A)>,
        L: AsRef<str>,
        A: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut grouped: Map<String, Vec<Vec<String>>> = Map::default();
        for (left, alternatives) in entries {
            let left = left.as_ref();
            if left.is_empty() {
                return Err(GrammarDefError::EmptyNonterminal);
            }
            let slot = grouped.entry(left.to_owned()).or_default();
            for right in alternatives {
                let right: Vec<String> = right
                    .into_iter()
                    .filter(|s| !s.as_ref().is_empty())
                    .map(|s| s.as_ref().to_owned())
                    .collect();
                if slot.contains(&right) {
                    return Err(GrammarDefError::DuplicateProduction {
                        production: format!("{} -> {}", left, right.join(" ")),
                    });
                }
                slot.push(right);
            }
        }
        Self::build(grouped)
    }

    fn build(entries: Map<String, Vec<Vec<String>>>) -> Result<Self, GrammarDefError> {
        if entries.len() > u16::MAX as usize {
            return Err(GrammarDefError::TooManySymbols);
        }

        let mut symbols = Map::default();
        let mut nonterminals = Map::default();
        for (i, name) in entries.keys().enumerate() {
            let id = NonterminalID(i as u16);
            nonterminals.insert(id, name.clone());
            symbols.insert(name.clone(), SymbolID::N(id));
        }

        let mut terminals = Map::default();
        terminals.insert(TerminalID::EOI, String::new());
        let mut next_terminal = TerminalID::OFFSET;
        let mut productions = Map::default();
        let mut alternatives = Map::default();
        let mut alphabet = Set::default();

        for (i, rights) in entries.values().enumerate() {
            let left = NonterminalID(i as u16);
            alphabet.insert(SymbolID::N(left));
            let mut alts = Vec::with_capacity(rights.len());
            for names in rights {
                let mut right = Vec::with_capacity(names.len());
                for name in names {
                    let symbol = match symbols.get(name) {
                        Some(symbol) => *symbol,
                        None => {
                            // 左辺に現れない記号は終端記号と解釈する
                            let id = TerminalID(next_terminal);
                            next_terminal = next_terminal
                                .checked_add(1)
                                .ok_or(GrammarDefError::TooManySymbols)?;
                            terminals.insert(id, name.clone());
                            symbols.insert(name.clone(), SymbolID::T(id));
                            SymbolID::T(id)
                        }
                    };
                    alphabet.insert(symbol);
                    right.push(symbol);
                }

                let id = u16::try_from(productions.len())
                    .map(ProductionID)
                    .map_err(|_| GrammarDefError::TooManySymbols)?;
                productions.insert(id, Production { id, left, right });
                alts.push(id);
            }
            alternatives.insert(left, alts);
        }

        let mut end_of_input = String::from("$");
        while symbols.contains_key(&end_of_input) {
            end_of_input.push('$');
        }
        terminals[&TerminalID::EOI] = end_of_input;

        Ok(Self {
            terminals,
            nonterminals,
            productions,
            alternatives,
            symbols,
            alphabet: alphabet.into_iter().collect(),
            nullables: OnceCell::new(),
            first_sets: OnceCell::new(),
            follow_sets: OnceCell::new(),
        })
    }

    /// Return the start symbol, or `None` if the grammar has no rules.
    pub fn start_symbol(&self) -> Option<NonterminalID> {
        self.nonterminals.keys().next().copied()
    }

    /// Return all symbols in order of their first appearance.
    pub fn alphabet(&self) -> &[SymbolID] {
        &self.alphabet[..]
    }

    /// Return the terminal symbols, excluding the end of input.
    pub fn terminals(&self) -> impl Iterator<Item = (TerminalID, &str)> + '_ {
        self.terminals
            .iter()
            .filter(|(id, _)| **id != TerminalID::EOI)
            .map(|(id, name)| (*id, name.as_str()))
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = (NonterminalID, &str)> + '_ {
        self.nonterminals
            .iter()
            .map(|(id, name)| (*id, name.as_str()))
    }

    /// Return the name of the end-of-input terminal, chosen not to collide with any symbol.
    pub fn end_of_input(&self) -> &str {
        &self.terminals[&TerminalID::EOI]
    }

    pub fn terminal_name(&self, id: TerminalID) -> &str {
        &self.terminals[&id]
    }

    pub fn nonterminal_name(&self, id: NonterminalID) -> &str {
        &self.nonterminals[&id]
    }

    pub fn symbol_name(&self, symbol: SymbolID) -> &str {
        match symbol {
            SymbolID::T(t) => self.terminal_name(t),
            SymbolID::N(n) => self.nonterminal_name(n),
        }
    }

    /// Look up a symbol by its name.
    pub fn symbol(&self, name: &str) -> Option<SymbolID> {
        self.symbols.get(name).copied()
    }

    /// Return all productions in the order of their codes.
    pub fn productions(&self) -> impl Iterator<Item = &Production> + '_ {
        self.productions.values()
    }

    pub fn production(&self, id: ProductionID) -> &Production {
        &self.productions[&id]
    }

    /// Return the productions whose left-hand side is `left`.
    pub fn alternatives(&self, left: NonterminalID) -> &[ProductionID] {
        self.alternatives.get(&left).map_or(&[], |alts| &alts[..])
    }

    /// Return the nonterminals reachable from the start symbol, including itself.
    pub fn reachable_nonterminals(&self) -> Set<NonterminalID> {
        let mut reachable = Set::default();
        let Some(start) = self.start_symbol() else {
            return reachable;
        };
        reachable.insert(start);
        let mut i = 0;
        while let Some(&current) = reachable.get_index(i) {
            for &id in self.alternatives(current) {
                for symbol in self.production(id).right() {
                    if let SymbolID::N(n) = symbol {
                        reachable.insert(*n);
                    }
                }
            }
            i += 1;
        }
        reachable
    }

    /// Return the set of nullable nonterminals.
    pub fn nullables(&self) -> &Set<NonterminalID> {
        self.nullables.get_or_init(|| nullables::compute(self))
    }

    pub fn is_nullable(&self, id: NonterminalID) -> bool {
        self.nullables().contains(&id)
    }

    pub fn first_sets(&self) -> &FirstSets {
        self.first_sets
            .get_or_init(|| first_sets::compute(self, self.nullables()))
    }

    pub fn follow_sets(&self) -> &FollowSets {
        self.follow_sets
            .get_or_init(|| follow_sets::compute(self, self.first_sets()))
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (left, alts) in &self.alternatives {
            write!(f, "{} ->", self.nonterminal_name(*left))?;
            for (i, id) in alts.iter().enumerate() {
                f.write_str(if i > 0 { " | " } else { " " })?;
                write_right(f, self, self.production(*id).right())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The contextual values for building a `Grammar`.
#[derive(Debug, Default)]
pub struct GrammarDef {
    entries: Vec<(String, Vec<Vec<String>>)>,
}

impl GrammarDef {
    /// Append an alternative to `left`.
    pub fn rule<I>(&mut self, left: &str, right: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let right = right.into_iter().map(|s| s.as_ref().to_owned()).collect();
        self.entries.push((left.to_owned(), vec![right]));
        self
    }

    /// Append several alternatives to `left` at once.
    pub fn rules<A, R>(&mut self, left: &str, alternatives: A) -> &mut Self
    where
        A: IntoIterator<Item = R>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        for right in alternatives {
            self.rule(left, right);
        }
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarDefError {
    #[error("the name of a nonterminal symbol must not be empty")]
    EmptyNonterminal,

    #[error("duplicate production rule: `{}'", production)]
    DuplicateProduction { production: String },

    #[error("too many symbols or productions")]
    TooManySymbols,
}
