//! Synthesis of the shift/reduce/goto table from the automaton.

use crate::{
    dfa::{DFAError, DFA},
    grammar::{Grammar, NonterminalID, ProductionID, SymbolID, TerminalID},
    types::Map,
    util::display_fn,
};
use sdlr_runtime::{
    actions::{SemanticActions, TreeBuilder},
    definition::{ParseAction, ParseTable},
    evaluator::{EvalError, Evaluator, Token},
    tree::Tree,
};
use std::fmt;

pub use crate::dfa::RowID;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Reduce {
    pub left: NonterminalID,
    pub len: usize,
    pub production: ProductionID,
}

/// A cell of the action part of the table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    Shift(RowID),
    Reduce(Reduce),
    Accept,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shift(next) => write!(f, "S{}", next),
            Self::Reduce(reduce) => write!(f, "R{}", reduce.production.code()),
            Self::Accept => f.write_str("Acc"),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Row {
    actions: Map<TerminalID, Action>,
    gotos: Map<NonterminalID, RowID>,
}

impl Row {
    pub fn action(&self, terminal: TerminalID) -> Option<Action> {
        self.actions.get(&terminal).copied()
    }

    pub fn goto(&self, symbol: NonterminalID) -> Option<RowID> {
        self.gotos.get(&symbol).copied()
    }

    pub fn actions(&self) -> impl Iterator<Item = (TerminalID, Action)> + '_ {
        self.actions.iter().map(|(t, action)| (*t, *action))
    }

    pub fn gotos(&self) -> impl Iterator<Item = (NonterminalID, RowID)> + '_ {
        self.gotos.iter().map(|(n, next)| (*n, *next))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
    ShiftShift,
    Accept,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ShiftReduce => "shift/reduce",
            Self::ReduceReduce => "reduce/reduce",
            Self::ShiftShift => "shift/shift",
            Self::Accept => "accept",
        })
    }
}

impl ConflictKind {
    fn of(existing: Action, new: Action) -> Self {
        match (existing, new) {
            (Action::Shift(..), Action::Reduce(..)) | (Action::Reduce(..), Action::Shift(..)) => {
                Self::ShiftReduce
            }
            (Action::Reduce(..), Action::Reduce(..)) => Self::ReduceReduce,
            (Action::Shift(..), Action::Shift(..)) => Self::ShiftShift,
            _ => Self::Accept,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error(transparent)]
    Automaton(#[from] DFAError),

    #[error("{kind} conflict at row {row} on `{terminal}': {existing} vs {new}")]
    ActionConflict {
        row: RowID,
        terminal: String,
        kind: ConflictKind,
        existing: Action,
        new: Action,
    },

    #[error("goto conflict at row {row} on `{nonterminal}': {existing} vs {new}")]
    GotoConflict {
        row: RowID,
        nonterminal: String,
        existing: RowID,
        new: RowID,
    },
}

/// The synthesized LR table.
///
/// The table keeps the names of its symbols and holds no reference to the grammar.
#[derive(Debug, Clone)]
pub struct LRTable {
    terminals: Map<TerminalID, String>,
    end_of_input: String,
    nonterminals: Map<NonterminalID, String>,
    kinds: Map<String, TerminalID>,
    rows: Vec<Row>,
    start: NonterminalID,
}

impl LRTable {
    /// Build the automaton of `g` and synthesize its table.
    pub fn generate(g: &Grammar) -> Result<Self, TableError> {
        let dfa = DFA::generate(g)?;
        Self::from_dfa(g, &dfa)
    }

    pub fn from_dfa(g: &Grammar, dfa: &DFA) -> Result<Self, TableError> {
        let _span = tracing::debug_span!("table").entered();
        let start = g.start_symbol().ok_or(DFAError::EmptyGrammar)?;

        let mut synth = Synthesizer {
            g,
            rows: vec![Row::default(); dfa.num_rows()],
        };

        for (id, node) in dfa.nodes() {
            let row = dfa.row_of(id);
            for (symbol, target) in node.edges() {
                let next = dfa.row_of(target);
                match symbol {
                    SymbolID::N(n) => synth.set_goto(row, n, next)?,
                    SymbolID::T(t) => synth.set_action(row, t, Action::Shift(next))?,
                }
            }
            for (core, lookaheads) in node.state().reducible(g) {
                let production = g.production(core.production);
                let reduce = Action::Reduce(Reduce {
                    left: production.left(),
                    len: production.right().len(),
                    production: production.id(),
                });
                for t in lookaheads.iter() {
                    synth.set_action(row, t, reduce)?;
                }
            }
        }

        let accept_row = match synth.rows[RowID::INITIAL.index()].goto(start) {
            Some(row) => row,
            None => {
                // 開始記号で遷移する状態がない場合は受理専用の行を追加する
                let row = RowID::new(synth.rows.len());
                synth.rows.push(Row::default());
                synth.set_goto(RowID::INITIAL, start, row)?;
                row
            }
        };
        synth.set_action(accept_row, TerminalID::EOI, Action::Accept)?;

        tracing::debug!(
            rows = synth.rows.len(),
            nodes = dfa.len(),
            "synthesized table"
        );

        let terminals: Map<TerminalID, String> = g
            .terminals()
            .map(|(id, name)| (id, name.to_owned()))
            .collect();
        let kinds = terminals
            .iter()
            .map(|(id, name)| (name.clone(), *id))
            .collect();
        Ok(Self {
            terminals,
            end_of_input: g.end_of_input().to_owned(),
            nonterminals: g
                .nonterminals()
                .map(|(id, name)| (id, name.to_owned()))
                .collect(),
            kinds,
            rows: synth.rows,
            start,
        })
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows[..]
    }

    pub fn row(&self, row: RowID) -> Option<&Row> {
        self.rows.get(row.index())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn start_symbol(&self) -> NonterminalID {
        self.start
    }

    pub fn action(&self, row: RowID, terminal: TerminalID) -> Option<Action> {
        self.row(row)?.action(terminal)
    }

    pub fn goto(&self, row: RowID, symbol: NonterminalID) -> Option<RowID> {
        self.row(row)?.goto(symbol)
    }

    /// Look up a terminal symbol by name. The end of input is not a token kind.
    pub fn terminal_id(&self, name: &str) -> Option<TerminalID> {
        self.kinds.get(name).copied()
    }

    pub fn nonterminal_id(&self, name: &str) -> Option<NonterminalID> {
        self.nonterminals
            .iter()
            .find_map(|(id, n)| (n == name).then_some(*id))
    }

    pub fn terminal_name(&self, id: TerminalID) -> Option<&str> {
        if id == TerminalID::EOI {
            return Some(&self.end_of_input);
        }
        self.terminals.get(&id).map(String::as_str)
    }

    /// Return the names of terminals with an action on `row`, in symbol order.
    pub fn expected(&self, row: RowID) -> Vec<String> {
        let Some(row) = self.row(row) else {
            return vec![];
        };
        let mut expected: Vec<TerminalID> = row.actions.keys().copied().collect();
        expected.sort();
        expected
            .into_iter()
            .filter_map(|t| self.terminal_name(t).map(str::to_owned))
            .collect()
    }

    /// Create an evaluator running `actions` over this table.
    pub fn evaluator<A, T>(&self, actions: A) -> Evaluator<&Self, A, T>
    where
        T: Token,
        A: SemanticActions<T::Value>,
    {
        Evaluator::new(self, actions)
    }

    /// Evaluate `tokens` into a tree labeled with nonterminal names.
    pub fn parse<I, T, L>(&self, tokens: I) -> Result<Tree<T::Value>, EvalError<L>>
    where
        I: IntoIterator<Item = Result<T, L>>,
        T: Token,
        L: fmt::Display,
    {
        self.evaluator(TreeBuilder::new()).evaluate(tokens)
    }

    /// Render the table as a grid of terminals, the end of input and nonterminals.
    pub fn display(&self) -> impl fmt::Display + '_ {
        display_fn(move |f| {
            let mut header = vec![String::new()];
            header.extend(self.terminals.values().cloned());
            header.push(self.end_of_input.clone());
            header.extend(self.nonterminals.values().cloned());

            let mut lines = vec![header];
            for (i, row) in self.rows.iter().enumerate() {
                let mut line = vec![i.to_string()];
                let terminals = self.terminals.keys().chain(Some(&TerminalID::EOI));
                for t in terminals {
                    line.push(row.action(*t).map_or_else(String::new, |a| a.to_string()));
                }
                for n in self.nonterminals.keys() {
                    line.push(row.goto(*n).map_or_else(String::new, |r| r.to_string()));
                }
                lines.push(line);
            }

            let mut widths = vec![0; lines[0].len()];
            for line in &lines {
                for (width, cell) in widths.iter_mut().zip(line) {
                    *width = (*width).max(cell.chars().count());
                }
            }
            for line in &lines {
                let mut text = String::new();
                for (i, (cell, width)) in line.iter().zip(&widths).enumerate() {
                    if i > 0 {
                        text.push_str(" | ");
                    }
                    text.push_str(&format!("{:<width$}", cell, width = width));
                }
                writeln!(f, "{}", text.trim_end())?;
            }
            Ok(())
        })
    }
}

impl ParseTable for LRTable {
    type State = RowID;
    type Terminal = TerminalID;
    type Nonterminal = NonterminalID;

    fn initial_state(&self) -> RowID {
        RowID::INITIAL
    }

    fn terminal(&self, kind: &str) -> Option<TerminalID> {
        self.terminal_id(kind)
    }

    fn action(
        &self,
        current: RowID,
        lookahead: Option<TerminalID>,
    ) -> Option<ParseAction<RowID, NonterminalID>> {
        let action = LRTable::action(self, current, lookahead.unwrap_or(TerminalID::EOI))?;
        Some(match action {
            Action::Shift(next) => ParseAction::Shift(next),
            Action::Reduce(reduce) => ParseAction::Reduce {
                lhs: reduce.left,
                len: reduce.len,
                production: reduce.production.code(),
            },
            Action::Accept => ParseAction::Accept,
        })
    }

    fn goto(&self, current: RowID, symbol: NonterminalID) -> Option<RowID> {
        LRTable::goto(self, current, symbol)
    }

    fn nonterminal_name(&self, symbol: NonterminalID) -> &str {
        self.nonterminals.get(&symbol).map_or("", String::as_str)
    }

    fn expected_terminals(&self, current: RowID) -> Vec<String> {
        self.expected(current)
    }
}

struct Synthesizer<'g> {
    g: &'g Grammar,
    rows: Vec<Row>,
}

impl Synthesizer<'_> {
    fn set_action(
        &mut self,
        row: RowID,
        terminal: TerminalID,
        new: Action,
    ) -> Result<(), TableError> {
        let actions = &mut self.rows[row.index()].actions;
        match actions.get(&terminal) {
            Some(existing) if *existing == new => Ok(()),
            Some(existing) => Err(TableError::ActionConflict {
                row,
                terminal: self.g.terminal_name(terminal).to_owned(),
                kind: ConflictKind::of(*existing, new),
                existing: *existing,
                new,
            }),
            None => {
                actions.insert(terminal, new);
                Ok(())
            }
        }
    }

    fn set_goto(
        &mut self,
        row: RowID,
        symbol: NonterminalID,
        new: RowID,
    ) -> Result<(), TableError> {
        let gotos = &mut self.rows[row.index()].gotos;
        match gotos.get(&symbol) {
            Some(existing) if *existing == new => Ok(()),
            Some(existing) => Err(TableError::GotoConflict {
                row,
                nonterminal: self.g.nonterminal_name(symbol).to_owned(),
                existing: *existing,
                new,
            }),
            None => {
                gotos.insert(symbol, new);
                Ok(())
            }
        }
    }
}
