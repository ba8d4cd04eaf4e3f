//! Parse table definition.

use std::fmt;

/// The trait for abstracting a synthesized LR parse table.
pub trait ParseTable {
    /// The number to identify a row of the table.
    type State: Copy + fmt::Debug;

    /// The number to identify the terminal symbols.
    type Terminal: Copy + fmt::Debug;

    /// The number to identify the nonterminal symbols.
    type Nonterminal: Copy + fmt::Debug;

    /// Return the row number where the evaluation starts.
    fn initial_state(&self) -> Self::State;

    /// Resolve the kind of an incoming token into the corresponding terminal symbol.
    fn terminal(&self, kind: &str) -> Option<Self::Terminal>;

    /// Return the action corresponding to the specified row and lookahead symbol.
    ///
    /// If there is no lookahead symbol, a `None` is passed as the end of input.
    fn action(
        &self,
        current: Self::State,
        lookahead: Option<Self::Terminal>,
    ) -> Option<ParseAction<Self::State, Self::Nonterminal>>;

    /// Return the destination row after reducing to `symbol` on the row `current`.
    fn goto(&self, current: Self::State, symbol: Self::Nonterminal) -> Option<Self::State>;

    /// Return the name of the specified nonterminal symbol.
    fn nonterminal_name(&self, symbol: Self::Nonterminal) -> &str;

    /// Return the names of terminal symbols that have an action on the row `current`.
    fn expected_terminals(&self, current: Self::State) -> Vec<String>;
}

impl<T: ?Sized> ParseTable for &T
where
    T: ParseTable,
{
    type State = T::State;
    type Terminal = T::Terminal;
    type Nonterminal = T::Nonterminal;

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn terminal(&self, kind: &str) -> Option<Self::Terminal> {
        (**self).terminal(kind)
    }

    fn action(
        &self,
        current: Self::State,
        lookahead: Option<Self::Terminal>,
    ) -> Option<ParseAction<Self::State, Self::Nonterminal>> {
        (**self).action(current, lookahead)
    }

    fn goto(&self, current: Self::State, symbol: Self::Nonterminal) -> Option<Self::State> {
        (**self).goto(current, symbol)
    }

    fn nonterminal_name(&self, symbol: Self::Nonterminal) -> &str {
        (**self).nonterminal_name(symbol)
    }

    fn expected_terminals(&self, current: Self::State) -> Vec<String> {
        (**self).expected_terminals(current)
    }
}

impl<T: ?Sized> ParseTable for std::rc::Rc<T>
where
    T: ParseTable,
{
    type State = T::State;
    type Terminal = T::Terminal;
    type Nonterminal = T::Nonterminal;

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn terminal(&self, kind: &str) -> Option<Self::Terminal> {
        (**self).terminal(kind)
    }

    fn action(
        &self,
        current: Self::State,
        lookahead: Option<Self::Terminal>,
    ) -> Option<ParseAction<Self::State, Self::Nonterminal>> {
        (**self).action(current, lookahead)
    }

    fn goto(&self, current: Self::State, symbol: Self::Nonterminal) -> Option<Self::State> {
        (**self).goto(current, symbol)
    }

    fn nonterminal_name(&self, symbol: Self::Nonterminal) -> &str {
        (**self).nonterminal_name(symbol)
    }

    fn expected_terminals(&self, current: Self::State) -> Vec<String> {
        (**self).expected_terminals(current)
    }
}

impl<T: ?Sized> ParseTable for std::sync::Arc<T>
where
    T: ParseTable,
{
    type State = T::State;
    type Terminal = T::Terminal;
    type Nonterminal = T::Nonterminal;

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn terminal(&self, kind: &str) -> Option<Self::Terminal> {
        (**self).terminal(kind)
    }

    fn action(
        &self,
        current: Self::State,
        lookahead: Option<Self::Terminal>,
    ) -> Option<ParseAction<Self::State, Self::Nonterminal>> {
        (**self).action(current, lookahead)
    }

    fn goto(&self, current: Self::State, symbol: Self::Nonterminal) -> Option<Self::State> {
        (**self).goto(current, symbol)
    }

    fn nonterminal_name(&self, symbol: Self::Nonterminal) -> &str {
        (**self).nonterminal_name(symbol)
    }

    fn expected_terminals(&self, current: Self::State) -> Vec<String> {
        (**self).expected_terminals(current)
    }
}

/// The action stored in a table cell, as seen by the evaluator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParseAction<TState, TNonterminal> {
    /// Push the lookahead token and move to the specified row.
    Shift(TState),

    /// Pop `len` entries and reduce them to `lhs`.
    ///
    /// `production` is the code used to select the semantic action.
    Reduce {
        lhs: TNonterminal,
        len: usize,
        production: usize,
    },

    /// The whole input has been recognized.
    Accept,
}
