//! The table-driven evaluator.

use crate::{
    actions::SemanticActions,
    definition::{ParseAction, ParseTable},
};
use std::{convert::Infallible, fmt};

/// A trait for abstracting the tokens supplied by a lexer.
pub trait Token {
    /// The raw payload handed to semantic actions after shifting.
    type Value;

    /// Return the name of the terminal symbol that this token belongs to.
    fn kind(&self) -> &str;

    fn into_value(self) -> Self::Value;
}

impl<K, V> Token for (K, V)
where
    K: AsRef<str>,
{
    type Value = V;

    fn kind(&self) -> &str {
        self.0.as_ref()
    }

    fn into_value(self) -> Self::Value {
        self.1
    }
}

/// An entry of the value stack.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseItem<R, V> {
    /// The raw value of a shifted token.
    T(R),
    /// The result of a semantic action.
    N(V),
}

impl<R, V> ParseItem<R, V> {
    pub fn token(self) -> Option<R> {
        match self {
            Self::T(raw) => Some(raw),
            Self::N(..) => None,
        }
    }

    pub fn value(self) -> Option<V> {
        match self {
            Self::N(value) => Some(value),
            Self::T(..) => None,
        }
    }
}

impl<T> ParseItem<T, T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::T(t) | Self::N(t) => t,
        }
    }
}

/// The two-stack automaton that executes a parse table against a token stream.
pub struct Evaluator<TDef, TAct, TTok>
where
    TDef: ParseTable,
    TTok: Token,
    TAct: SemanticActions<TTok::Value>,
{
    definition: TDef,
    actions: TAct,
    states: Vec<TDef::State>,
    values: Vec<ParseItem<TTok::Value, TAct::Value>>,
    position: usize,
    failed: bool,
}

impl<TDef, TAct, TTok> fmt::Debug for Evaluator<TDef, TAct, TTok>
where
    TDef: ParseTable,
    TTok: Token,
    TAct: SemanticActions<TTok::Value>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("states", &self.states)
            .field("position", &self.position)
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

impl<TDef, TAct, TTok> Evaluator<TDef, TAct, TTok>
where
    TDef: ParseTable,
    TTok: Token,
    TAct: SemanticActions<TTok::Value>,
{
    /// Create an evaluator positioned at the initial row of `definition`.
    pub fn new(definition: TDef, actions: TAct) -> Self {
        let initial_state = definition.initial_state();
        Self {
            definition,
            actions,
            states: vec![initial_state],
            values: vec![],
            position: 0,
            failed: false,
        }
    }

    /// Feed one token, running every reduction it triggers up to and including its shift.
    ///
    /// Once an error is returned the evaluator is left failed, and every later call
    /// returns [`EvalError::Aborted`].
    pub fn offer_token(&mut self, token: TTok) -> Result<(), EvalError> {
        if self.failed {
            return Err(EvalError::Aborted);
        }
        let res = self.step(token);
        self.failed = res.is_err();
        res
    }

    fn step(&mut self, token: TTok) -> Result<(), EvalError> {
        let current = self.current()?;
        let lookahead = self
            .definition
            .terminal(token.kind())
            .ok_or_else(|| self.syntax_error(current, Some(token.kind())))?;

        loop {
            let current = self.current()?;
            match self.definition.action(current, Some(lookahead)) {
                Some(ParseAction::Shift(next)) => {
                    tracing::trace!(?current, ?next, kind = token.kind(), "shift");
                    self.states.push(next);
                    self.values.push(ParseItem::T(token.into_value()));
                    self.position += 1;
                    return Ok(());
                }
                Some(ParseAction::Reduce {
                    lhs,
                    len,
                    production,
                }) => self.reduce(lhs, len, production)?,
                Some(ParseAction::Accept) => return Err(EvalError::AcceptedBeforeEnd),
                None => return Err(self.syntax_error(current, Some(token.kind()))),
            }
        }
    }

    /// Signal the end of input, resolve the remaining reductions and return the final value.
    pub fn finish(mut self) -> Result<TAct::Value, EvalError> {
        if self.failed {
            return Err(EvalError::Aborted);
        }
        loop {
            let current = self.current()?;
            match self.definition.action(current, None) {
                Some(ParseAction::Accept) => {
                    tracing::trace!(?current, "accept");
                    break;
                }
                Some(ParseAction::Reduce {
                    lhs,
                    len,
                    production,
                }) => self.reduce(lhs, len, production)?,
                Some(ParseAction::Shift(..)) => {
                    return Err(EvalError::InconsistentTable {
                        state: format!("{:?}", current),
                        detail: "shift on end of input".into(),
                    })
                }
                None => return Err(self.syntax_error(current, None)),
            }
        }

        match self.values.pop() {
            Some(ParseItem::N(value)) if self.values.is_empty() => Ok(value),
            _ => Err(EvalError::NoResultValue),
        }
    }

    /// Consume a whole token stream and return the value of the start symbol.
    pub fn evaluate<I, L>(mut self, tokens: I) -> Result<TAct::Value, EvalError<L>>
    where
        I: IntoIterator<Item = Result<TTok, L>>,
        L: fmt::Display,
    {
        let _span = tracing::trace_span!("evaluate").entered();
        for token in tokens {
            let token = token.map_err(EvalError::Lexer)?;
            self.offer_token(token).map_err(EvalError::widen)?;
        }
        self.finish().map_err(EvalError::widen)
    }

    /// Return the number of tokens shifted so far.
    pub fn position(&self) -> usize {
        self.position
    }

    fn current(&self) -> Result<TDef::State, EvalError> {
        self.states
            .last()
            .copied()
            .ok_or_else(|| EvalError::InconsistentTable {
                state: "<none>".into(),
                detail: "empty state stack".into(),
            })
    }

    fn reduce(
        &mut self,
        lhs: TDef::Nonterminal,
        len: usize,
        production: usize,
    ) -> Result<(), EvalError> {
        if self.values.len() < len || self.states.len() <= len {
            return Err(EvalError::InconsistentTable {
                state: format!("{:?}", self.current()?),
                detail: format!("cannot pop {} entries for production #{}", len, production),
            });
        }
        let args = self.values.split_off(self.values.len() - len);
        self.states.truncate(self.states.len() - len);

        let exposed = self.current()?;
        let name = self.definition.nonterminal_name(lhs);
        let next = self.definition.goto(exposed, lhs).ok_or_else(|| {
            EvalError::InconsistentTable {
                state: format!("{:?}", exposed),
                detail: format!("missing goto on {}", name),
            }
        })?;
        tracing::trace!(?exposed, ?next, production, lhs = name, "reduce");

        let value = self
            .actions
            .reduce(production, name, args)
            .ok_or(EvalError::MissingAction(production))?;
        self.states.push(next);
        self.values.push(ParseItem::N(value));
        Ok(())
    }

    fn syntax_error(&self, state: TDef::State, lookahead: Option<&str>) -> EvalError {
        EvalError::SyntaxError {
            state: format!("{:?}", state),
            lookahead: lookahead.map(Into::into),
            position: self.position,
            expected: self.definition.expected_terminals(state),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EvalError<L: fmt::Display = Infallible> {
    #[error("from lexer: {}", _0)]
    Lexer(L),

    #[error(
        "syntax error at token {position}: unexpected {} in state {state} (expected: {})",
        .lookahead.as_deref().unwrap_or("end of input"),
        .expected.join(", ")
    )]
    SyntaxError {
        state: String,
        lookahead: Option<String>,
        position: usize,
        expected: Vec<String>,
    },

    #[error("inconsistent parse table at {state}: {detail}")]
    InconsistentTable { state: String, detail: String },

    #[error("received input after accepting")]
    AcceptedBeforeEnd,

    #[error("the evaluation has already failed")]
    Aborted,

    #[error("the value stack does not hold exactly one result")]
    NoResultValue,

    #[error("no semantic action produced a value for production #{}", _0)]
    MissingAction(usize),
}

impl EvalError {
    fn widen<L: fmt::Display>(self) -> EvalError<L> {
        match self {
            Self::Lexer(never) => match never {},
            Self::SyntaxError {
                state,
                lookahead,
                position,
                expected,
            } => EvalError::SyntaxError {
                state,
                lookahead,
                position,
                expected,
            },
            Self::InconsistentTable { state, detail } => {
                EvalError::InconsistentTable { state, detail }
            }
            Self::AcceptedBeforeEnd => EvalError::AcceptedBeforeEnd,
            Self::Aborted => EvalError::Aborted,
            Self::NoResultValue => EvalError::NoResultValue,
            Self::MissingAction(code) => EvalError::MissingAction(code),
        }
    }
}
