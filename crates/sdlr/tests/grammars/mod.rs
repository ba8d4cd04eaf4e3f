//! Grammar definitions shared by the integration tests.

#![allow(dead_code)]

use logos::Logos;
use sdlr::{
    grammar::Grammar,
    runtime::{ActionList, ParseItem},
};
use tracing::Level;

/// The textbook `S -> C C; C -> c C | d`, whose canonical automaton has
/// three pairs of states differing only in lookaheads.
pub fn cc() -> Grammar {
    Grammar::define(|g| {
        g.rule("S", ["C", "C"]);
        g.rule("C", ["c", "C"]);
        g.rule("C", ["d"]);
    })
    .unwrap()
}

/// Arithmetic with the usual precedence encoded in the productions.
///
/// Production codes:
/// 0. `E -> E + T`
/// 1. `E -> E - T`
/// 2. `E -> T`
/// 3. `T -> T * F`
/// 4. `T -> T / F`
/// 5. `T -> F`
/// 6. `F -> ( E )`
/// 7. `F -> num`
pub fn calculator() -> Grammar {
    Grammar::from_rules([
        ("E", vec![vec!["E", "+", "T"], vec!["E", "-", "T"], vec!["T"]]),
        ("T", vec![vec!["T", "*", "F"], vec!["T", "/", "F"], vec!["F"]]),
        ("F", vec![vec!["(", "E", ")"], vec!["num"]]),
    ])
    .unwrap()
}

pub fn json() -> Grammar {
    Grammar::define(|g| {
        g.rules("value", [["object"], ["array"], ["string"], ["number"]]);
        g.rules("value", [["true"], ["false"], ["null"]]);
        g.rules("object", [vec!["{", "}"], vec!["{", "members", "}"]]);
        g.rules("members", [vec!["member"], vec!["members", ",", "member"]]);
        g.rule("member", ["string", ":", "value"]);
        g.rules("array", [vec!["[", "]"], vec!["[", "elements", "]"]]);
        g.rules("elements", [vec!["value"], vec!["elements", ",", "value"]]);
    })
    .unwrap()
}

pub fn dangling_else() -> Grammar {
    Grammar::define(|g| {
        g.rule("S", ["if", "S"]);
        g.rule("S", ["if", "S", "else", "S"]);
        g.rule("S", ["x"]);
    })
    .unwrap()
}

pub fn reduce_reduce() -> Grammar {
    Grammar::define(|g| {
        g.rule("S", ["A", "a"]);
        g.rule("S", ["B", "a"]);
        g.rule("A", ["x"]);
        g.rule("B", ["x"]);
    })
    .unwrap()
}

/// Not LALR(1): merging the states after `a e` and `b e` mixes their lookaheads.
pub fn lr1_only() -> Grammar {
    Grammar::define(|g| {
        g.rule("S", ["a", "A", "d"]);
        g.rule("S", ["b", "B", "d"]);
        g.rule("S", ["a", "B", "e"]);
        g.rule("S", ["b", "A", "e"]);
        g.rule("A", ["c"]);
        g.rule("B", ["c"]);
    })
    .unwrap()
}

pub type Lexed = Result<(String, String), String>;

#[derive(Debug, Copy, Clone, Logos, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum Arith {
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[regex(r"[0-9]+")]
    Num,
}

impl Arith {
    fn kind(self) -> &'static str {
        match self {
            Self::LParen => "(",
            Self::RParen => ")",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Num => "num",
        }
    }
}

/// Split arithmetic source text into `(kind, text)` pairs.
pub fn lex_arithmetic(input: &str) -> Vec<Lexed> {
    let mut lexer = Arith::lexer(input);
    let mut tokens = vec![];
    while let Some(token) = lexer.next() {
        let text = lexer.slice();
        tokens.push(match token {
            Ok(token) => Ok((token.kind().to_owned(), text.to_owned())),
            Err(()) => Err(format!("unexpected character `{}'", text)),
        });
    }
    tokens
}

/// Install a subscriber printing the generator's trace events into the captured test output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// Tokens whose kind is the word itself.
pub fn words(input: &str) -> Vec<Lexed> {
    input
        .split_whitespace()
        .map(|w| Ok((w.to_owned(), w.to_owned())))
        .collect()
}

/// The semantic actions of [`calculator`], indexed by production code.
pub fn arithmetic<'a>() -> ActionList<'a, String, i64> {
    ActionList::new()
        .rule(|args| binary(args, i64::checked_add))
        .rule(|args| binary(args, i64::checked_sub))
        .rule(first_value)
        .rule(|args| binary(args, i64::checked_mul))
        .rule(|args| binary(args, i64::checked_div))
        .rule(first_value)
        .rule(|args| args.into_iter().nth(1)?.value())
        .rule(|args| args.into_iter().next()?.token()?.parse().ok())
}

fn binary<F>(args: Vec<ParseItem<String, i64>>, op: F) -> Option<i64>
where
    F: FnOnce(i64, i64) -> Option<i64>,
{
    let mut args = args.into_iter();
    let lhs = args.next()?.value()?;
    let rhs = args.nth(1)?.value()?;
    op(lhs, rhs)
}

fn first_value(args: Vec<ParseItem<String, i64>>) -> Option<i64> {
    args.into_iter().next()?.value()
}
