use anyhow::Context as _;
use logos::Logos;
use sdlr::{
    grammar::Grammar,
    runtime::{ActionList, ParseItem, Token},
    table::LRTable,
};
use std::env;
use tracing_subscriber::EnvFilter;

// 電卓の入力トークン
#[derive(Debug, Copy, Clone, Logos, PartialEq)]
#[logos(skip r"[ \t\n\f]+")]
enum Tok<'source> {
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
    Num(&'source str),
}

impl<'source> Token for Tok<'source> {
    type Value = Tok<'source>;

    fn kind(&self) -> &str {
        match self {
            Self::LParen => "(",
            Self::RParen => ")",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Num(..) => "num",
        }
    }

    fn into_value(self) -> Self::Value {
        self
    }
}

fn grammar() -> anyhow::Result<Grammar> {
    let g = Grammar::define(|g| {
        g.rules("E", [vec!["E", "+", "T"], vec!["E", "-", "T"], vec!["T"]]);
        g.rules("T", [vec!["T", "*", "F"], vec!["T", "/", "F"], vec!["F"]]);
        g.rules("F", [vec!["(", "E", ")"], vec!["-", "F"], vec!["num"]]);
    })?;
    Ok(g)
}

type Arg<'s> = ParseItem<Tok<'s>, i64>;

fn binary<'s>(args: Vec<Arg<'s>>, op: fn(i64, i64) -> Option<i64>) -> Option<i64> {
    let mut args = args.into_iter();
    let lhs = args.next()?.value()?;
    let rhs = args.nth(1)?.value()?;
    let value = op(lhs, rhs);
    if value.is_none() {
        tracing::error!(lhs, rhs, "arithmetic error");
    }
    value
}

fn pass(args: Vec<Arg<'_>>) -> Option<i64> {
    args.into_iter().next()?.value()
}

// production codes follow the declaration order in `grammar()`
fn actions<'a, 's: 'a>() -> ActionList<'a, Tok<'s>, i64> {
    ActionList::new()
        .rule(|args| binary(args, i64::checked_add))
        .rule(|args| binary(args, i64::checked_sub))
        .rule(pass)
        .rule(|args| binary(args, i64::checked_mul))
        .rule(|args| binary(args, i64::checked_div))
        .rule(pass)
        .rule(|args| args.into_iter().nth(1)?.value())
        .rule(|args| args.into_iter().nth(1)?.value()?.checked_neg())
        .rule(|args| match args.into_iter().next()?.token()? {
            Tok::Num(num) => num.parse().ok(),
            _ => None,
        })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_ansi(true)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let input = env::args().nth(1).context("missing input")?;

    let table = LRTable::generate(&grammar()?).context("failed to synthesize the table")?;
    tracing::debug!(rows = table.len(), "synthesized table");

    let tokens = Tok::lexer(&input).map(|res| res.map_err(|()| "lexer error"));
    let value = table
        .evaluator(actions())
        .evaluate(tokens)
        .context("parser error")?;
    println!("{} = {}", input.trim(), value);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(input: &str) -> Option<i64> {
        let table = LRTable::generate(&grammar().unwrap()).unwrap();
        let tokens = Tok::lexer(input).map(|res| res.map_err(|()| "lexer error"));
        table.evaluator(actions()).evaluate(tokens).ok()
    }

    #[test]
    fn evaluate_expressions() {
        assert_eq!(eval("3 + 4"), Some(7));
        assert_eq!(eval("3 * (4 + 56)"), Some(180));
        assert_eq!(eval("-2 * -(1 - 4)"), Some(-6));
        assert_eq!(eval("7 / 0"), None);
        assert_eq!(eval("1 +"), None);
        assert_eq!(eval("1 ? 2"), None);
    }
}
