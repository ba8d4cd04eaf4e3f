//! Grammars bundled with the command line tool.

use clap::ValueEnum;
use sdlr::grammar::{Grammar, GrammarDefError};

#[derive(Debug, Copy, Clone, PartialEq, ValueEnum)]
pub enum Bundled {
    /// Arithmetic expressions over integers.
    Calculator,
    /// JSON documents with string and number placeholders.
    Json,
    /// `S -> C C; C -> c C | d`
    Cc,
    /// The ambiguous if-then-else statement.
    DanglingElse,
}

impl Bundled {
    pub fn grammar(self) -> Result<Grammar, GrammarDefError> {
        match self {
            Self::Calculator => Grammar::from_rules([
                ("E", vec![vec!["E", "+", "T"], vec!["E", "-", "T"], vec!["T"]]),
                ("T", vec![vec!["T", "*", "F"], vec!["T", "/", "F"], vec!["F"]]),
                ("F", vec![vec!["(", "E", ")"], vec!["num"]]),
            ]),
            Self::Json => Grammar::define(|g| {
                g.rules("value", [["object"], ["array"], ["string"], ["number"]]);
                g.rules("value", [["true"], ["false"], ["null"]]);
                g.rules("object", [vec!["{", "}"], vec!["{", "members", "}"]]);
                g.rules("members", [vec!["member"], vec!["members", ",", "member"]]);
                g.rule("member", ["string", ":", "value"]);
                g.rules("array", [vec!["[", "]"], vec!["[", "elements", "]"]]);
                g.rules("elements", [vec!["value"], vec!["elements", ",", "value"]]);
            }),
            Self::Cc => Grammar::define(|g| {
                g.rule("S", ["C", "C"]);
                g.rules("C", [vec!["c", "C"], vec!["d"]]);
            }),
            Self::DanglingElse => Grammar::define(|g| {
                g.rule("S", ["if", "S"]);
                g.rule("S", ["if", "S", "else", "S"]);
                g.rule("S", ["x"]);
            }),
        }
    }

    /// Map a word of the input onto the name of its terminal symbol.
    ///
    /// Words spelled like a terminal are that terminal.
    pub fn classify<'w>(self, word: &'w str, g: &Grammar) -> Option<&'w str> {
        if g.terminals().any(|(_, name)| name == word) {
            return Some(word);
        }
        let numeric = word.parse::<f64>().is_ok();
        match self {
            Self::Calculator if word.bytes().all(|b| b.is_ascii_digit()) => Some("num"),
            Self::Json if numeric => Some("number"),
            Self::Json if word.len() >= 2 && word.starts_with('"') && word.ends_with('"') => {
                Some("string")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_grammars_build() {
        for bundled in Bundled::value_variants() {
            assert!(bundled.grammar().is_ok(), "{:?}", bundled);
        }
    }

    #[test]
    fn classify_words() {
        let g = Bundled::Json.grammar().unwrap();
        assert_eq!(Bundled::Json.classify("{", &g), Some("{"));
        assert_eq!(Bundled::Json.classify("\"key\"", &g), Some("string"));
        assert_eq!(Bundled::Json.classify("-1.5", &g), Some("number"));
        assert_eq!(Bundled::Json.classify("nil", &g), None);

        let g = Bundled::Calculator.grammar().unwrap();
        assert_eq!(Bundled::Calculator.classify("42", &g), Some("num"));
        assert_eq!(Bundled::Calculator.classify("4.2", &g), None);
    }
}
