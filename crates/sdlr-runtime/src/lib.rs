//! Runtime implementation for the `sdlr` parser generator.
//!
//! This crate executes a synthesized LR table against a token stream,
//! running a semantic action on every reduction.

pub mod actions;
pub mod definition;
pub mod evaluator;
pub mod tree;

pub use crate::{
    actions::{ActionList, SemanticActions, TreeBuilder},
    definition::{ParseAction, ParseTable},
    evaluator::{EvalError, Evaluator, ParseItem, Token},
    tree::Tree,
};
