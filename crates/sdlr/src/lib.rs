//! A parser generator core that synthesizes merged LR(1) tables
//! and evaluates them with syntax-directed semantic actions.

pub mod dfa;
pub mod disjoint_set;
pub mod first_sets;
pub mod follow_sets;
pub mod grammar;
pub mod item;
pub mod nullables;
pub mod table;
pub mod types;
pub mod util;

pub use sdlr_runtime as runtime;
