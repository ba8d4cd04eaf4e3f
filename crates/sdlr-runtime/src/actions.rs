//! Semantic actions invoked on reductions.

use crate::{evaluator::ParseItem, tree::Tree};
use std::{fmt, marker::PhantomData};

/// The trait for the user code run each time a production is reduced.
pub trait SemanticActions<R> {
    /// The type of values computed for nonterminal symbols.
    type Value;

    /// Compute the value of the reduced production.
    ///
    /// `production` is the production code, and `args` holds the popped
    /// entries of the value stack in left-to-right order.
    /// Returning `None` aborts the evaluation.
    fn reduce(
        &mut self,
        production: usize,
        lhs: &str,
        args: Vec<ParseItem<R, Self::Value>>,
    ) -> Option<Self::Value>;
}

impl<R, A: ?Sized> SemanticActions<R> for &mut A
where
    A: SemanticActions<R>,
{
    type Value = A::Value;

    fn reduce(
        &mut self,
        production: usize,
        lhs: &str,
        args: Vec<ParseItem<R, Self::Value>>,
    ) -> Option<Self::Value> {
        (**self).reduce(production, lhs, args)
    }
}

type Rule<'a, R, V> = Box<dyn FnMut(Vec<ParseItem<R, V>>) -> Option<V> + 'a>;
type Uniform<'a, R, V> = Box<dyn FnMut(&str, Vec<ParseItem<R, V>>) -> Option<V> + 'a>;

/// Semantic actions stored as closures.
///
/// The `n`-th closure registered with [`rule`](Self::rule) handles the
/// production whose code is `n`.
pub struct ActionList<'a, R, V> {
    kind: ActionListKind<'a, R, V>,
}

enum ActionListKind<'a, R, V> {
    Indexed(Vec<Rule<'a, R, V>>),
    Uniform(Uniform<'a, R, V>),
}

impl<'a, R, V> ActionList<'a, R, V> {
    pub fn new() -> Self {
        Self {
            kind: ActionListKind::Indexed(vec![]),
        }
    }

    /// Use a single closure for every production.
    pub fn uniform<F>(f: F) -> Self
    where
        F: FnMut(&str, Vec<ParseItem<R, V>>) -> Option<V> + 'a,
    {
        Self {
            kind: ActionListKind::Uniform(Box::new(f)),
        }
    }

    /// Append the action for the next production code.
    pub fn rule<F>(mut self, f: F) -> Self
    where
        F: FnMut(Vec<ParseItem<R, V>>) -> Option<V> + 'a,
    {
        match &mut self.kind {
            ActionListKind::Indexed(rules) => rules.push(Box::new(f)),
            ActionListKind::Uniform(..) => {
                self.kind = ActionListKind::Indexed(vec![Box::new(f)]);
            }
        }
        self
    }

    pub fn len(&self) -> Option<usize> {
        match &self.kind {
            ActionListKind::Indexed(rules) => Some(rules.len()),
            ActionListKind::Uniform(..) => None,
        }
    }
}

impl<R, V> Default for ActionList<'_, R, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, V> fmt::Debug for ActionList<'_, R, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ActionListKind::Indexed(rules) => f
                .debug_struct("ActionList")
                .field("rules", &rules.len())
                .finish(),
            ActionListKind::Uniform(..) => f.debug_struct("ActionList").field("uniform", &true).finish(),
        }
    }
}

impl<R, V> SemanticActions<R> for ActionList<'_, R, V> {
    type Value = V;

    fn reduce(&mut self, production: usize, lhs: &str, args: Vec<ParseItem<R, V>>) -> Option<V> {
        match &mut self.kind {
            ActionListKind::Indexed(rules) => (rules.get_mut(production)?)(args),
            ActionListKind::Uniform(f) => f(lhs, args),
        }
    }
}

/// The semantic actions that build a [`Tree`] labeled with nonterminal names.
pub struct TreeBuilder<R> {
    _marker: PhantomData<fn(R)>,
}

impl<R> TreeBuilder<R> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<R> Default for TreeBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for TreeBuilder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeBuilder").finish()
    }
}

impl<R> SemanticActions<R> for TreeBuilder<R> {
    type Value = Tree<R>;

    fn reduce(&mut self, _: usize, lhs: &str, args: Vec<ParseItem<R, Tree<R>>>) -> Option<Tree<R>> {
        let children = args
            .into_iter()
            .map(|arg| match arg {
                ParseItem::T(raw) => Tree::Leaf(raw),
                ParseItem::N(node) => node,
            })
            .collect();
        Some(Tree::node(lhs, children))
    }
}
