//! Direct tree-walking evaluation of expression trees.
//!
//! This is the reference the generated stack-machine code is checked
//! against: for every tree made of number leaves and arithmetic operators,
//! running the compiled program on the [`vm`](crate::vm) gives the same
//! result as [`evaluate`].
//!
//! Conditionals are evaluated here even though neither backend lowers them:
//! a boolean leaf condition is used as is, anything else is truthy when it
//! evaluates to a non-zero number.

mod error;
mod eval;
mod operators;

pub use error::EvalError;
pub use eval::Evaluator;
pub use operators::eval_binary;

use crate::ast::AstNode;

/// Default limit on evaluation recursion depth.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Evaluate a tree with the default depth limit.
pub fn evaluate(node: &AstNode) -> Result<i64, EvalError> {
    Evaluator::new(DEFAULT_MAX_DEPTH).eval(node)
}
