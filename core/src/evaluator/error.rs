//! Evaluation errors.

use miette::Diagnostic;
use thiserror::Error;

use crate::ast::{Operator, ValueKind};

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum EvalError {
    #[error("division by zero")]
    #[diagnostic(code(stutter::eval::division_by_zero))]
    DivisionByZero,

    #[error("integer overflow in {op:?}")]
    #[diagnostic(code(stutter::eval::overflow))]
    Overflow { op: Operator },

    #[error("a no-op operator has no value")]
    #[diagnostic(code(stutter::eval::no_operation))]
    NoOperation,

    #[error("a {kind} leaf cannot be evaluated as a number")]
    #[diagnostic(code(stutter::eval::unsupported_value))]
    UnsupportedValue { kind: ValueKind },

    #[error("evaluation depth exceeds maximum of {max_depth} levels")]
    #[diagnostic(
        code(stutter::eval::depth_exceeded),
        help("Reduce nesting or simplify the expression")
    )]
    DepthExceeded { max_depth: usize },
}
