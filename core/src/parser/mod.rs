//! Source text to [`AstNode`](crate::ast::AstNode).
//!
//! A pest grammar (`expression.pest`) tokenizes the input and a Pratt parser
//! resolves precedence: `if ... then ... else` binds loosest, then `+ -`, then
//! `* /`. All binary operators are left associative.

mod error;
#[allow(clippy::module_inception)]
mod parser;
mod syntax;

pub use error::{ParseError, ParseErrorKind, convert_pest_error};
pub use parser::{DEFAULT_MAX_DEPTH, ExpressionParser, Rule, parse, parse_with_max_depth};
pub use syntax::Span;



#[cfg(test)]
mod rule_valid_test;
