//! Code generators for expression trees.
//!
//! Two backends implement [`Backend`]:
//!
//! - [`StackCompiler`] lowers a tree to a [`Program`](crate::ir::Program) for
//!   the stack machine. Operands are emitted right subtree first, so the VM's
//!   first pop yields the left operand.
//! - [`InlineCompiler`] renders the tree as a parenthesized C expression and
//!   wraps it in a translation unit that prints the value.
//!
//! Both are all-or-nothing: an unsupported construct anywhere in the tree
//! aborts the whole pass and nothing is returned.
//!
//! ## Design
//!
//! - Each compilation owns its compiler value; there is no shared state
//! - Allocation failures surface as [`CompileError`] instead of aborting
//! - Conditionals are rejected by both backends

mod error;
mod inline;
mod stack;

#[cfg(test)]
mod stack_test;

use core::fmt;
use core::str::FromStr;
use std::io::Write;

use tracing::debug;

pub use error::CompileError;
pub use inline::{EPILOGUE, InlineCompiler, PREAMBLE};
pub use stack::StackCompiler;

use crate::ast::AstNode;

/// A code generator consuming itself to produce one output.
pub trait Backend {
    type Output: fmt::Display;

    fn generate(self, node: &AstNode) -> Result<Self::Output, CompileError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Newline-separated stack-machine instructions.
    #[default]
    Stack,
    /// A C translation unit printing the expression's value.
    C,
}

impl BackendKind {
    pub const fn name(self) -> &'static str {
        match self {
            BackendKind::Stack => "stack",
            BackendKind::C => "c",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stack" => Ok(BackendKind::Stack),
            "c" => Ok(BackendKind::C),
            other => Err(format!(
                "unknown backend `{other}` (expected `stack` or `c`)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompileOptions {
    pub backend: BackendKind,
}

impl CompileOptions {
    pub fn new(backend: BackendKind) -> Self {
        Self { backend }
    }
}

/// Compile `node` with the backend selected in `options` and return its text.
pub fn compile(node: &AstNode, options: &CompileOptions) -> Result<String, CompileError> {
    debug!(backend = %options.backend, "Compiling expression");
    match options.backend {
        BackendKind::Stack => Ok(StackCompiler::new().generate(node)?.to_string()),
        BackendKind::C => Ok(InlineCompiler::new().generate(node)?.into_string()),
    }
}

/// Compile `node` and write the complete result to `output`.
///
/// Nothing is written when compilation fails.
pub fn compile_to(
    node: &AstNode,
    options: &CompileOptions,
    output: &mut impl Write,
) -> Result<(), CompileError> {
    let text = compile(node, options)?;
    output.write_all(text.as_bytes())?;
    output.flush()?;
    Ok(())
}
