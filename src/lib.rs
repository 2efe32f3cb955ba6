//! Stutter - compile arithmetic expression trees to a stack machine or to C
//!
//! # Overview
//!
//! Stutter lowers expression trees built from integer literals and the
//! operators `+ - * /` into one of two targets:
//!
//! - **Stack machine**: newline-separated instructions (`PUSH`, `ADD`, ...,
//!   `HALT`) runnable on the reference [`Vm`].
//! - **C**: a translation unit that prints the value of the expression as a
//!   single fully parenthesized C expression.
//!
//! # Quick Start
//!
//! ```
//! use stutter::{BackendKind, compile_source};
//!
//! let program = compile_source("3 - 4", BackendKind::Stack).unwrap();
//! assert_eq!(program, "PUSH\n4\nPUSH\n3\nSUB\nHALT\n");
//!
//! assert_eq!(stutter::run_source("(1 + 2) * (10 - 4)").unwrap(), 18);
//! ```
//!
//! Trees can also be built directly with [`AstNode`] constructors and passed
//! to [`compiler::compile`].

mod error_renderer;

use miette::Diagnostic;
use thiserror::Error;

pub use stutter_core::{ast, buffer, compiler, evaluator, ir, parser, sequence, vm};

pub use stutter_core::ast::{AstError, AstKind, AstNode, Operator, Value, ValueKind};
pub use stutter_core::buffer::{BufferError, GrowString};
pub use stutter_core::compiler::{
    Backend, BackendKind, CompileError, CompileOptions, InlineCompiler, StackCompiler,
};
pub use stutter_core::evaluator::{EvalError, evaluate};
pub use stutter_core::ir::{Instruction, OpCode, Program};
pub use stutter_core::parser::{ParseError, ParseErrorKind};
pub use stutter_core::sequence::{Sequence, SequenceError};
pub use stutter_core::vm::{ExecutionError, Vm};

pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};

/// Any failure on the way from source text to a result.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// The source did not parse; `input` is kept for rendering.
    #[error("{error}")]
    #[diagnostic(code(stutter::parse))]
    Parse { error: ParseError, input: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Execution(#[from] ExecutionError),
}

impl Error {
    fn parse(error: ParseError, input: &str) -> Self {
        Error::Parse {
            error,
            input: input.to_string(),
        }
    }
}

/// Parse `source` and compile it with `backend`.
pub fn compile_source(source: &str, backend: BackendKind) -> Result<String, Error> {
    let tree = parser::parse(source).map_err(|e| Error::parse(e, source))?;
    Ok(compiler::compile(&tree, &CompileOptions::new(backend))?)
}

/// Parse `source`, compile it for the stack machine and run it.
pub fn run_source(source: &str) -> Result<i64, Error> {
    let tree = parser::parse(source).map_err(|e| Error::parse(e, source))?;
    let program = StackCompiler::compile(&tree)?;
    Ok(Vm::new(&program).run()?)
}
