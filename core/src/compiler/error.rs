//! Code generation errors.

use std::io;

use miette::Diagnostic;
use thiserror::Error;

use crate::{ast::ValueKind, buffer::BufferError, sequence::SequenceError};

#[derive(Debug, Error, Diagnostic)]
pub enum CompileError {
    #[error("{construct} cannot be compiled")]
    #[diagnostic(
        code(stutter::compile::unsupported_construct),
        help("Only arithmetic on integer literals can be compiled")
    )]
    UnsupportedConstruct { construct: &'static str },

    #[error("the {backend} backend cannot emit a {kind} literal")]
    #[diagnostic(
        code(stutter::compile::unsupported_literal),
        help("Only integer literals can be compiled")
    )]
    UnsupportedLiteral {
        kind: ValueKind,
        backend: &'static str,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Buffer(#[from] BufferError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Sequence(#[from] SequenceError),

    #[error("failed to write output: {0}")]
    #[diagnostic(code(stutter::compile::io))]
    Io(#[from] io::Error),
}
