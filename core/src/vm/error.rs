//! Errors raised while running a program on the VM.

use miette::Diagnostic;
use thiserror::Error;

use crate::evaluator::EvalError;

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ExecutionError {
    #[error("stack underflow at instruction {ip}")]
    #[diagnostic(code(stutter::vm::stack_underflow))]
    StackUnderflow { ip: usize },

    #[error("stack overflow at instruction {ip}: program declared a maximum of {max_size}")]
    #[diagnostic(code(stutter::vm::stack_overflow))]
    StackOverflow { ip: usize, max_size: usize },

    #[error("instruction {ip}: {mnemonic} is not executable")]
    #[diagnostic(code(stutter::vm::invalid_instruction))]
    InvalidInstruction { ip: usize, mnemonic: String },

    #[error("instruction {ip}: literal `{text}` is not preceded by PUSH")]
    #[diagnostic(code(stutter::vm::unexpected_literal))]
    UnexpectedLiteral { ip: usize, text: String },

    #[error("instruction {ip}: PUSH needs a literal, found {found}")]
    #[diagnostic(code(stutter::vm::missing_literal))]
    MissingLiteral { ip: usize, found: String },

    #[error("instruction {ip}: `{text}` is not a valid 64-bit integer")]
    #[diagnostic(code(stutter::vm::malformed_literal))]
    MalformedLiteral { ip: usize, text: String },

    #[error("program ended without HALT")]
    #[diagnostic(
        code(stutter::vm::missing_halt),
        help("Every program must end with a HALT instruction")
    )]
    MissingHalt,

    #[error("instruction {ip}: {source}")]
    #[diagnostic(code(stutter::vm::arithmetic))]
    Arithmetic {
        ip: usize,
        #[source]
        source: EvalError,
    },
}
