//! Reference stack machine for generated programs.
//!
//! [`Vm`] executes a [`Program`](crate::ir::Program) instruction by
//! instruction and returns the value on top of the stack at `HALT`. It exists
//! to check generated code, so anything a well-formed program never does
//! (a stray literal, a `NOP`, running off the end) is an error rather than
//! being skipped.

mod error;
mod runtime;
mod stack;

pub use error::ExecutionError;
pub use runtime::Vm;

pub(crate) use stack::Stack;
