//! Stutter core: expression trees and the code generators that lower them.
//!
//! The pipeline is `parser` → [`ast::AstNode`] → one of the backends in
//! [`compiler`]:
//!
//! - [`compiler::StackCompiler`] produces a [`ir::Program`] for the stack
//!   machine in [`vm`].
//! - [`compiler::InlineCompiler`] renders the tree as a C expression wrapped in
//!   a complete translation unit.
//!
//! [`buffer::GrowString`] and [`sequence::Sequence`] are the containers the
//! backends accumulate their output in.

pub mod ast;
pub mod buffer;
pub mod compiler;
pub mod evaluator;
pub mod ir;
pub mod parser;
pub mod sequence;
pub mod vm;
