//! Stack-machine instructions and programs.
//!
//! # Text format
//!
//! A program prints as one instruction per line. Operations print their
//! mnemonic; a literal prints its decimal text on the line right after the
//! `PUSH` that consumes it:
//!
//! ```text
//! PUSH
//! 4
//! PUSH
//! 3
//! SUB
//! HALT
//! ```
//!
//! # Stack discipline
//!
//! `PUSH n`: `[...] -> [..., n]`
//!
//! `ADD`/`SUB`/`MUL`/`DIV`: the first pop is the left operand and the second
//! pop the right one, `[..., right, left] -> [..., left OP right]`.
//!
//! `HALT`: stops execution; the result is the top of the stack.

use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};

use miette::Diagnostic;
use thiserror::Error;

use crate::ast::Operator;
use crate::sequence::{Sequence, SequenceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    Nop,
    Halt,
    Add,
    Sub,
    Mul,
    Div,
    Push,
}

impl OpCode {
    pub const fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Nop => "NOP",
            OpCode::Halt => "HALT",
            OpCode::Add => "ADD",
            OpCode::Sub => "SUB",
            OpCode::Mul => "MUL",
            OpCode::Div => "DIV",
            OpCode::Push => "PUSH",
        }
    }

    pub fn from_mnemonic(text: &str) -> Option<Self> {
        match text {
            "NOP" => Some(OpCode::Nop),
            "HALT" => Some(OpCode::Halt),
            "ADD" => Some(OpCode::Add),
            "SUB" => Some(OpCode::Sub),
            "MUL" => Some(OpCode::Mul),
            "DIV" => Some(OpCode::Div),
            "PUSH" => Some(OpCode::Push),
            _ => None,
        }
    }

    /// The tree operator this opcode computes, if it is a binary operation.
    pub fn operator(self) -> Option<Operator> {
        match self {
            OpCode::Add => Some(Operator::Add),
            OpCode::Sub => Some(Operator::Sub),
            OpCode::Mul => Some(Operator::Mul),
            OpCode::Div => Some(Operator::Div),
            OpCode::Nop | OpCode::Halt | OpCode::Push => None,
        }
    }
}

impl From<Operator> for OpCode {
    fn from(op: Operator) -> Self {
        match op {
            Operator::NoOp => OpCode::Nop,
            Operator::Add => OpCode::Add,
            Operator::Sub => OpCode::Sub,
            Operator::Mul => OpCode::Mul,
            Operator::Div => OpCode::Div,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// An operation. Built-in mnemonics are borrowed, custom ones owned.
    Op {
        code: OpCode,
        mnemonic: Cow<'static, str>,
    },
    /// Decimal text of a number consumed by the preceding `PUSH`.
    Literal(String),
}

impl Instruction {
    pub fn op(code: OpCode) -> Self {
        Instruction::Op {
            code,
            mnemonic: Cow::Borrowed(code.mnemonic()),
        }
    }

    pub fn literal(value: i64) -> Self {
        Instruction::Literal(value.to_string())
    }

    pub fn code(&self) -> Option<OpCode> {
        match self {
            Instruction::Op { code, .. } => Some(*code),
            Instruction::Literal(_) => None,
        }
    }

    pub fn is_push(&self) -> bool {
        self.code() == Some(OpCode::Push)
    }

    /// The line this instruction prints as.
    pub fn text(&self) -> &str {
        match self {
            Instruction::Op { mnemonic, .. } => &**mnemonic,
            Instruction::Literal(text) => text.as_str(),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// A complete stack-machine program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub instructions: Sequence<Instruction>,
    /// Deepest the operand stack gets while running.
    pub max_stack_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ProgramError {
    #[error("line {line}: unknown instruction `{text}`")]
    #[diagnostic(code(stutter::ir::unknown_instruction))]
    UnknownInstruction { line: usize, text: String },

    #[error("line {line}: PUSH must be followed by a decimal literal")]
    #[diagnostic(code(stutter::ir::missing_literal))]
    MissingLiteral { line: usize },

    #[error("line {line}: `{text}` is not a valid 64-bit integer")]
    #[diagnostic(code(stutter::ir::malformed_literal))]
    MalformedLiteral { line: usize, text: String },
}

impl Program {
    /// Read a program back from its printed form.
    ///
    /// Blank lines are ignored. The maximum stack size is the number of
    /// `PUSH` instructions, which bounds the depth of any program.
    pub fn parse_text(text: &str) -> Result<Program, ProgramError> {
        let mut instructions = Sequence::new();
        let mut pushes = 0;
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        while let Some((line, word)) = lines.next() {
            let code = OpCode::from_mnemonic(word).ok_or_else(|| {
                ProgramError::UnknownInstruction {
                    line,
                    text: word.to_string(),
                }
            })?;
            instructions.append(Instruction::op(code));

            if code == OpCode::Push {
                let (line, literal) = lines.next().ok_or(ProgramError::MissingLiteral { line })?;
                if literal.parse::<i64>().is_err() {
                    return Err(ProgramError::MalformedLiteral {
                        line,
                        text: literal.to_string(),
                    });
                }
                instructions.append(Instruction::Literal(literal.to_string()));
                pushes += 1;
            }
        }

        Ok(Program {
            instructions,
            max_stack_size: pushes,
        })
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{instruction}")?;
        }
        Ok(())
    }
}

/// Terminate `program` with a `HALT`.
pub fn halt_program(program: &mut Sequence<Instruction>) -> Result<(), SequenceError> {
    program.try_append(Instruction::op(OpCode::Halt))?;
    Ok(())
}

/// Write every instruction of `program` on its own line.
pub fn print_program(output: &mut impl Write, program: &Sequence<Instruction>) -> io::Result<()> {
    for instruction in program {
        writeln!(output, "{}", instruction.text())?;
    }
    Ok(())
}
