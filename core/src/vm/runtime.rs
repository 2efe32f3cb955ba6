use tracing::{debug, trace};

use crate::{
    evaluator::eval_binary,
    ir::{Instruction, OpCode, Program},
    vm::{ExecutionError, Stack},
};

pub struct Vm<'a> {
    program: &'a Program,
    ip: usize,
    stack: Stack<i64>,
}

impl<'a> Vm<'a> {
    pub fn new(program: &'a Program) -> Self {
        Vm {
            program,
            ip: 0,
            stack: Stack::new(program.max_stack_size),
        }
    }

    /// Run until `HALT` and return the value on top of the stack.
    pub fn run(&mut self) -> Result<i64, ExecutionError> {
        debug!(
            instructions = self.program.len(),
            max_stack_size = self.program.max_stack_size,
            "Running program"
        );
        let program = self.program;
        let instructions = program.instructions.as_slice();

        while let Some(instruction) = instructions.get(self.ip) {
            let ip = self.ip;
            self.ip += 1;

            let code = match instruction {
                Instruction::Op { code, .. } => *code,
                Instruction::Literal(text) => {
                    return Err(ExecutionError::UnexpectedLiteral {
                        ip,
                        text: text.clone(),
                    });
                }
            };
            trace!(ip, op = code.mnemonic(), depth = self.stack.len(), "step");

            match code {
                OpCode::Push => {
                    let value = self.read_literal()?;
                    if self.stack.is_full() {
                        return Err(ExecutionError::StackOverflow {
                            ip,
                            max_size: self.stack.max_size(),
                        });
                    }
                    self.stack.push(value);
                }
                OpCode::Halt => {
                    let result = self.pop(ip)?;
                    debug!(result, "Program halted");
                    return Ok(result);
                }
                OpCode::Nop => {
                    return Err(ExecutionError::InvalidInstruction {
                        ip,
                        mnemonic: instruction.text().to_string(),
                    });
                }
                OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div => {
                    // First pop is the left operand.
                    let left = self.pop(ip)?;
                    let right = self.pop(ip)?;
                    let op = code.operator().ok_or_else(|| ExecutionError::InvalidInstruction {
                        ip,
                        mnemonic: instruction.text().to_string(),
                    })?;
                    let value = eval_binary(op, left, right)
                        .map_err(|source| ExecutionError::Arithmetic { ip, source })?;
                    self.stack.push(value);
                }
            }
        }

        Err(ExecutionError::MissingHalt)
    }

    fn pop(&mut self, ip: usize) -> Result<i64, ExecutionError> {
        self.stack.pop().ok_or(ExecutionError::StackUnderflow { ip })
    }

    fn read_literal(&mut self) -> Result<i64, ExecutionError> {
        let ip = self.ip;
        let program = self.program;
        let instruction = program
            .instructions
            .get(ip)
            .ok_or(ExecutionError::MissingHalt)?;
        self.ip += 1;

        match instruction {
            Instruction::Literal(text) => {
                text.parse()
                    .map_err(|_| ExecutionError::MalformedLiteral {
                        ip,
                        text: text.clone(),
                    })
            }
            Instruction::Op { .. } => Err(ExecutionError::MissingLiteral {
                ip,
                found: instruction.text().to_string(),
            }),
        }
    }
}
