//! Stack-machine code generation.

use tracing::{debug, trace, warn};

use crate::{
    ast::{AstNode, Value},
    compiler::{Backend, CompileError},
    ir::{Instruction, OpCode, Program, halt_program},
    sequence::Sequence,
};

/// Lowers an expression tree to stack-machine instructions.
///
/// Tracks the operand stack while emitting so the resulting program carries
/// its exact maximum depth.
pub struct StackCompiler {
    instructions: Sequence<Instruction>,

    /// Current stack depth during compilation
    current_stack_depth: usize,

    /// Maximum stack depth observed
    max_stack_size: usize,
}

impl StackCompiler {
    pub fn new() -> Self {
        Self {
            instructions: Sequence::new(),
            current_stack_depth: 0,
            max_stack_size: 0,
        }
    }

    /// Convenience method to compile a tree in one call.
    pub fn compile(node: &AstNode) -> Result<Program, CompileError> {
        Self::new().generate(node)
    }

    pub fn finalize(self) -> Program {
        Program {
            instructions: self.instructions,
            max_stack_size: self.max_stack_size,
        }
    }

    // === Stack Management ===

    fn push_stack(&mut self) {
        self.current_stack_depth += 1;
        if self.current_stack_depth > self.max_stack_size {
            self.max_stack_size = self.current_stack_depth;
        }
    }

    fn pop_stack_n(&mut self, n: usize) {
        debug_assert!(
            self.current_stack_depth >= n,
            "Stack underflow: trying to pop {} but depth is {}",
            n,
            self.current_stack_depth
        );
        self.current_stack_depth -= n;
    }

    // === Instruction Emission ===

    fn emit(&mut self, instruction: Instruction) -> Result<(), CompileError> {
        self.instructions.try_append(instruction)?;
        Ok(())
    }

    fn emit_node(&mut self, node: &AstNode) -> Result<(), CompileError> {
        let mut pending = vec![Step::Visit(node)];

        while let Some(step) = pending.pop() {
            match step {
                Step::Visit(AstNode::Leaf(Value::Number(n))) => {
                    trace!(value = n, "PUSH");
                    self.emit(Instruction::op(OpCode::Push))?;
                    self.emit(Instruction::literal(*n))?;
                    self.push_stack();
                }
                Step::Visit(AstNode::Leaf(other)) => {
                    warn!(kind = %other.kind(), "Unsupported literal");
                    return Err(CompileError::UnsupportedLiteral {
                        kind: other.kind(),
                        backend: "stack",
                    });
                }
                Step::Visit(AstNode::Operator { op, left, right }) => {
                    // Right first: the VM pops the left operand first.
                    pending.push(Step::Apply(OpCode::from(*op)));
                    pending.push(Step::Visit(left));
                    pending.push(Step::Visit(right));
                }
                Step::Visit(AstNode::Conditional { .. }) => {
                    warn!("Conditional expressions are not supported by the stack backend");
                    return Err(CompileError::UnsupportedConstruct {
                        construct: "conditional",
                    });
                }
                Step::Apply(code) => {
                    trace!(op = code.mnemonic(), depth = self.current_stack_depth, "emit");
                    self.emit(Instruction::op(code))?;
                    self.pop_stack_n(2);
                    self.push_stack();
                }
            }
        }
        Ok(())
    }
}

/// Pending work while lowering a tree.
enum Step<'a> {
    Visit(&'a AstNode),
    Apply(OpCode),
}

impl Default for StackCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for StackCompiler {
    type Output = Program;

    fn generate(mut self, node: &AstNode) -> Result<Program, CompileError> {
        debug!("Generating stack program");
        self.emit_node(node)?;
        halt_program(&mut self.instructions)?;
        self.pop_stack_n(1);

        let program = self.finalize();
        debug!(
            instructions = program.len(),
            max_stack_size = program.max_stack_size,
            "Stack program complete"
        );
        Ok(program)
    }
}
