use tracing::trace;

use crate::{
    ast::{AstNode, Value},
    evaluator::{EvalError, eval_binary},
};

/// Tree-walking evaluator with a recursion limit.
pub struct Evaluator {
    depth: usize,
    max_depth: usize,
}

impl Evaluator {
    pub fn new(max_depth: usize) -> Self {
        Self {
            depth: 0,
            max_depth,
        }
    }

    pub fn eval(&mut self, node: &AstNode) -> Result<i64, EvalError> {
        if self.depth >= self.max_depth {
            return Err(EvalError::DepthExceeded {
                max_depth: self.max_depth,
            });
        }
        self.depth += 1;
        let result = self.eval_inner(node);
        self.depth -= 1;
        result
    }

    fn eval_inner(&mut self, node: &AstNode) -> Result<i64, EvalError> {
        match node {
            AstNode::Leaf(value) => value
                .as_number()
                .ok_or(EvalError::UnsupportedValue { kind: value.kind() }),
            AstNode::Operator { op, left, right } => {
                // Right operand first, in the order generated stack code runs.
                let right = self.eval(right)?;
                let left = self.eval(left)?;
                eval_binary(*op, left, right)
            }
            AstNode::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                let taken = self.truthy(condition)?;
                trace!(taken, "conditional");
                if taken {
                    self.eval(then_branch)
                } else {
                    self.eval(else_branch)
                }
            }
        }
    }

    fn truthy(&mut self, node: &AstNode) -> Result<bool, EvalError> {
        match node {
            AstNode::Leaf(Value::Boolean(b)) => Ok(*b),
            _ => Ok(self.eval(node)? != 0),
        }
    }
}
