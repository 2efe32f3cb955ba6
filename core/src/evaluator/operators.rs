//! Integer arithmetic shared by the evaluator and the VM.

use crate::{ast::Operator, evaluator::EvalError};

/// Apply `op` to two integers.
///
/// Overflow and division by zero are errors; division truncates toward zero.
pub fn eval_binary(op: Operator, left: i64, right: i64) -> Result<i64, EvalError> {
    let result = match op {
        Operator::Add => left.checked_add(right),
        Operator::Sub => left.checked_sub(right),
        Operator::Mul => left.checked_mul(right),
        Operator::Div => {
            if right == 0 {
                return Err(EvalError::DivisionByZero);
            }
            // Only i64::MIN / -1 can fail here.
            left.checked_div(right)
        }
        Operator::NoOp => return Err(EvalError::NoOperation),
    };
    result.ok_or(EvalError::Overflow { op })
}
