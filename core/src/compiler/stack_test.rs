//! Tests for the stack-machine backend.

use crate::{
    ast::{AstNode, Operator, Value, ValueKind},
    compiler::{CompileError, StackCompiler},
    evaluator::{EvalError, evaluate},
    ir::{Instruction, OpCode, Program},
    vm::{ExecutionError, Vm},
};
use pretty_assertions::assert_eq;

fn lines(program: &Program) -> Vec<&str> {
    program.instructions.iter().map(Instruction::text).collect()
}

fn op(op: Operator, left: AstNode, right: AstNode) -> AstNode {
    AstNode::operator(op, left, right)
}

fn n(value: i64) -> AstNode {
    AstNode::number(value)
}

/// Compile, run on the VM and compare against direct evaluation.
fn run_both(tree: &AstNode) -> Result<i64, ExecutionError> {
    let program = StackCompiler::compile(tree).unwrap();
    let vm_result = Vm::new(&program).run();
    match (&vm_result, evaluate(tree)) {
        (Ok(a), Ok(b)) => assert_eq!(*a, b),
        (Err(ExecutionError::Arithmetic { source, .. }), Err(expected)) => {
            assert_eq!(*source, expected)
        }
        (vm, eval) => panic!("VM returned {vm:?} but evaluator returned {eval:?}"),
    }
    vm_result
}

#[test]
fn test_single_leaf() {
    let program = StackCompiler::compile(&n(7)).unwrap();
    assert_eq!(lines(&program), vec!["PUSH", "7", "HALT"]);
    assert_eq!(program.max_stack_size, 1);
    assert_eq!(Vm::new(&program).run(), Ok(7));
}

#[test]
fn test_right_operand_first() {
    let program = StackCompiler::compile(&op(Operator::Sub, n(3), n(4))).unwrap();
    assert_eq!(lines(&program), vec!["PUSH", "4", "PUSH", "3", "SUB", "HALT"]);
    assert_eq!(Vm::new(&program).run(), Ok(-1));
}

#[test]
fn test_nested_tree() {
    crate::test_utils::init_test_logging();

    // (1 + 2) * (10 - 4)
    let tree = op(
        Operator::Mul,
        op(Operator::Add, n(1), n(2)),
        op(Operator::Sub, n(10), n(4)),
    );
    let program = StackCompiler::compile(&tree).unwrap();
    assert_eq!(
        program.to_string(),
        "PUSH\n4\nPUSH\n10\nSUB\nPUSH\n2\nPUSH\n1\nADD\nMUL\nHALT\n"
    );
    assert_eq!(program.max_stack_size, 3);
    assert_eq!(run_both(&tree), Ok(18));
}

#[test]
fn test_negative_literal() {
    let program = StackCompiler::compile(&op(Operator::Add, n(-5), n(2))).unwrap();
    assert_eq!(lines(&program), vec!["PUSH", "2", "PUSH", "-5", "ADD", "HALT"]);
    assert_eq!(Vm::new(&program).run(), Ok(-3));
}

#[test]
fn test_every_push_has_literal_and_one_halt() {
    let tree = op(
        Operator::Div,
        op(Operator::Mul, n(6), op(Operator::Sub, n(9), n(2))),
        op(Operator::Add, n(1), n(1)),
    );
    let program = StackCompiler::compile(&tree).unwrap();
    let items = program.instructions.as_slice();

    for (i, instruction) in items.iter().enumerate() {
        if instruction.is_push() {
            assert!(matches!(items.get(i + 1), Some(Instruction::Literal(_))));
        }
        if let Instruction::Literal(_) = instruction {
            assert!(items[i - 1].is_push());
        }
    }
    let halts = items
        .iter()
        .filter(|i| i.code() == Some(OpCode::Halt))
        .count();
    assert_eq!(halts, 1);
    assert_eq!(items.last().and_then(Instruction::code), Some(OpCode::Halt));
    assert_eq!(run_both(&tree), Ok(21));
}

#[test]
fn test_left_leaning_chain_stays_shallow() {
    let mut tree = n(0);
    for i in 1..=50 {
        tree = op(Operator::Add, tree, n(i));
    }
    let program = StackCompiler::compile(&tree).unwrap();
    assert_eq!(program.max_stack_size, 2);
    assert_eq!(run_both(&tree), Ok(1275));
}

#[test]
fn test_division_by_zero_matches_evaluator() {
    let tree = op(Operator::Div, n(10), op(Operator::Sub, n(2), n(2)));
    assert!(matches!(
        run_both(&tree),
        Err(ExecutionError::Arithmetic {
            source: EvalError::DivisionByZero,
            ..
        })
    ));
}

#[test]
fn test_noop_emits_nop() {
    let program = StackCompiler::compile(&op(Operator::NoOp, n(1), n(2))).unwrap();
    assert_eq!(lines(&program), vec!["PUSH", "2", "PUSH", "1", "NOP", "HALT"]);
    assert!(matches!(
        Vm::new(&program).run(),
        Err(ExecutionError::InvalidInstruction { .. })
    ));
}

#[test]
fn test_conditional_is_rejected() {
    let tree = op(
        Operator::Add,
        n(1),
        AstNode::conditional(AstNode::leaf(Value::Boolean(true)), n(2), n(3)),
    );
    assert!(matches!(
        StackCompiler::compile(&tree),
        Err(CompileError::UnsupportedConstruct {
            construct: "conditional"
        })
    ));
}

#[test]
fn test_non_number_leaf_is_rejected() {
    let tree = op(Operator::Add, n(1), AstNode::leaf(Value::Real(1.5)));
    assert!(matches!(
        StackCompiler::compile(&tree),
        Err(CompileError::UnsupportedLiteral {
            kind: ValueKind::Real,
            backend: "stack"
        })
    ));
}

#[test]
fn test_printed_program_reads_back() {
    let tree = op(Operator::Mul, n(-3), op(Operator::Add, n(4), n(5)));
    let program = StackCompiler::compile(&tree).unwrap();
    let reparsed = Program::parse_text(&program.to_string()).unwrap();
    assert_eq!(reparsed.instructions, program.instructions);
    assert_eq!(Vm::new(&reparsed).run(), Ok(-27));
}

#[test]
fn test_long_chain() {
    let mut tree = n(1);
    for _ in 0..200_000 {
        tree = op(Operator::Add, tree, n(1));
    }
    let program = StackCompiler::compile(&tree).unwrap();
    assert_eq!(program.len(), 2 * 200_001 + 200_000 + 1);
    assert_eq!(program.max_stack_size, 200_001);
    assert_eq!(Vm::new(&program).run(), Ok(200_001));
}
