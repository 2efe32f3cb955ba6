#![allow(dead_code)]

use once_cell::sync::Lazy;
use pretty_assertions::assert_eq;
use stutter::{
    AstNode, BackendKind, Error, InlineCompiler, Operator, compile_source, evaluate, parser,
    run_source,
};

/// One source expression checked against any of the expectations a
/// `test_case!` lists.
pub struct Case {
    pub input: &'static str,
}

impl Case {
    pub fn new(input: &'static str) -> Self {
        Self { input }
    }

    /// Stack-machine text, one instruction per line.
    pub fn stack(&self, expected: &str) {
        let actual = compile_source(self.input, BackendKind::Stack)
            .unwrap_or_else(|e| panic!("{:?} failed to compile: {e}", self.input));
        assert_eq!(actual, expected, "stack output for {:?}", self.input);
    }

    /// The C expression between the boilerplate.
    pub fn c(&self, expected: &str) {
        let tree = parser::parse(self.input).unwrap();
        let fragment = InlineCompiler::new().fragment(&tree).unwrap();
        assert_eq!(fragment.as_str(), expected, "C fragment for {:?}", self.input);

        let unit = compile_source(self.input, BackendKind::C).unwrap();
        assert!(unit.contains(expected));
    }

    /// Result of running on the VM, which must agree with direct evaluation.
    pub fn value(&self, expected: i64) {
        assert_eq!(run_source(self.input).unwrap(), expected, "VM result");
        let tree = parser::parse(self.input).unwrap();
        assert_eq!(evaluate(&tree), Ok(expected), "evaluator result");
    }

    /// Both backends fail with the diagnostic `code`.
    pub fn error(&self, code: &str) {
        for backend in [BackendKind::Stack, BackendKind::C] {
            let err = compile_source(self.input, backend)
                .expect_err("compilation should fail");
            assert_eq!(diagnostic_code(&err), code, "{backend} backend");
        }
    }
}

pub fn diagnostic_code(error: &Error) -> String {
    use miette::Diagnostic;
    error
        .code()
        .map(|code| code.to_string())
        .unwrap_or_default()
}

#[macro_export]
macro_rules! test_case {
    (
        $name:ident,
        input: $input:expr,
        $( $check:ident: $expected:expr ),* $(,)?
    ) => {
        #[test]
        fn $name() {
            let case = $crate::cases::Case::new($input);
            $( case.$check($expected); )*
        }
    };
}

fn n(value: i64) -> AstNode {
    AstNode::number(value)
}

fn op(op: Operator, left: AstNode, right: AstNode) -> AstNode {
    AstNode::operator(op, left, right)
}

/// Hand-built trees covering shapes the parser never produces on its own.
pub static TREES: Lazy<Vec<(&'static str, AstNode)>> = Lazy::new(|| {
    vec![
        ("leaf", n(7)),
        ("negative_leaf", n(-12)),
        ("sub", op(Operator::Sub, n(3), n(4))),
        ("div_truncates", op(Operator::Div, n(-7), n(2))),
        (
            "right_leaning",
            op(
                Operator::Sub,
                n(100),
                op(Operator::Sub, n(50), op(Operator::Sub, n(20), n(5))),
            ),
        ),
        (
            "balanced",
            op(
                Operator::Mul,
                op(Operator::Add, n(1), n(2)),
                op(Operator::Div, n(12), n(4)),
            ),
        ),
        (
            "division_by_zero",
            op(Operator::Div, n(1), op(Operator::Sub, n(4), n(4))),
        ),
        ("overflow", op(Operator::Mul, n(i64::MAX), n(2))),
        ("min_literal", op(Operator::Add, n(i64::MIN), n(1))),
    ]
});
