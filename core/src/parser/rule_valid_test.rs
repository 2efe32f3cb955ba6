// Tests with valid expressions for each rule in the parser.

use crate::parser::{ExpressionParser, Rule};
use pest::Parser;
use pest::iterators::Pair;

fn contains_rule(pair: Pair<Rule>, target: Rule) -> bool {
    if pair.as_rule() == target {
        return true;
    }
    for inner in pair.into_inner() {
        if contains_rule(inner, target) {
            return true;
        }
    }
    false
}

macro_rules! rule_examples {
    ( $($rule:ident => [$($expr:expr),* $(,)?]),* $(,)? ) => {
        $(
            #[test]
            fn $rule() {
                let inputs = vec![$($expr),*];
                for input in inputs {
                    let result = ExpressionParser::parse(Rule::main, input)
                        .unwrap_or_else(|e| panic!("Failed to parse '{}': {}", input, e));
                    let root = result.into_iter().next().unwrap();
                    assert!(
                        contains_rule(root.clone(), Rule::$rule),
                        "Expected to find rule {:?} in parse tree for input '{}'",
                        Rule::$rule,
                        input
                    );
                }
            }
        )*
    };
}

rule_examples! {
    integer => ["42", "-99", "1_000", "0_1_0_0"],
    float => ["3.14", "-0.001", "1_000.0"],
    string => ["\"hello\"", "\"\"", "\"with spaces\""],
    boolean => ["true", "false"],
    ident => ["foo", "_bar123", "ifx", "elsewhere"],
    grouped => ["(1)", "((a + b))"],
    add => ["1 + 2", "a * (b + c)"],
    sub => ["1 - 2", "3-4"],
    mul => ["1 * 2", "a * ( b + c )"],
    div => ["1 / 2", "a/b"],
    if_op => ["if true then 1 else 0", "if x then y else z", "1 + (if a then b else c)"],
}
