use lazy_static::lazy_static;
use pest::Parser;
use pest::iterators::Pair;
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;
use tracing::debug;

use crate::ast::{AstNode, Operator, Value};
use crate::parser::{ParseError, ParseErrorKind, Span, convert_pest_error};

/// Default limit on expression nesting.
pub const DEFAULT_MAX_DEPTH: usize = 256;

lazy_static! {
    // Note: precedence is defined lowest to highest.
    static ref PRATT_PARSER: PrattParser<Rule> = PrattParser::new()
        // (lowest precedence)
        .op(Op::prefix(Rule::if_op))                     // `if`

        // Arithmetic operators.
        .op(
            Op::infix(Rule::add, Assoc::Left) |
            Op::infix(Rule::sub, Assoc::Left)
        )                                               // `+`, `-`
        .op(
            Op::infix(Rule::mul, Assoc::Left) |
            Op::infix(Rule::div, Assoc::Left)
        )                                               // `*`, `/`
        // (highest precedence)
        ;
}

#[derive(Parser)]
#[grammar = "parser/expression.pest"]
pub struct ExpressionParser;

fn missing_pair(pair: &Pair<Rule>, what: &str) -> ParseError {
    ParseError::new(
        ParseErrorKind::Other {
            message: format!("missing {what}"),
        },
        pair.as_span().into(),
    )
}

fn invalid_number(pair: &Pair<Rule>) -> ParseError {
    ParseError::new(
        ParseErrorKind::InvalidNumber {
            text: pair.as_str().to_string(),
        },
        pair.as_span().into(),
    )
}

pub fn parse_expr(pair: Pair<Rule>) -> Result<AstNode, ParseError> {
    match pair.as_rule() {
        Rule::main => {
            let inner = pair
                .clone()
                .into_inner()
                .next()
                .ok_or_else(|| missing_pair(&pair, "expression"))?;
            parse_expr(inner)
        }

        Rule::expression => PRATT_PARSER
            .map_primary(parse_expr)
            .map_prefix(|op, rhs| match op.as_rule() {
                Rule::if_op => {
                    let mut branches = op
                        .clone()
                        .into_inner()
                        .filter(|p| p.as_rule() == Rule::expression);
                    let condition = branches
                        .next()
                        .ok_or_else(|| missing_pair(&op, "condition"))?;
                    let then_branch = branches
                        .next()
                        .ok_or_else(|| missing_pair(&op, "then branch"))?;
                    Ok(AstNode::conditional(
                        parse_expr(condition)?,
                        parse_expr(then_branch)?,
                        rhs?,
                    ))
                }
                rule => Err(ParseError::new(
                    ParseErrorKind::Other {
                        message: format!("Unknown prefix operator: {rule:?}"),
                    },
                    op.as_span().into(),
                )),
            })
            .map_infix(|lhs, op, rhs| {
                let operator = match op.as_rule() {
                    Rule::add => Operator::Add,
                    Rule::sub => Operator::Sub,
                    Rule::mul => Operator::Mul,
                    Rule::div => Operator::Div,
                    rule => {
                        return Err(ParseError::new(
                            ParseErrorKind::Other {
                                message: format!("Unknown binary operator: {rule:?}"),
                            },
                            op.as_span().into(),
                        ));
                    }
                };
                Ok(AstNode::operator(operator, lhs?, rhs?))
            })
            .parse(pair.into_inner()),

        Rule::integer => {
            let value = pair
                .as_str()
                .replace('_', "")
                .parse::<i64>()
                .map_err(|_| invalid_number(&pair))?;
            Ok(AstNode::leaf(Value::Number(value)))
        }

        Rule::float => {
            let value = pair
                .as_str()
                .replace('_', "")
                .parse::<f64>()
                .map_err(|_| invalid_number(&pair))?;
            if !value.is_finite() {
                return Err(invalid_number(&pair));
            }
            Ok(AstNode::leaf(Value::Real(value)))
        }

        Rule::boolean => Ok(AstNode::leaf(Value::Boolean(pair.as_str() == "true"))),

        Rule::string => {
            let s = pair.as_str();
            let inner = &s[1..s.len() - 1];
            Ok(AstNode::leaf(Value::String(inner.to_string())))
        }

        Rule::grouped => {
            let inner = pair
                .clone()
                .into_inner()
                .next()
                .ok_or_else(|| missing_pair(&pair, "grouped expression"))?;
            parse_expr(inner)
        }

        Rule::ident => Ok(AstNode::leaf(Value::Symbol(pair.as_str().to_string()))),

        rule => Err(ParseError::new(
            ParseErrorKind::Other {
                message: format!("Unhandled rule: {rule:?}"),
            },
            pair.as_span().into(),
        )),
    }
}

/// Parse `source` into a tree, with nesting limited to [`DEFAULT_MAX_DEPTH`].
pub fn parse(source: &str) -> Result<AstNode, ParseError> {
    parse_with_max_depth(source, DEFAULT_MAX_DEPTH)
}

/// Parse `source` into a tree nested at most `max_depth` levels deep.
///
/// Parentheses and `if` count as nesting. A flat chain such as `1 + 1 + 1`
/// is not nested, however long it is.
pub fn parse_with_max_depth(source: &str, max_depth: usize) -> Result<AstNode, ParseError> {
    // Nesting recurses inside pest and the Pratt parser before any tree exists.
    check_nesting(source, max_depth)?;

    let mut pairs = ExpressionParser::parse(Rule::main, source).map_err(convert_pest_error)?;
    let pair = pairs.next().ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::Other {
                message: "missing expected pair in rule".to_string(),
            },
            Span::new(0, source.len()),
        )
    })?;
    let tree = parse_expr(pair)?;
    debug!(bytes = source.len(), "Parsed expression");
    Ok(tree)
}

/// Scan for nesting deeper than `max_depth`, skipping strings and comments.
///
/// An `if` stays open until the group around it closes, since its `else`
/// branch extends to the end of that group.
fn check_nesting(source: &str, max_depth: usize) -> Result<(), ParseError> {
    let bytes = source.as_bytes();
    // Open `if`s in each enclosing group.
    let mut groups = vec![0usize];
    let mut depth = 0usize;
    let mut pos = 0;

    while pos < bytes.len() {
        let width = match bytes[pos] {
            b'"' => {
                pos = source[pos + 1..]
                    .find('"')
                    .map_or(bytes.len(), |end| pos + end + 2);
                continue;
            }
            b'#' => {
                pos = source[pos..].find('\n').map_or(bytes.len(), |end| pos + end);
                continue;
            }
            b'(' => {
                groups.push(0);
                depth += 1;
                1
            }
            b')' => {
                if groups.len() > 1 {
                    let ifs = groups.pop().unwrap_or(0);
                    depth -= ifs + 1;
                }
                pos += 1;
                continue;
            }
            b'i' if keyword_at(bytes, pos, b"if") => {
                if let Some(ifs) = groups.last_mut() {
                    *ifs += 1;
                }
                depth += 1;
                2
            }
            _ => {
                pos += 1;
                continue;
            }
        };

        if depth > max_depth {
            return Err(ParseError::new(
                ParseErrorKind::MaxDepthExceeded { depth, max_depth },
                Span::new(pos, pos + width),
            ));
        }
        pos += width;
    }
    Ok(())
}

fn keyword_at(bytes: &[u8], pos: usize, word: &[u8]) -> bool {
    let is_ident = |b: &u8| b.is_ascii_alphanumeric() || *b == b'_';
    bytes[pos..].starts_with(word)
        && (pos == 0 || !is_ident(&bytes[pos - 1]))
        && !bytes.get(pos + word.len()).is_some_and(is_ident)
}
