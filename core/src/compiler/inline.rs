//! Inline C expression generation.

use tracing::{debug, trace, warn};

use crate::{
    ast::{AstNode, Value},
    buffer::GrowString,
    compiler::{Backend, CompileError},
};

/// Everything before the expression in the generated translation unit.
pub const PREAMBLE: &str = "#include <inttypes.h>\n\
#include <stdint.h>\n\
#include <stdio.h>\n\
\n\
int main(void) {\n    printf(\"%\" PRId64 \"\\n\", (int64_t)(";

/// Everything after the expression in the generated translation unit.
pub const EPILOGUE: &str = "));\n    return 0;\n}\n";

/// Renders an expression tree as a C expression.
///
/// Every operator node is parenthesized, so the C result always matches the
/// tree's structure regardless of C precedence. The left operand of each
/// operator is cast to `int64_t`, which makes C carry out every operation
/// in 64 bits instead of `int`.
#[derive(Debug, Default)]
pub struct InlineCompiler {
    nodes: usize,
}

/// Pending work while rendering a fragment.
enum Piece<'a> {
    Node(&'a AstNode),
    Text(&'static str),
}

impl InlineCompiler {
    pub fn new() -> Self {
        Self { nodes: 0 }
    }

    /// Compile `node` into a complete C translation unit.
    pub fn compile(node: &AstNode) -> Result<GrowString, CompileError> {
        Self::new().generate(node)
    }

    /// Render only the expression, without the surrounding boilerplate.
    pub fn fragment(&mut self, node: &AstNode) -> Result<GrowString, CompileError> {
        let mut out = GrowString::new()?;
        let mut pending = vec![Piece::Node(node)];

        while let Some(piece) = pending.pop() {
            let node = match piece {
                Piece::Text(text) => {
                    out.push_str(text)?;
                    continue;
                }
                Piece::Node(node) => node,
            };
            self.nodes += 1;

            match node {
                AstNode::Leaf(Value::Number(n)) => {
                    trace!(value = n, "literal");
                    out.push_str(&number_text(*n))?;
                }
                AstNode::Leaf(other) => {
                    warn!(kind = %other.kind(), "Unsupported literal");
                    return Err(CompileError::UnsupportedLiteral {
                        kind: other.kind(),
                        backend: "c",
                    });
                }
                AstNode::Operator { op, left, right } => {
                    let symbol = op.symbol().ok_or_else(|| {
                        warn!("No-op operator has no C equivalent");
                        CompileError::UnsupportedConstruct {
                            construct: "no-op operator",
                        }
                    })?;
                    out.push_str("((int64_t)")?;
                    pending.push(Piece::Text(")"));
                    pending.push(Piece::Node(right));
                    pending.push(Piece::Text(symbol));
                    pending.push(Piece::Node(left));
                }
                AstNode::Conditional { .. } => {
                    warn!("Conditional expressions are not supported by the C backend");
                    return Err(CompileError::UnsupportedConstruct {
                        construct: "conditional",
                    });
                }
            }
        }
        Ok(out)
    }
}

/// A literal padded with one space on each side.
fn number_text(n: i64) -> String {
    if n == i64::MIN {
        // `-9223372036854775808` is unary minus applied to an out-of-range constant in C.
        format!(" ({} - 1) ", i64::MIN + 1)
    } else {
        format!(" {n} ")
    }
}

impl Backend for InlineCompiler {
    type Output = GrowString;

    fn generate(mut self, node: &AstNode) -> Result<GrowString, CompileError> {
        debug!("Generating C expression");
        let fragment = self.fragment(node)?;

        let mut unit = GrowString::from_text(PREAMBLE)?;
        unit.concat(&fragment)?;
        unit.push_str(EPILOGUE)?;
        debug!(nodes = self.nodes, bytes = unit.len(), "C translation unit complete");
        Ok(unit)
    }
}
