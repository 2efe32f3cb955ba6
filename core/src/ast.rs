//! Expression trees.
//!
//! An [`AstNode`] is a leaf holding a [`Value`], a binary [`Operator`] node, or
//! a conditional. Every node owns its children, so a tree is always acyclic
//! and never shares nodes with another tree; dropping the root releases the
//! whole tree in post-order.

use core::{fmt, mem};

use miette::Diagnostic;
use thiserror::Error;
use tracing::trace;

/// Payload of a leaf node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(i64),
    Real(f64),
    Boolean(bool),
    String(String),
    Symbol(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Real,
    Boolean,
    String,
    Symbol,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::Real(_) => ValueKind::Real,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::String(_) => ValueKind::String,
            Value::Symbol(_) => ValueKind::Symbol,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Real(r) => write!(f, "{r:?}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::String(s) => write!(f, "\"{s}\""),
            Value::Symbol(s) => f.write_str(s),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Number => "number",
            ValueKind::Real => "real",
            ValueKind::Boolean => "boolean",
            ValueKind::String => "string",
            ValueKind::Symbol => "symbol",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    NoOp,
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    /// Infix symbol, or `None` for [`Operator::NoOp`].
    pub fn symbol(self) -> Option<&'static str> {
        match self {
            Operator::NoOp => None,
            Operator::Add => Some("+"),
            Operator::Sub => Some("-"),
            Operator::Mul => Some("*"),
            Operator::Div => Some("/"),
        }
    }
}

/// Node kinds, with the tags an external parser uses to name them.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AstKind {
    Conditional = 0,
    Operator = 1,
    Leaf = 2,
}

impl TryFrom<u8> for AstKind {
    type Error = AstError;

    fn try_from(tag: u8) -> Result<Self, AstError> {
        match tag {
            0 => Ok(AstKind::Conditional),
            1 => Ok(AstKind::Operator),
            2 => Ok(AstKind::Leaf),
            _ => Err(AstError::InvalidKind { tag }),
        }
    }
}

impl fmt::Display for AstKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AstKind::Conditional => "conditional",
            AstKind::Operator => "operator",
            AstKind::Leaf => "leaf",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum AstError {
    #[error("invalid node kind {tag}")]
    #[diagnostic(code(stutter::ast::invalid_kind))]
    InvalidKind { tag: u8 },

    #[error("cannot build {kind} node: {reason}")]
    #[diagnostic(code(stutter::ast::mismatched_fields))]
    MismatchedFields { kind: AstKind, reason: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    Leaf(Value),
    Operator {
        op: Operator,
        left: Box<AstNode>,
        right: Box<AstNode>,
    },
    Conditional {
        condition: Box<AstNode>,
        then_branch: Box<AstNode>,
        else_branch: Box<AstNode>,
    },
}

/// Loose fields handed over by a parser before the node kind is checked.
///
/// For conditionals `left` is the true branch and `right` the false branch.
#[derive(Debug, Default)]
pub struct NodeParts {
    pub value: Option<Value>,
    pub op: Option<Operator>,
    pub left: Option<Box<AstNode>>,
    pub condition: Option<Box<AstNode>>,
    pub right: Option<Box<AstNode>>,
}

impl AstNode {
    pub fn leaf(value: Value) -> Self {
        AstNode::Leaf(value)
    }

    pub fn number(n: i64) -> Self {
        AstNode::Leaf(Value::Number(n))
    }

    pub fn operator(op: Operator, left: AstNode, right: AstNode) -> Self {
        AstNode::Operator {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn conditional(condition: AstNode, then_branch: AstNode, else_branch: AstNode) -> Self {
        AstNode::Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }
    }

    /// Build a node from loose parts, checking they match `kind`.
    ///
    /// On failure every child already supplied in `parts` is dropped.
    pub fn from_parts(kind: AstKind, parts: NodeParts) -> Result<Self, AstError> {
        let mismatch = |reason| AstError::MismatchedFields { kind, reason };
        match kind {
            AstKind::Leaf => {
                if parts.left.is_some() || parts.condition.is_some() || parts.right.is_some() {
                    return Err(mismatch("a leaf cannot have children"));
                }
                if !matches!(parts.op, None | Some(Operator::NoOp)) {
                    return Err(mismatch("a leaf cannot carry an operator"));
                }
                let value = parts.value.ok_or_else(|| mismatch("missing leaf value"))?;
                Ok(AstNode::Leaf(value))
            }
            AstKind::Operator => {
                if parts.value.is_some() {
                    return Err(mismatch("an operator cannot carry a value"));
                }
                if parts.condition.is_some() {
                    return Err(mismatch("an operator cannot have a condition"));
                }
                let op = parts.op.ok_or_else(|| mismatch("missing operator"))?;
                match (parts.left, parts.right) {
                    (Some(left), Some(right)) => Ok(AstNode::Operator { op, left, right }),
                    _ => Err(mismatch("an operator needs both operands")),
                }
            }
            AstKind::Conditional => {
                if parts.value.is_some() {
                    return Err(mismatch("a conditional cannot carry a value"));
                }
                if !matches!(parts.op, None | Some(Operator::NoOp)) {
                    return Err(mismatch("a conditional cannot carry an operator"));
                }
                match (parts.condition, parts.left, parts.right) {
                    (Some(condition), Some(then_branch), Some(else_branch)) => {
                        Ok(AstNode::Conditional {
                            condition,
                            then_branch,
                            else_branch,
                        })
                    }
                    _ => Err(mismatch("a conditional needs a condition and both branches")),
                }
            }
        }
    }

    /// Like [`from_parts`](Self::from_parts) with a raw kind tag.
    pub fn from_raw_parts(tag: u8, parts: NodeParts) -> Result<Self, AstError> {
        let kind = AstKind::try_from(tag)?;
        Self::from_parts(kind, parts)
    }

    pub fn kind(&self) -> AstKind {
        match self {
            AstNode::Leaf(_) => AstKind::Leaf,
            AstNode::Operator { .. } => AstKind::Operator,
            AstNode::Conditional { .. } => AstKind::Conditional,
        }
    }

    /// Direct children, left to right (condition first for conditionals).
    pub fn children(&self) -> Vec<&AstNode> {
        match self {
            AstNode::Leaf(_) => Vec::new(),
            AstNode::Operator { left, right, .. } => vec![&**left, &**right],
            AstNode::Conditional {
                condition,
                then_branch,
                else_branch,
            } => vec![&**condition, &**then_branch, &**else_branch],
        }
    }

    /// Height of the tree; a lone leaf has depth 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((node, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            pending.extend(node.children().into_iter().map(|child| (child, depth + 1)));
        }
        deepest
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children());
        }
        count
    }

    pub fn contains_conditional(&self) -> bool {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            if let AstNode::Conditional { .. } = node {
                return true;
            }
            pending.extend(node.children());
        }
        false
    }

    /// Move every non-leaf child into `out`, leaving leaves in their place.
    fn detach_children(&mut self, out: &mut Vec<AstNode>) {
        let mut detach = |slot: &mut Box<AstNode>| {
            if !matches!(**slot, AstNode::Leaf(_)) {
                out.push(mem::replace(&mut **slot, AstNode::Leaf(Value::Boolean(false))));
            }
        };
        match self {
            AstNode::Leaf(_) => {}
            AstNode::Operator { left, right, .. } => {
                detach(left);
                detach(right);
            }
            AstNode::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                detach(condition);
                detach(then_branch);
                detach(else_branch);
            }
        }
    }
}

// Trees can be as deep as their input is long, so dropping uses a work list
// instead of recursion.
impl Drop for AstNode {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.detach_children(&mut pending);
        }
    }
}

/// Release the tree held in `slot`, leaving `None` behind.
///
/// Calling it again on the same slot does nothing.
pub fn destroy(slot: &mut Option<Box<AstNode>>) {
    if let Some(node) = slot.take() {
        trace!(kind = %node.kind(), "destroying tree");
        drop(node);
    }
}

/// Pending output while printing a tree.
enum Piece<'a> {
    Node(&'a AstNode),
    Text(&'static str),
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending = vec![Piece::Node(self)];
        while let Some(piece) = pending.pop() {
            let node = match piece {
                Piece::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
                Piece::Node(node) => node,
            };
            match node {
                AstNode::Leaf(value) => write!(f, "{value}")?,
                AstNode::Operator { op, left, right } => {
                    match op.symbol() {
                        Some(symbol) => {
                            f.write_str("(")?;
                            pending.push(Piece::Text(")"));
                            pending.push(Piece::Node(right));
                            pending.push(Piece::Text(" "));
                            pending.push(Piece::Text(symbol));
                            pending.push(Piece::Text(" "));
                        }
                        None => {
                            f.write_str("(nop ")?;
                            pending.push(Piece::Text(")"));
                            pending.push(Piece::Node(right));
                            pending.push(Piece::Text(" "));
                        }
                    }
                    pending.push(Piece::Node(left));
                }
                AstNode::Conditional {
                    condition,
                    then_branch,
                    else_branch,
                } => {
                    f.write_str("(if ")?;
                    pending.push(Piece::Text(")"));
                    pending.push(Piece::Node(else_branch));
                    pending.push(Piece::Text(" else "));
                    pending.push(Piece::Node(then_branch));
                    pending.push(Piece::Text(" then "));
                    pending.push(Piece::Node(condition));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> AstNode {
        // (1 + 2) * (10 - 4)
        AstNode::operator(
            Operator::Mul,
            AstNode::operator(Operator::Add, AstNode::number(1), AstNode::number(2)),
            AstNode::operator(Operator::Sub, AstNode::number(10), AstNode::number(4)),
        )
    }

    #[test]
    fn test_value_accessors_match_variant() {
        let value = Value::Number(42);
        assert_eq!(value.kind(), ValueKind::Number);
        assert_eq!(value.as_number(), Some(42));
        assert_eq!(value.as_real(), None);
        assert_eq!(value.as_bool(), None);

        let value = Value::Symbol("x".to_string());
        assert_eq!(value.as_symbol(), Some("x"));
        assert_eq!(value.as_str(), None);
    }

    #[test]
    fn test_constructors() {
        let tree = sample();
        assert_eq!(tree.kind(), AstKind::Operator);
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.node_count(), 7);
        assert!(!tree.contains_conditional());
        assert_eq!(tree.to_string(), "((1 + 2) * (10 - 4))");
    }

    #[test]
    fn test_display_nop_and_conditional() {
        let tree = AstNode::conditional(
            AstNode::operator(Operator::NoOp, AstNode::number(1), AstNode::number(2)),
            sample(),
            AstNode::leaf(Value::Boolean(false)),
        );
        assert_eq!(
            tree.to_string(),
            "(if (nop 1 2) then ((1 + 2) * (10 - 4)) else false)"
        );
    }

    #[test]
    fn test_very_deep_tree() {
        let mut tree = AstNode::number(1);
        for _ in 0..200_000 {
            tree = AstNode::operator(Operator::Add, tree, AstNode::number(1));
        }
        assert_eq!(tree.depth(), 200_001);
        assert_eq!(tree.node_count(), 400_001);
        assert!(!tree.contains_conditional());

        let text = tree.to_string();
        assert!(text.starts_with("(((("));
        assert!(text.ends_with("1 + 1) + 1)"));

        let mut slot = Some(Box::new(tree));
        destroy(&mut slot);
        assert!(slot.is_none());
    }

    #[test]
    fn test_from_parts_leaf() {
        let node = AstNode::from_parts(
            AstKind::Leaf,
            NodeParts {
                value: Some(Value::Number(7)),
                op: Some(Operator::NoOp),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(node, AstNode::number(7));
    }

    #[test]
    fn test_from_parts_operator() {
        let node = AstNode::from_parts(
            AstKind::Operator,
            NodeParts {
                op: Some(Operator::Sub),
                left: Some(Box::new(AstNode::number(3))),
                right: Some(Box::new(AstNode::number(4))),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            node,
            AstNode::operator(Operator::Sub, AstNode::number(3), AstNode::number(4))
        );
    }

    #[test]
    fn test_from_parts_conditional() {
        let node = AstNode::from_parts(
            AstKind::Conditional,
            NodeParts {
                condition: Some(Box::new(AstNode::leaf(Value::Boolean(true)))),
                left: Some(Box::new(AstNode::number(1))),
                right: Some(Box::new(AstNode::number(2))),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(node.contains_conditional());
        assert_eq!(node.to_string(), "(if true then 1 else 2)");
    }

    #[test]
    fn test_from_parts_rejects_mismatched_fields() {
        let err = AstNode::from_parts(
            AstKind::Operator,
            NodeParts {
                op: Some(Operator::Add),
                left: Some(Box::new(AstNode::number(1))),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(
            err,
            AstError::MismatchedFields {
                kind: AstKind::Operator,
                reason: "an operator needs both operands",
            }
        );

        let err = AstNode::from_parts(AstKind::Leaf, NodeParts::default()).unwrap_err();
        assert!(matches!(err, AstError::MismatchedFields { kind: AstKind::Leaf, .. }));

        let err = AstNode::from_parts(
            AstKind::Leaf,
            NodeParts {
                value: Some(Value::Number(1)),
                left: Some(Box::new(AstNode::number(2))),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, AstError::MismatchedFields { kind: AstKind::Leaf, .. }));
    }

    #[test]
    fn test_from_raw_parts_rejects_unknown_kind() {
        let err = AstNode::from_raw_parts(
            9,
            NodeParts {
                value: Some(Value::Number(1)),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(err, AstError::InvalidKind { tag: 9 });
        assert_eq!(err.to_string(), "invalid node kind 9");

        let node = AstNode::from_raw_parts(
            2,
            NodeParts {
                value: Some(Value::Number(1)),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(node, AstNode::number(1));
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut slot = Some(Box::new(sample()));
        destroy(&mut slot);
        assert!(slot.is_none());
        destroy(&mut slot);
        assert!(slot.is_none());
    }

    #[test]
    fn test_repeated_build_destroy_cycles() {
        for i in 0..1000 {
            let mut slot = Some(Box::new(AstNode::operator(
                Operator::Div,
                AstNode::number(i),
                sample(),
            )));
            destroy(&mut slot);
            destroy(&mut slot);
        }
    }
}
