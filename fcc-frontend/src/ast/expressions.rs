//! Expression nodes of the parsed program

use super::ops::{BinaryOp, RelationalOp};
use super::TypeName;
use fcc_common::SourceLocation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    #[serde(default)]
    pub location: SourceLocation,
}

/// Literal token as written in source
///
/// Numeric literals keep their digit text; range checking happens during
/// semantic analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int(String),
    /// digits of a `<n>b` literal, without the suffix
    Byte(String),
    Bool(bool),
    /// contents between the quotes
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpressionKind {
    Literal(Literal),

    Identifier(String),

    Call {
        name: String,
        arguments: Vec<Expression>,
    },

    Not(Box<Expression>),

    And {
        left: Box<Expression>,
        right: Box<Expression>,
    },

    Or {
        left: Box<Expression>,
        right: Box<Expression>,
    },

    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    Relational {
        op: RelationalOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// `(type) operand`
    Cast {
        target: TypeName,
        operand: Box<Expression>,
    },

    /// `then_value if condition else else_value`
    Conditional {
        condition: Box<Expression>,
        then_value: Box<Expression>,
        else_value: Box<Expression>,
    },
}

impl Expression {
    pub fn new(kind: ExpressionKind, location: SourceLocation) -> Self {
        Self { kind, location }
    }
}
