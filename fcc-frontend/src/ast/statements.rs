//! Statement nodes and function definitions of the parsed program

use super::expressions::Expression;
use super::TypeName;
use fcc_common::SourceLocation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatementKind {
    /// `T x;` or `T x = value;`
    Declaration {
        ty: TypeName,
        name: String,
        initializer: Option<Expression>,
    },

    /// `x = value;`
    Assignment { name: String, value: Expression },

    /// Expression evaluated for its side effects, normally a call
    Expression(Expression),

    If {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },

    While {
        condition: Expression,
        body: Box<Statement>,
    },

    Break,

    Continue,

    Return(Option<Expression>),

    /// `{ ... }`
    Block(Vec<Statement>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub ty: TypeName,
    pub name: String,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub return_type: TypeName,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub body: Vec<Statement>,
    #[serde(default)]
    pub location: SourceLocation,
}

/// A whole source file: function definitions in source order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub functions: Vec<FunctionDefinition>,
}

impl Statement {
    pub fn new(kind: StatementKind, location: SourceLocation) -> Self {
        Self { kind, location }
    }
}
