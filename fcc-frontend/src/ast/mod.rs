//! Parsed FanC programs
//!
//! This module defines the tree a FanC parser hands to the compiler core.
//! It is plain data: no types are resolved and no scopes are checked.
//! [`crate::semantic::SemanticAnalyzer::analyze_program`] replays it through
//! the node-construction API to produce the analyzed [`crate::syntax`] tree.

pub mod expressions;
pub mod ops;
pub mod statements;

// Re-export commonly used types at module level
pub use expressions::{Expression, ExpressionKind, Literal};
pub use ops::{BinaryOp, RelationalOp};
pub use statements::{FunctionDefinition, Parameter, Program, Statement, StatementKind};

use fcc_common::TypeKind;
use serde::{Deserialize, Serialize};

/// A type keyword spelled in source, such as `int` or `void`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(pub String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn resolve(&self) -> TypeKind {
        TypeKind::parse(&self.0)
    }
}
