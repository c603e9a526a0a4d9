//! Semantic analysis error definitions
//!
//! This module defines all error types that can occur during semantic analysis.
//! Each one aborts compilation; the display text is the one-line diagnostic.

use fcc_common::{CompilerError, SourceLocation, TypeKind};
use thiserror::Error;

/// Semantic analysis errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticError {
    #[error("line {location}: variable {name} is not defined")]
    UndefinedVariable {
        name: String,
        location: SourceLocation,
    },

    #[error("line {location}: function {name} is not defined")]
    UndefinedFunction {
        name: String,
        location: SourceLocation,
    },

    #[error("line {location}: identifier {name} is already defined")]
    Redefinition {
        name: String,
        location: SourceLocation,
    },

    #[error("line {location}: type mismatch")]
    TypeMismatch { location: SourceLocation },

    #[error(
        "line {location}: prototype mismatch, function {name} expects arguments ({})",
        type_list(.expected)
    )]
    PrototypeMismatch {
        name: String,
        expected: Vec<TypeKind>,
        location: SourceLocation,
    },

    #[error("line {location}: unexpected break statement")]
    UnexpectedBreak { location: SourceLocation },

    #[error("line {location}: unexpected continue statement")]
    UnexpectedContinue { location: SourceLocation },

    #[error("Program has no 'void main()' function")]
    MissingEntryPoint,

    #[error(
        "line {location}: {} value {text} out of range",
        .literal_type.to_string().to_lowercase()
    )]
    LiteralOutOfRange {
        literal_type: TypeKind,
        text: String,
        location: SourceLocation,
    },
}

fn type_list(types: &[TypeKind]) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl SemanticError {
    /// Source location the diagnostic refers to
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            SemanticError::UndefinedVariable { location, .. }
            | SemanticError::UndefinedFunction { location, .. }
            | SemanticError::Redefinition { location, .. }
            | SemanticError::TypeMismatch { location }
            | SemanticError::PrototypeMismatch { location, .. }
            | SemanticError::UnexpectedBreak { location }
            | SemanticError::UnexpectedContinue { location }
            | SemanticError::LiteralOutOfRange { location, .. } => Some(*location),
            SemanticError::MissingEntryPoint => None,
        }
    }
}

impl From<SemanticError> for CompilerError {
    fn from(err: SemanticError) -> Self {
        CompilerError::semantic_error(err.to_string(), err.location())
    }
}
