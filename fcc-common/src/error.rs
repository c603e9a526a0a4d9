//! Error handling for the FanC compiler
//!
//! This module defines the error type that crosses crate boundaries.
//! Phase-specific errors convert into it.

use crate::source_loc::SourceLocation;
use thiserror::Error;

/// Main compiler error type that encompasses all phases of compilation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompilerError {
    /// A semantic error; `message` is the complete one-line diagnostic
    #[error("{message}")]
    Semantic {
        location: Option<SourceLocation>,
        message: String,
    },

    /// The parsed program handed to the compiler could not be decoded
    #[error("Invalid input: {message}")]
    Input { message: String },

    #[error("IO error: {message}")]
    Io { message: String },
}

impl CompilerError {
    /// Create a semantic error
    pub fn semantic_error(message: impl Into<String>, location: Option<SourceLocation>) -> Self {
        CompilerError::Semantic {
            location,
            message: message.into(),
        }
    }

    /// Create an input decoding error
    pub fn input_error(message: impl Into<String>) -> Self {
        CompilerError::Input {
            message: message.into(),
        }
    }

    /// Source line the error refers to, if any
    pub fn line(&self) -> Option<u32> {
        match self {
            CompilerError::Semantic { location, .. } => location.map(|loc| loc.line),
            _ => None,
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for CompilerError {
    fn from(err: std::io::Error) -> Self {
        CompilerError::Io {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_accept_borrowed_messages() {
        let err = CompilerError::input_error("empty input");
        assert_eq!(err.to_string(), "Invalid input: empty input");
        let err = CompilerError::semantic_error("line 1: type mismatch", None);
        assert_eq!(err.line(), None);
    }

    #[test]
    fn test_semantic_error_displays_message_verbatim() {
        let err = CompilerError::semantic_error(
            "line 3: type mismatch".to_string(),
            Some(SourceLocation::at_line(3)),
        );
        assert_eq!(err.to_string(), "line 3: type mismatch");
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CompilerError = io.into();
        assert!(matches!(err, CompilerError::Io { .. }));
        assert_eq!(err.line(), None);
    }
}
