//! Source location tracking for error reporting
//!
//! Diagnostics only ever name the line of the originating token, but the
//! column is kept so the parser can hand over what it knows.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A location in a source file (line and column are 1-based)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

impl SourceLocation {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Create a location from a line number alone
    pub fn at_line(line: u32) -> Self {
        Self { line, column: 0 }
    }

    /// Create a dummy location for testing
    pub fn dummy() -> Self {
        Self::default()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.line)
    }
}
