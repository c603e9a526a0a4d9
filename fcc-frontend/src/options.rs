//! Compilation options

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Prepend the runtime library (`print`, `printi`, division error handler);
    /// when off, the runtime functions are only declared
    pub emit_runtime: bool,
    /// Spaces per indentation level in the emitted IR
    pub indent_width: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            emit_runtime: true,
            indent_width: 4,
        }
    }
}
