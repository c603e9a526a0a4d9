//! FanC Compiler - Common Types and Utilities
//!
//! This crate contains shared types, error definitions, and utilities
//! used across all components of the FanC compiler.

pub mod error;
pub mod source_loc;
pub mod types;

pub use error::CompilerError;
pub use source_loc::SourceLocation;
pub use types::{Offset, TypeKind};

/// Raises an internal compiler error.
///
/// Internal errors are invariant violations inside the compiler itself and
/// are never reported as user diagnostics.
#[macro_export]
macro_rules! ice {
    ($($arg:tt)*) => {
        std::panic!("internal compiler error: {}", format_args!($($arg)*))
    }
}
