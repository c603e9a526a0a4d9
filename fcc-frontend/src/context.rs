//! Per-compilation mutable state
//!
//! One context holds everything a compilation mutates while it builds and
//! emits the tree, so independent compilations never share counters or
//! scopes.

use crate::codegen::{CodeBuffer, IrNamer};
use crate::semantic::SymbolTable;
use crate::CompileOptions;

#[derive(Debug, Clone)]
pub struct CompilationContext {
    pub buffer: CodeBuffer,
    pub namer: IrNamer,
    pub symbols: SymbolTable,
}

impl CompilationContext {
    pub fn new(options: &CompileOptions) -> Self {
        Self {
            buffer: CodeBuffer::new(options.indent_width),
            namer: IrNamer::new(),
            symbols: SymbolTable::new(),
        }
    }
}

impl Default for CompilationContext {
    fn default() -> Self {
        Self::new(&CompileOptions::default())
    }
}
