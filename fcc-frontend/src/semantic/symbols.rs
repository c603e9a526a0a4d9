//! Symbol table and lexical scopes
//!
//! The table is a stack of scopes. Each scope owns its symbols and a
//! storage offset counter; a new scope continues the variable numbering of
//! the scope that encloses it, so sibling blocks reuse the same frame slots.

use crate::semantic::errors::SemanticError;
use fcc_common::{Offset, SourceLocation, TypeKind};
use log::debug;
use std::collections::HashMap;

/// Kind-specific symbol payload
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    /// `ptr_reg` holds the address of the variable's frame slot
    Variable { ptr_reg: String },
    Parameter,
    Function { parameter_types: Vec<TypeKind> },
}

/// Symbol kind without payload, for filtered lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolClass {
    Variable,
    Parameter,
    Function,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    /// Declared type; the return type for functions
    pub ty: TypeKind,
    /// Frame slot of a variable, negative position of a parameter, 0 for functions
    pub offset: Offset,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn class(&self) -> SymbolClass {
        match self.kind {
            SymbolKind::Variable { .. } => SymbolClass::Variable,
            SymbolKind::Parameter => SymbolClass::Parameter,
            SymbolKind::Function { .. } => SymbolClass::Function,
        }
    }

    /// Zero-based position of a parameter in its function's signature
    pub fn parameter_index(&self) -> Option<usize> {
        match self.kind {
            SymbolKind::Parameter => usize::try_from(-self.offset - 1).ok(),
            _ => None,
        }
    }
}

/// One lexical level
#[derive(Debug, Clone)]
pub struct Scope {
    symbols: Vec<Symbol>,
    index: HashMap<String, usize>,
    offset: Offset,
    param_offset: Offset,
    is_loop: bool,
}

impl Scope {
    fn new(offset: Offset, is_loop: bool) -> Self {
        Self {
            symbols: Vec::new(),
            index: HashMap::new(),
            offset,
            param_offset: -1,
            is_loop,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).map(|&i| &self.symbols[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Symbols in declaration order
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn is_loop(&self) -> bool {
        self.is_loop
    }

    fn insert(&mut self, symbol: Symbol) {
        self.index.insert(symbol.name.clone(), self.symbols.len());
        self.symbols.push(symbol);
    }
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    high_water: Offset,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Create a table holding only the global scope
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(0, false)],
            high_water: 0,
        }
    }

    pub fn open_scope(&mut self, is_loop: bool) {
        let offset = self.current().offset;
        self.scopes.push(Scope::new(offset, is_loop));
        debug!("open scope {} (loop: {is_loop})", self.depth());
    }

    /// Pop the innermost scope; the global scope is never closed
    pub fn close_scope(&mut self) {
        if self.scopes.len() > 1 {
            debug!("close scope {}", self.depth());
            self.scopes.pop();
        }
    }

    /// Number of scopes above the global one
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    pub fn current(&self) -> &Scope {
        // The global scope is always present
        &self.scopes[self.scopes.len() - 1]
    }

    pub fn global(&self) -> &Scope {
        &self.scopes[0]
    }

    /// Declare a local variable and return its frame slot
    pub fn add_variable(
        &mut self,
        name: &str,
        ty: TypeKind,
        ptr_reg: String,
        location: SourceLocation,
    ) -> Result<Offset, SemanticError> {
        self.check_free(name, location)?;
        let scope = self.current_mut();
        let offset = scope.offset;
        scope.offset += 1;
        scope.insert(Symbol {
            name: name.to_string(),
            ty,
            offset,
            kind: SymbolKind::Variable { ptr_reg },
        });
        self.high_water = self.high_water.max(offset + 1);
        Ok(offset)
    }

    /// Declare the next parameter of the current function and return its index
    pub fn add_parameter(
        &mut self,
        name: &str,
        ty: TypeKind,
        location: SourceLocation,
    ) -> Result<usize, SemanticError> {
        self.check_free(name, location)?;
        let scope = self.current_mut();
        let offset = scope.param_offset;
        scope.param_offset -= 1;
        let symbol = Symbol {
            name: name.to_string(),
            ty,
            offset,
            kind: SymbolKind::Parameter,
        };
        let index = symbol.parameter_index().unwrap_or_default();
        scope.insert(symbol);
        Ok(index)
    }

    pub fn add_function(
        &mut self,
        name: &str,
        return_type: TypeKind,
        parameter_types: Vec<TypeKind>,
        location: SourceLocation,
    ) -> Result<(), SemanticError> {
        self.check_free(name, location)?;
        self.current_mut().insert(Symbol {
            name: name.to_string(),
            ty: return_type,
            offset: 0,
            kind: SymbolKind::Function { parameter_types },
        });
        Ok(())
    }

    /// Innermost symbol called `name`
    pub fn get_symbol(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Innermost symbol called `name` of the given class
    pub fn get_symbol_of(&self, name: &str, class: SymbolClass) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .filter_map(|scope| scope.get(name))
            .find(|symbol| symbol.class() == class)
    }

    pub fn contains_symbol(&self, name: &str) -> bool {
        self.get_symbol(name).is_some()
    }

    pub fn contains_symbol_of(&self, name: &str, class: SymbolClass) -> bool {
        self.get_symbol_of(name, class).is_some()
    }

    /// Check if any active scope is a loop body
    pub fn is_in_loop(&self) -> bool {
        self.scopes.iter().any(Scope::is_loop)
    }

    /// Restart frame size tracking for a new function
    pub fn reset_frame(&mut self) {
        self.high_water = 0;
    }

    /// Largest number of variable slots live at once since the last reset
    pub fn frame_size(&self) -> Offset {
        self.high_water
    }

    fn check_free(&self, name: &str, location: SourceLocation) -> Result<(), SemanticError> {
        if self.current().contains(name) {
            return Err(SemanticError::Redefinition {
                name: name.to_string(),
                location,
            });
        }
        Ok(())
    }

    fn current_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }
}
