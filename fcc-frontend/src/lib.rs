//! FanC Compiler - Frontend
//!
//! This crate is the core of the FanC compiler:
//! - AST: the parsed program handed over by a parser
//! - Semantic analysis: scopes, type checking and bottom-up node construction
//! - Syntax: the analyzed arena tree carrying backpatching state
//! - Codegen: backpatching emission of LLVM-style IR

pub mod ast;
pub mod codegen;
pub mod context;
pub mod options;
pub mod semantic;
pub mod syntax;

pub use ast::Program;
pub use codegen::CodeGenerator;
pub use context::CompilationContext;
pub use options::CompileOptions;
pub use semantic::{SemanticAnalyzer, SemanticError};
pub use syntax::SyntaxTree;

use fcc_common::CompilerError;
use log::debug;

/// High-level frontend interface
pub struct Frontend;

impl Frontend {
    /// Decode a parsed program from its JSON form
    pub fn parse_json(json: &str) -> Result<Program, CompilerError> {
        serde_json::from_str(json).map_err(|e| CompilerError::input_error(e.to_string()))
    }

    /// Analyze a program into a syntax tree without emitting code
    pub fn analyze(
        program: &Program,
        ctx: &mut CompilationContext,
    ) -> Result<SyntaxTree, SemanticError> {
        SemanticAnalyzer::new(ctx).analyze_program(program)
    }

    /// Compile a program to IR text
    pub fn compile(program: &Program, options: &CompileOptions) -> Result<String, CompilerError> {
        let mut ctx = CompilationContext::new(options);
        let mut tree = Self::analyze(program, &mut ctx)?;
        debug!("analysis built {} nodes", tree.len());

        if options.emit_runtime {
            codegen::prelude::emit_runtime(&mut ctx.buffer);
        } else {
            codegen::prelude::emit_runtime_declarations(&mut ctx.buffer);
        }
        CodeGenerator::new(&mut ctx, &mut tree).generate();

        Ok(ctx.buffer.render())
    }

    /// Decode and compile a JSON-encoded program
    pub fn compile_json(json: &str, options: &CompileOptions) -> Result<String, CompilerError> {
        let program = Self::parse_json(json)?;
        Self::compile(&program, options)
    }
}
