//! Semantic analysis for FanC
//!
//! [`SemanticAnalyzer`] is the node-construction API a bottom-up parser
//! drives: every builder method validates one production against the
//! current scopes, fails fast on the first semantic error, and adds the
//! analyzed node to the syntax tree. [`SemanticAnalyzer::analyze_program`]
//! replays a parsed [`Program`] through the same API.

pub mod errors;
pub mod expressions;
pub mod statements;
pub mod symbols;

pub use errors::SemanticError;
pub use symbols::{Scope, Symbol, SymbolClass, SymbolKind, SymbolTable};

use crate::ast::{self, Program};
use crate::codegen::prelude::RUNTIME_FUNCTIONS;
use crate::context::CompilationContext;
use crate::syntax::{NodeId, NodeKind, SyntaxTree};
use fcc_common::{ice, SourceLocation, TypeKind};
use log::debug;

/// Signature and bookkeeping of the function whose body is being built
#[derive(Debug, Clone)]
struct FunctionState {
    name: String,
    return_type: TypeKind,
    parameter_types: Vec<TypeKind>,
    parameter_slots: Vec<Option<String>>,
}

/// Semantic analyzer context
pub struct SemanticAnalyzer<'ctx> {
    ctx: &'ctx mut CompilationContext,
    tree: SyntaxTree,
    function: Option<FunctionState>,
}

impl<'ctx> SemanticAnalyzer<'ctx> {
    /// Create an analyzer whose global scope knows the runtime library
    pub fn new(ctx: &'ctx mut CompilationContext) -> Self {
        for (name, return_type, parameter_types) in RUNTIME_FUNCTIONS {
            if ctx.symbols.global().contains(name) {
                continue;
            }
            let declared = ctx.symbols.add_function(
                name,
                *return_type,
                parameter_types.to_vec(),
                SourceLocation::dummy(),
            );
            if let Err(err) = declared {
                ice!("cannot declare runtime function {name}: {err}");
            }
        }

        Self {
            ctx,
            tree: SyntaxTree::new(),
            function: None,
        }
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// Give up the tree built so far without checking the entry point
    pub fn into_tree(self) -> SyntaxTree {
        self.tree
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.ctx.symbols
    }

    pub fn open_scope(&mut self, is_loop: bool) {
        self.ctx.symbols.open_scope(is_loop);
    }

    pub fn close_scope(&mut self) {
        self.ctx.symbols.close_scope();
    }

    /// Analyze a whole program and return its syntax tree
    pub fn analyze_program(mut self, program: &Program) -> Result<SyntaxTree, SemanticError> {
        let mut functions = Vec::with_capacity(program.functions.len());
        for function in &program.functions {
            functions.push(self.analyze_function(function)?);
        }
        self.finish(functions)
    }

    fn analyze_function(&mut self, def: &ast::FunctionDefinition) -> Result<NodeId, SemanticError> {
        debug!("analyzing function {}", def.name);
        let parameters: Vec<(TypeKind, String, SourceLocation)> = def
            .parameters
            .iter()
            .map(|p| (p.ty.resolve(), p.name.clone(), p.location))
            .collect();
        self.begin_function(&def.name, def.return_type.resolve(), &parameters, def.location)?;

        let statements = def
            .body
            .iter()
            .map(|stmt| self.analyze_statement(stmt))
            .collect::<Result<Vec<_>, _>>()?;
        let body = self.block(statements, def.location)?;
        self.end_function(body, def.location)
    }

    fn analyze_statement(&mut self, stmt: &ast::Statement) -> Result<NodeId, SemanticError> {
        let location = stmt.location;
        match &stmt.kind {
            ast::StatementKind::Declaration { ty, name, initializer } => {
                let initializer = initializer
                    .as_ref()
                    .map(|init| self.analyze_expression(init))
                    .transpose()?;
                self.declaration(ty.resolve(), name, initializer, location)
            }

            ast::StatementKind::Assignment { name, value } => {
                let value = self.analyze_expression(value)?;
                self.assignment(name, value, location)
            }

            ast::StatementKind::Expression(expr) => {
                let expr = self.analyze_expression(expr)?;
                self.expression_statement(expr, location)
            }

            ast::StatementKind::If { condition, then_branch, else_branch } => {
                let condition = self.analyze_expression(condition)?;
                self.check_condition(condition)?;

                let then_branch = self.analyze_scoped(then_branch, false)?;
                let else_branch = match else_branch {
                    Some(branch) => Some(self.analyze_scoped(branch, false)?),
                    None => None,
                };
                self.if_statement(condition, then_branch, else_branch, location)
            }

            ast::StatementKind::While { condition, body } => {
                let condition = self.analyze_expression(condition)?;
                self.check_condition(condition)?;
                let body = self.analyze_scoped(body, true)?;
                self.while_statement(condition, body, location)
            }

            ast::StatementKind::Break => self.break_statement(location),

            ast::StatementKind::Continue => self.continue_statement(location),

            ast::StatementKind::Return(value) => {
                let value = value
                    .as_ref()
                    .map(|value| self.analyze_expression(value))
                    .transpose()?;
                self.return_statement(value, location)
            }

            ast::StatementKind::Block(statements) => {
                self.open_scope(false);
                let children = statements
                    .iter()
                    .map(|stmt| self.analyze_statement(stmt))
                    .collect::<Result<Vec<_>, _>>()?;
                self.close_scope();
                self.block(children, location)
            }
        }
    }

    fn analyze_scoped(
        &mut self,
        stmt: &ast::Statement,
        is_loop: bool,
    ) -> Result<NodeId, SemanticError> {
        self.open_scope(is_loop);
        let node = self.analyze_statement(stmt)?;
        self.close_scope();
        Ok(node)
    }

    fn analyze_expression(&mut self, expr: &ast::Expression) -> Result<NodeId, SemanticError> {
        let location = expr.location;
        match &expr.kind {
            ast::ExpressionKind::Literal(literal) => self.literal(literal, location),

            ast::ExpressionKind::Identifier(name) => self.identifier(name, location),

            ast::ExpressionKind::Call { name, arguments } => {
                let arguments = arguments
                    .iter()
                    .map(|arg| self.analyze_expression(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(name, arguments, location)
            }

            ast::ExpressionKind::Not(operand) => {
                let operand = self.analyze_expression(operand)?;
                self.not(operand, location)
            }

            ast::ExpressionKind::And { left, right } => {
                let left = self.analyze_expression(left)?;
                let right = self.analyze_expression(right)?;
                self.and(left, right, location)
            }

            ast::ExpressionKind::Or { left, right } => {
                let left = self.analyze_expression(left)?;
                let right = self.analyze_expression(right)?;
                self.or(left, right, location)
            }

            ast::ExpressionKind::Binary { op, left, right } => {
                let left = self.analyze_expression(left)?;
                let right = self.analyze_expression(right)?;
                self.binary(*op, left, right, location)
            }

            ast::ExpressionKind::Relational { op, left, right } => {
                let left = self.analyze_expression(left)?;
                let right = self.analyze_expression(right)?;
                self.relational(*op, left, right, location)
            }

            ast::ExpressionKind::Cast { target, operand } => {
                let operand = self.analyze_expression(operand)?;
                self.cast(target.resolve(), operand, location)
            }

            ast::ExpressionKind::Conditional { condition, then_value, else_value } => {
                let condition = self.analyze_expression(condition)?;
                self.check_condition(condition)?;
                let then_value = self.analyze_expression(then_value)?;
                let else_value = self.analyze_expression(else_value)?;
                self.conditional(condition, then_value, else_value, location)
            }
        }
    }

    /// Check for a qualifying `void main()` and seal the tree
    pub fn finish(mut self, functions: Vec<NodeId>) -> Result<SyntaxTree, SemanticError> {
        let has_entry = self
            .ctx
            .symbols
            .global()
            .get("main")
            .is_some_and(|main| {
                main.ty == TypeKind::Void
                    && matches!(
                        &main.kind,
                        SymbolKind::Function { parameter_types } if parameter_types.is_empty()
                    )
            });
        if !has_entry {
            return Err(SemanticError::MissingEntryPoint);
        }

        let root = self.tree.add(NodeKind::Root, SourceLocation::dummy(), functions);
        self.tree.set_root(root);
        Ok(self.tree)
    }

    fn current_function(&self) -> &FunctionState {
        match &self.function {
            Some(state) => state,
            None => ice!("statement built outside of a function"),
        }
    }
}
