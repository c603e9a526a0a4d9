//! Statement and function construction

use super::{FunctionState, SemanticAnalyzer, SemanticError};
use crate::syntax::{Binding, Function, NodeId, NodeKind, Statement, StatementKind};
use fcc_common::{ice, SourceLocation, TypeKind};
use log::debug;

impl<'ctx> SemanticAnalyzer<'ctx> {
    /// `T x;` or `T x = initializer;`
    pub fn declaration(
        &mut self,
        ty: TypeKind,
        name: &str,
        initializer: Option<NodeId>,
        location: SourceLocation,
    ) -> Result<NodeId, SemanticError> {
        if ty.is_special() {
            return Err(SemanticError::TypeMismatch { location });
        }
        if let Some(init) = initializer {
            if !self.tree.type_of(init).is_implicitly_convertible(ty) {
                return Err(SemanticError::TypeMismatch { location });
            }
        }

        let ptr_reg = self.ctx.namer.fresh_register();
        let offset = self.ctx.symbols.add_variable(name, ty, ptr_reg.clone(), location)?;
        let kind = StatementKind::Declaration {
            name: name.to_string(),
            ty,
            offset,
            ptr_reg,
        };
        Ok(self.add_statement(kind, location, initializer.into_iter().collect()))
    }

    pub fn assignment(
        &mut self,
        name: &str,
        value: NodeId,
        location: SourceLocation,
    ) -> Result<NodeId, SemanticError> {
        let (binding, ty) = self.resolve_value(name, location)?;
        if !self.tree.type_of(value).is_implicitly_convertible(ty) {
            return Err(SemanticError::TypeMismatch { location });
        }

        if let Binding::Parameter { index } = binding {
            self.spill_parameter(index);
        }
        Ok(self.add_statement(StatementKind::Assignment { binding }, location, vec![value]))
    }

    pub fn expression_statement(
        &mut self,
        expr: NodeId,
        location: SourceLocation,
    ) -> Result<NodeId, SemanticError> {
        Ok(self.add_statement(StatementKind::Expression, location, vec![expr]))
    }

    pub fn if_statement(
        &mut self,
        condition: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
        location: SourceLocation,
    ) -> Result<NodeId, SemanticError> {
        self.check_condition(condition)?;
        let mut children = vec![condition, then_branch];
        children.extend(else_branch);
        Ok(self.add_statement(StatementKind::If, location, children))
    }

    pub fn while_statement(
        &mut self,
        condition: NodeId,
        body: NodeId,
        location: SourceLocation,
    ) -> Result<NodeId, SemanticError> {
        self.check_condition(condition)?;
        Ok(self.add_statement(StatementKind::While, location, vec![condition, body]))
    }

    pub fn break_statement(&mut self, location: SourceLocation) -> Result<NodeId, SemanticError> {
        if !self.ctx.symbols.is_in_loop() {
            return Err(SemanticError::UnexpectedBreak { location });
        }
        Ok(self.add_statement(StatementKind::Break, location, Vec::new()))
    }

    pub fn continue_statement(
        &mut self,
        location: SourceLocation,
    ) -> Result<NodeId, SemanticError> {
        if !self.ctx.symbols.is_in_loop() {
            return Err(SemanticError::UnexpectedContinue { location });
        }
        Ok(self.add_statement(StatementKind::Continue, location, Vec::new()))
    }

    /// `return;` or `return value;` checked against the enclosing function
    pub fn return_statement(
        &mut self,
        value: Option<NodeId>,
        location: SourceLocation,
    ) -> Result<NodeId, SemanticError> {
        let return_type = self.current_function().return_type;
        let valid = match value {
            None => return_type == TypeKind::Void,
            Some(value) => {
                return_type != TypeKind::Void
                    && self
                        .tree
                        .type_of(value)
                        .is_implicitly_convertible(return_type)
            }
        };
        if !valid {
            return Err(SemanticError::TypeMismatch { location });
        }
        Ok(self.add_statement(StatementKind::Return, location, value.into_iter().collect()))
    }

    pub fn block(
        &mut self,
        statements: Vec<NodeId>,
        location: SourceLocation,
    ) -> Result<NodeId, SemanticError> {
        Ok(self.add_statement(StatementKind::Block, location, statements))
    }

    /// Declare a function and open the scope of its body
    ///
    /// The function is visible to its own body, so recursion works; later
    /// functions are not visible yet.
    pub fn begin_function(
        &mut self,
        name: &str,
        return_type: TypeKind,
        parameters: &[(TypeKind, String, SourceLocation)],
        location: SourceLocation,
    ) -> Result<(), SemanticError> {
        if self.function.is_some() || self.ctx.symbols.depth() != 0 {
            ice!("function {name} begins inside another function");
        }
        if matches!(return_type, TypeKind::String | TypeKind::Invalid) {
            return Err(SemanticError::TypeMismatch { location });
        }
        for (ty, _, location) in parameters {
            if ty.is_special() {
                return Err(SemanticError::TypeMismatch { location: *location });
            }
        }

        let parameter_types: Vec<TypeKind> = parameters.iter().map(|(ty, _, _)| *ty).collect();
        self.ctx
            .symbols
            .add_function(name, return_type, parameter_types.clone(), location)?;

        self.ctx.symbols.reset_frame();
        self.open_scope(false);
        for (ty, parameter, location) in parameters {
            self.ctx.symbols.add_parameter(parameter, *ty, *location)?;
        }

        debug!("function {name} declared with {} parameter(s)", parameters.len());
        self.function = Some(FunctionState {
            name: name.to_string(),
            return_type,
            parameter_slots: vec![None; parameter_types.len()],
            parameter_types,
        });
        Ok(())
    }

    /// Close the function scope and add the function node around `body`
    pub fn end_function(
        &mut self,
        body: NodeId,
        location: SourceLocation,
    ) -> Result<NodeId, SemanticError> {
        let state = match self.function.take() {
            Some(state) => state,
            None => ice!("end_function without begin_function"),
        };
        self.close_scope();

        let function = Function {
            name: state.name,
            return_type: state.return_type,
            parameter_types: state.parameter_types,
            frame_size: self.ctx.symbols.frame_size(),
            parameter_slots: state.parameter_slots,
        };
        debug!("function {} needs {} frame slot(s)", function.name, function.frame_size);
        Ok(self.tree.add(NodeKind::Function(function), location, vec![body]))
    }

    /// Give an assigned parameter its own stack slot
    fn spill_parameter(&mut self, index: usize) {
        let Some(state) = self.function.as_mut() else {
            ice!("parameter assignment outside of a function");
        };
        if state.parameter_slots[index].is_none() {
            state.parameter_slots[index] = Some(self.ctx.namer.fresh_register());
        }
    }

    fn add_statement(
        &mut self,
        kind: StatementKind,
        location: SourceLocation,
        children: Vec<NodeId>,
    ) -> NodeId {
        self.tree.add(NodeKind::Statement(Statement::new(kind)), location, children)
    }
}
