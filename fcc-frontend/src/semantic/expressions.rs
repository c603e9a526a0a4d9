//! Expression construction
//!
//! Each builder checks operand types against the FanC typing rules and
//! adds one expression node whose children are the operands.

use super::{SemanticAnalyzer, SemanticError, SymbolKind};
use crate::ast::{BinaryOp, Literal, RelationalOp};
use crate::syntax::{Binding, Expression, ExpressionKind, LiteralValue, NodeId, NodeKind};
use fcc_common::{ice, SourceLocation, TypeKind};

impl<'ctx> SemanticAnalyzer<'ctx> {
    pub fn literal(
        &mut self,
        literal: &Literal,
        location: SourceLocation,
    ) -> Result<NodeId, SemanticError> {
        let value = match literal {
            Literal::Int(text) => {
                check_digits(text);
                let value = text.parse::<i32>().map_err(|_| SemanticError::LiteralOutOfRange {
                    literal_type: TypeKind::Int,
                    text: text.clone(),
                    location,
                })?;
                LiteralValue::Int(value)
            }
            Literal::Byte(text) => {
                check_digits(text);
                let value = text.parse::<u8>().map_err(|_| SemanticError::LiteralOutOfRange {
                    literal_type: TypeKind::Byte,
                    text: text.clone(),
                    location,
                })?;
                LiteralValue::Byte(value)
            }
            Literal::Bool(value) => LiteralValue::Bool(*value),
            Literal::String(text) => LiteralValue::String(text.clone()),
        };

        let ty = value.ty();
        Ok(self.add_expression(ExpressionKind::Literal(value), ty, location, Vec::new()))
    }

    /// Reference to a variable or parameter
    pub fn identifier(
        &mut self,
        name: &str,
        location: SourceLocation,
    ) -> Result<NodeId, SemanticError> {
        let (binding, ty) = self.resolve_value(name, location)?;
        Ok(self.add_expression(
            ExpressionKind::Identifier {
                name: name.to_string(),
                binding,
            },
            ty,
            location,
            Vec::new(),
        ))
    }

    pub fn call(
        &mut self,
        name: &str,
        arguments: Vec<NodeId>,
        location: SourceLocation,
    ) -> Result<NodeId, SemanticError> {
        let (return_type, parameter_types) = match self.ctx.symbols.get_symbol(name) {
            Some(symbol) => match &symbol.kind {
                SymbolKind::Function { parameter_types } => (symbol.ty, parameter_types.clone()),
                _ => return Err(undefined_function(name, location)),
            },
            None => return Err(undefined_function(name, location)),
        };

        let matches = arguments.len() == parameter_types.len()
            && arguments
                .iter()
                .zip(&parameter_types)
                .all(|(&arg, &param)| self.tree.type_of(arg).is_implicitly_convertible(param));
        if !matches {
            return Err(SemanticError::PrototypeMismatch {
                name: name.to_string(),
                expected: parameter_types,
                location,
            });
        }

        Ok(self.add_expression(
            ExpressionKind::Call {
                name: name.to_string(),
                parameter_types,
            },
            return_type,
            location,
            arguments,
        ))
    }

    pub fn not(
        &mut self,
        operand: NodeId,
        location: SourceLocation,
    ) -> Result<NodeId, SemanticError> {
        self.expect_type(operand, TypeKind::Bool, location)?;
        Ok(self.add_expression(ExpressionKind::Not, TypeKind::Bool, location, vec![operand]))
    }

    pub fn and(
        &mut self,
        left: NodeId,
        right: NodeId,
        location: SourceLocation,
    ) -> Result<NodeId, SemanticError> {
        self.expect_type(left, TypeKind::Bool, location)?;
        self.expect_type(right, TypeKind::Bool, location)?;
        Ok(self.add_expression(ExpressionKind::And, TypeKind::Bool, location, vec![left, right]))
    }

    pub fn or(
        &mut self,
        left: NodeId,
        right: NodeId,
        location: SourceLocation,
    ) -> Result<NodeId, SemanticError> {
        self.expect_type(left, TypeKind::Bool, location)?;
        self.expect_type(right, TypeKind::Bool, location)?;
        Ok(self.add_expression(ExpressionKind::Or, TypeKind::Bool, location, vec![left, right]))
    }

    /// Arithmetic; mixed byte and int operands widen to int
    pub fn binary(
        &mut self,
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
        location: SourceLocation,
    ) -> Result<NodeId, SemanticError> {
        self.expect_numeric(left, location)?;
        self.expect_numeric(right, location)?;
        let ty = TypeKind::cast_up(self.tree.type_of(left), self.tree.type_of(right));
        Ok(self.add_expression(ExpressionKind::Binary(op), ty, location, vec![left, right]))
    }

    pub fn relational(
        &mut self,
        op: RelationalOp,
        left: NodeId,
        right: NodeId,
        location: SourceLocation,
    ) -> Result<NodeId, SemanticError> {
        self.expect_numeric(left, location)?;
        self.expect_numeric(right, location)?;
        Ok(self.add_expression(
            ExpressionKind::Relational(op),
            TypeKind::Bool,
            location,
            vec![left, right],
        ))
    }

    /// Explicit cast between numeric types, or to the operand's own type
    pub fn cast(
        &mut self,
        target: TypeKind,
        operand: NodeId,
        location: SourceLocation,
    ) -> Result<NodeId, SemanticError> {
        let source = self.tree.type_of(operand);
        let valid = (source.is_numeric() && target.is_numeric())
            || (source == target && !target.is_special());
        if !valid {
            return Err(SemanticError::TypeMismatch { location });
        }
        Ok(self.add_expression(ExpressionKind::Cast { target }, target, location, vec![operand]))
    }

    /// `then_value if condition else else_value`
    pub fn conditional(
        &mut self,
        condition: NodeId,
        then_value: NodeId,
        else_value: NodeId,
        location: SourceLocation,
    ) -> Result<NodeId, SemanticError> {
        self.expect_type(condition, TypeKind::Bool, location)?;
        let ty = TypeKind::cast_up(self.tree.type_of(then_value), self.tree.type_of(else_value));
        if matches!(ty, TypeKind::Invalid | TypeKind::Void) {
            return Err(SemanticError::TypeMismatch { location });
        }
        Ok(self.add_expression(
            ExpressionKind::Conditional,
            ty,
            location,
            vec![condition, then_value, else_value],
        ))
    }

    /// Reject a non-boolean condition before the guarded code is built
    pub fn check_condition(&self, condition: NodeId) -> Result<(), SemanticError> {
        let location = self.tree.location(condition);
        self.expect_type(condition, TypeKind::Bool, location)
    }

    /// Find the variable or parameter called `name`
    pub(super) fn resolve_value(
        &self,
        name: &str,
        location: SourceLocation,
    ) -> Result<(Binding, TypeKind), SemanticError> {
        let symbol = self
            .ctx
            .symbols
            .get_symbol(name)
            .ok_or_else(|| undefined_variable(name, location))?;

        let binding = match &symbol.kind {
            SymbolKind::Variable { ptr_reg } => Binding::Local {
                ptr_reg: ptr_reg.clone(),
            },
            SymbolKind::Parameter => match symbol.parameter_index() {
                Some(index) => Binding::Parameter { index },
                None => ice!("parameter {name} has offset {}", symbol.offset),
            },
            SymbolKind::Function { .. } => return Err(undefined_variable(name, location)),
        };
        Ok((binding, symbol.ty))
    }

    pub(super) fn expect_type(
        &self,
        node: NodeId,
        expected: TypeKind,
        location: SourceLocation,
    ) -> Result<(), SemanticError> {
        if self.tree.type_of(node) != expected {
            return Err(SemanticError::TypeMismatch { location });
        }
        Ok(())
    }

    fn expect_numeric(&self, node: NodeId, location: SourceLocation) -> Result<(), SemanticError> {
        if !self.tree.type_of(node).is_numeric() {
            return Err(SemanticError::TypeMismatch { location });
        }
        Ok(())
    }

    fn add_expression(
        &mut self,
        kind: ExpressionKind,
        ty: TypeKind,
        location: SourceLocation,
        children: Vec<NodeId>,
    ) -> NodeId {
        self.tree.add(NodeKind::Expression(Expression::new(kind, ty)), location, children)
    }
}

fn check_digits(text: &str) {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        ice!("numeric literal token {text:?} is not a digit sequence");
    }
}

fn undefined_variable(name: &str, location: SourceLocation) -> SemanticError {
    SemanticError::UndefinedVariable {
        name: name.to_string(),
        location,
    }
}

fn undefined_function(name: &str, location: SourceLocation) -> SemanticError {
    SemanticError::UndefinedFunction {
        name: name.to_string(),
        location,
    }
}
