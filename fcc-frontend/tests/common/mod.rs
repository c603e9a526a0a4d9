//! Builders for parsed programs used by the integration tests

#![allow(dead_code)]

use fcc_common::SourceLocation;
use fcc_frontend::ast::*;
use fcc_frontend::{CompileOptions, Frontend};

fn at(line: u32) -> SourceLocation {
    SourceLocation::at_line(line)
}

fn expr(kind: ExpressionKind) -> Expression {
    Expression::new(kind, at(1))
}

pub fn int(text: &str) -> Expression {
    expr(ExpressionKind::Literal(Literal::Int(text.to_string())))
}

pub fn byte(text: &str) -> Expression {
    expr(ExpressionKind::Literal(Literal::Byte(text.to_string())))
}

pub fn boolean(value: bool) -> Expression {
    expr(ExpressionKind::Literal(Literal::Bool(value)))
}

pub fn string(text: &str) -> Expression {
    expr(ExpressionKind::Literal(Literal::String(text.to_string())))
}

pub fn id(name: &str) -> Expression {
    expr(ExpressionKind::Identifier(name.to_string()))
}

pub fn call(name: &str, arguments: Vec<Expression>) -> Expression {
    expr(ExpressionKind::Call {
        name: name.to_string(),
        arguments,
    })
}

pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Expression {
    expr(ExpressionKind::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

pub fn relational(op: RelationalOp, left: Expression, right: Expression) -> Expression {
    expr(ExpressionKind::Relational {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

pub fn and(left: Expression, right: Expression) -> Expression {
    expr(ExpressionKind::And {
        left: Box::new(left),
        right: Box::new(right),
    })
}

pub fn or(left: Expression, right: Expression) -> Expression {
    expr(ExpressionKind::Or {
        left: Box::new(left),
        right: Box::new(right),
    })
}

pub fn not(operand: Expression) -> Expression {
    expr(ExpressionKind::Not(Box::new(operand)))
}

pub fn cast(target: &str, operand: Expression) -> Expression {
    expr(ExpressionKind::Cast {
        target: TypeName::new(target),
        operand: Box::new(operand),
    })
}

pub fn conditional(
    condition: Expression,
    then_value: Expression,
    else_value: Expression,
) -> Expression {
    expr(ExpressionKind::Conditional {
        condition: Box::new(condition),
        then_value: Box::new(then_value),
        else_value: Box::new(else_value),
    })
}

pub fn on_line(line: u32, stmt: Statement) -> Statement {
    Statement::new(stmt.kind, at(line))
}

fn stmt(kind: StatementKind) -> Statement {
    Statement::new(kind, at(1))
}

pub fn declare(ty: &str, name: &str, initializer: Option<Expression>) -> Statement {
    stmt(StatementKind::Declaration {
        ty: TypeName::new(ty),
        name: name.to_string(),
        initializer,
    })
}

pub fn assign(name: &str, value: Expression) -> Statement {
    stmt(StatementKind::Assignment {
        name: name.to_string(),
        value,
    })
}

pub fn eval(value: Expression) -> Statement {
    stmt(StatementKind::Expression(value))
}

pub fn if_then(
    condition: Expression,
    then_branch: Statement,
    else_branch: Option<Statement>,
) -> Statement {
    stmt(StatementKind::If {
        condition,
        then_branch: Box::new(then_branch),
        else_branch: else_branch.map(Box::new),
    })
}

pub fn while_loop(condition: Expression, body: Statement) -> Statement {
    stmt(StatementKind::While {
        condition,
        body: Box::new(body),
    })
}

pub fn brk() -> Statement {
    stmt(StatementKind::Break)
}

pub fn cont() -> Statement {
    stmt(StatementKind::Continue)
}

pub fn ret(value: Option<Expression>) -> Statement {
    stmt(StatementKind::Return(value))
}

pub fn block(statements: Vec<Statement>) -> Statement {
    stmt(StatementKind::Block(statements))
}

pub fn function(
    name: &str,
    return_type: &str,
    parameters: &[(&str, &str)],
    body: Vec<Statement>,
) -> FunctionDefinition {
    FunctionDefinition {
        name: name.to_string(),
        return_type: TypeName::new(return_type),
        parameters: parameters
            .iter()
            .map(|(ty, name)| Parameter {
                ty: TypeName::new(*ty),
                name: name.to_string(),
                location: at(1),
            })
            .collect(),
        body,
        location: at(1),
    }
}

pub fn main_with(body: Vec<Statement>) -> Program {
    Program {
        functions: vec![function("main", "void", &[], body)],
    }
}

/// Options that leave out the runtime library so output stays small
pub fn bare() -> CompileOptions {
    CompileOptions {
        emit_runtime: false,
        ..CompileOptions::default()
    }
}

pub fn compile_bare(program: &Program) -> String {
    Frontend::compile(program, &bare()).unwrap()
}

/// Lines of the function called `name`, from `define` to the closing brace
pub fn function_body<'a>(ir: &'a str, name: &str) -> Vec<&'a str> {
    let header = format!("@{name}(");
    ir.lines()
        .skip_while(|line| !(line.starts_with("define") && line.contains(&header)))
        .take_while(|line| *line != "}")
        .collect()
}
