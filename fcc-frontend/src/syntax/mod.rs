//! Analyzed syntax tree
//!
//! Nodes live in one arena per compilation and refer to each other through
//! [`NodeId`] handles. A node's children are stored in evaluation order and
//! every child records its parent. Besides its analyzed payload, each node
//! carries the patch lists code generation threads through the tree:
//! true/false lists for boolean expressions, next/break/continue lists for
//! statements.

use crate::ast::{BinaryOp, RelationalOp};
use crate::codegen::PatchList;
use fcc_common::{ice, Offset, SourceLocation, TypeKind};

/// Handle of a node inside a [`SyntaxTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub location: SourceLocation,
    pub kind: NodeKind,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Expression(Expression),
    Statement(Statement),
    Function(Function),
    /// The program; children are its functions
    Root,
}

/// A literal value after range checking
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i32),
    Byte(u8),
    Bool(bool),
    String(String),
}

impl LiteralValue {
    pub fn ty(&self) -> TypeKind {
        match self {
            LiteralValue::Int(_) => TypeKind::Int,
            LiteralValue::Byte(_) => TypeKind::Byte,
            LiteralValue::Bool(_) => TypeKind::Bool,
            LiteralValue::String(_) => TypeKind::String,
        }
    }
}

/// Where a named value lives at run time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// A local variable; `ptr_reg` holds the address of its frame slot
    Local { ptr_reg: String },
    /// The `index`th parameter of the enclosing function
    Parameter { index: usize },
}

/// Expression kinds; operands are the node's children in evaluation order
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Literal(LiteralValue),
    Identifier { name: String, binding: Binding },
    /// children: arguments
    Call { name: String, parameter_types: Vec<TypeKind> },
    /// children: operand
    Not,
    /// children: left, right
    And,
    /// children: left, right
    Or,
    /// children: left, right
    Binary(BinaryOp),
    /// children: left, right
    Relational(RelationalOp),
    /// children: operand
    Cast { target: TypeKind },
    /// children: condition, then value, else value
    Conditional,
}

#[derive(Debug, Clone)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub return_type: TypeKind,
    /// Register holding the value of a non-boolean expression once emitted
    pub place: Option<String>,
    pub true_list: PatchList,
    pub false_list: PatchList,
}

impl Expression {
    pub fn new(kind: ExpressionKind, return_type: TypeKind) -> Self {
        Self {
            kind,
            return_type,
            place: None,
            true_list: PatchList::new(),
            false_list: PatchList::new(),
        }
    }

    pub fn is_bool(&self) -> bool {
        self.return_type == TypeKind::Bool
    }
}

/// Statement kinds; sub-expressions and sub-statements are the children
#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// children: optional initializer
    Declaration {
        name: String,
        ty: TypeKind,
        offset: Offset,
        ptr_reg: String,
    },
    /// children: value
    Assignment { binding: Binding },
    /// children: the expression
    Expression,
    /// children: condition, then branch, optional else branch
    If,
    /// children: condition, body
    While,
    Break,
    Continue,
    /// children: optional value
    Return,
    /// children: statements in order
    Block,
}

#[derive(Debug, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    pub next_list: PatchList,
    pub break_list: PatchList,
    pub continue_list: PatchList,
}

impl Statement {
    pub fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            next_list: PatchList::new(),
            break_list: PatchList::new(),
            continue_list: PatchList::new(),
        }
    }
}

/// A function definition; its only child is the body block
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub return_type: TypeKind,
    pub parameter_types: Vec<TypeKind>,
    /// Number of 32-bit frame slots the body's variables need
    pub frame_size: Offset,
    /// Spill slot register of each parameter that is assigned to
    pub parameter_slots: Vec<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a node and adopt `children`
    pub fn add(
        &mut self,
        kind: NodeKind,
        location: SourceLocation,
        children: Vec<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        for child in &children {
            let slot = &mut self.nodes[child.0].parent;
            if slot.is_some() {
                ice!("node {} already has a parent", child.0);
            }
            *slot = Some(id);
        }
        self.nodes.push(Node {
            parent: None,
            children,
            location,
            kind,
        });
        id
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn location(&self, id: NodeId) -> SourceLocation {
        self.nodes[id.0].location
    }

    pub fn expression(&self, id: NodeId) -> &Expression {
        match &self.nodes[id.0].kind {
            NodeKind::Expression(expr) => expr,
            other => ice!("node {} is not an expression: {other:?}", id.0),
        }
    }

    pub fn expression_mut(&mut self, id: NodeId) -> &mut Expression {
        match &mut self.nodes[id.0].kind {
            NodeKind::Expression(expr) => expr,
            other => ice!("node {} is not an expression: {other:?}", id.0),
        }
    }

    pub fn statement(&self, id: NodeId) -> &Statement {
        match &self.nodes[id.0].kind {
            NodeKind::Statement(stmt) => stmt,
            other => ice!("node {} is not a statement: {other:?}", id.0),
        }
    }

    pub fn statement_mut(&mut self, id: NodeId) -> &mut Statement {
        match &mut self.nodes[id.0].kind {
            NodeKind::Statement(stmt) => stmt,
            other => ice!("node {} is not a statement: {other:?}", id.0),
        }
    }

    pub fn function(&self, id: NodeId) -> &Function {
        match &self.nodes[id.0].kind {
            NodeKind::Function(function) => function,
            other => ice!("node {} is not a function: {other:?}", id.0),
        }
    }

    /// Type of an expression node
    pub fn type_of(&self, id: NodeId) -> TypeKind {
        self.expression(id).return_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_literal(tree: &mut SyntaxTree, value: i32) -> NodeId {
        tree.add(
            NodeKind::Expression(Expression::new(
                ExpressionKind::Literal(LiteralValue::Int(value)),
                TypeKind::Int,
            )),
            SourceLocation::at_line(1),
            Vec::new(),
        )
    }

    #[test]
    fn test_add_links_parent_and_children() {
        let mut tree = SyntaxTree::new();
        let left = int_literal(&mut tree, 1);
        let right = int_literal(&mut tree, 2);
        let sum = tree.add(
            NodeKind::Expression(Expression::new(
                ExpressionKind::Binary(BinaryOp::Add),
                TypeKind::Int,
            )),
            SourceLocation::at_line(1),
            vec![left, right],
        );

        assert_eq!(tree.children(sum), &[left, right]);
        assert_eq!(tree.parent(left), Some(sum));
        assert_eq!(tree.parent(right), Some(sum));
        assert_eq!(tree.parent(sum), None);
        assert_eq!(tree.type_of(sum), TypeKind::Int);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    #[should_panic(expected = "not a statement")]
    fn test_wrong_node_kind_is_internal_error() {
        let mut tree = SyntaxTree::new();
        let literal = int_literal(&mut tree, 0);
        tree.statement(literal);
    }

    #[test]
    #[should_panic(expected = "already has a parent")]
    fn test_node_cannot_be_adopted_twice() {
        let mut tree = SyntaxTree::new();
        let literal = int_literal(&mut tree, 0);
        tree.add(NodeKind::Root, SourceLocation::dummy(), vec![literal]);
        tree.add(NodeKind::Root, SourceLocation::dummy(), vec![literal]);
    }
}
