//! Fresh IR names and the mapping from FanC types and operators to IR

use crate::ast::{BinaryOp, RelationalOp};
use fcc_common::{ice, TypeKind};

/// Monotonic allocator for registers, labels and global constants
///
/// One instance lives for one compilation; identifiers are never reused.
#[derive(Debug, Clone, Default)]
pub struct IrNamer {
    next_register: u32,
    next_label: u32,
    next_global: u32,
}

impl IrNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new virtual register, including its `%` sigil
    pub fn fresh_register(&mut self) -> String {
        let id = self.next_register;
        self.next_register += 1;
        format!("%t{id}")
    }

    /// A new label name, without sigil
    pub fn fresh_label(&mut self) -> String {
        let id = self.next_label;
        self.next_label += 1;
        format!("L{id}")
    }

    /// A new global constant, including its `@` sigil
    pub fn fresh_global(&mut self) -> String {
        let id = self.next_global;
        self.next_global += 1;
        format!("@.str{id}")
    }
}

/// IR spelling of a FanC type
pub fn get_ir_type(ty: TypeKind) -> &'static str {
    match ty {
        TypeKind::Byte | TypeKind::Int | TypeKind::Bool => "i32",
        TypeKind::String => "i8*",
        TypeKind::Void => "void",
        TypeKind::Invalid => ice!("invalid type has no IR representation"),
    }
}

/// Arithmetic opcode; division follows the signedness of the operands
pub fn get_binary_instruction(op: BinaryOp, is_signed: bool) -> &'static str {
    match op {
        BinaryOp::Add => "add",
        BinaryOp::Sub => "sub",
        BinaryOp::Mul => "mul",
        BinaryOp::Div if is_signed => "sdiv",
        BinaryOp::Div => "udiv",
    }
}

/// `icmp` predicate; ordered comparisons follow the signedness of the operands
pub fn get_comparison_kind(op: RelationalOp, is_signed: bool) -> &'static str {
    match (op, is_signed) {
        (RelationalOp::Equal, _) => "eq",
        (RelationalOp::NotEqual, _) => "ne",
        (RelationalOp::Greater, true) => "sgt",
        (RelationalOp::Greater, false) => "ugt",
        (RelationalOp::GreaterEqual, true) => "sge",
        (RelationalOp::GreaterEqual, false) => "uge",
        (RelationalOp::Less, true) => "slt",
        (RelationalOp::Less, false) => "ult",
        (RelationalOp::LessEqual, true) => "sle",
        (RelationalOp::LessEqual, false) => "ule",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fresh_names_are_unique() {
        let mut namer = IrNamer::new();
        let registers: HashSet<String> = (0..100).map(|_| namer.fresh_register()).collect();
        let labels: HashSet<String> = (0..100).map(|_| namer.fresh_label()).collect();
        assert_eq!(registers.len(), 100);
        assert_eq!(labels.len(), 100);
        assert_eq!(namer.fresh_global(), "@.str0");
        assert_eq!(namer.fresh_global(), "@.str1");
    }

    #[test]
    fn test_ir_types() {
        assert_eq!(get_ir_type(TypeKind::Byte), "i32");
        assert_eq!(get_ir_type(TypeKind::Bool), "i32");
        assert_eq!(get_ir_type(TypeKind::String), "i8*");
        assert_eq!(get_ir_type(TypeKind::Void), "void");
    }

    #[test]
    #[should_panic(expected = "internal compiler error")]
    fn test_invalid_type_has_no_ir_spelling() {
        get_ir_type(TypeKind::Invalid);
    }

    #[test]
    fn test_signedness_selects_opcode() {
        assert_eq!(get_binary_instruction(BinaryOp::Div, true), "sdiv");
        assert_eq!(get_binary_instruction(BinaryOp::Div, false), "udiv");
        assert_eq!(get_binary_instruction(BinaryOp::Mul, false), "mul");
        assert_eq!(get_comparison_kind(RelationalOp::Less, true), "slt");
        assert_eq!(get_comparison_kind(RelationalOp::Less, false), "ult");
        assert_eq!(get_comparison_kind(RelationalOp::Equal, false), "eq");
    }
}
