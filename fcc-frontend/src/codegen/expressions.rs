//! Expression emission
//!
//! Non-boolean expressions leave their value in `place`. Boolean
//! expressions never materialize on their own: they end in branches whose
//! targets are collected in `true_list` and `false_list`.

use super::prelude::ZERO_DIVISION_HANDLER;
use super::{
    get_binary_instruction, get_comparison_kind, get_ir_type, merge, CodeGenerator, PatchList,
    PatchRecord,
};
use crate::ast::BinaryOp;
use crate::syntax::{Binding, ExpressionKind, LiteralValue, NodeId};
use fcc_common::{ice, TypeKind};

impl<'a> CodeGenerator<'a> {
    pub fn emit_expression(&mut self, id: NodeId) {
        let kind = self.tree.expression(id).kind.clone();
        let children = self.tree.children(id).to_vec();

        match kind {
            ExpressionKind::Literal(value) => self.emit_literal(id, value),

            ExpressionKind::Identifier { binding, .. } => {
                let value = self.read_binding(&binding);
                self.set_result(id, value);
            }

            ExpressionKind::Call { name, parameter_types } => {
                let mut arguments = Vec::with_capacity(children.len());
                for (&arg, &ty) in children.iter().zip(&parameter_types) {
                    let value = self.emit_value(arg);
                    arguments.push(format!("{} {value}", get_ir_type(ty)));
                }
                let arguments = arguments.join(", ");

                let return_type = self.tree.type_of(id);
                if return_type == TypeKind::Void {
                    self.buffer().emit(format!("call void @{name}({arguments})"));
                } else {
                    let result = self.fresh_register();
                    self.buffer().emit(format!(
                        "{result} = call {} @{name}({arguments})",
                        get_ir_type(return_type)
                    ));
                    self.set_result(id, result);
                }
            }

            ExpressionKind::Not => {
                let operand = children[0];
                self.emit_expression(operand);
                let (on_true, on_false) = self.take_lists(operand);
                self.set_lists(id, on_false, on_true);
            }

            ExpressionKind::And => {
                let (left, right) = (children[0], children[1]);
                self.emit_expression(left);
                let (left_true, left_false) = self.take_lists(left);
                let label = self.emit_label();
                self.buffer().backpatch(&left_true, &label);

                self.emit_expression(right);
                let (right_true, right_false) = self.take_lists(right);
                self.set_lists(id, right_true, merge(left_false, right_false));
            }

            ExpressionKind::Or => {
                let (left, right) = (children[0], children[1]);
                self.emit_expression(left);
                let (left_true, left_false) = self.take_lists(left);
                let label = self.emit_label();
                self.buffer().backpatch(&left_false, &label);

                self.emit_expression(right);
                let (right_true, right_false) = self.take_lists(right);
                self.set_lists(id, merge(left_true, right_true), right_false);
            }

            ExpressionKind::Binary(op) => {
                let left = self.emit_value(children[0]);
                let right = self.emit_value(children[1]);
                let result_type = self.tree.type_of(id);

                if op == BinaryOp::Div {
                    self.emit_zero_division_guard(&right);
                }

                let raw = self.fresh_register();
                let instruction = get_binary_instruction(op, result_type.is_signed());
                self.buffer()
                    .emit(format!("{raw} = {instruction} i32 {left}, {right}"));

                let value = if result_type == TypeKind::Byte {
                    self.truncate_to_byte(&raw)
                } else {
                    raw
                };
                self.set_place(id, value);
            }

            ExpressionKind::Relational(op) => {
                let operand_type = TypeKind::cast_up(
                    self.tree.type_of(children[0]),
                    self.tree.type_of(children[1]),
                );
                let left = self.emit_value(children[0]);
                let right = self.emit_value(children[1]);

                let condition = self.fresh_register();
                let predicate = get_comparison_kind(op, operand_type.is_signed());
                self.buffer()
                    .emit(format!("{condition} = icmp {predicate} i32 {left}, {right}"));
                self.branch_on(id, &condition);
            }

            ExpressionKind::Cast { target } => {
                let operand = children[0];
                let source = self.tree.type_of(operand);
                if target == TypeKind::Bool {
                    self.emit_expression(operand);
                    let (on_true, on_false) = self.take_lists(operand);
                    self.set_lists(id, on_true, on_false);
                } else {
                    let value = self.emit_value(operand);
                    let value = if source == TypeKind::Int && target == TypeKind::Byte {
                        self.truncate_to_byte(&value)
                    } else {
                        value
                    };
                    self.set_place(id, value);
                }
            }

            ExpressionKind::Conditional => self.emit_conditional(id, &children),
        }
    }

    /// Emit `id` and return the register or constant holding its value
    pub fn emit_value(&mut self, id: NodeId) -> String {
        self.emit_expression(id);
        if self.tree.expression(id).is_bool() {
            return self.materialize(id);
        }
        match &self.tree.expression(id).place {
            Some(place) => place.clone(),
            None => ice!("expression {} produced no value", id.index()),
        }
    }

    /// Turn the patch lists of a boolean expression into a 0/1 register
    pub fn materialize(&mut self, id: NodeId) -> String {
        let (on_true, on_false) = self.take_lists(id);

        let true_label = self.emit_label();
        self.buffer().backpatch(&on_true, &true_label);
        let from_true = self.buffer().jump();

        let false_label = self.emit_label();
        self.buffer().backpatch(&on_false, &false_label);
        let from_false = self.buffer().jump();

        let join = self.emit_label();
        self.buffer().backpatch(&[from_true, from_false], &join);
        let value = self.fresh_register();
        self.buffer().emit(format!(
            "{value} = phi i32 [1, %{true_label}], [0, %{false_label}]"
        ));
        value
    }

    fn emit_literal(&mut self, id: NodeId, value: LiteralValue) {
        match value {
            LiteralValue::Int(number) => {
                let place = self.constant(i64::from(number));
                self.set_place(id, place);
            }
            LiteralValue::Byte(number) => {
                let place = self.constant(i64::from(number));
                self.set_place(id, place);
            }
            LiteralValue::Bool(truth) => {
                let jump = self.buffer().jump();
                if truth {
                    self.set_lists(id, vec![jump], PatchList::new());
                } else {
                    self.set_lists(id, PatchList::new(), vec![jump]);
                }
            }
            LiteralValue::String(text) => {
                let (encoded, length) = encode_string(&text);
                let global = self.ctx.namer.fresh_global();
                self.buffer()
                    .emit_global(format!("{global} = constant [{length} x i8] c\"{encoded}\""));
                let place = self.fresh_register();
                self.buffer().emit(format!(
                    "{place} = getelementptr [{length} x i8], [{length} x i8]* {global}, i32 0, i32 0"
                ));
                self.set_place(id, place);
            }
        }
    }

    fn emit_conditional(&mut self, id: NodeId, children: &[NodeId]) {
        let (condition, then_value, else_value) = (children[0], children[1], children[2]);
        self.emit_expression(condition);
        let (on_true, on_false) = self.take_lists(condition);

        if self.tree.expression(id).is_bool() {
            let then_label = self.emit_label();
            self.buffer().backpatch(&on_true, &then_label);
            self.emit_expression(then_value);
            let (then_true, then_false) = self.take_lists(then_value);

            let else_label = self.emit_label();
            self.buffer().backpatch(&on_false, &else_label);
            self.emit_expression(else_value);
            let (else_true, else_false) = self.take_lists(else_value);

            self.set_lists(id, merge(then_true, else_true), merge(then_false, else_false));
            return;
        }

        let then_label = self.emit_label();
        self.buffer().backpatch(&on_true, &then_label);
        let then_result = self.emit_value(then_value);
        let (then_exit, then_join) = self.close_arm();

        let else_label = self.emit_label();
        self.buffer().backpatch(&on_false, &else_label);
        let else_result = self.emit_value(else_value);
        let (else_exit, else_join) = self.close_arm();

        let join = self.emit_label();
        self.buffer().backpatch(&[then_join, else_join], &join);
        let value = self.fresh_register();
        let ty = get_ir_type(self.tree.type_of(id));
        self.buffer().emit(format!(
            "{value} = phi {ty} [{then_result}, %{then_exit}], [{else_result}, %{else_exit}]"
        ));
        self.set_place(id, value);
    }

    /// End a conditional arm in a block of its own so the join's phi can name it
    fn close_arm(&mut self) -> (String, PatchRecord) {
        let leave = self.buffer().jump();
        let exit = self.emit_label();
        self.buffer().backpatch(&[leave], &exit);
        let join = self.buffer().jump();
        (exit, join)
    }

    fn emit_zero_division_guard(&mut self, divisor: &str) {
        let is_zero = self.fresh_register();
        self.buffer()
            .emit(format!("{is_zero} = icmp eq i32 {divisor}, 0"));
        let (on_zero, on_nonzero) = self.buffer().branch(&is_zero);

        let error = self.emit_label();
        self.buffer().backpatch(&[on_zero], &error);
        self.buffer().emit(format!("call void {ZERO_DIVISION_HANDLER}()"));
        let resume = self.buffer().jump();

        let divide = self.emit_label();
        self.buffer().backpatch(&[on_nonzero, resume], &divide);
    }

    fn read_binding(&mut self, binding: &Binding) -> String {
        let pointer = match binding {
            Binding::Local { ptr_reg } => ptr_reg.clone(),
            Binding::Parameter { index } => match &self.frame().parameter_slots[*index] {
                Some(slot) => slot.clone(),
                None => return format!("%{index}"),
            },
        };
        let value = self.fresh_register();
        self.buffer()
            .emit(format!("{value} = load i32, i32* {pointer}"));
        value
    }

    /// Store a non-boolean result, or branch on a boolean one
    fn set_result(&mut self, id: NodeId, value: String) {
        if self.tree.expression(id).is_bool() {
            let condition = self.fresh_register();
            self.buffer()
                .emit(format!("{condition} = icmp ne i32 {value}, 0"));
            self.branch_on(id, &condition);
        } else {
            self.set_place(id, value);
        }
    }

    fn branch_on(&mut self, id: NodeId, condition: &str) {
        let (on_true, on_false) = self.buffer().branch(condition);
        self.set_lists(id, vec![on_true], vec![on_false]);
    }

    fn constant(&mut self, value: i64) -> String {
        let place = self.fresh_register();
        self.buffer().emit(format!("{place} = add i32 0, {value}"));
        place
    }

    fn truncate_to_byte(&mut self, value: &str) -> String {
        let masked = self.fresh_register();
        self.buffer()
            .emit(format!("{masked} = and i32 {value}, 255"));
        masked
    }

    fn set_place(&mut self, id: NodeId, place: String) {
        self.tree.expression_mut(id).place = Some(place);
    }

    fn set_lists(&mut self, id: NodeId, true_list: PatchList, false_list: PatchList) {
        let expr = self.tree.expression_mut(id);
        expr.true_list = true_list;
        expr.false_list = false_list;
    }
}

/// Encode a string constant body and return it with its length in bytes
///
/// The terminating NUL is included. Quotes, backslashes and every byte
/// outside printable ASCII are written as `\XX`.
pub fn encode_string(text: &str) -> (String, usize) {
    let mut encoded = String::with_capacity(text.len() + 3);
    for byte in text.bytes() {
        match byte {
            b'"' | b'\\' => encoded.push_str(&format!("\\{byte:02X}")),
            0x20..=0x7E => encoded.push(char::from(byte)),
            _ => encoded.push_str(&format!("\\{byte:02X}")),
        }
    }
    encoded.push_str("\\00");
    (encoded, text.len() + 1)
}
