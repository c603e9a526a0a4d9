//! Statement emission and control-flow wiring

use super::{get_ir_type, merge, CodeGenerator, PatchList, FRAME_REGISTER};
use crate::syntax::{Binding, NodeId, StatementKind};
use fcc_common::ice;

impl<'a> CodeGenerator<'a> {
    pub fn emit_statement(&mut self, id: NodeId) {
        let kind = self.tree.statement(id).kind.clone();
        let children = self.tree.children(id).to_vec();

        match kind {
            StatementKind::Declaration { offset, ptr_reg, .. } => {
                let size = self.frame().size;
                self.buffer().emit(format!(
                    "{ptr_reg} = getelementptr [{size} x i32], [{size} x i32]* {FRAME_REGISTER}, i32 0, i32 {offset}"
                ));
                let value = match children.first() {
                    Some(&init) => self.emit_value(init),
                    None => "0".to_string(),
                };
                self.buffer()
                    .emit(format!("store i32 {value}, i32* {ptr_reg}"));
                self.fall_through(id);
            }

            StatementKind::Assignment { binding } => {
                let value = self.emit_value(children[0]);
                let pointer = match &binding {
                    Binding::Local { ptr_reg } => ptr_reg.clone(),
                    Binding::Parameter { index } => match &self.frame().parameter_slots[*index] {
                        Some(slot) => slot.clone(),
                        None => ice!("assignment to parameter {index} without a slot"),
                    },
                };
                self.buffer()
                    .emit(format!("store i32 {value}, i32* {pointer}"));
                self.fall_through(id);
            }

            StatementKind::Expression => {
                let expr = children[0];
                self.emit_expression(expr);
                if self.tree.expression(expr).is_bool() {
                    let (on_true, on_false) = self.take_lists(expr);
                    let label = self.emit_label();
                    self.buffer().backpatch(&on_true, &label);
                    self.buffer().backpatch(&on_false, &label);
                }
                self.fall_through(id);
            }

            StatementKind::If => self.emit_if(id, &children),

            StatementKind::While => self.emit_while(id, children[0], children[1]),

            StatementKind::Break => {
                let jump = self.buffer().jump();
                self.tree.statement_mut(id).break_list = vec![jump];
            }

            StatementKind::Continue => {
                let jump = self.buffer().jump();
                self.tree.statement_mut(id).continue_list = vec![jump];
            }

            StatementKind::Return => match children.first() {
                Some(&value) => {
                    let result = self.emit_value(value);
                    let ty = get_ir_type(self.frame().return_type);
                    self.buffer().emit(format!("ret {ty} {result}"));
                }
                None => {
                    self.buffer().emit("ret void");
                }
            },

            StatementKind::Block => self.emit_block(id, &children),
        }
    }

    fn emit_if(&mut self, id: NodeId, children: &[NodeId]) {
        let condition = children[0];
        self.emit_expression(condition);
        let (on_true, on_false) = self.take_lists(condition);

        let then_label = self.emit_label();
        self.buffer().backpatch(&on_true, &then_label);
        self.emit_statement(children[1]);
        let (then_next, then_break, then_continue) = self.take_statement_lists(children[1]);

        let (next, breaks, continues) = match children.get(2) {
            Some(&else_branch) => {
                let else_label = self.emit_label();
                self.buffer().backpatch(&on_false, &else_label);
                self.emit_statement(else_branch);
                let (else_next, else_break, else_continue) = self.take_statement_lists(else_branch);
                (
                    merge(then_next, else_next),
                    merge(then_break, else_break),
                    merge(then_continue, else_continue),
                )
            }
            None => (merge(on_false, then_next), then_break, then_continue),
        };

        let stmt = self.tree.statement_mut(id);
        stmt.next_list = next;
        stmt.break_list = breaks;
        stmt.continue_list = continues;
    }

    /// The loop consumes its body's break and continue lists entirely
    fn emit_while(&mut self, id: NodeId, condition: NodeId, body: NodeId) {
        let enter = self.buffer().jump();
        let check = self.emit_label();
        self.buffer().backpatch(&[enter], &check);

        self.emit_expression(condition);
        let (on_true, on_false) = self.take_lists(condition);

        let body_label = self.emit_label();
        self.buffer().backpatch(&on_true, &body_label);
        self.emit_statement(body);
        let (body_next, body_break, body_continue) = self.take_statement_lists(body);

        self.buffer().backpatch(&body_next, &check);
        self.buffer().backpatch(&body_continue, &check);
        self.tree.statement_mut(id).next_list = merge(on_false, body_break);
    }

    /// Chain statements, opening a label between each pair
    fn emit_block(&mut self, id: NodeId, children: &[NodeId]) {
        let mut next = PatchList::new();
        let mut breaks = PatchList::new();
        let mut continues = PatchList::new();

        for (position, &child) in children.iter().enumerate() {
            if position > 0 {
                let label = self.emit_label();
                self.buffer().backpatch(&next, &label);
            }
            self.emit_statement(child);
            let (child_next, child_break, child_continue) = self.take_statement_lists(child);
            next = child_next;
            breaks = merge(breaks, child_break);
            continues = merge(continues, child_continue);
        }

        if children.is_empty() {
            next.push(self.buffer().jump());
        }

        let stmt = self.tree.statement_mut(id);
        stmt.next_list = next;
        stmt.break_list = breaks;
        stmt.continue_list = continues;
    }

    fn fall_through(&mut self, id: NodeId) {
        let jump = self.buffer().jump();
        self.tree.statement_mut(id).next_list = vec![jump];
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Literal, RelationalOp};
    use crate::codegen::CodeGenerator;
    use crate::context::CompilationContext;
    use crate::semantic::SemanticAnalyzer;
    use crate::CompileOptions;
    use fcc_common::{SourceLocation, TypeKind};

    fn loc() -> SourceLocation {
        SourceLocation::at_line(1)
    }

    #[test]
    fn test_while_discharges_its_break_list() {
        let mut ctx = CompilationContext::new(&CompileOptions::default());
        let mut analyzer = SemanticAnalyzer::new(&mut ctx);
        analyzer.begin_function("main", TypeKind::Void, &[], loc()).unwrap();

        // while (true) { while (true) { break; } break; }
        let outer_cond = analyzer.literal(&Literal::Bool(true), loc()).unwrap();
        analyzer.open_scope(true);
        let inner_cond = analyzer.literal(&Literal::Bool(true), loc()).unwrap();
        analyzer.open_scope(true);
        let inner_break = analyzer.break_statement(loc()).unwrap();
        let inner_body = analyzer.block(vec![inner_break], loc()).unwrap();
        analyzer.close_scope();
        let inner = analyzer.while_statement(inner_cond, inner_body, loc()).unwrap();
        let sibling_break = analyzer.break_statement(loc()).unwrap();
        let outer_body = analyzer.block(vec![inner, sibling_break], loc()).unwrap();
        analyzer.close_scope();
        analyzer.while_statement(outer_cond, outer_body, loc()).unwrap();
        let mut tree = analyzer.into_tree();

        let mut generator = CodeGenerator::new(&mut ctx, &mut tree);
        generator.emit_statement(outer_body);
        let tree = generator.tree();
        assert!(tree.statement(inner).break_list.is_empty());
        assert_eq!(tree.statement(outer_body).break_list.len(), 1);
        assert!(tree.statement(inner_break).break_list.is_empty());
    }

    #[test]
    fn test_and_skips_right_operand_when_left_is_false() {
        let mut ctx = CompilationContext::new(&CompileOptions::default());
        let mut analyzer = SemanticAnalyzer::new(&mut ctx);
        analyzer.begin_function("main", TypeKind::Void, &[], loc()).unwrap();

        let left = analyzer.literal(&Literal::Bool(false), loc()).unwrap();
        let a = analyzer.literal(&Literal::Int("1".into()), loc()).unwrap();
        let b = analyzer.literal(&Literal::Int("2".into()), loc()).unwrap();
        let right = analyzer.relational(RelationalOp::Less, a, b, loc()).unwrap();
        let and = analyzer.and(left, right, loc()).unwrap();
        let mut tree = analyzer.into_tree();

        let mut generator = CodeGenerator::new(&mut ctx, &mut tree);
        generator.emit_expression(and);
        let expr = generator.tree().expression(and);
        // left false jump and right false branch
        assert_eq!(expr.false_list.len(), 2);
        assert_eq!(expr.true_list.len(), 1);
        assert!(generator.tree().expression(left).false_list.is_empty());

        let lines = ctx.buffer.lines();
        assert_eq!(lines[0].trim(), "br label §");
        assert!(lines[1].starts_with("L0:"));
    }
}
