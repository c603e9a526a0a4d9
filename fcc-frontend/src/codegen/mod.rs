//! Backpatching code generation
//!
//! [`CodeGenerator`] walks an analyzed [`SyntaxTree`] and appends LLVM-style
//! IR to the context's [`CodeBuffer`]. Operands are emitted before the node
//! that consumes them; boolean expressions leave their exits in true and
//! false patch lists, statements leave theirs in next, break and continue
//! lists, and each parent takes its children's lists and resolves them.
//!
//! Every statement starts at the head of an open basic block and ends with
//! a terminator, so each new label directly follows a branch or return.

pub mod buffer;
pub mod expressions;
pub mod naming;
pub mod prelude;
pub mod statements;

pub use buffer::{merge, CodeBuffer, PatchList, PatchRecord, Slot, PLACEHOLDER};
pub use naming::{get_binary_instruction, get_comparison_kind, get_ir_type, IrNamer};

use crate::context::CompilationContext;
use crate::syntax::{NodeId, SyntaxTree};
use fcc_common::{ice, Offset, TypeKind};
use log::debug;
use std::mem;

/// Layout of the function currently being emitted
#[derive(Debug, Clone)]
struct Frame {
    size: Offset,
    return_type: TypeKind,
    parameter_slots: Vec<Option<String>>,
}

/// Name of the per-function stack array holding all local variables
const FRAME_REGISTER: &str = "%frame";

pub struct CodeGenerator<'a> {
    ctx: &'a mut CompilationContext,
    tree: &'a mut SyntaxTree,
    frame: Option<Frame>,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(ctx: &'a mut CompilationContext, tree: &'a mut SyntaxTree) -> Self {
        Self {
            ctx,
            tree,
            frame: None,
        }
    }

    /// Emit every function of the program in source order
    pub fn generate(&mut self) {
        let Some(root) = self.tree.root() else {
            ice!("code generation on a tree without root");
        };
        for function in self.tree.children(root).to_vec() {
            self.emit_function(function);
        }
    }

    pub fn emit_function(&mut self, id: NodeId) {
        let function = self.tree.function(id).clone();
        let body = match self.tree.children(id) {
            [body] => *body,
            other => ice!("function {} has {} bodies", function.name, other.len()),
        };
        debug!("emitting function {}", function.name);

        let parameters = function
            .parameter_types
            .iter()
            .map(|&ty| get_ir_type(ty))
            .collect::<Vec<_>>()
            .join(", ");
        self.buffer().emit(format!(
            "define {} @{}({}) {{",
            get_ir_type(function.return_type),
            function.name,
            parameters
        ));
        self.buffer().increase_indent();

        if function.frame_size > 0 {
            self.buffer()
                .emit(format!("{FRAME_REGISTER} = alloca [{} x i32]", function.frame_size));
        }
        for (index, slot) in function.parameter_slots.iter().enumerate() {
            if let Some(slot) = slot {
                self.buffer().emit(format!("{slot} = alloca i32"));
                self.buffer().emit(format!("store i32 %{index}, i32* {slot}"));
            }
        }

        self.frame = Some(Frame {
            size: function.frame_size,
            return_type: function.return_type,
            parameter_slots: function.parameter_slots.clone(),
        });

        self.emit_statement(body);
        let (next, breaks, continues) = self.take_statement_lists(body);
        if !breaks.is_empty() || !continues.is_empty() {
            ice!("loop exits escaped function {}", function.name);
        }
        let end = self.emit_label();
        self.buffer().backpatch(&next, &end);

        if function.name == "main" {
            self.buffer().emit("call void @exit(i32 0)");
        }
        match function.return_type {
            TypeKind::Void => self.buffer().emit("ret void"),
            other => self.buffer().emit(format!("ret {} 0", get_ir_type(other))),
        };

        self.buffer().decrease_indent();
        self.buffer().emit("}");
        self.buffer().emit("");
        self.frame = None;
        debug!("finished function {}", function.name);
    }

    pub fn tree(&self) -> &SyntaxTree {
        self.tree
    }

    fn buffer(&mut self) -> &mut CodeBuffer {
        &mut self.ctx.buffer
    }

    fn fresh_register(&mut self) -> String {
        self.ctx.namer.fresh_register()
    }

    fn emit_label(&mut self) -> String {
        self.ctx.buffer.emit_label(&mut self.ctx.namer)
    }

    fn frame(&self) -> &Frame {
        match &self.frame {
            Some(frame) => frame,
            None => ice!("frame access outside of a function"),
        }
    }

    fn take_lists(&mut self, id: NodeId) -> (PatchList, PatchList) {
        let expr = self.tree.expression_mut(id);
        (mem::take(&mut expr.true_list), mem::take(&mut expr.false_list))
    }

    fn take_statement_lists(&mut self, id: NodeId) -> (PatchList, PatchList, PatchList) {
        let stmt = self.tree.statement_mut(id);
        (
            mem::take(&mut stmt.next_list),
            mem::take(&mut stmt.break_list),
            mem::take(&mut stmt.continue_list),
        )
    }
}
