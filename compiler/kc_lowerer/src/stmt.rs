// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! Statement lowering: control flow becomes explicit blocks and
//! terminators. Arms that already ended in a terminator do not receive a
//! merge jump.

use crate::{ty::lower_ty, Lowerer};
use kc_hir::hir;

impl Lowerer {
    pub(crate) fn lower_block(&mut self, block: &hir::Block) {
        for stmt in &block.stmts {
            self.lower_stmt(stmt);
        }
    }

    fn lower_stmt(&mut self, stmt: &hir::Stmt) {
        match stmt {
            hir::Stmt::Expr(expr) => {
                self.lower_expr(expr, true);
            }
            hir::Stmt::Block(block) => self.lower_block(block),
            hir::Stmt::Let { id, ty, init } => {
                let ty = lower_ty(ty);
                let block = self.block;
                let slot = self.func().new_alloc(block, ty);
                let value = self
                    .lower_expr(init, true)
                    .expect("let initializer should produce a value");
                let block = self.block;
                self.func().new_store(block, value, slot.clone());
                self.locals.insert(*id, slot);
            }
            hir::Stmt::Return(value) => {
                let value = value
                    .as_ref()
                    .and_then(|value| self.lower_expr(value, true));
                self.run_defers();
                let block = self.block;
                self.func().new_return(block, value);
            }
            hir::Stmt::If(if_stmt) => self.lower_if(if_stmt),
            hir::Stmt::Loop { cond, body } => self.lower_loop(cond, body),
            hir::Stmt::Break => {
                let (_, end) = self
                    .loop_blocks
                    .expect("break should be inside a loop");
                let block = self.block;
                self.func().new_goto(block, end);
            }
            hir::Stmt::Continue => {
                let (cond, _) = self
                    .loop_blocks
                    .expect("continue should be inside a loop");
                let block = self.block;
                self.func().new_goto(block, cond);
            }
            hir::Stmt::Defer(call) => self.lower_defer(call),
        }
    }

    fn lower_if(&mut self, if_stmt: &hir::IfStmt) {
        let cond = self
            .lower_expr(&if_stmt.cond, true)
            .expect("condition should produce a value");
        let then = self.func().new_block();

        match &if_stmt.els {
            None => {
                let before = self.block;
                self.block = then;
                self.lower_block(&if_stmt.then);
                let then_end = self.block;

                let end = self.func().new_block();
                self.func().new_cond_goto(before, cond, then, end);
                if !self.terminated(then_end) {
                    self.func().new_goto(then_end, end);
                }
                self.block = end;
            }
            Some(els_block) => {
                let els = self.func().new_block();
                let before = self.block;
                self.func().new_cond_goto(before, cond, then, els);

                self.block = then;
                self.lower_block(&if_stmt.then);
                let then_end = self.block;

                self.block = els;
                self.lower_block(els_block);
                let els_end = self.block;

                let end = self.func().new_block();
                if !self.terminated(then_end) {
                    self.func().new_goto(then_end, end);
                }
                if !self.terminated(els_end) {
                    self.func().new_goto(els_end, end);
                }
                self.block = end;
            }
        }
    }

    fn lower_loop(&mut self, cond: &hir::Expr, body: &hir::Block) {
        let cond_block = self.func().new_block();
        let before = self.block;
        self.func().new_goto(before, cond_block);

        self.block = cond_block;
        let cond = self
            .lower_expr(cond, true)
            .expect("condition should produce a value");
        let body_block = self.func().new_block();
        let end = self.func().new_block();
        let cond_end = self.block;
        self.func().new_cond_goto(cond_end, cond, body_block, end);

        let saved = self.loop_blocks;
        self.loop_blocks = Some((cond_block, end));
        self.block = body_block;
        self.lower_block(body);
        let body_end = self.block;
        if !self.terminated(body_end) {
            self.func().new_goto(body_end, cond_block);
        }
        self.loop_blocks = saved;

        self.block = end;
    }

    /// A deferred call's callee and arguments are evaluated at the `defer`
    /// site; only the call itself is postponed.
    fn lower_defer(&mut self, call: &hir::Expr) {
        match &call.kind {
            hir::ExprKind::Call { callee, args, .. } => {
                let callee = self
                    .lower_expr(callee, true)
                    .expect("callee should produce a value");
                let args = args
                    .iter()
                    .map(|arg| {
                        self.lower_expr(arg, true)
                            .expect("argument should produce a value")
                    })
                    .collect();
                self.defers.push((callee, args));
            }
            hir::ExprKind::MethodCall { method, recv, args, .. } => {
                let (callee, recv) = self.method_operands(*method, recv);
                let mut values = vec![recv];
                for arg in args {
                    values.push(
                        self.lower_expr(arg, true)
                            .expect("argument should produce a value"),
                    );
                }
                self.defers.push((callee, values));
            }
            _ => unreachable!("defer target is always a call"),
        }
    }

    fn terminated(&mut self, block: kc_ssa::ssa::BlockId) -> bool {
        self.func().blocks[block.0 as usize]
            .stmts
            .last()
            .is_some_and(kc_ssa::ssa::Stmt::is_terminator)
    }
}
