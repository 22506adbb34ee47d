// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! Statement and control-flow analysis. A block is analysed under a
//! [`BlockScope`] whose `end` flag marks the point past which control cannot
//! textually proceed; statements after that point are dead and are neither
//! analysed nor reported.

use super::{expr::expect_expr_and_son, Analyser, BlockScope, BodyCtx, Error, Errors};
use kc_ast::ast;
use kc_hir::{
    hir,
    ty::{Prim, Ty},
};
use rustc_hash::FxHashMap;
use std::rc::Rc;

impl Analyser<'_> {
    pub(crate) fn analyse_block(
        &mut self,
        ctx: &mut BodyCtx,
        ast: &ast::Block,
        in_loop: bool,
    ) -> Result<(hir::Block, bool), Errors> {
        ctx.blocks.push(BlockScope {
            locals: FxHashMap::default(),
            in_loop,
            end: false,
        });

        let mut stmts = Vec::new();
        let mut errors = Vec::new();
        for stmt in &ast.stmts {
            if ctx.is_end() {
                break;
            }
            match self.analyse_stmt(ctx, stmt) {
                Ok(stmt) => stmts.push(stmt),
                Err(errs) => errors.extend(errs),
            }
        }

        let end = ctx.is_end();
        ctx.blocks.pop();
        if errors.is_empty() {
            Ok((hir::Block { stmts }, end))
        } else {
            Err(errors)
        }
    }

    fn analyse_stmt(&mut self, ctx: &mut BodyCtx, ast: &ast::Stmt) -> Result<hir::Stmt, Errors> {
        match &*ast.kind {
            ast::StmtKind::Expr(expr) => {
                Ok(hir::Stmt::Expr(self.analyse_expr(ctx, None, expr)?))
            }
            ast::StmtKind::Block(block) => {
                let (block, end) = self.analyse_block(ctx, block, false)?;
                if end {
                    ctx.set_end();
                }
                Ok(hir::Stmt::Block(block))
            }
            ast::StmtKind::Return(value) => {
                let result = self.analyse_return(ctx, value.as_ref(), ast.span);
                ctx.set_end();
                result
            }
            ast::StmtKind::Let { name, ty, value } => self.analyse_let(ctx, name, ty.as_ref(), value.as_ref()),
            ast::StmtKind::If(if_stmt) => {
                let (stmt, end) = self.analyse_if(ctx, if_stmt)?;
                if end {
                    ctx.set_end();
                }
                Ok(hir::Stmt::If(stmt))
            }
            ast::StmtKind::For { cond, body } => {
                let cond_span = cond.span;
                let cond = self.analyse_expr(ctx, Some(&Ty::Prim(Prim::Bool)), cond)?;
                let cond = expect_expr_and_son(&Ty::Prim(Prim::Bool), cond, cond_span)?;
                let (body, _) = self.analyse_block(ctx, body, true)?;
                Ok(hir::Stmt::Loop { cond, body })
            }
            ast::StmtKind::Break => {
                if !ctx.in_loop() {
                    return Err(vec![Error::NotInLoop(ast.span)]);
                }
                ctx.set_end();
                Ok(hir::Stmt::Break)
            }
            ast::StmtKind::Continue => {
                if !ctx.in_loop() {
                    return Err(vec![Error::NotInLoop(ast.span)]);
                }
                ctx.set_end();
                Ok(hir::Stmt::Continue)
            }
            ast::StmtKind::Defer(call) => {
                let call_span = call.span;
                // The call is postponed, so a deferred call into a
                // `@noreturn` function must not mark this point as ended.
                let was_end = ctx.is_end();
                let call = self.analyse_expr(ctx, None, call)?;
                if !was_end {
                    if let Some(block) = ctx.blocks.last_mut() {
                        block.end = false;
                    }
                }
                if !matches!(
                    call.kind,
                    hir::ExprKind::Call { .. } | hir::ExprKind::MethodCall { .. }
                ) {
                    return Err(vec![Error::ExpectFunctionCall(call_span)]);
                }
                Ok(hir::Stmt::Defer(call))
            }
        }
    }

    fn analyse_return(
        &mut self,
        ctx: &mut BodyCtx,
        value: Option<&ast::Expr>,
        span: kc_data_structures::span::Span,
    ) -> Result<hir::Stmt, Errors> {
        let ret = ctx.func.ret.clone();
        match value {
            None => {
                if ret.is_none() {
                    Ok(hir::Stmt::Return(None))
                } else {
                    Err(vec![Error::ExpectReturnValue(span)])
                }
            }
            Some(value) => {
                if ret.is_none() {
                    Err(vec![Error::UnexpectedReturnValue(span)])
                } else {
                    let value = self.expect_analysed(ctx, &ret, value)?;
                    Ok(hir::Stmt::Return(Some(value)))
                }
            }
        }
    }

    fn analyse_let(
        &mut self,
        ctx: &mut BodyCtx,
        name: &ast::Ident,
        ty: Option<&ast::Ty>,
        value: Option<&ast::Expr>,
    ) -> Result<hir::Stmt, Errors> {
        if ty.is_none() && value.is_none() {
            return Err(vec![Error::ExpectTypeOrValue(name.span)]);
        }

        let annotated = match ty {
            Some(ty) => Some(super::ty::analyse_type(&ctx.pkg, Some(ty))?),
            None => None,
        };

        let (ty, init) = match (annotated, value) {
            (Some(ty), Some(value)) => {
                let init = self.expect_analysed(ctx, &ty, value)?;
                (ty, init)
            }
            (None, Some(value)) => {
                let init = self.analyse_expr(ctx, None, value)?;
                if init.ty.is_none() {
                    return Err(vec![Error::ExpectValue(value.span)]);
                }
                (init.ty.clone(), init)
            }
            (Some(ty), None) => {
                let init = zero_value(&ty);
                (ty, init)
            }
            (None, None) => unreachable!("checked above"),
        };

        let block = ctx.blocks.last_mut().expect("let requires a block scope");
        if block.locals.contains_key(&name.name) || ctx.func.params.contains_key(&name.name) {
            return Err(vec![Error::DuplicateIdent(name.span)]);
        }
        let id = ctx.func.fresh_local();
        ctx.blocks
            .last_mut()
            .expect("let requires a block scope")
            .locals
            .insert(Rc::clone(&name.name), (id, ty.clone()));
        Ok(hir::Stmt::Let { id, ty, init })
    }

    fn analyse_if(
        &mut self,
        ctx: &mut BodyCtx,
        ast: &ast::IfStmt,
    ) -> Result<(hir::IfStmt, bool), Errors> {
        let cond_span = ast.cond.span;
        let cond = self.analyse_expr(ctx, Some(&Ty::Prim(Prim::Bool)), &ast.cond)?;
        let cond = expect_expr_and_son(&Ty::Prim(Prim::Bool), cond, cond_span)?;

        let then = self.analyse_block(ctx, &ast.then, false);
        match &ast.els {
            None => {
                let (then, _) = then?;
                Ok((
                    hir::IfStmt {
                        cond,
                        then,
                        els: None,
                    },
                    false,
                ))
            }
            Some(ast::ElseArm::Block(els)) => {
                let els = self.analyse_block(ctx, els, false);
                let ((then, then_end), (els, els_end)) = join(then, els)?;
                Ok((
                    hir::IfStmt {
                        cond,
                        then,
                        els: Some(els),
                    },
                    then_end && els_end,
                ))
            }
            Some(ast::ElseArm::If(next)) => {
                let next = self.analyse_if(ctx, next);
                let ((then, then_end), (next, next_end)) = join(then, next)?;
                let els = hir::Block {
                    stmts: vec![hir::Stmt::If(next)],
                };
                Ok((
                    hir::IfStmt {
                        cond,
                        then,
                        els: Some(els),
                    },
                    then_end && next_end,
                ))
            }
        }
    }

    /// Analyses an expression with `expect` threaded in, then requires the
    /// result to have exactly that type.
    pub(crate) fn expect_analysed(
        &mut self,
        ctx: &mut BodyCtx,
        expect: &Ty,
        ast: &ast::Expr,
    ) -> Result<hir::Expr, Errors> {
        let span = ast.span;
        let expr = self.analyse_expr(ctx, Some(expect), ast)?;
        super::expr::expect_expr(expect, expr, span)
    }
}

/// The canonical zero value of a type, used by `let x: T` with no
/// initializer.
///
/// # Panics
/// Panics on the `none` type; a `let` of type `none` is rejected before
/// this is reached.
pub(crate) fn zero_value(ty: &Ty) -> hir::Expr {
    let kind = match ty.base() {
        Ty::None => panic!("the none type has no zero value"),
        Ty::Prim(p) if p.is_int() => hir::ExprKind::Int(0),
        Ty::Prim(p) if p.is_float() => hir::ExprKind::Float(0.0),
        Ty::Prim(Prim::Bool) => hir::ExprKind::Bool(false),
        Ty::Prim(_) => unreachable!("all primitive kinds are covered"),
        Ty::Func(_) | Ty::Ptr(_) => hir::ExprKind::Null,
        Ty::Array(_) | Ty::Tuple(_) | Ty::Struct(_) => hir::ExprKind::Zero,
        Ty::Def(_) => unreachable!("base type is never a typedef"),
    };
    hir::Expr {
        ty: ty.clone(),
        kind,
    }
}

fn join<T, U>(a: Result<T, Errors>, b: Result<U, Errors>) -> Result<(T, U), Errors> {
    match (a, b) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(mut a), Err(b)) => {
            a.extend(b);
            Err(a)
        }
        (Err(a), Ok(_)) => Err(a),
        (Ok(_), Err(b)) => Err(b),
    }
}
