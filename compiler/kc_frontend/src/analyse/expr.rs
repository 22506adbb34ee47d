// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! Expression type-checking. Every expression is analysed with an optional
//! expected type threaded in: the expectation guides numeric literal
//! overloading, `null`, empty aggregates, and typedef adoption.

use super::{stmt::zero_value, Analyser, BodyCtx, Entry, Error, Errors};
use kc_ast::ast;
use kc_data_structures::span::Span;
use kc_hir::{
    hir::{self, ArithOp, CmpOp, LogicOp},
    ty::{ArrayTy, Prim, Ty, TyDef},
};
use std::rc::Rc;

const BOOL: Ty = Ty::Prim(Prim::Bool);
const USIZE: Ty = Ty::Prim(Prim::Usize);

impl Analyser<'_> {
    #[allow(clippy::too_many_lines)]
    pub(crate) fn analyse_expr(
        &mut self,
        ctx: &mut BodyCtx,
        expect: Option<&Ty>,
        ast: &ast::Expr,
    ) -> Result<hir::Expr, Errors> {
        let span = ast.span;
        match &*ast.kind {
            ast::ExprKind::Int(_)
            | ast::ExprKind::Float(_)
            | ast::ExprKind::Bool(_)
            | ast::ExprKind::Char(_)
            | ast::ExprKind::Str(_)
            | ast::ExprKind::CStr(_)
            | ast::ExprKind::Null => literal(expect, &ast.kind, span),
            ast::ExprKind::Name { pkg, name } => self.analyse_name(ctx, pkg.as_ref(), name),
            ast::ExprKind::Tuple(elems) => self.analyse_tuple(ctx, expect, elems, span),
            ast::ExprKind::Array(elems) => self.analyse_array(ctx, expect, elems, span),
            ast::ExprKind::Struct(fields) => self.analyse_struct(ctx, expect, fields, span),
            ast::ExprKind::UnOp(op, operand) => self.analyse_un_op(ctx, expect, *op, operand),
            ast::ExprKind::BinOp(op, lhs, rhs) => self.analyse_bin_op(ctx, expect, *op, lhs, rhs),
            ast::ExprKind::Assign(lhs, rhs) => self.analyse_assign(ctx, None, lhs, rhs),
            ast::ExprKind::AssignOp(op, lhs, rhs) => {
                self.analyse_assign(ctx, Some(arith_op(*op)), lhs, rhs)
            }
            ast::ExprKind::Call(callee, args) => self.analyse_call(ctx, callee, args, span),
            ast::ExprKind::Field(from, name) => self.analyse_field(ctx, from, name),
            ast::ExprKind::Index(from, index) => self.analyse_index(ctx, from, index),
            ast::ExprKind::Cast(operand, to) => self.analyse_cast(ctx, operand, to, span),
            ast::ExprKind::Ternary(cond, t, e) => self.analyse_ternary(ctx, expect, cond, t, e),
        }
    }

    fn analyse_name(
        &mut self,
        ctx: &mut BodyCtx,
        pkg: Option<&ast::Ident>,
        name: &ast::Ident,
    ) -> Result<hir::Expr, Errors> {
        match pkg {
            None => lookup_value(ctx, &name.name)
                .ok_or_else(|| vec![Error::UnknownIdent(name.span)]),
            Some(pkg) => {
                let sub = ctx.pkg.borrow().externs.get(&pkg.name).map(Rc::clone);
                let Some(sub) = sub else {
                    return Err(vec![Error::Unknown(pkg.name.to_string(), pkg.span)]);
                };
                let sub = sub.borrow();
                match sub.values.get(&name.name) {
                    Some((true, entry)) => Ok(entry_expr(entry)),
                    _ => Err(vec![Error::Unknown(name.name.to_string(), name.span)]),
                }
            }
        }
    }

    fn analyse_tuple(
        &mut self,
        ctx: &mut BodyCtx,
        expect: Option<&Ty>,
        elems: &[ast::Expr],
        span: Span,
    ) -> Result<hir::Expr, Errors> {
        if elems.is_empty() {
            let Some(expect) = expect else {
                return Err(vec![Error::ExpectTupleType(span)]);
            };
            if !expect.base().is_tuple() {
                return Err(vec![Error::ExpectTupleType(span)]);
            }
            return Ok(hir::Expr {
                ty: expect.clone(),
                kind: hir::ExprKind::Zero,
            });
        }

        // A parenthesized singleton collapses to a grouping unless a 1-tuple
        // is expected.
        if elems.len() == 1 {
            let is_one_tuple = expect.is_some_and(|e| match e.base() {
                Ty::Tuple(tys) => tys.len() == 1,
                _ => false,
            });
            if !is_one_tuple {
                return self.analyse_expr(ctx, expect, &elems[0]);
            }
        }

        let expects: Vec<Option<Ty>> = match expect.map(Ty::base) {
            Some(Ty::Tuple(tys)) if tys.len() == elems.len() => {
                tys.iter().map(|ty| Some(ty.clone())).collect()
            }
            _ => vec![None; elems.len()],
        };

        let mut analysed = Vec::with_capacity(elems.len());
        let mut errors = Vec::new();
        for (elem, elem_expect) in elems.iter().zip(&expects) {
            match self.analyse_expr(ctx, elem_expect.as_ref(), elem) {
                Ok(expr) => analysed.push(expr),
                Err(errs) => errors.extend(errs),
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let mut ty = Ty::Tuple(analysed.iter().map(|e| e.ty.clone()).collect());
        if let Some(expect) = expect {
            if expect.depth_base() == ty.depth_base() {
                ty = expect.clone();
            }
        }
        Ok(hir::Expr {
            ty,
            kind: hir::ExprKind::Tuple(analysed),
        })
    }

    fn analyse_array(
        &mut self,
        ctx: &mut BodyCtx,
        expect: Option<&Ty>,
        elems: &[ast::Expr],
        span: Span,
    ) -> Result<hir::Expr, Errors> {
        if elems.is_empty() {
            let Some(expect) = expect else {
                return Err(vec![Error::ExpectArrayType(span)]);
            };
            if !expect.base().is_array() {
                return Err(vec![Error::ExpectArrayType(span)]);
            }
            return Ok(hir::Expr {
                ty: expect.clone(),
                kind: hir::ExprKind::Zero,
            });
        }

        let elem_expect = match expect.map(Ty::base) {
            Some(Ty::Array(a)) if a.size == elems.len() as u64 => Some(a.elem.clone()),
            _ => None,
        };

        let mut analysed = Vec::with_capacity(elems.len());
        let mut errors = Vec::new();
        for elem in elems {
            match self.analyse_expr(ctx, elem_expect.as_ref(), elem) {
                Ok(expr) => analysed.push(expr),
                Err(errs) => errors.extend(errs),
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        // Elements after the first must match the first's analysed type.
        let elem_ty = analysed[0].ty.clone();
        for (expr, elem) in analysed.iter().zip(elems).skip(1) {
            if expr.ty != elem_ty {
                errors.push(Error::ExpectType(elem_ty.to_string(), elem.span));
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let mut ty = Ty::Array(Rc::new(ArrayTy {
            size: analysed.len() as u64,
            elem: elem_ty,
        }));
        if let Some(expect) = expect {
            if expect.depth_base() == ty.depth_base() {
                ty = expect.clone();
            }
        }
        Ok(hir::Expr {
            ty,
            kind: hir::ExprKind::Array(analysed),
        })
    }

    fn analyse_struct(
        &mut self,
        ctx: &mut BodyCtx,
        expect: Option<&Ty>,
        fields: &[ast::Expr],
        span: Span,
    ) -> Result<hir::Expr, Errors> {
        let struct_ty = match expect.map(Ty::base) {
            Some(Ty::Struct(s)) => s,
            _ => return Err(vec![Error::ExpectStructType(span)]),
        };
        let expect = expect.expect("struct expectation should be present");

        if fields.is_empty() {
            return Ok(hir::Expr {
                ty: expect.clone(),
                kind: hir::ExprKind::Zero,
            });
        }
        if struct_ty.fields.len() != fields.len() {
            return Err(vec![Error::ExpectFields(fields.len(), span)]);
        }

        let mut analysed = Vec::with_capacity(fields.len());
        let mut errors = Vec::new();
        for (field, (_, field_ty)) in fields.iter().zip(&struct_ty.fields) {
            match self.analyse_expr(ctx, Some(field_ty), field) {
                Ok(expr) => analysed.push(expr),
                Err(errs) => errors.extend(errs),
            }
        }
        if errors.is_empty() {
            Ok(hir::Expr {
                ty: expect.clone(),
                kind: hir::ExprKind::Struct(analysed),
            })
        } else {
            Err(errors)
        }
    }

    fn analyse_un_op(
        &mut self,
        ctx: &mut BodyCtx,
        expect: Option<&Ty>,
        op: ast::UnOp,
        operand: &ast::Expr,
    ) -> Result<hir::Expr, Errors> {
        let operand_span = operand.span;
        match op {
            ast::UnOp::Neg => {
                let value = self.analyse_expr(ctx, expect, operand)?;
                if !value.ty.base().is_number() {
                    return Err(vec![Error::ExpectNumber(operand_span)]);
                }
                let ty = value.ty.clone();
                Ok(hir::Expr {
                    ty: ty.clone(),
                    kind: hir::ExprKind::Arith(
                        ArithOp::Sub,
                        Box::new(zero_value(&ty)),
                        Box::new(value),
                    ),
                })
            }
            ast::UnOp::BitNot => {
                let value = self.analyse_expr(ctx, expect, operand)?;
                if !value.ty.base().is_sint() {
                    return Err(vec![Error::ExpectSignedInteger(operand_span)]);
                }
                let ty = value.ty.clone();
                let minus_one = hir::Expr {
                    ty: ty.clone(),
                    kind: hir::ExprKind::Int(-1),
                };
                Ok(hir::Expr {
                    ty,
                    kind: hir::ExprKind::Arith(ArithOp::Xor, Box::new(value), Box::new(minus_one)),
                })
            }
            ast::UnOp::Not => {
                let value = self.analyse_expr(ctx, expect, operand)?;
                let value = expect_expr_and_son(&BOOL, value, operand_span)?;
                let ty = value.ty.clone();
                Ok(hir::Expr {
                    ty,
                    kind: hir::ExprKind::Not(Box::new(value)),
                })
            }
            ast::UnOp::AddrOf => {
                let elem_expect = expect.and_then(|e| match e.base() {
                    Ty::Ptr(elem) => Some((*elem).clone()),
                    _ => None,
                });
                let value = self.analyse_expr(ctx, elem_expect.as_ref(), operand)?;
                if value.is_temporary() {
                    return Err(vec![Error::Temporary(operand_span)]);
                }
                Ok(hir::Expr {
                    ty: Ty::Ptr(Rc::new(value.ty.clone())),
                    kind: hir::ExprKind::AddrOf(Box::new(value)),
                })
            }
            ast::UnOp::Deref => {
                let ptr_expect = expect.map(|e| Ty::Ptr(Rc::new(e.clone())));
                let value = self.analyse_expr(ctx, ptr_expect.as_ref(), operand)?;
                let Ty::Ptr(elem) = value.ty.base() else {
                    return Err(vec![Error::ExpectPointer(operand_span)]);
                };
                Ok(hir::Expr {
                    ty: (*elem).clone(),
                    kind: hir::ExprKind::Deref(Box::new(value)),
                })
            }
        }
    }

    fn analyse_bin_op(
        &mut self,
        ctx: &mut BodyCtx,
        expect: Option<&Ty>,
        op: ast::BinOp,
        lhs: &ast::Expr,
        rhs: &ast::Expr,
    ) -> Result<hir::Expr, Errors> {
        let lhs_span = lhs.span;
        let rhs_span = rhs.span;
        match op {
            ast::BinOp::Add
            | ast::BinOp::Sub
            | ast::BinOp::Mul
            | ast::BinOp::Div
            | ast::BinOp::Mod => {
                let left = self.analyse_expr(ctx, expect, lhs)?;
                if !left.ty.base().is_number() {
                    return Err(vec![Error::ExpectNumber(lhs_span)]);
                }
                let ty = left.ty.clone();
                let right = self.analyse_expr(ctx, Some(&ty), rhs)?;
                let right = expect_expr(&ty, right, rhs_span)?;
                Ok(hir::Expr {
                    ty,
                    kind: hir::ExprKind::Arith(arith_op(op), Box::new(left), Box::new(right)),
                })
            }
            ast::BinOp::And
            | ast::BinOp::Or
            | ast::BinOp::Xor
            | ast::BinOp::Shl
            | ast::BinOp::Shr => {
                let left = self.analyse_expr(ctx, expect, lhs)?;
                if !left.ty.base().is_int() {
                    return Err(vec![Error::ExpectInteger(lhs_span)]);
                }
                let ty = left.ty.clone();
                let right = self.analyse_expr(ctx, Some(&ty), rhs)?;
                let right = expect_expr(&ty, right, rhs_span)?;
                Ok(hir::Expr {
                    ty,
                    kind: hir::ExprKind::Arith(arith_op(op), Box::new(left), Box::new(right)),
                })
            }
            ast::BinOp::AndAnd | ast::BinOp::OrOr => {
                let left = self.analyse_expr(ctx, expect, lhs)?;
                let left = expect_expr_and_son(&BOOL, left, lhs_span)?;
                let ty = left.ty.clone();
                let right = self.analyse_expr(ctx, Some(&ty), rhs)?;
                let right = expect_expr(&ty, right, rhs_span)?;
                let op = if op == ast::BinOp::AndAnd {
                    LogicOp::And
                } else {
                    LogicOp::Or
                };
                Ok(hir::Expr {
                    ty,
                    kind: hir::ExprKind::Logic(op, Box::new(left), Box::new(right)),
                })
            }
            ast::BinOp::Eq
            | ast::BinOp::Ne
            | ast::BinOp::Lt
            | ast::BinOp::Le
            | ast::BinOp::Gt
            | ast::BinOp::Ge => {
                let left = self.analyse_expr(ctx, None, lhs)?;
                if left.ty.is_none() {
                    return Err(vec![Error::ExpectValue(lhs_span)]);
                }
                let ordered = !matches!(op, ast::BinOp::Eq | ast::BinOp::Ne);
                if ordered && !left.ty.base().is_number() {
                    return Err(vec![Error::ExpectNumber(lhs_span)]);
                }
                let ty = left.ty.clone();
                let right = self.analyse_expr(ctx, Some(&ty), rhs)?;
                let right = expect_expr(&ty, right, rhs_span)?;
                Ok(hir::Expr {
                    ty: BOOL,
                    kind: hir::ExprKind::Cmp(cmp_op(op), Box::new(left), Box::new(right)),
                })
            }
        }
    }

    fn analyse_assign(
        &mut self,
        ctx: &mut BodyCtx,
        op: Option<ArithOp>,
        lhs: &ast::Expr,
        rhs: &ast::Expr,
    ) -> Result<hir::Expr, Errors> {
        let lhs_span = lhs.span;
        let rhs_span = rhs.span;
        let left = self.analyse_expr(ctx, None, lhs)?;
        if !left.is_mut() {
            return Err(vec![Error::ExpectMutable(lhs_span)]);
        }
        let ty = left.ty.clone();
        match op {
            Some(
                ArithOp::Add | ArithOp::Sub | ArithOp::Mul | ArithOp::Div | ArithOp::Mod,
            ) if !ty.base().is_number() => {
                return Err(vec![Error::ExpectNumber(lhs_span)]);
            }
            Some(ArithOp::And | ArithOp::Or | ArithOp::Xor | ArithOp::Shl | ArithOp::Shr)
                if !ty.base().is_int() =>
            {
                return Err(vec![Error::ExpectInteger(lhs_span)]);
            }
            _ => {}
        }
        let right = self.analyse_expr(ctx, Some(&ty), rhs)?;
        let right = expect_expr(&ty, right, rhs_span)?;
        Ok(hir::Expr {
            ty: Ty::None,
            kind: hir::ExprKind::Assign {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
            },
        })
    }

    fn analyse_call(
        &mut self,
        ctx: &mut BodyCtx,
        callee: &ast::Expr,
        args: &[ast::Expr],
        span: Span,
    ) -> Result<hir::Expr, Errors> {
        // Method call: a dotted callee whose receiver is a typedef (or
        // pointer to one) with a matching method.
        if let ast::ExprKind::Field(recv_ast, method_name) = &*callee.kind {
            let recv = self.analyse_expr(ctx, None, recv_ast)?;
            if let Some(def) = receiver_def(&recv.ty) {
                if let Some(method) = self.bind_method(ctx, &def, method_name)? {
                    return self.analyse_method_call(ctx, method, recv, args, span);
                }
            }
            return self.finish_call(ctx, self.field_access(recv, method_name, recv_ast.span)?, args, span);
        }

        // Built-in pseudo-functions are recognized only when the callee is a
        // bare identifier whose normal lookup failed.
        if let ast::ExprKind::Name { pkg: None, name } = &*callee.kind {
            if lookup_value(ctx, &name.name).is_none() {
                return self.builtin_call(ctx, name, args, span);
            }
        }

        let analysed = self.analyse_expr(ctx, None, callee)?;
        self.finish_call(ctx, analysed, args, span)
    }

    fn finish_call(
        &mut self,
        ctx: &mut BodyCtx,
        callee: hir::Expr,
        args: &[ast::Expr],
        span: Span,
    ) -> Result<hir::Expr, Errors> {
        let Ty::Func(func_ty) = callee.ty.base() else {
            return Err(vec![Error::ExpectFunction(span)]);
        };
        if func_ty.params.len() != args.len() {
            return Err(vec![Error::ExpectArguments(func_ty.params.len(), span)]);
        }

        let mut analysed = Vec::with_capacity(args.len());
        let mut errors = Vec::new();
        for (arg, param_ty) in args.iter().zip(&func_ty.params) {
            match self.expect_analysed(ctx, param_ty, arg) {
                Ok(expr) => analysed.push(expr),
                Err(errs) => errors.extend(errs),
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let (no_return, exit) = match &callee.kind {
            hir::ExprKind::Func(id) => {
                let func = self.program.func(*id);
                (func.no_return, func.exit)
            }
            _ => (false, false),
        };
        if no_return {
            ctx.set_end();
        }

        Ok(hir::Expr {
            ty: func_ty.ret.clone(),
            kind: hir::ExprKind::Call {
                callee: Box::new(callee),
                args: analysed,
                no_return,
                exit,
            },
        })
    }

    fn analyse_method_call(
        &mut self,
        ctx: &mut BodyCtx,
        method: Rc<hir::Func>,
        recv: hir::Expr,
        args: &[ast::Expr],
        span: Span,
    ) -> Result<hir::Expr, Errors> {
        if method.ty.params.len() - 1 != args.len() {
            return Err(vec![Error::ExpectArguments(
                method.ty.params.len() - 1,
                span,
            )]);
        }

        let mut analysed = Vec::with_capacity(args.len());
        let mut errors = Vec::new();
        for (arg, param_ty) in args.iter().zip(&method.ty.params[1..]) {
            match self.expect_analysed(ctx, param_ty, arg) {
                Ok(expr) => analysed.push(expr),
                Err(errs) => errors.extend(errs),
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        if method.no_return {
            ctx.set_end();
        }
        Ok(hir::Expr {
            ty: method.ty.ret.clone(),
            kind: hir::ExprKind::MethodCall {
                method: method.id,
                recv: Box::new(recv),
                args: analysed,
                no_return: method.no_return,
                exit: method.exit,
            },
        })
    }

    /// Looks up a method on the typedef's owning package; a method defined
    /// in another package must be `pub`.
    fn bind_method(
        &self,
        ctx: &BodyCtx,
        def: &Rc<TyDef>,
        name: &ast::Ident,
    ) -> Result<Option<Rc<hir::Func>>, Errors> {
        let Some(pkg) = self.package_of(def) else {
            return Ok(None);
        };
        let key = format!("{}.{}", def.name, name.name);
        let pkg = pkg.borrow();
        match pkg.values.get(key.as_str()) {
            Some((is_pub, Entry::Func(func))) => {
                if !*is_pub && pkg.path != ctx.pkg.borrow().path {
                    return Err(vec![Error::Unknown(name.name.to_string(), name.span)]);
                }
                Ok(Some(Rc::clone(func)))
            }
            _ => Ok(None),
        }
    }

    fn builtin_call(
        &mut self,
        ctx: &mut BodyCtx,
        name: &ast::Ident,
        args: &[ast::Expr],
        span: Span,
    ) -> Result<hir::Expr, Errors> {
        let builtin = name.name.as_ref();
        if !matches!(builtin, "len" | "typename" | "size") {
            return Err(vec![Error::UnknownIdent(name.span)]);
        }
        if args.len() != 1 {
            return Err(vec![Error::ExpectArguments(1, span)]);
        }
        let arg_span = args[0].span;
        let arg = self.analyse_expr(ctx, None, &args[0])?;
        match builtin {
            "len" => {
                let Ty::Array(array) = arg.ty.base() else {
                    return Err(vec![Error::ExpectArray(arg_span)]);
                };
                Ok(hir::Expr {
                    ty: USIZE,
                    kind: hir::ExprKind::Int(
                        array.size.try_into().expect("array size should fit into i64"),
                    ),
                })
            }
            "typename" => Ok(hir::Expr {
                ty: Ty::Ptr(Rc::new(Ty::Prim(Prim::I32))),
                kind: hir::ExprKind::Str(arg.ty.to_string().into()),
            }),
            "size" => Ok(hir::Expr {
                ty: USIZE,
                kind: hir::ExprKind::Int(
                    arg.ty
                        .byte_size()
                        .try_into()
                        .expect("type size should fit into i64"),
                ),
            }),
            _ => unreachable!("builtin names are checked above"),
        }
    }

    fn analyse_field(
        &mut self,
        ctx: &mut BodyCtx,
        from: &ast::Expr,
        name: &ast::Ident,
    ) -> Result<hir::Expr, Errors> {
        let from_span = from.span;
        let from = self.analyse_expr(ctx, None, from)?;
        self.field_access(from, name, from_span)
    }

    /// Struct field access, with one level of pointer auto-dereference.
    fn field_access(
        &self,
        from: hir::Expr,
        name: &ast::Ident,
        from_span: Span,
    ) -> Result<hir::Expr, Errors> {
        match from.ty.base() {
            Ty::Struct(s) => {
                if s.field_index(&name.name).is_none() {
                    return Err(vec![Error::UnknownIdent(name.span)]);
                }
                let ty = s
                    .fields
                    .iter()
                    .find(|(n, _)| *n == name.name)
                    .map(|(_, ty)| ty.clone())
                    .expect("field index was just found");
                Ok(hir::Expr {
                    ty,
                    kind: hir::ExprKind::Field(Box::new(from), Rc::clone(&name.name)),
                })
            }
            Ty::Ptr(elem) => {
                let Ty::Struct(s) = elem.base() else {
                    return Err(vec![Error::ExpectStruct(from_span)]);
                };
                if s.field_index(&name.name).is_none() {
                    return Err(vec![Error::UnknownIdent(name.span)]);
                }
                let ty = s
                    .fields
                    .iter()
                    .find(|(n, _)| *n == name.name)
                    .map(|(_, ty)| ty.clone())
                    .expect("field index was just found");
                let deref = hir::Expr {
                    ty: (*elem).clone(),
                    kind: hir::ExprKind::Deref(Box::new(from)),
                };
                Ok(hir::Expr {
                    ty,
                    kind: hir::ExprKind::Field(Box::new(deref), Rc::clone(&name.name)),
                })
            }
            _ => Err(vec![Error::ExpectStruct(from_span)]),
        }
    }

    fn analyse_index(
        &mut self,
        ctx: &mut BodyCtx,
        from: &ast::Expr,
        index: &ast::Expr,
    ) -> Result<hir::Expr, Errors> {
        let from_span = from.span;
        let index_span = index.span;
        let from = self.analyse_expr(ctx, None, from)?;
        match from.ty.base() {
            Ty::Array(array) => {
                let idx = self.analyse_expr(ctx, Some(&USIZE), index)?;
                let idx = expect_expr_and_son(&USIZE, idx, index_span)?;
                Ok(hir::Expr {
                    ty: array.elem.clone(),
                    kind: hir::ExprKind::Index(Box::new(from), Box::new(idx)),
                })
            }
            Ty::Ptr(elem) => {
                let idx = self.analyse_expr(ctx, Some(&USIZE), index)?;
                let idx = expect_expr_and_son(&USIZE, idx, index_span)?;
                Ok(hir::Expr {
                    ty: (*elem).clone(),
                    kind: hir::ExprKind::Index(Box::new(from), Box::new(idx)),
                })
            }
            Ty::Tuple(elems) => {
                let idx = self.analyse_expr(ctx, Some(&USIZE), index)?;
                let hir::ExprKind::Int(value) = idx.kind else {
                    return Err(vec![Error::ExpectIntegerLiteral(index_span)]);
                };
                let value = u64::try_from(value)
                    .ok()
                    .filter(|v| *v < elems.len() as u64)
                    .ok_or_else(|| vec![Error::IndexOutOfRange(index_span)])?;
                Ok(hir::Expr {
                    ty: elems[value as usize].clone(),
                    kind: hir::ExprKind::TupleIndex(Box::new(from), value),
                })
            }
            _ => Err(vec![Error::ExpectArrayOrTuple(from_span)]),
        }
    }

    fn analyse_cast(
        &mut self,
        ctx: &mut BodyCtx,
        operand: &ast::Expr,
        to: &ast::Ty,
        span: Span,
    ) -> Result<hir::Expr, Errors> {
        let to = super::ty::analyse_type(&ctx.pkg, Some(to))?;
        let value = self.analyse_expr(ctx, Some(&to), operand)?;
        let from = &value.ty;

        let from_ptr_like = from.base().is_ptr() || from.base().is_func();
        let to_ptr_like = to.base().is_ptr() || to.base().is_func();
        let allowed = from.depth_base() == to.depth_base()
            || (from.base().is_number() && to.base().is_number())
            || (from.base() == USIZE && to_ptr_like)
            || (from_ptr_like && to.base() == USIZE)
            || (from_ptr_like && to_ptr_like);
        if !allowed {
            return Err(vec![Error::Covert(to.to_string(), span)]);
        }

        Ok(hir::Expr {
            ty: to,
            kind: hir::ExprKind::Cast(Box::new(value)),
        })
    }

    fn analyse_ternary(
        &mut self,
        ctx: &mut BodyCtx,
        expect: Option<&Ty>,
        cond: &ast::Expr,
        t: &ast::Expr,
        e: &ast::Expr,
    ) -> Result<hir::Expr, Errors> {
        let cond_span = cond.span;
        let e_span = e.span;
        let cond = self.analyse_expr(ctx, Some(&BOOL), cond)?;
        let cond = expect_expr_and_son(&BOOL, cond, cond_span)?;
        let t = self.analyse_expr(ctx, expect, t)?;
        let e = self.analyse_expr(ctx, Some(&t.ty.clone()), e)?;
        let e = expect_expr_and_son(&t.ty.clone(), e, e_span)?;
        Ok(hir::Expr {
            ty: t.ty.clone(),
            kind: hir::ExprKind::Ternary(Box::new(cond), Box::new(t), Box::new(e)),
        })
    }

    /// Analyses a constant initializer expression: literals, empty
    /// aggregates, and aggregate literals of constants. Anything else is
    /// rejected.
    pub(crate) fn analyse_const_expr(
        &mut self,
        expect: Option<&Ty>,
        ast: &ast::Expr,
    ) -> Result<hir::Expr, Errors> {
        let span = ast.span;
        match &*ast.kind {
            ast::ExprKind::Int(_)
            | ast::ExprKind::Float(_)
            | ast::ExprKind::Bool(_)
            | ast::ExprKind::Char(_)
            | ast::ExprKind::Null => literal(expect, &ast.kind, span),
            // In constant position a string literal is the character array
            // itself rather than a pointer into an anonymous global.
            ast::ExprKind::Str(value) => Ok(hir::Expr {
                ty: Ty::Array(Rc::new(ArrayTy {
                    size: value.chars().count() as u64,
                    elem: Ty::Prim(Prim::I32),
                })),
                kind: hir::ExprKind::Str(Rc::clone(value)),
            }),
            ast::ExprKind::CStr(value) => Ok(hir::Expr {
                ty: Ty::Array(Rc::new(ArrayTy {
                    size: value.len() as u64,
                    elem: Ty::Prim(Prim::I8),
                })),
                kind: hir::ExprKind::CStr(Rc::clone(value)),
            }),
            ast::ExprKind::Tuple(elems) => {
                if elems.is_empty() {
                    let Some(expect) = expect else {
                        return Err(vec![Error::ExpectTupleType(span)]);
                    };
                    if !expect.base().is_tuple() {
                        return Err(vec![Error::ExpectTupleType(span)]);
                    }
                    return Ok(hir::Expr {
                        ty: expect.clone(),
                        kind: hir::ExprKind::Zero,
                    });
                }
                if elems.len() == 1 {
                    let is_one_tuple = expect.is_some_and(|e| match e.base() {
                        Ty::Tuple(tys) => tys.len() == 1,
                        _ => false,
                    });
                    if !is_one_tuple {
                        return self.analyse_const_expr(expect, &elems[0]);
                    }
                }
                let expects: Vec<Option<Ty>> = match expect.map(Ty::base) {
                    Some(Ty::Tuple(tys)) if tys.len() == elems.len() => {
                        tys.iter().map(|ty| Some(ty.clone())).collect()
                    }
                    _ => vec![None; elems.len()],
                };
                let mut analysed = Vec::with_capacity(elems.len());
                for (elem, elem_expect) in elems.iter().zip(&expects) {
                    analysed.push(self.analyse_const_expr(elem_expect.as_ref(), elem)?);
                }
                let mut ty = Ty::Tuple(analysed.iter().map(|e| e.ty.clone()).collect());
                if let Some(expect) = expect {
                    if expect.depth_base() == ty.depth_base() {
                        ty = expect.clone();
                    }
                }
                Ok(hir::Expr {
                    ty,
                    kind: hir::ExprKind::Tuple(analysed),
                })
            }
            ast::ExprKind::Array(elems) => {
                if elems.is_empty() {
                    let Some(expect) = expect else {
                        return Err(vec![Error::ExpectArrayType(span)]);
                    };
                    if !expect.base().is_array() {
                        return Err(vec![Error::ExpectArrayType(span)]);
                    }
                    return Ok(hir::Expr {
                        ty: expect.clone(),
                        kind: hir::ExprKind::Zero,
                    });
                }
                let elem_expect = match expect.map(Ty::base) {
                    Some(Ty::Array(a)) if a.size == elems.len() as u64 => Some(a.elem.clone()),
                    _ => None,
                };
                let mut analysed = Vec::with_capacity(elems.len());
                for elem in elems {
                    analysed.push(self.analyse_const_expr(elem_expect.as_ref(), elem)?);
                }
                let elem_ty = analysed[0].ty.clone();
                for (expr, elem) in analysed.iter().zip(elems).skip(1) {
                    if expr.ty != elem_ty {
                        return Err(vec![Error::ExpectType(elem_ty.to_string(), elem.span)]);
                    }
                }
                let mut ty = Ty::Array(Rc::new(ArrayTy {
                    size: analysed.len() as u64,
                    elem: elem_ty,
                }));
                if let Some(expect) = expect {
                    if expect.depth_base() == ty.depth_base() {
                        ty = expect.clone();
                    }
                }
                Ok(hir::Expr {
                    ty,
                    kind: hir::ExprKind::Array(analysed),
                })
            }
            ast::ExprKind::Struct(fields) => {
                let struct_ty = match expect.map(Ty::base) {
                    Some(Ty::Struct(s)) => s,
                    _ => return Err(vec![Error::ExpectStructType(span)]),
                };
                let expect = expect.expect("struct expectation should be present");
                if fields.is_empty() {
                    return Ok(hir::Expr {
                        ty: expect.clone(),
                        kind: hir::ExprKind::Zero,
                    });
                }
                if struct_ty.fields.len() != fields.len() {
                    return Err(vec![Error::ExpectFields(fields.len(), span)]);
                }
                let mut analysed = Vec::with_capacity(fields.len());
                for (field, (_, field_ty)) in fields.iter().zip(&struct_ty.fields) {
                    analysed.push(self.analyse_const_expr(Some(field_ty), field)?);
                }
                Ok(hir::Expr {
                    ty: expect.clone(),
                    kind: hir::ExprKind::Struct(analysed),
                })
            }
            _ => Err(vec![Error::ExpectConstValue(span)]),
        }
    }
}

/// Analyses a literal token under an optional expected type.
fn literal(expect: Option<&Ty>, kind: &ast::ExprKind, span: Span) -> Result<hir::Expr, Errors> {
    match kind {
        ast::ExprKind::Int(value) => {
            let expect = expect.filter(|e| e.base().is_number());
            match expect {
                Some(ty) if ty.base().is_float() => Ok(hir::Expr {
                    ty: ty.clone(),
                    kind: hir::ExprKind::Float(*value as f64),
                }),
                Some(ty) => Ok(hir::Expr {
                    ty: ty.clone(),
                    kind: hir::ExprKind::Int(*value),
                }),
                None => Ok(hir::Expr {
                    ty: Ty::Prim(Prim::Isize),
                    kind: hir::ExprKind::Int(*value),
                }),
            }
        }
        ast::ExprKind::Float(value) => {
            let ty = expect
                .filter(|e| e.base().is_float())
                .cloned()
                .unwrap_or(Ty::Prim(Prim::F64));
            Ok(hir::Expr {
                ty,
                kind: hir::ExprKind::Float(*value),
            })
        }
        ast::ExprKind::Bool(value) => {
            let ty = expect
                .filter(|e| e.base().is_bool())
                .cloned()
                .unwrap_or(BOOL);
            Ok(hir::Expr {
                ty,
                kind: hir::ExprKind::Bool(*value),
            })
        }
        ast::ExprKind::Char(value) => Ok(hir::Expr {
            ty: Ty::Prim(Prim::I32),
            kind: hir::ExprKind::Int(i64::from(u32::from(*value))),
        }),
        ast::ExprKind::Str(value) => {
            let default = Ty::Ptr(Rc::new(Ty::Prim(Prim::I32)));
            let ty = expect
                .filter(|e| e.depth_base() == default)
                .cloned()
                .unwrap_or(default);
            Ok(hir::Expr {
                ty,
                kind: hir::ExprKind::Str(Rc::clone(value)),
            })
        }
        ast::ExprKind::CStr(value) => {
            let default = Ty::Ptr(Rc::new(Ty::Prim(Prim::I8)));
            let ty = expect
                .filter(|e| e.depth_base() == default)
                .cloned()
                .unwrap_or(default);
            Ok(hir::Expr {
                ty,
                kind: hir::ExprKind::CStr(Rc::clone(value)),
            })
        }
        ast::ExprKind::Null => {
            let ok = expect.is_some_and(|e| e.base().is_ptr() || e.base().is_func());
            if !ok {
                return Err(vec![Error::ExpectPointerType(span)]);
            }
            Ok(hir::Expr {
                ty: expect.expect("null expectation should be present").clone(),
                kind: hir::ExprKind::Null,
            })
        }
        _ => unreachable!("only literal kinds reach here"),
    }
}

fn receiver_def(ty: &Ty) -> Option<Rc<TyDef>> {
    match ty {
        Ty::Def(def) => Some(Rc::clone(def)),
        Ty::Ptr(elem) => match elem.as_ref() {
            Ty::Def(def) => Some(Rc::clone(def)),
            _ => None,
        },
        _ => None,
    }
}

/// Looks a name up in the innermost scope outward: block locals, then
/// function parameters, then package globals.
fn lookup_value(ctx: &BodyCtx, name: &str) -> Option<hir::Expr> {
    for block in ctx.blocks.iter().rev() {
        if let Some((id, ty)) = block.locals.get(name) {
            return Some(hir::Expr {
                ty: ty.clone(),
                kind: hir::ExprKind::Local(*id),
            });
        }
    }
    if let Some(param) = ctx.func.params.get(name) {
        return Some(hir::Expr {
            ty: param.ty.clone(),
            kind: hir::ExprKind::Param(param.id),
        });
    }
    let pkg = ctx.pkg.borrow();
    pkg.values.get(name).map(|(_, entry)| entry_expr(entry))
}

fn entry_expr(entry: &Entry) -> hir::Expr {
    match entry {
        Entry::Func(func) => hir::Expr {
            ty: Ty::Func(Rc::clone(&func.ty)),
            kind: hir::ExprKind::Func(func.id),
        },
        Entry::Var(var) => hir::Expr {
            ty: var.ty.clone(),
            kind: hir::ExprKind::GlobalVar(var.id),
        },
    }
}

/// Requires an analysed expression to have exactly the expected type.
pub(crate) fn expect_expr(expect: &Ty, expr: hir::Expr, span: Span) -> Result<hir::Expr, Errors> {
    if expr.ty == *expect {
        Ok(expr)
    } else {
        Err(vec![Error::ExpectType(expect.to_string(), span)])
    }
}

/// Requires an analysed expression to match the expected type at the
/// depth-base level, which admits typedefs of the expected type.
pub(crate) fn expect_expr_and_son(
    expect: &Ty,
    expr: hir::Expr,
    span: Span,
) -> Result<hir::Expr, Errors> {
    if expr.ty.depth_base() == expect.depth_base() {
        Ok(expr)
    } else {
        Err(vec![Error::ExpectType(expect.to_string(), span)])
    }
}

fn arith_op(op: ast::BinOp) -> ArithOp {
    match op {
        ast::BinOp::Add => ArithOp::Add,
        ast::BinOp::Sub => ArithOp::Sub,
        ast::BinOp::Mul => ArithOp::Mul,
        ast::BinOp::Div => ArithOp::Div,
        ast::BinOp::Mod => ArithOp::Mod,
        ast::BinOp::And => ArithOp::And,
        ast::BinOp::Or => ArithOp::Or,
        ast::BinOp::Xor => ArithOp::Xor,
        ast::BinOp::Shl => ArithOp::Shl,
        ast::BinOp::Shr => ArithOp::Shr,
        _ => panic!("operator `{op:?}` is not arithmetic"),
    }
}

fn cmp_op(op: ast::BinOp) -> CmpOp {
    match op {
        ast::BinOp::Eq => CmpOp::Eq,
        ast::BinOp::Ne => CmpOp::Ne,
        ast::BinOp::Lt => CmpOp::Lt,
        ast::BinOp::Le => CmpOp::Le,
        ast::BinOp::Gt => CmpOp::Gt,
        ast::BinOp::Ge => CmpOp::Ge,
        _ => panic!("operator `{op:?}` is not a comparison"),
    }
}
