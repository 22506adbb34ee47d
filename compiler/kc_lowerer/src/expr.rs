// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! Expression lowering. Expressions lower in one of two modes: value mode
//! produces the value itself, address mode produces a pointer to it.
//! Addressable expressions (locals, globals, dereferences, element
//! accesses) support both; taking the address of anything else materializes
//! it into a temporary stack slot first.

use crate::{ty::lower_ty, GlobalRef, Lowerer};
use kc_hir::hir;
use kc_ssa::ssa::{BinOp, CmpOp, Const, ConvertOp, Ty, Value, I8, USIZE};

impl Lowerer {
    /// Lowers an expression; the result is `None` exactly when the
    /// expression's type is `none` (a call to a function without a return
    /// value, or an assignment).
    pub(crate) fn lower_expr(&mut self, expr: &hir::Expr, want_value: bool) -> Option<Value> {
        match &expr.kind {
            hir::ExprKind::Int(value) => {
                Some(Value::Const(Const::Int(lower_ty(&expr.ty), *value)))
            }
            hir::ExprKind::Float(value) => {
                Some(Value::Const(Const::Float(lower_ty(&expr.ty), *value)))
            }
            hir::ExprKind::Bool(value) => {
                Some(Value::Const(Const::Int(I8, i64::from(*value))))
            }
            hir::ExprKind::Null | hir::ExprKind::Zero => {
                Some(Value::Const(Const::Zero(lower_ty(&expr.ty))))
            }
            hir::ExprKind::Str(value) => {
                let elems = value
                    .chars()
                    .map(|c| Const::Int(Ty::Sint(4), i64::from(u32::from(c))))
                    .collect();
                Some(self.string_global(Const::Array(elems)))
            }
            hir::ExprKind::CStr(value) => {
                let elems = value
                    .iter()
                    .map(|b| Const::Int(I8, i64::from(*b)))
                    .collect();
                Some(self.string_global(Const::Array(elems)))
            }
            hir::ExprKind::Array(elems) => Some(self.aggregate(&expr.ty, elems, true)),
            hir::ExprKind::Tuple(elems) | hir::ExprKind::Struct(elems) => {
                Some(self.aggregate(&expr.ty, elems, false))
            }
            hir::ExprKind::Param(id) | hir::ExprKind::Local(id) => {
                let slot = self.locals[id].clone();
                Some(self.maybe_load(slot, want_value))
            }
            hir::ExprKind::GlobalVar(id) => {
                let GlobalRef::Var(global) = self.globals[id] else {
                    unreachable!("variable reference maps to a module global");
                };
                let value = self.module.global_value(global);
                Some(self.maybe_load(value, want_value))
            }
            hir::ExprKind::Func(id) => {
                let GlobalRef::Func(func) = self.globals[id] else {
                    unreachable!("function reference maps to a module function");
                };
                Some(self.module.func_value(func))
            }
            hir::ExprKind::Arith(op, lhs, rhs) => {
                let lhs = self.value(lhs);
                let rhs = self.value(rhs);
                let block = self.block;
                Some(self.func().new_bin(block, bin_op(*op), lhs, rhs))
            }
            hir::ExprKind::Logic(op, lhs, rhs) => Some(self.lower_logic(*op, lhs, rhs)),
            hir::ExprKind::Cmp(op, lhs, rhs) => Some(self.lower_cmp(*op, lhs, rhs)),
            hir::ExprKind::Assign { op, lhs, rhs } => {
                self.lower_assign(*op, lhs, rhs);
                None
            }
            hir::ExprKind::Not(operand) => {
                let value = self.value(operand);
                let block = self.block;
                Some(self.func().new_bin(
                    block,
                    BinOp::Xor,
                    value,
                    Value::Const(Const::Int(I8, 1)),
                ))
            }
            hir::ExprKind::AddrOf(operand) => self.lower_expr(operand, false),
            hir::ExprKind::Deref(operand) => {
                let value = self.value(operand);
                Some(self.maybe_load(value, want_value))
            }
            hir::ExprKind::Call {
                callee,
                args,
                no_return,
                exit,
            } => {
                let callee = self.value(callee);
                let args = args.iter().map(|arg| self.value(arg)).collect();
                self.emit_call(callee, args, *no_return, *exit)
            }
            hir::ExprKind::MethodCall {
                method,
                recv,
                args,
                no_return,
                exit,
            } => {
                let (callee, recv) = self.method_operands(*method, recv);
                let mut values = vec![recv];
                for arg in args {
                    values.push(self.value(arg));
                }
                self.emit_call(callee, values, *no_return, *exit)
            }
            hir::ExprKind::Index(from, index) => {
                let ptr = if from.ty.base().is_ptr() {
                    let from = self.value(from);
                    let index = self.value(index);
                    let block = self.block;
                    self.func().new_ptr_index(block, from, index)
                } else {
                    let from = self.addr_of(from);
                    let index = self.value(index);
                    let block = self.block;
                    self.func().new_array_index(block, from, index)
                };
                Some(self.maybe_load(ptr, want_value))
            }
            hir::ExprKind::TupleIndex(from, index) => {
                let from = self.addr_of(from);
                let block = self.block;
                let ptr = self.func().new_struct_index(block, from, *index);
                Some(self.maybe_load(ptr, want_value))
            }
            hir::ExprKind::Field(from, name) => {
                let index = field_index(from, name);
                let from = self.addr_of(from);
                let block = self.block;
                let ptr = self.func().new_struct_index(block, from, index);
                Some(self.maybe_load(ptr, want_value))
            }
            hir::ExprKind::Cast(operand) => Some(self.lower_cast(operand, &expr.ty)),
            hir::ExprKind::Ternary(cond, t, e) => self.lower_ternary(cond, t, e, want_value),
        }
    }

    /// Lowers an expression in value mode, asserting that it has one.
    pub(crate) fn value(&mut self, expr: &hir::Expr) -> Value {
        self.lower_expr(expr, true)
            .expect("expression should produce a value")
    }

    /// Produces a pointer to the expression's value: addressable
    /// expressions lower in address mode, temporaries are materialized into
    /// a fresh stack slot.
    pub(crate) fn addr_of(&mut self, expr: &hir::Expr) -> Value {
        if expr.is_temporary() {
            let value = self.value(expr);
            let block = self.block;
            let slot = self.func().new_alloc(block, value.ty());
            self.func().new_store(block, value, slot.clone());
            slot
        } else {
            self.lower_expr(expr, false)
                .expect("addressable expression should produce a value")
        }
    }

    fn maybe_load(&mut self, ptr: Value, want_value: bool) -> Value {
        if want_value {
            let block = self.block;
            self.func().new_load(block, ptr)
        } else {
            ptr
        }
    }

    /// A string or C-string literal becomes an unnamed module global; its
    /// value is the address of element zero.
    fn string_global(&mut self, data: Const) -> Value {
        let ty = data.ty();
        let id = self.module.new_global(None, ty, Some(data));
        let global = self.module.global_value(id);
        let block = self.block;
        self.func()
            .new_array_index(block, global, Value::Const(Const::Int(USIZE, 0)))
    }

    /// An aggregate literal is materialized in a stack slot field by field,
    /// then loaded.
    fn aggregate(&mut self, ty: &kc_hir::ty::Ty, elems: &[hir::Expr], array: bool) -> Value {
        let ty = lower_ty(ty);
        let block = self.block;
        let slot = self.func().new_alloc(block, ty);
        for (i, elem) in elems.iter().enumerate() {
            let i = i as u64;
            let block = self.block;
            let ptr = if array {
                let index = Value::Const(Const::Int(USIZE, i as i64));
                self.func().new_array_index(block, slot.clone(), index)
            } else {
                self.func().new_struct_index(block, slot.clone(), i)
            };
            let value = self.value(elem);
            let block = self.block;
            self.func().new_store(block, value, ptr);
        }
        let block = self.block;
        self.func().new_load(block, slot)
    }

    /// Short-circuit `&&`/`||`: the right-hand side evaluates in its own
    /// block, and a phi merges it with the constant the left-hand side
    /// produces on the short-circuit edge (0 for `&&`, 1 for `||`).
    fn lower_logic(&mut self, op: hir::LogicOp, lhs: &hir::Expr, rhs: &hir::Expr) -> Value {
        let lhs = self.value(lhs);
        let next = self.func().new_block();
        let end = self.func().new_block();
        let before = self.block;
        let short_circuit = match op {
            hir::LogicOp::And => {
                self.func().new_cond_goto(before, lhs, next, end);
                Const::Int(I8, 0)
            }
            hir::LogicOp::Or => {
                self.func().new_cond_goto(before, lhs, end, next);
                Const::Int(I8, 1)
            }
        };

        self.block = next;
        let rhs = self.value(rhs);
        let next_end = self.block;
        self.func().new_goto(next_end, end);

        self.block = end;
        self.func().new_phi(
            end,
            vec![(before, Value::Const(short_circuit)), (next_end, rhs)],
        )
    }

    fn lower_cmp(&mut self, op: hir::CmpOp, lhs: &hir::Expr, rhs: &hir::Expr) -> Value {
        match op {
            hir::CmpOp::Eq => self.lower_equal(lhs, rhs),
            hir::CmpOp::Ne => {
                let equal = self.lower_equal(lhs, rhs);
                let block = self.block;
                self.func().new_bin(
                    block,
                    BinOp::Xor,
                    equal,
                    Value::Const(Const::Int(I8, 1)),
                )
            }
            hir::CmpOp::Lt | hir::CmpOp::Le | hir::CmpOp::Gt | hir::CmpOp::Ge => {
                let lhs = self.value(lhs);
                let rhs = self.value(rhs);
                let block = self.block;
                let op = match op {
                    hir::CmpOp::Lt => CmpOp::Lt,
                    hir::CmpOp::Le => CmpOp::Le,
                    hir::CmpOp::Gt => CmpOp::Gt,
                    hir::CmpOp::Ge => CmpOp::Ge,
                    hir::CmpOp::Eq | hir::CmpOp::Ne => unreachable!("handled above"),
                };
                self.func().new_cmp(block, op, lhs, rhs)
            }
        }
    }

    /// Scalar equality is a single comparison; aggregate equality lowers to
    /// element-wise recursive equality with short-circuit on inequality.
    fn lower_equal(&mut self, lhs: &hir::Expr, rhs: &hir::Expr) -> Value {
        let ty = lower_ty(&lhs.ty);
        if ty.is_number() || ty.is_ptr() {
            let lhs = self.value(lhs);
            let rhs = self.value(rhs);
            let block = self.block;
            return self.func().new_cmp(block, CmpOp::Eq, lhs, rhs);
        }
        let lhs = self.addr_of(lhs);
        let rhs = self.addr_of(rhs);
        self.aggregate_eq(lhs, rhs, &ty)
    }

    /// `lhs` and `rhs` are pointers to values of type `ty`.
    fn aggregate_eq(&mut self, lhs: Value, rhs: Value, ty: &Ty) -> Value {
        match ty {
            _ if ty.is_number() || ty.is_ptr() => {
                let block = self.block;
                let lhs = self.func().new_load(block, lhs);
                let rhs = self.func().new_load(block, rhs);
                let block = self.block;
                self.func().new_cmp(block, CmpOp::Eq, lhs, rhs)
            }
            Ty::Array(size, elem) => {
                if *size == 0 {
                    return Value::Const(Const::Int(I8, 1));
                }
                let block = self.block;
                let counter = self.func().new_alloc(block, USIZE);
                self.func().new_store(
                    block,
                    Value::Const(Const::Int(USIZE, 0)),
                    counter.clone(),
                );
                let cond = self.func().new_block();
                self.func().new_goto(block, cond);

                self.block = cond;
                let index = self.func().new_load(cond, counter.clone());
                let body = self.func().new_block();
                let end = self.func().new_block();
                let in_bounds = self.func().new_cmp(
                    cond,
                    CmpOp::Lt,
                    index.clone(),
                    Value::Const(Const::Int(USIZE, *size as i64)),
                );
                self.func().new_cond_goto(cond, in_bounds, body, end);

                self.block = body;
                let lhs_elem = self.func().new_array_index(body, lhs, index.clone());
                let rhs_elem = self.func().new_array_index(body, rhs, index.clone());
                let next = self.func().new_bin(
                    body,
                    BinOp::Add,
                    index,
                    Value::Const(Const::Int(USIZE, 1)),
                );
                self.func().new_store(body, next, counter);
                let elem_eq = self.aggregate_eq(lhs_elem, rhs_elem, elem.as_ref());
                let body_end = self.block;
                self.func().new_cond_goto(body_end, elem_eq, cond, end);

                self.block = end;
                self.func().new_phi(
                    end,
                    vec![
                        (cond, Value::Const(Const::Int(I8, 1))),
                        (body_end, Value::Const(Const::Int(I8, 0))),
                    ],
                )
            }
            Ty::Struct(elems) => {
                if elems.is_empty() {
                    return Value::Const(Const::Int(I8, 1));
                }
                let end = self.func().new_block();
                let mut incoming = Vec::with_capacity(elems.len());
                for (i, elem) in elems.iter().enumerate() {
                    let block = self.block;
                    let lhs_elem =
                        self.func()
                            .new_struct_index(block, lhs.clone(), i as u64);
                    let rhs_elem =
                        self.func()
                            .new_struct_index(block, rhs.clone(), i as u64);
                    let eq = self.aggregate_eq(lhs_elem, rhs_elem, elem);
                    let after = self.block;
                    incoming.push((after, eq.clone()));
                    if i < elems.len() - 1 {
                        let next = self.func().new_block();
                        self.func().new_cond_goto(after, eq, next, end);
                        self.block = next;
                    } else {
                        self.func().new_goto(after, end);
                    }
                }
                self.block = end;
                self.func().new_phi(end, incoming)
            }
            _ => unreachable!("aggregate equality applies to arrays and structs"),
        }
    }

    fn lower_assign(&mut self, op: Option<hir::ArithOp>, lhs: &hir::Expr, rhs: &hir::Expr) {
        let addr = self.lower_expr(lhs, false).expect("assignment target");
        let rhs = self.value(rhs);
        let value = match op {
            None => rhs,
            // Compound assignment desugars to load-op-store.
            Some(op) => {
                let block = self.block;
                let current = self.func().new_load(block, addr.clone());
                let block = self.block;
                self.func().new_bin(block, bin_op(op), current, rhs)
            }
        };
        let block = self.block;
        self.func().new_store(block, value, addr);
    }

    fn emit_call(
        &mut self,
        callee: Value,
        args: Vec<Value>,
        no_return: bool,
        exit: bool,
    ) -> Option<Value> {
        if exit {
            self.run_defers();
        }
        let block = self.block;
        let result = self.func().new_call(block, callee, args);
        if no_return {
            let block = self.block;
            self.func().new_unreachable(block);
        }
        result
    }

    /// The callee operand of a method call, plus the receiver threaded as
    /// the first argument: already a pointer, or materialized to one.
    pub(crate) fn method_operands(
        &mut self,
        method: hir::GlobalId,
        recv: &hir::Expr,
    ) -> (Value, Value) {
        let GlobalRef::Func(func) = self.globals[&method] else {
            unreachable!("method reference maps to a module function");
        };
        let callee = self.module.func_value(func);
        let recv = if recv.ty.base().is_ptr() {
            self.value(recv)
        } else {
            self.addr_of(recv)
        };
        (callee, recv)
    }

    fn lower_cast(&mut self, operand: &hir::Expr, to: &kc_hir::ty::Ty) -> Value {
        let value = self.value(operand);
        let from_ty = value.ty();
        let to_ty = lower_ty(to);
        if from_ty == to_ty {
            return value;
        }
        let op = match (
            from_ty.is_int(),
            from_ty.is_float(),
            to_ty.is_int(),
            to_ty.is_float(),
        ) {
            (true, _, true, _) => ConvertOp::Itoi,
            (true, _, _, true) => ConvertOp::Itof,
            (_, true, true, _) => ConvertOp::Ftoi,
            (_, true, _, true) => ConvertOp::Ftof,
            (true, _, false, false) => ConvertOp::Itop,
            (false, false, true, _) => ConvertOp::Ptoi,
            _ => ConvertOp::Ptop,
        };
        let block = self.block;
        self.func().new_convert(block, op, value, to_ty)
    }

    /// A ternary lowers to two arms joined by a phi; the address/value mode
    /// threads through the arms.
    fn lower_ternary(
        &mut self,
        cond: &hir::Expr,
        t: &hir::Expr,
        e: &hir::Expr,
        want_value: bool,
    ) -> Option<Value> {
        let cond = self.value(cond);
        let then = self.func().new_block();
        let els = self.func().new_block();
        let end = self.func().new_block();
        let before = self.block;
        self.func().new_cond_goto(before, cond, then, els);

        self.block = then;
        let t = self.lower_expr(t, want_value);
        let then_end = self.block;
        self.func().new_goto(then_end, end);

        self.block = els;
        let e = self.lower_expr(e, want_value);
        let els_end = self.block;
        self.func().new_goto(els_end, end);

        self.block = end;
        match (t, e) {
            (Some(t), Some(e)) => {
                Some(self.func().new_phi(end, vec![(then_end, t), (els_end, e)]))
            }
            _ => None,
        }
    }
}

impl Lowerer {
    /// Lowers a constant initializer. In constant position string literals
    /// are arrays, not pointers, so every constant shape maps directly.
    pub(crate) fn lower_const(&mut self, expr: &hir::Expr) -> Const {
        match &expr.kind {
            hir::ExprKind::Int(value) => Const::Int(lower_ty(&expr.ty), *value),
            hir::ExprKind::Float(value) => Const::Float(lower_ty(&expr.ty), *value),
            hir::ExprKind::Bool(value) => Const::Int(I8, i64::from(*value)),
            hir::ExprKind::Null | hir::ExprKind::Zero => Const::Zero(lower_ty(&expr.ty)),
            hir::ExprKind::Str(value) => Const::Array(
                value
                    .chars()
                    .map(|c| Const::Int(Ty::Sint(4), i64::from(u32::from(c))))
                    .collect(),
            ),
            hir::ExprKind::CStr(value) => Const::Array(
                value
                    .iter()
                    .map(|b| Const::Int(I8, i64::from(*b)))
                    .collect(),
            ),
            hir::ExprKind::Array(elems) => {
                Const::Array(elems.iter().map(|e| self.lower_const(e)).collect())
            }
            hir::ExprKind::Tuple(elems) | hir::ExprKind::Struct(elems) => {
                Const::Struct(elems.iter().map(|e| self.lower_const(e)).collect())
            }
            _ => unreachable!("global initializers are constant"),
        }
    }
}

fn field_index(from: &hir::Expr, name: &str) -> u64 {
    let kc_hir::ty::Ty::Struct(s) = from.ty.base() else {
        panic!("field access requires a struct");
    };
    s.field_index(name)
        .expect("field should be resolved during analysis") as u64
}

fn bin_op(op: hir::ArithOp) -> BinOp {
    match op {
        hir::ArithOp::Add => BinOp::Add,
        hir::ArithOp::Sub => BinOp::Sub,
        hir::ArithOp::Mul => BinOp::Mul,
        hir::ArithOp::Div => BinOp::Div,
        hir::ArithOp::Mod => BinOp::Mod,
        hir::ArithOp::And => BinOp::And,
        hir::ArithOp::Or => BinOp::Or,
        hir::ArithOp::Xor => BinOp::Xor,
        hir::ArithOp::Shl => BinOp::Shl,
        hir::ArithOp::Shr => BinOp::Shr,
    }
}
