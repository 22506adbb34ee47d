// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! Type lowering: typedefs are erased, `bool` becomes `i8`, tuples and
//! structs collapse to the struct shape, and function types become function
//! addresses.

use kc_hir::ty::{self as hir_ty, Prim, Ty as HirTy, TyDef};
use kc_ssa::ssa::{FuncTy, Ty};
use std::rc::Rc;

pub(crate) fn lower_ty(ty: &HirTy) -> Ty {
    let mut in_progress = Vec::new();
    lower(&mut in_progress, ty)
}

pub(crate) fn lower_func_ty(func: &hir_ty::FuncTy) -> FuncTy {
    let mut in_progress = Vec::new();
    lower_func(&mut in_progress, func)
}

/// `in_progress` holds the typedefs currently being erased. A typedef that
/// refers back to itself can only do so through a pointer, and the pointee
/// behind such a back-edge lowers to the opaque type: its size is never
/// needed, since only the pointer to it is.
fn lower(in_progress: &mut Vec<*const TyDef>, ty: &HirTy) -> Ty {
    match ty {
        HirTy::None => Ty::None,
        HirTy::Prim(prim) => match prim {
            Prim::I8 => Ty::Sint(1),
            Prim::I16 => Ty::Sint(2),
            Prim::I32 => Ty::Sint(4),
            Prim::I64 | Prim::Isize => Ty::Sint(8),
            Prim::U8 => Ty::Uint(1),
            Prim::U16 => Ty::Uint(2),
            Prim::U32 => Ty::Uint(4),
            Prim::U64 | Prim::Usize => Ty::Uint(8),
            Prim::F32 => Ty::Float(4),
            Prim::F64 => Ty::Float(8),
            Prim::Bool => Ty::Sint(1),
        },
        HirTy::Func(func) => Ty::Ptr(Rc::new(Ty::Func(Rc::new(lower_func(in_progress, func))))),
        HirTy::Array(array) => Ty::Array(array.size, Rc::new(lower(in_progress, &array.elem))),
        HirTy::Tuple(elems) => Ty::Struct(elems.iter().map(|e| lower(in_progress, e)).collect()),
        HirTy::Struct(s) => Ty::Struct(
            s.fields
                .iter()
                .map(|(_, field)| lower(in_progress, field))
                .collect(),
        ),
        HirTy::Ptr(elem) => Ty::Ptr(Rc::new(lower(in_progress, elem))),
        HirTy::Def(def) => {
            let ptr = Rc::as_ptr(def);
            if in_progress.contains(&ptr) {
                return Ty::Opaque;
            }
            in_progress.push(ptr);
            let lowered = lower(in_progress, &def.dst());
            in_progress.pop();
            lowered
        }
    }
}

fn lower_func(in_progress: &mut Vec<*const TyDef>, func: &hir_ty::FuncTy) -> FuncTy {
    FuncTy {
        ret: lower(in_progress, &func.ret),
        params: func
            .params
            .iter()
            .map(|param| lower(in_progress, param))
            .collect(),
    }
}
