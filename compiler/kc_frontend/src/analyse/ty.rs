// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! Type annotation resolution and the typedef pass.

use super::{Analyser, Error, Errors, PackageRef};
use kc_ast::ast;
use kc_hir::ty::{ArrayTy, FuncTy, Prim, StructTy, Ty, TyDef};
use std::{cell::RefCell, rc::Rc};

impl Analyser<'_> {
    /// Registers every typedef of the package, then resolves their
    /// destination types against the now-populated table, then rejects
    /// illegal cycles. Duplicate names abort before resolution; resolution
    /// and circularity errors are aggregated.
    pub(crate) fn typedef_pass(
        &mut self,
        ctx: &PackageRef,
        ast: &ast::Package,
    ) -> Result<(), Errors> {
        let mut errors = Vec::new();
        let mut typedefs = Vec::new();
        for global in ast.files.iter().flat_map(|f| &f.globals) {
            let ast::GlobalKind::TyDef { is_pub, name, dst } = &global.kind else {
                continue;
            };
            if let Some(attr) = global.attrs.first() {
                errors.push(Error::BadAttr(attr.span));
                continue;
            }
            let mut pkg = ctx.borrow_mut();
            if pkg.typedefs.contains_key(&name.name) {
                errors.push(Error::DuplicateIdent(name.span));
                continue;
            }
            let def = Rc::new(TyDef {
                package: pkg.path.clone(),
                name: Rc::clone(&name.name),
                dst: RefCell::new(None),
            });
            pkg.typedefs
                .insert(Rc::clone(&name.name), (*is_pub, Rc::clone(&def)));
            typedefs.push((name, dst, def));
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        for (_, dst_ast, def) in &typedefs {
            match analyse_type(ctx, Some(*dst_ast)) {
                Ok(dst) => *def.dst.borrow_mut() = Some(dst),
                Err(errs) => errors.extend(errs),
            }
        }

        for (name, _, def) in &typedefs {
            let mut stack = Vec::new();
            if has_cycle(&mut stack, &Ty::Def(Rc::clone(def))) {
                errors.push(Error::CircularReference(name.span));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Resolves a type annotation. `None` is the absent annotation, which means
/// the `none` type.
pub(crate) fn analyse_type(ctx: &PackageRef, ast: Option<&ast::Ty>) -> Result<Ty, Errors> {
    let Some(ast) = ast else {
        return Ok(Ty::None);
    };
    match &*ast.kind {
        ast::TyKind::Name { pkg: None, name } => {
            if let Some(prim) = prim_ty(&name.name) {
                return Ok(Ty::Prim(prim));
            }
            let pkg = ctx.borrow();
            match pkg.typedefs.get(&name.name) {
                Some((_, def)) => Ok(Ty::Def(Rc::clone(def))),
                None => Err(vec![Error::UnknownIdent(name.span)]),
            }
        }
        ast::TyKind::Name {
            pkg: Some(pkg),
            name,
        } => {
            let sub = ctx.borrow().externs.get(&pkg.name).map(Rc::clone);
            let Some(sub) = sub else {
                return Err(vec![Error::Unknown(pkg.name.to_string(), pkg.span)]);
            };
            if let Some(prim) = prim_ty(&name.name) {
                return Ok(Ty::Prim(prim));
            }
            let sub = sub.borrow();
            match sub.typedefs.get(&name.name) {
                Some((true, def)) => Ok(Ty::Def(Rc::clone(def))),
                _ => Err(vec![Error::Unknown(name.name.to_string(), name.span)]),
            }
        }
        ast::TyKind::Ptr(elem) => Ok(Ty::Ptr(Rc::new(analyse_type(ctx, Some(elem))?))),
        ast::TyKind::Func(params, ret) => {
            let ret = analyse_type(ctx, ret.as_ref())?;
            let mut tys = Vec::with_capacity(params.len());
            let mut errors = Vec::new();
            for param in params {
                match analyse_type(ctx, Some(param)) {
                    Ok(ty) => tys.push(ty),
                    Err(errs) => errors.extend(errs),
                }
            }
            if errors.is_empty() {
                Ok(Ty::Func(Rc::new(FuncTy { ret, params: tys })))
            } else {
                Err(errors)
            }
        }
        ast::TyKind::Array(size, elem) => {
            let elem = analyse_type(ctx, Some(elem))?;
            Ok(Ty::Array(Rc::new(ArrayTy { size: *size, elem })))
        }
        ast::TyKind::Tuple(elems) => {
            let mut tys = Vec::with_capacity(elems.len());
            let mut errors = Vec::new();
            for elem in elems {
                match analyse_type(ctx, Some(elem)) {
                    Ok(ty) => tys.push(ty),
                    Err(errs) => errors.extend(errs),
                }
            }
            if errors.is_empty() {
                Ok(Ty::Tuple(tys.into()))
            } else {
                Err(errors)
            }
        }
        ast::TyKind::Struct(fields) => {
            let mut tys: Vec<(Rc<str>, Ty)> = Vec::with_capacity(fields.len());
            let mut errors = Vec::new();
            for field in fields {
                match analyse_type(ctx, Some(&field.ty)) {
                    Ok(ty) => {
                        if tys.iter().any(|(name, _)| *name == field.name.name) {
                            errors.push(Error::DuplicateIdent(field.name.span));
                        } else {
                            tys.push((Rc::clone(&field.name.name), ty));
                        }
                    }
                    Err(errs) => errors.extend(errs),
                }
            }
            if errors.is_empty() {
                Ok(Ty::Struct(Rc::new(StructTy { fields: tys })))
            } else {
                Err(errors)
            }
        }
    }
}

fn prim_ty(name: &str) -> Option<Prim> {
    match name {
        "i8" => Some(Prim::I8),
        "i16" => Some(Prim::I16),
        "i32" => Some(Prim::I32),
        "i64" => Some(Prim::I64),
        "isize" => Some(Prim::Isize),
        "u8" => Some(Prim::U8),
        "u16" => Some(Prim::U16),
        "u32" => Some(Prim::U32),
        "u64" => Some(Prim::U64),
        "usize" => Some(Prim::Usize),
        "f32" => Some(Prim::F32),
        "f64" => Some(Prim::F64),
        "bool" => Some(Prim::Bool),
        _ => None,
    }
}

/// Walks a typedef destination looking for a cycle back to a typedef still
/// on the walk stack. Pointer and function edges never propagate the
/// search, which is what makes `type List *List` legal while pure
/// structural cycles like `type S struct { f: S }` are rejected.
fn has_cycle(stack: &mut Vec<*const TyDef>, ty: &Ty) -> bool {
    match ty {
        Ty::None | Ty::Prim(_) | Ty::Func(_) | Ty::Ptr(_) => false,
        Ty::Array(a) => has_cycle(stack, &a.elem),
        Ty::Tuple(elems) => elems.iter().any(|elem| has_cycle(stack, elem)),
        Ty::Struct(s) => s.fields.iter().any(|(_, field)| has_cycle(stack, field)),
        Ty::Def(def) => {
            let ptr = Rc::as_ptr(def);
            if stack.contains(&ptr) {
                return true;
            }
            let Some(dst) = def.dst.borrow().clone() else {
                return false;
            };
            stack.push(ptr);
            let found = has_cycle(stack, &dst);
            stack.pop();
            found
        }
    }
}
