// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! The value-declaration and value-definition passes: function and method
//! headers, global variables, attribute legality, and function bodies.

use super::{ty::analyse_type, Analyser, BodyCtx, Entry, Error, Errors, PackageRef};
use kc_ast::ast;
use kc_data_structures::span::Span;
use kc_hir::{
    hir,
    ty::{FuncTy, Ty},
};
use rustc_hash::FxHashMap;
use std::{cell::RefCell, path::PathBuf, rc::Rc};

/// The function-shaped attributes gathered from one declaration.
#[derive(Default)]
struct AttrInfo {
    extern_name: Option<Rc<str>>,
    no_return: bool,
    exit: bool,
    inline: Option<bool>,
}

/// Which attributes a declaration kind accepts.
#[derive(Clone, Copy, Eq, PartialEq)]
enum AttrTarget {
    Function,
    /// Methods take no linkage attributes.
    Method,
    GlobalVar,
}

impl Analyser<'_> {
    pub(crate) fn decl_pass(&mut self, ctx: &PackageRef, ast: &ast::Package) -> Result<(), Errors> {
        let mut errors = Vec::new();
        for global in ast.files.iter().flat_map(|f| &f.globals) {
            let result = match &global.kind {
                ast::GlobalKind::Func(decl) => self.function_decl(ctx, &global.attrs, decl),
                ast::GlobalKind::Method(decl) => self.method_decl(ctx, &global.attrs, decl),
                ast::GlobalKind::Let(decl) => self.global_var_decl(ctx, &global.attrs, decl),
                ast::GlobalKind::Import { .. } | ast::GlobalKind::TyDef { .. } => Ok(()),
            };
            if let Err(errs) = result {
                errors.extend(errs);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub(crate) fn def_pass(&mut self, ctx: &PackageRef, ast: &ast::Package) -> Result<(), Errors> {
        let mut errors = Vec::new();
        for global in ast.files.iter().flat_map(|f| &f.globals) {
            let result = match &global.kind {
                ast::GlobalKind::Func(decl) if decl.body.is_some() => {
                    self.function_def(ctx, decl)
                }
                ast::GlobalKind::Method(decl) => self.method_def(ctx, decl),
                _ => Ok(()),
            };
            if let Err(errs) = result {
                errors.extend(errs);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn function_decl(
        &mut self,
        ctx: &PackageRef,
        attrs: &[ast::Attr],
        decl: &ast::FuncDecl,
    ) -> Result<(), Errors> {
        let ret = analyse_type(ctx, decl.ret.as_ref())?;
        let param_tys = self.param_types(ctx, &decl.params)?;

        let info = self.apply_attrs(ctx, attrs, AttrTarget::Function)?;
        let mut errors = Vec::new();
        if info.extern_name.is_none() && decl.body.is_none() {
            errors.push(Error::MissingBody(decl.name.span));
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        self.register_func(
            ctx,
            decl.is_pub,
            Rc::clone(&decl.name.name),
            decl.name.span,
            ret,
            param_tys,
            info,
        )
    }

    fn method_decl(
        &mut self,
        ctx: &PackageRef,
        attrs: &[ast::Attr],
        decl: &ast::MethodDecl,
    ) -> Result<(), Errors> {
        let def = self.receiver_def(ctx, &decl.recv)?;
        let self_ty = Ty::Ptr(Rc::new(Ty::Def(def)));

        let ret = analyse_type(ctx, decl.ret.as_ref())?;
        let mut param_tys = vec![self_ty];
        param_tys.extend(self.param_types(ctx, &decl.params)?);

        let info = self.apply_attrs(ctx, attrs, AttrTarget::Method)?;
        let name: Rc<str> = format!("{}.{}", decl.recv.name, decl.name.name).into();
        self.register_func(ctx, decl.is_pub, name, decl.name.span, ret, param_tys, info)
    }

    #[allow(clippy::too_many_arguments)]
    fn register_func(
        &mut self,
        ctx: &PackageRef,
        is_pub: bool,
        name: Rc<str>,
        name_span: Span,
        ret: Ty,
        param_tys: Vec<Ty>,
        info: AttrInfo,
    ) -> Result<(), Errors> {
        let params = param_tys
            .iter()
            .enumerate()
            .map(|(i, ty)| hir::Param {
                id: hir::LocalId(i.try_into().expect("param index should fit into u32")),
                ty: ty.clone(),
            })
            .collect();
        let func = Rc::new(hir::Func {
            id: self.next_global_id(),
            name: Rc::clone(&name),
            extern_name: info.extern_name,
            no_return: info.no_return,
            exit: info.exit,
            inline: info.inline,
            ty: Rc::new(FuncTy {
                ret,
                params: param_tys,
            }),
            params,
            body: RefCell::new(None),
        });

        let mut pkg = ctx.borrow_mut();
        if pkg.values.contains_key(&name) {
            return Err(vec![Error::DuplicateIdent(name_span)]);
        }
        pkg.values.insert(name, (is_pub, Entry::Func(Rc::clone(&func))));
        self.program.globals.push(hir::Global::Func(func));
        Ok(())
    }

    fn global_var_decl(
        &mut self,
        ctx: &PackageRef,
        attrs: &[ast::Attr],
        decl: &ast::LetDecl,
    ) -> Result<(), Errors> {
        if decl.ty.is_none() && decl.value.is_none() {
            return Err(vec![Error::ExpectTypeOrValue(decl.name.span)]);
        }

        let annotated = match &decl.ty {
            Some(ty) => Some(analyse_type(ctx, Some(ty))?),
            None => None,
        };

        let (ty, init) = match (annotated, &decl.value) {
            (Some(ty), Some(value)) => {
                let init = self.analyse_const_expr(Some(&ty), value)?;
                let init = super::expr::expect_expr(&ty, init, value.span)?;
                (ty, Some(init))
            }
            (None, Some(value)) => {
                let init = self.analyse_const_expr(None, value)?;
                if init.ty.is_none() {
                    return Err(vec![Error::ExpectValue(value.span)]);
                }
                (init.ty.clone(), Some(init))
            }
            (Some(ty), None) => (ty, None),
            (None, None) => unreachable!("checked above"),
        };

        let info = self.apply_attrs(ctx, attrs, AttrTarget::GlobalVar)?;
        if info.extern_name.is_none() && init.is_none() {
            return Err(vec![Error::MissingValue(decl.name.span)]);
        }

        let var = Rc::new(hir::GlobalVar {
            id: self.next_global_id(),
            name: Rc::clone(&decl.name.name),
            extern_name: info.extern_name,
            ty,
            init,
        });

        let mut pkg = ctx.borrow_mut();
        if pkg.values.contains_key(&decl.name.name) {
            return Err(vec![Error::DuplicateIdent(decl.name.span)]);
        }
        pkg.values.insert(
            Rc::clone(&decl.name.name),
            (decl.is_pub, Entry::Var(Rc::clone(&var))),
        );
        self.program.globals.push(hir::Global::Var(var));
        Ok(())
    }

    fn function_def(&mut self, ctx: &PackageRef, decl: &ast::FuncDecl) -> Result<(), Errors> {
        let func = self.declared_func(ctx, &decl.name.name);
        let mut params = FxHashMap::default();
        for (i, param) in decl.params.iter().enumerate() {
            if let Some(name) = &param.name {
                if params
                    .insert(Rc::clone(&name.name), func.params[i].clone())
                    .is_some()
                {
                    return Err(vec![Error::DuplicateIdent(name.span)]);
                }
            }
        }
        let body = decl.body.as_ref().expect("definition pass requires a body");
        self.define_body(ctx, &func, params, body, decl.name.span)
    }

    fn method_def(&mut self, ctx: &PackageRef, decl: &ast::MethodDecl) -> Result<(), Errors> {
        let name = format!("{}.{}", decl.recv.name, decl.name.name);
        let func = self.declared_func(ctx, &name);
        let mut params = FxHashMap::default();
        params.insert("self".into(), func.params[0].clone());
        for (i, param) in decl.params.iter().enumerate() {
            if let Some(name) = &param.name {
                if params
                    .insert(Rc::clone(&name.name), func.params[i + 1].clone())
                    .is_some()
                {
                    return Err(vec![Error::DuplicateIdent(name.span)]);
                }
            }
        }
        self.define_body(ctx, &func, params, &decl.body, decl.name.span)
    }

    fn define_body(
        &mut self,
        ctx: &PackageRef,
        func: &Rc<hir::Func>,
        params: FxHashMap<Rc<str>, hir::Param>,
        body: &ast::Block,
        name_span: Span,
    ) -> Result<(), Errors> {
        let mut body_ctx = BodyCtx::new(
            Rc::clone(ctx),
            func.ty.ret.clone(),
            params,
            func.params.len(),
        );
        let (mut block, end) = self.analyse_block(&mut body_ctx, body, false)?;
        if !end {
            if func.ty.ret.is_none() {
                block.stmts.push(hir::Stmt::Return(None));
            } else {
                return Err(vec![Error::MissingReturn(name_span)]);
            }
        }
        *func.body.borrow_mut() = Some(block);
        Ok(())
    }

    /// Fetches a function registered by the declaration pass. The
    /// declaration pass succeeded if the definition pass runs, so the entry
    /// must exist.
    fn declared_func(&self, ctx: &PackageRef, name: &str) -> Rc<hir::Func> {
        let pkg = ctx.borrow();
        match pkg.values.get(name) {
            Some((_, Entry::Func(func))) => Rc::clone(func),
            _ => panic!("function `{name}` should be declared"),
        }
    }

    fn receiver_def(
        &self,
        ctx: &PackageRef,
        recv: &ast::Ident,
    ) -> Result<Rc<kc_hir::ty::TyDef>, Errors> {
        let pkg = ctx.borrow();
        match pkg.typedefs.get(&recv.name) {
            Some((_, def)) => Ok(Rc::clone(def)),
            None => Err(vec![Error::ExpectTypedef(recv.span)]),
        }
    }

    fn param_types(&self, ctx: &PackageRef, params: &[ast::Param]) -> Result<Vec<Ty>, Errors> {
        let mut tys = Vec::with_capacity(params.len());
        let mut errors = Vec::new();
        for param in params {
            match analyse_type(ctx, Some(&param.ty)) {
                Ok(ty) => tys.push(ty),
                Err(errs) => errors.extend(errs),
            }
        }
        if errors.is_empty() {
            Ok(tys)
        } else {
            Err(errors)
        }
    }

    /// Validates a declaration's attributes and applies their side effects:
    /// `@link` paths and library names accumulate on the program.
    fn apply_attrs(
        &mut self,
        ctx: &PackageRef,
        attrs: &[ast::Attr],
        target: AttrTarget,
    ) -> Result<AttrInfo, Errors> {
        let mut info = AttrInfo::default();
        let mut errors = Vec::new();
        for attr in attrs {
            match &attr.kind {
                ast::AttrKind::Extern(name) if target != AttrTarget::Method => {
                    info.extern_name = Some(Rc::clone(&name.name));
                }
                ast::AttrKind::LinkAsm(path) if target != AttrTarget::Method => {
                    let mut link = PathBuf::from(path.value.as_ref());
                    if link.is_relative() {
                        link = ctx.borrow().path.join(link);
                    }
                    if link.exists() {
                        self.program.links.insert(link);
                    } else {
                        errors.push(Error::PathNotFound(link.display().to_string(), attr.span));
                    }
                }
                ast::AttrKind::LinkLib(name) if target != AttrTarget::Method => {
                    self.program.libs.insert(name.value.to_string());
                }
                ast::AttrKind::NoReturn if target != AttrTarget::GlobalVar => {
                    info.no_return = true;
                }
                ast::AttrKind::Exit if target != AttrTarget::GlobalVar => {
                    info.exit = true;
                    info.no_return = true;
                }
                ast::AttrKind::Inline(value) if target != AttrTarget::GlobalVar => {
                    info.inline = Some(*value);
                }
                ast::AttrKind::NoReturn | ast::AttrKind::Exit | ast::AttrKind::Inline(_) => {
                    errors.push(Error::AttrOnGlobalVar(attr.span));
                }
                _ => errors.push(Error::BadAttr(attr.span)),
            }
        }
        if errors.is_empty() {
            Ok(info)
        } else {
            Err(errors)
        }
    }
}
