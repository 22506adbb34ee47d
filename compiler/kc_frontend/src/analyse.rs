// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! Semantic analysis. A package is analysed in three passes after its
//! imports are resolved: typedefs (register names, then resolve destination
//! types, then reject illegal cycles), value declarations (function and
//! method headers, global variables), and value definitions (function
//! bodies). Errors within one pass are collected so that the user sees all
//! of them; passes short-circuit.

mod expr;
mod global;
mod stmt;
#[cfg(test)]
mod tests;
mod ty;

use crate::compile::{self, SourceMap};
use kc_ast::ast;
use kc_data_structures::span::Span;
use kc_hir::{
    hir::{self, Program},
    ty::{Ty, TyDef},
};
use miette::Diagnostic;
use rustc_hash::FxHashMap;
use std::{cell::RefCell, path::PathBuf, rc::Rc};
use thiserror::Error as ThisError;

#[derive(Clone, Debug, Diagnostic, ThisError)]
pub enum Error {
    #[error("unknown package `{0}`")]
    #[diagnostic(code("Kc.Analyse.UnknownPackage"))]
    UnknownPackage(String, #[label] Span),
    #[error("circular reference package `{0}`")]
    #[diagnostic(code("Kc.Analyse.CircularImport"))]
    CircularImport(String, #[label] Span),
    #[error("duplicate identifier")]
    #[diagnostic(code("Kc.Analyse.DuplicateIdent"))]
    DuplicateIdent(#[label] Span),
    #[error("unknown identifier")]
    #[diagnostic(code("Kc.Analyse.UnknownIdent"))]
    UnknownIdent(#[label] Span),
    #[error("unknown `{0}`")]
    #[diagnostic(code("Kc.Analyse.Unknown"))]
    Unknown(String, #[label] Span),
    #[error("circular reference")]
    #[diagnostic(code("Kc.Analyse.CircularReference"))]
    CircularReference(#[label] Span),
    #[error("missing function body")]
    #[diagnostic(code("Kc.Analyse.MissingBody"))]
    MissingBody(#[label] Span),
    #[error("missing value")]
    #[diagnostic(code("Kc.Analyse.MissingValue"))]
    MissingValue(#[label] Span),
    #[error("expect a type or a value")]
    #[diagnostic(code("Kc.Analyse.ExpectTypeOrValue"))]
    ExpectTypeOrValue(#[label] Span),
    #[error("expect a value")]
    #[diagnostic(code("Kc.Analyse.ExpectValue"))]
    ExpectValue(#[label] Span),
    #[error("expect a constant value")]
    #[diagnostic(code("Kc.Analyse.ExpectConstValue"))]
    ExpectConstValue(#[label] Span),
    #[error("expect type `{0}`")]
    #[diagnostic(code("Kc.Analyse.ExpectType"))]
    ExpectType(String, #[label] Span),
    #[error("expect a number")]
    #[diagnostic(code("Kc.Analyse.ExpectNumber"))]
    ExpectNumber(#[label] Span),
    #[error("expect a integer")]
    #[diagnostic(code("Kc.Analyse.ExpectInteger"))]
    ExpectInteger(#[label] Span),
    #[error("expect a signed integer")]
    #[diagnostic(code("Kc.Analyse.ExpectSignedInteger"))]
    ExpectSignedInteger(#[label] Span),
    #[error("expect a pointer")]
    #[diagnostic(code("Kc.Analyse.ExpectPointer"))]
    ExpectPointer(#[label] Span),
    #[error("expect a pointer type")]
    #[diagnostic(code("Kc.Analyse.ExpectPointerType"))]
    ExpectPointerType(#[label] Span),
    #[error("expect a array type")]
    #[diagnostic(code("Kc.Analyse.ExpectArrayType"))]
    ExpectArrayType(#[label] Span),
    #[error("expect a tuple type")]
    #[diagnostic(code("Kc.Analyse.ExpectTupleType"))]
    ExpectTupleType(#[label] Span),
    #[error("expect a struct type")]
    #[diagnostic(code("Kc.Analyse.ExpectStructType"))]
    ExpectStructType(#[label] Span),
    #[error("expect a array or tuple")]
    #[diagnostic(code("Kc.Analyse.ExpectArrayOrTuple"))]
    ExpectArrayOrTuple(#[label] Span),
    #[error("expect a array")]
    #[diagnostic(code("Kc.Analyse.ExpectArray"))]
    ExpectArray(#[label] Span),
    #[error("expect a struct")]
    #[diagnostic(code("Kc.Analyse.ExpectStruct"))]
    ExpectStruct(#[label] Span),
    #[error("expect a function")]
    #[diagnostic(code("Kc.Analyse.ExpectFunction"))]
    ExpectFunction(#[label] Span),
    #[error("expect a function call")]
    #[diagnostic(code("Kc.Analyse.ExpectFunctionCall"))]
    ExpectFunctionCall(#[label] Span),
    #[error("expect a type definition")]
    #[diagnostic(code("Kc.Analyse.ExpectTypedef"))]
    ExpectTypedef(#[label] Span),
    #[error("expect {0} arguments")]
    #[diagnostic(code("Kc.Analyse.ExpectArguments"))]
    ExpectArguments(usize, #[label] Span),
    #[error("expect `{0}` fields")]
    #[diagnostic(code("Kc.Analyse.ExpectFields"))]
    ExpectFields(usize, #[label] Span),
    #[error("expect a integer literal")]
    #[diagnostic(code("Kc.Analyse.ExpectIntegerLiteral"))]
    ExpectIntegerLiteral(#[label] Span),
    #[error("tuple index out of range")]
    #[diagnostic(code("Kc.Analyse.IndexOutOfRange"))]
    IndexOutOfRange(#[label] Span),
    #[error("expect a mutable value")]
    #[diagnostic(code("Kc.Analyse.ExpectMutable"))]
    ExpectMutable(#[label] Span),
    #[error("not expect a temporary value")]
    #[diagnostic(code("Kc.Analyse.Temporary"))]
    Temporary(#[label] Span),
    #[error("can not covert to type `{0}`")]
    #[diagnostic(code("Kc.Analyse.Covert"))]
    Covert(String, #[label] Span),
    #[error("function missing return")]
    #[diagnostic(code("Kc.Analyse.MissingReturn"))]
    MissingReturn(#[label] Span),
    #[error("must in a loop")]
    #[diagnostic(code("Kc.Analyse.NotInLoop"))]
    NotInLoop(#[label] Span),
    #[error("expect a return value")]
    #[diagnostic(code("Kc.Analyse.ExpectReturnValue"))]
    ExpectReturnValue(#[label] Span),
    #[error("not expect a return value")]
    #[diagnostic(code("Kc.Analyse.UnexpectedReturnValue"))]
    UnexpectedReturnValue(#[label] Span),
    #[error("attribute cannot be used for global variables")]
    #[diagnostic(code("Kc.Analyse.AttrOnGlobalVar"))]
    AttrOnGlobalVar(#[label] Span),
    #[error("can not use this attribute")]
    #[diagnostic(code("Kc.Analyse.BadAttr"))]
    BadAttr(#[label] Span),
    #[error("can not find path `{0}`")]
    #[diagnostic(code("Kc.Analyse.PathNotFound"))]
    PathNotFound(String, #[label] Span),
}

impl Error {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Error::UnknownPackage(_, span)
            | Error::CircularImport(_, span)
            | Error::DuplicateIdent(span)
            | Error::UnknownIdent(span)
            | Error::Unknown(_, span)
            | Error::CircularReference(span)
            | Error::MissingBody(span)
            | Error::MissingValue(span)
            | Error::ExpectTypeOrValue(span)
            | Error::ExpectValue(span)
            | Error::ExpectConstValue(span)
            | Error::ExpectType(_, span)
            | Error::ExpectNumber(span)
            | Error::ExpectInteger(span)
            | Error::ExpectSignedInteger(span)
            | Error::ExpectPointer(span)
            | Error::ExpectPointerType(span)
            | Error::ExpectArrayType(span)
            | Error::ExpectTupleType(span)
            | Error::ExpectStructType(span)
            | Error::ExpectArrayOrTuple(span)
            | Error::ExpectArray(span)
            | Error::ExpectStruct(span)
            | Error::ExpectFunction(span)
            | Error::ExpectFunctionCall(span)
            | Error::ExpectTypedef(span)
            | Error::ExpectArguments(_, span)
            | Error::ExpectFields(_, span)
            | Error::ExpectIntegerLiteral(span)
            | Error::IndexOutOfRange(span)
            | Error::ExpectMutable(span)
            | Error::Temporary(span)
            | Error::Covert(_, span)
            | Error::MissingReturn(span)
            | Error::NotInLoop(span)
            | Error::ExpectReturnValue(span)
            | Error::UnexpectedReturnValue(span)
            | Error::AttrOnGlobalVar(span)
            | Error::BadAttr(span)
            | Error::PathNotFound(_, span) => *span,
        }
    }
}

pub(crate) type Errors = Vec<Error>;

/// A named value visible at package scope.
#[derive(Clone)]
pub(crate) enum Entry {
    Func(Rc<hir::Func>),
    Var(Rc<hir::GlobalVar>),
}

/// The per-package symbol tables: typedefs and values live in separate
/// namespaces; `externs` maps import aliases to other packages.
pub(crate) struct PackageCtx {
    pub(crate) path: PathBuf,
    pub(crate) typedefs: FxHashMap<Rc<str>, (bool, Rc<TyDef>)>,
    pub(crate) values: FxHashMap<Rc<str>, (bool, Entry)>,
    pub(crate) externs: FxHashMap<Rc<str>, Rc<RefCell<PackageCtx>>>,
}

impl PackageCtx {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            typedefs: FxHashMap::default(),
            values: FxHashMap::default(),
            externs: FxHashMap::default(),
        }
    }
}

pub(crate) type PackageRef = Rc<RefCell<PackageCtx>>;

/// The analyser. Owns the program being built and the map of imported
/// packages; a package being imported but not yet finished is marked with
/// `None`, which is how import cycles are detected.
pub struct Analyser<'a> {
    root: PathBuf,
    sources: &'a mut SourceMap,
    imported: FxHashMap<PathBuf, Option<PackageRef>>,
    pub(crate) program: Program,
}

/// Analyses `package` as the entry package of the program. `root` is the
/// directory import paths resolve against.
pub fn analyse_main(
    sources: &mut SourceMap,
    root: PathBuf,
    package: &ast::Package,
) -> Result<Program, Vec<compile::Error>> {
    let mut analyser = Analyser {
        root,
        sources,
        imported: FxHashMap::default(),
        program: Program::default(),
    };
    let ctx = Rc::new(RefCell::new(PackageCtx::new(package.path.clone())));
    analyser
        .imported
        .insert(package.path.clone(), Some(Rc::clone(&ctx)));
    analyser.package(&ctx, package)?;
    log::debug!(
        "analysed {} globals across {} packages",
        analyser.program.globals.len(),
        analyser.imported.len()
    );
    Ok(analyser.program)
}

impl Analyser<'_> {
    fn package(
        &mut self,
        ctx: &PackageRef,
        ast: &ast::Package,
    ) -> Result<(), Vec<compile::Error>> {
        self.imports(ctx, ast)?;
        self.typedef_pass(ctx, ast).map_err(into_compile)?;
        self.decl_pass(ctx, ast).map_err(into_compile)?;
        self.def_pass(ctx, ast).map_err(into_compile)?;
        Ok(())
    }

    /// Resolves the imports of one package, recursively analysing each
    /// imported package. Entering a package inserts a `None` marker into the
    /// imported map; meeting that marker again is a circular reference.
    fn imports(
        &mut self,
        ctx: &PackageRef,
        ast: &ast::Package,
    ) -> Result<(), Vec<compile::Error>> {
        for global in ast.files.iter().flat_map(|f| &f.globals) {
            let ast::GlobalKind::Import { path, alias } = &global.kind else {
                continue;
            };
            if let Some(attr) = global.attrs.first() {
                return Err(vec![Error::BadAttr(attr.span).into()]);
            }

            let mut pkg_path = self.root.clone();
            for part in path {
                pkg_path.push(part.name.as_ref());
            }
            if !pkg_path.is_dir() {
                return Err(vec![Error::UnknownPackage(
                    pkg_path.display().to_string(),
                    global.span,
                )
                .into()]);
            }

            let last = path.last().expect("import path should be nonempty");
            let (pkg_name, pkg_span) = match alias {
                Some(alias) => (Rc::clone(&alias.name), alias.span),
                None => (Rc::clone(&last.name), last.span),
            };

            let state = match self.imported.get(&pkg_path) {
                None => None,
                Some(None) => {
                    return Err(vec![Error::CircularImport(
                        pkg_path.display().to_string(),
                        global.span,
                    )
                    .into()]);
                }
                Some(Some(sub)) => Some(Rc::clone(sub)),
            };
            match state {
                None => {
                    if ctx.borrow().externs.contains_key(&pkg_name) {
                        return Err(vec![Error::DuplicateIdent(pkg_span).into()]);
                    }
                    self.imported.insert(pkg_path.clone(), None);
                    let sub = Rc::new(RefCell::new(PackageCtx::new(pkg_path.clone())));
                    ctx.borrow_mut()
                        .externs
                        .insert(pkg_name, Rc::clone(&sub));
                    let sub_ast = compile::parse_package(self.sources, &pkg_path)?;
                    self.package(&sub, &sub_ast)?;
                    self.imported.insert(pkg_path, Some(sub));
                }
                Some(sub) => {
                    let mut ctx = ctx.borrow_mut();
                    match ctx.externs.get(&pkg_name) {
                        Some(existing) if !Rc::ptr_eq(existing, &sub) => {
                            return Err(vec![Error::DuplicateIdent(pkg_span).into()]);
                        }
                        _ => {
                            ctx.externs.insert(pkg_name, sub);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Looks up the package that owns a typedef; used for method binding.
    pub(crate) fn package_of(&self, def: &TyDef) -> Option<PackageRef> {
        self.imported.get(&def.package).and_then(Clone::clone)
    }

    pub(crate) fn next_global_id(&self) -> hir::GlobalId {
        hir::GlobalId(
            self.program
                .globals
                .len()
                .try_into()
                .expect("global count should fit into u32"),
        )
    }
}

fn into_compile(errors: Errors) -> Vec<compile::Error> {
    errors.into_iter().map(Into::into).collect()
}

/// The scope of one function body: the declared return type and the named
/// parameters. Local ids continue after the parameter ids.
pub(crate) struct FuncScope {
    pub(crate) ret: Ty,
    pub(crate) params: FxHashMap<Rc<str>, hir::Param>,
    pub(crate) next_local: u32,
}

impl FuncScope {
    pub(crate) fn fresh_local(&mut self) -> hir::LocalId {
        let id = hir::LocalId(self.next_local);
        self.next_local += 1;
        id
    }
}

/// One lexical block: its locals, whether it belongs to a loop, and the
/// `end` flag marking that control cannot textually proceed past the
/// current statement. The flag is monotonic; it never clears.
pub(crate) struct BlockScope {
    pub(crate) locals: FxHashMap<Rc<str>, (hir::LocalId, Ty)>,
    pub(crate) in_loop: bool,
    pub(crate) end: bool,
}

/// Everything in scope while analysing a function body.
pub(crate) struct BodyCtx {
    pub(crate) pkg: PackageRef,
    pub(crate) func: FuncScope,
    pub(crate) blocks: Vec<BlockScope>,
}

impl BodyCtx {
    pub(crate) fn new(
        pkg: PackageRef,
        ret: Ty,
        params: FxHashMap<Rc<str>, hir::Param>,
        param_count: usize,
    ) -> Self {
        let next_local = param_count
            .try_into()
            .expect("param count should fit into u32");
        Self {
            pkg,
            func: FuncScope {
                ret,
                params,
                next_local,
            },
            blocks: Vec::new(),
        }
    }

    pub(crate) fn set_end(&mut self) {
        if let Some(block) = self.blocks.last_mut() {
            block.end = true;
        }
    }

    pub(crate) fn is_end(&self) -> bool {
        self.blocks.last().is_some_and(|block| block.end)
    }

    pub(crate) fn in_loop(&self) -> bool {
        self.blocks.iter().rev().any(|block| block.in_loop)
    }
}
