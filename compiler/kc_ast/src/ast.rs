// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! AST node definitions and their tree renderings.

use indenter::{indented, Format, Indented};
use kc_data_structures::span::Span;
use std::{
    fmt::{self, Display, Formatter, Write},
    path::PathBuf,
    rc::Rc,
};

fn set_indentation<'a, 'b>(
    indent: Indented<'a, Formatter<'b>>,
    level: usize,
) -> Indented<'a, Formatter<'b>> {
    indent.with_format(Format::Custom {
        inserter: Box::leak(Box::new(move |_: usize, f: &mut dyn Write| {
            for _ in 0..level {
                write!(f, "    ")?;
            }
            Ok(())
        })),
    })
}

/// A package: the files of one source directory, compiled together.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Package {
    /// The absolute package directory.
    pub path: PathBuf,
    /// The files of the package, in deterministic (sorted) order.
    pub files: Vec<File>,
}

impl Display for Package {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut indent = set_indentation(indented(f), 0);
        write!(indent, "Package {}:", self.path.display())?;
        indent = set_indentation(indent, 1);
        for file in &self.files {
            write!(indent, "\n{file}")?;
        }
        Ok(())
    }
}

/// A single source file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct File {
    /// The file path, as loaded.
    pub name: Rc<str>,
    /// The globals of the file, in source order.
    pub globals: Vec<Global>,
}

impl Display for File {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut indent = set_indentation(indented(f), 0);
        write!(indent, "File ({}):", self.name)?;
        indent = set_indentation(indent, 1);
        for global in &self.globals {
            write!(indent, "\n{global}")?;
        }
        Ok(())
    }
}

/// A top-level declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct Global {
    pub span: Span,
    /// Attributes preceding the declaration.
    pub attrs: Vec<Attr>,
    pub kind: GlobalKind,
}

impl Display for Global {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut indent = set_indentation(indented(f), 0);
        write!(indent, "Global {}:", self.span)?;
        indent = set_indentation(indent, 1);
        for attr in &self.attrs {
            write!(indent, "\n{attr}")?;
        }
        write!(indent, "\n{}", self.kind)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GlobalKind {
    /// `import a.b as c`
    Import {
        path: Vec<Ident>,
        alias: Option<Ident>,
    },
    /// `pub? type Name T`
    TyDef {
        is_pub: bool,
        name: Ident,
        dst: Ty,
    },
    Func(Box<FuncDecl>),
    Method(Box<MethodDecl>),
    Let(Box<LetDecl>),
}

impl Display for GlobalKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            GlobalKind::Import { path, alias } => {
                let path = path
                    .iter()
                    .map(|p| p.name.as_ref())
                    .collect::<Vec<_>>()
                    .join(".");
                match alias {
                    Some(alias) => write!(f, "Import ({path}) as ({alias})"),
                    None => write!(f, "Import ({path})"),
                }
            }
            GlobalKind::TyDef { is_pub, name, dst } => {
                write!(f, "TyDef{} ({name}): {dst}", vis(*is_pub))
            }
            GlobalKind::Func(decl) => write!(f, "{decl}"),
            GlobalKind::Method(decl) => write!(f, "{decl}"),
            GlobalKind::Let(decl) => write!(f, "{decl}"),
        }
    }
}

fn vis(is_pub: bool) -> &'static str {
    if is_pub {
        " pub"
    } else {
        ""
    }
}

/// A function declaration, possibly body-less (`@extern`).
#[derive(Clone, Debug, PartialEq)]
pub struct FuncDecl {
    pub is_pub: bool,
    pub name: Ident,
    pub params: Vec<Param>,
    pub ret: Option<Ty>,
    pub body: Option<Block>,
}

impl Display for FuncDecl {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut indent = set_indentation(indented(f), 0);
        write!(indent, "Func{} ({}):", vis(self.is_pub), self.name)?;
        indent = set_indentation(indent, 1);
        for param in &self.params {
            write!(indent, "\n{param}")?;
        }
        if let Some(ret) = &self.ret {
            write!(indent, "\nret: {ret}")?;
        }
        if let Some(body) = &self.body {
            write!(indent, "\n{body}")?;
        }
        Ok(())
    }
}

/// A method declaration: a function with a receiver typedef.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodDecl {
    pub is_pub: bool,
    pub recv: Ident,
    pub name: Ident,
    pub params: Vec<Param>,
    pub ret: Option<Ty>,
    pub body: Block,
}

impl Display for MethodDecl {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut indent = set_indentation(indented(f), 0);
        write!(
            indent,
            "Method{} ({}) ({}):",
            vis(self.is_pub),
            self.recv,
            self.name
        )?;
        indent = set_indentation(indent, 1);
        for param in &self.params {
            write!(indent, "\n{param}")?;
        }
        if let Some(ret) = &self.ret {
            write!(indent, "\nret: {ret}")?;
        }
        write!(indent, "\n{}", self.body)?;
        Ok(())
    }
}

/// A global `let` declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct LetDecl {
    pub is_pub: bool,
    pub name: Ident,
    pub ty: Option<Ty>,
    pub value: Option<Expr>,
}

impl Display for LetDecl {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut indent = set_indentation(indented(f), 0);
        write!(indent, "Let{} ({}):", vis(self.is_pub), self.name)?;
        indent = set_indentation(indent, 1);
        if let Some(ty) = &self.ty {
            write!(indent, "\ntype: {ty}")?;
        }
        if let Some(value) = &self.value {
            write!(indent, "\nvalue: {value}")?;
        }
        Ok(())
    }
}

/// A function or method parameter. Body-less functions may leave parameters
/// unnamed.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub span: Span,
    pub name: Option<Ident>,
    pub ty: Ty,
}

impl Display for Param {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Param {} ({name}): {}", self.span, self.ty),
            None => write!(f, "Param {}: {}", self.span, self.ty),
        }
    }
}

/// An attribute (`@extern(name)`, `@link(lib = "c")`, ...).
#[derive(Clone, Debug, PartialEq)]
pub struct Attr {
    pub span: Span,
    pub kind: AttrKind,
}

impl Display for Attr {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Attr {}: ", self.span)?;
        match &self.kind {
            AttrKind::Extern(name) => write!(f, "Extern ({name})"),
            AttrKind::LinkAsm(path) => write!(f, "LinkAsm ({path})"),
            AttrKind::LinkLib(name) => write!(f, "LinkLib ({name})"),
            AttrKind::NoReturn => write!(f, "NoReturn"),
            AttrKind::Exit => write!(f, "Exit"),
            AttrKind::Inline(value) => write!(f, "Inline ({value})"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AttrKind {
    Extern(Ident),
    LinkAsm(StrLit),
    LinkLib(StrLit),
    NoReturn,
    Exit,
    Inline(bool),
}

/// A decoded string literal.
#[derive(Clone, Debug, PartialEq)]
pub struct StrLit {
    pub span: Span,
    pub value: Rc<str>,
}

impl Display for StrLit {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:?}", self.value)
    }
}

/// An identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct Ident {
    pub span: Span,
    pub name: Rc<str>,
}

impl Display for Ident {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Ident {} \"{}\"", self.span, self.name)
    }
}

/// A type annotation.
#[derive(Clone, Debug, PartialEq)]
pub struct Ty {
    pub span: Span,
    pub kind: Box<TyKind>,
}

impl Display for Ty {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Type {}: {}", self.span, self.kind)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TyKind {
    /// A named type, optionally qualified: `Name` or `pkg::Name`.
    Name { pkg: Option<Ident>, name: Ident },
    /// `*T`
    Ptr(Ty),
    /// `func(T, ...) R`
    Func(Vec<Ty>, Option<Ty>),
    /// `[N]T`
    Array(u64, Ty),
    /// `(T, ...)`
    Tuple(Vec<Ty>),
    /// `struct { name: T; ... }`
    Struct(Vec<FieldDef>),
}

impl Display for TyKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            TyKind::Name { pkg: Some(pkg), name } => write!(f, "Name ({pkg}) ({name})"),
            TyKind::Name { pkg: None, name } => write!(f, "Name ({name})"),
            TyKind::Ptr(elem) => write!(f, "Ptr ({elem})"),
            TyKind::Func(params, ret) => {
                write!(f, "Func (")?;
                join(f, params.iter(), ", ")?;
                write!(f, ")")?;
                if let Some(ret) = ret {
                    write!(f, " ({ret})")?;
                }
                Ok(())
            }
            TyKind::Array(size, elem) => write!(f, "Array [{size}] ({elem})"),
            TyKind::Tuple(elems) => {
                write!(f, "Tuple (")?;
                join(f, elems.iter(), ", ")?;
                write!(f, ")")
            }
            TyKind::Struct(fields) => {
                write!(f, "Struct (")?;
                join(f, fields.iter(), ", ")?;
                write!(f, ")")
            }
        }
    }
}

/// A struct type field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDef {
    pub name: Ident,
    pub ty: Ty,
}

impl Display for FieldDef {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "({}): {}", self.name, self.ty)
    }
}

/// A brace-delimited statement list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block {
    pub span: Span,
    pub stmts: Vec<Stmt>,
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut indent = set_indentation(indented(f), 0);
        if self.stmts.is_empty() {
            write!(indent, "Block {}: <empty>", self.span)?;
        } else {
            write!(indent, "Block {}:", self.span)?;
            indent = set_indentation(indent, 1);
            for stmt in &self.stmts {
                write!(indent, "\n{stmt}")?;
            }
        }
        Ok(())
    }
}

/// A statement.
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub span: Span,
    pub kind: Box<StmtKind>,
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut indent = set_indentation(indented(f), 0);
        write!(indent, "Stmt {}: {}", self.span, self.kind)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Expr(Expr),
    Block(Block),
    /// `return e?`
    Return(Option<Expr>),
    /// `let name (: T)? (= e)?`
    Let {
        name: Ident,
        ty: Option<Ty>,
        value: Option<Expr>,
    },
    If(IfStmt),
    /// `for cond { ... }`
    For {
        cond: Expr,
        body: Block,
    },
    Break,
    Continue,
    /// `defer call()`
    Defer(Expr),
}

impl Display for StmtKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut indent = set_indentation(indented(f), 0);
        match self {
            StmtKind::Expr(expr) => write!(indent, "Expr: {expr}"),
            StmtKind::Block(block) => write!(indent, "{block}"),
            StmtKind::Return(None) => write!(indent, "Return"),
            StmtKind::Return(Some(expr)) => write!(indent, "Return: {expr}"),
            StmtKind::Let { name, ty, value } => {
                write!(indent, "Let ({name}):")?;
                indent = set_indentation(indent, 1);
                if let Some(ty) = ty {
                    write!(indent, "\ntype: {ty}")?;
                }
                if let Some(value) = value {
                    write!(indent, "\nvalue: {value}")?;
                }
                Ok(())
            }
            StmtKind::If(if_stmt) => write!(indent, "{if_stmt}"),
            StmtKind::For { cond, body } => {
                write!(indent, "For:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\ncond: {cond}")?;
                write!(indent, "\n{body}")
            }
            StmtKind::Break => write!(indent, "Break"),
            StmtKind::Continue => write!(indent, "Continue"),
            StmtKind::Defer(call) => write!(indent, "Defer: {call}"),
        }
    }
}

/// An `if`/`else if`/`else` chain.
#[derive(Clone, Debug, PartialEq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then: Block,
    pub els: Option<ElseArm>,
}

impl Display for IfStmt {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut indent = set_indentation(indented(f), 0);
        write!(indent, "If:")?;
        indent = set_indentation(indent, 1);
        write!(indent, "\ncond: {}", self.cond)?;
        write!(indent, "\n{}", self.then)?;
        match &self.els {
            Some(ElseArm::Block(block)) => write!(indent, "\nelse: {block}")?,
            Some(ElseArm::If(if_stmt)) => write!(indent, "\nelse: {if_stmt}")?,
            None => {}
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ElseArm {
    Block(Block),
    If(Box<IfStmt>),
}

/// An expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub span: Span,
    pub kind: Box<ExprKind>,
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Expr {}: {}", self.span, self.kind)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    /// A decoded string literal.
    Str(Rc<str>),
    /// A decoded C string literal, including the terminating NUL byte.
    CStr(Rc<[u8]>),
    Null,
    /// `name` or `pkg::name`
    Name { pkg: Option<Ident>, name: Ident },
    /// `(e, ...)` — zero, one, or many elements. Whether a singleton is a
    /// grouping or a 1-tuple is decided during analysis.
    Tuple(Vec<Expr>),
    /// `[e, ...]`
    Array(Vec<Expr>),
    /// `{e, ...}`
    Struct(Vec<Expr>),
    UnOp(UnOp, Expr),
    BinOp(BinOp, Expr, Expr),
    /// `lhs = rhs`
    Assign(Expr, Expr),
    /// `lhs op= rhs`
    AssignOp(BinOp, Expr, Expr),
    Call(Expr, Vec<Expr>),
    Field(Expr, Ident),
    Index(Expr, Expr),
    /// `e as T`
    Cast(Expr, Ty),
    /// `cond ? t : f`
    Ternary(Expr, Expr, Expr),
}

impl Display for ExprKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut indent = set_indentation(indented(f), 0);
        match self {
            ExprKind::Int(value) => write!(indent, "Int ({value})"),
            ExprKind::Float(value) => write!(indent, "Float ({value})"),
            ExprKind::Bool(value) => write!(indent, "Bool ({value})"),
            ExprKind::Char(value) => write!(indent, "Char ({value:?})"),
            ExprKind::Str(value) => write!(indent, "Str ({value:?})"),
            ExprKind::CStr(value) => write!(indent, "CStr ({value:?})"),
            ExprKind::Null => write!(indent, "Null"),
            ExprKind::Name { pkg: Some(pkg), name } => write!(indent, "Name ({pkg}) ({name})"),
            ExprKind::Name { pkg: None, name } => write!(indent, "Name ({name})"),
            ExprKind::Tuple(elems) => display_seq(indent, "Tuple", elems),
            ExprKind::Array(elems) => display_seq(indent, "Array", elems),
            ExprKind::Struct(fields) => display_seq(indent, "Struct", fields),
            ExprKind::UnOp(op, operand) => {
                write!(indent, "UnOp ({op:?}):")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{operand}")
            }
            ExprKind::BinOp(op, lhs, rhs) => {
                write!(indent, "BinOp ({op:?}):")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{lhs}")?;
                write!(indent, "\n{rhs}")
            }
            ExprKind::Assign(lhs, rhs) => {
                write!(indent, "Assign:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{lhs}")?;
                write!(indent, "\n{rhs}")
            }
            ExprKind::AssignOp(op, lhs, rhs) => {
                write!(indent, "AssignOp ({op:?}):")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{lhs}")?;
                write!(indent, "\n{rhs}")
            }
            ExprKind::Call(callee, args) => {
                write!(indent, "Call:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{callee}")?;
                for arg in args {
                    write!(indent, "\n{arg}")?;
                }
                Ok(())
            }
            ExprKind::Field(expr, name) => {
                write!(indent, "Field ({name}):")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{expr}")
            }
            ExprKind::Index(expr, index) => {
                write!(indent, "Index:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{expr}")?;
                write!(indent, "\n{index}")
            }
            ExprKind::Cast(expr, ty) => {
                write!(indent, "Cast ({ty}):")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{expr}")
            }
            ExprKind::Ternary(cond, t, e) => {
                write!(indent, "Ternary:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{cond}")?;
                write!(indent, "\n{t}")?;
                write!(indent, "\n{e}")
            }
        }
    }
}

fn display_seq(
    mut indent: Indented<Formatter>,
    label: &str,
    elems: &[Expr],
) -> fmt::Result {
    if elems.is_empty() {
        write!(indent, "{label}: <empty>")
    } else {
        write!(indent, "{label}:")?;
        indent = set_indentation(indent, 1);
        for elem in elems {
            write!(indent, "\n{elem}")?;
        }
        Ok(())
    }
}

fn join<T: Display>(
    f: &mut Formatter,
    mut iter: impl Iterator<Item = T>,
    sep: &str,
) -> fmt::Result {
    if let Some(first) = iter.next() {
        write!(f, "{first}")?;
    }
    for item in iter {
        write!(f, "{sep}{item}")?;
    }
    Ok(())
}

/// A prefix operator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnOp {
    /// `-`
    Neg,
    /// `~`
    BitNot,
    /// `!`
    Not,
    /// `&`
    AddrOf,
    /// `*`
    Deref,
}

/// A binary operator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `&`
    And,
    /// `|`
    Or,
    /// `^`
    Xor,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}
