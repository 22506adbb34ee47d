// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! The typed, name-resolved program representation. Idents are resolved to
//! numeric ids: globals are numbered across the whole program in dependency
//! order, locals (parameters and `let` bindings) per function.
//!
//! The mutability, temporariness and constness of a value are properties of
//! its expression kind and are computed on demand rather than stored.

use crate::ty::{FuncTy, Ty};
use indenter::{indented, Format, Indented};
use std::{
    cell::RefCell,
    collections::BTreeSet,
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

/// The id of a program global, its index in [`Program::globals`]. Globals
/// are ordered so that anything a global refers to precedes it.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GlobalId(pub u32);

impl Display for GlobalId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The id of a function-scoped value: a parameter or a `let` binding.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct LocalId(pub u32);

impl Display for LocalId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// The analysed program: all globals of all packages in dependency order,
/// plus the link artifacts gathered from `@link` attributes.
#[derive(Debug, Default)]
pub struct Program {
    pub globals: Vec<Global>,
    /// External object files to assemble and link.
    pub links: BTreeSet<PathBuf>,
    /// Library names to link.
    pub libs: BTreeSet<String>,
}

impl Program {
    #[must_use]
    pub fn func(&self, id: GlobalId) -> &Rc<Func> {
        match &self.globals[id.0 as usize] {
            Global::Func(func) => func,
            Global::Var(_) => panic!("global {id} should be a function"),
        }
    }
}

#[derive(Clone, Debug)]
pub enum Global {
    Func(Rc<Func>),
    Var(Rc<GlobalVar>),
}

/// A function or method. Methods are functions whose first parameter is the
/// receiver pointer and whose name is the dotted `Type.name` key.
#[derive(Debug)]
pub struct Func {
    pub id: GlobalId,
    pub name: Rc<str>,
    pub extern_name: Option<Rc<str>>,
    pub no_return: bool,
    pub exit: bool,
    pub inline: Option<bool>,
    pub ty: Rc<FuncTy>,
    pub params: Vec<Param>,
    /// Absent for `@extern` declarations; assigned by the definition pass
    /// otherwise.
    pub body: RefCell<Option<Block>>,
}

#[derive(Clone, Debug)]
pub struct Param {
    pub id: LocalId,
    pub ty: Ty,
}

/// A global variable. The initializer is a constant expression; it is
/// absent only for `@extern` declarations.
#[derive(Debug)]
pub struct GlobalVar {
    pub id: GlobalId,
    pub name: Rc<str>,
    pub extern_name: Option<Rc<str>>,
    pub ty: Ty,
    pub init: Option<Expr>,
}

#[derive(Debug, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug)]
pub enum Stmt {
    Expr(Expr),
    Block(Block),
    Let { id: LocalId, ty: Ty, init: Expr },
    Return(Option<Expr>),
    If(IfStmt),
    Loop { cond: Expr, body: Block },
    Break,
    Continue,
    /// The expression is always a `Call` or `MethodCall`.
    Defer(Expr),
}

#[derive(Debug)]
pub struct IfStmt {
    pub cond: Expr,
    pub then: Block,
    pub els: Option<Block>,
}

#[derive(Debug)]
pub struct Expr {
    pub ty: Ty,
    pub kind: ExprKind,
}

#[derive(Debug)]
pub enum ExprKind {
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    /// A string literal; its type is `*i32`.
    Str(Rc<str>),
    /// A NUL-terminated C string literal; its type is `*i8`.
    CStr(Rc<[u8]>),
    /// The zero value of the expression's type; also the empty aggregate.
    Zero,
    Array(Vec<Expr>),
    Tuple(Vec<Expr>),
    Struct(Vec<Expr>),
    Param(LocalId),
    Local(LocalId),
    GlobalVar(GlobalId),
    Func(GlobalId),
    Arith(ArithOp, Box<Expr>, Box<Expr>),
    Logic(LogicOp, Box<Expr>, Box<Expr>),
    Cmp(CmpOp, Box<Expr>, Box<Expr>),
    Assign {
        op: Option<ArithOp>,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Not(Box<Expr>),
    AddrOf(Box<Expr>),
    Deref(Box<Expr>),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        no_return: bool,
        exit: bool,
    },
    /// A method call; kept distinct from `Call` so that back-ends can choose
    /// how to pass the receiver.
    MethodCall {
        method: GlobalId,
        recv: Box<Expr>,
        args: Vec<Expr>,
        no_return: bool,
        exit: bool,
    },
    /// Indexing into an array or through a pointer.
    Index(Box<Expr>, Box<Expr>),
    /// Indexing into a tuple with a compile-time constant.
    TupleIndex(Box<Expr>, u64),
    /// Struct field access, by field name.
    Field(Box<Expr>, Rc<str>),
    /// A conversion; the target type is the expression's type.
    Cast(Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
}

/// An arithmetic or bitwise operator; the type of the left operand is the
/// type of the result.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Xor,
    Shl,
    Shr,
}

/// A short-circuiting logical operator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogicOp {
    And,
    Or,
}

/// A comparison operator; the result type is `bool`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Expr {
    /// Is this a mutable l-value?
    #[must_use]
    pub fn is_mut(&self) -> bool {
        match &self.kind {
            ExprKind::Param(_) | ExprKind::Local(_) | ExprKind::GlobalVar(_) | ExprKind::Deref(_) => {
                true
            }
            ExprKind::Index(from, _)
            | ExprKind::TupleIndex(from, _)
            | ExprKind::Field(from, _) => from.is_mut(),
            ExprKind::Ternary(_, t, e) => t.is_mut() && e.is_mut(),
            _ => false,
        }
    }

    /// Would taking this value's address be meaningless?
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        match &self.kind {
            ExprKind::Param(_)
            | ExprKind::Local(_)
            | ExprKind::GlobalVar(_)
            | ExprKind::Deref(_) => false,
            ExprKind::Index(from, _)
            | ExprKind::TupleIndex(from, _)
            | ExprKind::Field(from, _) => from.is_temporary(),
            ExprKind::Ternary(_, t, e) => t.is_temporary() || e.is_temporary(),
            _ => true,
        }
    }

    /// Can this expression appear as a constant initializer?
    #[must_use]
    pub fn is_const(&self) -> bool {
        match &self.kind {
            ExprKind::Int(_)
            | ExprKind::Float(_)
            | ExprKind::Bool(_)
            | ExprKind::Null
            | ExprKind::Str(_)
            | ExprKind::CStr(_)
            | ExprKind::Zero => true,
            ExprKind::Array(elems) | ExprKind::Tuple(elems) | ExprKind::Struct(elems) => {
                elems.iter().all(Expr::is_const)
            }
            _ => false,
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut indent = set_indentation(indented(f), 0);
        write!(indent, "Program:")?;
        indent = set_indentation(indent, 1);
        if !self.links.is_empty() {
            write!(indent, "\nlinks:")?;
            for link in &self.links {
                write!(indent, " {}", link.display())?;
            }
        }
        if !self.libs.is_empty() {
            write!(indent, "\nlibs:")?;
            for lib in &self.libs {
                write!(indent, " {lib}")?;
            }
        }
        for global in &self.globals {
            match global {
                Global::Func(func) => write!(indent, "\n{func}")?,
                Global::Var(var) => write!(indent, "\n{var}")?,
            }
        }
        Ok(())
    }
}

impl Display for Func {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut indent = set_indentation(indented(f), 0);
        write!(indent, "Func {} {}", self.id, self.name)?;
        if let Some(extern_name) = &self.extern_name {
            write!(indent, " @extern({extern_name})")?;
        }
        if self.no_return {
            write!(indent, " @noreturn")?;
        }
        if self.exit {
            write!(indent, " @exit")?;
        }
        if let Some(inline) = self.inline {
            write!(indent, " @inline({inline})")?;
        }
        write!(indent, " [{}]:", Ty::Func(Rc::clone(&self.ty)))?;
        indent = set_indentation(indent, 1);
        for param in &self.params {
            write!(indent, "\nparam {} [{}]", param.id, param.ty)?;
        }
        if let Some(body) = self.body.borrow().as_ref() {
            write!(indent, "\nbody:")?;
            indent = set_indentation(indent, 2);
            for stmt in &body.stmts {
                write!(indent, "\n{stmt}")?;
            }
        }
        Ok(())
    }
}

impl Display for GlobalVar {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Var {} {}", self.id, self.name)?;
        if let Some(extern_name) = &self.extern_name {
            write!(f, " @extern({extern_name})")?;
        }
        write!(f, " [{}]", self.ty)?;
        if let Some(init) = &self.init {
            write!(f, " = {init}")?;
        }
        Ok(())
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut indent = set_indentation(indented(f), 0);
        if self.stmts.is_empty() {
            write!(indent, "Block: <empty>")?;
        } else {
            write!(indent, "Block:")?;
            indent = set_indentation(indent, 1);
            for stmt in &self.stmts {
                write!(indent, "\n{stmt}")?;
            }
        }
        Ok(())
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut indent = set_indentation(indented(f), 0);
        match self {
            Stmt::Expr(expr) => write!(indent, "Expr: {expr}"),
            Stmt::Block(block) => write!(indent, "{block}"),
            Stmt::Let { id, ty, init } => {
                write!(indent, "Let {id} [{ty}]:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{init}")
            }
            Stmt::Return(None) => write!(indent, "Return"),
            Stmt::Return(Some(expr)) => {
                write!(indent, "Return:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{expr}")
            }
            Stmt::If(if_stmt) => {
                write!(indent, "If:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\ncond: {}", if_stmt.cond)?;
                write!(indent, "\nthen: {}", if_stmt.then)?;
                if let Some(els) = &if_stmt.els {
                    write!(indent, "\nelse: {els}")?;
                }
                Ok(())
            }
            Stmt::Loop { cond, body } => {
                write!(indent, "Loop:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\ncond: {cond}")?;
                write!(indent, "\nbody: {body}")
            }
            Stmt::Break => write!(indent, "Break"),
            Stmt::Continue => write!(indent, "Continue"),
            Stmt::Defer(call) => {
                write!(indent, "Defer:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{call}")
            }
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut indent = set_indentation(indented(f), 0);
        let ty = &self.ty;
        match &self.kind {
            ExprKind::Int(value) => write!(indent, "Int ({value}) [{ty}]"),
            ExprKind::Float(value) => write!(indent, "Float ({value}) [{ty}]"),
            ExprKind::Bool(value) => write!(indent, "Bool ({value}) [{ty}]"),
            ExprKind::Null => write!(indent, "Null [{ty}]"),
            ExprKind::Str(value) => write!(indent, "Str ({value:?}) [{ty}]"),
            ExprKind::CStr(value) => write!(indent, "CStr ({value:?}) [{ty}]"),
            ExprKind::Zero => write!(indent, "Zero [{ty}]"),
            ExprKind::Array(elems) => children(indent, &format!("Array [{ty}]"), elems),
            ExprKind::Tuple(elems) => children(indent, &format!("Tuple [{ty}]"), elems),
            ExprKind::Struct(elems) => children(indent, &format!("Struct [{ty}]"), elems),
            ExprKind::Param(id) => write!(indent, "Param {id} [{ty}]"),
            ExprKind::Local(id) => write!(indent, "Local {id} [{ty}]"),
            ExprKind::GlobalVar(id) => write!(indent, "GlobalVar {id} [{ty}]"),
            ExprKind::Func(id) => write!(indent, "Func {id} [{ty}]"),
            ExprKind::Arith(op, lhs, rhs) => {
                write!(indent, "Arith ({op:?}) [{ty}]:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{lhs}")?;
                write!(indent, "\n{rhs}")
            }
            ExprKind::Logic(op, lhs, rhs) => {
                write!(indent, "Logic ({op:?}) [{ty}]:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{lhs}")?;
                write!(indent, "\n{rhs}")
            }
            ExprKind::Cmp(op, lhs, rhs) => {
                write!(indent, "Cmp ({op:?}) [{ty}]:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{lhs}")?;
                write!(indent, "\n{rhs}")
            }
            ExprKind::Assign { op: None, lhs, rhs } => {
                write!(indent, "Assign [{ty}]:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{lhs}")?;
                write!(indent, "\n{rhs}")
            }
            ExprKind::Assign {
                op: Some(op),
                lhs,
                rhs,
            } => {
                write!(indent, "Assign ({op:?}) [{ty}]:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{lhs}")?;
                write!(indent, "\n{rhs}")
            }
            ExprKind::Not(operand) => {
                write!(indent, "Not [{ty}]:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{operand}")
            }
            ExprKind::AddrOf(operand) => {
                write!(indent, "AddrOf [{ty}]:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{operand}")
            }
            ExprKind::Deref(operand) => {
                write!(indent, "Deref [{ty}]:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{operand}")
            }
            ExprKind::Call {
                callee,
                args,
                no_return,
                exit,
            } => {
                write!(indent, "Call")?;
                if *no_return {
                    write!(indent, " noreturn")?;
                }
                if *exit {
                    write!(indent, " exit")?;
                }
                write!(indent, " [{ty}]:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{callee}")?;
                for arg in args {
                    write!(indent, "\n{arg}")?;
                }
                Ok(())
            }
            ExprKind::MethodCall {
                method,
                recv,
                args,
                no_return,
                exit,
            } => {
                write!(indent, "MethodCall {method}")?;
                if *no_return {
                    write!(indent, " noreturn")?;
                }
                if *exit {
                    write!(indent, " exit")?;
                }
                write!(indent, " [{ty}]:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{recv}")?;
                for arg in args {
                    write!(indent, "\n{arg}")?;
                }
                Ok(())
            }
            ExprKind::Index(from, index) => {
                write!(indent, "Index [{ty}]:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{from}")?;
                write!(indent, "\n{index}")
            }
            ExprKind::TupleIndex(from, index) => {
                write!(indent, "TupleIndex ({index}) [{ty}]:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{from}")
            }
            ExprKind::Field(from, name) => {
                write!(indent, "Field ({name}) [{ty}]:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{from}")
            }
            ExprKind::Cast(operand) => {
                write!(indent, "Cast [{ty}]:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{operand}")
            }
            ExprKind::Ternary(cond, t, e) => {
                write!(indent, "Ternary [{ty}]:")?;
                indent = set_indentation(indent, 1);
                write!(indent, "\n{cond}")?;
                write!(indent, "\n{t}")?;
                write!(indent, "\n{e}")
            }
        }
    }
}

fn children(
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
