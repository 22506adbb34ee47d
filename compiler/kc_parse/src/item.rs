// Copyright (c) The kc contributors.
// Licensed under the MIT License.

#[cfg(test)]
mod tests;

use super::{scan::Scanner, Error, ErrorKind, Result};
use crate::{
    expr::{expr, str_lit},
    keyword::Keyword,
    lex::{Delim, TokenKind},
    prim::{ident, opt, sep, seq, skip_seps, token},
    stmt::block,
    ty::ty,
};
use kc_ast::ast::{
    Attr, AttrKind, File, FuncDecl, Global, GlobalKind, LetDecl, MethodDecl, Param, Ty, TyKind,
};

/// Parses a whole file: globals separated by `;` or newlines, until EOF.
pub(super) fn file(s: &mut Scanner, name: &str) -> Result<File> {
    let mut globals = Vec::new();
    skip_seps(s);
    while s.peek().kind != TokenKind::Eof {
        globals.push(global(s)?);
        if s.peek().kind == TokenKind::Eof {
            break;
        }
        sep(s)?;
    }
    Ok(File {
        name: name.into(),
        globals,
    })
}

fn global(s: &mut Scanner) -> Result<Global> {
    let lo = s.peek().span.lo;
    let mut attrs = Vec::new();
    while s.peek().kind == TokenKind::Attr {
        attrs.push(attr(s)?);
        skip_seps(s);
    }

    let kind = if token(s, TokenKind::Keyword(Keyword::Import)).is_ok() {
        let mut path = vec![ident(s)?];
        while token(s, TokenKind::Dot).is_ok() {
            path.push(ident(s)?);
        }
        let alias = if token(s, TokenKind::Keyword(Keyword::As)).is_ok() {
            Some(ident(s)?)
        } else {
            None
        };
        Ok(GlobalKind::Import { path, alias })
    } else {
        let is_pub = token(s, TokenKind::Keyword(Keyword::Pub)).is_ok();
        if token(s, TokenKind::Keyword(Keyword::Type)).is_ok() {
            let name = ident(s)?;
            let dst = ty(s)?;
            Ok(GlobalKind::TyDef { is_pub, name, dst })
        } else if token(s, TokenKind::Keyword(Keyword::Func)).is_ok() {
            func_or_method(s, is_pub)
        } else if token(s, TokenKind::Keyword(Keyword::Let)).is_ok() {
            let name = ident(s)?;
            let let_ty = if token(s, TokenKind::Colon).is_ok() {
                Some(ty(s)?)
            } else {
                None
            };
            let value = if token(s, TokenKind::Eq).is_ok() {
                skip_seps(s);
                Some(expr(s)?)
            } else {
                None
            };
            Ok(GlobalKind::Let(Box::new(LetDecl {
                is_pub,
                name,
                ty: let_ty,
                value,
            })))
        } else {
            Err(Error(ErrorKind::Rule(
                "global",
                s.peek().kind,
                s.peek().span,
            )))
        }
    }?;

    Ok(Global {
        span: s.span(lo),
        attrs,
        kind,
    })
}

fn func_or_method(s: &mut Scanner, is_pub: bool) -> Result<GlobalKind> {
    if token(s, TokenKind::Open(Delim::Paren)).is_ok() {
        // `func (Recv) Name(params) Ret { ... }`
        let recv = ident(s)?;
        token(s, TokenKind::Close(Delim::Paren))?;
        let name = ident(s)?;
        let params = params(s)?;
        let ret = opt(s, ty)?;
        let body = block(s)?;
        Ok(GlobalKind::Method(Box::new(MethodDecl {
            is_pub,
            recv,
            name,
            params,
            ret,
            body,
        })))
    } else {
        let name = ident(s)?;
        let params = params(s)?;
        let ret = opt(s, ty)?;
        let body = opt(s, block)?;
        Ok(GlobalKind::Func(Box::new(FuncDecl {
            is_pub,
            name,
            params,
            ret,
            body,
        })))
    }
}

fn params(s: &mut Scanner) -> Result<Vec<Param>> {
    token(s, TokenKind::Open(Delim::Paren))?;
    let params = seq(s, param)?;
    token(s, TokenKind::Close(Delim::Paren))?;
    Ok(params)
}

/// A parameter is `name: T` or a bare `T`. Both start with an identifier in
/// the common case, so a type is parsed first and reinterpreted as a name
/// when a `:` follows a bare unqualified type identifier.
fn param(s: &mut Scanner) -> Result<Param> {
    let lo = s.peek().span.lo;
    let first = ty(s)?;
    match *first.kind {
        TyKind::Name { pkg: None, name } if s.peek().kind == TokenKind::Colon => {
            s.advance();
            let param_ty = ty(s)?;
            Ok(Param {
                span: s.span(lo),
                name: Some(name),
                ty: param_ty,
            })
        }
        kind => Ok(Param {
            span: s.span(lo),
            name: None,
            ty: Ty {
                span: first.span,
                kind: Box::new(kind),
            },
        }),
    }
}

fn attr(s: &mut Scanner) -> Result<Attr> {
    let peek = s.peek();
    let name = s.read();
    let lo = peek.span.lo;
    if peek.kind != TokenKind::Attr {
        return Err(Error(ErrorKind::Rule("attribute", peek.kind, peek.span)));
    }

    let kind = match name {
        "@extern" => {
            s.advance();
            token(s, TokenKind::Open(Delim::Paren))?;
            let name = ident(s)?;
            token(s, TokenKind::Close(Delim::Paren))?;
            AttrKind::Extern(name)
        }
        "@link" => {
            s.advance();
            token(s, TokenKind::Open(Delim::Paren))?;
            let target = ident(s)?;
            token(s, TokenKind::Eq)?;
            let value = str_lit(s)?;
            token(s, TokenKind::Close(Delim::Paren))?;
            match target.name.as_ref() {
                "asm" => AttrKind::LinkAsm(value),
                "lib" => AttrKind::LinkLib(value),
                _ => return Err(Error(ErrorKind::UnknownAttr(target.span))),
            }
        }
        "@noreturn" => {
            s.advance();
            AttrKind::NoReturn
        }
        "@exit" => {
            s.advance();
            AttrKind::Exit
        }
        "@inline" => {
            s.advance();
            token(s, TokenKind::Open(Delim::Paren))?;
            let value = if token(s, TokenKind::Keyword(Keyword::True)).is_ok() {
                true
            } else {
                token(s, TokenKind::Keyword(Keyword::False))?;
                false
            };
            token(s, TokenKind::Close(Delim::Paren))?;
            AttrKind::Inline(value)
        }
        _ => return Err(Error(ErrorKind::UnknownAttr(peek.span))),
    };

    Ok(Attr {
        span: s.span(lo),
        kind,
    })
}
