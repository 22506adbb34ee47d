// Copyright (c) The kc contributors.
// Licensed under the MIT License.

#[cfg(test)]
mod tests;

use super::{scan::Scanner, Error, ErrorKind, Result};
use crate::{
    keyword::Keyword,
    lex::{ClosedBinOp, Delim, TokenKind},
    prim::{ident, opt, sep, seq, skip_seps, token},
};
use kc_ast::ast::{FieldDef, Ty, TyKind};

pub(super) fn ty(s: &mut Scanner) -> Result<Ty> {
    let lo = s.peek().span.lo;
    let kind = if token(s, TokenKind::BinOp(ClosedBinOp::Star)).is_ok() {
        Ok(TyKind::Ptr(ty(s)?))
    } else if token(s, TokenKind::Keyword(Keyword::Func)).is_ok() {
        token(s, TokenKind::Open(Delim::Paren))?;
        let params = seq(s, ty)?;
        token(s, TokenKind::Close(Delim::Paren))?;
        let ret = opt(s, ty)?;
        Ok(TyKind::Func(params, ret))
    } else if token(s, TokenKind::Keyword(Keyword::Struct)).is_ok() {
        Ok(TyKind::Struct(struct_fields(s)?))
    } else if token(s, TokenKind::Open(Delim::Bracket)).is_ok() {
        let size = array_size(s)?;
        token(s, TokenKind::Close(Delim::Bracket))?;
        Ok(TyKind::Array(size, ty(s)?))
    } else if token(s, TokenKind::Open(Delim::Paren)).is_ok() {
        let elems = seq(s, ty)?;
        token(s, TokenKind::Close(Delim::Paren))?;
        Ok(TyKind::Tuple(elems))
    } else if s.peek().kind == TokenKind::Ident {
        let first = ident(s)?;
        if token(s, TokenKind::ColonColon).is_ok() {
            let name = ident(s)?;
            Ok(TyKind::Name {
                pkg: Some(first),
                name,
            })
        } else {
            Ok(TyKind::Name {
                pkg: None,
                name: first,
            })
        }
    } else {
        Err(Error(ErrorKind::Rule(
            "type",
            s.peek().kind,
            s.peek().span,
        )))
    }?;

    Ok(Ty {
        span: s.span(lo),
        kind: Box::new(kind),
    })
}

fn array_size(s: &mut Scanner) -> Result<u64> {
    let peek = s.peek();
    if peek.kind == TokenKind::Int {
        let size = s
            .read()
            .parse()
            .map_err(|_| Error(ErrorKind::Lit("integer", peek.span)))?;
        s.advance();
        Ok(size)
    } else {
        Err(Error(ErrorKind::Rule(
            "integer literal",
            peek.kind,
            peek.span,
        )))
    }
}

/// The body of a `struct { ... }` type: `name: T` fields separated by
/// separators, with a trailing separator tolerated before the closing brace.
fn struct_fields(s: &mut Scanner) -> Result<Vec<FieldDef>> {
    token(s, TokenKind::Open(Delim::Brace))?;
    skip_seps(s);
    let mut fields = Vec::new();
    while s.peek().kind != TokenKind::Close(Delim::Brace) {
        let name = ident(s)?;
        token(s, TokenKind::Colon)?;
        let field_ty = ty(s)?;
        fields.push(FieldDef { name, ty: field_ty });
        if s.peek().kind == TokenKind::Close(Delim::Brace) {
            break;
        }
        sep(s)?;
    }
    token(s, TokenKind::Close(Delim::Brace))?;
    Ok(fields)
}
