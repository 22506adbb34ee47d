// Copyright (c) The kc contributors.
// Licensed under the MIT License.


use super::{scan::Scanner, Error, ErrorKind, Parser, Result};
use crate::lex::TokenKind;
use kc_ast::ast::Ident;

pub(super) fn token(s: &mut Scanner, t: TokenKind) -> Result<()> {
    if s.peek().kind == t {
        s.advance();
        Ok(())
    } else {
        Err(Error(ErrorKind::Token(t, s.peek().kind, s.peek().span)))
    }
}

pub(super) fn ident(s: &mut Scanner) -> Result<Ident> {
    let peek = s.peek();
    if peek.kind == TokenKind::Ident {
        let name = s.read().into();
        s.advance();
        Ok(Ident {
            span: peek.span,
            name,
        })
    } else {
        Err(Error(ErrorKind::Rule("identifier", peek.kind, peek.span)))
    }
}

/// Optionally parse with the given parser. Returns `Ok(Some(value))` if the
/// parser succeeded, `Ok(None)` if the parser failed on the first token,
/// `Err(error)` if the parser failed after consuming some tokens.
pub(super) fn opt<T>(s: &mut Scanner, mut p: impl Parser<T>) -> Result<Option<T>> {
    let offset = s.peek().span.lo;
    match p(s) {
        Ok(x) => Ok(Some(x)),
        Err(error) if advanced(s, offset) => Err(error),
        Err(_) => Ok(None),
    }
}

/// Parses a comma-separated sequence of items inside a bracketed context.
/// Separators around items are skipped so that the sequence may span
/// multiple lines; a separator never substitutes for a comma.
pub(super) fn seq<T>(s: &mut Scanner, mut p: impl Parser<T>) -> Result<Vec<T>> {
    let mut xs = Vec::new();
    skip_seps(s);
    if let Some(first) = opt(s, &mut p)? {
        xs.push(first);
        skip_seps(s);
        while token(s, TokenKind::Comma).is_ok() {
            skip_seps(s);
            xs.push(p(s)?);
            skip_seps(s);
        }
    }
    Ok(xs)
}

/// Skips any run of separator tokens.
pub(super) fn skip_seps(s: &mut Scanner) {
    while s.peek().kind == TokenKind::Semi {
        s.advance();
    }
}

/// Requires at least one separator, then collapses the rest of the run.
pub(super) fn sep(s: &mut Scanner) -> Result<()> {
    token(s, TokenKind::Semi)?;
    skip_seps(s);
    Ok(())
}

fn advanced(s: &Scanner, from: u32) -> bool {
    s.peek().span.lo > from
}
