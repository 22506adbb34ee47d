// Copyright (c) The kc contributors.
// Licensed under the MIT License.

#[cfg(test)]
mod tests;

use super::{scan::Scanner, Result};
use crate::{
    expr::expr,
    keyword::Keyword,
    lex::{Delim, TokenKind},
    prim::{ident, opt, sep, skip_seps, token},
    ty::ty,
};
use kc_ast::ast::{Block, ElseArm, IfStmt, Stmt, StmtKind};

/// Parses a brace-delimited statement list. Statements are separated by `;`
/// or newlines; runs of separators collapse and a trailing separator is
/// tolerated before the closing brace.
pub(super) fn block(s: &mut Scanner) -> Result<Block> {
    let lo = s.peek().span.lo;
    token(s, TokenKind::Open(Delim::Brace))?;
    skip_seps(s);
    let mut stmts = Vec::new();
    while s.peek().kind != TokenKind::Close(Delim::Brace) {
        stmts.push(stmt(s)?);
        if s.peek().kind == TokenKind::Close(Delim::Brace) {
            break;
        }
        sep(s)?;
    }
    token(s, TokenKind::Close(Delim::Brace))?;
    Ok(Block {
        span: s.span(lo),
        stmts,
    })
}

pub(super) fn stmt(s: &mut Scanner) -> Result<Stmt> {
    let lo = s.peek().span.lo;
    let kind = if token(s, TokenKind::Keyword(Keyword::Return)).is_ok() {
        Ok(StmtKind::Return(opt(s, expr)?))
    } else if token(s, TokenKind::Keyword(Keyword::Let)).is_ok() {
        let name = ident(s)?;
        let ty = if token(s, TokenKind::Colon).is_ok() {
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
        Ok(StmtKind::Let { name, ty, value })
    } else if s.peek().kind == TokenKind::Keyword(Keyword::If) {
        Ok(StmtKind::If(if_stmt(s)?))
    } else if token(s, TokenKind::Keyword(Keyword::For)).is_ok() {
        let cond = expr(s)?;
        let body = block(s)?;
        Ok(StmtKind::For { cond, body })
    } else if token(s, TokenKind::Keyword(Keyword::Break)).is_ok() {
        Ok(StmtKind::Break)
    } else if token(s, TokenKind::Keyword(Keyword::Continue)).is_ok() {
        Ok(StmtKind::Continue)
    } else if token(s, TokenKind::Keyword(Keyword::Defer)).is_ok() {
        Ok(StmtKind::Defer(expr(s)?))
    } else if s.peek().kind == TokenKind::Open(Delim::Brace) {
        Ok(StmtKind::Block(block(s)?))
    } else {
        expr(s).map(StmtKind::Expr)
    }?;

    Ok(Stmt {
        span: s.span(lo),
        kind: Box::new(kind),
    })
}

fn if_stmt(s: &mut Scanner) -> Result<IfStmt> {
    token(s, TokenKind::Keyword(Keyword::If))?;
    let cond = expr(s)?;
    let then = block(s)?;
    let els = if token(s, TokenKind::Keyword(Keyword::Else)).is_ok() {
        if s.peek().kind == TokenKind::Keyword(Keyword::If) {
            Some(ElseArm::If(Box::new(if_stmt(s)?)))
        } else {
            Some(ElseArm::Block(block(s)?))
        }
    } else {
        None
    };
    Ok(IfStmt { cond, then, els })
}
