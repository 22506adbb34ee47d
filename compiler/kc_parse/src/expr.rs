// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! Expression parsing uses Pratt parsing ("top-down operator-precedence
//! parsing") to handle the relative precedence of operators. Casts,
//! ternaries, calls, indexing and field access are postfix operators binding
//! tighter than any binary operator; assignment is the loosest level and
//! right-associates.

#[cfg(test)]
mod tests;

use super::{scan::Scanner, Error, ErrorKind, Result};
use crate::{
    keyword::Keyword,
    lex::{ClosedBinOp, Delim, TokenKind},
    prim::{ident, seq, skip_seps, token},
    ty::ty,
};
use kc_data_structures::span::Span;
use kc_ast::ast::{BinOp, Expr, ExprKind, StrLit, UnOp};

struct MixfixOp {
    kind: OpKind,
    precedence: u8,
}

enum OpKind {
    Binary(BinOp, Assoc),
    Assign(Option<BinOp>),
    Ternary,
    Cast,
    Call,
    Index,
    Field,
}

#[derive(Clone, Copy)]
enum Assoc {
    Left,
    Right,
}

const ASSIGN_PRECEDENCE: u8 = 1;
const LOGIC_PRECEDENCE: u8 = 2;
const BITWISE_PRECEDENCE: u8 = 3;
const COMPARE_PRECEDENCE: u8 = 4;
const TERM_PRECEDENCE: u8 = 5;
const FACTOR_PRECEDENCE: u8 = 6;
const PREFIX_PRECEDENCE: u8 = 7;
const POSTFIX_PRECEDENCE: u8 = 8;

pub(super) fn expr(s: &mut Scanner) -> Result<Expr> {
    expr_op(s, 0)
}

pub(super) fn expr_eof(s: &mut Scanner) -> Result<Expr> {
    let expr = expr(s)?;
    token(s, TokenKind::Eof)?;
    Ok(expr)
}

fn expr_op(s: &mut Scanner, min_precedence: u8) -> Result<Expr> {
    let lo = s.peek().span.lo;
    let mut lhs = if let Some(op) = prefix_op(s.peek().kind) {
        s.advance();
        let rhs = expr_op(s, PREFIX_PRECEDENCE)?;
        Expr {
            span: s.span(lo),
            kind: Box::new(ExprKind::UnOp(op, rhs)),
        }
    } else {
        expr_base(s)?
    };

    while let Some(op) = mixfix_op(s.peek().kind) {
        if op.precedence < min_precedence {
            break;
        }

        s.advance();
        let kind = match op.kind {
            OpKind::Binary(kind, assoc) => {
                skip_seps(s);
                let rhs = expr_op(s, next_precedence(op.precedence, assoc))?;
                ExprKind::BinOp(kind, lhs, rhs)
            }
            OpKind::Assign(op_kind) => {
                skip_seps(s);
                let rhs = expr_op(s, op.precedence)?;
                match op_kind {
                    None => ExprKind::Assign(lhs, rhs),
                    Some(kind) => ExprKind::AssignOp(kind, lhs, rhs),
                }
            }
            OpKind::Ternary => {
                skip_seps(s);
                let mid = expr(s)?;
                skip_seps(s);
                token(s, TokenKind::Colon)?;
                skip_seps(s);
                let rhs = expr_op(s, op.precedence)?;
                ExprKind::Ternary(lhs, mid, rhs)
            }
            OpKind::Cast => ExprKind::Cast(lhs, ty(s)?),
            OpKind::Call => {
                let args = seq(s, expr)?;
                token(s, TokenKind::Close(Delim::Paren))?;
                ExprKind::Call(lhs, args)
            }
            OpKind::Index => {
                skip_seps(s);
                let index = expr(s)?;
                skip_seps(s);
                token(s, TokenKind::Close(Delim::Bracket))?;
                ExprKind::Index(lhs, index)
            }
            OpKind::Field => ExprKind::Field(lhs, ident(s)?),
        };

        lhs = Expr {
            span: s.span(lo),
            kind: Box::new(kind),
        };
    }

    Ok(lhs)
}

fn expr_base(s: &mut Scanner) -> Result<Expr> {
    let peek = s.peek();
    let lo = peek.span.lo;
    let kind = match peek.kind {
        TokenKind::Int => {
            let value = s
                .read()
                .parse()
                .map_err(|_| Error(ErrorKind::Lit("integer", peek.span)))?;
            s.advance();
            Ok(ExprKind::Int(value))
        }
        TokenKind::Float => {
            let value = s
                .read()
                .parse()
                .map_err(|_| Error(ErrorKind::Lit("float", peek.span)))?;
            s.advance();
            Ok(ExprKind::Float(value))
        }
        TokenKind::Keyword(Keyword::True) => {
            s.advance();
            Ok(ExprKind::Bool(true))
        }
        TokenKind::Keyword(Keyword::False) => {
            s.advance();
            Ok(ExprKind::Bool(false))
        }
        TokenKind::Keyword(Keyword::Null) => {
            s.advance();
            Ok(ExprKind::Null)
        }
        TokenKind::Char => {
            let text = s.read();
            let value = unescape(&text[1..text.len() - 1], peek.span)?;
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => {
                    s.advance();
                    Ok(ExprKind::Char(c))
                }
                _ => Err(Error(ErrorKind::Lit("character", peek.span))),
            }
        }
        TokenKind::Str => {
            let text = s.read();
            let value = unescape(&text[1..text.len() - 1], peek.span)?;
            s.advance();
            Ok(ExprKind::Str(value.into()))
        }
        TokenKind::CStr => {
            let text = s.read();
            let value = unescape(&text[2..text.len() - 1], peek.span)?;
            let mut bytes = value.into_bytes();
            bytes.push(0);
            s.advance();
            Ok(ExprKind::CStr(bytes.into()))
        }
        TokenKind::Ident => {
            let first = ident(s)?;
            if token(s, TokenKind::ColonColon).is_ok() {
                let name = ident(s)?;
                Ok(ExprKind::Name {
                    pkg: Some(first),
                    name,
                })
            } else {
                Ok(ExprKind::Name {
                    pkg: None,
                    name: first,
                })
            }
        }
        TokenKind::Open(Delim::Paren) => {
            s.advance();
            let elems = seq(s, expr)?;
            token(s, TokenKind::Close(Delim::Paren))?;
            Ok(ExprKind::Tuple(elems))
        }
        TokenKind::Open(Delim::Bracket) => {
            s.advance();
            let elems = seq(s, expr)?;
            token(s, TokenKind::Close(Delim::Bracket))?;
            Ok(ExprKind::Array(elems))
        }
        TokenKind::Open(Delim::Brace) => {
            s.advance();
            let fields = seq(s, expr)?;
            token(s, TokenKind::Close(Delim::Brace))?;
            Ok(ExprKind::Struct(fields))
        }
        _ => Err(Error(ErrorKind::Rule("expression", peek.kind, peek.span))),
    }?;

    Ok(Expr {
        span: s.span(lo),
        kind: Box::new(kind),
    })
}

/// Parses a bare string literal, as required by `@link` attribute arguments.
pub(super) fn str_lit(s: &mut Scanner) -> Result<StrLit> {
    let peek = s.peek();
    if peek.kind == TokenKind::Str {
        let text = s.read();
        let value = unescape(&text[1..text.len() - 1], peek.span)?;
        s.advance();
        Ok(StrLit {
            span: peek.span,
            value: value.into(),
        })
    } else {
        Err(Error(ErrorKind::Rule("string", peek.kind, peek.span)))
    }
}

fn unescape(s: &str, span: Span) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            let escape = chars.next().ok_or(Error(ErrorKind::Escape('\\', span)))?;
            out.push(match escape {
                '0' => '\0',
                'a' => '\x07',
                'b' => '\x08',
                't' => '\t',
                'n' => '\n',
                'v' => '\x0B',
                'f' => '\x0C',
                'r' => '\r',
                '\\' => '\\',
                '\'' => '\'',
                '"' => '"',
                _ => return Err(Error(ErrorKind::Escape(escape, span))),
            });
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

fn prefix_op(kind: TokenKind) -> Option<UnOp> {
    match kind {
        TokenKind::BinOp(ClosedBinOp::Minus) => Some(UnOp::Neg),
        TokenKind::Tilde => Some(UnOp::BitNot),
        TokenKind::Bang => Some(UnOp::Not),
        TokenKind::BinOp(ClosedBinOp::Amp) => Some(UnOp::AddrOf),
        TokenKind::BinOp(ClosedBinOp::Star) => Some(UnOp::Deref),
        _ => None,
    }
}

fn mixfix_op(kind: TokenKind) -> Option<MixfixOp> {
    match kind {
        TokenKind::Eq => Some(MixfixOp {
            kind: OpKind::Assign(None),
            precedence: ASSIGN_PRECEDENCE,
        }),
        TokenKind::BinOpEq(op) => Some(MixfixOp {
            kind: OpKind::Assign(Some(closed_bin_op(op))),
            precedence: ASSIGN_PRECEDENCE,
        }),
        TokenKind::AmpAmp => Some(MixfixOp {
            kind: OpKind::Binary(BinOp::AndAnd, Assoc::Left),
            precedence: LOGIC_PRECEDENCE,
        }),
        TokenKind::BarBar => Some(MixfixOp {
            kind: OpKind::Binary(BinOp::OrOr, Assoc::Left),
            precedence: LOGIC_PRECEDENCE,
        }),
        TokenKind::BinOp(
            op @ (ClosedBinOp::Amp
            | ClosedBinOp::Bar
            | ClosedBinOp::Caret
            | ClosedBinOp::Shl
            | ClosedBinOp::Shr),
        ) => Some(MixfixOp {
            kind: OpKind::Binary(closed_bin_op(op), Assoc::Left),
            precedence: BITWISE_PRECEDENCE,
        }),
        TokenKind::EqEq => compare_op(BinOp::Eq),
        TokenKind::Ne => compare_op(BinOp::Ne),
        TokenKind::Lt => compare_op(BinOp::Lt),
        TokenKind::Lte => compare_op(BinOp::Le),
        TokenKind::Gt => compare_op(BinOp::Gt),
        TokenKind::Gte => compare_op(BinOp::Ge),
        TokenKind::BinOp(op @ (ClosedBinOp::Plus | ClosedBinOp::Minus)) => Some(MixfixOp {
            kind: OpKind::Binary(closed_bin_op(op), Assoc::Left),
            precedence: TERM_PRECEDENCE,
        }),
        TokenKind::BinOp(
            op @ (ClosedBinOp::Star | ClosedBinOp::Slash | ClosedBinOp::Percent),
        ) => Some(MixfixOp {
            kind: OpKind::Binary(closed_bin_op(op), Assoc::Left),
            precedence: FACTOR_PRECEDENCE,
        }),
        TokenKind::Question => Some(MixfixOp {
            kind: OpKind::Ternary,
            precedence: POSTFIX_PRECEDENCE,
        }),
        TokenKind::Keyword(Keyword::As) => Some(MixfixOp {
            kind: OpKind::Cast,
            precedence: POSTFIX_PRECEDENCE,
        }),
        TokenKind::Open(Delim::Paren) => Some(MixfixOp {
            kind: OpKind::Call,
            precedence: POSTFIX_PRECEDENCE,
        }),
        TokenKind::Open(Delim::Bracket) => Some(MixfixOp {
            kind: OpKind::Index,
            precedence: POSTFIX_PRECEDENCE,
        }),
        TokenKind::Dot => Some(MixfixOp {
            kind: OpKind::Field,
            precedence: POSTFIX_PRECEDENCE,
        }),
        _ => None,
    }
}

fn compare_op(op: BinOp) -> Option<MixfixOp> {
    Some(MixfixOp {
        kind: OpKind::Binary(op, Assoc::Left),
        precedence: COMPARE_PRECEDENCE,
    })
}

fn closed_bin_op(op: ClosedBinOp) -> BinOp {
    match op {
        ClosedBinOp::Amp => BinOp::And,
        ClosedBinOp::Bar => BinOp::Or,
        ClosedBinOp::Caret => BinOp::Xor,
        ClosedBinOp::Minus => BinOp::Sub,
        ClosedBinOp::Percent => BinOp::Mod,
        ClosedBinOp::Plus => BinOp::Add,
        ClosedBinOp::Shl => BinOp::Shl,
        ClosedBinOp::Shr => BinOp::Shr,
        ClosedBinOp::Slash => BinOp::Div,
        ClosedBinOp::Star => BinOp::Mul,
    }
}

fn next_precedence(precedence: u8, assoc: Assoc) -> u8 {
    match assoc {
        Assoc::Left => precedence + 1,
        Assoc::Right => precedence,
    }
}
