// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! The second lexing phase "cooks" a raw token stream into tokens that
//! directly correspond to components in the K grammar: keywords are split
//! from identifiers, compound operators are glued together from adjacent
//! single-character tokens, `@name` becomes an attribute token, and both `;`
//! and newline become the single separator kind.
//!
//! Whitespace and comment tokens are discarded; this means that cooked
//! tokens are not necessarily contiguous, so they include both a starting
//! and ending byte offset.

#[cfg(test)]
mod tests;

use super::{
    raw::{self, Number, Single, StrKind},
    Delim,
};
use crate::keyword::Keyword;
use enum_iterator::Sequence;
use kc_data_structures::span::Span;
use miette::Diagnostic;
use std::{
    fmt::{self, Display, Formatter},
    iter::Peekable,
};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) span: Span,
}

#[derive(Clone, Copy, Debug, Diagnostic, Eq, Error, PartialEq)]
pub(crate) enum Error {
    #[error("expected an identifier to follow `@`")]
    #[diagnostic(code("Kc.Lex.Attr"))]
    Attr(#[label] Span),

    #[error("invalid number literal")]
    #[diagnostic(code("Kc.Lex.Number"))]
    Number(#[label] Span),

    #[error("unterminated block comment")]
    #[diagnostic(code("Kc.Lex.UnterminatedComment"))]
    UnterminatedComment(#[label] Span),

    #[error("unterminated character literal")]
    #[diagnostic(code("Kc.Lex.UnterminatedChar"))]
    UnterminatedChar(#[label] Span),

    #[error("unterminated string literal")]
    #[diagnostic(code("Kc.Lex.UnterminatedString"))]
    UnterminatedString(#[label] Span),

    #[error("unrecognized character `{0}`")]
    #[diagnostic(code("Kc.Lex.UnknownChar"))]
    Unknown(char, #[label] Span),
}

impl Error {
    pub(crate) fn span(self) -> Span {
        match self {
            Error::Attr(span)
            | Error::Number(span)
            | Error::UnterminatedComment(span)
            | Error::UnterminatedChar(span)
            | Error::UnterminatedString(span)
            | Error::Unknown(_, span) => span,
        }
    }
}

/// A token kind.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Sequence)]
pub(crate) enum TokenKind {
    /// `&&`
    AmpAmp,
    /// `@name`
    Attr,
    /// `!`
    Bang,
    /// `||`
    BarBar,
    /// A closed binary operator not followed by an equals token.
    BinOp(ClosedBinOp),
    /// A closed binary operator followed by an equals token.
    BinOpEq(ClosedBinOp),
    /// A C string literal.
    CStr,
    /// A character literal.
    Char,
    /// A closing delimiter.
    Close(Delim),
    /// `:`
    Colon,
    /// `::`
    ColonColon,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// End of file.
    Eof,
    /// `=`
    Eq,
    /// `==`
    EqEq,
    /// A floating-point literal.
    Float,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// An identifier.
    Ident,
    /// An integer literal.
    Int,
    /// A keyword.
    Keyword(Keyword),
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `!=`
    Ne,
    /// An opening delimiter.
    Open(Delim),
    /// `?`
    Question,
    /// The statement separator: `;` or a newline.
    Semi,
    /// A string literal.
    Str,
    /// `~`
    Tilde,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            TokenKind::AmpAmp => f.write_str("`&&`"),
            TokenKind::Attr => f.write_str("attribute"),
            TokenKind::Bang => f.write_str("`!`"),
            TokenKind::BarBar => f.write_str("`||`"),
            TokenKind::BinOp(op) => write!(f, "`{op}`"),
            TokenKind::BinOpEq(op) => write!(f, "`{op}=`"),
            TokenKind::CStr => f.write_str("C string"),
            TokenKind::Char => f.write_str("character"),
            TokenKind::Close(Delim::Brace) => f.write_str("`}`"),
            TokenKind::Close(Delim::Bracket) => f.write_str("`]`"),
            TokenKind::Close(Delim::Paren) => f.write_str("`)`"),
            TokenKind::Colon => f.write_str("`:`"),
            TokenKind::ColonColon => f.write_str("`::`"),
            TokenKind::Comma => f.write_str("`,`"),
            TokenKind::Dot => f.write_str("`.`"),
            TokenKind::Eof => f.write_str("EOF"),
            TokenKind::Eq => f.write_str("`=`"),
            TokenKind::EqEq => f.write_str("`==`"),
            TokenKind::Float => f.write_str("float"),
            TokenKind::Gt => f.write_str("`>`"),
            TokenKind::Gte => f.write_str("`>=`"),
            TokenKind::Ident => f.write_str("identifier"),
            TokenKind::Int => f.write_str("integer"),
            TokenKind::Keyword(keyword) => write!(f, "keyword `{keyword}`"),
            TokenKind::Lt => f.write_str("`<`"),
            TokenKind::Lte => f.write_str("`<=`"),
            TokenKind::Ne => f.write_str("`!=`"),
            TokenKind::Open(Delim::Brace) => f.write_str("`{`"),
            TokenKind::Open(Delim::Bracket) => f.write_str("`[`"),
            TokenKind::Open(Delim::Paren) => f.write_str("`(`"),
            TokenKind::Question => f.write_str("`?`"),
            TokenKind::Semi => f.write_str("`;`"),
            TokenKind::Str => f.write_str("string"),
            TokenKind::Tilde => f.write_str("`~`"),
        }
    }
}

/// A binary operator that returns the same type as the type of its first
/// operand; in other words, the domain of the first operand is closed under
/// this operation. These are the candidates for compound assignment
/// operators like `+=`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Sequence)]
pub(crate) enum ClosedBinOp {
    /// `&`
    Amp,
    /// `|`
    Bar,
    /// `^`
    Caret,
    /// `-`
    Minus,
    /// `%`
    Percent,
    /// `+`
    Plus,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `/`
    Slash,
    /// `*`
    Star,
}

impl Display for ClosedBinOp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            ClosedBinOp::Amp => "&",
            ClosedBinOp::Bar => "|",
            ClosedBinOp::Caret => "^",
            ClosedBinOp::Minus => "-",
            ClosedBinOp::Percent => "%",
            ClosedBinOp::Plus => "+",
            ClosedBinOp::Shl => "<<",
            ClosedBinOp::Shr => ">>",
            ClosedBinOp::Slash => "/",
            ClosedBinOp::Star => "*",
        })
    }
}

pub(crate) struct Lexer<'a> {
    input: &'a str,
    len: u32,
    /// Offset of the input within the global source map; all spans are
    /// shifted by this amount.
    base: u32,

    // A `Peekable` iterator over the raw lexer, for one raw token of
    // lookahead when gluing compound operators.
    tokens: Peekable<raw::Lexer<'a>>,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str, base: u32) -> Self {
        Self {
            input,
            len: input
                .len()
                .try_into()
                .expect("input length should fit into u32"),
            base,
            tokens: raw::Lexer::new(input).peekable(),
        }
    }

    fn offset(&mut self) -> u32 {
        self.tokens.peek().map_or(self.len, |t| t.offset)
    }

    fn next_if_eq(&mut self, single: Single) -> bool {
        self.tokens
            .next_if(|t| t.kind == raw::TokenKind::Single(single))
            .is_some()
    }

    fn next_if_eq_kind(&mut self, kind: raw::TokenKind) -> bool {
        self.tokens.next_if(|t| t.kind == kind).is_some()
    }

    fn cook(&mut self, token: &raw::Token) -> Result<Option<TokenKind>, Error> {
        match token.kind {
            raw::TokenKind::Comment { terminated: true } | raw::TokenKind::Whitespace => Ok(None),
            raw::TokenKind::Comment { terminated: false } => {
                Err(Error::UnterminatedComment(self.span_from(token.offset)))
            }
            raw::TokenKind::Newline => Ok(Some(TokenKind::Semi)),
            raw::TokenKind::Ident => {
                let ident = &self.input[token.offset as usize..self.offset() as usize];
                Ok(Some(
                    ident
                        .parse()
                        .map_or(TokenKind::Ident, TokenKind::Keyword),
                ))
            }
            raw::TokenKind::Number(Number::Int) => Ok(Some(TokenKind::Int)),
            raw::TokenKind::Number(Number::Float) => Ok(Some(TokenKind::Float)),
            raw::TokenKind::Number(Number::Malformed) => {
                Err(Error::Number(self.span_from(token.offset)))
            }
            raw::TokenKind::Str {
                kind,
                terminated: true,
            } => Ok(Some(match kind {
                StrKind::Char => TokenKind::Char,
                StrKind::CStr => TokenKind::CStr,
                StrKind::Normal => TokenKind::Str,
            })),
            raw::TokenKind::Str {
                kind: StrKind::Char,
                terminated: false,
            } => Err(Error::UnterminatedChar(self.span_from(token.offset))),
            raw::TokenKind::Str {
                terminated: false, ..
            } => Err(Error::UnterminatedString(self.span_from(token.offset))),
            raw::TokenKind::Single(single) => self.single(single, token.offset).map(Some),
            raw::TokenKind::Unknown => {
                let c = self.input[token.offset as usize..]
                    .chars()
                    .next()
                    .expect("token offset should be the start of a character");
                Err(Error::Unknown(c, self.span_from(token.offset)))
            }
        }
    }

    fn single(&mut self, single: Single, offset: u32) -> Result<TokenKind, Error> {
        match single {
            Single::Amp => {
                if self.next_if_eq(Single::Amp) {
                    Ok(TokenKind::AmpAmp)
                } else {
                    Ok(self.closed_bin_op(ClosedBinOp::Amp))
                }
            }
            Single::At => {
                if self.next_if_eq_kind(raw::TokenKind::Ident) {
                    Ok(TokenKind::Attr)
                } else {
                    Err(Error::Attr(self.span_from(offset)))
                }
            }
            Single::Bang => {
                if self.next_if_eq(Single::Eq) {
                    Ok(TokenKind::Ne)
                } else {
                    Ok(TokenKind::Bang)
                }
            }
            Single::Bar => {
                if self.next_if_eq(Single::Bar) {
                    Ok(TokenKind::BarBar)
                } else {
                    Ok(self.closed_bin_op(ClosedBinOp::Bar))
                }
            }
            Single::Caret => Ok(self.closed_bin_op(ClosedBinOp::Caret)),
            Single::Close(delim) => Ok(TokenKind::Close(delim)),
            Single::Colon => {
                if self.next_if_eq(Single::Colon) {
                    Ok(TokenKind::ColonColon)
                } else {
                    Ok(TokenKind::Colon)
                }
            }
            Single::Comma => Ok(TokenKind::Comma),
            Single::Dot => Ok(TokenKind::Dot),
            Single::Eq => {
                if self.next_if_eq(Single::Eq) {
                    Ok(TokenKind::EqEq)
                } else {
                    Ok(TokenKind::Eq)
                }
            }
            Single::Gt => {
                if self.next_if_eq(Single::Eq) {
                    Ok(TokenKind::Gte)
                } else if self.next_if_eq(Single::Gt) {
                    Ok(self.closed_bin_op(ClosedBinOp::Shr))
                } else {
                    Ok(TokenKind::Gt)
                }
            }
            Single::Lt => {
                if self.next_if_eq(Single::Eq) {
                    Ok(TokenKind::Lte)
                } else if self.next_if_eq(Single::Lt) {
                    Ok(self.closed_bin_op(ClosedBinOp::Shl))
                } else {
                    Ok(TokenKind::Lt)
                }
            }
            Single::Minus => Ok(self.closed_bin_op(ClosedBinOp::Minus)),
            Single::Open(delim) => Ok(TokenKind::Open(delim)),
            Single::Percent => Ok(self.closed_bin_op(ClosedBinOp::Percent)),
            Single::Plus => Ok(self.closed_bin_op(ClosedBinOp::Plus)),
            Single::Question => Ok(TokenKind::Question),
            Single::Semi => Ok(TokenKind::Semi),
            Single::Slash => Ok(self.closed_bin_op(ClosedBinOp::Slash)),
            Single::Star => Ok(self.closed_bin_op(ClosedBinOp::Star)),
            Single::Tilde => Ok(TokenKind::Tilde),
        }
    }

    fn closed_bin_op(&mut self, op: ClosedBinOp) -> TokenKind {
        if self.next_if_eq(Single::Eq) {
            TokenKind::BinOpEq(op)
        } else {
            TokenKind::BinOp(op)
        }
    }

    fn span_from(&mut self, lo: u32) -> Span {
        Span {
            lo: lo + self.base,
            hi: self.offset() + self.base,
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let token = self.tokens.next()?;
            match self.cook(&token) {
                Ok(None) => {}
                Ok(Some(kind)) => {
                    let span = self.span_from(token.offset);
                    return Some(Ok(Token { kind, span }));
                }
                Err(error) => return Some(Err(error)),
            }
        }
    }
}
