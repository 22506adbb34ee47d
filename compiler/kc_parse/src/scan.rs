// Copyright (c) The kc contributors.
// Licensed under the MIT License.

use super::Error;
use crate::{
    lex::{Lexer, Token, TokenKind},
    ErrorKind,
};
use kc_data_structures::span::Span;

/// A one-token-lookahead cursor over the cooked token stream. Lexical errors
/// are accumulated as they are encountered so that the parser can keep
/// consuming tokens past them.
pub(super) struct Scanner<'a> {
    input: &'a str,
    base: u32,
    tokens: Lexer<'a>,
    errors: Vec<Error>,
    peek: Token,
    offset: u32,
}

impl<'a> Scanner<'a> {
    pub(super) fn new(input: &'a str, base: u32) -> Self {
        let mut tokens = Lexer::new(input, base);
        let (peek, errors) = next_ok(&mut tokens);
        Self {
            input,
            base,
            tokens,
            errors: errors
                .into_iter()
                .map(|e| Error(ErrorKind::Lex(e)))
                .collect(),
            peek: peek.unwrap_or_else(|| eof(input.len(), base)),
            offset: base,
        }
    }

    pub(super) fn peek(&self) -> Token {
        self.peek
    }

    /// The source text of the peeked token.
    pub(super) fn read(&self) -> &'a str {
        let lo = (self.peek.span.lo - self.base) as usize;
        let hi = (self.peek.span.hi - self.base) as usize;
        &self.input[lo..hi]
    }

    pub(super) fn span(&self, from: u32) -> Span {
        Span {
            lo: from,
            hi: self.offset,
        }
    }

    pub(super) fn advance(&mut self) {
        if self.peek.kind != TokenKind::Eof {
            self.offset = self.peek.span.hi;
            let (peek, errors) = next_ok(&mut self.tokens);
            self.errors
                .extend(errors.into_iter().map(|e| Error(ErrorKind::Lex(e))));
            self.peek = peek.unwrap_or_else(|| eof(self.input.len(), self.base));
        }
    }

    pub(super) fn push_error(&mut self, error: Error) {
        self.errors.push(error);
    }

    pub(super) fn into_errors(self) -> Vec<Error> {
        self.errors
    }
}

fn eof(offset: usize, base: u32) -> Token {
    let offset = base + u32::try_from(offset).expect("eof offset should fit into u32");
    Token {
        kind: TokenKind::Eof,
        span: Span {
            lo: offset,
            hi: offset,
        },
    }
}

/// Advances the iterator by skipping [`Err`] values until the first [`Ok`]
/// value is found. Returns the found value or [`None`] if the iterator is
/// exhausted. All skipped errors are also accumulated into a vector and
/// returned.
fn next_ok<T, E>(iter: impl Iterator<Item = Result<T, E>>) -> (Option<T>, Vec<E>) {
    let mut errors = Vec::new();
    for result in iter {
        match result {
            Ok(v) => return (Some(v), errors),
            Err(e) => errors.push(e),
        }
    }

    (None, errors)
}
