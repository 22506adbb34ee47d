// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! The K parser uses recursive descent to turn an input string into an
//! untyped abstract syntax tree, with a Pratt-style precedence climb for
//! expressions. Lexical and syntactic errors are reported against spans in
//! the global source-map offset space: callers pass the offset at which the
//! input was loaded.

mod expr;
mod item;
mod keyword;
mod lex;
mod prim;
mod scan;
mod stmt;
#[cfg(test)]
mod tests;
mod ty;

use kc_ast::ast;
use kc_data_structures::span::Span;
use lex::TokenKind;
use miette::Diagnostic;
use scan::Scanner;
use std::result;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Diagnostic, Eq, Error, PartialEq)]
#[error(transparent)]
#[diagnostic(transparent)]
pub struct Error(ErrorKind);

impl Error {
    /// The span the error is anchored to.
    #[must_use]
    pub fn span(&self) -> Span {
        match self.0 {
            ErrorKind::Lex(error) => error.span(),
            ErrorKind::Lit(_, span)
            | ErrorKind::Escape(_, span)
            | ErrorKind::Token(_, _, span)
            | ErrorKind::Rule(_, _, span)
            | ErrorKind::UnknownAttr(span) => span,
        }
    }
}

#[derive(Clone, Copy, Debug, Diagnostic, Eq, Error, PartialEq)]
enum ErrorKind {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(lex::Error),
    #[error("invalid {0} literal")]
    #[diagnostic(code("Kc.Parse.Literal"))]
    Lit(&'static str, #[label] Span),
    #[error("unknown escape sequence: `{0}`")]
    #[diagnostic(code("Kc.Parse.Escape"))]
    Escape(char, #[label] Span),
    #[error("expected {0}, found {1}")]
    #[diagnostic(code("Kc.Parse.Token"))]
    Token(TokenKind, TokenKind, #[label] Span),
    #[error("expected {0}, found {1}")]
    #[diagnostic(code("Kc.Parse.Rule"))]
    Rule(&'static str, TokenKind, #[label] Span),
    #[error("unknown attribute")]
    #[diagnostic(code("Kc.Parse.Attr"))]
    UnknownAttr(#[label] Span),
}

type Result<T> = result::Result<T, Error>;

trait Parser<T>: FnMut(&mut Scanner) -> Result<T> {}

impl<T, F: FnMut(&mut Scanner) -> Result<T>> Parser<T> for F {}

/// Lexes and parses one source file. `offset` is the position of `input`
/// within the global source map; all spans in the returned tree are shifted
/// by it. A fatal syntax error aborts the parse; the file parsed so far is
/// returned together with every accumulated error.
#[must_use]
pub fn file(name: &str, input: &str, offset: u32) -> (ast::File, Vec<Error>) {
    let mut scanner = Scanner::new(input, offset);
    match item::file(&mut scanner, name) {
        Ok(file) => (file, scanner.into_errors()),
        Err(error) => {
            let mut errors = scanner.into_errors();
            errors.push(error);
            (
                ast::File {
                    name: name.into(),
                    globals: Vec::new(),
                },
                errors,
            )
        }
    }
}
