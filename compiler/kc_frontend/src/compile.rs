// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! Source loading and the parsing entry points. Every file the compiler
//! reads is appended to a [`SourceMap`]; spans everywhere in the pipeline
//! are offsets into that map, so a span alone identifies its file, row and
//! column.

#[cfg(test)]
mod tests;

use crate::analyse;
use kc_ast::ast;
use kc_data_structures::span::Span;
use miette::Diagnostic;
use std::{
    fmt::Write as _,
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;

/// The loaded sources, each occupying a distinct offset range. Offsets leave
/// a one-byte gap between adjacent sources so that an EOF span at the end of
/// one file is not confused with the start of the next.
#[derive(Clone, Debug, Default)]
pub struct SourceMap {
    sources: Vec<Source>,
}

#[derive(Clone, Debug)]
pub struct Source {
    pub name: Arc<str>,
    pub contents: Arc<str>,
    pub offset: u32,
}

/// A resolved source position for diagnostics; row and column are 1-based.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Position {
    pub name: Arc<str>,
    pub row: u32,
    pub column: u32,
}

impl SourceMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: Arc<str>, contents: Arc<str>) -> u32 {
        let offset = self.sources.last().map_or(0, |s| {
            s.offset + u32::try_from(s.contents.len()).expect("source length should fit into u32") + 1
        });
        self.sources.push(Source {
            name,
            contents,
            offset,
        });
        offset
    }

    #[must_use]
    pub fn find_by_offset(&self, offset: u32) -> Option<&Source> {
        self.sources
            .iter()
            .rev()
            .find(|source| offset >= source.offset)
    }

    /// Resolves an offset to its file, row and column.
    #[must_use]
    pub fn position(&self, offset: u32) -> Option<Position> {
        let source = self.find_by_offset(offset)?;
        let rel = ((offset - source.offset) as usize).min(source.contents.len());
        let mut row = 1;
        let mut line_start = 0;
        for (i, c) in source.contents.char_indices() {
            if i >= rel {
                break;
            }
            if c == '\n' {
                row += 1;
                line_start = i + 1;
            }
        }
        let column = source.contents[line_start..rel].chars().count() as u32 + 1;
        Some(Position {
            name: Arc::clone(&source.name),
            row,
            column,
        })
    }
}

#[derive(Clone, Debug, Diagnostic, Error)]
#[diagnostic(transparent)]
#[error(transparent)]
pub struct Error(pub(crate) ErrorKind);

impl Error {
    /// The span the error is anchored to, when it has one; I/O errors do
    /// not.
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        match &self.0 {
            ErrorKind::Io(..) => None,
            ErrorKind::Parse(error) => Some(error.span()),
            ErrorKind::Analyse(error) => Some(error.span()),
        }
    }
}

#[derive(Clone, Debug, Diagnostic, Error)]
pub(crate) enum ErrorKind {
    #[error("{1}: {0}")]
    #[diagnostic(code("Kc.Io"))]
    Io(String, String),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(kc_parse::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Analyse(analyse::Error),
}

impl From<analyse::Error> for Error {
    fn from(error: analyse::Error) -> Self {
        Error(ErrorKind::Analyse(error))
    }
}

/// Renders diagnostics one per line as `path:row:col: message`, in source
/// order, the way the driver prints them to stderr.
#[must_use]
pub fn render_errors(sources: &SourceMap, errors: &[Error]) -> String {
    let mut errors: Vec<&Error> = errors.iter().collect();
    errors.sort_by_key(|e| e.span().map_or(0, |s| s.lo));
    let mut out = String::new();
    for error in errors {
        if !out.is_empty() {
            out.push('\n');
        }
        match error.span().and_then(|s| sources.position(s.lo)) {
            Some(position) => {
                let _ = write!(
                    out,
                    "{}:{}:{}: {error}",
                    position.name, position.row, position.column
                );
            }
            None => {
                let _ = write!(out, "{error}");
            }
        }
    }
    out
}

/// Lexes and parses a single `.k` file; its containing directory becomes
/// the package path.
pub fn parse_file(sources: &mut SourceMap, path: &Path) -> Result<ast::Package, Vec<Error>> {
    if path.extension().and_then(|e| e.to_str()) != Some("k") {
        return Err(vec![Error(ErrorKind::Io(
            "expect a k source file".to_string(),
            path.display().to_string(),
        ))]);
    }
    let file = load_file(sources, path)?;
    let dir = path.parent().unwrap_or(Path::new("")).to_path_buf();
    Ok(ast::Package {
        path: dir,
        files: vec![file],
    })
}

/// Lexes and parses every `.k` file in a directory, in sorted order, into
/// one package.
pub fn parse_package(sources: &mut SourceMap, dir: &Path) -> Result<ast::Package, Vec<Error>> {
    log::debug!("loading package {}", dir.display());
    let entries = fs::read_dir(dir)
        .map_err(|e| vec![io_error(&e, dir)])?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| vec![io_error(&e, dir)])?;
    let mut paths: Vec<PathBuf> = entries
        .iter()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == "k"))
        .collect();
    paths.sort();

    let mut files = Vec::new();
    let mut errors = Vec::new();
    for path in paths {
        match load_file(sources, &path) {
            Ok(file) => files.push(file),
            Err(file_errors) => errors.extend(file_errors),
        }
    }
    if errors.is_empty() {
        Ok(ast::Package {
            path: dir.to_path_buf(),
            files,
        })
    } else {
        Err(errors)
    }
}

fn load_file(sources: &mut SourceMap, path: &Path) -> Result<ast::File, Vec<Error>> {
    let contents = fs::read_to_string(path).map_err(|e| vec![io_error(&e, path)])?;
    let name = path.to_string_lossy().to_string();
    let offset = sources.push(name.as_str().into(), contents.as_str().into());
    let (file, errors) = kc_parse::file(&name, &contents, offset);
    if errors.is_empty() {
        Ok(file)
    } else {
        Err(errors
            .into_iter()
            .map(|e| Error(ErrorKind::Parse(e)))
            .collect())
    }
}

fn io_error(error: &io::Error, path: &Path) -> Error {
    Error(ErrorKind::Io(error.to_string(), path.display().to_string()))
}
