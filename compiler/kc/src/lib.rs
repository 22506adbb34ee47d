// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! The compiler pipeline, composed end to end: parse, analyse, lower,
//! optimize. The driver binary and the tests both go through this crate;
//! each stage is also re-exported for callers that want to stop early.

#[cfg(test)]
mod tests;

use kc_frontend::compile::{Error, SourceMap};
use std::{
    env,
    path::{Path, PathBuf},
};

pub use kc_frontend::analyse::analyse_main;
pub use kc_frontend::compile::{parse_file, parse_package, render_errors};
pub use kc_lowerer::generate_ssa;
pub use kc_passes::optimize;

/// The environment variable naming the directory import paths resolve
/// against; the process working directory is the fallback.
pub const ROOT_ENV: &str = "KROOT";

/// The directory import paths resolve against.
#[must_use]
pub fn root_path() -> PathBuf {
    match env::var_os(ROOT_ENV) {
        Some(root) if !root.is_empty() => PathBuf::from(root),
        _ => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Compiles a file or package target all the way to an optimized SSA
/// module. The source map is returned in both outcomes so that diagnostics
/// can be rendered against it.
pub fn compile(target: &Path, root: PathBuf) -> (SourceMap, Result<kc_ssa::ssa::Module, Vec<Error>>) {
    let mut sources = SourceMap::new();
    let result = compile_with(&mut sources, target, root);
    (sources, result)
}

fn compile_with(
    sources: &mut SourceMap,
    target: &Path,
    root: PathBuf,
) -> Result<kc_ssa::ssa::Module, Vec<Error>> {
    let package = if target.is_dir() {
        parse_package(sources, target)?
    } else {
        parse_file(sources, target)?
    };
    let program = analyse_main(sources, root, &package)?;
    Ok(optimize(generate_ssa(&program)))
}
