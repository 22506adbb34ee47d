// Copyright (c) The kc contributors.
// Licensed under the MIT License.

use clap::{Parser, ValueEnum};
use kc_frontend::compile::SourceMap;
use std::{path::PathBuf, process::ExitCode};

#[derive(Clone, Copy, Eq, PartialEq, ValueEnum)]
enum Emit {
    /// The untyped syntax tree.
    Ast,
    /// The typed, name-resolved program.
    Hir,
    /// The optimized SSA listing.
    Ssa,
}

#[derive(Parser)]
#[command(about = "K compiler")]
struct Cli {
    /// A `.k` file, or a directory whose `.k` files form one package.
    path: PathBuf,
    /// The representation to print on success.
    #[arg(long, value_enum, default_value = "ssa")]
    emit: Emit,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let root = kc::root_path();
    log::debug!("compiling {} against root {}", cli.path.display(), root.display());

    let mut sources = SourceMap::new();
    let result = run(&mut sources, &cli);
    match result {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(errors) => {
            eprintln!("{}", kc::render_errors(&sources, &errors));
            ExitCode::FAILURE
        }
    }
}

fn run(
    sources: &mut SourceMap,
    cli: &Cli,
) -> Result<String, Vec<kc_frontend::compile::Error>> {
    let package = if cli.path.is_dir() {
        kc::parse_package(sources, &cli.path)?
    } else {
        kc::parse_file(sources, &cli.path)?
    };
    if cli.emit == Emit::Ast {
        return Ok(format!("{package}\n"));
    }

    let program = kc::analyse_main(sources, kc::root_path(), &package)?;
    if cli.emit == Emit::Hir {
        return Ok(format!("{program}\n"));
    }

    let module = kc::optimize(kc::generate_ssa(&program));
    Ok(module.to_string())
}
