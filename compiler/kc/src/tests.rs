// Copyright (c) The kc contributors.
// Licensed under the MIT License.

use crate::compile;
use expect_test::expect;
use kc_ssa::validate::validate;
use std::{env, fs, path::PathBuf};

/// Creates a fresh scratch root for one test's packages.
fn scratch_root(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("kc-test-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("scratch root should be creatable");
    dir
}

fn write_package(root: &PathBuf, package: &str, source: &str) -> PathBuf {
    let dir = root.join(package);
    fs::create_dir_all(&dir).expect("package dir should be creatable");
    fs::write(dir.join(format!("{package}.k")), source).expect("source should be writable");
    dir
}

#[test]
fn compiles_a_two_package_program() {
    let root = scratch_root("two-package");
    write_package(
        &root,
        "util",
        "pub func answer() i32 { return 42 }\n",
    );
    let main = write_package(
        &root,
        "main",
        "import util\nfunc main() i32 { return util::answer() }\n",
    );

    let (_, result) = compile(&main, root);
    let module = result.expect("compilation should succeed");
    validate(&module).expect("optimized module should be well-formed");
    expect![[r#"
        func i32 @f0():
        b0:
          ret i32 42

        func i32 @f1():
        b0:
          %1 = call *func()i32 @f0
          ret i32 %1
    "#]]
    .assert_eq(&module.to_string());
}

#[test]
fn renders_diagnostics_with_file_positions() {
    let root = scratch_root("diagnostics");
    let main = write_package(&root, "main", "func f() i32 {\n    return x\n}\n");

    let (sources, result) = compile(&main, root);
    let errors = result.expect_err("compilation should fail");
    let rendered = crate::render_errors(&sources, &errors);
    assert!(
        rendered.ends_with("main.k:2:12: unknown identifier"),
        "unexpected rendering: {rendered}"
    );
}

#[test]
fn rejects_non_k_files() {
    let root = scratch_root("extension");
    let path = root.join("main.txt");
    fs::write(&path, "func f() {}").expect("source should be writable");
    let (_, result) = compile(&path, root);
    let errors = result.expect_err("compilation should fail");
    assert!(errors[0].to_string().contains("expect a k source file"));
}

#[test]
fn detects_import_cycles() {
    let root = scratch_root("cycle");
    write_package(&root, "b", "import c\npub func fb() {}\n");
    write_package(&root, "c", "import b\npub func fc() {}\n");
    let main = write_package(&root, "main", "import b\nfunc main() {}\n");

    let (sources, result) = compile(&main, root);
    let errors = result.expect_err("compilation should fail");
    let rendered = crate::render_errors(&sources, &errors);
    assert!(
        rendered.contains("circular reference package"),
        "unexpected rendering: {rendered}"
    );
}

#[test]
fn unreachable_instructions_are_removed() {
    let root = scratch_root("unreachable");
    let main = write_package(
        &root,
        "main",
        "func f(c: bool) i32 {\n    if c {\n        return 1\n    } else {\n        return 2\n    }\n}\n",
    );

    let (_, result) = compile(&main, root.clone());
    let module = result.expect("compilation should succeed");
    validate(&module).expect("optimized module should be well-formed");
    // The merge block after a no-fallthrough if is dropped entirely.
    assert_eq!(module.functions[0].blocks.len(), 3);
}
