// Copyright (c) The kc contributors.
// Licensed under the MIT License.

use crate::generate_ssa;
use expect_test::{expect, Expect};
use indoc::indoc;
use kc_ast::ast;
use kc_frontend::{analyse::analyse_main, compile::SourceMap};
use std::path::PathBuf;

fn check(source: &str, expect: &Expect) {
    let mut sources = SourceMap::new();
    let offset = sources.push("main.k".into(), source.into());
    let (file, errors) = kc_parse::file("main.k", source, offset);
    assert!(errors.is_empty(), "parse errors: {errors:?}");
    let package = ast::Package {
        path: PathBuf::from("/kroot/main"),
        files: vec![file],
    };
    let program = analyse_main(&mut sources, PathBuf::from("/kroot"), &package)
        .expect("analysis should succeed");
    let module = generate_ssa(&program);
    expect.assert_eq(&module.to_string());
}

#[test]
fn extern_call_with_c_string() {
    check(
        indoc! {r#"
            @extern(puts)
            @link(lib = "c")
            func puts(s: *i8) i32
            func main() {
                puts(c"hi")
            }"#},
        &expect![[r#"
            [3]i8 @g0 = [104, 105, 0]

            func i32 @puts(*i8 p0)

            func none @f1():
            b0:
              %1 = array_index *[3]i8 @g0, u64 0
              %2 = call *func(*i8)i32 @puts, *i8 %1
              ret
        "#]],
    );
}

#[test]
fn deferred_calls_run_in_lifo_order_before_return() {
    check(
        indoc! {"
            @noreturn
            @extern(die)
            func die()
            func f() {
                defer die()
                defer die()
                return
            }"},
        &expect![[r#"
            func none @die() #noreturn

            func none @f1():
            b0:
              call *func()none @die
              unreachable
              call *func()none @die
              unreachable
              ret
        "#]],
    );
}

#[test]
fn short_circuit_and_merges_through_a_phi() {
    check(
        "func g(a: bool, b: bool) bool { return a && b }",
        &expect![[r#"
            func i8 @f0(i8 p0, i8 p1):
            b0:
              %1 = alloc i8
              store i8 p0, *i8 %1
              %2 = alloc i8
              store i8 p1, *i8 %2
              %3 = load *i8 %1
              cond_goto i8 %3, b1, b2
            b1: ; preds = b0
              %4 = load *i8 %2
              goto b2
            b2: ; preds = b0, b1
              %5 = phi [b0: i8 0], [b1: i8 %4]
              ret i8 %5
        "#]],
    );
}

#[test]
fn ended_arms_emit_no_merge_goto() {
    check(
        indoc! {"
            func f(c: bool) i32 {
                if c {
                    return 1
                }
                return 2
            }"},
        &expect![[r#"
            func i32 @f0(i8 p0):
            b0:
              %1 = alloc i8
              store i8 p0, *i8 %1
              %2 = load *i8 %1
              cond_goto i8 %2, b1, b2
            b1: ; preds = b0
              ret i32 1
            b2: ; preds = b0
              ret i32 2
        "#]],
    );
}

#[test]
fn loop_threads_break_to_the_end_block() {
    check(
        indoc! {"
            func f() i32 {
                let i: i32 = 0
                for true {
                    i += 1
                    break
                }
                return i
            }"},
        &expect![[r#"
            func i32 @f0():
            b0:
              %1 = alloc i32
              store i32 0, *i32 %1
              goto b1
            b1: ; preds = b0
              cond_goto i8 1, b2, b3
            b2: ; preds = b1
              %2 = load *i32 %1
              %3 = add i32 %2, i32 1
              store i32 %3, *i32 %1
              goto b3
            b3: ; preds = b1, b2
              %4 = load *i32 %1
              ret i32 %4
        "#]],
    );
}

#[test]
fn globals_lower_with_constant_initializers() {
    check(
        indoc! {"
            let limit: i32 = 3
            func f() i32 { return limit }"},
        &expect![[r#"
            i32 @g0 = 3

            func i32 @f0():
            b0:
              %1 = load *i32 @g0
              ret i32 %1
        "#]],
    );
}

#[test]
fn ternary_joins_arms_with_a_phi() {
    check(
        "func f(c: bool) i32 { return c ? 1 : 2 }",
        &expect![[r#"
            func i32 @f0(i8 p0):
            b0:
              %1 = alloc i8
              store i8 p0, *i8 %1
              %2 = load *i8 %1
              cond_goto i8 %2, b1, b2
            b1: ; preds = b0
              goto b3
            b2: ; preds = b0
              goto b3
            b3: ; preds = b1, b2
              %3 = phi [b1: i32 1], [b2: i32 2]
              ret i32 %3
        "#]],
    );
}

#[test]
fn tuple_literals_materialize_through_a_slot() {
    check(
        indoc! {"
            func f() isize {
                let t = (1, 2)
                return t[0]
            }"},
        &expect![[r#"
            func i64 @f0():
            b0:
              %1 = alloc {i64, i64}
              %2 = alloc {i64, i64}
              %3 = struct_index *{i64, i64} %2, 0
              store i64 1, *i64 %3
              %4 = struct_index *{i64, i64} %2, 1
              store i64 2, *i64 %4
              %5 = load *{i64, i64} %2
              store {i64, i64} %5, *{i64, i64} %1
              %6 = struct_index *{i64, i64} %1, 0
              %7 = load *i64 %6
              ret i64 %7
        "#]],
    );
}

#[test]
fn pointer_cycles_lower_with_an_opaque_pointee() {
    check(
        indoc! {"
            type Node struct { next: *Node; v: i32 }
            func head() *Node { return null }"},
        &expect![[r#"
            func *{*opaque, i32} @f0():
            b0:
              ret *{*opaque, i32} empty
        "#]],
    );
}
