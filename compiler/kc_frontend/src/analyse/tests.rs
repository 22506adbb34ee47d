// Copyright (c) The kc contributors.
// Licensed under the MIT License.

use super::analyse_main;
use crate::compile::{render_errors, SourceMap};
use expect_test::{expect, Expect};
use indoc::indoc;
use kc_ast::ast;
use std::path::PathBuf;

/// Analyses one in-memory file as the entry package and snapshots either
/// the typed program or the rendered diagnostics.
fn check(source: &str, expect: &Expect) {
    let mut sources = SourceMap::new();
    let offset = sources.push("main.k".into(), source.into());
    let (file, errors) = kc_parse::file("main.k", source, offset);
    assert!(errors.is_empty(), "parse errors: {errors:?}");
    let package = ast::Package {
        path: PathBuf::from("/kroot/main"),
        files: vec![file],
    };
    let actual = match analyse_main(&mut sources, PathBuf::from("/kroot"), &package) {
        Ok(program) => program.to_string(),
        Err(errors) => render_errors(&sources, &errors),
    };
    expect.assert_eq(&actual);
}

#[test]
fn typedef_cycle_is_rejected_on_both_names() {
    check(
        indoc! {"
            type A B
            type B A"},
        &expect![[r#"
            main.k:1:6: circular reference
            main.k:2:6: circular reference"#]],
    );
}

#[test]
fn pointer_cycle_is_accepted() {
    check(
        indoc! {"
            type Node struct { next: *Node; v: i32 }
            func head() *Node { return null }"},
        &expect![[r#"
            Program:
                Func #0 head [func()*Node]:
                    body:
                        Return:
                            Null [*Node]"#]],
    );
}

#[test]
fn struct_cycle_without_pointer_is_rejected() {
    check(
        "type S struct { f: S }",
        &expect!["main.k:1:6: circular reference"],
    );
}

#[test]
fn pointer_typedef_cycle_is_accepted() {
    check(
        indoc! {"
            type List *List
            func f() { let l: List = null }"},
        &expect![[r#"
            Program:
                Func #0 f [func()none]:
                    body:
                        Let %0 [List]:
                            Null [List]
                        Return"#]],
    );
}

#[test]
fn address_of_temporary_is_rejected() {
    check(
        indoc! {"
            func f() {
                let x: i32 = 1
                &x
                &(x + 1)
            }"},
        &expect!["main.k:4:6: not expect a temporary value"],
    );
}

#[test]
fn zero_values_fill_type_only_lets() {
    check(
        indoc! {"
            func f() {
                let a: i64
                let b: f32
                let c: bool
                let d: *i8
                let e: [2]i32
            }"},
        &expect![[r#"
            Program:
                Func #0 f [func()none]:
                    body:
                        Let %0 [i64]:
                            Int (0) [i64]
                        Let %1 [f32]:
                            Float (0) [f32]
                        Let %2 [bool]:
                            Bool (false) [bool]
                        Let %3 [*i8]:
                            Null [*i8]
                        Let %4 [[2]i32]:
                            Zero [[2]i32]
                        Return"#]],
    );
}

#[test]
fn int_literal_adopts_expected_type() {
    check(
        indoc! {"
            func f() {
                let a = 1
                let b: u8 = 1
                let c: f64 = 1
            }"},
        &expect![[r#"
            Program:
                Func #0 f [func()none]:
                    body:
                        Let %0 [isize]:
                            Int (1) [isize]
                        Let %1 [u8]:
                            Int (1) [u8]
                        Let %2 [f64]:
                            Float (1) [f64]
                        Return"#]],
    );
}

#[test]
fn null_requires_a_pointer_expectation() {
    check(
        "func f() { let x = null }",
        &expect!["main.k:1:20: expect a pointer type"],
    );
}

#[test]
fn char_literal_is_i32() {
    check(
        "func f() { let c = 'a' }",
        &expect![[r#"
            Program:
                Func #0 f [func()none]:
                    body:
                        Let %0 [i32]:
                            Int (97) [i32]
                        Return"#]],
    );
}

#[test]
fn string_literals_are_pointers() {
    check(
        indoc! {r#"
            func f() {
                let s = "hi"
                let c = c"hi"
            }"#},
        &expect![[r#"
            Program:
                Func #0 f [func()none]:
                    body:
                        Let %0 [*i32]:
                            Str ("hi") [*i32]
                        Let %1 [*i8]:
                            CStr ([104, 105, 0]) [*i8]
                        Return"#]],
    );
}

#[test]
fn missing_return_is_rejected() {
    check(
        "func f() i32 { let x = 1 }",
        &expect!["main.k:1:6: function missing return"],
    );
}

#[test]
fn if_else_ends_only_when_all_arms_end() {
    check(
        indoc! {"
            func f(c: bool) i32 {
                if c {
                    return 1
                } else {
                    return 2
                }
            }"},
        &expect![[r#"
            Program:
                Func #0 f [func(bool)i32]:
                    param %0 [bool]
                    body:
                        If:
                            cond: Param %0 [bool]
                            then: Block:
                                Return:
                                    Int (1) [i32]
                            else: Block:
                                Return:
                                    Int (2) [i32]"#]],
    );
}

#[test]
fn loop_does_not_end_the_enclosing_block() {
    check(
        indoc! {"
            func f() i32 {
                for true {
                    return 1
                }
            }"},
        &expect!["main.k:1:6: function missing return"],
    );
}

#[test]
fn break_outside_a_loop_is_rejected() {
    check(
        "func f() { break }",
        &expect!["main.k:1:12: must in a loop"],
    );
}

#[test]
fn defer_requires_a_direct_call() {
    check(
        indoc! {"
            func f() {
                defer 1 + 2
            }"},
        &expect!["main.k:2:11: expect a function call"],
    );
}

#[test]
fn duplicate_globals_are_rejected() {
    check(
        indoc! {"
            func f() {}
            let f: i32 = 1"},
        &expect!["main.k:2:5: duplicate identifier"],
    );
}

#[test]
fn typedef_and_value_namespaces_are_separate() {
    check(
        indoc! {"
            type T i32
            let T: i32 = 1
            func f() T { return 1 }"},
        &expect![[r#"
            Program:
                Var #0 T [i32] = Int (1) [i32]
                Func #1 f [func()T]:
                    body:
                        Return:
                            Int (1) [T]"#]],
    );
}

#[test]
fn compound_assign_requires_mutable_lhs() {
    check(
        "func f() { 1 += 2 }",
        &expect!["main.k:1:12: expect a mutable value"],
    );
}

#[test]
fn shift_of_float_is_rejected() {
    check(
        "func f() { let x = 1.5 << 2 }",
        &expect!["main.k:1:20: expect a integer"],
    );
}

#[test]
fn comparison_requires_matching_types() {
    check(
        indoc! {"
            func f() bool {
                let a: i32 = 1
                let b: u8 = 2
                return a == b
            }"},
        &expect!["main.k:4:17: expect type `i32`"],
    );
}

#[test]
fn cast_families_are_closed() {
    check(
        "func f() { let x = true as i32 }",
        &expect!["main.k:1:20: can not covert to type `i32`"],
    );
}

#[test]
fn usize_casts_to_pointer() {
    check(
        indoc! {"
            func f(n: usize) *i8 {
                return n as *i8
            }"},
        &expect![[r#"
            Program:
                Func #0 f [func(usize)*i8]:
                    param %0 [usize]
                    body:
                        Return:
                            Cast [*i8]:
                                Param %0 [usize]"#]],
    );
}

#[test]
fn tuple_index_must_be_a_literal_in_range() {
    check(
        indoc! {"
            func f() {
                let t = (1, true)
                let x = t[2]
            }"},
        &expect!["main.k:3:15: tuple index out of range"],
    );
}

#[test]
fn singleton_tuple_collapses_without_expectation() {
    check(
        indoc! {"
            func f() {
                let a = (1)
                let b: (i32) = (1)
            }"},
        &expect![[r#"
            Program:
                Func #0 f [func()none]:
                    body:
                        Let %0 [isize]:
                            Int (1) [isize]
                        Let %1 [(i32)]:
                            Tuple [(i32)]:
                                Int (1) [i32]
                        Return"#]],
    );
}

#[test]
fn empty_aggregates_need_expectations() {
    check(
        "func f() { let x = [] }",
        &expect!["main.k:1:20: expect a array type"],
    );
}

#[test]
fn builtins_fold_at_analysis_time() {
    check(
        indoc! {"
            func f() {
                let a = [1, 2, 3]
                let n = len(a)
                let s = size(a)
                let t = typename(a)
            }"},
        &expect![[r#"
            Program:
                Func #0 f [func()none]:
                    body:
                        Let %0 [[3]isize]:
                            Array [[3]isize]:
                                Int (1) [isize]
                                Int (2) [isize]
                                Int (3) [isize]
                        Let %1 [usize]:
                            Int (3) [usize]
                        Let %2 [usize]:
                            Int (24) [usize]
                        Let %3 [*i32]:
                            Str ("[3]isize") [*i32]
                        Return"#]],
    );
}

#[test]
fn noreturn_call_ends_the_block() {
    check(
        indoc! {"
            @noreturn
            func die()
            func f() i32 {
                die()
            }"},
        &expect!["main.k:2:6: missing function body"],
    );
}

#[test]
fn noreturn_extern_call_ends_the_block() {
    check(
        indoc! {"
            @noreturn
            @extern(abort)
            func die()
            func f() i32 {
                die()
            }"},
        &expect![[r#"
            Program:
                Func #0 die @extern(abort) @noreturn [func()none]:
                Func #1 f [func()i32]:
                    body:
                        Expr: Call noreturn [none]:
                            Func #0 [func()none]"#]],
    );
}

#[test]
fn attribute_legality_is_enforced() {
    check(
        indoc! {"
            @noreturn
            let x: i32 = 1"},
        &expect!["main.k:1:1: attribute cannot be used for global variables"],
    );
}

#[test]
fn global_initializer_must_be_constant() {
    check(
        indoc! {"
            func g() i32 { return 1 }
            let x: i32 = g()"},
        &expect!["main.k:2:14: expect a constant value"],
    );
}

#[test]
fn extern_global_needs_no_value() {
    check(
        indoc! {"
            @extern(errno)
            let errno: i32"},
        &expect![[r#"
            Program:
                Var #0 errno @extern(errno) [i32]"#]],
    );
}

#[test]
fn method_binds_through_the_dotted_key() {
    check(
        indoc! {"
            type Counter struct { n: i32 }
            func (Counter) get() i32 {
                return self.n
            }
            func f(c: Counter) i32 {
                return c.get()
            }"},
        &expect![[r#"
            Program:
                Func #0 Counter.get [func(*Counter)i32]:
                    param %0 [*Counter]
                    body:
                        Return:
                            Field (n) [i32]:
                                Deref [Counter]:
                                    Param %0 [*Counter]
                Func #1 f [func(Counter)i32]:
                    param %0 [Counter]
                    body:
                        Return:
                            MethodCall #0 [i32]:
                                Param %0 [Counter]"#]],
    );
}

#[test]
fn unknown_identifier_is_reported() {
    check(
        "func f() { g() }",
        &expect!["main.k:1:12: unknown identifier"],
    );
}

#[test]
fn locals_shadow_globals_but_not_parameters() {
    check(
        indoc! {"
            func f(x: i32) {
                let x: i32 = 1
            }"},
        &expect!["main.k:2:9: duplicate identifier"],
    );
}
