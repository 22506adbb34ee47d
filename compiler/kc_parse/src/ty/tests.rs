// Copyright (c) The kc contributors.
// Licensed under the MIT License.

use super::ty;
use crate::tests::check;
use expect_test::expect;

#[test]
fn name() {
    check(ty, "i32", &expect![[r#"Type [0-3]: Name (Ident [0-3] "i32")"#]]);
}

#[test]
fn qualified_name() {
    check(
        ty,
        "io::File",
        &expect![[r#"Type [0-8]: Name (Ident [0-2] "io") (Ident [4-8] "File")"#]],
    );
}

#[test]
fn pointer() {
    check(
        ty,
        "*i8",
        &expect![[r#"Type [0-3]: Ptr (Type [1-3]: Name (Ident [1-3] "i8"))"#]],
    );
}

#[test]
fn func_with_ret() {
    check(
        ty,
        "func(i32, bool) i32",
        &expect![[
            r#"Type [0-19]: Func (Type [5-8]: Name (Ident [5-8] "i32"), Type [10-14]: Name (Ident [10-14] "bool")) (Type [16-19]: Name (Ident [16-19] "i32"))"#
        ]],
    );
}

#[test]
fn func_without_ret() {
    check(
        ty,
        "func()",
        &expect!["Type [0-6]: Func ()"],
    );
}

#[test]
fn array() {
    check(
        ty,
        "[4]u8",
        &expect![[r#"Type [0-5]: Array [4] (Type [3-5]: Name (Ident [3-5] "u8"))"#]],
    );
}

#[test]
fn tuple() {
    check(
        ty,
        "(i32, f64)",
        &expect![[
            r#"Type [0-10]: Tuple (Type [1-4]: Name (Ident [1-4] "i32"), Type [6-9]: Name (Ident [6-9] "f64"))"#
        ]],
    );
}

#[test]
fn struct_single_line() {
    check(
        ty,
        "struct { x: i32; y: i32 }",
        &expect![[
            r#"Type [0-25]: Struct ((Ident [9-10] "x"): Type [12-15]: Name (Ident [12-15] "i32"), (Ident [17-18] "y"): Type [20-23]: Name (Ident [20-23] "i32"))"#
        ]],
    );
}

#[test]
fn struct_multi_line() {
    check(
        ty,
        "struct {\n    next: *i32\n}",
        &expect![[
            r#"Type [0-25]: Struct ((Ident [13-17] "next"): Type [19-23]: Ptr (Type [20-23]: Name (Ident [20-23] "i32")))"#
        ]],
    );
}

#[test]
fn array_size_must_be_integer() {
    check(
        ty,
        "[x]i8",
        &expect![[r#"
            Error(
                Rule(
                    "integer literal",
                    Ident,
                    Span {
                        lo: 1,
                        hi: 2,
                    },
                ),
            )
        "#]],
    );
}
