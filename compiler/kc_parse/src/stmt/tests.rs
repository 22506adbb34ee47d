// Copyright (c) The kc contributors.
// Licensed under the MIT License.

use super::{block, stmt};
use crate::tests::check;
use expect_test::expect;
use indoc::indoc;

#[test]
fn empty_block() {
    check(block, "{}", &expect!["Block [0-2]: <empty>"]);
}

#[test]
fn semi_and_newline_separate_stmts() {
    check(
        block,
        "{ 1; 2\n3 }",
        &expect![[r#"
            Block [0-10]:
                Stmt [2-3]: Expr: Expr [2-3]: Int (1)
                Stmt [5-6]: Expr: Expr [5-6]: Int (2)
                Stmt [7-8]: Expr: Expr [7-8]: Int (3)"#]],
    );
}

#[test]
fn trailing_separator_tolerated() {
    check(
        block,
        "{ 1; }",
        &expect![[r#"
            Block [0-6]:
                Stmt [2-3]: Expr: Expr [2-3]: Int (1)"#]],
    );
}

#[test]
fn missing_separator_is_an_error() {
    check(
        block,
        "{ 1 2 }",
        &expect![[r#"
            Error(
                Token(
                    Semi,
                    Int,
                    Span {
                        lo: 4,
                        hi: 5,
                    },
                ),
            )
        "#]],
    );
}

#[test]
fn return_without_value() {
    check(
        block,
        "{ return }",
        &expect![[r#"
            Block [0-10]:
                Stmt [2-8]: Return"#]],
    );
}

#[test]
fn return_with_value() {
    check(
        block,
        "{ return 1 }",
        &expect![[r#"
            Block [0-12]:
                Stmt [2-10]: Return: Expr [9-10]: Int (1)"#]],
    );
}

#[test]
fn let_with_type_and_value() {
    check(
        stmt,
        "let x: i32 = 1",
        &expect![[r#"
            Stmt [0-14]: Let (Ident [4-5] "x"):
                type: Type [7-10]: Name (Ident [7-10] "i32")
                value: Expr [13-14]: Int (1)"#]],
    );
}

#[test]
fn let_type_only() {
    check(
        stmt,
        "let x: i32",
        &expect![[r#"
            Stmt [0-10]: Let (Ident [4-5] "x"):
                type: Type [7-10]: Name (Ident [7-10] "i32")"#]],
    );
}

#[test]
fn if_else_chain() {
    check(
        stmt,
        indoc! {"
            if a {
                1
            } else if b {
                2
            } else {
                3
            }"},
        &expect![[r#"
            Stmt [0-49]: If:
                cond: Expr [3-4]: Name (Ident [3-4] "a")
                Block [5-14]:
                    Stmt [11-12]: Expr: Expr [11-12]: Int (1)
                else: If:
                    cond: Expr [23-24]: Name (Ident [23-24] "b")
                    Block [25-34]:
                        Stmt [31-32]: Expr: Expr [31-32]: Int (2)
                    else: Block [40-49]:
                        Stmt [46-47]: Expr: Expr [46-47]: Int (3)"#]],
    );
}

#[test]
fn for_loop_with_break_and_continue() {
    check(
        stmt,
        "for a { break; continue }",
        &expect![[r#"
            Stmt [0-25]: For:
                cond: Expr [4-5]: Name (Ident [4-5] "a")
                Block [6-25]:
                    Stmt [8-13]: Break
                    Stmt [15-23]: Continue"#]],
    );
}

#[test]
fn defer_stmt() {
    check(
        stmt,
        "defer f()",
        &expect![[r#"
            Stmt [0-9]: Defer: Expr [6-9]: Call:
                Expr [6-7]: Name (Ident [6-7] "f")"#]],
    );
}

#[test]
fn nested_block_stmt() {
    check(
        stmt,
        "{ 1 }",
        &expect![[r#"
            Stmt [0-5]: Block [0-5]:
                Stmt [2-3]: Expr: Expr [2-3]: Int (1)"#]],
    );
}
