// Copyright (c) The kc contributors.
// Licensed under the MIT License.

use super::global;
use crate::tests::check;
use expect_test::expect;
use indoc::indoc;

#[test]
fn import_simple() {
    check(
        global,
        "import io",
        &expect![[r#"
            Global [0-9]:
                Import (io)"#]],
    );
}

#[test]
fn import_nested_with_alias() {
    check(
        global,
        "import std.io as stdio",
        &expect![[r#"
            Global [0-22]:
                Import (std.io) as (Ident [17-22] "stdio")"#]],
    );
}

#[test]
fn typedef() {
    check(
        global,
        "pub type Node *Node",
        &expect![[r#"
            Global [0-19]:
                TyDef pub (Ident [9-13] "Node"): Type [14-19]: Ptr (Type [15-19]: Name (Ident [15-19] "Node"))"#]],
    );
}

#[test]
fn extern_func_without_body() {
    check(
        global,
        indoc! {r#"
            @link(lib = "c")
            func puts(s: *i8) i32"#},
        &expect![[r#"
            Global [0-38]:
                Attr [0-16]: LinkLib ("c")
                Func (Ident [22-26] "puts"):
                    Param [27-33] (Ident [27-28] "s"): Type [30-33]: Ptr (Type [31-33]: Name (Ident [31-33] "i8"))
                    ret: Type [35-38]: Name (Ident [35-38] "i32")"#]],
    );
}

#[test]
fn func_with_unnamed_param() {
    check(
        global,
        "@extern(exit) func exit(i32)",
        &expect![[r#"
            Global [0-28]:
                Attr [0-13]: Extern (Ident [8-12] "exit")
                Func (Ident [19-23] "exit"):
                    Param [24-27]: Type [24-27]: Name (Ident [24-27] "i32")"#]],
    );
}

#[test]
fn method() {
    check(
        global,
        "func (List) len() usize { return 0 }",
        &expect![[r#"
            Global [0-36]:
                Method (Ident [6-10] "List") (Ident [12-15] "len"):
                    ret: Type [18-23]: Name (Ident [18-23] "usize")
                    Block [24-36]:
                        Stmt [26-34]: Return: Expr [33-34]: Int (0)"#]],
    );
}

#[test]
fn global_let_with_value() {
    check(
        global,
        "pub let limit: i32 = 10",
        &expect![[r#"
            Global [0-23]:
                Let pub (Ident [8-13] "limit"):
                    type: Type [15-18]: Name (Ident [15-18] "i32")
                    value: Expr [21-23]: Int (10)"#]],
    );
}

#[test]
fn noreturn_and_inline_attrs() {
    check(
        global,
        "@noreturn\n@inline(false)\nfunc die() { return }",
        &expect![[r#"
            Global [0-46]:
                Attr [0-9]: NoReturn
                Attr [10-24]: Inline (false)
                Func (Ident [30-33] "die"):
                    Block [36-46]:
                        Stmt [38-44]: Return"#]],
    );
}

#[test]
fn unknown_attribute() {
    check(
        global,
        "@wat func f() {}",
        &expect![[r#"
            Error(
                UnknownAttr(
                    Span {
                        lo: 0,
                        hi: 4,
                    },
                ),
            )
        "#]],
    );
}
