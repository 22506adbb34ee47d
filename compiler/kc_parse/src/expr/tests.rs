// Copyright (c) The kc contributors.
// Licensed under the MIT License.

use super::{expr, expr_eof};
use crate::tests::check;
use expect_test::expect;

#[test]
fn lit_int() {
    check(expr, "123", &expect!["Expr [0-3]: Int (123)"]);
}

#[test]
fn lit_int_too_big() {
    check(
        expr,
        "9223372036854775808",
        &expect![[r#"
            Error(
                Lit(
                    "integer",
                    Span {
                        lo: 0,
                        hi: 19,
                    },
                ),
            )
        "#]],
    );
}

#[test]
fn lit_float() {
    check(expr, "1.5", &expect!["Expr [0-3]: Float (1.5)"]);
}

#[test]
fn lit_bool() {
    check(expr, "true", &expect!["Expr [0-4]: Bool (true)"]);
}

#[test]
fn lit_char() {
    check(expr, "'a'", &expect!["Expr [0-3]: Char ('a')"]);
}

#[test]
fn lit_char_escape() {
    check(expr, r"'\n'", &expect![[r"Expr [0-4]: Char ('\n')"]]);
}

#[test]
fn lit_char_too_long() {
    check(
        expr,
        "'ab'",
        &expect![[r#"
            Error(
                Lit(
                    "character",
                    Span {
                        lo: 0,
                        hi: 4,
                    },
                ),
            )
        "#]],
    );
}

#[test]
fn lit_string_escapes() {
    check(
        expr,
        r#""a\tb""#,
        &expect![[r#"Expr [0-6]: Str ("a\tb")"#]],
    );
}

#[test]
fn lit_string_unknown_escape() {
    check(
        expr,
        r#""\q""#,
        &expect![[r#"
            Error(
                Escape(
                    'q',
                    Span {
                        lo: 0,
                        hi: 4,
                    },
                ),
            )
        "#]],
    );
}

#[test]
fn lit_c_string_gets_nul() {
    check(
        expr,
        r#"c"hi""#,
        &expect!["Expr [0-5]: CStr ([104, 105, 0])"],
    );
}

#[test]
fn lit_null() {
    check(expr, "null", &expect!["Expr [0-4]: Null"]);
}

#[test]
fn name_qualified() {
    check(
        expr,
        "io::put",
        &expect![[r#"Expr [0-7]: Name (Ident [0-2] "io") (Ident [4-7] "put")"#]],
    );
}

#[test]
fn add_is_left_assoc() {
    check(
        expr,
        "1 + 2 + 3",
        &expect![[r#"
            Expr [0-9]: BinOp (Add):
                Expr [0-5]: BinOp (Add):
                    Expr [0-1]: Int (1)
                    Expr [4-5]: Int (2)
                Expr [8-9]: Int (3)"#]],
    );
}

#[test]
fn mul_binds_tighter_than_add() {
    check(
        expr,
        "1 + 2 * 3",
        &expect![[r#"
            Expr [0-9]: BinOp (Add):
                Expr [0-1]: Int (1)
                Expr [4-9]: BinOp (Mul):
                    Expr [4-5]: Int (2)
                    Expr [8-9]: Int (3)"#]],
    );
}

#[test]
fn compare_is_left_assoc_single_level() {
    check(
        expr,
        "a == b < c",
        &expect![[r#"
            Expr [0-10]: BinOp (Lt):
                Expr [0-6]: BinOp (Eq):
                    Expr [0-1]: Name (Ident [0-1] "a")
                    Expr [5-6]: Name (Ident [5-6] "b")
                Expr [9-10]: Name (Ident [9-10] "c")"#]],
    );
}

#[test]
fn assign_is_right_assoc() {
    check(
        expr,
        "a = b = c",
        &expect![[r#"
            Expr [0-9]: Assign:
                Expr [0-1]: Name (Ident [0-1] "a")
                Expr [4-9]: Assign:
                    Expr [4-5]: Name (Ident [4-5] "b")
                    Expr [8-9]: Name (Ident [8-9] "c")"#]],
    );
}

#[test]
fn compound_assign() {
    check(
        expr,
        "a += 1",
        &expect![[r#"
            Expr [0-6]: AssignOp (Add):
                Expr [0-1]: Name (Ident [0-1] "a")
                Expr [5-6]: Int (1)"#]],
    );
}

#[test]
fn newline_continues_after_binary_op() {
    check(
        expr_eof,
        "1 +\n2",
        &expect![[r#"
            Expr [0-5]: BinOp (Add):
                Expr [0-1]: Int (1)
                Expr [4-5]: Int (2)"#]],
    );
}

#[test]
fn prefix_ops() {
    check(
        expr,
        "-*p",
        &expect![[r#"
            Expr [0-3]: UnOp (Neg):
                Expr [1-3]: UnOp (Deref):
                    Expr [2-3]: Name (Ident [2-3] "p")"#]],
    );
}

#[test]
fn addr_of_binds_tighter_than_binary() {
    check(
        expr,
        "&a + 1",
        &expect![[r#"
            Expr [0-6]: BinOp (Add):
                Expr [0-2]: UnOp (AddrOf):
                    Expr [1-2]: Name (Ident [1-2] "a")
                Expr [5-6]: Int (1)"#]],
    );
}

#[test]
fn call_and_index_postfix() {
    check(
        expr,
        "f(1)[0]",
        &expect![[r#"
            Expr [0-7]: Index:
                Expr [0-4]: Call:
                    Expr [0-1]: Name (Ident [0-1] "f")
                    Expr [2-3]: Int (1)
                Expr [5-6]: Int (0)"#]],
    );
}

#[test]
fn field_access() {
    check(
        expr,
        "a.b.c",
        &expect![[r#"
            Expr [0-5]: Field (Ident [4-5] "c"):
                Expr [0-3]: Field (Ident [2-3] "b"):
                    Expr [0-1]: Name (Ident [0-1] "a")"#]],
    );
}

#[test]
fn cast_binds_tighter_than_binary() {
    check(
        expr,
        "x as i32 + 1",
        &expect![[r#"
            Expr [0-12]: BinOp (Add):
                Expr [0-8]: Cast (Type [5-8]: Name (Ident [5-8] "i32")):
                    Expr [0-1]: Name (Ident [0-1] "x")
                Expr [11-12]: Int (1)"#]],
    );
}

#[test]
fn ternary_right_assoc() {
    check(
        expr,
        "a ? b : c ? d : e",
        &expect![[r#"
            Expr [0-17]: Ternary:
                Expr [0-1]: Name (Ident [0-1] "a")
                Expr [4-5]: Name (Ident [4-5] "b")
                Expr [8-17]: Ternary:
                    Expr [8-9]: Name (Ident [8-9] "c")
                    Expr [12-13]: Name (Ident [12-13] "d")
                    Expr [16-17]: Name (Ident [16-17] "e")"#]],
    );
}

#[test]
fn ternary_true_branch_is_full_expr() {
    check(
        expr,
        "a ? b + 1 : c",
        &expect![[r#"
            Expr [0-13]: Ternary:
                Expr [0-1]: Name (Ident [0-1] "a")
                Expr [4-9]: BinOp (Add):
                    Expr [4-5]: Name (Ident [4-5] "b")
                    Expr [8-9]: Int (1)
                Expr [12-13]: Name (Ident [12-13] "c")"#]],
    );
}

#[test]
fn paren_singleton_is_a_tuple_node() {
    check(
        expr,
        "(1)",
        &expect![[r#"
            Expr [0-3]: Tuple:
                Expr [1-2]: Int (1)"#]],
    );
}

#[test]
fn empty_tuple() {
    check(expr, "()", &expect!["Expr [0-2]: Tuple: <empty>"]);
}

#[test]
fn array_literal() {
    check(
        expr,
        "[1, 2]",
        &expect![[r#"
            Expr [0-6]: Array:
                Expr [1-2]: Int (1)
                Expr [4-5]: Int (2)"#]],
    );
}

#[test]
fn struct_literal() {
    check(
        expr,
        "{1, 2}",
        &expect![[r#"
            Expr [0-6]: Struct:
                Expr [1-2]: Int (1)
                Expr [4-5]: Int (2)"#]],
    );
}

#[test]
fn logic_binds_looser_than_compare() {
    check(
        expr,
        "a == b && c",
        &expect![[r#"
            Expr [0-11]: BinOp (AndAnd):
                Expr [0-6]: BinOp (Eq):
                    Expr [0-1]: Name (Ident [0-1] "a")
                    Expr [5-6]: Name (Ident [5-6] "b")
                Expr [10-11]: Name (Ident [10-11] "c")"#]],
    );
}

#[test]
fn bitwise_binds_looser_than_compare() {
    check(
        expr,
        "a & b == c",
        &expect![[r#"
            Expr [0-10]: BinOp (And):
                Expr [0-1]: Name (Ident [0-1] "a")
                Expr [4-10]: BinOp (Eq):
                    Expr [4-5]: Name (Ident [4-5] "b")
                    Expr [9-10]: Name (Ident [9-10] "c")"#]],
    );
}
