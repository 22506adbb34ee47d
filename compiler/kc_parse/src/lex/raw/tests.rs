// Copyright (c) The kc contributors.
// Licensed under the MIT License.

use super::Lexer;
use expect_test::{expect, Expect};

fn check(input: &str, expect: &Expect) {
    let actual: Vec<_> = Lexer::new(input).collect();
    expect.assert_debug_eq(&actual);
}

#[test]
fn singles() {
    check(
        "+;",
        &expect![[r#"
            [
                Token {
                    kind: Single(
                        Plus,
                    ),
                    offset: 0,
                },
                Token {
                    kind: Single(
                        Semi,
                    ),
                    offset: 1,
                },
            ]
        "#]],
    );
}

#[test]
fn newline_is_not_whitespace() {
    check(
        " \n ",
        &expect![[r#"
            [
                Token {
                    kind: Whitespace,
                    offset: 0,
                },
                Token {
                    kind: Newline,
                    offset: 1,
                },
                Token {
                    kind: Whitespace,
                    offset: 2,
                },
            ]
        "#]],
    );
}

#[test]
fn ident() {
    check(
        "foo_1",
        &expect![[r#"
            [
                Token {
                    kind: Ident,
                    offset: 0,
                },
            ]
        "#]],
    );
}

#[test]
fn int_and_float() {
    check(
        "12 3.5",
        &expect![[r#"
            [
                Token {
                    kind: Number(
                        Int,
                    ),
                    offset: 0,
                },
                Token {
                    kind: Whitespace,
                    offset: 2,
                },
                Token {
                    kind: Number(
                        Float,
                    ),
                    offset: 3,
                },
            ]
        "#]],
    );
}

#[test]
fn trailing_dot_is_malformed() {
    check(
        "1.",
        &expect![[r#"
            [
                Token {
                    kind: Number(
                        Malformed,
                    ),
                    offset: 0,
                },
            ]
        "#]],
    );
}

#[test]
fn two_dots_are_malformed() {
    check(
        "1.2.3",
        &expect![[r#"
            [
                Token {
                    kind: Number(
                        Malformed,
                    ),
                    offset: 0,
                },
            ]
        "#]],
    );
}

#[test]
fn line_comment() {
    check(
        "// hi\nx",
        &expect![[r#"
            [
                Token {
                    kind: Comment {
                        terminated: true,
                    },
                    offset: 0,
                },
                Token {
                    kind: Newline,
                    offset: 5,
                },
                Token {
                    kind: Ident,
                    offset: 6,
                },
            ]
        "#]],
    );
}

#[test]
fn block_comment() {
    check(
        "/* x\n y */",
        &expect![[r#"
            [
                Token {
                    kind: Comment {
                        terminated: true,
                    },
                    offset: 0,
                },
            ]
        "#]],
    );
}

#[test]
fn unterminated_block_comment() {
    check(
        "/* x",
        &expect![[r#"
            [
                Token {
                    kind: Comment {
                        terminated: false,
                    },
                    offset: 0,
                },
            ]
        "#]],
    );
}

#[test]
fn string() {
    check(
        r#""a\"b""#,
        &expect![[r#"
            [
                Token {
                    kind: Str {
                        kind: Normal,
                        terminated: true,
                    },
                    offset: 0,
                },
            ]
        "#]],
    );
}

#[test]
fn c_string() {
    check(
        r#"c"hi""#,
        &expect![[r#"
            [
                Token {
                    kind: Str {
                        kind: CStr,
                        terminated: true,
                    },
                    offset: 0,
                },
            ]
        "#]],
    );
}

#[test]
fn c_then_space_then_string_is_ident() {
    check(
        r#"c "hi""#,
        &expect![[r#"
            [
                Token {
                    kind: Ident,
                    offset: 0,
                },
                Token {
                    kind: Whitespace,
                    offset: 1,
                },
                Token {
                    kind: Str {
                        kind: Normal,
                        terminated: true,
                    },
                    offset: 2,
                },
            ]
        "#]],
    );
}

#[test]
fn char_literal() {
    check(
        r"'\''",
        &expect![[r#"
            [
                Token {
                    kind: Str {
                        kind: Char,
                        terminated: true,
                    },
                    offset: 0,
                },
            ]
        "#]],
    );
}

#[test]
fn unterminated_string_stops_at_newline() {
    check(
        "\"ab\nx",
        &expect![[r#"
            [
                Token {
                    kind: Str {
                        kind: Normal,
                        terminated: false,
                    },
                    offset: 0,
                },
                Token {
                    kind: Newline,
                    offset: 3,
                },
                Token {
                    kind: Ident,
                    offset: 4,
                },
            ]
        "#]],
    );
}

#[test]
fn unknown() {
    check(
        "#",
        &expect![[r#"
            [
                Token {
                    kind: Unknown,
                    offset: 0,
                },
            ]
        "#]],
    );
}
