// Copyright (c) The kc contributors.
// Licensed under the MIT License.

use super::Lexer;
use expect_test::{expect, Expect};

fn check(input: &str, expect: &Expect) {
    let actual: Vec<_> = Lexer::new(input, 0).collect();
    expect.assert_debug_eq(&actual);
}

#[test]
fn compound_operators() {
    check(
        "<<= >> && ||",
        &expect![[r#"
            [
                Ok(
                    Token {
                        kind: BinOpEq(
                            Shl,
                        ),
                        span: Span {
                            lo: 0,
                            hi: 3,
                        },
                    },
                ),
                Ok(
                    Token {
                        kind: BinOp(
                            Shr,
                        ),
                        span: Span {
                            lo: 4,
                            hi: 6,
                        },
                    },
                ),
                Ok(
                    Token {
                        kind: AmpAmp,
                        span: Span {
                            lo: 7,
                            hi: 9,
                        },
                    },
                ),
                Ok(
                    Token {
                        kind: BarBar,
                        span: Span {
                            lo: 10,
                            hi: 12,
                        },
                    },
                ),
            ]
        "#]],
    );
}

#[test]
fn spaced_singles_do_not_glue() {
    check(
        "= =",
        &expect![[r#"
            [
                Ok(
                    Token {
                        kind: Eq,
                        span: Span {
                            lo: 0,
                            hi: 1,
                        },
                    },
                ),
                Ok(
                    Token {
                        kind: Eq,
                        span: Span {
                            lo: 2,
                            hi: 3,
                        },
                    },
                ),
            ]
        "#]],
    );
}

#[test]
fn newline_and_semi_are_one_separator_kind() {
    check(
        ";\n",
        &expect![[r#"
            [
                Ok(
                    Token {
                        kind: Semi,
                        span: Span {
                            lo: 0,
                            hi: 1,
                        },
                    },
                ),
                Ok(
                    Token {
                        kind: Semi,
                        span: Span {
                            lo: 1,
                            hi: 2,
                        },
                    },
                ),
            ]
        "#]],
    );
}

#[test]
fn keyword_and_ident() {
    check(
        "func f",
        &expect![[r#"
            [
                Ok(
                    Token {
                        kind: Keyword(
                            Func,
                        ),
                        span: Span {
                            lo: 0,
                            hi: 4,
                        },
                    },
                ),
                Ok(
                    Token {
                        kind: Ident,
                        span: Span {
                            lo: 5,
                            hi: 6,
                        },
                    },
                ),
            ]
        "#]],
    );
}

#[test]
fn attr() {
    check(
        "@extern",
        &expect![[r#"
            [
                Ok(
                    Token {
                        kind: Attr,
                        span: Span {
                            lo: 0,
                            hi: 7,
                        },
                    },
                ),
            ]
        "#]],
    );
}

#[test]
fn bare_at_is_an_error() {
    check(
        "@ x",
        &expect![[r#"
            [
                Err(
                    Attr(
                        Span {
                            lo: 0,
                            hi: 1,
                        },
                    ),
                ),
                Ok(
                    Token {
                        kind: Ident,
                        span: Span {
                            lo: 2,
                            hi: 3,
                        },
                    },
                ),
            ]
        "#]],
    );
}

#[test]
fn comments_are_discarded() {
    check(
        "1 // x\n/* y */ 2",
        &expect![[r#"
            [
                Ok(
                    Token {
                        kind: Int,
                        span: Span {
                            lo: 0,
                            hi: 1,
                        },
                    },
                ),
                Ok(
                    Token {
                        kind: Semi,
                        span: Span {
                            lo: 6,
                            hi: 7,
                        },
                    },
                ),
                Ok(
                    Token {
                        kind: Int,
                        span: Span {
                            lo: 15,
                            hi: 16,
                        },
                    },
                ),
            ]
        "#]],
    );
}

#[test]
fn unterminated_block_comment_is_an_error() {
    check(
        "/* x",
        &expect![[r#"
            [
                Err(
                    UnterminatedComment(
                        Span {
                            lo: 0,
                            hi: 4,
                        },
                    ),
                ),
            ]
        "#]],
    );
}

#[test]
fn malformed_number_is_an_error() {
    check(
        "1.",
        &expect![[r#"
            [
                Err(
                    Number(
                        Span {
                            lo: 0,
                            hi: 2,
                        },
                    ),
                ),
            ]
        "#]],
    );
}

#[test]
fn colon_colon() {
    check(
        "a::b",
        &expect![[r#"
            [
                Ok(
                    Token {
                        kind: Ident,
                        span: Span {
                            lo: 0,
                            hi: 1,
                        },
                    },
                ),
                Ok(
                    Token {
                        kind: ColonColon,
                        span: Span {
                            lo: 1,
                            hi: 3,
                        },
                    },
                ),
                Ok(
                    Token {
                        kind: Ident,
                        span: Span {
                            lo: 3,
                            hi: 4,
                        },
                    },
                ),
            ]
        "#]],
    );
}

#[test]
fn base_offset_shifts_spans() {
    check_with_base(
        "x",
        10,
        &expect![[r#"
            [
                Ok(
                    Token {
                        kind: Ident,
                        span: Span {
                            lo: 10,
                            hi: 11,
                        },
                    },
                ),
            ]
        "#]],
    );
}

fn check_with_base(input: &str, base: u32, expect: &Expect) {
    let actual: Vec<_> = Lexer::new(input, base).collect();
    expect.assert_debug_eq(&actual);
}
