// Copyright (c) The kc contributors.
// Licensed under the MIT License.

use super::{scan::Scanner, Parser};
use expect_test::{expect, Expect};
use std::fmt::Display;

pub(super) fn check<T: Display>(mut parser: impl Parser<T>, input: &str, expect: &Expect) {
    let mut scanner = Scanner::new(input, 0);
    let result = parser(&mut scanner);
    let errors = scanner.into_errors();
    let actual = match result {
        Ok(value) if errors.is_empty() => value.to_string(),
        Ok(value) => format!("{value}\n\nerrors: {errors:?}"),
        Err(error) => format!("{error:?}"),
    };
    expect.assert_eq(&actual);
}

pub(super) fn check_opt<T: Display>(
    mut parser: impl Parser<Option<T>>,
    input: &str,
    expect: &Expect,
) {
    check(
        |s: &mut Scanner| {
            parser(s).map(|value| match value {
                Some(value) => value.to_string(),
                None => "None".to_string(),
            })
        },
        input,
        expect,
    );
}

#[test]
fn file_with_offset_shifts_spans() {
    let (file, errors) = super::file("main.k", "func main() {}", 100);
    assert!(errors.is_empty(), "{errors:?}");
    expect![[r#"
        File (main.k):
            Global [100-114]:
                Func (Ident [105-109] "main"):
                    Block [112-114]: <empty>"#]]
    .assert_eq(&file.to_string());
}

#[test]
fn file_aborts_on_bad_global() {
    let (file, errors) = super::file("main.k", "func main() {}; 1 + 2", 0);
    assert!(file.globals.is_empty());
    assert_eq!(errors.len(), 1);
}
