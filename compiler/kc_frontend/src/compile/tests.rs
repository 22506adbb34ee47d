// Copyright (c) The kc contributors.
// Licensed under the MIT License.

use super::SourceMap;

#[test]
fn position_is_one_based() {
    let mut sources = SourceMap::new();
    sources.push("a.k".into(), "let x = 1\nlet y = 2".into());
    let position = sources.position(0).expect("offset 0 should resolve");
    assert_eq!((position.row, position.column), (1, 1));
    let position = sources.position(10).expect("offset 10 should resolve");
    assert_eq!((position.row, position.column), (2, 1));
    let position = sources.position(14).expect("offset 14 should resolve");
    assert_eq!((position.row, position.column), (2, 5));
}

#[test]
fn sources_leave_a_gap() {
    let mut sources = SourceMap::new();
    let first = sources.push("a.k".into(), "ab".into());
    let second = sources.push("b.k".into(), "cd".into());
    assert_eq!(first, 0);
    assert_eq!(second, 3);
    assert_eq!(
        sources.find_by_offset(3).map(|s| s.name.as_ref()),
        Some("b.k")
    );
    // The end-of-file offset of the first source still resolves to it.
    assert_eq!(
        sources.find_by_offset(2).map(|s| s.name.as_ref()),
        Some("a.k")
    );
}
