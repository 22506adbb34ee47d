// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! The untyped abstract syntax tree for K. Nodes correspond directly to the
//! surface syntax; every node carries the span of the source text it was
//! parsed from.

pub mod ast;
