// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! The compiler front end: source loading, parsing entry points, import
//! resolution, and semantic analysis from the untyped AST to the typed HIR.

pub mod analyse;
pub mod compile;
