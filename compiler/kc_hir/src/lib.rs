// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! The typed intermediate representation produced by semantic analysis. The
//! analyser resolves names, binds methods, and annotates every expression
//! with its type; back-ends and the SSA lowerer consume this representation
//! without referring back to the AST.

pub mod hir;
pub mod ty;
