// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! The SSA intermediate representation: a pure data model with no back-end
//! coupling. A module owns functions and globals; functions own blocks of
//! instructions ending in terminators. Construction goes through builder
//! methods that check operand invariants and allocate fresh value numbers.

pub mod ssa;
pub mod validate;
