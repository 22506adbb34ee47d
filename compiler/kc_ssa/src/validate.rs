// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! Structural well-formedness checks for an optimized module. Violations
//! are compiler bugs, not user errors, so the result is a plain message
//! rather than a diagnostic.

use crate::ssa::{Block, BlockId, ConvertOp, Function, Module, Stmt, Ty, I8};
use rustc_hash::FxHashSet;

/// Checks every function of the module:
///
/// - every block is non-empty and has exactly one terminator, in the last
///   position;
/// - every phi has a non-empty incoming list and every incoming block is a
///   recorded predecessor of the phi's block;
/// - every store's destination is a pointer to the source's type;
/// - every conversion's operand matches the conversion family;
/// - every branch target exists and records the branching block as a
///   predecessor.
pub fn validate(module: &Module) -> Result<(), String> {
    for function in &module.functions {
        validate_function(function).map_err(|e| format!("function @{}: {e}", function.name))?;
    }
    Ok(())
}

fn validate_function(function: &Function) -> Result<(), String> {
    for (i, block) in function.blocks.iter().enumerate() {
        let id = BlockId(u32::try_from(i).expect("block index should fit into u32"));
        validate_block(function, block, id).map_err(|e| format!("block b{i}: {e}"))?;
    }
    Ok(())
}

fn validate_block(function: &Function, block: &Block, id: BlockId) -> Result<(), String> {
    let Some(last) = block.stmts.last() else {
        return Err("block is empty".to_string());
    };
    if !last.is_terminator() {
        return Err("block does not end in a terminator".to_string());
    }
    for stmt in &block.stmts[..block.stmts.len() - 1] {
        if stmt.is_terminator() {
            return Err("terminator is not the last instruction".to_string());
        }
    }

    for stmt in &block.stmts {
        match stmt {
            Stmt::Store { from, to } => {
                let Ty::Ptr(elem) = to.ty() else {
                    return Err(format!("store destination has type {}", to.ty()));
                };
                if from.ty() != *elem {
                    return Err(format!(
                        "store source {} does not match destination {elem}",
                        from.ty()
                    ));
                }
            }
            Stmt::Convert { op, from, to, .. } => {
                let from = from.ty();
                let ok = match op {
                    ConvertOp::Itoi => from.is_int() && to.is_int(),
                    ConvertOp::Ftof => from.is_float() && to.is_float(),
                    ConvertOp::Itof => from.is_int() && to.is_float(),
                    ConvertOp::Ftoi => from.is_float() && to.is_int(),
                    ConvertOp::Ptop => from.is_ptr() && to.is_ptr(),
                    ConvertOp::Ptoi => from.is_ptr() && to.is_int(),
                    ConvertOp::Itop => from.is_int() && to.is_ptr(),
                };
                if !ok {
                    return Err(format!("conversion from {from} to {to} is ill-formed"));
                }
            }
            Stmt::Phi { incoming, .. } => {
                if incoming.is_empty() {
                    return Err("phi has no incoming values".to_string());
                }
                let preds: FxHashSet<_> = block.preds.iter().copied().collect();
                for (from, _) in incoming {
                    if !preds.contains(from) {
                        return Err(format!("phi incoming {from} is not a predecessor"));
                    }
                }
            }
            Stmt::Goto(target) => check_edge(function, id, *target)?,
            Stmt::CondGoto { cond, then, els } => {
                if cond.ty() != I8 {
                    return Err(format!("condition has type {}", cond.ty()));
                }
                check_edge(function, id, *then)?;
                check_edge(function, id, *els)?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn check_edge(function: &Function, from: BlockId, to: BlockId) -> Result<(), String> {
    let Some(target) = function.blocks.get(to.0 as usize) else {
        return Err(format!("branch target {to} does not exist"));
    };
    if target.preds.contains(&from) {
        Ok(())
    } else {
        Err(format!("target {to} does not record predecessor {from}"))
    }
}
