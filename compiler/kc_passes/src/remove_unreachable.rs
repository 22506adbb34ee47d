// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! Truncates every block at its first terminator and drops blocks that end
//! up with no statements. Straight-line lowering of no-fallthrough `if`
//! arms legitimately leaves instructions after an early terminator; this
//! pass is the tidy-up that restores the one-terminator invariant before a
//! back-end consumes the module.

#[cfg(test)]
mod tests;

use crate::Pass;
use kc_ssa::ssa::{BlockId, Function, Module, Stmt};

pub struct RemoveUnreachable;

impl Pass for RemoveUnreachable {
    fn name(&self) -> &'static str {
        "remove-unreachable"
    }

    fn run(&self, module: &mut Module) {
        for function in &mut module.functions {
            run_function(function);
        }
    }
}

fn run_function(function: &mut Function) {
    for block in &mut function.blocks {
        if let Some(pos) = block.stmts.iter().position(Stmt::is_terminator) {
            block.stmts.truncate(pos + 1);
        }
    }

    // Drop empty blocks, compacting ids. Empty blocks have no terminator,
    // so nothing branches from them; they are also never branch targets,
    // since every recorded edge comes from a goto that makes its target
    // reachable and thus non-empty, so remapping the surviving ids is safe.
    let mut remap = vec![None; function.blocks.len()];
    let mut next = 0u32;
    for (i, block) in function.blocks.iter().enumerate() {
        if !block.stmts.is_empty() {
            remap[i] = Some(BlockId(next));
            next += 1;
        }
    }
    if next as usize == function.blocks.len() {
        return;
    }

    let old = std::mem::take(&mut function.blocks);
    for (i, mut block) in old.into_iter().enumerate() {
        if remap[i].is_none() {
            continue;
        }
        block.preds = block
            .preds
            .iter()
            .filter_map(|pred| remap[pred.0 as usize])
            .collect();
        for stmt in &mut block.stmts {
            match stmt {
                Stmt::Goto(target) => *target = remapped(&remap, *target),
                Stmt::CondGoto { then, els, .. } => {
                    *then = remapped(&remap, *then);
                    *els = remapped(&remap, *els);
                }
                Stmt::Phi { incoming, .. } => {
                    for (from, _) in incoming {
                        *from = remapped(&remap, *from);
                    }
                }
                _ => {}
            }
        }
        function.blocks.push(block);
    }
}

fn remapped(remap: &[Option<BlockId>], id: BlockId) -> BlockId {
    remap[id.0 as usize].expect("branch targets should survive the pass")
}
