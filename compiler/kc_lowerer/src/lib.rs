// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! Lowering from the typed HIR into the SSA module. Each analysed function
//! becomes one SSA function and each global variable one SSA global, in two
//! passes: declare everything, then fill in bodies and initializers.
//!
//! Lowering is total: a program that analysed successfully always lowers.

mod expr;
mod stmt;
#[cfg(test)]
mod tests;
mod ty;

use kc_hir::hir;
use kc_ssa::ssa::{self, BlockId, Value};
use rustc_hash::FxHashMap;
use std::rc::Rc;

use ty::{lower_func_ty, lower_ty};

/// What a HIR global became in the module.
#[derive(Clone, Copy)]
enum GlobalRef {
    Func(ssa::FuncId),
    Var(ssa::GlobalId),
}

struct Lowerer {
    module: ssa::Module,
    globals: FxHashMap<hir::GlobalId, GlobalRef>,
    /// The function and block instructions are currently appended to.
    cur: ssa::FuncId,
    block: BlockId,
    /// Stack slots for the current function's parameters and locals.
    locals: FxHashMap<hir::LocalId, Value>,
    /// The condition and end blocks of the innermost enclosing loop.
    loop_blocks: Option<(BlockId, BlockId)>,
    /// Deferred calls, evaluated at their `defer` site, emitted in reverse
    /// order at every function exit.
    defers: Vec<(Value, Vec<Value>)>,
}

/// Maps the typed program into an SSA module.
#[must_use]
pub fn generate_ssa(program: &hir::Program) -> ssa::Module {
    let mut lowerer = Lowerer {
        module: ssa::Module::new(),
        globals: FxHashMap::default(),
        cur: ssa::FuncId(0),
        block: BlockId(0),
        locals: FxHashMap::default(),
        loop_blocks: None,
        defers: Vec::new(),
    };
    lowerer.declare(program);
    lowerer.define(program);
    log::debug!(
        "lowered {} functions and {} globals",
        lowerer.module.functions.len(),
        lowerer.module.globals.len()
    );
    lowerer.module
}

impl Lowerer {
    fn declare(&mut self, program: &hir::Program) {
        for global in &program.globals {
            match global {
                hir::Global::Func(func) => {
                    let ty = Rc::new(lower_func_ty(&func.ty));
                    let id = self.module.new_function(
                        func.extern_name.clone(),
                        ty,
                        func.no_return || func.exit,
                    );
                    self.globals.insert(func.id, GlobalRef::Func(id));
                }
                hir::Global::Var(var) => {
                    let ty = lower_ty(&var.ty);
                    let id = self.module.new_global(var.extern_name.clone(), ty, None);
                    self.globals.insert(var.id, GlobalRef::Var(id));
                }
            }
        }
    }

    fn define(&mut self, program: &hir::Program) {
        for global in &program.globals {
            match global {
                hir::Global::Func(func) => {
                    if let Some(body) = func.body.borrow().as_ref() {
                        self.define_function(func, body);
                    }
                }
                hir::Global::Var(var) => {
                    if let Some(init) = &var.init {
                        let init = self.lower_const(init);
                        let GlobalRef::Var(id) = self.globals[&var.id] else {
                            unreachable!("variable globals map to module globals");
                        };
                        self.module.globals[id.0 as usize].init = Some(init);
                    }
                }
            }
        }
    }

    fn define_function(&mut self, func: &hir::Func, body: &hir::Block) {
        let GlobalRef::Func(id) = self.globals[&func.id] else {
            unreachable!("function globals map to module functions");
        };
        self.cur = id;
        self.locals.clear();
        self.defers.clear();
        self.loop_blocks = None;

        let entry = self.func().new_block();
        self.block = entry;

        // Every parameter gets a stack slot at entry; the incoming register
        // value is stored into it and reads go through loads.
        for (index, param) in func.params.iter().enumerate() {
            let ty = lower_ty(&param.ty);
            let slot = self.func().new_alloc(entry, ty);
            let index = u32::try_from(index).expect("param index should fit into u32");
            let incoming = self.func().param_value(index);
            self.func().new_store(entry, incoming, slot.clone());
            self.locals.insert(param.id, slot);
        }

        self.lower_block(body);
    }

    fn func(&mut self) -> &mut ssa::Function {
        self.module.func_mut(self.cur)
    }

    /// Emits the deferred calls in LIFO order; used immediately before each
    /// return and before unconditional `@exit` calls. A deferred call to a
    /// function that never returns is followed by `Unreachable` like any
    /// other call to it.
    fn run_defers(&mut self) {
        let defers: Vec<_> = self.defers.iter().rev().cloned().collect();
        for (callee, args) in defers {
            let no_return = match &callee {
                Value::Func { id, .. } => self.module.func(*id).no_return,
                _ => false,
            };
            let block = self.block;
            self.func().new_call(block, callee, args);
            if no_return {
                let block = self.block;
                self.func().new_unreachable(block);
            }
        }
    }
}
