// Copyright (c) The kc contributors.
// Licensed under the MIT License.

//! The SSA pass framework. A pass is an in-place module transformation;
//! [`optimize`] applies the default pass list in order.

mod remove_unreachable;

pub use remove_unreachable::RemoveUnreachable;

use kc_ssa::ssa::Module;

pub trait Pass {
    fn name(&self) -> &'static str;
    fn run(&self, module: &mut Module);
}

/// Applies the default pass pipeline.
#[must_use]
pub fn optimize(mut module: Module) -> Module {
    let passes: [&dyn Pass; 1] = [&RemoveUnreachable];
    for pass in passes {
        log::debug!("running pass {}", pass.name());
        pass.run(&mut module);
    }
    module
}
