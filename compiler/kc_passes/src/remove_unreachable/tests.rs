// Copyright (c) The kc contributors.
// Licensed under the MIT License.

use crate::{optimize, Pass, RemoveUnreachable};
use expect_test::expect;
use kc_ssa::ssa::{Const, FuncTy, Module, Ty, Value, I32};
use std::rc::Rc;

/// A function whose entry returns early and then keeps emitting: a spare
/// goto into a block that stays empty, plus dead instructions.
fn sample() -> Module {
    let mut module = Module::new();
    let id = module.new_function(
        Some("early".into()),
        Rc::new(FuncTy {
            ret: I32,
            params: vec![],
        }),
        false,
    );
    let func = module.func_mut(id);
    let entry = func.new_block();
    let dead = func.new_block();
    let tail = func.new_block();
    func.new_return(entry, Some(Value::Const(Const::Int(I32, 1))));
    func.new_goto(entry, tail);
    func.new_alloc(entry, Ty::Sint(4));
    func.new_return(tail, Some(Value::Const(Const::Int(I32, 2))));
    let _ = dead;
    module
}

#[test]
fn truncates_after_first_terminator_and_drops_empty_blocks() {
    let mut module = sample();
    RemoveUnreachable.run(&mut module);
    expect![[r#"
        func i32 @early():
        b0:
          ret i32 1
        b1: ; preds = b0
          ret i32 2
    "#]]
    .assert_eq(&module.to_string());
}

#[test]
fn running_twice_equals_running_once() {
    let mut once = sample();
    RemoveUnreachable.run(&mut once);
    let mut twice = sample();
    RemoveUnreachable.run(&mut twice);
    RemoveUnreachable.run(&mut twice);
    assert_eq!(once.to_string(), twice.to_string());
}

#[test]
fn optimize_applies_the_default_pipeline() {
    let module = optimize(sample());
    assert!(module.functions[0]
        .blocks
        .iter()
        .all(|block| !block.stmts.is_empty()));
}
