// Copyright (c) The kc contributors.
// Licensed under the MIT License.

use super::{ArrayTy, FuncTy, Prim, StructTy, Ty, TyDef};
use std::{cell::RefCell, path::PathBuf, rc::Rc};

fn def(name: &str, dst: Ty) -> Rc<TyDef> {
    Rc::new(TyDef {
        package: PathBuf::from("/pkg"),
        name: name.into(),
        dst: RefCell::new(Some(dst)),
    })
}

#[test]
fn typedef_equality_is_nominal() {
    let a = def("A", Ty::Prim(Prim::I32));
    let b = def("B", Ty::Prim(Prim::I32));
    assert_eq!(Ty::Def(Rc::clone(&a)), Ty::Def(a));
    let a = def("A", Ty::Prim(Prim::I32));
    assert_ne!(Ty::Def(a), Ty::Def(b));
}

#[test]
fn structural_equality_sees_through_nothing() {
    let a = Ty::Tuple(vec![Ty::Prim(Prim::I32), Ty::Prim(Prim::Bool)].into());
    let b = Ty::Tuple(vec![Ty::Prim(Prim::I32), Ty::Prim(Prim::Bool)].into());
    assert_eq!(a, b);
}

#[test]
fn base_unwraps_typedef_chains() {
    let inner = def("Inner", Ty::Prim(Prim::U8));
    let outer = def("Outer", Ty::Def(inner));
    assert_eq!(Ty::Def(outer).base(), Ty::Prim(Prim::U8));
}

#[test]
fn depth_base_unwraps_children_once() {
    let elem = def("Elem", Ty::Prim(Prim::I64));
    let tuple = Ty::Tuple(vec![Ty::Def(elem), Ty::Prim(Prim::Bool)].into());
    let wrapper = def("Wrapper", tuple);
    assert_eq!(
        Ty::Def(wrapper).depth_base(),
        Ty::Tuple(vec![Ty::Prim(Prim::I64), Ty::Prim(Prim::Bool)].into())
    );
}

#[test]
fn depth_base_terminates_on_pointer_cycles() {
    let list = Rc::new(TyDef {
        package: PathBuf::from("/pkg"),
        name: "List".into(),
        dst: RefCell::new(None),
    });
    *list.dst.borrow_mut() = Some(Ty::Ptr(Rc::new(Ty::Def(Rc::clone(&list)))));
    let depth = Ty::Def(Rc::clone(&list)).depth_base();
    assert_eq!(depth, Ty::Ptr(Rc::new(Ty::Ptr(Rc::new(Ty::Def(list))))));
}

#[test]
fn sizes_follow_backend_layout() {
    assert_eq!(Ty::Prim(Prim::Bool).byte_size(), 1);
    assert_eq!(Ty::Ptr(Rc::new(Ty::Prim(Prim::I8))).byte_size(), 8);
    assert_eq!(
        Ty::Array(Rc::new(ArrayTy {
            size: 3,
            elem: Ty::Prim(Prim::I32),
        }))
        .byte_size(),
        12
    );
    // Two i32 fields pad to the minimum struct alignment of 4.
    assert_eq!(
        Ty::Struct(Rc::new(StructTy {
            fields: vec![
                ("a".into(), Ty::Prim(Prim::I32)),
                ("b".into(), Ty::Prim(Prim::I8)),
            ],
        }))
        .byte_size(),
        8
    );
}

#[test]
fn display_renders_source_names() {
    let func = Ty::Func(Rc::new(FuncTy {
        ret: Ty::None,
        params: vec![Ty::Prim(Prim::I32), Ty::Prim(Prim::Bool)],
    }));
    assert_eq!(func.to_string(), "func(i32,bool)none");
    let node = def("Node", Ty::Prim(Prim::I32));
    assert_eq!(Ty::Def(node).to_string(), "Node");
    assert_eq!(
        Ty::Array(Rc::new(ArrayTy {
            size: 2,
            elem: Ty::Ptr(Rc::new(Ty::Prim(Prim::U8))),
        }))
        .to_string(),
        "[2]*u8"
    );
}
