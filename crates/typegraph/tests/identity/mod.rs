//! # Identity Tests
//!
//! A declared type has exactly one node: looking it up by name, reaching it
//! through a field, a parameter or a pointer all yield the same id.

use typegraph::{Kind, Registry, TypeId};

use crate::*;

#[test]
fn test_field_reference_is_the_declared_type() {
    let registry = testcases();
    let foo = type_id(&registry, TESTCASES, "Foo");
    let bar = type_id(&registry, TESTCASES, "Bar");
    let foo_id = type_id(&registry, TESTCASES, "FooID");

    assert_eq!(field_type(&registry, TESTCASES, "Foo", "ID"), foo_id);
    assert_eq!(
        field_type(&registry, TESTCASES, "Foo", "Bar"),
        registry.pointer_to(bar)
    );
    assert_eq!(registry.elem(registry.pointer_to(foo)), Some(foo));
}

#[test]
fn test_parameter_reference_is_the_declared_type() {
    let registry = testcases();
    let new_foo = module(&registry, TESTCASES).get_function("NewFoo").unwrap();

    assert_eq!(new_foo.params.len(), 1);
    assert_eq!(new_foo.params[0].name, "id");
    assert_eq!(new_foo.params[0].ty, type_id(&registry, TESTCASES, "FooID"));
    assert_eq!(
        new_foo.results[0].ty,
        registry.pointer_to(type_id(&registry, TESTCASES, "Foo"))
    );
}

#[test]
fn test_imported_type_has_one_node() {
    let registry = testcases();
    let duration = type_id(&registry, "time", "Duration");

    assert_eq!(field_type(&registry, TESTCASES, "Foo", "Duration"), duration);
    let second = module(&registry, "time").declaration("Second").unwrap();
    assert_eq!(second.ty, duration);
    let timeout = module(&registry, TESTCASES)
        .declaration("DefaultTimeout")
        .unwrap();
    assert_eq!(timeout.ty, duration);
}

#[test]
fn test_records_of_two_modules_share_nodes() {
    let registry = load(&graph_frontend(), &[GRAPH_A]);
    let node = type_id(&registry, GRAPH_A, "Node");
    let pair = type_id(&registry, GRAPH_B, "Pair");

    assert_eq!(field_type(&registry, GRAPH_B, "Pair", "A"), node);
    assert_eq!(field_type(&registry, GRAPH_B, "Pair", "B"), node);
    assert_eq!(
        field_type(&registry, GRAPH_A, "Node", "Owner"),
        registry.pointer_to(pair)
    );
    assert_eq!(registry.type_of("*a.Node", None), Some(registry.pointer_to(node)));
}

#[test]
fn test_wrappers_are_interned() {
    let registry = testcases();
    let slice = field_type(&registry, TESTCASES, "Foo", "Slice");

    assert_eq!(slice, registry.slice_of(TypeId::STRING));
    assert_eq!(registry.type_of("[]string", None), Some(slice));
    assert_kind!(registry, slice, Kind::Slice);
}

#[test]
fn test_builtins_are_shared_by_registries() {
    let one = testcases();
    let two = Registry::new();

    assert_eq!(
        field_type(&one, TESTCASES, "Foo", "String"),
        two.builtin().unwrap().get_type("string").unwrap()
    );
    assert!(!two.contains(TESTCASES));
}

#[test]
fn test_byte_is_uint8() {
    let registry = testcases();
    let map = field_type(&registry, TESTCASES, "Bar", "Map");

    assert_eq!(registry.elem(map), None);
    assert_eq!(registry.type_of("map[string]byte", None), Some(map));
    assert_kind!(registry, TypeId::BYTE, Kind::Uint8);
    assert!(registry.equal(TypeId::BYTE, TypeId::UINT8));
    assert!(registry.equal(registry.slice_of(TypeId::BYTE), registry.slice_of(TypeId::UINT8)));
    assert!(!registry.equal(TypeId::RUNE, TypeId::UINT8));
}
