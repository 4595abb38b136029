//! # Cycle Tests
//!
//! Types that refer to themselves, directly or through another module, resolve
//! to finite graphs whose edges point back at existing nodes.

use typegraph::types::TypeData;
use typegraph::Kind;

use crate::*;

#[test]
fn test_record_points_at_itself() {
    let registry = load(&graph_frontend(), &[GRAPH_A]);
    let node = type_id(&registry, GRAPH_A, "Node");
    let next = field_type(&registry, GRAPH_A, "Node", "Next");

    assert_eq!(registry.get(next), TypeData::Pointer(node));
    assert_eq!(registry.name_of(next, true, Some(GRAPH_A)), "*Node");
    assert_eq!(registry.name_of(next, true, None), "*a.Node");
    assert_eq!(registry.full_name(next), "*example.com/graph/a/Node");
}

#[test]
fn test_mutual_imports_load_together() {
    let registry = load(&graph_frontend(), &[GRAPH_B]);

    assert!(registry.contains(GRAPH_A));
    assert!(registry.contains(GRAPH_B));
    let owner = field_type(&registry, GRAPH_A, "Node", "Owner");
    let pair = registry.elem(owner).unwrap();
    assert_eq!(
        registry.record(pair).unwrap().field("A").unwrap().ty,
        type_id(&registry, GRAPH_A, "Node")
    );
}

#[test]
fn test_interfaces_refer_across_modules() {
    let registry = load(&cycle_frontend(), &[CYCLE_LEFT]);
    let visitor = type_id(&registry, CYCLE_LEFT, "Visitor");
    let node = type_id(&registry, CYCLE_RIGHT, "Node");

    let visit = registry
        .function(registry.interface(visitor).unwrap().methods[0])
        .unwrap();
    assert_eq!(visit.name.as_deref(), Some("Visit"));
    assert_eq!(visit.params[0].ty, node);
    assert_eq!(visit.results[0].ty, visitor);

    let accept = registry
        .function(registry.interface(node).unwrap().methods[0])
        .unwrap();
    assert_eq!(accept.params[0].ty, visitor);
    assert_eq!(accept.results[0].ty, node);
    assert_kind!(registry, node, Kind::Interface);
}

#[test]
fn test_cyclic_interfaces_are_implemented() {
    let registry = load(&cycle_frontend(), &[CYCLE_RIGHT]);
    let visitor = type_id(&registry, CYCLE_LEFT, "Visitor");
    let node = type_id(&registry, CYCLE_RIGHT, "Node");
    let leaf = type_id(&registry, CYCLE_RIGHT, "Leaf");
    let walker = type_id(&registry, CYCLE_RIGHT, "Walker");

    assert!(!registry.implements(leaf, node));
    assert!(registry.implements(registry.pointer_to(leaf), node));
    assert!(registry.implements(walker, visitor));
    assert!(registry.implements(registry.pointer_to(walker), visitor));
    assert!(!registry.implements(walker, node));
    assert!(registry.implements(node, node));
}

#[test]
fn test_cyclic_names_terminate() {
    let registry = load(&cycle_frontend(), &[CYCLE_LEFT]);
    let visitor = type_id(&registry, CYCLE_LEFT, "Visitor");
    let visit = registry
        .function(registry.interface(visitor).unwrap().methods[0])
        .unwrap();

    assert_eq!(
        registry.signature(&visit, true, Some(CYCLE_LEFT)),
        "(n right.Node) Visitor"
    );
    assert_eq!(
        registry.signature(&visit, true, Some(CYCLE_RIGHT)),
        "(n Node) left.Visitor"
    );
    assert_eq!(registry.zero(visitor, true, None), "nil");
}
