//! # Query Tests
//!
//! `type_of`, `implements`, zero values, spelling and structural equality over
//! resolved modules.

use typegraph::TypeId;

use crate::*;

const SHAPES: &str = "example.com/shapes";

fn shapes() -> typegraph::Registry {
    let source = r#"package shapes

type Shape interface {
	Area() float64
}

type Square struct {
	Side float64
}

func (s Square) Area() float64 { return s.Side * s.Side }

type Circle struct {
	R float64
}

func (c *Circle) Area() float64 { return 0 }

type Renamed Square

type Same = Square

type Failure struct{}

func (f Failure) Error() string { return "" }
"#;
    load(
        &FixtureFrontend::new().file(SHAPES, "shapes.go", source),
        &[SHAPES],
    )
}

#[test]
fn test_type_of_finds_declared_nodes() {
    let registry = testcases();
    let foo = type_id(&registry, TESTCASES, "Foo");

    assert_eq!(registry.type_of("Foo", Some(TESTCASES)), Some(foo));
    assert_eq!(registry.type_of("testcases.Foo", None), Some(foo));
    assert_eq!(registry.type_of("example.com/testcases.Foo", None), Some(foo));
    assert_eq!(registry.type_of("Foo", None), None);
    assert_eq!(
        registry.type_of("*Bar", Some(TESTCASES)),
        Some(field_type(&registry, TESTCASES, "Foo", "Bar"))
    );
    assert_eq!(
        registry.type_of("time.Duration", Some(TESTCASES)),
        Some(type_id(&registry, "time", "Duration"))
    );
    assert_eq!(
        registry.type_of("chan<- int", None),
        Some(field_type(&registry, TESTCASES, "Bar", "ChanIn"))
    );
    assert_eq!(
        registry.type_of("<-chan int", None),
        Some(field_type(&registry, TESTCASES, "Bar", "ChanOut"))
    );
    assert_eq!(
        registry.type_of("[3]Foo", Some(TESTCASES)),
        Some(registry.array_of(foo, 3))
    );
    assert_eq!(registry.type_of("error", None), Some(TypeId::ERROR));
    assert_eq!(registry.type_of("any", None), Some(TypeId::EMPTY_INTERFACE));
}

#[test]
fn test_type_of_accepts_zero_literals() {
    let registry = testcases();
    let ctx = Some(TESTCASES);
    let foo_id = type_id(&registry, TESTCASES, "FooID");

    assert_eq!(registry.zero(foo_id, true, ctx), "FooID(0)");
    assert_eq!(registry.type_of(&registry.zero(foo_id, true, ctx), ctx), Some(foo_id));
    assert_eq!(registry.type_of("FooID(1)", ctx), None);
    assert_eq!(
        registry.type_of("Foo{}", ctx),
        Some(type_id(&registry, TESTCASES, "Foo"))
    );
    assert_eq!(
        registry.type_of("FooAlias{}", ctx),
        Some(type_id(&registry, TESTCASES, "FooAlias"))
    );
}

#[test]
fn test_zero_values() {
    let registry = testcases();
    let ctx = Some(TESTCASES);
    let zero = |name: &str| registry.zero(type_id(&registry, TESTCASES, name), true, ctx);

    assert_eq!(zero("Foo"), "Foo{}");
    assert_eq!(zero("FooAlias"), "FooAlias{}");
    assert_eq!(zero("FooPtrAlias"), "nil");
    assert_eq!(zero("FooSlice"), "nil");
    assert_eq!(zero("ArrayWrapper"), "ArrayWrapper{}");
    assert_eq!(zero("Enumerated"), "Enumerated(0)");
    assert_eq!(zero("SizeCache"), "0");
    assert_eq!(zero("NotEmpty"), "nil");
    assert_eq!(zero("FuncWrapper"), "nil");
    assert_eq!(
        registry.zero(type_id(&registry, TESTCASES, "FooID"), true, None),
        "testcases.FooID(0)"
    );
    assert_eq!(registry.zero(TypeId::BOOL, true, None), "false");
    assert_eq!(registry.zero(TypeId::STRING, true, None), "\"\"");
    assert_eq!(registry.zero(TypeId::FLOAT64, true, None), "0");
    assert_eq!(
        registry.zero(field_type(&registry, TESTCASES, "Foo", "Slice"), true, None),
        "nil"
    );
}

#[test]
fn test_spelling_in_context() {
    let registry = testcases();
    let ctx = Some(TESTCASES);
    let name = |id: TypeId| registry.name_of(id, true, ctx);

    assert_eq!(name(field_type(&registry, TESTCASES, "Foo", "Duration")), "time.Duration");
    assert_eq!(name(field_type(&registry, TESTCASES, "Bar", "Map")), "map[string]byte");
    assert_eq!(name(field_type(&registry, TESTCASES, "Bar", "Error")), "error");
    assert_eq!(
        registry.name_of(type_id(&registry, TESTCASES, "Foo"), false, None),
        "Foo"
    );
    assert_eq!(
        name(
            registry
                .alias(type_id(&registry, TESTCASES, "MultiPointerInlineStruct"))
                .unwrap()
                .target
                .unwrap()
        ),
        "******struct{Field string}"
    );
    assert_eq!(
        registry.full_name(type_id(&registry, TESTCASES, "Foo")),
        "example.com/testcases/Foo"
    );

    let call = registry
        .function(
            module(&registry, TESTCASES)
                .get_interface("NotEmpty")
                .unwrap()
                .methods[0],
        )
        .unwrap();
    insta::assert_snapshot!(
        registry.signature(&call, true, ctx),
        @"(ctx context.Context, options ...string) (n int, err error)"
    );
}

#[test]
fn test_structural_equality() {
    let registry = testcases();
    let foo = type_id(&registry, TESTCASES, "Foo");
    let foo_alias = type_id(&registry, TESTCASES, "FooAlias");

    assert!(registry.equal(foo, foo));
    assert!(!registry.equal(foo, foo_alias));
    assert!(registry.equal(
        registry.map_of(TypeId::STRING, TypeId::BYTE),
        registry.map_of(TypeId::STRING, TypeId::UINT8)
    ));
    assert!(!registry.equal(
        registry.array_of(foo, 3),
        registry.array_of(foo, 4)
    ));
    assert!(!registry.equal(registry.array_of(foo, 3), registry.slice_of(foo)));
}

#[test]
fn test_method_sets_follow_receivers() {
    let registry = shapes();
    let id = |name: &str| type_id(&registry, SHAPES, name);
    let shape = id("Shape");

    assert!(registry.implements(id("Square"), shape));
    assert!(registry.implements(registry.pointer_to(id("Square")), shape));
    assert!(!registry.implements(id("Circle"), shape));
    assert!(registry.implements(registry.pointer_to(id("Circle")), shape));
}

#[test]
fn test_aliases_and_method_sets() {
    let registry = shapes();
    let id = |name: &str| type_id(&registry, SHAPES, name);
    let shape = id("Shape");

    assert!(!registry.implements(id("Renamed"), shape));
    assert!(registry.implements(id("Same"), shape));
    assert!(registry.implements(registry.pointer_to(id("Same")), shape));
}

#[test]
fn test_predeclared_interfaces() {
    let registry = shapes();
    let failure = type_id(&registry, SHAPES, "Failure");

    assert!(registry.implements(failure, TypeId::ERROR));
    assert!(!registry.implements(type_id(&registry, SHAPES, "Square"), TypeId::ERROR));
    assert!(registry.implements(TypeId::INT, TypeId::EMPTY_INTERFACE));
    assert!(registry.implements(failure, TypeId::EMPTY_INTERFACE));
    assert!(!registry.implements(TypeId::INT, type_id(&registry, SHAPES, "Shape")));
}

#[test]
fn test_interface_subsets() {
    let registry = testcases();
    let reader = type_id(&registry, "io", "Reader");
    let read_writer = type_id(&registry, "io", "ReadWriter");

    assert!(registry.implements(read_writer, reader));
    assert!(!registry.implements(reader, read_writer));
}
