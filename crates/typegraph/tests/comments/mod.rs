//! # Comment Tests
//!
//! Doc comments written directly above a declaration end up on the node it
//! declares: types, fields, methods, functions, constants and variables.

use typegraph::Registry;

use crate::*;

fn type_comment(registry: &Registry, path: &str, name: &str) -> Option<String> {
    let id = type_id(registry, path, name);
    match registry.get(id) {
        typegraph::TypeData::Record(record) => record.comment.clone(),
        typegraph::TypeData::Interface(interface) => interface.comment.clone(),
        typegraph::TypeData::Function(function) => function.comment.clone(),
        typegraph::TypeData::Alias(alias) => alias.comment.clone(),
        _ => None,
    }
}

fn method_comment(registry: &Registry, methods: &[typegraph::TypeId], name: &str) -> Option<String> {
    methods
        .iter()
        .filter_map(|method| registry.function(*method))
        .find(|method| method.name.as_deref() == Some(name))
        .unwrap_or_else(|| panic!("no method {name}"))
        .comment
        .clone()
}

#[test]
fn test_type_docs() {
    let registry = testcases();
    let doc = |name: &str| type_comment(&registry, TESTCASES, name);

    assert_eq!(
        doc("Foo").as_deref(),
        Some("Foo is the test model that contains multiple field definitions.")
    );
    assert_eq!(
        doc("FooID").as_deref(),
        Some("FooID is the custom type wrapper on the Foo identifier.")
    );
    assert_eq!(
        doc("InheritMe").as_deref(),
        Some("InheritMe is an interface that will be inherited.")
    );
    assert_eq!(doc("FooSlice"), None);
    assert_eq!(doc("Bar"), None);
}

#[test]
fn test_grouped_type_docs() {
    let registry = testcases();

    assert_eq!(
        type_comment(&registry, TESTCASES, "WeirdStruct").as_deref(),
        Some("WeirdStruct docs.")
    );
    assert_eq!(type_comment(&registry, TESTCASES, "Weird"), None);
    let weird = module(&registry, TESTCASES)
        .get_record("WeirdStruct")
        .unwrap();
    assert_eq!(weird.field("Name").unwrap().comment.as_deref(), Some("Name doc."));
}

#[test]
fn test_field_docs() {
    let registry = testcases();
    let foo = module(&registry, TESTCASES).get_record("Foo").unwrap();

    assert_eq!(
        foo.field("ID").unwrap().comment.as_deref(),
        Some("ID is the foo field identifier.")
    );
    assert_eq!(foo.field("String").unwrap().comment, None);
}

#[test]
fn test_inline_record_behind_pointers() {
    let registry = testcases();
    let mut current = registry
        .alias(type_id(&registry, TESTCASES, "MultiPointerInlineStruct"))
        .unwrap()
        .target
        .unwrap();
    while let Some(elem) = registry.elem(current) {
        current = elem;
    }

    let record = registry.record(current).unwrap();
    assert_eq!(
        record.field("Field").unwrap().comment.as_deref(),
        Some("Field test comment.")
    );
}

#[test]
fn test_method_docs() {
    let registry = testcases();
    let foo_id = registry
        .alias(type_id(&registry, TESTCASES, "FooID"))
        .unwrap();
    assert_eq!(
        method_comment(&registry, &foo_id.methods, "UnmarshalText").as_deref(),
        Some("UnmarshalText implements encoding.TextUnmarshaler interface.")
    );

    let wrapper = registry
        .alias(type_id(&registry, TESTCASES, "FuncWrapper"))
        .unwrap();
    assert_eq!(
        method_comment(&registry, &wrapper.methods, "Do").as_deref(),
        Some("Do runs the wrapped function.")
    );

    let not_empty = module(&registry, TESTCASES)
        .get_interface("NotEmpty")
        .unwrap();
    assert_eq!(
        method_comment(&registry, &not_empty.methods, "Call").as_deref(),
        Some("Call runs the call.")
    );

    let time = module(&registry, "time").get_record("Time").unwrap();
    assert_eq!(
        method_comment(&registry, &time.methods, "Unix").as_deref(),
        Some("Unix returns t as a Unix time.")
    );
}

#[test]
fn test_function_docs() {
    let registry = testcases();

    assert_eq!(
        type_comment(&registry, TESTCASES, "NewFoo").as_deref(),
        Some("NewFoo creates a Foo with the given identifier.")
    );
    assert_eq!(
        type_comment(&registry, "time", "Now").as_deref(),
        Some("Now returns the current local time.")
    );
}

#[test]
fn test_declaration_docs() {
    let registry = testcases();
    let testcases = module(&registry, TESTCASES);
    let doc = |name: &str| testcases.declaration(name).unwrap().comment;

    assert_eq!(
        doc("EnumeratedOne").as_deref(),
        Some("EnumeratedOne defines a first enumerated type value.")
    );
    assert_eq!(doc("EnumeratedTwo"), None);
    assert_eq!(
        doc("MaxFoos").as_deref(),
        Some("MaxFoos bounds the size of a FooSlice.")
    );
    assert_eq!(
        doc("ErrNotFound").as_deref(),
        Some("ErrNotFound is returned when a foo is missing.")
    );
}

#[test]
fn test_trailing_comments_are_not_docs() {
    let registry = testcases();

    assert_eq!(type_comment(&registry, IMPORTED, "UnknownFields"), None);
    assert_eq!(
        type_comment(&registry, "time", "Duration").as_deref(),
        Some("A Duration represents the elapsed time between two instants.")
    );
}

#[test]
fn test_multiline_docs_keep_line_breaks() {
    let source = "package notes\n\n// Note is a note.\n//\n// It has two paragraphs.\ntype Note struct{}\n";
    let registry = load(
        &FixtureFrontend::new().file("example.com/notes", "notes.go", source),
        &["example.com/notes"],
    );

    assert_eq!(
        type_comment(&registry, "example.com/notes", "Note").as_deref(),
        Some("Note is a note.\n\nIt has two paragraphs.")
    );
}
