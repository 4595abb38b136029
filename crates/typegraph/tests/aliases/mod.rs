//! # Alias Tests
//!
//! Defined aliases (`type A B`) keep the type they were written in terms of and
//! carry their own methods. Transparent aliases (`type A = B`) denote their
//! target. Targets that cannot be found leave the alias unresolved without
//! stalling the session.

use typegraph::{load_modules, Kind, LoadConfig, TypeId};
use typegraph_frontend::syntax::{Decl, Spec, TypeExpr};
use typegraph_frontend::{
    ChanFlags, LoadedModule, NamedInfo, NamedRef, SemanticObject, SemanticType, StaticFrontend,
};
use typegraph_test_utils::parse_file;

use crate::*;

#[test]
fn test_defined_alias_of_builtin() {
    let registry = testcases();
    let foo_id = type_id(&registry, TESTCASES, "FooID");
    let alias = registry.alias(foo_id).unwrap();

    assert_kind!(registry, foo_id, Kind::Alias);
    assert!(!alias.transparent);
    assert_eq!(alias.target, Some(TypeId::INT64));
    assert_eq!(registry.underlying(foo_id), TypeId::INT64);
    assert_eq!(registry.unalias(foo_id), foo_id);
}

#[test]
fn test_alias_methods_are_sorted_with_receivers() {
    let registry = testcases();
    let foo_id = type_id(&registry, TESTCASES, "FooID");
    let methods: Vec<_> = registry
        .alias(foo_id)
        .unwrap()
        .methods
        .iter()
        .map(|method| registry.function(*method).unwrap())
        .collect();

    let names: Vec<_> = methods
        .iter()
        .map(|method| method.name.clone().unwrap_or_default())
        .collect();
    assert_eq!(names, vec!["MarshalText", "UnmarshalText"]);

    let marshal = methods[0].receiver.as_ref().unwrap();
    assert_eq!(marshal.ty, foo_id);
    assert!(!marshal.pointer);
    let unmarshal = methods[1].receiver.as_ref().unwrap();
    assert_eq!(unmarshal.name, "f");
    assert!(unmarshal.pointer);
    assert_eq!(methods[1].params[0].ty, registry.slice_of(TypeId::BYTE));
    assert_eq!(methods[1].results[0].ty, TypeId::ERROR);
}

#[test]
fn test_alias_targets_keep_their_spelling() {
    let registry = testcases();
    let foo = type_id(&registry, TESTCASES, "Foo");
    let target = |name: &str| {
        registry
            .alias(type_id(&registry, TESTCASES, name))
            .and_then(|alias| alias.target)
    };

    assert_eq!(target("FooAlias"), Some(foo));
    assert_eq!(target("FooPtrAlias"), Some(registry.pointer_to(foo)));
    assert_eq!(
        target("FooSlice"),
        Some(registry.pointer_to(registry.array_of(foo, 3)))
    );
    assert_eq!(
        target("ArrayWrapper"),
        Some(registry.array_of(TypeId::BYTE, 16))
    );
    assert_eq!(
        target("Enumerated"),
        Some(TypeId::INT)
    );
}

#[test]
fn test_transparent_aliases_across_modules() {
    let registry = testcases();
    let size_cache = type_id(&registry, TESTCASES, "SizeCache");
    let alias = registry.alias(size_cache).unwrap();

    assert!(alias.transparent);
    assert_eq!(alias.target, Some(type_id(&registry, IMPORTED, "SizeCache")));
    assert_eq!(registry.unalias(size_cache), TypeId::INT32);

    let message = type_id(&registry, IMPORTED, "Message");
    assert_eq!(
        registry.unalias(type_id(&registry, TESTCASES, "WeakFields")),
        registry.map_of(TypeId::INT32, message)
    );
    assert_eq!(
        registry.unalias(type_id(&registry, TESTCASES, "UnknownFields")),
        registry.slice_of(TypeId::BYTE)
    );
    let extension = type_id(&registry, IMPORTED, "ExtensionField");
    assert_eq!(
        registry.unalias(type_id(&registry, TESTCASES, "ExtensionFields")),
        registry.map_of(TypeId::INT32, extension)
    );
}

#[test]
fn test_function_alias_with_method() {
    let registry = testcases();
    let wrapper = type_id(&registry, TESTCASES, "FuncWrapper");
    let alias = registry.alias(wrapper).unwrap();
    let target = alias.target.unwrap();

    assert_kind!(registry, target, Kind::Func);
    let signature = registry.function(target).unwrap();
    assert_eq!(
        signature.params[0].ty,
        type_id(&registry, "io", "Writer")
    );
    assert_eq!(signature.results[0].ty, TypeId::ERROR);

    assert_eq!(alias.methods.len(), 1);
    let method = registry.function(alias.methods[0]).unwrap();
    assert_eq!(method.name.as_deref(), Some("Do"));
    assert!(!method.receiver.as_ref().unwrap().pointer);
}

#[test]
fn test_pointer_chain_to_inline_record() {
    let registry = testcases();
    let multi = type_id(&registry, TESTCASES, "MultiPointerInlineStruct");

    let mut current = registry.alias(multi).unwrap().target.unwrap();
    let mut depth = 0;
    while registry.kind(current) == Kind::Pointer {
        current = registry.elem(current).unwrap();
        depth += 1;
    }
    assert_eq!(depth, 6);
    let record = registry.record(current).unwrap();
    assert_eq!(record.name, None);
    assert_eq!(record.fields[0].name, "Field");
    assert_eq!(record.fields[0].ty, TypeId::STRING);
}

#[test]
fn test_alias_chains_resolve_in_any_order() {
    let frontend = FixtureFrontend::new().file(
        "example.com/chain",
        "chain.go",
        "package chain\n\ntype A B\n\ntype B *C\n\ntype C D\n\ntype D int\n",
    );
    let registry = load(&frontend, &["example.com/chain"]);
    let id = |name: &str| type_id(&registry, "example.com/chain", name);
    let target = |name: &str| registry.alias(id(name)).and_then(|alias| alias.target);

    assert_eq!(target("A"), Some(id("B")));
    assert_eq!(target("B"), Some(registry.pointer_to(id("C"))));
    assert_eq!(target("C"), Some(id("D")));
    assert_eq!(registry.underlying(id("A")), registry.pointer_to(id("C")));
    assert_eq!(registry.underlying(id("C")), TypeId::INT);
}

// ===== Unresolvable targets =====

const BROKEN: &str = "example.com/broken";

/// A module whose checker output names `Lost` but whose syntax spells its
/// target as a name nothing declares.
fn broken_frontend() -> StaticFrontend {
    let source = "package broken\n\ntype Lost Missing\n\ntype Found int\n";
    let mut module = LoadedModule::new(BROKEN, "broken");
    module.files.push(parse_file("broken.go", source).unwrap());
    for (name, underlying) in [
        ("Lost", SemanticType::Invalid),
        ("Found", SemanticType::Basic(typegraph_frontend::BasicKind::Int)),
    ] {
        module.scope.objects.insert(
            name.to_string(),
            SemanticObject::TypeName {
                ty: SemanticType::Named(NamedRef::new(BROKEN, name)),
                alias: false,
            },
        );
        module.scope.named.insert(
            name.to_string(),
            NamedInfo {
                underlying,
                methods: Vec::new(),
            },
        );
    }
    StaticFrontend::from_modules([module])
}

#[test]
fn test_missing_target_stays_unresolved() {
    init_tracing();
    let registry =
        load_modules(&broken_frontend(), &LoadConfig::for_modules([BROKEN])).unwrap();
    let broken = module(&registry, BROKEN);

    let lost = registry.alias(broken.get_type("Lost").unwrap()).unwrap();
    assert_eq!(lost.target, None);
    let found = registry.alias(broken.get_type("Found").unwrap()).unwrap();
    assert_eq!(found.target, Some(TypeId::INT));
    assert_eq!(registry.zero(lost.id, true, None), "nil");
}

#[test]
fn test_single_pass_resolves_known_names() {
    init_tracing();
    let config = LoadConfig {
        max_alias_passes: 1,
        ..LoadConfig::for_modules([BROKEN])
    };
    let registry = load_modules(&broken_frontend(), &config).unwrap();
    let broken = module(&registry, BROKEN);

    let lost = registry.alias(broken.get_type("Lost").unwrap()).unwrap();
    assert_eq!(lost.target, None);
    let found = registry.alias(broken.get_type("Found").unwrap()).unwrap();
    assert_eq!(found.target, Some(TypeId::INT));
}

#[test]
fn test_channel_without_direction_is_unresolved() {
    init_tracing();
    const CHANNELS: &str = "example.com/channels";
    let source = "package channels\n\ntype Stream chan int\n";
    let mut file = parse_file("channels.go", source).unwrap();
    let Decl::Gen(gen) = &mut file.decls[0] else {
        panic!("expected a type declaration");
    };
    let Spec::Type(spec) = &mut gen.specs[0] else {
        panic!("expected a type spec");
    };
    let TypeExpr::Chan { dir, .. } = &mut spec.ty else {
        panic!("expected a channel");
    };
    *dir = ChanFlags::empty();

    let mut channels = LoadedModule::new(CHANNELS, "channels");
    channels.files.push(file);
    channels.scope.objects.insert(
        "Stream".to_string(),
        SemanticObject::TypeName {
            ty: SemanticType::Named(NamedRef::new(CHANNELS, "Stream")),
            alias: false,
        },
    );
    channels.scope.named.insert(
        "Stream".to_string(),
        NamedInfo {
            underlying: SemanticType::Chan {
                dir: ChanFlags::BOTH,
                elem: Box::new(SemanticType::Basic(typegraph_frontend::BasicKind::Int)),
            },
            methods: Vec::new(),
        },
    );
    let registry = load_modules(
        &StaticFrontend::from_modules([channels]),
        &LoadConfig::for_modules([CHANNELS]),
    )
    .unwrap();

    let stream = registry
        .alias(module(&registry, CHANNELS).get_type("Stream").unwrap())
        .unwrap();
    assert_eq!(stream.target, None);
}
