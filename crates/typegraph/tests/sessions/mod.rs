//! # Session Tests
//!
//! Registries grow through successive sessions. A module is resolved by exactly
//! one session; later sessions read it and never rebuild it.

use std::io::Write;
use std::sync::Arc;

use typegraph::{
    load_modules, update_modules, ConfigError, LoadConfig, LoadError, Registry, RegistryError,
};
use typegraph_frontend::semantic::{NamedInfo, StructField, StructType};
use typegraph_frontend::{
    BasicKind, FrontendError, LoadedModule, SemanticObject, SemanticType, StaticFrontend,
};

use crate::*;

#[test]
fn test_update_never_reresolves() {
    init_tracing();
    let frontend = testcases_frontend();
    let registry = Registry::new();

    let first = update_modules(&registry, &frontend, &LoadConfig::for_modules(["time"])).unwrap();
    assert_eq!(first.resolved, vec!["time".to_string()]);
    let time = module(&registry, "time");
    let duration = type_id(&registry, "time", "Duration");

    let second =
        update_modules(&registry, &frontend, &LoadConfig::for_modules([TESTCASES])).unwrap();
    assert!(!second.resolved.contains(&"time".to_string()));
    assert_eq!(second.resolved.last().map(String::as_str), Some(TESTCASES));
    for path in [IMPORTED, "context", "errors", "io", "strconv", "testing"] {
        assert!(second.resolved.contains(&path.to_string()), "{path}");
    }
    assert!(Arc::ptr_eq(&time, &module(&registry, "time")));
    assert_eq!(type_id(&registry, "time", "Duration"), duration);
    assert_eq!(field_type(&registry, TESTCASES, "Foo", "Duration"), duration);

    let store_len = registry.store().len();
    let third =
        update_modules(&registry, &frontend, &LoadConfig::for_modules([TESTCASES])).unwrap();
    assert!(third.resolved.is_empty());
    assert_eq!(registry.store().len(), store_len);
}

#[test]
fn test_modules_resolve_fewest_imports_first() {
    init_tracing();
    let registry = Registry::new();
    let report =
        update_modules(&registry, &testcases_frontend(), &LoadConfig::for_modules([TESTCASES]))
            .unwrap();

    let position = |path: &str| {
        report
            .resolved
            .iter()
            .position(|resolved| resolved == path)
            .unwrap()
    };
    assert!(position(IMPORTED) < position(TESTCASES));
    assert!(position("time") < position(TESTCASES));
    assert_eq!(report.resolved.len(), 8);
}

#[test]
fn test_empty_request_loads_everything() {
    init_tracing();
    let registry = load_modules(&graph_frontend(), &LoadConfig::default()).unwrap();

    let paths: Vec<String> = registry
        .modules()
        .iter()
        .map(|module| module.path().to_string())
        .collect();
    assert_eq!(
        paths,
        vec![
            "builtin".to_string(),
            GRAPH_A.to_string(),
            GRAPH_B.to_string(),
            "unsafe".to_string()
        ]
    );
}

#[test]
fn test_single_worker_session() {
    init_tracing();
    let config = LoadConfig {
        threads: Some(1),
        ..LoadConfig::for_modules([CYCLE_LEFT])
    };
    let registry = load_modules(&cycle_frontend(), &config).unwrap();

    assert!(registry.contains(CYCLE_RIGHT));
    assert!(registry.implements(
        type_id(&registry, CYCLE_RIGHT, "Walker"),
        type_id(&registry, CYCLE_LEFT, "Visitor")
    ));
}

#[test]
fn test_config_file_drives_session() {
    init_tracing();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "modules = [\"{GRAPH_B}\"]\nverbose = true\nthreads = 2\nmax-alias-passes = 4"
    )
    .unwrap();

    let config = LoadConfig::from_path(file.path()).unwrap();
    assert_eq!(config.max_alias_passes, 4);
    let registry = load_modules(&graph_frontend(), &config).unwrap();
    assert!(registry.contains(GRAPH_A));
}

#[test]
fn test_module_errors_abort_before_registration() {
    init_tracing();
    let frontend = FixtureFrontend::new()
        .file("example.com/good", "good.go", "package good\n\ntype Good int\n")
        .file(
            "example.com/bad",
            "bad.go",
            "package bad\n\nimport \"example.com/good\"\n\ntype Bad struct {\n\tG good.Good\n\tM Missing\n}\n",
        );
    let registry = Registry::new();

    let err = update_modules(&registry, &frontend, &LoadConfig::for_modules(["example.com/bad"]))
        .unwrap_err();
    assert!(
        matches!(&err, LoadError::ModuleErrors { module, errors }
            if module == "example.com/bad" && errors.contains("undefined: Missing")),
        "{err}"
    );
    assert!(!registry.contains("example.com/good"));
    assert!(!registry.contains("example.com/bad"));
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_missing_import_names_the_importer() {
    init_tracing();
    let mut app = LoadedModule::new("example.com/app", "app");
    app.imports.push("example.com/nowhere".to_string());
    let frontend = StaticFrontend::from_modules([app]);

    let err = load_modules(&frontend, &LoadConfig::for_modules(["example.com/app"])).unwrap_err();
    assert!(
        matches!(&err, LoadError::MissingImport { module, import }
            if module == "example.com/app" && import == "example.com/nowhere"),
        "{err}"
    );
}

#[test]
fn test_unknown_module_is_a_frontend_error() {
    init_tracing();
    let err = load_modules(&graph_frontend(), &LoadConfig::for_modules(["example.com/zzz"]))
        .unwrap_err();

    assert!(matches!(
        err,
        LoadError::Frontend(FrontendError::ModuleNotFound(path)) if path == "example.com/zzz"
    ));
}

#[test]
fn test_registries_are_independent() {
    let one = load(&graph_frontend(), &[GRAPH_A]);
    let two = load(&graph_frontend(), &[GRAPH_A]);

    assert!(!Arc::ptr_eq(&module(&one, GRAPH_A), &module(&two, GRAPH_A)));
    let node = type_id(&two, GRAPH_A, "Node");
    assert_eq!(
        two.record(node).unwrap().field("Next").unwrap().ty,
        two.pointer_to(node)
    );
}

/// `m/x` declares `type R struct { F int }`; the root importing it lives at
/// `root`.
fn rooted_frontend(root: &str) -> StaticFrontend {
    let mut x = LoadedModule::new("m/x", "x");
    x.scope.objects.insert(
        "R".to_string(),
        SemanticObject::TypeName {
            ty: SemanticType::named("m/x", "R"),
            alias: false,
        },
    );
    x.scope.named.insert(
        "R".to_string(),
        NamedInfo {
            underlying: SemanticType::Struct(StructType {
                fields: vec![StructField {
                    name: "F".to_string(),
                    ty: SemanticType::Basic(BasicKind::Int),
                    tag: None,
                    embedded: false,
                }],
            }),
            methods: Vec::new(),
        },
    );
    let mut app = LoadedModule::new(root, "app");
    app.imports.push("m/x".to_string());
    StaticFrontend::from_modules([app, x])
}

#[test]
fn test_failed_registration_leaves_nothing_behind() {
    init_tracing();
    let registry = Registry::new();

    let err = update_modules(&registry, &rooted_frontend(""), &LoadConfig::for_modules([""]))
        .unwrap_err();
    assert!(
        matches!(err, LoadError::Registry(RegistryError::EmptyPath)),
        "{err}"
    );
    assert!(!registry.contains("m/x"));
    assert_eq!(registry.len(), 2);

    let report = update_modules(
        &registry,
        &rooted_frontend("m/app"),
        &LoadConfig::for_modules(["m/app"]),
    )
    .unwrap();
    assert_eq!(report.resolved, vec!["m/x".to_string(), "m/app".to_string()]);
    let record = module(&registry, "m/x").get_record("R").unwrap();
    assert_eq!(record.fields.len(), 1);
    assert_eq!(record.field("F").unwrap().ty, typegraph::TypeId::INT);
}

#[test]
fn test_zero_alias_passes_are_rejected() {
    let config = LoadConfig {
        max_alias_passes: 0,
        ..LoadConfig::for_modules([GRAPH_A])
    };
    let registry = Registry::new();

    let err = update_modules(&registry, &graph_frontend(), &config).unwrap_err();
    assert!(matches!(err, LoadError::Config(ConfigError::Invalid(_))), "{err}");
    assert!(!registry.contains(GRAPH_A));
}
