//! Common test utilities for type-graph resolution tests
//!
//! This module contains all shared test infrastructure including:
//! - Fixture front-ends over `test_data/`
//! - Session helpers that load a registry and fail loudly
//! - Lookups of declared types by module path and name

use std::sync::Arc;

use typegraph::{load_modules, LoadConfig, Module, Registry, TypeId};
pub use typegraph_test_utils::{init_tracing, FixtureFrontend};

// ===== Module Paths =====

pub const TESTCASES: &str = "example.com/testcases";
pub const IMPORTED: &str = "example.com/testcases/imported";
pub const GRAPH_A: &str = "example.com/graph/a";
pub const GRAPH_B: &str = "example.com/graph/b";
pub const CYCLE_LEFT: &str = "example.com/cycle/left";
pub const CYCLE_RIGHT: &str = "example.com/cycle/right";

// ===== Front-ends =====

/// The trimmed standard library every fixture may import.
pub fn std_frontend() -> FixtureFrontend {
    FixtureFrontend::new().with_fixture_dir("std", "")
}

/// `example.com/testcases` and its imports.
pub fn testcases_frontend() -> FixtureFrontend {
    std_frontend().with_fixture_dir("testcases", TESTCASES)
}

/// Two modules whose records point at each other.
pub fn graph_frontend() -> FixtureFrontend {
    FixtureFrontend::new().with_fixture_dir("graph", "example.com/graph")
}

/// Two modules whose interfaces mention each other.
pub fn cycle_frontend() -> FixtureFrontend {
    FixtureFrontend::new().with_fixture_dir("cycle", "example.com/cycle")
}

// ===== Sessions =====

/// Loads `modules` into a fresh registry, panicking on any session error.
pub fn load(frontend: &FixtureFrontend, modules: &[&str]) -> Registry {
    init_tracing();
    let config = LoadConfig::for_modules(modules.iter().copied());
    match load_modules(frontend, &config) {
        Ok(registry) => registry,
        Err(err) => panic!("loading {modules:?} failed: {err}"),
    }
}

/// The testcases fixture, loaded once per test.
pub fn testcases() -> Registry {
    load(&testcases_frontend(), &[TESTCASES])
}

// ===== Lookups =====

pub fn module(registry: &Registry, path: &str) -> Arc<Module> {
    registry
        .read(path)
        .unwrap_or_else(|| panic!("module {path} is not registered"))
}

/// Id of the type `name` declared in `path`.
pub fn type_id(registry: &Registry, path: &str, name: &str) -> TypeId {
    module(registry, path)
        .get_type(name)
        .unwrap_or_else(|| panic!("{path} declares no type {name}"))
}

/// Type of the field `field` of the record `path.name`.
pub fn field_type(registry: &Registry, path: &str, name: &str, field: &str) -> TypeId {
    let record = module(registry, path)
        .get_record(name)
        .unwrap_or_else(|| panic!("{path}.{name} is not a record"));
    record
        .field(field)
        .unwrap_or_else(|| panic!("{path}.{name} has no field {field}"))
        .ty
}
