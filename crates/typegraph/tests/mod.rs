//! # Type Graph Tests
//!
//! End-to-end tests that load fixture modules through a front-end and query the
//! resulting registry.
//!
//! ## Test Organization
//!
//! - `identity/` - One id per declared type, however it is reached
//! - `cycles/` - Self references and modules that import each other
//! - `aliases/` - Defined and transparent aliases, recovery from syntax
//! - `models/` - Shape of the `testcases` fixture: fields, tags, declarations
//! - `queries/` - `type_of`, `implements`, zero values and spelling
//! - `comments/` - Documentation attached to types, fields and methods
//! - `sessions/` - Incremental sessions, configuration and load failures
//!
//! ## Test Utilities
//!
//! Fixture front-ends and lookups live in `common/`:
//! - `load(frontend, modules)` - Resolve modules into a fresh registry
//! - `type_id(registry, path, name)` - Id of a declared type
//! - `assert_kind!(registry, id, kind)` - Assert the kind of a node

pub mod common;
pub use common::*;

/// Asserts the kind of a node, naming the node on failure.
#[macro_export]
macro_rules! assert_kind {
    ($registry:expr, $id:expr, $kind:expr) => {{
        let registry: &typegraph::Registry = &$registry;
        let id: typegraph::TypeId = $id;
        assert_eq!(
            registry.kind(id),
            $kind,
            "kind of {}",
            registry.name_of(id, true, None)
        );
    }};
}

mod aliases;
mod comments;
mod cycles;
mod identity;
mod queries;
mod sessions;
