//! # typegraph
//!
//! Builds a reflection-style graph of the types declared by a set of modules:
//! records, interfaces, functions and aliases, wired to each other by
//! [`TypeId`] so that cycles (a record pointing at itself, interfaces of two
//! modules referring to each other) are plain data.
//!
//! ## Architecture
//!
//! - [`TypeStore`]: arena of type nodes. Named and anonymous bodies are
//!   allocated; pointers, arrays, maps and channels are interned.
//! - [`Registry`]: the store plus every resolved [`Module`], keyed by path.
//! - [`load_modules`] / [`update_modules`]: resolution sessions fed by a
//!   [`typegraph_frontend::Frontend`].
//!
//! ## Queries
//!
//! Resolved modules are read through [`Registry::read`] and
//! [`Module::get_type`] and friends; [`Registry::implements`] and
//! [`Registry::type_of`] answer questions about the graph.

mod builtins;
mod collector;
mod config;
mod describe;
mod error;
mod implements;
mod module;
mod registry;
mod resolver;
mod session;
mod store;
mod type_of;
pub mod types;

pub use builtins::{builtin_type, lookup as lookup_builtin};
pub use config::LoadConfig;
pub use error::{ConfigError, LoadError, RegistryError, TypeGraphError};
pub use module::{Declaration, Module};
pub use registry::Registry;
pub use session::{load_modules, update_modules, SessionReport};
pub use store::TypeStore;
pub use types::{Kind, TypeData, TypeId};
