#![allow(clippy::option_if_let_else)]

//! Test support for the typegraph workspace.
//!
//! - [`FixtureFrontend`]: a [`Frontend`] that parses and checks Go-like
//!   fixture sources, either inline or from `test_data/`.
//! - Fixture paths and readers rooted at the workspace's `test_data/`.
//! - [`init_tracing`] for tests that want to see the resolver's logs.

mod checker;
pub mod lexer;
pub mod parser;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;
use typegraph_frontend::{Frontend, FrontendError, LoadedModule, LoadedProgram, StaticFrontend};

use crate::checker::Checker;
pub use crate::parser::{parse_file, ParseError};

pub(crate) static WORKSPACE_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    let mut current = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    loop {
        if current.join("Cargo.toml").exists() {
            let cargo_toml = std::fs::read_to_string(current.join("Cargo.toml"))
                .expect("Failed to read Cargo.toml");
            if cargo_toml.contains("[workspace]") {
                return current;
            }
        }

        current = current
            .parent()
            .expect("Could not find workspace root")
            .to_path_buf();
    }
});

pub fn test_data_path() -> PathBuf {
    WORKSPACE_ROOT.join("test_data")
}

/// Get the path to a test fixture file relative to the test_data directory
///
/// ## Arguments
/// * `name` - The relative path to the fixture file (e.g., "graph/a/a.go")
pub fn fixture_path(name: &str) -> PathBuf {
    test_data_path().join(name)
}

/// Read the contents of a test fixture file
pub fn read_fixture(name: &str) -> String {
    let path = fixture_path(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture '{}': {}", path.display(), e))
}

/// Installs a `fmt` subscriber filtered by `RUST_LOG`. Safe to call from
/// every test.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok(); // Ignore if already initialized
}

/// Source files of one fixture module.
#[derive(Debug, Clone, Default)]
struct SourceModule {
    files: Vec<(String, String)>,
}

/// A front-end over fixture sources.
///
/// ```ignore
/// let frontend = FixtureFrontend::new()
///     .with_fixture_dir("std", "")
///     .file("example.com/a", "a.go", "package a\n\ntype A struct{}\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct FixtureFrontend {
    modules: IndexMap<String, SourceModule>,
}

impl FixtureFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source file to the module at `module`.
    pub fn file(mut self, module: &str, name: &str, source: &str) -> Self {
        self.modules
            .entry(module.to_string())
            .or_default()
            .files
            .push((name.to_string(), source.to_string()));
        self
    }

    /// Adds every directory under `test_data/<subdir>` holding `.go` files as
    /// a module. The module path is `prefix` joined with the directory's path
    /// relative to `subdir`.
    pub fn with_fixture_dir(mut self, subdir: &str, prefix: &str) -> Self {
        let root = fixture_path(subdir);
        let mut dirs = Vec::new();
        collect_dirs(&root, &mut dirs);
        dirs.sort();

        for dir in dirs {
            let relative = dir
                .strip_prefix(&root)
                .map(|relative| relative.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            let module = match (prefix.is_empty(), relative.is_empty()) {
                (_, true) => prefix.to_string(),
                (true, false) => relative,
                (false, false) => format!("{prefix}/{relative}"),
            };

            let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)
                .unwrap_or_else(|e| panic!("Failed to read directory '{}': {}", dir.display(), e))
                .filter_map(|entry| entry.ok().map(|entry| entry.path()))
                .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("go"))
                .collect();
            files.sort();
            for path in files {
                let source = std::fs::read_to_string(&path)
                    .unwrap_or_else(|e| panic!("Failed to read fixture '{}': {}", path.display(), e));
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self = self.file(&module, &name, &source);
            }
        }
        self
    }

    /// Parses and checks every module.
    pub fn program(&self) -> LoadedProgram {
        let mut parsed: IndexMap<String, Vec<_>> = IndexMap::new();
        let mut parse_errors: IndexMap<String, Vec<String>> = IndexMap::new();
        for (path, module) in &self.modules {
            let files = parsed.entry(path.clone()).or_default();
            for (name, source) in &module.files {
                match parse_file(name, source) {
                    Ok(file) => files.push(file),
                    Err(err) => parse_errors
                        .entry(path.clone())
                        .or_default()
                        .push(format!("{name}: {err}")),
                }
            }
        }

        let mut checker = Checker::new(&parsed);
        let modules: IndexMap<String, LoadedModule> = parsed
            .iter()
            .map(|(path, files)| {
                let mut module = checker.check(path, files);
                if let Some(errors) = parse_errors.get(path) {
                    module.errors.splice(0..0, errors.iter().cloned());
                }
                if module.name.is_empty() {
                    module.name = path.rsplit('/').next().unwrap_or(path).to_string();
                }
                (path.clone(), module)
            })
            .collect();

        LoadedProgram {
            roots: modules.keys().cloned().collect(),
            modules,
        }
    }
}

fn collect_dirs(dir: &Path, dirs: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    let mut has_sources = false;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_dirs(&path, dirs);
        } else if path.extension().and_then(|ext| ext.to_str()) == Some("go") {
            has_sources = true;
        }
    }
    if has_sources {
        dirs.push(dir.to_path_buf());
    }
}

impl Frontend for FixtureFrontend {
    fn load(&self, requested: &[String]) -> Result<LoadedProgram, FrontendError> {
        StaticFrontend::new(self.program()).load(requested)
    }
}
