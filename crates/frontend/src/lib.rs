//! Boundary between a language front-end and the type-graph resolver.
//!
//! A front-end parses and checks source modules; this crate fixes the shape of
//! what it hands over: per module a [`semantic::SemanticScope`], the
//! [`syntax::SyntaxFile`]s it was checked from, and the direct import list.

pub mod semantic;
pub mod syntax;

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use semantic::{
    BasicKind, ChanFlags, ConstValue, NamedInfo, NamedRef, SemanticObject, SemanticScope,
    SemanticType, BUILTIN_MODULE, UNSAFE_MODULE,
};
pub use syntax::SyntaxFile;

#[derive(Debug, thiserror::Error)]
pub enum FrontendError {
    #[error("module not found: {0}")]
    ModuleNotFound(String),
    #[error("{file}: syntax error: {message}")]
    Syntax { file: String, message: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid program dump: {0}")]
    Decode(String),
}

/// A checked module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedModule {
    pub path: String,
    /// Package name used to qualify the module's types.
    pub name: String,
    /// Direct imports by module path.
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub scope: SemanticScope,
    #[serde(default)]
    pub files: Vec<SyntaxFile>,
    /// Problems reported while loading; any entry aborts resolution.
    #[serde(default)]
    pub errors: Vec<String>,
}

impl LoadedModule {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            imports: Vec::new(),
            scope: SemanticScope::default(),
            files: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Everything a front-end produced for one load request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadedProgram {
    /// Paths of the modules that were requested.
    pub roots: Vec<String>,
    /// Requested modules and their transitive imports, keyed by path.
    pub modules: IndexMap<String, LoadedModule>,
}

impl LoadedProgram {
    pub fn module(&self, path: &str) -> Option<&LoadedModule> {
        self.modules.get(path)
    }
}

/// A source of checked modules.
pub trait Frontend: Sync {
    /// Loads the requested modules (by path) and everything they import.
    /// An empty request loads every module the front-end knows about.
    fn load(&self, requested: &[String]) -> Result<LoadedProgram, FrontendError>;
}

/// Serves a program that was checked ahead of time.
#[derive(Debug, Clone, Default)]
pub struct StaticFrontend {
    program: LoadedProgram,
}

impl StaticFrontend {
    pub fn new(program: LoadedProgram) -> Self {
        Self { program }
    }

    pub fn from_modules(modules: impl IntoIterator<Item = LoadedModule>) -> Self {
        let modules: IndexMap<_, _> = modules
            .into_iter()
            .map(|module| (module.path.clone(), module))
            .collect();
        Self::new(LoadedProgram {
            roots: modules.keys().cloned().collect(),
            modules,
        })
    }

    pub fn from_json(content: &str) -> Result<Self, FrontendError> {
        let program =
            serde_json::from_str(content).map_err(|e| FrontendError::Decode(e.to_string()))?;
        Ok(Self::new(program))
    }

    pub fn from_path(path: &Path) -> Result<Self, FrontendError> {
        let content = std::fs::read_to_string(path).map_err(|source| FrontendError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn program(&self) -> &LoadedProgram {
        &self.program
    }
}

impl Frontend for StaticFrontend {
    fn load(&self, requested: &[String]) -> Result<LoadedProgram, FrontendError> {
        let roots: Vec<String> = if requested.is_empty() {
            self.program.roots.clone()
        } else {
            requested.to_vec()
        };

        let mut modules = IndexMap::new();
        let mut stack: Vec<&str> = roots.iter().map(String::as_str).collect();
        while let Some(path) = stack.pop() {
            if modules.contains_key(path) {
                continue;
            }
            let Some(module) = self.program.modules.get(path) else {
                if roots.iter().any(|root| root == path) {
                    return Err(FrontendError::ModuleNotFound(path.to_string()));
                }
                // Imports outside the dump are reported by the collector.
                continue;
            };
            stack.extend(module.imports.iter().map(String::as_str));
            modules.insert(path.to_string(), module.clone());
        }

        Ok(LoadedProgram { roots, modules })
    }
}
