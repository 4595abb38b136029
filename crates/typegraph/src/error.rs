use std::path::PathBuf;

use typegraph_frontend::FrontendError;

#[derive(Debug, thiserror::Error)]
pub enum TypeGraphError {
    #[error("unknown builtin type: {0}")]
    UnknownBuiltin(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("module {path} is already registered")]
    DuplicateModule { path: String },
    #[error("type {name} is already declared in module {module}")]
    DuplicateName { module: String, name: String },
    #[error("module path must not be empty")]
    EmptyPath,
}

/// Failures that abort a resolution session.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("front-end failed to load modules: {0}")]
    Frontend(#[from] FrontendError),
    #[error("module {module} failed to load: {errors}")]
    ModuleErrors { module: String, errors: String },
    #[error("module {module} imports {import}, which the front-end did not provide")]
    MissingImport { module: String, import: String },
    #[error("no modules were loaded")]
    NoModules,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
