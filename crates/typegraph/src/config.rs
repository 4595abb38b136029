use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Options of a resolution session, usually read from `typegraph.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadConfig {
    /// Module paths to load; empty loads everything the front-end offers.
    #[serde(default)]
    pub modules: Vec<String>,
    /// Report soft failures (skipped fields, methods, declarations) as warnings.
    #[serde(default)]
    pub verbose: bool,
    /// Worker threads; rayon's default when unset.
    #[serde(default)]
    pub threads: Option<usize>,
    /// Upper bound on alias-recovery passes per module.
    #[serde(rename = "max-alias-passes", default = "default_max_alias_passes")]
    pub max_alias_passes: usize,
}

const fn default_max_alias_passes() -> usize {
    16
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            modules: Vec::new(),
            verbose: false,
            threads: None,
            max_alias_passes: default_max_alias_passes(),
        }
    }
}

impl LoadConfig {
    pub fn for_modules<I, S>(modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            modules: modules.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Load config from a file path
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| {
            tracing::error!("Failed to parse TOML: {}", e);
            e
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects option values no session can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_alias_passes == 0 {
            return Err(ConfigError::Invalid(
                "max-alias-passes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
