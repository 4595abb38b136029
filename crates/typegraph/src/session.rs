//! # Resolution sessions
//!
//! A session takes the modules a front-end loaded and adds them to a
//! [`Registry`]:
//!
//! 1. requested modules already registered are dropped before the front-end
//!    is asked for anything;
//! 2. the import graph is collected ([`crate::collector`]);
//! 3. every new module is scaffolded in parallel;
//! 4. once *all* scaffolds are done, every module is registered;
//! 5. every module is resolved in parallel.
//!
//! Step 4 is the scaffold barrier: a resolver may look up any placeholder of
//! the session, in any module, without waiting on another worker. Modules that
//! were registered by an earlier session are never resolved again.

use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::info;
use typegraph_frontend::Frontend;

use crate::collector::collect;
use crate::config::LoadConfig;
use crate::error::{LoadError, RegistryError};
use crate::registry::Registry;
use crate::resolver::{ModuleResolver, ResolveOptions};

/// Outcome of [`update_modules`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// Paths of the modules resolved by this session, fewest imports first.
    pub resolved: Vec<String>,
    pub elapsed: Duration,
}

/// Registers every scaffolded module of a session, or none of them.
fn register(registry: &Registry, resolvers: &[ModuleResolver<'_>]) -> Result<(), RegistryError> {
    for resolver in resolvers {
        let path = resolver.module().path();
        if path.is_empty() {
            return Err(RegistryError::EmptyPath);
        }
        if registry.contains(path) {
            return Err(RegistryError::DuplicateModule {
                path: path.to_string(),
            });
        }
    }

    for (written, resolver) in resolvers.iter().enumerate() {
        if let Err(err) = registry.write(resolver.module().clone()) {
            for resolver in &resolvers[..written] {
                registry.unregister(resolver.module());
            }
            return Err(err);
        }
    }
    Ok(())
}

/// Resolves the configured modules into a fresh registry.
pub fn load_modules<F: Frontend + ?Sized>(
    frontend: &F,
    config: &LoadConfig,
) -> Result<Registry, LoadError> {
    let registry = Registry::new();
    let report = update_modules(&registry, frontend, config)?;
    if report.resolved.is_empty() {
        return Err(LoadError::NoModules);
    }
    Ok(registry)
}

/// Adds the configured modules, and whatever they import, to `registry`.
pub fn update_modules<F: Frontend + ?Sized>(
    registry: &Registry,
    frontend: &F,
    config: &LoadConfig,
) -> Result<SessionReport, LoadError> {
    let start = Instant::now();
    let _span = tracing::info_span!("update_modules").entered();
    config.validate()?;

    let requested: Vec<String> = config
        .modules
        .iter()
        .filter(|path| !registry.contains(path))
        .cloned()
        .collect();
    if !config.modules.is_empty() && requested.is_empty() {
        info!("all requested modules are already resolved");
        return Ok(SessionReport {
            resolved: Vec::new(),
            elapsed: start.elapsed(),
        });
    }

    let program = frontend.load(&requested)?;
    let collected = collect(registry, &program)?;
    if collected.is_empty() {
        info!("nothing new to resolve");
        return Ok(SessionReport {
            resolved: Vec::new(),
            elapsed: start.elapsed(),
        });
    }

    let options = ResolveOptions {
        verbose: config.verbose,
        max_alias_passes: config.max_alias_passes,
    };
    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = config.threads {
        pool = pool.num_threads(threads);
    }
    let pool = pool.build()?;

    let resolved = pool.install(|| -> Result<Vec<String>, LoadError> {
        let resolvers = collected
            .par_iter()
            .map(|collected| ModuleResolver::scaffold(registry, collected.module, options))
            .collect::<Result<Vec<_>, RegistryError>>()?;

        // Scaffold barrier.
        register(registry, &resolvers)?;

        let resolved = resolvers
            .iter()
            .map(|resolver| resolver.module().path().to_string())
            .collect();
        resolvers.into_par_iter().for_each(ModuleResolver::resolve);
        Ok(resolved)
    })?;

    let elapsed = start.elapsed();
    info!(
        modules = resolved.len(),
        types = registry.store().len(),
        "resolved in {:?}",
        elapsed
    );
    Ok(SessionReport { resolved, elapsed })
}
