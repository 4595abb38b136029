//! # Import graph collection
//!
//! Turns a front-end [`LoadedProgram`] into the list of modules a session has
//! to resolve: reachable from the requested roots, not yet in the registry,
//! and ordered by how many modules they transitively import.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;
use typegraph_frontend::{LoadedModule, LoadedProgram};

use crate::error::LoadError;
use crate::registry::Registry;

#[derive(Debug, Clone, Copy)]
pub(crate) struct CollectedModule<'a> {
    pub module: &'a LoadedModule,
    /// Distinct modules reachable through imports, registered ones included.
    pub import_count: usize,
}

/// Collects the new modules of `program`, fewest imports first.
pub(crate) fn collect<'a>(
    registry: &Registry,
    program: &'a LoadedProgram,
) -> Result<Vec<CollectedModule<'a>>, LoadError> {
    let _span = tracing::trace_span!("collect", roots = program.roots.len()).entered();

    let mut order: Vec<&'a LoadedModule> = Vec::new();
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut stack: Vec<&str> = program.roots.iter().rev().map(String::as_str).collect();

    while let Some(path) = stack.pop() {
        if !seen.insert(path) || registry.contains(path) {
            continue;
        }
        let Some(module) = program.module(path) else {
            // Roots were checked by the front-end; this is an import.
            let importer = order
                .iter()
                .find(|module| module.imports.iter().any(|import| import == path))
                .map_or_else(String::new, |module| module.path.clone());
            return Err(LoadError::MissingImport {
                module: importer,
                import: path.to_string(),
            });
        };
        if !module.errors.is_empty() {
            return Err(LoadError::ModuleErrors {
                module: module.path.clone(),
                errors: module.errors.join("; "),
            });
        }
        order.push(module);
        stack.extend(module.imports.iter().rev().map(String::as_str));
    }

    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    let mut collected: Vec<CollectedModule<'a>> = order
        .into_iter()
        .map(|module| CollectedModule {
            module,
            import_count: import_count(program, module, &mut counts),
        })
        .collect();
    collected.sort_by(|a, b| {
        a.import_count
            .cmp(&b.import_count)
            .then_with(|| a.module.path.cmp(&b.module.path))
    });

    trace!(modules = collected.len(), "collected");
    Ok(collected)
}

fn import_count<'a>(
    program: &'a LoadedProgram,
    module: &'a LoadedModule,
    cache: &mut FxHashMap<&'a str, usize>,
) -> usize {
    if let Some(count) = cache.get(module.path.as_str()) {
        return *count;
    }

    // Import cycles are not legal, but the walk must still end on them.
    let mut reached: FxHashSet<&str> = FxHashSet::default();
    let mut stack: Vec<&str> = module.imports.iter().map(String::as_str).collect();
    while let Some(path) = stack.pop() {
        if path == module.path || !reached.insert(path) {
            continue;
        }
        if let Some(imported) = program.module(path) {
            stack.extend(imported.imports.iter().map(String::as_str));
        }
    }

    let count = reached.len();
    cache.insert(module.path.as_str(), count);
    count
}
