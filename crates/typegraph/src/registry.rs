//! # Global Registry
//!
//! The registry owns the type store and maps module paths to resolved
//! [`Module`]s. It is the single source of truth for "has this module already
//! been resolved". Registries are independent of each other; only the reserved
//! predeclared ids are common to all of them.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use typegraph_frontend::{BUILTIN_MODULE, UNSAFE_MODULE};

use crate::builtins;
use crate::error::RegistryError;
use crate::module::Module;
use crate::store::TypeStore;
use crate::types::{
    AliasType, ArrayKind, ChanDir, FunctionType, InterfaceType, RecordType, TypeData, TypeId,
};

#[derive(Debug)]
pub struct Registry {
    store: Arc<TypeStore>,
    modules: DashMap<String, Arc<Module>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates a registry holding only the `builtin` and `unsafe` modules.
    pub fn new() -> Self {
        let store = Arc::new(TypeStore::new());
        let modules = DashMap::new();
        for (path, names) in [
            (BUILTIN_MODULE, builtins::builtin_names().collect::<Vec<_>>()),
            (UNSAFE_MODULE, builtins::unsafe_names().collect()),
        ] {
            let module = Module::new(path.to_string(), path.to_string(), Arc::clone(&store));
            for (name, id) in names {
                // Reserved names are distinct by construction.
                let _ = module.new_named_type(name, id);
            }
            modules.insert(path.to_string(), Arc::new(module));
        }
        Self { store, modules }
    }

    pub fn store(&self) -> &Arc<TypeStore> {
        &self.store
    }

    /// The module of predeclared types.
    pub fn builtin(&self) -> Option<Arc<Module>> {
        self.read(BUILTIN_MODULE)
    }

    pub fn read(&self, path: &str) -> Option<Arc<Module>> {
        self.modules.get(path).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.modules.contains_key(path)
    }

    /// Registers a module under its path.
    ///
    /// Writing the same module twice is a no-op; writing a different module
    /// under a taken path fails.
    pub fn write(&self, module: Arc<Module>) -> Result<(), RegistryError> {
        if module.path().is_empty() {
            return Err(RegistryError::EmptyPath);
        }
        match self.modules.entry(module.path().to_string()) {
            Entry::Occupied(existing) if Arc::ptr_eq(existing.get(), &module) => Ok(()),
            Entry::Occupied(existing) => Err(RegistryError::DuplicateModule {
                path: existing.key().clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(module);
                Ok(())
            }
        }
    }

    /// Removes `module` if it is the one registered under its path.
    pub(crate) fn unregister(&self, module: &Arc<Module>) {
        self.modules
            .remove_if(module.path(), |_, registered| Arc::ptr_eq(registered, module));
    }

    /// Creates an unregistered module backed by this registry's store.
    pub fn new_module(&self, path: &str, identifier: &str) -> Arc<Module> {
        Arc::new(Module::new(
            path.to_string(),
            identifier.to_string(),
            Arc::clone(&self.store),
        ))
    }

    /// Finds a module by its short identifier. Ties are broken by path so the
    /// answer does not depend on registration order.
    pub fn module_by_identifier(&self, identifier: &str) -> Option<Arc<Module>> {
        self.modules
            .iter()
            .filter(|entry| entry.value().identifier() == identifier)
            .min_by(|a, b| a.key().cmp(b.key()))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// All modules sorted by path.
    pub fn modules(&self) -> Vec<Arc<Module>> {
        let mut modules: Vec<_> = self
            .modules
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        modules.sort_by(|a, b| a.path().cmp(b.path()));
        modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn get(&self, id: TypeId) -> TypeData {
        self.store.get(id)
    }

    pub fn record(&self, id: TypeId) -> Option<Arc<RecordType>> {
        match self.get(id) {
            TypeData::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn interface(&self, id: TypeId) -> Option<Arc<InterfaceType>> {
        match self.get(id) {
            TypeData::Interface(interface) => Some(interface),
            _ => None,
        }
    }

    pub fn function(&self, id: TypeId) -> Option<Arc<FunctionType>> {
        match self.get(id) {
            TypeData::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn alias(&self, id: TypeId) -> Option<Arc<AliasType>> {
        match self.get(id) {
            TypeData::Alias(alias) => Some(alias),
            _ => None,
        }
    }

    pub fn pointer_to(&self, elem: TypeId) -> TypeId {
        self.store.pointer(elem)
    }

    pub fn slice_of(&self, elem: TypeId) -> TypeId {
        self.store.array(ArrayKind::Dynamic, elem, 0)
    }

    pub fn array_of(&self, elem: TypeId, size: usize) -> TypeId {
        self.store.array(ArrayKind::Fixed, elem, size)
    }

    pub fn map_of(&self, key: TypeId, value: TypeId) -> TypeId {
        self.store.map(key, value)
    }

    pub fn chan_of(&self, elem: TypeId, dir: ChanDir) -> TypeId {
        self.store.channel(elem, dir)
    }
}
