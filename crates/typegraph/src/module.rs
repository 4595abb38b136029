use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use typegraph_frontend::{ConstValue, BUILTIN_MODULE, UNSAFE_MODULE};

use crate::error::RegistryError;
use crate::store::TypeStore;
use crate::types::{AliasType, FunctionType, InterfaceType, RecordType, TypeData, TypeId};

/// A constant or variable declared at module level.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub module: String,
    /// Identifier of `module`, used when rendering.
    pub identifier: String,
    pub name: String,
    pub comment: Option<String>,
    pub ty: TypeId,
    pub constant: bool,
    /// The checker's value for constants.
    pub value: Option<ConstValue>,
}

impl std::fmt::Display for Declaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.value, self.constant) {
            (Some(value), true) => write!(f, "const {}.{}({value})", self.identifier, self.name),
            (None, true) => write!(f, "const {}.{}", self.identifier, self.name),
            (_, false) => write!(f, "var {}.{}", self.identifier, self.name),
        }
    }
}

#[derive(Debug, Default)]
struct ModuleTable {
    types: IndexMap<String, TypeId>,
    records: Vec<TypeId>,
    interfaces: Vec<TypeId>,
    functions: Vec<TypeId>,
    aliases: Vec<TypeId>,
    declarations: IndexMap<String, Declaration>,
}

/// A resolved source module.
///
/// The table is written by the worker resolving this module and may be read
/// concurrently by workers resolving modules that import it.
#[derive(Debug)]
pub struct Module {
    path: String,
    identifier: String,
    store: Arc<TypeStore>,
    table: RwLock<ModuleTable>,
}

impl Module {
    pub(crate) fn new(path: String, identifier: String, store: Arc<TypeStore>) -> Self {
        Self {
            path,
            identifier,
            store,
            table: RwLock::new(ModuleTable::default()),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Short name used to qualify this module's types.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn is_builtin(&self) -> bool {
        self.path == BUILTIN_MODULE || self.path == UNSAFE_MODULE
    }

    /// `identifier.name`, or just `name` for predeclared types.
    pub fn fully_qualified(&self, name: &str) -> String {
        if self.path == BUILTIN_MODULE {
            name.to_string()
        } else {
            format!("{}.{name}", self.identifier)
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ModuleTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ModuleTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_type(&self, name: &str) -> Option<TypeId> {
        self.read().types.get(name).copied()
    }

    pub fn get_record(&self, name: &str) -> Option<Arc<RecordType>> {
        match self.store.get(self.get_type(name)?) {
            TypeData::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn get_interface(&self, name: &str) -> Option<Arc<InterfaceType>> {
        match self.store.get(self.get_type(name)?) {
            TypeData::Interface(interface) => Some(interface),
            _ => None,
        }
    }

    pub fn get_function(&self, name: &str) -> Option<Arc<FunctionType>> {
        match self.store.get(self.get_type(name)?) {
            TypeData::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn get_alias(&self, name: &str) -> Option<Arc<AliasType>> {
        match self.store.get(self.get_type(name)?) {
            TypeData::Alias(alias) => Some(alias),
            _ => None,
        }
    }

    /// Declared type names in declaration order.
    pub fn type_names(&self) -> Vec<String> {
        self.read().types.keys().cloned().collect()
    }

    pub fn records(&self) -> Vec<TypeId> {
        self.read().records.clone()
    }

    pub fn interfaces(&self) -> Vec<TypeId> {
        self.read().interfaces.clone()
    }

    pub fn functions(&self) -> Vec<TypeId> {
        self.read().functions.clone()
    }

    pub fn aliases(&self) -> Vec<TypeId> {
        self.read().aliases.clone()
    }

    pub fn declaration(&self, name: &str) -> Option<Declaration> {
        self.read().declarations.get(name).cloned()
    }

    pub fn declarations(&self) -> Vec<Declaration> {
        self.read().declarations.values().cloned().collect()
    }

    /// Registers a named node under `name`.
    pub fn new_named_type(&self, name: &str, id: TypeId) -> Result<(), RegistryError> {
        let data = self.store.get(id);
        let mut table = self.write();
        if table.types.contains_key(name) {
            return Err(RegistryError::DuplicateName {
                module: self.path.clone(),
                name: name.to_string(),
            });
        }
        table.types.insert(name.to_string(), id);
        match data {
            TypeData::Record(_) => table.records.push(id),
            TypeData::Interface(_) => table.interfaces.push(id),
            TypeData::Function(_) => table.functions.push(id),
            TypeData::Alias(_) => table.aliases.push(id),
            _ => {}
        }
        Ok(())
    }

    /// Declares `type name target` in this module.
    pub fn define_alias(&self, name: &str, target: TypeId) -> Result<TypeId, RegistryError> {
        let id = self.store.alloc(|id| {
            TypeData::Alias(Arc::new(AliasType {
                id,
                module: self.path.clone(),
                name: name.to_string(),
                comment: None,
                target: Some(target),
                methods: Vec::new(),
                transparent: false,
            }))
        });
        self.new_named_type(name, id)?;
        Ok(id)
    }

    pub fn new_constant(
        &self,
        name: &str,
        ty: TypeId,
        value: ConstValue,
    ) -> Result<(), RegistryError> {
        self.insert_declaration(Declaration {
            module: self.path.clone(),
            identifier: self.identifier.clone(),
            name: name.to_string(),
            comment: None,
            ty,
            constant: true,
            value: Some(value),
        })
    }

    pub fn new_variable(&self, name: &str, ty: TypeId) -> Result<(), RegistryError> {
        self.insert_declaration(Declaration {
            module: self.path.clone(),
            identifier: self.identifier.clone(),
            name: name.to_string(),
            comment: None,
            ty,
            constant: false,
            value: None,
        })
    }

    pub(crate) fn insert_declaration(&self, declaration: Declaration) -> Result<(), RegistryError> {
        let mut table = self.write();
        if table.declarations.contains_key(&declaration.name) {
            return Err(RegistryError::DuplicateName {
                module: self.path.clone(),
                name: declaration.name,
            });
        }
        table
            .declarations
            .insert(declaration.name.clone(), declaration);
        Ok(())
    }

    pub(crate) fn set_declaration_comment(&self, name: &str, comment: &str) -> bool {
        match self.write().declarations.get_mut(name) {
            Some(declaration) => {
                declaration.comment = Some(comment.to_string());
                true
            }
            None => false,
        }
    }
}
