//! Arena holding every type node of a registry.

use std::sync::{PoisonError, RwLock};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::builtins;
use crate::types::{ArrayKind, ChanDir, TypeData, TypeId};

/// Interning key of the structural wrappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum StructuralKey {
    Pointer(TypeId),
    Array {
        kind: ArrayKind,
        elem: TypeId,
        size: usize,
    },
    Map {
        key: TypeId,
        value: TypeId,
    },
    Channel {
        elem: TypeId,
        dir: ChanDir,
    },
}

impl StructuralKey {
    fn data(self) -> TypeData {
        match self {
            Self::Pointer(elem) => TypeData::Pointer(elem),
            Self::Array { kind, elem, size } => TypeData::Array { kind, elem, size },
            Self::Map { key, value } => TypeData::Map { key, value },
            Self::Channel { elem, dir } => TypeData::Channel { elem, dir },
        }
    }
}

/// Node storage.
///
/// Node bodies are replaced whole under the write lock, so a reader sees
/// either a placeholder or a finished body. Lock order is intern shard, then
/// node vector.
#[derive(Debug)]
pub struct TypeStore {
    nodes: RwLock<Vec<TypeData>>,
    interned: DashMap<StructuralKey, TypeId>,
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeStore {
    /// Creates a store holding only the predeclared types.
    pub fn new() -> Self {
        let nodes = builtins::reserved_nodes();
        debug_assert_eq!(nodes.len(), TypeId::RESERVED);
        Self {
            nodes: RwLock::new(nodes),
            interned: DashMap::new(),
        }
    }

    /// Returns a snapshot of the node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was minted by another store.
    pub fn get(&self, id: TypeId) -> TypeData {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        nodes[id.index()].clone()
    }

    pub fn len(&self) -> usize {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocates a fresh identity. `build` receives the id so self-referencing
    /// payloads can record it.
    pub fn alloc(&self, build: impl FnOnce(TypeId) -> TypeData) -> TypeId {
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        let id = TypeId::from_index(nodes.len());
        nodes.push(build(id));
        id
    }

    /// Replaces the body of an existing node, keeping its identity.
    pub fn replace(&self, id: TypeId, data: TypeData) {
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        nodes[id.index()] = data;
    }

    /// Edits a node in place under the write lock.
    pub fn update<R>(&self, id: TypeId, edit: impl FnOnce(&mut TypeData) -> R) -> R {
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        edit(&mut nodes[id.index()])
    }

    pub fn pointer(&self, elem: TypeId) -> TypeId {
        self.intern(StructuralKey::Pointer(elem))
    }

    pub fn array(&self, kind: ArrayKind, elem: TypeId, size: usize) -> TypeId {
        let size = match kind {
            ArrayKind::Fixed => size,
            ArrayKind::Dynamic => 0,
        };
        self.intern(StructuralKey::Array { kind, elem, size })
    }

    pub fn map(&self, key: TypeId, value: TypeId) -> TypeId {
        self.intern(StructuralKey::Map { key, value })
    }

    pub fn channel(&self, elem: TypeId, dir: ChanDir) -> TypeId {
        self.intern(StructuralKey::Channel { elem, dir })
    }

    fn intern(&self, key: StructuralKey) -> TypeId {
        match self.interned.entry(key) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let id = self.alloc(|_| key.data());
                entry.insert(id);
                id
            }
        }
    }
}
