//! Predeclared types shared by every registry.

use std::sync::Arc;

use typegraph_frontend::{BUILTIN_MODULE, UNSAFE_MODULE};

use crate::error::TypeGraphError;
use crate::types::{BuiltInKind, FunctionType, InterfaceType, Param, TypeData, TypeId};

/// Nodes occupying the reserved ids, in id order.
pub(crate) fn reserved_nodes() -> Vec<TypeData> {
    let mut nodes: Vec<TypeData> = BuiltInKind::ALL.into_iter().map(TypeData::BuiltIn).collect();
    nodes.push(TypeData::Interface(Arc::new(InterfaceType {
        id: TypeId::ERROR,
        module: BUILTIN_MODULE.to_string(),
        name: Some("error".to_string()),
        comment: None,
        methods: vec![TypeId::ERROR_METHOD],
    })));
    nodes.push(TypeData::Function(Arc::new(FunctionType {
        id: TypeId::ERROR_METHOD,
        module: BUILTIN_MODULE.to_string(),
        name: Some("Error".to_string()),
        comment: None,
        receiver: None,
        params: Vec::new(),
        results: vec![Param {
            name: String::new(),
            ty: TypeId::STRING,
        }],
        variadic: false,
    })));
    nodes.push(TypeData::Interface(Arc::new(InterfaceType {
        id: TypeId::EMPTY_INTERFACE,
        module: BUILTIN_MODULE.to_string(),
        name: None,
        comment: None,
        methods: Vec::new(),
    })));
    nodes
}

/// Names of the `builtin` module's table.
pub(crate) fn builtin_names() -> impl Iterator<Item = (&'static str, TypeId)> {
    BuiltInKind::ALL
        .into_iter()
        .filter(|kind| !matches!(kind, BuiltInKind::UnsafePointer | BuiltInKind::Invalid))
        .map(|kind| (kind.name(), TypeId::of_builtin(kind)))
        .chain([("error", TypeId::ERROR), ("any", TypeId::EMPTY_INTERFACE)])
}

/// Names of the `unsafe` module's table.
pub(crate) fn unsafe_names() -> impl Iterator<Item = (&'static str, TypeId)> {
    [("Pointer", TypeId::UNSAFE_POINTER)].into_iter()
}

/// Looks up a predeclared type by its source spelling.
pub fn lookup(name: &str) -> Option<TypeId> {
    if let Some(rest) = name.strip_prefix(UNSAFE_MODULE) {
        return match rest {
            ".Pointer" => Some(TypeId::UNSAFE_POINTER),
            _ => None,
        };
    }
    builtin_names().find_map(|(builtin, id)| (builtin == name).then_some(id))
}

/// Like [`lookup`], for callers that consider an unknown name a bug.
pub fn builtin_type(name: &str) -> Result<TypeId, TypeGraphError> {
    lookup(name).ok_or_else(|| TypeGraphError::UnknownBuiltin(name.to_string()))
}
