//! Mapping of semantic types onto type nodes.

use std::sync::Arc;

use typegraph_frontend::semantic::{Method, Signature, StructType};
use typegraph_frontend::{BasicKind, ChanFlags, NamedRef, SemanticType, BUILTIN_MODULE};

use super::{ModuleResolver, Placeholder};
use crate::builtins;
use crate::types::{
    AliasType, ArrayKind, ChanDir, Field, FunctionType, InterfaceType, Param, Receiver,
    RecordType, TypeData, TypeId,
};

/// Node of a basic type. Untyped constants take their default type.
pub(super) fn basic(kind: BasicKind) -> Option<TypeId> {
    let id = match kind {
        BasicKind::Bool | BasicKind::UntypedBool => TypeId::BOOL,
        BasicKind::Int | BasicKind::UntypedInt => TypeId::INT,
        BasicKind::Int8 => TypeId::INT8,
        BasicKind::Int16 => TypeId::INT16,
        BasicKind::Int32 => TypeId::INT32,
        BasicKind::Int64 => TypeId::INT64,
        BasicKind::Uint => TypeId::UINT,
        BasicKind::Uint8 => TypeId::UINT8,
        BasicKind::Uint16 => TypeId::UINT16,
        BasicKind::Uint32 => TypeId::UINT32,
        BasicKind::Uint64 => TypeId::UINT64,
        BasicKind::Uintptr => TypeId::UINTPTR,
        BasicKind::Float32 => TypeId::FLOAT32,
        BasicKind::Float64 | BasicKind::UntypedFloat => TypeId::FLOAT64,
        BasicKind::Complex64 => TypeId::COMPLEX64,
        BasicKind::Complex128 | BasicKind::UntypedComplex => TypeId::COMPLEX128,
        BasicKind::String | BasicKind::UntypedString => TypeId::STRING,
        BasicKind::Byte => TypeId::BYTE,
        BasicKind::Rune | BasicKind::UntypedRune => TypeId::RUNE,
        BasicKind::UnsafePointer => TypeId::UNSAFE_POINTER,
        BasicKind::UntypedNil => return None,
    };
    Some(id)
}

pub(super) fn chan_dir(flags: ChanFlags) -> Option<ChanDir> {
    if flags.contains(ChanFlags::BOTH) {
        Some(ChanDir::Both)
    } else if flags.contains(ChanFlags::SEND) {
        Some(ChanDir::Send)
    } else if flags.contains(ChanFlags::RECV) {
        Some(ChanDir::Recv)
    } else {
        None
    }
}

impl ModuleResolver<'_> {
    /// Maps a semantic type onto a node.
    ///
    /// `None` is a soft failure: the caller drops the field, method or
    /// declaration it was building and carries on.
    pub(super) fn deref(&self, ty: &SemanticType) -> Option<TypeId> {
        match ty {
            SemanticType::Named(named) => self.lookup_named(named),
            SemanticType::Basic(kind) => {
                let id = basic(*kind);
                if id.is_none() {
                    self.skipped(format_args!("untyped nil has no type"));
                }
                id
            }
            SemanticType::Struct(body) => {
                let fields = self.fields("struct literal", body);
                let module = self.module.path().to_string();
                Some(self.registry.store().alloc(|id| {
                    TypeData::Record(Arc::new(RecordType {
                        id,
                        module,
                        name: None,
                        comment: None,
                        fields,
                        methods: Vec::new(),
                    }))
                }))
            }
            SemanticType::Interface(body) => {
                let methods = self.interface_methods(&body.methods);
                let module = self.module.path().to_string();
                Some(self.registry.store().alloc(|id| {
                    TypeData::Interface(Arc::new(InterfaceType {
                        id,
                        module,
                        name: None,
                        comment: None,
                        methods,
                    }))
                }))
            }
            SemanticType::Signature(signature) => {
                let function = self.function(None, None, signature)?;
                Some(self.alloc(function))
            }
            SemanticType::Slice(elem) => {
                let elem = self.deref(elem)?;
                Some(self.registry.store().array(ArrayKind::Dynamic, elem, 0))
            }
            SemanticType::Array { len, elem } => {
                let elem = self.deref(elem)?;
                let Ok(size) = usize::try_from(*len) else {
                    self.skipped(format_args!("array length {len} out of range"));
                    return None;
                };
                Some(self.registry.store().array(ArrayKind::Fixed, elem, size))
            }
            SemanticType::Pointer(elem) => Some(self.registry.store().pointer(self.deref(elem)?)),
            SemanticType::Map { key, value } => {
                let key = self.deref(key)?;
                let value = self.deref(value)?;
                Some(self.registry.store().map(key, value))
            }
            SemanticType::Chan { dir, elem } => {
                let Some(dir) = chan_dir(*dir) else {
                    self.skipped(format_args!("channel without direction"));
                    return None;
                };
                Some(self.registry.store().channel(self.deref(elem)?, dir))
            }
            SemanticType::Invalid => Some(TypeId::INVALID),
            SemanticType::Unsupported(what) => {
                self.skipped(format_args!("unsupported type: {what}"));
                None
            }
        }
    }

    fn lookup_named(&self, named: &NamedRef) -> Option<TypeId> {
        let found = if named.module == BUILTIN_MODULE {
            builtins::lookup(&named.name)
        } else if named.module == self.module.path() {
            self.module.get_type(&named.name)
        } else {
            self.registry
                .read(&named.module)
                .and_then(|module| module.get_type(&named.name))
        };
        if found.is_none() {
            self.skipped(format_args!(
                "type {}.{} not found",
                named.module, named.name
            ));
        }
        found
    }

    /// Fields of a record body; fields whose type fails are left out.
    pub(super) fn fields(&self, owner: &str, body: &StructType) -> Vec<Field> {
        body.fields
            .iter()
            .enumerate()
            .filter_map(|(index, field)| {
                let Some(ty) = self.deref(&field.ty) else {
                    self.skipped(format_args!("field {owner}.{} skipped", field.name));
                    return None;
                };
                Some(Field {
                    name: field.name.clone(),
                    comment: None,
                    ty,
                    tag: field.tag.clone().unwrap_or_default(),
                    index: vec![index],
                    embedded: field.embedded,
                    anonymous: matches!(field.ty, SemanticType::Struct(_)),
                })
            })
            .collect()
    }

    /// Builds a function body without allocating it.
    pub(super) fn function(
        &self,
        name: Option<&str>,
        receiver: Option<Receiver>,
        signature: &Signature,
    ) -> Option<FunctionType> {
        let params = self.params(&signature.params)?;
        let results = self.params(&signature.results)?;
        Some(FunctionType {
            id: TypeId::INVALID,
            module: self.module.path().to_string(),
            name: name.map(str::to_string),
            comment: None,
            receiver,
            params,
            results,
            variadic: signature.variadic,
        })
    }

    fn params(&self, params: &[typegraph_frontend::semantic::Param]) -> Option<Vec<Param>> {
        params
            .iter()
            .map(|param| {
                Some(Param {
                    name: param.name.clone(),
                    ty: self.deref(&param.ty)?,
                })
            })
            .collect()
    }

    pub(super) fn alloc(&self, function: FunctionType) -> TypeId {
        self.registry
            .store()
            .alloc(|id| TypeData::Function(Arc::new(FunctionType { id, ..function })))
    }

    /// Methods declared on `owner`, sorted by name.
    pub(super) fn methods(&self, owner: TypeId, owner_name: &str, methods: &[Method]) -> Vec<TypeId> {
        let mut mapped: Vec<(String, TypeId)> = methods
            .iter()
            .filter_map(|method| {
                let receiver = Receiver {
                    name: method
                        .signature
                        .receiver
                        .as_ref()
                        .map(|receiver| receiver.name.clone())
                        .unwrap_or_default(),
                    ty: owner,
                    pointer: method.pointer_receiver,
                };
                let Some(function) = self.function(Some(&method.name), Some(receiver), &method.signature)
                else {
                    self.skipped(format_args!("method {owner_name}.{} skipped", method.name));
                    return None;
                };
                Some((method.name.clone(), self.alloc(function)))
            })
            .collect();
        mapped.sort_by(|a, b| a.0.cmp(&b.0));
        mapped.into_iter().map(|(_, id)| id).collect()
    }

    /// Interface methods, sorted by name.
    pub(super) fn interface_methods(&self, methods: &[Method]) -> Vec<TypeId> {
        let mut mapped: Vec<(String, TypeId)> = methods
            .iter()
            .filter_map(|method| {
                let Some(function) = self.function(Some(&method.name), None, &method.signature) else {
                    self.skipped(format_args!("interface method {} skipped", method.name));
                    return None;
                };
                Some((method.name.clone(), self.alloc(function)))
            })
            .collect();
        mapped.sort_by(|a, b| a.0.cmp(&b.0));
        mapped.into_iter().map(|(_, id)| id).collect()
    }

    /// Fills every placeholder whose body the checker reports.
    pub(super) fn resolve_placeholders(&mut self) {
        let placeholders = std::mem::take(&mut self.placeholders);
        for placeholder in placeholders {
            match placeholder {
                Placeholder::Record {
                    id,
                    name,
                    body,
                    methods,
                } => {
                    let fields = self.fields(name, body);
                    let methods = self.methods(id, name, methods);
                    self.registry.store().replace(
                        id,
                        TypeData::Record(Arc::new(RecordType {
                            id,
                            module: self.module.path().to_string(),
                            name: Some(name.to_string()),
                            comment: None,
                            fields,
                            methods,
                        })),
                    );
                }
                Placeholder::Interface { id, name, body } => {
                    let methods = self.interface_methods(&body.methods);
                    self.registry.store().replace(
                        id,
                        TypeData::Interface(Arc::new(InterfaceType {
                            id,
                            module: self.module.path().to_string(),
                            name: Some(name.to_string()),
                            comment: None,
                            methods,
                        })),
                    );
                }
                Placeholder::Function {
                    id,
                    name,
                    signature,
                } => match self.function(Some(name), None, signature) {
                    Some(function) => self
                        .registry
                        .store()
                        .replace(id, TypeData::Function(Arc::new(FunctionType { id, ..function }))),
                    None => self.skipped(format_args!("signature of function {name} skipped")),
                },
                Placeholder::Alias {
                    id,
                    name,
                    target,
                    methods,
                    transparent,
                } => {
                    let target = self.deref(target);
                    if target.is_none() {
                        self.skipped(format_args!("target of {name} skipped"));
                    }
                    let methods = self.methods(id, name, methods);
                    self.set_alias(id, name, target, methods, transparent);
                }
            }
        }
    }

    pub(super) fn set_alias(
        &self,
        id: TypeId,
        name: &str,
        target: Option<TypeId>,
        methods: Vec<TypeId>,
        transparent: bool,
    ) {
        self.registry.store().replace(
            id,
            TypeData::Alias(Arc::new(AliasType {
                id,
                module: self.module.path().to_string(),
                name: name.to_string(),
                comment: None,
                target,
                methods,
                transparent,
            })),
        );
    }
}
