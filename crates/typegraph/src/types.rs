//! # Reflection Model
//!
//! Every type known to a [`Registry`](crate::Registry) is a node in its
//! [`TypeStore`](crate::TypeStore), addressed by a [`TypeId`].
//!
//! ## Architecture
//!
//! - `TypeId`: stable identity of a node; two references to the same declared
//!   name always carry the same id.
//! - `TypeData`: the closed set of node shapes. Named shapes (records,
//!   interfaces, aliases, functions) are allocated, so each allocation is a new
//!   identity. Structural wrappers (pointer, array, map, channel) are interned,
//!   so the same structure always yields the same id.
//!
//! ## Design Notes
//!
//! Children are referenced by id, never by value. A record holding a pointer to
//! itself is a `Pointer(id)` node whose payload is the record's own id, which is
//! what lets cyclic graphs exist without infinite unrolling.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identity of a type node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(u32);

impl TypeId {
    pub const BOOL: Self = Self(BuiltInKind::Bool as u32);
    pub const INT: Self = Self(BuiltInKind::Int as u32);
    pub const INT8: Self = Self(BuiltInKind::Int8 as u32);
    pub const INT16: Self = Self(BuiltInKind::Int16 as u32);
    pub const INT32: Self = Self(BuiltInKind::Int32 as u32);
    pub const INT64: Self = Self(BuiltInKind::Int64 as u32);
    pub const UINT: Self = Self(BuiltInKind::Uint as u32);
    pub const UINT8: Self = Self(BuiltInKind::Uint8 as u32);
    pub const UINT16: Self = Self(BuiltInKind::Uint16 as u32);
    pub const UINT32: Self = Self(BuiltInKind::Uint32 as u32);
    pub const UINT64: Self = Self(BuiltInKind::Uint64 as u32);
    pub const UINTPTR: Self = Self(BuiltInKind::Uintptr as u32);
    pub const FLOAT32: Self = Self(BuiltInKind::Float32 as u32);
    pub const FLOAT64: Self = Self(BuiltInKind::Float64 as u32);
    pub const COMPLEX64: Self = Self(BuiltInKind::Complex64 as u32);
    pub const COMPLEX128: Self = Self(BuiltInKind::Complex128 as u32);
    pub const STRING: Self = Self(BuiltInKind::String as u32);
    pub const BYTE: Self = Self(BuiltInKind::Byte as u32);
    pub const RUNE: Self = Self(BuiltInKind::Rune as u32);
    pub const UNSAFE_POINTER: Self = Self(BuiltInKind::UnsafePointer as u32);
    pub const INVALID: Self = Self(BuiltInKind::Invalid as u32);
    /// The predeclared `error` interface.
    pub const ERROR: Self = Self(BuiltInKind::COUNT);
    /// The `Error() string` method of `error`.
    pub const ERROR_METHOD: Self = Self(BuiltInKind::COUNT + 1);
    /// `interface{}`, also reachable as `any`.
    pub const EMPTY_INTERFACE: Self = Self(BuiltInKind::COUNT + 2);

    /// Number of ids reserved at the start of every store.
    pub(crate) const RESERVED: usize = BuiltInKind::COUNT as usize + 3;

    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn of_builtin(kind: BuiltInKind) -> Self {
        Self(kind as u32)
    }

    /// Whether this id is one of the slots shared by every store.
    pub const fn is_reserved(self) -> bool {
        self.index() < Self::RESERVED
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Predeclared basic types, plus the two sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum BuiltInKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    Byte,
    Rune,
    UnsafePointer,
    Invalid,
}

impl BuiltInKind {
    pub(crate) const COUNT: u32 = Self::Invalid as u32 + 1;

    pub const ALL: [Self; Self::COUNT as usize] = [
        Self::Bool,
        Self::Int,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::Uint,
        Self::Uint8,
        Self::Uint16,
        Self::Uint32,
        Self::Uint64,
        Self::Uintptr,
        Self::Float32,
        Self::Float64,
        Self::Complex64,
        Self::Complex128,
        Self::String,
        Self::Byte,
        Self::Rune,
        Self::UnsafePointer,
        Self::Invalid,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uintptr => "uintptr",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
            Self::String => "string",
            Self::Byte => "byte",
            Self::Rune => "rune",
            Self::UnsafePointer => "unsafe.Pointer",
            Self::Invalid => "invalid",
        }
    }

    /// `byte` and `rune` are the same types as `uint8` and `int32`.
    pub const fn canonical(self) -> Self {
        match self {
            Self::Byte => Self::Uint8,
            Self::Rune => Self::Int32,
            other => other,
        }
    }

    pub const fn kind(self) -> Kind {
        match self.canonical() {
            Self::Bool => Kind::Bool,
            Self::Int => Kind::Int,
            Self::Int8 => Kind::Int8,
            Self::Int16 => Kind::Int16,
            Self::Int32 => Kind::Int32,
            Self::Int64 => Kind::Int64,
            Self::Uint => Kind::Uint,
            Self::Uint8 => Kind::Uint8,
            Self::Uint16 => Kind::Uint16,
            Self::Uint32 => Kind::Uint32,
            Self::Uint64 => Kind::Uint64,
            Self::Uintptr => Kind::Uintptr,
            Self::Float32 => Kind::Float32,
            Self::Float64 => Kind::Float64,
            Self::Complex64 => Kind::Complex64,
            Self::Complex128 => Kind::Complex128,
            Self::String => Kind::String,
            Self::UnsafePointer => Kind::UnsafePointer,
            Self::Byte | Self::Rune | Self::Invalid => Kind::Invalid,
        }
    }

    /// Zero value literal.
    pub const fn zero(self) -> &'static str {
        match self.kind() {
            Kind::Bool => "false",
            Kind::String => "\"\"",
            Kind::Complex64 | Kind::Complex128 => "complex(0, 0)",
            Kind::UnsafePointer | Kind::Invalid => "nil",
            _ => "0",
        }
    }
}

/// The reflection kind of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Invalid,
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    Array,
    Chan,
    Func,
    Interface,
    Map,
    Pointer,
    Slice,
    Record,
    UnsafePointer,
    Alias,
}

impl Kind {
    pub const fn is_builtin(self) -> bool {
        matches!(
            self,
            Self::Bool
                | Self::Int
                | Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Uint
                | Self::Uint8
                | Self::Uint16
                | Self::Uint32
                | Self::Uint64
                | Self::Uintptr
                | Self::Float32
                | Self::Float64
                | Self::Complex64
                | Self::Complex128
                | Self::String
        )
    }

    pub const fn is_number(self) -> bool {
        matches!(
            self,
            Self::Int
                | Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Uint
                | Self::Uint8
                | Self::Uint16
                | Self::Uint32
                | Self::Uint64
                | Self::Uintptr
                | Self::Float32
                | Self::Float64
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrayKind {
    /// `[N]T`
    Fixed,
    /// `[]T`
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// A node of the type graph.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeData {
    BuiltIn(BuiltInKind),
    Record(Arc<RecordType>),
    Interface(Arc<InterfaceType>),
    Function(Arc<FunctionType>),
    Alias(Arc<AliasType>),
    Pointer(TypeId),
    Array {
        kind: ArrayKind,
        elem: TypeId,
        /// Zero for dynamic arrays.
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

impl TypeData {
    pub fn kind(&self) -> Kind {
        match self {
            Self::BuiltIn(kind) => kind.kind(),
            Self::Record(_) => Kind::Record,
            Self::Interface(_) => Kind::Interface,
            Self::Function(_) => Kind::Func,
            Self::Alias(_) => Kind::Alias,
            Self::Pointer(_) => Kind::Pointer,
            Self::Array {
                kind: ArrayKind::Fixed,
                ..
            } => Kind::Array,
            Self::Array {
                kind: ArrayKind::Dynamic,
                ..
            } => Kind::Slice,
            Self::Map { .. } => Kind::Map,
            Self::Channel { .. } => Kind::Chan,
        }
    }

    /// Module and name of a declared type.
    pub fn declared_name(&self) -> Option<(&str, &str)> {
        match self {
            Self::Record(record) => Some((&record.module, record.name.as_deref()?)),
            Self::Interface(interface) => Some((&interface.module, interface.name.as_deref()?)),
            Self::Function(function) => Some((&function.module, function.name.as_deref()?)),
            Self::Alias(alias) => Some((&alias.module, &alias.name)),
            _ => None,
        }
    }

    /// Documentation slot of the nodes that carry one.
    pub(crate) fn comment_mut(&mut self) -> Option<&mut Option<String>> {
        match self {
            Self::Record(record) => Some(&mut Arc::make_mut(record).comment),
            Self::Interface(interface) => Some(&mut Arc::make_mut(interface).comment),
            Self::Function(function) => Some(&mut Arc::make_mut(function).comment),
            Self::Alias(alias) => Some(&mut Arc::make_mut(alias).comment),
            _ => None,
        }
    }
}

/// A struct type. Anonymous when `name` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
    pub id: TypeId,
    pub module: String,
    pub name: Option<String>,
    pub comment: Option<String>,
    /// In declaration order.
    pub fields: Vec<Field>,
    /// `Function` nodes sorted by name.
    pub methods: Vec<TypeId>,
}

impl RecordType {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub comment: Option<String>,
    pub ty: TypeId,
    /// Raw tag text without quotes; empty when absent.
    pub tag: String,
    /// Path of field positions from the outer record, see
    /// [`Registry::field_by_name`](crate::Registry::field_by_name).
    pub index: Vec<usize>,
    pub embedded: bool,
    /// The field's type is an inline struct literal.
    pub anonymous: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceType {
    pub id: TypeId,
    pub module: String,
    pub name: Option<String>,
    pub comment: Option<String>,
    /// `Function` nodes sorted by name, embedded interfaces flattened.
    pub methods: Vec<TypeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub id: TypeId,
    pub module: String,
    /// Set for top-level functions and methods.
    pub name: Option<String>,
    pub comment: Option<String>,
    pub receiver: Option<Receiver>,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    /// The last parameter is `...T`, stored as `[]T`.
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Receiver {
    pub name: String,
    /// The named type the method is declared on.
    pub ty: TypeId,
    pub pointer: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeId,
}

/// A declared name over another type.
///
/// `type A B` is a defined alias: a distinct type with its own method set.
/// `type A = B` is transparent: it denotes exactly `B`.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasType {
    pub id: TypeId,
    pub module: String,
    pub name: String,
    pub comment: Option<String>,
    /// Unset until resolved, and left unset when resolution fails.
    pub target: Option<TypeId>,
    pub methods: Vec<TypeId>,
    pub transparent: bool,
}
