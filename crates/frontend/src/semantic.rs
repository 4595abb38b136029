//! The checker's view of a module: named objects and their types.

use bitflags::bitflags;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Path of the synthetic module holding the predeclared types.
pub const BUILTIN_MODULE: &str = "builtin";

/// Path of the module providing `unsafe.Pointer`.
pub const UNSAFE_MODULE: &str = "unsafe";

bitflags! {
    /// Channel direction bits as reported by the checker.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ChanFlags: u8 {
        const SEND = 1 << 0;
        const RECV = 1 << 1;
        const BOTH = Self::SEND.bits() | Self::RECV.bits();
    }
}

/// Reference to a declared type by module path and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedRef {
    pub module: String,
    pub name: String,
}

impl NamedRef {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasicKind {
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
    UntypedBool,
    UntypedInt,
    UntypedRune,
    UntypedFloat,
    UntypedComplex,
    UntypedString,
    UntypedNil,
}

impl BasicKind {
    /// Looks up a predeclared basic type by its source name.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "bool" => Self::Bool,
            "int" => Self::Int,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "uint" => Self::Uint,
            "uint8" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "uintptr" => Self::Uintptr,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "complex64" => Self::Complex64,
            "complex128" => Self::Complex128,
            "string" => Self::String,
            "byte" => Self::Byte,
            "rune" => Self::Rune,
            _ => return None,
        };
        Some(kind)
    }

    pub const fn is_untyped(self) -> bool {
        matches!(
            self,
            Self::UntypedBool
                | Self::UntypedInt
                | Self::UntypedRune
                | Self::UntypedFloat
                | Self::UntypedComplex
                | Self::UntypedString
                | Self::UntypedNil
        )
    }
}

/// Semantic type tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SemanticType {
    Named(NamedRef),
    Basic(BasicKind),
    Struct(StructType),
    Interface(InterfaceType),
    Signature(Signature),
    Slice(Box<SemanticType>),
    Array {
        len: u64,
        elem: Box<SemanticType>,
    },
    Pointer(Box<SemanticType>),
    Map {
        key: Box<SemanticType>,
        value: Box<SemanticType>,
    },
    Chan {
        dir: ChanFlags,
        elem: Box<SemanticType>,
    },
    Invalid,
    /// A construct the checker understood but the model does not cover.
    Unsupported(String),
}

impl SemanticType {
    pub fn named(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named(NamedRef::new(module, name))
    }

    pub fn slice(elem: SemanticType) -> Self {
        Self::Slice(Box::new(elem))
    }

    pub fn pointer(elem: SemanticType) -> Self {
        Self::Pointer(Box::new(elem))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructType {
    pub fields: Vec<StructField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub ty: SemanticType,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub embedded: bool,
}

/// An interface with its complete method set, embedded interfaces flattened.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InterfaceType {
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub signature: Signature,
    /// Declared on `*T` rather than `T`.
    #[serde(default)]
    pub pointer_receiver: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub receiver: Option<Box<Param>>,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub results: Vec<Param>,
    /// The last parameter is `...T`, already presented as `[]T`.
    #[serde(default)]
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    #[serde(default)]
    pub name: String,
    pub ty: SemanticType,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: SemanticType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A compile-time constant value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstValue {
    Bool(bool),
    String(String),
    Int(i128),
    /// An integer constant of an unsigned type.
    Uint(u128),
    Float(f64),
    Complex { re: f64, im: f64 },
}

impl ConstValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => i64::try_from(*v).ok(),
            Self::Uint(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Int(v) => u64::try_from(*v).ok(),
            Self::Uint(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            Self::Uint(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConstValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Complex { re, im } => write!(f, "({re} + {im}i)"),
        }
    }
}

/// A top-level object of a module scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SemanticObject {
    /// A type declaration. For `type A = B` (`alias` set) `ty` is the aliased
    /// type; otherwise it is `Named` pointing at the declaration itself and
    /// the underlying type lives in [`SemanticScope::named`].
    TypeName {
        ty: SemanticType,
        #[serde(default)]
        alias: bool,
    },
    Func {
        signature: Signature,
    },
    Const {
        ty: SemanticType,
        value: ConstValue,
    },
    Var {
        ty: SemanticType,
    },
}

/// Underlying type and method set of a defined type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedInfo {
    pub underlying: SemanticType,
    #[serde(default)]
    pub methods: Vec<Method>,
}

/// The package scope of a module in declaration order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SemanticScope {
    #[serde(default)]
    pub objects: IndexMap<String, SemanticObject>,
    #[serde(default)]
    pub named: IndexMap<String, NamedInfo>,
}

impl SemanticScope {
    pub fn object(&self, name: &str) -> Option<&SemanticObject> {
        self.objects.get(name)
    }

    pub fn named_info(&self, name: &str) -> Option<&NamedInfo> {
        self.named.get(name)
    }

    /// Value of a constant declared in this scope.
    pub fn constant(&self, name: &str) -> Option<&ConstValue> {
        match self.objects.get(name)? {
            SemanticObject::Const { value, .. } => Some(value),
            _ => None,
        }
    }
}
