//! Syntax trees handed over by the front-end.
//!
//! Only declarations are modelled: the resolver needs the written spelling of
//! type expressions (to recover alias chains the checker flattened) and the
//! documentation attached to each declaration. Function bodies are dropped.

use serde::{Deserialize, Serialize};

use crate::semantic::ChanFlags;

/// A parsed source file of one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxFile {
    pub name: String,
    /// The package clause of the file.
    pub package: String,
    #[serde(default)]
    pub imports: Vec<ImportSpec>,
    #[serde(default)]
    pub decls: Vec<Decl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpec {
    /// Explicit local name (`import foo "a/b"`), if any.
    #[serde(default)]
    pub name: Option<String>,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decl {
    Gen(GenDecl),
    Func(FuncDecl),
}

/// A `type`, `const` or `var` declaration, possibly grouped in parentheses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenDecl {
    #[serde(default)]
    pub doc: Option<String>,
    pub specs: Vec<Spec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Spec {
    Type(TypeSpec),
    Value(ValueSpec),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSpec {
    #[serde(default)]
    pub doc: Option<String>,
    pub name: String,
    /// `type A = B` rather than `type A B`.
    #[serde(default)]
    pub assign: bool,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSpec {
    #[serde(default)]
    pub doc: Option<String>,
    pub names: Vec<String>,
    pub constant: bool,
    #[serde(default)]
    pub ty: Option<TypeExpr>,
    #[serde(default)]
    pub values: Vec<ValueExpr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDecl {
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub receiver: Option<FieldSyntax>,
    pub name: String,
    pub signature: FuncTypeExpr,
}

/// A type expression as written in source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeExpr {
    Ident(String),
    Selector { module: String, name: String },
    Star(Box<TypeExpr>),
    /// `[]T` when `len` is `None`.
    Array { len: Option<ArrayLen>, elem: Box<TypeExpr> },
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    Chan { dir: ChanFlags, elem: Box<TypeExpr> },
    Func(FuncTypeExpr),
    Struct(Vec<FieldSyntax>),
    Interface(Vec<InterfaceElem>),
    Paren(Box<TypeExpr>),
    /// `...T` in a parameter list.
    Ellipsis(Box<TypeExpr>),
}

impl TypeExpr {
    /// Strips any number of `*` and parentheses.
    pub fn base(&self) -> &TypeExpr {
        match self {
            TypeExpr::Star(inner) | TypeExpr::Paren(inner) => inner.base(),
            other => other,
        }
    }

    /// The name an embedded field of this type gets.
    pub fn embedded_name(&self) -> Option<&str> {
        match self.base() {
            TypeExpr::Ident(name) => Some(name),
            TypeExpr::Selector { name, .. } => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrayLen {
    Literal(u64),
    Ident(String),
    /// `[...]T`, only valid in composite literals.
    Ellipsis,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FuncTypeExpr {
    #[serde(default)]
    pub params: Vec<FieldSyntax>,
    #[serde(default)]
    pub results: Vec<FieldSyntax>,
}

/// A struct field, parameter, result or receiver.
///
/// `names` is empty for embedded fields and unnamed parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSyntax {
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub names: Vec<String>,
    pub ty: TypeExpr,
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InterfaceElem {
    Method {
        #[serde(default)]
        doc: Option<String>,
        name: String,
        signature: FuncTypeExpr,
    },
    Embedded {
        #[serde(default)]
        doc: Option<String>,
        ty: TypeExpr,
    },
}

/// Constant and variable initializers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueExpr {
    Int(i128),
    Float(f64),
    String(String),
    Char(char),
    Ident(String),
    Selector { module: String, name: String },
    Unary { op: UnaryOp, expr: Box<ValueExpr> },
    Binary { op: BinaryOp, lhs: Box<ValueExpr>, rhs: Box<ValueExpr> },
    /// A call or conversion, `T(x)`.
    Call { callee: TypeExpr, args: Vec<ValueExpr> },
    /// `T{...}`; the elements are not kept.
    Composite(TypeExpr),
    Paren(Box<ValueExpr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
    Ref,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Shl,
    Shr,
    Or,
    And,
    Xor,
}
