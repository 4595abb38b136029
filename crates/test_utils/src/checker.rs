//! A small checker turning parsed fixture modules into semantic scopes.
//!
//! Declarations of every module are collected first, so a module may refer to
//! types of any other module of the same program regardless of order. `=`
//! aliases are expanded where they are used, embedded interfaces are
//! flattened and constants are evaluated (with `iota` and implicit
//! repetition).

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use typegraph_frontend::semantic::{
    InterfaceType, Method, Param, Signature, StructField, StructType,
};
use typegraph_frontend::syntax::{
    ArrayLen, BinaryOp, Decl, FieldSyntax, FuncDecl, FuncTypeExpr, InterfaceElem, Spec,
    SyntaxFile, TypeExpr, TypeSpec, UnaryOp, ValueExpr,
};
use typegraph_frontend::{
    BasicKind, ConstValue, LoadedModule, NamedInfo, SemanticObject, SemanticScope, SemanticType,
    BUILTIN_MODULE, UNSAFE_MODULE,
};

/// Alias expansions and embeddings nested deeper than this are cycles.
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy)]
struct Ctx<'s> {
    module: &'s str,
    file: &'s SyntaxFile,
}

#[derive(Debug, Clone, Copy)]
enum Object<'s> {
    Type(&'s TypeSpec),
    Func(&'s FuncDecl),
    Const {
        ty: Option<&'s TypeExpr>,
        value: Option<&'s ValueExpr>,
        iota: i128,
    },
    Var {
        ty: Option<&'s TypeExpr>,
        value: Option<&'s ValueExpr>,
    },
}

#[derive(Debug, Clone, Copy)]
struct Declared<'s> {
    object: Object<'s>,
    file: &'s SyntaxFile,
}

#[derive(Debug, Default)]
struct ModuleDecls<'s> {
    package: &'s str,
    objects: IndexMap<&'s str, Declared<'s>>,
    methods: FxHashMap<&'s str, Vec<(&'s FuncDecl, &'s SyntaxFile)>>,
    errors: Vec<String>,
}

type Constant = (ConstValue, SemanticType);

pub(crate) struct Checker<'s> {
    modules: IndexMap<&'s str, ModuleDecls<'s>>,
    constants: FxHashMap<(&'s str, &'s str), Option<Constant>>,
    evaluating: FxHashSet<(&'s str, &'s str)>,
    errors: Vec<String>,
}

fn untyped(ty: &SemanticType) -> bool {
    matches!(ty, SemanticType::Basic(kind) if kind.is_untyped())
}

/// The type a variable initialized with an untyped constant gets.
fn default_type(ty: SemanticType) -> SemanticType {
    let kind = match ty {
        SemanticType::Basic(BasicKind::UntypedBool) => BasicKind::Bool,
        SemanticType::Basic(BasicKind::UntypedInt) => BasicKind::Int,
        SemanticType::Basic(BasicKind::UntypedRune) => BasicKind::Rune,
        SemanticType::Basic(BasicKind::UntypedFloat) => BasicKind::Float64,
        SemanticType::Basic(BasicKind::UntypedComplex) => BasicKind::Complex128,
        SemanticType::Basic(BasicKind::UntypedString) => BasicKind::String,
        other => return other,
    };
    SemanticType::Basic(kind)
}

fn untyped_rank(ty: &SemanticType) -> u8 {
    match ty {
        SemanticType::Basic(BasicKind::UntypedInt) => 1,
        SemanticType::Basic(BasicKind::UntypedRune) => 2,
        SemanticType::Basic(BasicKind::UntypedFloat) => 3,
        SemanticType::Basic(BasicKind::UntypedComplex) => 4,
        _ => 0,
    }
}

fn is_float(kind: BasicKind) -> bool {
    matches!(
        kind,
        BasicKind::Float32 | BasicKind::Float64 | BasicKind::UntypedFloat
    )
}

fn is_unsigned(kind: BasicKind) -> bool {
    matches!(
        kind,
        BasicKind::Uint
            | BasicKind::Uint8
            | BasicKind::Uint16
            | BasicKind::Uint32
            | BasicKind::Uint64
            | BasicKind::Uintptr
            | BasicKind::Byte
    )
}

/// Folding works on signed integers; unsigned values are converted back when
/// the result is typed.
fn signed(value: ConstValue) -> ConstValue {
    match value {
        ConstValue::Uint(v) => i128::try_from(v).map_or(ConstValue::Uint(v), ConstValue::Int),
        value => value,
    }
}

fn arith(op: BinaryOp, lhs: ConstValue, rhs: ConstValue) -> Result<ConstValue, String> {
    use ConstValue::{Float, Int};

    let value = match (op, signed(lhs), signed(rhs)) {
        (BinaryOp::Add, ConstValue::String(a), ConstValue::String(b)) => ConstValue::String(a + &b),
        (BinaryOp::Div, Int(_), Int(0)) => return Err("division by zero".to_string()),
        (op, Int(a), Int(b)) => Int(match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            BinaryOp::Div => a.checked_div(b),
            BinaryOp::Shl => u32::try_from(b).ok().and_then(|b| a.checked_shl(b)),
            BinaryOp::Shr => u32::try_from(b).ok().and_then(|b| a.checked_shr(b)),
            BinaryOp::Or => Some(a | b),
            BinaryOp::And => Some(a & b),
            BinaryOp::Xor => Some(a ^ b),
        }
        .ok_or_else(|| "constant overflow".to_string())?),
        (op @ (BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div), a, b) => {
            let (Some(a), Some(b)) = (a.as_f64(), b.as_f64()) else {
                return Err(format!("invalid operands for {op:?}"));
            };
            Float(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                _ => a / b,
            })
        }
        (op, _, _) => return Err(format!("invalid operands for {op:?}")),
    };
    Ok(value)
}

impl<'s> Checker<'s> {
    pub(crate) fn new(modules: &'s IndexMap<String, Vec<SyntaxFile>>) -> Self {
        let mut checker = Self {
            modules: IndexMap::new(),
            constants: FxHashMap::default(),
            evaluating: FxHashSet::default(),
            errors: Vec::new(),
        };
        for (path, files) in modules {
            let decls = Self::declare(files);
            checker.modules.insert(path.as_str(), decls);
        }
        checker
    }

    fn declare(files: &'s [SyntaxFile]) -> ModuleDecls<'s> {
        let mut decls = ModuleDecls::default();
        for file in files {
            if decls.package.is_empty() {
                decls.package = &file.package;
            } else if decls.package != file.package {
                decls.errors.push(format!(
                    "{}: package {} does not match package {}",
                    file.name, file.package, decls.package
                ));
            }

            let declare = |name: &'s str, object: Object<'s>, decls: &mut ModuleDecls<'s>| {
                if name == "_" {
                    return;
                }
                if decls
                    .objects
                    .insert(name, Declared { object, file })
                    .is_some()
                {
                    decls.errors.push(format!("{}: {name} redeclared", file.name));
                }
            };

            for decl in &file.decls {
                match decl {
                    Decl::Func(func) => match &func.receiver {
                        Some(receiver) => {
                            if let TypeExpr::Ident(base) = receiver.ty.base() {
                                decls
                                    .methods
                                    .entry(base.as_str())
                                    .or_default()
                                    .push((func, file));
                            }
                        }
                        None if func.name == "init" => {}
                        None => declare(func.name.as_str(), Object::Func(func), &mut decls),
                    },
                    Decl::Gen(gen) => {
                        let mut repeated: (Option<&'s TypeExpr>, &'s [ValueExpr]) = (None, &[]);
                        for (iota, spec) in gen.specs.iter().enumerate() {
                            match spec {
                                Spec::Type(spec) => {
                                    declare(spec.name.as_str(), Object::Type(spec), &mut decls)
                                }
                                Spec::Value(spec) if spec.constant => {
                                    if spec.ty.is_some() || !spec.values.is_empty() {
                                        repeated = (spec.ty.as_ref(), spec.values.as_slice());
                                    }
                                    for (index, name) in spec.names.iter().enumerate() {
                                        let object = Object::Const {
                                            ty: repeated.0,
                                            value: repeated.1.get(index),
                                            iota: iota as i128,
                                        };
                                        declare(name.as_str(), object, &mut decls);
                                    }
                                }
                                Spec::Value(spec) => {
                                    for (index, name) in spec.names.iter().enumerate() {
                                        let object = Object::Var {
                                            ty: spec.ty.as_ref(),
                                            value: spec.values.get(index),
                                        };
                                        declare(name.as_str(), object, &mut decls);
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
        decls
    }

    /// Builds the loaded form of one module.
    pub(crate) fn check(&mut self, path: &'s str, files: &[SyntaxFile]) -> LoadedModule {
        self.errors.clear();
        let mut module = LoadedModule::new(path, "");
        let Some(decls) = self.modules.get(path) else {
            module.errors.push(format!("module {path} was not declared"));
            return module;
        };
        module.name = decls.package.to_string();
        self.errors.extend(decls.errors.iter().cloned());
        let objects: Vec<(&'s str, Declared<'s>)> =
            decls.objects.iter().map(|(name, declared)| (*name, *declared)).collect();

        let mut scope = SemanticScope::default();
        for (name, declared) in objects {
            let ctx = Ctx {
                module: path,
                file: declared.file,
            };
            let object = match declared.object {
                Object::Type(spec) if spec.assign => SemanticObject::TypeName {
                    ty: self.resolve(ctx, &spec.ty, 1),
                    alias: true,
                },
                Object::Type(spec) => {
                    let target = self.resolve(ctx, &spec.ty, 0);
                    let underlying = self.underlying(target, 0);
                    let methods = self.methods(path, name);
                    scope
                        .named
                        .insert(name.to_string(), NamedInfo { underlying, methods });
                    SemanticObject::TypeName {
                        ty: SemanticType::named(path, name),
                        alias: false,
                    }
                }
                Object::Func(func) => SemanticObject::Func {
                    signature: self.signature(ctx, &func.signature, None),
                },
                Object::Const { .. } => match self.constant(path, name) {
                    Some((value, ty)) => SemanticObject::Const { ty, value },
                    None => continue,
                },
                Object::Var { ty, value } => SemanticObject::Var {
                    ty: self.var_type(ctx, name, ty, value, 0),
                },
            };
            scope.objects.insert(name.to_string(), object);
        }

        for file in files {
            for import in &file.imports {
                if !module.imports.contains(&import.path) {
                    module.imports.push(import.path.clone());
                }
            }
        }
        module.scope = scope;
        module.files = files.to_vec();
        let mut seen = FxHashSet::default();
        module.errors = std::mem::take(&mut self.errors)
            .into_iter()
            .filter(|error| seen.insert(error.clone()))
            .collect();
        module
    }

    fn error(&mut self, ctx: Ctx<'_>, message: impl std::fmt::Display) {
        tracing::debug!(module = ctx.module, file = %ctx.file.name, "{message}");
        self.errors.push(format!("{}: {message}", ctx.file.name));
    }

    fn declared(&self, module: &str, name: &str) -> Option<(&'s str, &'s str, Declared<'s>)> {
        let (module, decls) = self.modules.get_key_value(module)?;
        let (name, declared) = decls.objects.get_key_value(name)?;
        Some((*module, *name, *declared))
    }

    /// Module path an identifier of `ctx.file` refers to.
    fn import_path(&self, ctx: Ctx<'s>, qualifier: &str) -> Option<&'s str> {
        ctx.file.imports.iter().find_map(|import| {
            let matches = match &import.name {
                Some(name) => name == qualifier,
                None => match self.modules.get(import.path.as_str()) {
                    Some(decls) if !decls.package.is_empty() => decls.package == qualifier,
                    _ => import.path.rsplit('/').next() == Some(qualifier),
                },
            };
            matches.then_some(import.path.as_str())
        })
    }

    fn resolve(&mut self, ctx: Ctx<'s>, expr: &'s TypeExpr, depth: usize) -> SemanticType {
        if depth > MAX_DEPTH {
            self.error(ctx, "invalid recursive type alias");
            return SemanticType::Invalid;
        }
        match expr {
            TypeExpr::Ident(name) => self.resolve_name(ctx, ctx.module, name, depth),
            TypeExpr::Selector { module, name } => match self.import_path(ctx, module) {
                Some(UNSAFE_MODULE) if name == "Pointer" => {
                    SemanticType::Basic(BasicKind::UnsafePointer)
                }
                Some(path) if self.modules.contains_key(path) => {
                    self.resolve_name(ctx, path, name, depth)
                }
                Some(path) => {
                    self.error(ctx, format_args!("could not import {path}"));
                    SemanticType::Invalid
                }
                None => {
                    self.error(ctx, format_args!("undefined: {module}"));
                    SemanticType::Invalid
                }
            },
            TypeExpr::Star(elem) => SemanticType::pointer(self.resolve(ctx, elem, depth)),
            TypeExpr::Paren(elem) => self.resolve(ctx, elem, depth),
            TypeExpr::Array { len: None, elem } => SemanticType::slice(self.resolve(ctx, elem, depth)),
            TypeExpr::Array {
                len: Some(len),
                elem,
            } => {
                let len = match len {
                    ArrayLen::Literal(len) => Some(*len),
                    ArrayLen::Ident(name) => self
                        .constant(ctx.module, name)
                        .and_then(|(value, _)| value.as_u64()),
                    ArrayLen::Ellipsis => None,
                };
                let Some(len) = len else {
                    self.error(ctx, "invalid array length");
                    return SemanticType::Invalid;
                };
                SemanticType::Array {
                    len,
                    elem: Box::new(self.resolve(ctx, elem, depth)),
                }
            }
            TypeExpr::Map { key, value } => SemanticType::Map {
                key: Box::new(self.resolve(ctx, key, depth)),
                value: Box::new(self.resolve(ctx, value, depth)),
            },
            TypeExpr::Chan { dir, elem } => SemanticType::Chan {
                dir: *dir,
                elem: Box::new(self.resolve(ctx, elem, depth)),
            },
            TypeExpr::Func(signature) => {
                SemanticType::Signature(self.signature(ctx, signature, None))
            }
            TypeExpr::Struct(fields) => SemanticType::Struct(self.struct_type(ctx, fields)),
            TypeExpr::Interface(elems) => {
                SemanticType::Interface(self.interface_type(ctx, elems, depth))
            }
            TypeExpr::Ellipsis(_) => {
                self.error(ctx, "variadic type outside a parameter list");
                SemanticType::Invalid
            }
        }
    }

    fn resolve_name(&mut self, ctx: Ctx<'s>, module: &'s str, name: &str, depth: usize) -> SemanticType {
        match self.declared(module, name) {
            Some((module, name, declared)) => match declared.object {
                Object::Type(spec) if spec.assign => {
                    let ctx = Ctx {
                        module,
                        file: declared.file,
                    };
                    self.resolve(ctx, &spec.ty, depth + 1)
                }
                Object::Type(_) => SemanticType::named(module, name),
                _ => {
                    self.error(ctx, format_args!("{name} is not a type"));
                    SemanticType::Invalid
                }
            },
            None if module == ctx.module => match name {
                "error" | "any" => SemanticType::named(BUILTIN_MODULE, name),
                _ => match BasicKind::from_name(name) {
                    Some(kind) => SemanticType::Basic(kind),
                    None => {
                        self.error(ctx, format_args!("undefined: {name}"));
                        SemanticType::Invalid
                    }
                },
            },
            None => {
                self.error(ctx, format_args!("undefined: {module}.{name}"));
                SemanticType::Invalid
            }
        }
    }

    fn underlying(&mut self, ty: SemanticType, depth: usize) -> SemanticType {
        let named = match ty {
            SemanticType::Named(named) => named,
            other => return other,
        };
        if named.module == BUILTIN_MODULE {
            let methods = match named.name.as_str() {
                "error" => vec![Method {
                    name: "Error".to_string(),
                    signature: Signature {
                        results: vec![Param::new("", SemanticType::Basic(BasicKind::String))],
                        ..Signature::default()
                    },
                    pointer_receiver: false,
                }],
                _ => Vec::new(),
            };
            return SemanticType::Interface(InterfaceType { methods });
        }
        let Some((module, _, declared)) = self.declared(&named.module, &named.name) else {
            return SemanticType::Invalid;
        };
        let Object::Type(spec) = declared.object else {
            return SemanticType::Invalid;
        };
        if depth > MAX_DEPTH {
            self.errors.push(format!("invalid recursive type {}", named.name));
            return SemanticType::Invalid;
        }
        let ctx = Ctx {
            module,
            file: declared.file,
        };
        let target = self.resolve(ctx, &spec.ty, depth);
        self.underlying(target, depth + 1)
    }

    fn methods(&mut self, module: &'s str, name: &str) -> Vec<Method> {
        let declared = self
            .modules
            .get(module)
            .and_then(|decls| decls.methods.get(name))
            .cloned()
            .unwrap_or_default();
        declared
            .into_iter()
            .filter_map(|(func, file)| {
                let receiver = func.receiver.as_ref()?;
                let ctx = Ctx { module, file };
                let mut receiver_ty = &receiver.ty;
                while let TypeExpr::Paren(inner) = receiver_ty {
                    receiver_ty = inner;
                }
                let pointer_receiver = matches!(receiver_ty, TypeExpr::Star(_));
                let ty = if pointer_receiver {
                    SemanticType::pointer(SemanticType::named(module, name))
                } else {
                    SemanticType::named(module, name)
                };
                let param = Param::new(receiver.names.first().cloned().unwrap_or_default(), ty);
                Some(Method {
                    name: func.name.clone(),
                    signature: self.signature(ctx, &func.signature, Some(param)),
                    pointer_receiver,
                })
            })
            .collect()
    }

    fn params(&mut self, ctx: Ctx<'s>, fields: &'s [FieldSyntax]) -> Vec<Param> {
        let mut params = Vec::new();
        for field in fields {
            let ty = match &field.ty {
                TypeExpr::Ellipsis(elem) => SemanticType::slice(self.resolve(ctx, elem, 0)),
                other => self.resolve(ctx, other, 0),
            };
            if field.names.is_empty() {
                params.push(Param::new("", ty));
            } else {
                params.extend(field.names.iter().map(|name| Param::new(name.clone(), ty.clone())));
            }
        }
        params
    }

    fn signature(
        &mut self,
        ctx: Ctx<'s>,
        signature: &'s FuncTypeExpr,
        receiver: Option<Param>,
    ) -> Signature {
        Signature {
            receiver: receiver.map(Box::new),
            params: self.params(ctx, &signature.params),
            results: self.params(ctx, &signature.results),
            variadic: signature
                .params
                .last()
                .is_some_and(|param| matches!(param.ty, TypeExpr::Ellipsis(_))),
        }
    }

    fn struct_type(&mut self, ctx: Ctx<'s>, fields: &'s [FieldSyntax]) -> StructType {
        let mut out = Vec::new();
        for field in fields {
            let ty = self.resolve(ctx, &field.ty, 0);
            if field.names.is_empty() {
                let Some(name) = field.ty.embedded_name() else {
                    self.error(ctx, "invalid embedded field");
                    continue;
                };
                out.push(StructField {
                    name: name.to_string(),
                    ty,
                    tag: field.tag.clone(),
                    embedded: true,
                });
            } else {
                out.extend(field.names.iter().map(|name| StructField {
                    name: name.clone(),
                    ty: ty.clone(),
                    tag: field.tag.clone(),
                    embedded: false,
                }));
            }
        }
        StructType { fields: out }
    }

    fn interface_type(&mut self, ctx: Ctx<'s>, elems: &'s [InterfaceElem], depth: usize) -> InterfaceType {
        let mut methods: Vec<Method> = Vec::new();
        for elem in elems {
            match elem {
                InterfaceElem::Method {
                    name, signature, ..
                } => methods.push(Method {
                    name: name.clone(),
                    signature: self.signature(ctx, signature, None),
                    pointer_receiver: false,
                }),
                InterfaceElem::Embedded { ty, .. } => {
                    let embedded = self.resolve(ctx, ty, depth + 1);
                    match self.underlying(embedded, depth + 1) {
                        SemanticType::Interface(embedded) => methods.extend(embedded.methods),
                        SemanticType::Invalid => {}
                        _ => self.error(ctx, "embedded type is not an interface"),
                    }
                }
            }
        }
        methods.sort_by(|a, b| a.name.cmp(&b.name));
        methods.dedup_by(|a, b| a.name == b.name);
        InterfaceType { methods }
    }

    /// Value and type of a package-level constant.
    fn constant(&mut self, module: &str, name: &str) -> Option<Constant> {
        let (module, name, declared) = self.declared(module, name)?;
        let Object::Const { ty, value, iota } = declared.object else {
            return None;
        };
        if let Some(known) = self.constants.get(&(module, name)) {
            return known.clone();
        }
        let ctx = Ctx {
            module,
            file: declared.file,
        };
        if !self.evaluating.insert((module, name)) {
            self.error(ctx, format_args!("initialization cycle for {name}"));
            return None;
        }

        let evaluated = match value {
            Some(value) => self.eval(ctx, value, iota),
            None => {
                self.error(ctx, format_args!("missing init expr for {name}"));
                None
            }
        };
        let result = match (evaluated, ty) {
            (Some((value, _)), Some(ty)) => {
                let ty = self.resolve(ctx, ty, 0);
                Some((self.convert(value, &ty), ty))
            }
            (evaluated, _) => evaluated,
        };

        self.evaluating.remove(&(module, name));
        self.constants.insert((module, name), result.clone());
        result
    }

    /// Represents `value` as a constant of `ty`.
    fn convert(&mut self, value: ConstValue, ty: &SemanticType) -> ConstValue {
        match (self.underlying(ty.clone(), 0), signed(value)) {
            (SemanticType::Basic(kind), ConstValue::Int(v)) if is_float(kind) => {
                ConstValue::Float(v as f64)
            }
            (SemanticType::Basic(kind), ConstValue::Int(v)) if is_unsigned(kind) => {
                u128::try_from(v).map_or(ConstValue::Int(v), ConstValue::Uint)
            }
            (SemanticType::Basic(BasicKind::String), ConstValue::Int(v)) => ConstValue::String(
                u32::try_from(v)
                    .ok()
                    .and_then(char::from_u32)
                    .unwrap_or(char::REPLACEMENT_CHARACTER)
                    .to_string(),
            ),
            (_, value) => value,
        }
    }

    fn eval(&mut self, ctx: Ctx<'s>, expr: &'s ValueExpr, iota: i128) -> Option<Constant> {
        let basic = SemanticType::Basic;
        let constant = match expr {
            ValueExpr::Int(v) => (ConstValue::Int(*v), basic(BasicKind::UntypedInt)),
            ValueExpr::Float(v) => (ConstValue::Float(*v), basic(BasicKind::UntypedFloat)),
            ValueExpr::String(v) => (ConstValue::String(v.clone()), basic(BasicKind::UntypedString)),
            ValueExpr::Char(c) => (ConstValue::Int(i128::from(u32::from(*c))), basic(BasicKind::UntypedRune)),
            ValueExpr::Ident(name) => match name.as_str() {
                "iota" => (ConstValue::Int(iota), basic(BasicKind::UntypedInt)),
                "true" => (ConstValue::Bool(true), basic(BasicKind::UntypedBool)),
                "false" => (ConstValue::Bool(false), basic(BasicKind::UntypedBool)),
                _ => {
                    let found = self.constant(ctx.module, name);
                    if found.is_none() {
                        self.error(ctx, format_args!("{name} is not constant"));
                    }
                    return found;
                }
            },
            ValueExpr::Selector { module, name } => {
                let path = self.import_path(ctx, module)?;
                let found = self.constant(path, name);
                if found.is_none() {
                    self.error(ctx, format_args!("{module}.{name} is not constant"));
                }
                return found;
            }
            ValueExpr::Paren(inner) => return self.eval(ctx, inner, iota),
            ValueExpr::Unary { op, expr } => {
                let (value, ty) = self.eval(ctx, expr, iota)?;
                let value = match (op, signed(value)) {
                    (UnaryOp::Neg, ConstValue::Int(v)) => ConstValue::Int(-v),
                    (UnaryOp::Neg, ConstValue::Float(v)) => ConstValue::Float(-v),
                    (UnaryOp::Not, ConstValue::Bool(v)) => ConstValue::Bool(!v),
                    (op, _) => {
                        self.error(ctx, format_args!("invalid constant operation {op:?}"));
                        return None;
                    }
                };
                (value, ty)
            }
            ValueExpr::Binary { op, lhs, rhs } => {
                let (lhs, lhs_ty) = self.eval(ctx, lhs, iota)?;
                let (rhs, rhs_ty) = self.eval(ctx, rhs, iota)?;
                let ty = match (untyped(&lhs_ty), untyped(&rhs_ty)) {
                    (false, _) => lhs_ty,
                    (true, false) => rhs_ty,
                    (true, true) if untyped_rank(&rhs_ty) > untyped_rank(&lhs_ty) => rhs_ty,
                    (true, true) => lhs_ty,
                };
                match arith(*op, lhs, rhs) {
                    Ok(value) => (self.convert(value, &ty), ty),
                    Err(message) => {
                        self.error(ctx, message);
                        return None;
                    }
                }
            }
            ValueExpr::Call { callee, args } if args.len() == 1 => {
                let ty = self.resolve(ctx, callee, 0);
                let (value, _) = self.eval(ctx, &args[0], iota)?;
                (self.convert(value, &ty), ty)
            }
            ValueExpr::Call { .. } | ValueExpr::Composite(_) => {
                self.error(ctx, "expression is not constant");
                return None;
            }
        };
        Some(constant)
    }

    fn var_type(
        &mut self,
        ctx: Ctx<'s>,
        name: &str,
        ty: Option<&'s TypeExpr>,
        value: Option<&'s ValueExpr>,
        depth: usize,
    ) -> SemanticType {
        if let Some(ty) = ty {
            return self.resolve(ctx, ty, 0);
        }
        match value {
            Some(value) if depth <= MAX_DEPTH => self.infer(ctx, value, depth + 1),
            Some(_) => {
                self.error(ctx, format_args!("initialization cycle for {name}"));
                SemanticType::Invalid
            }
            None => {
                self.error(ctx, format_args!("missing type or init expr for {name}"));
                SemanticType::Invalid
            }
        }
    }

    /// Type of a variable initializer.
    fn infer(&mut self, ctx: Ctx<'s>, expr: &'s ValueExpr, depth: usize) -> SemanticType {
        match expr {
            ValueExpr::Composite(ty) => self.resolve(ctx, ty, 0),
            ValueExpr::Unary {
                op: UnaryOp::Ref,
                expr,
            } => SemanticType::pointer(self.infer(ctx, expr, depth)),
            ValueExpr::Paren(inner) => self.infer(ctx, inner, depth),
            ValueExpr::Call { callee, .. } => {
                let function = match callee {
                    TypeExpr::Ident(name) => Some((ctx.module, name.as_str())),
                    TypeExpr::Selector { module, name } => {
                        self.import_path(ctx, module).map(|path| (path, name.as_str()))
                    }
                    _ => None,
                }
                .and_then(|(module, name)| self.declared(module, name));
                match function {
                    Some((module, _, declared)) => match declared.object {
                        Object::Func(func) => {
                            let ctx = Ctx {
                                module,
                                file: declared.file,
                            };
                            let mut results = self.params(ctx, &func.signature.results);
                            if results.is_empty() {
                                self.error(ctx, format_args!("{} has no value", func.name));
                                SemanticType::Invalid
                            } else {
                                results.swap_remove(0).ty
                            }
                        }
                        _ => self.resolve(ctx, callee, 0),
                    },
                    None => self.resolve(ctx, callee, 0),
                }
            }
            ValueExpr::Ident(name) => match self.declared(ctx.module, name) {
                Some((module, name, declared)) => match declared.object {
                    Object::Var { ty, value } => {
                        let ctx = Ctx {
                            module,
                            file: declared.file,
                        };
                        self.var_type(ctx, name, ty, value, depth)
                    }
                    _ => self.infer_constant(ctx, expr),
                },
                None => self.infer_constant(ctx, expr),
            },
            _ => self.infer_constant(ctx, expr),
        }
    }

    fn infer_constant(&mut self, ctx: Ctx<'s>, expr: &'s ValueExpr) -> SemanticType {
        match self.eval(ctx, expr, 0) {
            Some((_, ty)) => default_type(ty),
            None => SemanticType::Invalid,
        }
    }
}
