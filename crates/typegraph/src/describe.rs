//! Self-description of type nodes: names, zero values, structural equality.

use rustc_hash::FxHashSet;

use crate::registry::Registry;
use crate::types::{ArrayKind, ChanDir, Field, FunctionType, Kind, TypeData, TypeId};

impl Registry {
    pub fn kind(&self, id: TypeId) -> Kind {
        self.get(id).kind()
    }

    /// Element of a pointer, array or channel, or the target of an alias.
    pub fn elem(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            TypeData::Pointer(elem) => Some(elem),
            TypeData::Array { elem, .. } | TypeData::Channel { elem, .. } => Some(elem),
            TypeData::Alias(alias) => alias.target,
            _ => None,
        }
    }

    /// Follows transparent aliases (`type A = B`) to the type they denote.
    pub fn unalias(&self, mut id: TypeId) -> TypeId {
        let mut seen = FxHashSet::default();
        while let TypeData::Alias(alias) = self.get(id) {
            match alias.target {
                Some(target) if alias.transparent && seen.insert(id) => id = target,
                _ => break,
            }
        }
        id
    }

    /// Follows every alias down to the first non-alias type.
    pub fn underlying(&self, mut id: TypeId) -> TypeId {
        let mut seen = FxHashSet::default();
        while let TypeData::Alias(alias) = self.get(id) {
            match alias.target {
                Some(target) if seen.insert(id) => id = target,
                _ => break,
            }
        }
        id
    }

    fn qualified(&self, module: &str, name: &str, qualified: bool, context: Option<&str>) -> String {
        if !qualified || context == Some(module) {
            return name.to_string();
        }
        match self.read(module) {
            Some(module) if module.is_builtin() => name.to_string(),
            Some(module) => module.fully_qualified(name),
            None => format!("{}.{name}", module.rsplit('/').next().unwrap_or(module)),
        }
    }

    /// Spelling of a type as it would be written in `context`.
    ///
    /// With `qualified` set, declared types from other modules are prefixed
    /// with their module identifier.
    pub fn name_of(&self, id: TypeId, qualified: bool, context: Option<&str>) -> String {
        match self.get(id) {
            TypeData::BuiltIn(kind) => kind.name().to_string(),
            TypeData::Record(record) => match &record.name {
                Some(name) => self.qualified(&record.module, name, qualified, context),
                None => {
                    let fields: Vec<String> = record
                        .fields
                        .iter()
                        .map(|field| {
                            let ty = self.name_of(field.ty, qualified, context);
                            if field.embedded {
                                ty
                            } else {
                                format!("{} {ty}", field.name)
                            }
                        })
                        .collect();
                    format!("struct{{{}}}", fields.join("; "))
                }
            },
            TypeData::Interface(interface) => match &interface.name {
                Some(name) => self.qualified(&interface.module, name, qualified, context),
                None => {
                    let methods: Vec<String> = interface
                        .methods
                        .iter()
                        .filter_map(|method| self.function(*method))
                        .map(|method| {
                            format!(
                                "{}{}",
                                method.name.as_deref().unwrap_or_default(),
                                self.signature(&method, qualified, context)
                            )
                        })
                        .collect();
                    format!("interface{{{}}}", methods.join("; "))
                }
            },
            TypeData::Function(function) => match (&function.name, &function.receiver) {
                (Some(name), None) => self.qualified(&function.module, name, qualified, context),
                _ => format!("func{}", self.signature(&function, qualified, context)),
            },
            TypeData::Alias(alias) => self.qualified(&alias.module, &alias.name, qualified, context),
            TypeData::Pointer(elem) => format!("*{}", self.name_of(elem, qualified, context)),
            TypeData::Array {
                kind: ArrayKind::Dynamic,
                elem,
                ..
            } => format!("[]{}", self.name_of(elem, qualified, context)),
            TypeData::Array { elem, size, .. } => {
                format!("[{size}]{}", self.name_of(elem, qualified, context))
            }
            TypeData::Map { key, value } => format!(
                "map[{}]{}",
                self.name_of(key, qualified, context),
                self.name_of(value, qualified, context)
            ),
            TypeData::Channel { elem, dir } => {
                let prefix = match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                };
                format!("{prefix}{}", self.name_of(elem, qualified, context))
            }
        }
    }

    /// `(a int, b ...string) (int, error)` without the `func` keyword.
    pub fn signature(&self, function: &FunctionType, qualified: bool, context: Option<&str>) -> String {
        let last = function.params.len().saturating_sub(1);
        let params: Vec<String> = function
            .params
            .iter()
            .enumerate()
            .map(|(i, param)| {
                let ty = match self.get(param.ty) {
                    TypeData::Array {
                        kind: ArrayKind::Dynamic,
                        elem,
                        ..
                    } if function.variadic && i == last => {
                        format!("...{}", self.name_of(elem, qualified, context))
                    }
                    _ => self.name_of(param.ty, qualified, context),
                };
                if param.name.is_empty() {
                    ty
                } else {
                    format!("{} {ty}", param.name)
                }
            })
            .collect();
        let results: Vec<String> = function
            .results
            .iter()
            .map(|result| {
                let ty = self.name_of(result.ty, qualified, context);
                if result.name.is_empty() {
                    ty
                } else {
                    format!("{} {ty}", result.name)
                }
            })
            .collect();

        let mut out = format!("({})", params.join(", "));
        match results.as_slice() {
            [] => {}
            [single] if function.results[0].name.is_empty() => {
                out.push(' ');
                out.push_str(single);
            }
            _ => out.push_str(&format!(" ({})", results.join(", "))),
        }
        out
    }

    /// Module-path qualified spelling, independent of identifiers.
    pub fn full_name(&self, id: TypeId) -> String {
        match self.get(id) {
            TypeData::BuiltIn(kind) => kind.name().to_string(),
            TypeData::Pointer(elem) => format!("*{}", self.full_name(elem)),
            TypeData::Array {
                kind: ArrayKind::Dynamic,
                elem,
                ..
            } => format!("[]{}", self.full_name(elem)),
            TypeData::Array { elem, size, .. } => format!("[{size}]{}", self.full_name(elem)),
            TypeData::Map { key, value } => {
                format!("map[{}]{}", self.full_name(key), self.full_name(value))
            }
            TypeData::Channel { elem, dir } => {
                let prefix = match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                };
                format!("{prefix}{}", self.full_name(elem))
            }
            data => match data.declared_name() {
                Some((module, name)) => format!("{module}/{name}"),
                None => self.name_of(id, true, None),
            },
        }
    }

    /// Zero value expression of a type as written in `context`.
    pub fn zero(&self, id: TypeId, qualified: bool, context: Option<&str>) -> String {
        match self.get(id) {
            TypeData::BuiltIn(kind) => kind.zero().to_string(),
            TypeData::Record(_) => format!("{}{{}}", self.name_of(id, qualified, context)),
            TypeData::Array {
                kind: ArrayKind::Fixed,
                ..
            } => format!("{}{{}}", self.name_of(id, qualified, context)),
            TypeData::Alias(alias) => {
                let Some(target) = alias.target else {
                    return "nil".to_string();
                };
                if alias.transparent {
                    return self.zero(target, qualified, context);
                }
                let name = self.name_of(id, qualified, context);
                let underlying = self.underlying(target);
                match self.get(underlying) {
                    TypeData::BuiltIn(kind) if kind.kind().is_builtin() => {
                        format!("{name}({})", kind.zero())
                    }
                    TypeData::Record(_)
                    | TypeData::Array {
                        kind: ArrayKind::Fixed,
                        ..
                    } => format!("{name}{{}}"),
                    _ => "nil".to_string(),
                }
            }
            _ => "nil".to_string(),
        }
    }

    /// Type identity: declared types by id, everything else by structure.
    pub fn equal(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        match (self.get(a), self.get(b)) {
            (TypeData::BuiltIn(x), TypeData::BuiltIn(y)) => x.canonical() == y.canonical(),
            (TypeData::Record(x), TypeData::Record(y)) if x.name.is_none() && y.name.is_none() => {
                x.fields.len() == y.fields.len()
                    && x.fields.iter().zip(&y.fields).all(|(f, g)| {
                        f.name == g.name
                            && f.tag == g.tag
                            && f.embedded == g.embedded
                            && self.equal(f.ty, g.ty)
                    })
            }
            (TypeData::Interface(x), TypeData::Interface(y))
                if x.name.is_none() && y.name.is_none() =>
            {
                x.methods.len() == y.methods.len()
                    && x
                        .methods
                        .iter()
                        .zip(&y.methods)
                        .all(|(m, n)| self.same_method(*m, *n))
            }
            (TypeData::Function(x), TypeData::Function(y)) if x.name.is_none() && y.name.is_none() => {
                self.same_signature(&x, &y)
            }
            (TypeData::Pointer(x), TypeData::Pointer(y)) => self.equal(x, y),
            (
                TypeData::Array {
                    kind: k1,
                    elem: e1,
                    size: s1,
                },
                TypeData::Array {
                    kind: k2,
                    elem: e2,
                    size: s2,
                },
            ) => k1 == k2 && s1 == s2 && self.equal(e1, e2),
            (TypeData::Map { key: k1, value: v1 }, TypeData::Map { key: k2, value: v2 }) => {
                self.equal(k1, k2) && self.equal(v1, v2)
            }
            (
                TypeData::Channel { elem: e1, dir: d1 },
                TypeData::Channel { elem: e2, dir: d2 },
            ) => d1 == d2 && self.equal(e1, e2),
            _ => false,
        }
    }

    pub(crate) fn same_method(&self, a: TypeId, b: TypeId) -> bool {
        match (self.function(a), self.function(b)) {
            (Some(x), Some(y)) => x.name == y.name && self.same_signature(&x, &y),
            _ => false,
        }
    }

    /// Parameters, results and variadic flag; names and receivers are ignored.
    pub(crate) fn same_signature(&self, a: &FunctionType, b: &FunctionType) -> bool {
        a.variadic == b.variadic
            && a.params.len() == b.params.len()
            && a.results.len() == b.results.len()
            && a.params
                .iter()
                .zip(&b.params)
                .all(|(p, q)| self.equal(p.ty, q.ty))
            && a.results
                .iter()
                .zip(&b.results)
                .all(|(p, q)| self.equal(p.ty, q.ty))
    }

    /// Finds a field of a record, searching embedded records depth-first.
    ///
    /// The returned field's `index` is the path of positions from `record`
    /// down to the field. Embedded pointers and aliases are followed.
    pub fn field_by_name(&self, record: TypeId, name: &str) -> Option<Field> {
        let mut visited = FxHashSet::default();
        self.find_field(record, name, &mut visited)
    }

    fn find_field(&self, id: TypeId, name: &str, visited: &mut FxHashSet<TypeId>) -> Option<Field> {
        let id = self.underlying(id);
        if !visited.insert(id) {
            return None;
        }
        let record = self.record(id)?;
        if let Some(field) = record.field(name) {
            return Some(field.clone());
        }
        for field in record.fields.iter().filter(|field| field.embedded) {
            let mut inner = self.underlying(field.ty);
            if let TypeData::Pointer(elem) = self.get(inner) {
                inner = elem;
            }
            if let Some(mut found) = self.find_field(inner, name, visited) {
                let mut index = field.index.clone();
                index.append(&mut found.index);
                found.index = index;
                return Some(found);
            }
        }
        None
    }
}
