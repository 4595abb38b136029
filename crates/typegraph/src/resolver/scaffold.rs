use std::sync::Arc;

use rustc_hash::FxHashMap;
use typegraph_frontend::syntax::{Decl, Spec, SyntaxFile, TypeExpr};
use typegraph_frontend::{LoadedModule, SemanticObject, SemanticType};

use super::{AliasCandidate, ModuleResolver, Placeholder, ResolveOptions};
use crate::error::RegistryError;
use crate::registry::Registry;
use crate::types::{AliasType, FunctionType, InterfaceType, RecordType, TypeData, TypeId};

/// Whether a right-hand side only names or wraps other types. Such
/// declarations lose their written chain in the checker's output, so their
/// target is read back from syntax.
pub(super) fn is_alias_candidate(expr: &TypeExpr) -> bool {
    match expr {
        TypeExpr::Ident(_) | TypeExpr::Selector { .. } => true,
        TypeExpr::Star(elem) | TypeExpr::Paren(elem) => is_alias_candidate(elem),
        TypeExpr::Array { elem, .. } | TypeExpr::Chan { elem, .. } => is_alias_candidate(elem),
        TypeExpr::Map { key, value } => is_alias_candidate(key) && is_alias_candidate(value),
        TypeExpr::Func(_)
        | TypeExpr::Struct(_)
        | TypeExpr::Interface(_)
        | TypeExpr::Ellipsis(_) => false,
    }
}

fn candidate_specs(files: &[SyntaxFile]) -> FxHashMap<&str, (&TypeExpr, &SyntaxFile)> {
    let mut specs = FxHashMap::default();
    for file in files {
        for decl in &file.decls {
            let Decl::Gen(gen) = decl else { continue };
            for spec in &gen.specs {
                if let Spec::Type(spec) = spec {
                    if is_alias_candidate(&spec.ty) {
                        specs.insert(spec.name.as_str(), (&spec.ty, file));
                    }
                }
            }
        }
    }
    specs
}

impl<'a> ModuleResolver<'a> {
    /// Creates the module and a placeholder for each declared type.
    ///
    /// Nothing here looks at another module, so scaffolds of a session may run
    /// in any order.
    pub(crate) fn scaffold(
        registry: &'a Registry,
        loaded: &'a LoadedModule,
        options: ResolveOptions,
    ) -> Result<Self, RegistryError> {
        let _span = tracing::trace_span!("scaffold", module = %loaded.path).entered();

        let identifier = if loaded.name.is_empty() {
            loaded.path.rsplit('/').next().unwrap_or(&loaded.path)
        } else {
            &loaded.name
        };
        let mut resolver = Self {
            registry,
            loaded,
            module: registry.new_module(&loaded.path, identifier),
            options,
            placeholders: Vec::new(),
            candidates: Vec::new(),
            deferred: Vec::new(),
        };

        let candidates = candidate_specs(&loaded.files);
        for (name, object) in &loaded.scope.objects {
            match object {
                SemanticObject::TypeName { ty, alias } => {
                    resolver.scaffold_type(name, ty, *alias, candidates.get(name.as_str()))?;
                }
                SemanticObject::Func { signature } => {
                    let id = resolver.alloc_function(name);
                    resolver.module.new_named_type(name, id)?;
                    resolver.placeholders.push(Placeholder::Function {
                        id,
                        name: name.as_str(),
                        signature,
                    });
                }
                SemanticObject::Const { .. } | SemanticObject::Var { .. } => {
                    resolver.deferred.push(name);
                }
            }
        }

        tracing::trace!(
            placeholders = resolver.placeholders.len(),
            aliases = resolver.candidates.len(),
            deferred = resolver.deferred.len(),
            "scaffolded"
        );
        Ok(resolver)
    }

    fn scaffold_type(
        &mut self,
        name: &'a str,
        ty: &'a SemanticType,
        transparent: bool,
        candidate: Option<&(&'a TypeExpr, &'a SyntaxFile)>,
    ) -> Result<(), RegistryError> {
        let methods = self
            .loaded
            .scope
            .named_info(name)
            .map(|info| info.methods.as_slice())
            .unwrap_or_default();

        if let Some(&(expr, file)) = candidate {
            let id = self.alloc_alias(name, transparent);
            self.module.new_named_type(name, id)?;
            self.candidates.push(AliasCandidate {
                id,
                name,
                expr,
                file,
                methods,
                transparent,
            });
            return Ok(());
        }

        if transparent {
            let id = self.alloc_alias(name, true);
            self.module.new_named_type(name, id)?;
            self.placeholders.push(Placeholder::Alias {
                id,
                name,
                target: ty,
                methods: &[],
                transparent: true,
            });
            return Ok(());
        }

        let Some(info) = self.loaded.scope.named_info(name) else {
            self.skipped(format_args!("type {name} has no underlying type"));
            return Ok(());
        };
        let placeholder = match &info.underlying {
            SemanticType::Struct(body) => {
                let id = self.alloc_record(name, body.fields.len());
                Placeholder::Record {
                    id,
                    name,
                    body,
                    methods,
                }
            }
            SemanticType::Interface(body) => {
                let id = self.alloc_interface(name, body.methods.len());
                Placeholder::Interface { id, name, body }
            }
            target => Placeholder::Alias {
                id: self.alloc_alias(name, false),
                name,
                target,
                methods,
                transparent: false,
            },
        };
        let id = match &placeholder {
            Placeholder::Record { id, .. }
            | Placeholder::Interface { id, .. }
            | Placeholder::Function { id, .. }
            | Placeholder::Alias { id, .. } => *id,
        };
        self.module.new_named_type(name, id)?;
        self.placeholders.push(placeholder);
        Ok(())
    }

    fn alloc_record(&self, name: &str, fields: usize) -> TypeId {
        let module = self.module.path().to_string();
        self.registry.store().alloc(|id| {
            TypeData::Record(Arc::new(RecordType {
                id,
                module,
                name: Some(name.to_string()),
                comment: None,
                fields: Vec::with_capacity(fields),
                methods: Vec::new(),
            }))
        })
    }

    fn alloc_interface(&self, name: &str, methods: usize) -> TypeId {
        let module = self.module.path().to_string();
        self.registry.store().alloc(|id| {
            TypeData::Interface(Arc::new(InterfaceType {
                id,
                module,
                name: Some(name.to_string()),
                comment: None,
                methods: Vec::with_capacity(methods),
            }))
        })
    }

    fn alloc_alias(&self, name: &str, transparent: bool) -> TypeId {
        let module = self.module.path().to_string();
        self.registry.store().alloc(|id| {
            TypeData::Alias(Arc::new(AliasType {
                id,
                module,
                name: name.to_string(),
                comment: None,
                target: None,
                methods: Vec::new(),
                transparent,
            }))
        })
    }

    fn alloc_function(&self, name: &str) -> TypeId {
        let module = self.module.path().to_string();
        self.registry.store().alloc(|id| {
            TypeData::Function(Arc::new(FunctionType {
                id,
                module,
                name: Some(name.to_string()),
                comment: None,
                receiver: None,
                params: Vec::new(),
                results: Vec::new(),
                variadic: false,
            }))
        })
    }
}
