//! Attaches documentation from syntax to the resolved nodes, by name.

use std::sync::Arc;

use typegraph_frontend::syntax::{Decl, FieldSyntax, FuncDecl, GenDecl, InterfaceElem, Spec, TypeExpr, TypeSpec};

use super::ModuleResolver;
use crate::types::{TypeData, TypeId};

impl ModuleResolver<'_> {
    pub(super) fn attach_comments(&self) {
        let _span = tracing::trace_span!("attach_comments").entered();
        for file in &self.loaded.files {
            for decl in &file.decls {
                match decl {
                    Decl::Gen(gen) => self.gen_comments(gen),
                    Decl::Func(func) => self.func_comment(func),
                }
            }
        }
    }

    fn gen_comments(&self, gen: &GenDecl) {
        // An unparenthesized declaration keeps its doc on the group.
        let group_doc = if gen.specs.len() == 1 {
            gen.doc.as_deref()
        } else {
            None
        };
        for spec in &gen.specs {
            match spec {
                Spec::Type(spec) => self.type_comments(spec, spec.doc.as_deref().or(group_doc)),
                Spec::Value(spec) => {
                    if let Some(doc) = spec.doc.as_deref().or(group_doc) {
                        for name in &spec.names {
                            self.module.set_declaration_comment(name, doc);
                        }
                    }
                }
            }
        }
    }

    fn type_comments(&self, spec: &TypeSpec, doc: Option<&str>) {
        let Some(id) = self.module.get_type(&spec.name) else {
            return;
        };
        if let Some(doc) = doc {
            self.set_comment(id, doc);
        }

        match (&spec.ty, self.registry.get(id)) {
            (TypeExpr::Struct(fields), TypeData::Record(_)) => self.field_comments(id, fields),
            (TypeExpr::Interface(elems), TypeData::Interface(interface)) => {
                for elem in elems {
                    if let InterfaceElem::Method {
                        doc: Some(doc),
                        name,
                        ..
                    } = elem
                    {
                        self.method_comment(&interface.methods, name, doc);
                    }
                }
            }
            (expr, TypeData::Alias(alias)) => {
                // `type P ***struct{...}`: docs go to the inline record.
                let TypeExpr::Struct(fields) = expr.base() else {
                    return;
                };
                let mut target = alias.target;
                while let Some(current) = target {
                    match self.registry.get(current) {
                        TypeData::Pointer(elem) => target = Some(elem),
                        TypeData::Record(record) if record.name.is_none() => {
                            self.field_comments(current, fields);
                            return;
                        }
                        _ => return,
                    }
                }
            }
            _ => {}
        }
    }

    fn field_comments(&self, record: TypeId, fields: &[FieldSyntax]) {
        for field in fields {
            let Some(doc) = field.doc.as_deref() else {
                continue;
            };
            let names: Vec<&str> = if field.names.is_empty() {
                field.ty.embedded_name().into_iter().collect()
            } else {
                field.names.iter().map(String::as_str).collect()
            };
            self.registry.store().update(record, |data| {
                if let TypeData::Record(record) = data {
                    for field in Arc::make_mut(record)
                        .fields
                        .iter_mut()
                        .filter(|field| names.contains(&field.name.as_str()))
                    {
                        field.comment = Some(doc.to_string());
                    }
                }
            });
        }
    }

    fn func_comment(&self, func: &FuncDecl) {
        let Some(doc) = func.doc.as_deref() else {
            return;
        };
        let Some(receiver) = &func.receiver else {
            if let Some(id) = self.module.get_type(&func.name) {
                self.set_comment(id, doc);
            }
            return;
        };

        // Receivers may be written as `T`, `*T` or `(**T)`.
        let TypeExpr::Ident(owner) = receiver.ty.base() else {
            return;
        };
        let Some(owner) = self.module.get_type(owner) else {
            return;
        };
        let methods = match self.registry.get(owner) {
            TypeData::Record(record) => record.methods.clone(),
            TypeData::Alias(alias) => alias.methods.clone(),
            _ => return,
        };
        self.method_comment(&methods, &func.name, doc);
    }

    fn method_comment(&self, methods: &[TypeId], name: &str, doc: &str) {
        let found = methods.iter().copied().find(|method| {
            self.registry
                .function(*method)
                .is_some_and(|function| function.name.as_deref() == Some(name))
        });
        if let Some(method) = found {
            self.set_comment(method, doc);
        }
    }

    fn set_comment(&self, id: TypeId, doc: &str) {
        self.registry.store().update(id, |data| {
            if let Some(comment) = data.comment_mut() {
                *comment = Some(doc.to_string());
            }
        });
    }
}
