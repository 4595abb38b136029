//! Recovery of alias targets from their written right-hand side.
//!
//! The checker reports `type A B` with `B`'s underlying type, dropping the
//! fact that `A` was written in terms of `B`. For aliases built only from
//! names and wrappers the target is therefore rebuilt from syntax. Names that
//! cannot be found put the alias back on the worklist; a pass over the whole
//! worklist without progress, or too many passes, fails the remaining aliases.

use std::collections::VecDeque;

use typegraph_frontend::syntax::{ArrayLen, SyntaxFile, TypeExpr};
use typegraph_frontend::UNSAFE_MODULE;

use super::deref::chan_dir;
use super::{AliasCandidate, ModuleResolver};
use crate::builtins;
use crate::types::{ArrayKind, TypeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Unresolved {
    /// A name that is not (yet) known; worth another pass.
    Pending(String),
    /// Something the syntax path cannot express; retrying will not help.
    Unsupported(String),
}

impl ModuleResolver<'_> {
    pub(super) fn recover_aliases(&mut self) {
        let _span = tracing::trace_span!("recover_aliases").entered();
        let mut worklist: VecDeque<AliasCandidate<'_>> = std::mem::take(&mut self.candidates).into();
        let mut passes = 0;

        while !worklist.is_empty() {
            if passes == self.options.max_alias_passes {
                self.give_up(&worklist, "pass limit reached");
                return;
            }
            passes += 1;

            let mut progressed = false;
            for _ in 0..worklist.len() {
                let Some(candidate) = worklist.pop_front() else {
                    break;
                };
                match self.recover(candidate.expr, candidate.file) {
                    Ok(target) => {
                        let methods = self.methods(candidate.id, candidate.name, candidate.methods);
                        self.set_alias(
                            candidate.id,
                            candidate.name,
                            Some(target),
                            methods,
                            candidate.transparent,
                        );
                        progressed = true;
                    }
                    Err(Unresolved::Pending(missing)) => {
                        tracing::trace!(alias = candidate.name, %missing, "requeued");
                        worklist.push_back(candidate);
                    }
                    Err(Unresolved::Unsupported(what)) => {
                        self.skipped(format_args!(
                            "alias {} left unresolved: {what}",
                            candidate.name
                        ));
                        progressed = true;
                    }
                }
            }

            if !progressed {
                self.give_up(&worklist, "no progress");
                return;
            }
        }
        tracing::trace!(passes, "aliases recovered");
    }

    fn give_up(&self, worklist: &VecDeque<AliasCandidate<'_>>, reason: &str) {
        for candidate in worklist {
            tracing::warn!(
                module = %self.module.path(),
                alias = candidate.name,
                reason,
                "alias target could not be resolved"
            );
        }
    }

    pub(super) fn recover(&self, expr: &TypeExpr, file: &SyntaxFile) -> Result<TypeId, Unresolved> {
        let store = self.registry.store();
        match expr {
            TypeExpr::Ident(name) => self
                .module
                .get_type(name)
                .or_else(|| builtins::lookup(name))
                .ok_or_else(|| Unresolved::Pending(name.clone())),
            TypeExpr::Selector { module, name } => self.recover_selector(module, name, file),
            TypeExpr::Star(elem) => Ok(store.pointer(self.recover(elem, file)?)),
            TypeExpr::Paren(elem) => self.recover(elem, file),
            TypeExpr::Array { len: None, elem } => {
                Ok(store.array(ArrayKind::Dynamic, self.recover(elem, file)?, 0))
            }
            TypeExpr::Array {
                len: Some(len),
                elem,
            } => {
                let size = self.array_len(len)?;
                Ok(store.array(ArrayKind::Fixed, self.recover(elem, file)?, size))
            }
            TypeExpr::Map { key, value } => {
                let key = self.recover(key, file)?;
                Ok(store.map(key, self.recover(value, file)?))
            }
            TypeExpr::Chan { dir, elem } => {
                let dir = chan_dir(*dir)
                    .ok_or_else(|| Unresolved::Unsupported("channel without direction".to_string()))?;
                Ok(store.channel(self.recover(elem, file)?, dir))
            }
            TypeExpr::Func(_) | TypeExpr::Struct(_) | TypeExpr::Interface(_) | TypeExpr::Ellipsis(_) => {
                Err(Unresolved::Unsupported("type literal".to_string()))
            }
        }
    }

    fn recover_selector(&self, qualifier: &str, name: &str, file: &SyntaxFile) -> Result<TypeId, Unresolved> {
        let qualified = || format!("{qualifier}.{name}");
        let imported = file.imports.iter().find_map(|import| {
            let matches = match &import.name {
                Some(local) => local == qualifier,
                None => self.registry.read(&import.path).map_or_else(
                    || import.path.rsplit('/').next() == Some(qualifier),
                    |module| module.identifier() == qualifier,
                ),
            };
            matches.then_some(import.path.as_str())
        });

        match imported {
            Some(UNSAFE_MODULE) if name == "Pointer" => Ok(TypeId::UNSAFE_POINTER),
            Some(path) => self
                .registry
                .read(path)
                .and_then(|module| module.get_type(name))
                .ok_or_else(|| Unresolved::Pending(qualified())),
            None if qualifier == UNSAFE_MODULE && name == "Pointer" => Ok(TypeId::UNSAFE_POINTER),
            None => Err(Unresolved::Unsupported(format!("{} is not imported", qualifier))),
        }
    }

    fn array_len(&self, len: &ArrayLen) -> Result<usize, Unresolved> {
        let size = match len {
            ArrayLen::Literal(size) => Some(*size),
            ArrayLen::Ident(constant) => match self.loaded.scope.constant(constant) {
                Some(value) => value.as_u64(),
                None => return Err(Unresolved::Pending(constant.clone())),
            },
            ArrayLen::Ellipsis => None,
        };
        size.and_then(|size| usize::try_from(size).ok())
            .ok_or_else(|| Unresolved::Unsupported("array length".to_string()))
    }
}
