//! # Type-graph resolution
//!
//! One [`ModuleResolver`] per new module drives that module through:
//!
//! 1. [`scaffold`]: placeholders for every declared type, registered in the
//!    module table before any body is built.
//! 2. [`deref`]: bodies of records, interfaces, functions and aliases whose
//!    target the checker reports.
//! 3. [`alias`]: targets of aliases whose spelling must be read back from
//!    syntax, via a bounded worklist.
//! 4. [`declarations`] and [`comments`]: constants, variables and docs.
//!
//! Step 1 of every module in a session completes before step 2 of any module
//! starts; see [`crate::session`].

mod alias;
mod comments;
mod declarations;
mod deref;
mod scaffold;

use std::sync::Arc;

use tracing::{debug, warn};
use typegraph_frontend::semantic::{InterfaceType, Method, Signature, StructType};
use typegraph_frontend::syntax::{SyntaxFile, TypeExpr};
use typegraph_frontend::{LoadedModule, SemanticType};

use crate::module::Module;
use crate::registry::Registry;
use crate::types::TypeId;

#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolveOptions {
    pub verbose: bool,
    pub max_alias_passes: usize,
}

/// A placeholder whose body comes from the semantic scope.
#[derive(Debug)]
enum Placeholder<'a> {
    Record {
        id: TypeId,
        name: &'a str,
        body: &'a StructType,
        methods: &'a [Method],
    },
    Interface {
        id: TypeId,
        name: &'a str,
        body: &'a InterfaceType,
    },
    Function {
        id: TypeId,
        name: &'a str,
        signature: &'a Signature,
    },
    Alias {
        id: TypeId,
        name: &'a str,
        target: &'a SemanticType,
        methods: &'a [Method],
        transparent: bool,
    },
}

/// An alias whose target is recovered from its written right-hand side.
#[derive(Debug, Clone, Copy)]
struct AliasCandidate<'a> {
    id: TypeId,
    name: &'a str,
    expr: &'a TypeExpr,
    file: &'a SyntaxFile,
    methods: &'a [Method],
    transparent: bool,
}

pub(crate) struct ModuleResolver<'a> {
    registry: &'a Registry,
    loaded: &'a LoadedModule,
    module: Arc<Module>,
    options: ResolveOptions,
    placeholders: Vec<Placeholder<'a>>,
    candidates: Vec<AliasCandidate<'a>>,
    deferred: Vec<&'a str>,
}

impl<'a> ModuleResolver<'a> {
    pub(crate) fn module(&self) -> &Arc<Module> {
        &self.module
    }

    /// Runs every phase after the scaffold barrier.
    pub(crate) fn resolve(mut self) {
        let _span = tracing::debug_span!("resolve", module = %self.module.path()).entered();
        self.resolve_placeholders();
        self.recover_aliases();
        self.define_declarations();
        self.attach_comments();
        debug!(
            types = self.module.type_names().len(),
            declarations = self.module.declarations().len(),
            "module resolved"
        );
    }

    /// Records something that was left out of the model.
    fn skipped(&self, what: std::fmt::Arguments<'_>) {
        if self.options.verbose {
            warn!(module = %self.module.path(), "{what}");
        } else {
            debug!(module = %self.module.path(), "{what}");
        }
    }
}
