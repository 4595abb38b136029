use tracing::warn;
use typegraph_frontend::SemanticObject;

use super::ModuleResolver;
use crate::module::Declaration;

impl ModuleResolver<'_> {
    /// Records the constants and variables set aside during scaffolding.
    pub(super) fn define_declarations(&mut self) {
        let deferred = std::mem::take(&mut self.deferred);
        for name in deferred {
            let (ty, constant, value) = match self.loaded.scope.object(name) {
                Some(SemanticObject::Const { ty, value }) => (ty, true, Some(value.clone())),
                Some(SemanticObject::Var { ty }) => (ty, false, None),
                _ => continue,
            };
            let Some(ty) = self.deref(ty) else {
                warn!(module = %self.module.path(), declaration = name, "declaration omitted");
                continue;
            };
            let declaration = Declaration {
                module: self.module.path().to_string(),
                identifier: self.module.identifier().to_string(),
                name: name.to_string(),
                comment: None,
                ty,
                constant,
                value,
            };
            if let Err(err) = self.module.insert_declaration(declaration) {
                warn!(module = %self.module.path(), declaration = name, "declaration omitted: {err}");
            }
        }
    }
}
