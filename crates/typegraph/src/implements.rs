use crate::registry::Registry;
use crate::types::{TypeData, TypeId};

impl Registry {
    /// Reports whether values of `ty` satisfy `interface`.
    ///
    /// A pointer-receiver method only belongs to the method set of `*T`, so a
    /// record whose methods are declared on `*T` implements the interface only
    /// through a pointer. Transparent aliases are looked through; defined
    /// aliases have their own method sets.
    pub fn implements(&self, ty: TypeId, interface: TypeId) -> bool {
        let Some(interface) = self.interface(self.unalias(interface)) else {
            return false;
        };
        if interface.methods.is_empty() {
            return true;
        }

        let mut ty = self.unalias(ty);
        let mut pointer = false;
        if let TypeData::Pointer(elem) = self.get(ty) {
            pointer = true;
            ty = self.unalias(elem);
        }

        let methods: Vec<TypeId> = match self.get(ty) {
            TypeData::Record(record) => self.method_set(&record.methods, pointer),
            TypeData::Alias(alias) => self.method_set(&alias.methods, pointer),
            TypeData::Interface(other) if !pointer => other.methods.clone(),
            _ => return false,
        };

        interface.methods.iter().all(|wanted| {
            let Some(wanted) = self.function(*wanted) else {
                return false;
            };
            methods.iter().any(|have| {
                self.function(*have).is_some_and(|have| {
                    have.name == wanted.name && self.same_signature(&have, &wanted)
                })
            })
        })
    }

    fn method_set(&self, methods: &[TypeId], pointer: bool) -> Vec<TypeId> {
        methods
            .iter()
            .copied()
            .filter(|method| {
                pointer
                    || self
                        .function(*method)
                        .and_then(|function| function.receiver.clone())
                        .is_some_and(|receiver| !receiver.pointer)
            })
            .collect()
    }
}
