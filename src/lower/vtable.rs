//! Per-type vtable singletons for dynamic type identification.
//!
//! One global per (concrete type, enclosing scope) holding the type's hash.
//! The global exists only for identity comparison against a class wrapper's
//! hash; dispatch never indexes through it as a function table.

use std::collections::HashMap;

use crate::lower::types::TypeLowerer;
use crate::tir::{GlobalId, GlobalInit, ModuleBuilder};

#[derive(Debug, Default)]
pub struct VtableRegistry {
    singletons: HashMap<(String, String), GlobalId>,
}

impl VtableRegistry {
    pub fn new() -> Self {
        Self {
            singletons: HashMap::new(),
        }
    }

    /// Returns the singleton vtable global for the given concrete type in the
    /// given scope, creating it on first use.
    pub fn get_or_create(
        &mut self,
        mb: &mut ModuleBuilder,
        types: &mut TypeLowerer,
        type_name: &str,
        scope: &str,
    ) -> GlobalId {
        let key = (type_name.to_string(), scope.to_string());
        if let Some(id) = self.singletons.get(&key) {
            return *id;
        }

        let hash = types
            .layout_of(type_name)
            .unwrap_or_else(|| panic!("codegen bug: vtable for unregistered type '{}'", type_name))
            .type_hash;
        let vtable_ty = types.vtable_ty();
        let id = mb.add_global(
            format!("vtable_{}_{}", scope, type_name),
            vtable_ty,
            GlobalInit::Int(hash as i128),
        );
        self.singletons.insert(key, id);
        id
    }

    pub fn len(&self) -> usize {
        self.singletons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.singletons.is_empty()
    }
}
