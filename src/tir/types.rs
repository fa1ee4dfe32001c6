//! Interned TIR type cache.

use std::collections::HashMap;

use crate::tir::layout::{TirLayout, TirLayoutCache};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TirTypeId(pub u32);

impl TirTypeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TirTypeKind {
    Void,
    Bool,
    Int {
        signed: bool,
        bits: u8,
    },
    Float {
        bits: u8,
    },
    Ptr {
        elem: TirTypeId,
    },
    Array {
        elem: TirTypeId,
        dims: Vec<u64>,
    },
    Vector {
        elem: TirTypeId,
        lanes: u64,
    },
    Struct {
        fields: Vec<TirStructField>,
    },
    Fn {
        params: Vec<TirTypeId>,
        ret: TirTypeId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TirStructField {
    pub name: String,
    pub ty: TirTypeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TirTypeInfo {
    pub kind: TirTypeKind,
    pub name: Option<String>,
}

/// Type table for one target module. Types are interned structurally so that
/// repeated lowering of the same TAST type signature yields the same id.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TirTypeCache {
    types: Vec<TirTypeInfo>,
    by_kind: HashMap<TirTypeKind, TirTypeId>,
    by_name: HashMap<String, TirTypeId>,
    layout_cache: TirLayoutCache,
}

impl TirTypeCache {
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            by_kind: HashMap::new(),
            by_name: HashMap::new(),
            layout_cache: TirLayoutCache::new(),
        }
    }

    /// Interns an anonymous type, reusing the existing id for an identical kind.
    pub fn intern(&mut self, kind: TirTypeKind) -> TirTypeId {
        if let Some(id) = self.by_kind.get(&kind) {
            return *id;
        }
        let id = TirTypeId(self.types.len() as u32);
        self.types.push(TirTypeInfo {
            kind: kind.clone(),
            name: None,
        });
        self.by_kind.insert(kind, id);
        id
    }

    /// Adds a named type. Named types are unique per name; re-adding a name
    /// returns the existing id without checking the kind (callers build each
    /// named type exactly once).
    pub fn add_named(&mut self, name: impl Into<String>, kind: TirTypeKind) -> TirTypeId {
        let name = name.into();
        if let Some(id) = self.by_name.get(&name) {
            return *id;
        }
        let id = TirTypeId(self.types.len() as u32);
        self.types.push(TirTypeInfo {
            kind,
            name: Some(name.clone()),
        });
        self.by_name.insert(name, id);
        id
    }

    pub fn lookup_named(&self, name: &str) -> Option<TirTypeId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: TirTypeId) -> &TirTypeInfo {
        &self.types[id.index()]
    }

    pub fn kind(&self, id: TirTypeId) -> &TirTypeKind {
        &self.get(id).kind
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn ptr_to(&mut self, elem: TirTypeId) -> TirTypeId {
        self.intern(TirTypeKind::Ptr { elem })
    }

    /// Element type behind a pointer type.
    pub fn pointee(&self, id: TirTypeId) -> TirTypeId {
        match self.kind(id) {
            TirTypeKind::Ptr { elem } => *elem,
            other => panic!("codegen bug: pointee of non-pointer type {:?}", other),
        }
    }

    /// Returns layout information for a type, computing it on demand.
    pub fn layout(&mut self, id: TirTypeId) -> TirLayout {
        self.layout_cache.layout(&self.types, id)
    }
}

#[cfg(test)]
#[path = "../tests/t_tir_types.rs"]
mod tests;
