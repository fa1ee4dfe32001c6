//! Flat symbol table shared by a TAST module.

use crate::tast::expr::Expr;
use crate::tast::types::Ttype;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

impl SymbolId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Default,
    Allocatable,
    Pointer,
    Parameter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Local,
    In,
    Out,
    InOut,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub ty: Ttype,
    pub storage: Storage,
    pub intent: Intent,
    /// Declaration initializer, lowered at function entry.
    pub init: Option<Expr>,
}

impl Symbol {
    pub fn local(name: impl Into<String>, ty: Ttype) -> Self {
        Self {
            name: name.into(),
            ty,
            storage: Storage::Default,
            intent: Intent::Local,
            init: None,
        }
    }

    pub fn arg(name: impl Into<String>, ty: Ttype, intent: Intent) -> Self {
        Self {
            name: name.into(),
            ty,
            storage: Storage::Default,
            intent,
            init: None,
        }
    }

    pub fn with_storage(mut self, storage: Storage) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_init(mut self, init: Expr) -> Self {
        self.init = Some(init);
        self
    }

    pub fn is_arg(&self) -> bool {
        !matches!(self.intent, Intent::Local)
    }

    /// Whether the variable's slot holds a pointer to the value rather than
    /// the value itself (pass-by-reference arguments, pointer/allocatable
    /// scalars). Such values need one extra load to reach.
    pub fn extra_indirection(&self) -> bool {
        if self.is_arg() {
            return true;
        }
        matches!(self.storage, Storage::Allocatable | Storage::Pointer) && self.ty.is_scalar()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            symbols: Vec::new(),
        }
    }

    pub fn add(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
