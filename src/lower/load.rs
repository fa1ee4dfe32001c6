//! Pointer-indirection protocol for value production.
//!
//! Every terminal value-producing visit (variable reference, member access,
//! array element) ends by peeling pointer indirections off the raw address it
//! would otherwise return. The number of loads to apply is carried on the
//! lowerer as a single [`LoadLevel`], set by the caller and capped by the
//! referenced entity's own indirection chain:
//!
//! - `AddressOnly`: return the raw slot address (assignment targets of plain
//!   locals, argument materialization).
//! - `OneLoad`: peel the variable slot only; yields the data address for
//!   by-reference arguments and pointer/allocatable variables.
//! - `TwoLoads`: load through to the value (the default for value contexts).
//!
//! Non-scalar values never load elements: their indirection chain stops at
//! the descriptor/aggregate address, so a `TwoLoads` request on a local array
//! still returns the descriptor address untouched.
//!
//! The level MUST be restored around every nested visit; a leaked level
//! corrupts sibling expression lowering. [`FuncLowerer::with_load_level`]
//! is the only sanctioned way to change it.

use crate::lower::lowerer::FuncLowerer;
use crate::tast::{Symbol, Ttype};
use crate::tir::{TirTypeId, ValueId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadLevel {
    AddressOnly,
    OneLoad,
    TwoLoads,
}

impl LoadLevel {
    /// Maximum number of loads this level permits.
    pub fn cap(self) -> u32 {
        match self {
            LoadLevel::AddressOnly => 0,
            LoadLevel::OneLoad => 1,
            LoadLevel::TwoLoads => 2,
        }
    }
}

/// Loads required to take a variable's slot address to its value
/// representative: the register value for scalars, the descriptor/aggregate
/// address for everything else.
pub(super) fn indirection_chain(sym: &Symbol) -> u32 {
    let extra = if sym.extra_indirection() { 1 } else { 0 };
    if sym.ty.is_scalar() {
        1 + extra
    } else {
        extra
    }
}

impl<'a> FuncLowerer<'a> {
    /// Runs `f` with the load level replaced, restoring the previous level on
    /// every non-panic exit path (including `?` propagation in `f`'s result).
    pub(super) fn with_load_level<T>(
        &mut self,
        level: LoadLevel,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved = std::mem::replace(&mut self.load_level, level);
        let result = f(self);
        self.load_level = saved;
        result
    }

    /// Level that takes a symbol reference to the place a store may target.
    pub(super) fn place_level(&self, sym: &Symbol) -> LoadLevel {
        if sym.extra_indirection() {
            LoadLevel::OneLoad
        } else {
            LoadLevel::AddressOnly
        }
    }

    /// Applies `min(level, chain)` loads to `addr`, peeling one pointer type
    /// per load. `addr_ty` is the TIR type of `addr` itself (a pointer).
    pub(super) fn apply_loads(
        &mut self,
        mut addr: ValueId,
        mut addr_ty: TirTypeId,
        chain: u32,
    ) -> (ValueId, TirTypeId) {
        let count = self.load_level.cap().min(chain);
        for _ in 0..count {
            let elem = self.types.cache.pointee(addr_ty);
            addr = self.fb.load(self.bb, addr, elem);
            addr_ty = elem;
        }
        (addr, addr_ty)
    }

    /// Applies loads for a computed element/field address whose pointee is
    /// `value_ty`: one load for scalars in value context, none for aggregates.
    pub(super) fn apply_elem_loads(
        &mut self,
        addr: ValueId,
        addr_ty: TirTypeId,
        value_ty: &Ttype,
    ) -> (ValueId, TirTypeId) {
        let chain = if value_ty.is_scalar() { 1 } else { 0 };
        self.apply_loads(addr, addr_ty, chain)
    }
}

#[cfg(test)]
#[path = "../tests/t_load.rs"]
mod tests;
