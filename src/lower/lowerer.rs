//! Lowering state for one function body.
//!
//! Tracks the function builder, the symbol -> TIR value table (with its
//! parallel physical-layout map), the indirection level, the pending heap
//! deallocations, and the two dynamically-scoped resolution contexts
//! (current struct, current selector view). The context fields are only ever
//! mutated through the `with_*` helpers so that every nested visit restores
//! them symmetrically.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::lower::errors::CodeGenError;
use crate::lower::load::LoadLevel;
use crate::lower::mem::ScopeAllocs;
use crate::lower::types::TypeLowerer;
use crate::lower::vtable::VtableRegistry;
use crate::options::CodegenOptions;
use crate::tast::{self, PhysicalType, Symbol, SymbolId, Ttype};
use crate::tir::{
    BinOp, CastKind, CmpOp, FuncId, FunctionBuilder, GlobalId, LocalId, ModuleBuilder, RuntimeFn,
    Terminator, TirTypeId, ValueId,
};

/// A symbol's lowered binding: the address of its variable slot plus the
/// physical layout of its current value, tracked separately because the
/// layout changes under physical conversions.
#[derive(Debug, Clone, Copy)]
pub(super) struct SymBinding {
    pub addr: ValueId,
    pub phys: Option<PhysicalType>,
}

pub(super) struct FuncLowerer<'a> {
    pub(super) module: &'a tast::Module,
    pub(super) options: &'a CodegenOptions,
    pub(super) types: &'a mut TypeLowerer,
    pub(super) vtables: &'a mut VtableRegistry,
    pub(super) mb: &'a mut ModuleBuilder,
    pub(super) globals: &'a HashMap<SymbolId, GlobalId>,
    pub(super) fb: FunctionBuilder,
    /// Block currently receiving instructions.
    pub(super) bb: crate::tir::BlockId,
    /// Whether `bb` still needs a terminator.
    pub(super) block_open: bool,
    /// Whether `bb` can be reached; false for the continuation block
    /// started after a `return`/`stop` so fall-off handling does not emit
    /// cleanup for dead code.
    pub(super) reachable: bool,
    pub(super) func_name: String,
    pub(super) symbols: IndexMap<SymbolId, SymBinding>,
    pub(super) load_level: LoadLevel,
    pub(super) scope_allocs: ScopeAllocs,
    /// Struct whose fields are currently being resolved (member chains).
    pub(super) current_struct: Option<String>,
    /// Concrete-type view of a `select type` selector inside a clause body.
    pub(super) selector_view: Option<(SymbolId, Ttype)>,
}

impl<'a> FuncLowerer<'a> {
    pub(super) fn new(
        module: &'a tast::Module,
        options: &'a CodegenOptions,
        types: &'a mut TypeLowerer,
        vtables: &'a mut VtableRegistry,
        mb: &'a mut ModuleBuilder,
        globals: &'a HashMap<SymbolId, GlobalId>,
        func_id: FuncId,
        func: &tast::Function,
    ) -> Result<Self, CodeGenError> {
        let ret = match &func.ret {
            Some(ty) if ty.is_scalar() => types.lower_type(ty),
            Some(_) => {
                return Err(CodeGenError::AggregateReturn {
                    span: crate::diag::Span::default(),
                });
            }
            None => types.void_ty(),
        };

        let mut params = Vec::with_capacity(func.args.len());
        for arg in &func.args {
            let sym = module.symbols.get(*arg);
            let value_ty = types.lower_type(&sym.ty);
            if func.bind_c && sym.ty.is_scalar() {
                params.push(value_ty);
            } else {
                params.push(types.cache.ptr_to(value_ty));
            }
        }

        let sig = crate::tir::FunctionSig { params, ret };
        let mut fb = FunctionBuilder::new(func_id, func.name.clone(), sig);
        let entry = fb.add_block();

        Ok(Self {
            module,
            options,
            types,
            vtables,
            mb,
            globals,
            fb,
            bb: entry,
            block_open: true,
            reachable: true,
            func_name: func.name.clone(),
            symbols: IndexMap::new(),
            load_level: LoadLevel::TwoLoads,
            scope_allocs: ScopeAllocs::new(),
            current_struct: None,
            selector_view: None,
        })
    }

    // --- Symbol access ---

    pub(super) fn sym(&self, id: SymbolId) -> &Symbol {
        self.module.symbols.get(id)
    }

    /// The symbol's effective type, honoring a `select type` clause's
    /// concrete-type rebinding of the selector.
    pub(super) fn sym_ty(&self, id: SymbolId) -> Ttype {
        if let Some((selector, view)) = &self.selector_view {
            if *selector == id {
                return view.clone();
            }
        }
        self.sym(id).ty.clone()
    }

    pub(super) fn binding(&mut self, id: SymbolId) -> SymBinding {
        if let Some(binding) = self.symbols.get(&id) {
            return *binding;
        }
        if let Some(global) = self.globals.get(&id) {
            let sym = self.module.symbols.get(id);
            let value_ty = self.types.lower_type(&sym.ty);
            let ptr_ty = self.types.cache.ptr_to(value_ty);
            let addr = self.fb.addr_of_global(self.bb, *global, ptr_ty);
            return SymBinding {
                addr,
                phys: sym.ty.physical(),
            };
        }
        panic!(
            "codegen bug: missing symbol binding for {:?} ({})",
            id,
            self.sym(id).name
        );
    }

    pub(super) fn bind_symbol(&mut self, id: SymbolId, binding: SymBinding) {
        self.symbols.insert(id, binding);
    }

    // --- Scoped context helpers ---

    /// Runs `f` with the current-struct resolution context replaced,
    /// restoring the previous value on every non-panic exit path.
    pub(super) fn with_current_struct<T>(
        &mut self,
        name: Option<String>,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved = std::mem::replace(&mut self.current_struct, name);
        let result = f(self);
        self.current_struct = saved;
        result
    }

    /// Runs `f` with the selector rebound to a concrete-type view, restoring
    /// both the view and the symbol's previous binding afterwards.
    pub(super) fn with_selector_view<T>(
        &mut self,
        selector: SymbolId,
        view: Ttype,
        binding: SymBinding,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved_view = std::mem::replace(&mut self.selector_view, Some((selector, view)));
        let saved_binding = self.symbols.insert(selector, binding);
        let result = f(self);
        self.selector_view = saved_view;
        match saved_binding {
            Some(binding) => {
                self.symbols.insert(selector, binding);
            }
            None => {
                self.symbols.shift_remove(&selector);
            }
        }
        result
    }

    // --- Emission helpers ---

    pub(super) fn const_i64(&mut self, value: i64) -> ValueId {
        let i64_ty = self.types.int_ty(64);
        self.fb.const_int(self.bb, value as i128, true, 64, i64_ty)
    }

    pub(super) fn i64_binop(&mut self, op: BinOp, lhs: ValueId, rhs: ValueId) -> ValueId {
        let i64_ty = self.types.int_ty(64);
        self.fb.binop(self.bb, op, lhs, rhs, i64_ty)
    }

    pub(super) fn bitcast(&mut self, value: ValueId, ty: TirTypeId) -> ValueId {
        self.fb.cast(self.bb, CastKind::Bitcast, value, ty)
    }

    /// Allocates an unnamed stack slot and returns its address.
    pub(super) fn alloc_temp(&mut self, ty: TirTypeId) -> ValueId {
        let local = self.fb.add_local(ty, None);
        let ptr_ty = self.types.cache.ptr_to(ty);
        self.fb.addr_of_local(self.bb, local, ptr_ty)
    }

    pub(super) fn alloc_named_local(&mut self, ty: TirTypeId, name: &str) -> (LocalId, ValueId) {
        let local = self.fb.add_local(ty, Some(name.to_string()));
        let ptr_ty = self.types.cache.ptr_to(ty);
        let addr = self.fb.addr_of_local(self.bb, local, ptr_ty);
        (local, addr)
    }

    /// Typed address of field `index` of the aggregate at `base_addr`.
    pub(super) fn desc_field_addr(
        &mut self,
        base_addr: ValueId,
        aggregate_ty: TirTypeId,
        index: usize,
    ) -> ValueId {
        let field_ty = match self.types.cache.kind(aggregate_ty) {
            crate::tir::TirTypeKind::Struct { fields } => fields[index].ty,
            other => panic!("codegen bug: field address into non-struct {:?}", other),
        };
        let ptr_ty = self.types.cache.ptr_to(field_ty);
        self.fb.field_addr(self.bb, base_addr, index, ptr_ty)
    }

    /// Bounds-check instrumentation: traps unless `0 <= index < len`.
    /// `index` is the zero-based element offset along one dimension.
    pub(super) fn emit_bounds_check(&mut self, index: ValueId, len: ValueId) {
        if !self.options.bounds_checks {
            return;
        }
        let bool_ty = self.types.bool_ty();
        let zero = self.const_i64(0);
        let ge_zero = self.fb.cmp(self.bb, CmpOp::Ge, index, zero, bool_ty);
        let lt_len = self.fb.cmp(self.bb, CmpOp::Lt, index, len, bool_ty);
        let in_bounds = self.fb.binop(self.bb, BinOp::And, ge_zero, lt_len, bool_ty);

        let ok_bb = self.fb.add_block();
        let trap_bb = self.fb.add_block();
        self.fb.set_terminator(
            self.bb,
            Terminator::CondBr {
                cond: in_bounds,
                then_bb: ok_bb,
                then_args: Vec::new(),
                else_bb: trap_bb,
                else_args: Vec::new(),
            },
        );
        self.fb
            .call_runtime(trap_bb, RuntimeFn::TrapBounds, vec![index, len], None);
        self.fb.set_terminator(trap_bb, Terminator::Unreachable);

        self.bb = ok_bb;
    }

    /// Starts a dead continuation block after a terminating statement.
    pub(super) fn start_dead_block(&mut self) -> crate::tir::BlockId {
        let bb = self.fb.add_block();
        self.bb = bb;
        self.block_open = true;
        self.reachable = false;
        bb
    }

    /// Resumes emission at a merge block reached by live control flow.
    pub(super) fn resume_at(&mut self, bb: crate::tir::BlockId) {
        self.bb = bb;
        self.block_open = true;
        self.reachable = true;
    }

    /// Terminates the current block and marks it closed.
    pub(super) fn terminate(&mut self, term: Terminator) {
        self.fb.set_terminator(self.bb, term);
        self.block_open = false;
    }

    pub(super) fn branch_to(&mut self, target: crate::tir::BlockId) {
        self.terminate(Terminator::Br {
            target,
            args: Vec::new(),
        });
    }
}
