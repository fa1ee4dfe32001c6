//! Heap-allocation tracking and reallocate-on-assign support.
//!
//! Every heap allocation made while lowering a function body registers
//! itself here at allocation time. Each control-flow exit (normal end, early
//! return, stop, error stop) asks for the free sequence to be re-emitted, so
//! cleanup fires on every path without per-exit bookkeeping at the call
//! sites.

use crate::lower::lowerer::FuncLowerer;
use crate::lower::types::{CLASS_DATA, CLASS_HASH, DESC_DATA};
use crate::tast::Ttype;
use crate::tir::{BinOp, CmpOp, RuntimeFn, Terminator, TirTypeId, ValueId};

/// Ordered list of heap pointers pending deallocation at scope exit.
#[derive(Debug, Default)]
pub struct ScopeAllocs {
    entries: Vec<ValueId>,
}

impl ScopeAllocs {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn register(&mut self, ptr: ValueId) {
        self.entries.push(ptr);
    }

    pub fn entries(&self) -> &[ValueId] {
        &self.entries
    }
}

impl<'a> FuncLowerer<'a> {
    /// Emits the free sequence for every allocation registered so far, in
    /// allocation order. Called at each control-flow exit point.
    pub(super) fn emit_scope_frees(&mut self) {
        let entries = self.scope_allocs.entries().to_vec();
        for ptr in entries {
            self.fb
                .call_runtime(self.bb, RuntimeFn::Free, vec![ptr], None);
        }
    }

    /// Calls the runtime allocator and registers the result for scope-exit
    /// cleanup. Returns the raw byte pointer.
    pub(super) fn emit_alloc(&mut self, bytes: ValueId) -> ValueId {
        let byte_ptr = self.types.byte_ptr_ty();
        let ptr = self
            .fb
            .call_runtime(self.bb, RuntimeFn::Alloc, vec![bytes], Some(byte_ptr))
            .unwrap();
        self.scope_allocs.register(ptr);
        ptr
    }

    /// Reallocate-on-assign for an allocatable descriptor array target:
    /// if the target's data pointer is null, allocate storage sized to the
    /// source before the deep copy.
    ///
    /// `src_count` is the source's total element count.
    pub(super) fn emit_realloc_on_assign_array(
        &mut self,
        dst_desc: ValueId,
        desc_ty: TirTypeId,
        elem_tir: TirTypeId,
        src_count: ValueId,
    ) {
        let i64_ty = self.types.int_ty(64);
        let bool_ty = self.types.bool_ty();
        let elem_ptr_ty = self.types.cache.ptr_to(elem_tir);

        let data_addr = self.desc_field_addr(dst_desc, desc_ty, DESC_DATA);
        let data = self.fb.load(self.bb, data_addr, elem_ptr_ty);
        let null = self.fb.const_null(self.bb, elem_ptr_ty);
        let is_null = self.fb.cmp(self.bb, CmpOp::Eq, data, null, bool_ty);

        let realloc_bb = self.fb.add_block();
        let join_bb = self.fb.add_block();
        self.fb.set_terminator(
            self.bb,
            Terminator::CondBr {
                cond: is_null,
                then_bb: realloc_bb,
                then_args: Vec::new(),
                else_bb: join_bb,
                else_args: Vec::new(),
            },
        );

        self.bb = realloc_bb;
        let stride = self.types.elem_stride(elem_tir);
        let stride_val = self.fb.const_int(self.bb, stride as i128, true, 64, i64_ty);
        let bytes = self
            .fb
            .binop(self.bb, BinOp::Mul, src_count, stride_val, i64_ty);
        let raw = self.emit_alloc(bytes);
        let typed = self.bitcast(raw, elem_ptr_ty);
        self.fb.store(self.bb, data_addr, typed);
        self.fb.set_terminator(
            self.bb,
            Terminator::Br {
                target: join_bb,
                args: Vec::new(),
            },
        );

        self.bb = join_bb;
    }

    /// Reallocate-on-assign for an allocatable class target: when the
    /// runtime type hash differs from the source's, allocate a fresh payload
    /// of the source's concrete size and retag the wrapper.
    pub(super) fn emit_realloc_on_assign_class(
        &mut self,
        dst_wrapper: ValueId,
        src_wrapper: ValueId,
        wrapper_ty: TirTypeId,
        payload_bytes: ValueId,
    ) {
        let i64_ty = self.types.int_ty(64);
        let bool_ty = self.types.bool_ty();

        let dst_hash_addr = self.desc_field_addr(dst_wrapper, wrapper_ty, CLASS_HASH);
        let src_hash_addr = self.desc_field_addr(src_wrapper, wrapper_ty, CLASS_HASH);
        let dst_hash = self.fb.load(self.bb, dst_hash_addr, i64_ty);
        let src_hash = self.fb.load(self.bb, src_hash_addr, i64_ty);
        let mismatch = self.fb.cmp(self.bb, CmpOp::Ne, dst_hash, src_hash, bool_ty);

        let realloc_bb = self.fb.add_block();
        let join_bb = self.fb.add_block();
        self.fb.set_terminator(
            self.bb,
            Terminator::CondBr {
                cond: mismatch,
                then_bb: realloc_bb,
                then_args: Vec::new(),
                else_bb: join_bb,
                else_args: Vec::new(),
            },
        );

        self.bb = realloc_bb;
        let raw = self.emit_alloc(payload_bytes);
        let dst_data_addr = self.desc_field_addr(dst_wrapper, wrapper_ty, CLASS_DATA);
        self.fb.store(self.bb, dst_data_addr, raw);
        self.fb.store(self.bb, dst_hash_addr, src_hash);
        self.fb.set_terminator(
            self.bb,
            Terminator::Br {
                target: join_bb,
                args: Vec::new(),
            },
        );

        self.bb = join_bb;
    }

    /// Whether a local data-only array's storage goes on the heap.
    pub(super) fn heap_allocate_data(&mut self, ty: &Ttype) -> bool {
        self.options.heap_arrays && ty.is_array()
    }
}

#[cfg(test)]
#[path = "../tests/t_mem.rs"]
mod tests;
