//! String subsystem.
//!
//! Two physical kinds: the descriptor `{ data, len }` (the default value
//! representation) and the raw C character pointer with static length 1,
//! used for single-character interop. Assignment into an allocatable string
//! always deep-copies bytes through the runtime, which also (re)allocates
//! destination storage and sets the length; pointer aliasing is never
//! emitted. Transient strings produced by concatenation and slicing are
//! registered for scope-exit deallocation.

use crate::lower::errors::CodeGenError;
use crate::lower::lowerer::FuncLowerer;
use crate::lower::types::{STR_DATA, STR_LEN};
use crate::tast::Expr;
use crate::tir::{BinOp, RuntimeFn, ValueId};

/// Physical representation of a string value in generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StrRepr {
    /// Address of a `{ data, len }` descriptor.
    Descriptor(ValueId),
    /// Raw byte pointer with statically known length 1.
    CChar(ValueId),
}

impl<'a> FuncLowerer<'a> {
    /// Data pointer of a string value.
    pub(super) fn str_data(&mut self, repr: StrRepr) -> ValueId {
        match repr {
            StrRepr::Descriptor(desc) => {
                let str_ty = self.types.string_desc_ty();
                let byte_ptr = self.types.byte_ptr_ty();
                let data_field = self.desc_field_addr(desc, str_ty, STR_DATA);
                self.fb.load(self.bb, data_field, byte_ptr)
            }
            StrRepr::CChar(ptr) => ptr,
        }
    }

    /// Length of a string value.
    pub(super) fn str_len(&mut self, repr: StrRepr) -> ValueId {
        match repr {
            StrRepr::Descriptor(desc) => {
                let str_ty = self.types.string_desc_ty();
                let i64_ty = self.types.int_ty(64);
                let len_field = self.desc_field_addr(desc, str_ty, STR_LEN);
                self.fb.load(self.bb, len_field, i64_ty)
            }
            StrRepr::CChar(_) => self.const_i64(1),
        }
    }

    /// Deep copy into a string descriptor. The runtime allocates or reuses
    /// destination storage, copies the bytes, and always sets the
    /// destination length.
    pub(super) fn str_copy(&mut self, dst_desc: ValueId, src: StrRepr) {
        let data = self.str_data(src);
        let len = self.str_len(src);
        let dst = self.str_desc_as_byte_ptr(dst_desc);
        self.fb
            .call_runtime(self.bb, RuntimeFn::StrCopy, vec![dst, data, len], None);
    }

    /// Concatenation into a fresh transient descriptor; the result's heap
    /// storage is freed at scope exit.
    pub(super) fn str_concat(&mut self, lhs: StrRepr, rhs: StrRepr) -> ValueId {
        let str_ty = self.types.string_desc_ty();
        let out = self.alloc_temp(str_ty);

        let lhs_data = self.str_data(lhs);
        let lhs_len = self.str_len(lhs);
        let rhs_data = self.str_data(rhs);
        let rhs_len = self.str_len(rhs);
        let out_ptr = self.str_desc_as_byte_ptr(out);
        self.fb.call_runtime(
            self.bb,
            RuntimeFn::StrConcat,
            vec![out_ptr, lhs_data, lhs_len, rhs_data, rhs_len],
            None,
        );

        self.register_transient_string(out);
        out
    }

    /// 1-based inclusive slice: characters `start..=end`.
    pub(super) fn lower_slice_onebased(
        &mut self,
        target: &Expr,
        start: &Expr,
        end: &Expr,
    ) -> Result<ValueId, CodeGenError> {
        let repr = self.lower_string_operand(target)?;
        let start_val = self.lower_scalar_i64_in_value_ctx(start)?;
        let end_val = self.lower_scalar_i64_in_value_ctx(end)?;

        let one = self.const_i64(1);
        let offset = self.i64_binop(BinOp::Sub, start_val, one);
        let span = self.i64_binop(BinOp::Sub, end_val, start_val);
        let len = self.i64_binop(BinOp::Add, span, one);

        Ok(self.emit_slice_call(repr, offset, len))
    }

    /// 0-based half-open slice: characters `start..end`.
    pub(super) fn lower_slice_halfopen(
        &mut self,
        target: &Expr,
        start: &Expr,
        end: &Expr,
    ) -> Result<ValueId, CodeGenError> {
        let repr = self.lower_string_operand(target)?;
        let offset = self.lower_scalar_i64_in_value_ctx(start)?;
        let end_val = self.lower_scalar_i64_in_value_ctx(end)?;
        let len = self.i64_binop(BinOp::Sub, end_val, offset);

        Ok(self.emit_slice_call(repr, offset, len))
    }

    fn emit_slice_call(&mut self, src: StrRepr, offset: ValueId, len: ValueId) -> ValueId {
        let str_ty = self.types.string_desc_ty();
        let out = self.alloc_temp(str_ty);

        let data = self.str_data(src);
        let src_len = self.str_len(src);
        let out_ptr = self.str_desc_as_byte_ptr(out);
        self.fb.call_runtime(
            self.bb,
            RuntimeFn::StrSlice,
            vec![out_ptr, data, src_len, offset, len],
            None,
        );

        self.register_transient_string(out);
        out
    }

    /// Three-way comparison through the runtime; returns the i64 ordering
    /// value (negative, zero, positive).
    pub(super) fn str_compare(&mut self, lhs: StrRepr, rhs: StrRepr) -> ValueId {
        let i64_ty = self.types.int_ty(64);
        let lhs_data = self.str_data(lhs);
        let lhs_len = self.str_len(lhs);
        let rhs_data = self.str_data(rhs);
        let rhs_len = self.str_len(rhs);
        self.fb
            .call_runtime(
                self.bb,
                RuntimeFn::StrCompare,
                vec![lhs_data, lhs_len, rhs_data, rhs_len],
                Some(i64_ty),
            )
            .unwrap()
    }

    /// The transient string's heap data is owned by this scope; free it on
    /// every exit path.
    fn register_transient_string(&mut self, desc: ValueId) {
        let data = self.str_data(StrRepr::Descriptor(desc));
        self.scope_allocs.register(data);
    }

    fn str_desc_as_byte_ptr(&mut self, desc: ValueId) -> ValueId {
        let byte_ptr = self.types.byte_ptr_ty();
        self.bitcast(desc, byte_ptr)
    }
}

#[cfg(test)]
#[path = "../tests/t_string.rs"]
mod tests;
