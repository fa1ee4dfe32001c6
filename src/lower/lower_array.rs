//! Array descriptor subsystem.
//!
//! Runtime layout of a descriptor array: `{ data, offset, dims }` where
//! `dims` points at `rank` records `{ lower, size, stride }`. Invariants for
//! a freshly filled descriptor: `size = product(dim.size)`, `stride[0] = 1`,
//! `stride[i] = stride[i-1] * size[i-1]`. Sections reset strides explicitly.
//!
//! Data-only layouts (fixed-size, pointer-to-data, SIMD) carry their
//! dimensions in the static type; element addressing computes the flat
//! offset from the declared bounds at compile time where possible.

use crate::diag::Span;
use crate::lower::errors::CodeGenError;
use crate::lower::load::LoadLevel;
use crate::lower::lowerer::FuncLowerer;
use crate::lower::types::{DESC_DATA, DESC_DIMS, DESC_OFFSET, DIM_LOWER, DIM_SIZE, DIM_STRIDE};
use crate::tast::{Dim, Expr, PhysicalType, SectionRange, Ttype};
use crate::tir::{BinOp, TirTypeId, TirTypeKind, ValueId};

/// One dimension being written into a descriptor. Static bounds are folded
/// at compile time; dynamic bounds are runtime values.
#[derive(Debug, Clone, Copy)]
pub(super) enum DimSpec {
    Static { lower: i64, size: i64 },
    Dynamic { lower: ValueId, size: ValueId },
}

impl<'a> FuncLowerer<'a> {
    /// Stack storage for a descriptor's dimension records.
    /// Returns a `ptr<array_dim>` to `rank` contiguous records.
    pub(super) fn alloc_dims_storage(&mut self, rank: usize) -> ValueId {
        let dim_ty = self.types.dim_ty();
        let storage_ty = self.types.cache.intern(TirTypeKind::Array {
            elem: dim_ty,
            dims: vec![rank as u64],
        });
        let storage_addr = self.alloc_temp(storage_ty);
        let dim_ptr_ty = self.types.cache.ptr_to(dim_ty);
        self.bitcast(storage_addr, dim_ptr_ty)
    }

    /// Fills a descriptor's dimension table and offset, returning the total
    /// element count. Strides follow the contiguous column-major rule unless
    /// the caller resets them afterwards (sections).
    pub(super) fn fill_dimensions(
        &mut self,
        desc_addr: ValueId,
        desc_ty: TirTypeId,
        dims_addr: ValueId,
        dims: &[DimSpec],
    ) -> ValueId {
        let dims_field = self.desc_field_addr(desc_addr, desc_ty, DESC_DIMS);
        self.fb.store(self.bb, dims_field, dims_addr);

        let offset_field = self.desc_field_addr(desc_addr, desc_ty, DESC_OFFSET);
        let zero = self.const_i64(0);
        self.fb.store(self.bb, offset_field, zero);

        // Running stride and total, folded while every bound is static.
        let mut static_stride = Some(1i64);
        let mut static_total = Some(1i64);
        let mut dyn_stride: Option<ValueId> = None;
        let mut dyn_total: Option<ValueId> = None;

        let dim_ty = self.types.dim_ty();
        for (d, spec) in dims.iter().enumerate() {
            let dim_addr = self.dim_record_addr(dims_addr, d);

            let (lower_val, size_val, static_size) = match spec {
                DimSpec::Static { lower, size } => {
                    let lower_val = self.const_i64(*lower);
                    let size_val = self.const_i64(*size);
                    (lower_val, size_val, Some(*size))
                }
                DimSpec::Dynamic { lower, size } => (*lower, *size, None),
            };

            let lower_field = self.desc_field_addr(dim_addr, dim_ty, DIM_LOWER);
            self.fb.store(self.bb, lower_field, lower_val);
            let size_field = self.desc_field_addr(dim_addr, dim_ty, DIM_SIZE);
            self.fb.store(self.bb, size_field, size_val);

            let stride_val = match (static_stride, &dyn_stride) {
                (Some(s), None) => self.const_i64(s),
                _ => dyn_stride.expect("codegen bug: lost dynamic stride"),
            };
            let stride_field = self.desc_field_addr(dim_addr, dim_ty, DIM_STRIDE);
            self.fb.store(self.bb, stride_field, stride_val);

            // Advance stride/total for the next dimension.
            match (static_stride, static_size) {
                (Some(s), Some(n)) => {
                    static_stride = Some(s * n);
                    static_total = static_total.map(|t| t * n);
                }
                _ => {
                    let prev_stride = stride_val;
                    dyn_stride = Some(self.i64_binop(BinOp::Mul, prev_stride, size_val));
                    static_stride = None;
                    let prev_total = match (static_total, &dyn_total) {
                        (Some(t), None) => self.const_i64(t),
                        _ => dyn_total.expect("codegen bug: lost dynamic total"),
                    };
                    dyn_total = Some(self.i64_binop(BinOp::Mul, prev_total, size_val));
                    static_total = None;
                }
            }
        }

        match (static_total, dyn_total) {
            (Some(t), None) => self.const_i64(t),
            (_, Some(t)) => t,
            (None, None) => unreachable!(),
        }
    }

    /// Heap-allocation path for `allocate`: fills the dimension table, sizes
    /// the data buffer from it, and stores the allocator's pointer.
    /// The allocation self-registers for scope-exit cleanup.
    pub(super) fn fill_from_malloc(
        &mut self,
        desc_addr: ValueId,
        desc_ty: TirTypeId,
        elem_tir: TirTypeId,
        dims: &[DimSpec],
    ) -> ValueId {
        let dims_addr = self.alloc_dims_storage(dims.len());
        let total = self.fill_dimensions(desc_addr, desc_ty, dims_addr, dims);

        let stride = self.types.elem_stride(elem_tir);
        let stride_val = self.const_i64(stride as i64);
        let bytes = self.i64_binop(BinOp::Mul, total, stride_val);
        let raw = self.emit_alloc(bytes);

        let elem_ptr_ty = self.types.cache.ptr_to(elem_tir);
        let data = self.bitcast(raw, elem_ptr_ty);
        let data_field = self.desc_field_addr(desc_addr, desc_ty, DESC_DATA);
        self.fb.store(self.bb, data_field, data);
        data
    }

    /// Loads the raw data pointer, without applying the stored offset.
    pub(super) fn get_pointer_to_data(
        &mut self,
        desc_addr: ValueId,
        desc_ty: TirTypeId,
        elem_tir: TirTypeId,
    ) -> ValueId {
        let elem_ptr_ty = self.types.cache.ptr_to(elem_tir);
        let data_field = self.desc_field_addr(desc_addr, desc_ty, DESC_DATA);
        self.fb.load(self.bb, data_field, elem_ptr_ty)
    }

    /// Data pointer with the descriptor's element offset applied.
    pub(super) fn data_ptr_with_offset(
        &mut self,
        desc_addr: ValueId,
        desc_ty: TirTypeId,
        elem_tir: TirTypeId,
    ) -> ValueId {
        let data = self.get_pointer_to_data(desc_addr, desc_ty, elem_tir);
        let i64_ty = self.types.int_ty(64);
        let offset_field = self.desc_field_addr(desc_addr, desc_ty, DESC_OFFSET);
        let offset = self.fb.load(self.bb, offset_field, i64_ty);
        let elem_ptr_ty = self.types.cache.ptr_to(elem_tir);
        self.fb.index_addr(self.bb, data, offset, elem_ptr_ty)
    }

    /// Total element count, or the extent along one zero-based dimension.
    pub(super) fn get_size(
        &mut self,
        desc_addr: ValueId,
        desc_ty: TirTypeId,
        rank: usize,
        dim: Option<usize>,
    ) -> ValueId {
        let i64_ty = self.types.int_ty(64);
        let dim_ty = self.types.dim_ty();
        let dim_ptr_ty = self.types.cache.ptr_to(dim_ty);
        let dims_field = self.desc_field_addr(desc_addr, desc_ty, DESC_DIMS);
        let dims = self.fb.load(self.bb, dims_field, dim_ptr_ty);

        match dim {
            Some(d) => {
                if d >= rank {
                    panic!("codegen bug: dimension {} out of rank {}", d, rank);
                }
                let dim_addr = self.dim_record_addr(dims, d);
                let size_field = self.desc_field_addr(dim_addr, dim_ty, DIM_SIZE);
                self.fb.load(self.bb, size_field, i64_ty)
            }
            None => {
                let mut total = self.const_i64(1);
                for d in 0..rank {
                    let dim_addr = self.dim_record_addr(dims, d);
                    let size_field = self.desc_field_addr(dim_addr, dim_ty, DIM_SIZE);
                    let size = self.fb.load(self.bb, size_field, i64_ty);
                    total = self.i64_binop(BinOp::Mul, total, size);
                }
                total
            }
        }
    }

    /// Byte-wise copy of `count` contiguous elements. The source buffer is
    /// never mutated.
    pub(super) fn copy_array_data_only(
        &mut self,
        dst_data: ValueId,
        src_data: ValueId,
        elem_tir: TirTypeId,
        count: ValueId,
    ) {
        let stride = self.types.elem_stride(elem_tir);
        let stride_val = self.const_i64(stride as i64);
        let bytes = self.i64_binop(BinOp::Mul, count, stride_val);
        self.fb.memcopy(self.bb, dst_data, src_data, bytes);
    }

    /// Copies a descriptor header (data pointer, offset) and its dimension
    /// records into the destination's own dims storage. The element data is
    /// shared, not copied; use [`Self::copy_array_data_only`] for deep copies.
    pub(super) fn copy_array_descriptor(
        &mut self,
        dst_desc: ValueId,
        src_desc: ValueId,
        desc_ty: TirTypeId,
        elem_tir: TirTypeId,
        rank: usize,
    ) {
        let i64_ty = self.types.int_ty(64);
        let elem_ptr_ty = self.types.cache.ptr_to(elem_tir);

        let src_data_field = self.desc_field_addr(src_desc, desc_ty, DESC_DATA);
        let data = self.fb.load(self.bb, src_data_field, elem_ptr_ty);
        let dst_data_field = self.desc_field_addr(dst_desc, desc_ty, DESC_DATA);
        self.fb.store(self.bb, dst_data_field, data);

        let src_offset_field = self.desc_field_addr(src_desc, desc_ty, DESC_OFFSET);
        let offset = self.fb.load(self.bb, src_offset_field, i64_ty);
        let dst_offset_field = self.desc_field_addr(dst_desc, desc_ty, DESC_OFFSET);
        self.fb.store(self.bb, dst_offset_field, offset);

        let dim_ty = self.types.dim_ty();
        let dim_ptr_ty = self.types.cache.ptr_to(dim_ty);
        let src_dims_field = self.desc_field_addr(src_desc, desc_ty, DESC_DIMS);
        let src_dims = self.fb.load(self.bb, src_dims_field, dim_ptr_ty);
        let dst_dims_field = self.desc_field_addr(dst_desc, desc_ty, DESC_DIMS);
        let dst_dims = self.fb.load(self.bb, dst_dims_field, dim_ptr_ty);

        let dim_size = self.types.elem_stride(dim_ty);
        let bytes = self.const_i64((dim_size as i64) * rank as i64);
        self.fb.memcopy(self.bb, dst_dims, src_dims, bytes);
    }

    /// Rebuilds a descriptor's dimension table from explicit
    /// lower-bound/length pairs, restoring contiguous strides. Used by
    /// pointer-target association.
    pub(super) fn reset_array_details(
        &mut self,
        desc_addr: ValueId,
        desc_ty: TirTypeId,
        pairs: &[(ValueId, ValueId)],
    ) {
        let dim_ty = self.types.dim_ty();
        let dim_ptr_ty = self.types.cache.ptr_to(dim_ty);
        let dims_field = self.desc_field_addr(desc_addr, desc_ty, DESC_DIMS);
        let dims = self.fb.load(self.bb, dims_field, dim_ptr_ty);

        let mut stride = self.const_i64(1);
        for (d, (lower, size)) in pairs.iter().enumerate() {
            let dim_addr = self.dim_record_addr(dims, d);
            let lower_field = self.desc_field_addr(dim_addr, dim_ty, DIM_LOWER);
            self.fb.store(self.bb, lower_field, *lower);
            let size_field = self.desc_field_addr(dim_addr, dim_ty, DIM_SIZE);
            self.fb.store(self.bb, size_field, *size);
            let stride_field = self.desc_field_addr(dim_addr, dim_ty, DIM_STRIDE);
            self.fb.store(self.bb, stride_field, stride);
            stride = self.i64_binop(BinOp::Mul, stride, *size);
        }
    }

    /// Builds a section descriptor over the parent's storage:
    /// `stride = parent_stride * step`, data offset advanced by
    /// `(start - parent_lower) * parent_stride` per dimension.
    ///
    /// A rank mismatch between the section ranges and the parent indicates a
    /// broken TAST and is fatal.
    pub(super) fn section_descriptor(
        &mut self,
        dst_desc: ValueId,
        src_desc: ValueId,
        desc_ty: TirTypeId,
        elem_tir: TirTypeId,
        rank: usize,
        ranges: &[SectionRange],
    ) -> Result<(), CodeGenError> {
        if ranges.len() != rank {
            panic!(
                "codegen bug: section rank mismatch: {} ranges for rank {}",
                ranges.len(),
                rank
            );
        }

        let i64_ty = self.types.int_ty(64);
        let dim_ty = self.types.dim_ty();
        let dim_ptr_ty = self.types.cache.ptr_to(dim_ty);
        let elem_ptr_ty = self.types.cache.ptr_to(elem_tir);

        // Parent data pointer and offset carry over, adjusted below.
        let src_data_field = self.desc_field_addr(src_desc, desc_ty, DESC_DATA);
        let data = self.fb.load(self.bb, src_data_field, elem_ptr_ty);
        let dst_data_field = self.desc_field_addr(dst_desc, desc_ty, DESC_DATA);
        self.fb.store(self.bb, dst_data_field, data);

        let src_offset_field = self.desc_field_addr(src_desc, desc_ty, DESC_OFFSET);
        let mut offset = self.fb.load(self.bb, src_offset_field, i64_ty);

        let src_dims_field = self.desc_field_addr(src_desc, desc_ty, DESC_DIMS);
        let src_dims = self.fb.load(self.bb, src_dims_field, dim_ptr_ty);

        let dst_dims_addr = self.alloc_dims_storage(rank);
        let dst_dims_field = self.desc_field_addr(dst_desc, desc_ty, DESC_DIMS);
        self.fb.store(self.bb, dst_dims_field, dst_dims_addr);

        let one = self.const_i64(1);
        for (d, range) in ranges.iter().enumerate() {
            let src_dim = self.dim_record_addr(src_dims, d);
            let parent_lower_field = self.desc_field_addr(src_dim, dim_ty, DIM_LOWER);
            let parent_lower = self.fb.load(self.bb, parent_lower_field, i64_ty);
            let parent_size_field = self.desc_field_addr(src_dim, dim_ty, DIM_SIZE);
            let parent_size = self.fb.load(self.bb, parent_size_field, i64_ty);
            let parent_stride_field = self.desc_field_addr(src_dim, dim_ty, DIM_STRIDE);
            let parent_stride = self.fb.load(self.bb, parent_stride_field, i64_ty);

            let start = match &range.start {
                Some(expr) => self.lower_scalar_i64(expr)?,
                None => parent_lower,
            };
            let end = match &range.end {
                Some(expr) => self.lower_scalar_i64(expr)?,
                None => {
                    // parent upper bound: lower + size - 1
                    let upper = self.i64_binop(BinOp::Add, parent_lower, parent_size);
                    self.i64_binop(BinOp::Sub, upper, one)
                }
            };
            let step = match &range.step {
                Some(expr) => self.lower_scalar_i64(expr)?,
                None => one,
            };

            // offset += (start - parent_lower) * parent_stride
            let rel = self.i64_binop(BinOp::Sub, start, parent_lower);
            let adv = self.i64_binop(BinOp::Mul, rel, parent_stride);
            offset = self.i64_binop(BinOp::Add, offset, adv);

            // new size = (end - start) / step + 1
            let span = self.i64_binop(BinOp::Sub, end, start);
            let steps = self.i64_binop(BinOp::Div, span, step);
            let size = self.i64_binop(BinOp::Add, steps, one);

            // new stride = parent_stride * step; section bounds renumber at 1
            let stride = self.i64_binop(BinOp::Mul, parent_stride, step);

            let dst_dim = self.dim_record_addr(dst_dims_addr, d);
            let lower_field = self.desc_field_addr(dst_dim, dim_ty, DIM_LOWER);
            self.fb.store(self.bb, lower_field, one);
            let size_field = self.desc_field_addr(dst_dim, dim_ty, DIM_SIZE);
            self.fb.store(self.bb, size_field, size);
            let stride_field = self.desc_field_addr(dst_dim, dim_ty, DIM_STRIDE);
            self.fb.store(self.bb, stride_field, stride);
        }

        let dst_offset_field = self.desc_field_addr(dst_desc, desc_ty, DESC_OFFSET);
        self.fb.store(self.bb, dst_offset_field, offset);
        Ok(())
    }

    // --- Element access ---

    /// Lowers an array element reference to its address, then applies the
    /// caller's load level.
    pub(super) fn lower_array_item(
        &mut self,
        target: &Expr,
        indices: &[Expr],
    ) -> Result<(ValueId, TirTypeId), CodeGenError> {
        let target_ty = self.expr_ty(target);
        let Ttype::Array {
            elem,
            dims,
            physical,
        } = &target_ty
        else {
            panic!("codegen bug: array item on non-array type {:?}", target_ty);
        };
        if indices.len() != dims.len() {
            panic!(
                "codegen bug: {} indices for rank-{} array",
                indices.len(),
                dims.len()
            );
        }

        let elem_tir = self.types.lower_type(elem);
        let elem_ptr_ty = self.types.cache.ptr_to(elem_tir);

        // The array aggregate itself is addressed at place level.
        let (place, _place_ty) = self.lower_place(target)?;

        let index_vals = indices
            .iter()
            .map(|idx| self.lower_scalar_i64_in_value_ctx(idx))
            .collect::<Result<Vec<_>, _>>()?;

        let elem_addr = match physical {
            PhysicalType::Descriptor => {
                let desc_ty = self.types.descriptor_ty(elem_tir);
                self.descriptor_elem_addr(place, desc_ty, elem_tir, dims.len(), &index_vals)
            }
            PhysicalType::FixedSize | PhysicalType::Simd => {
                let data = self.bitcast(place, elem_ptr_ty);
                self.static_elem_addr(data, elem_ptr_ty, dims, &index_vals)
            }
            PhysicalType::PointerToData => {
                // The place is the slot holding the bare pointer.
                let data = self.fb.load(self.bb, place, elem_ptr_ty);
                self.static_elem_addr(data, elem_ptr_ty, dims, &index_vals)
            }
            PhysicalType::StringArraySinglePointer => {
                let str_ty = self.types.string_desc_ty();
                let str_ptr_ty = self.types.cache.ptr_to(str_ty);
                let data = self.fb.load(self.bb, place, str_ptr_ty);
                self.static_elem_addr(data, str_ptr_ty, dims, &index_vals)
            }
        };

        Ok(self.apply_elem_loads(elem_addr, elem_ptr_ty, elem))
    }

    /// Element address through a descriptor: runtime bounds and strides.
    fn descriptor_elem_addr(
        &mut self,
        desc_addr: ValueId,
        desc_ty: TirTypeId,
        elem_tir: TirTypeId,
        rank: usize,
        indices: &[ValueId],
    ) -> ValueId {
        let i64_ty = self.types.int_ty(64);
        let dim_ty = self.types.dim_ty();
        let dim_ptr_ty = self.types.cache.ptr_to(dim_ty);

        let dims_field = self.desc_field_addr(desc_addr, desc_ty, DESC_DIMS);
        let dims = self.fb.load(self.bb, dims_field, dim_ptr_ty);

        let offset_field = self.desc_field_addr(desc_addr, desc_ty, DESC_OFFSET);
        let mut total = self.fb.load(self.bb, offset_field, i64_ty);

        for (d, index) in indices.iter().enumerate().take(rank) {
            let dim_addr = self.dim_record_addr(dims, d);
            let lower_field = self.desc_field_addr(dim_addr, dim_ty, DIM_LOWER);
            let lower = self.fb.load(self.bb, lower_field, i64_ty);
            let stride_field = self.desc_field_addr(dim_addr, dim_ty, DIM_STRIDE);
            let stride = self.fb.load(self.bb, stride_field, i64_ty);

            let rel = self.i64_binop(BinOp::Sub, *index, lower);
            if self.options.bounds_checks {
                let size_field = self.desc_field_addr(dim_addr, dim_ty, DIM_SIZE);
                let size = self.fb.load(self.bb, size_field, i64_ty);
                self.emit_bounds_check(rel, size);
            }
            let adv = self.i64_binop(BinOp::Mul, rel, stride);
            total = self.i64_binop(BinOp::Add, total, adv);
        }

        let data = self.get_pointer_to_data(desc_addr, desc_ty, elem_tir);
        let elem_ptr_ty = self.types.cache.ptr_to(elem_tir);
        self.fb.index_addr(self.bb, data, total, elem_ptr_ty)
    }

    /// Element address from statically declared bounds (data-only layouts).
    fn static_elem_addr(
        &mut self,
        data: ValueId,
        elem_ptr_ty: TirTypeId,
        dims: &[Dim],
        indices: &[ValueId],
    ) -> ValueId {
        let mut total = self.const_i64(0);
        let mut stride = 1i64;
        for (d, index) in indices.iter().enumerate() {
            let lower = dims[d].lower.unwrap_or(1);
            let length = dims[d]
                .length
                .unwrap_or_else(|| panic!("codegen bug: data-only array with deferred extent"));

            let lower_val = self.const_i64(lower);
            let rel = self.i64_binop(BinOp::Sub, *index, lower_val);
            if self.options.bounds_checks {
                let len_val = self.const_i64(length);
                self.emit_bounds_check(rel, len_val);
            }
            let stride_val = self.const_i64(stride);
            let adv = self.i64_binop(BinOp::Mul, rel, stride_val);
            total = self.i64_binop(BinOp::Add, total, adv);
            stride *= length;
        }
        self.fb.index_addr(self.bb, data, total, elem_ptr_ty)
    }

    /// Lowers `target(ranges...)` into a fresh section descriptor and
    /// returns its address (the section's value representation).
    pub(super) fn lower_array_section(
        &mut self,
        expr: &Expr,
        target: &Expr,
        ranges: &[SectionRange],
    ) -> Result<(ValueId, TirTypeId), CodeGenError> {
        let target_ty = self.expr_ty(target);
        let Ttype::Array {
            elem,
            dims,
            physical,
        } = &target_ty
        else {
            panic!("codegen bug: array section on non-array type {:?}", target_ty);
        };
        if *physical != PhysicalType::Descriptor {
            return Err(CodeGenError::UnsupportedExpr { span: expr.span });
        }

        let elem_tir = self.types.lower_type(elem);
        let desc_ty = self.types.descriptor_ty(elem_tir);
        let (src_desc, _) = self.lower_place(target)?;

        let dst_desc = self.alloc_temp(desc_ty);
        self.section_descriptor(dst_desc, src_desc, desc_ty, elem_tir, dims.len(), ranges)?;
        let desc_ptr_ty = self.types.cache.ptr_to(desc_ty);
        Ok((dst_desc, desc_ptr_ty))
    }

    // --- Small helpers ---

    /// Address of dimension record `d` in a dims table.
    pub(super) fn dim_record_addr(&mut self, dims: ValueId, d: usize) -> ValueId {
        let dim_ty = self.types.dim_ty();
        let dim_ptr_ty = self.types.cache.ptr_to(dim_ty);
        let index = self.const_i64(d as i64);
        self.fb.index_addr(self.bb, dims, index, dim_ptr_ty)
    }

    /// Dimension specs from a static array type (declared bounds).
    pub(super) fn dim_specs_from_ty(&mut self, dims: &[Dim]) -> Vec<DimSpec> {
        dims.iter()
            .map(|dim| match (dim.lower, dim.length) {
                (Some(lower), Some(size)) => DimSpec::Static { lower, size },
                _ => panic!("codegen bug: dim specs from deferred bounds"),
            })
            .collect()
    }

    /// Lowers an index/bound expression to an i64 value in value context.
    pub(super) fn lower_scalar_i64_in_value_ctx(
        &mut self,
        expr: &Expr,
    ) -> Result<ValueId, CodeGenError> {
        self.with_load_level(LoadLevel::TwoLoads, |this| this.lower_scalar_i64(expr))
    }

    /// Lowers an integer scalar expression and widens it to i64.
    pub(super) fn lower_scalar_i64(&mut self, expr: &Expr) -> Result<ValueId, CodeGenError> {
        let (value, _) = self.lower_expr(expr)?;
        let i64_ty = self.types.int_ty(64);
        match self.expr_ty(expr) {
            Ttype::Integer { bytes } if bytes < 8 => Ok(self.fb.cast(
                self.bb,
                crate::tir::CastKind::IntExtend { signed: true },
                value,
                i64_ty,
            )),
            Ttype::Integer { .. } => Ok(value),
            other => Err(CodeGenError::UnsupportedType {
                span: Span::default(),
                ty: other,
            }),
        }
    }
}

#[cfg(test)]
#[path = "../tests/t_descriptor.rs"]
mod tests;
