//! Conversions between the physical array layouts.
//!
//! Legal transitions (identity pairs are no-ops):
//! descriptor <-> fixed-size, descriptor <-> pointer-to-data,
//! fixed-size <-> pointer-to-data, fixed-size <-> SIMD, and the
//! string-array single pointer against the three data shapes. Everything
//! else is a contract violation with the TAST producer and panics.
//!
//! Value representation: every [`ArrayValue`] holds the address of the
//! value's storage: the descriptor for descriptor arrays, the inline
//! aggregate for fixed arrays, the slot holding the bare pointer for
//! pointer-to-data and string arrays, the vector storage for SIMD.
//!
//! Converting into a descriptor synthesizes a fresh stack descriptor from
//! the static type's declared bounds; it never mutates the source buffer.
//! Converting out of a descriptor extracts the data pointer, applying the
//! stored offset.

use crate::lower::lowerer::FuncLowerer;
use crate::lower::types::DESC_DATA;
use crate::tast::{PhysicalType, Ttype};
use crate::tir::{TirTypeId, TirTypeKind, ValueId};

/// An array value (storage address) together with its physical layout tag.
#[derive(Debug, Clone, Copy)]
pub(super) struct ArrayValue {
    pub value: ValueId,
    pub phys: PhysicalType,
}

impl<'a> FuncLowerer<'a> {
    /// Converts an array value between physical layouts.
    ///
    /// `static_ty` is the array's TAST type, consulted for element type and
    /// declared bounds when a descriptor must be synthesized.
    pub(super) fn convert_physical(
        &mut self,
        src: ArrayValue,
        dst: PhysicalType,
        static_ty: &Ttype,
    ) -> ArrayValue {
        use PhysicalType::*;

        if src.phys == dst {
            return src;
        }
        if !src.phys.convertible_to(dst) {
            panic!(
                "codegen bug: illegal physical conversion {:?} -> {:?}",
                src.phys, dst
            );
        }

        let elem_tir = self.array_elem_tir(static_ty);
        let value = match (src.phys, dst) {
            // Out of a descriptor: extract the (offset) data pointer.
            (Descriptor, PointerToData) | (Descriptor, StringArraySinglePointer) => {
                let desc_ty = self.types.descriptor_ty(elem_tir);
                let data = self.data_ptr_with_offset(src.value, desc_ty, elem_tir);
                self.stage_pointer(data, elem_tir)
            }
            (Descriptor, FixedSize) => {
                let desc_ty = self.types.descriptor_ty(elem_tir);
                let data = self.data_ptr_with_offset(src.value, desc_ty, elem_tir);
                let fixed_ptr = self.fixed_array_ptr_ty(static_ty, elem_tir);
                self.bitcast(data, fixed_ptr)
            }

            // Into a descriptor: synthesize one on the stack from declared
            // bounds. The source buffer is only read, never written.
            (FixedSize, Descriptor)
            | (PointerToData, Descriptor)
            | (StringArraySinglePointer, Descriptor) => {
                let data = self.data_only_ptr(src, elem_tir);
                self.synthesize_descriptor(data, elem_tir, static_ty)
            }

            // Between data-only shapes: reinterpret; element order and count
            // are untouched.
            (FixedSize, PointerToData) | (FixedSize, StringArraySinglePointer) => {
                let elem_ptr_ty = self.types.cache.ptr_to(elem_tir);
                let data = self.bitcast(src.value, elem_ptr_ty);
                self.stage_pointer(data, elem_tir)
            }
            (PointerToData, FixedSize) | (StringArraySinglePointer, FixedSize) => {
                let data = self.data_only_ptr(src, elem_tir);
                let fixed_ptr = self.fixed_array_ptr_ty(static_ty, elem_tir);
                self.bitcast(data, fixed_ptr)
            }
            (PointerToData, StringArraySinglePointer)
            | (StringArraySinglePointer, PointerToData) => src.value,

            // SIMD only talks to fixed-size arrays; both directions are pure
            // reinterpretations of the same storage.
            (FixedSize, Simd) => {
                let vec_ty = self.simd_ty(static_ty, elem_tir);
                let vec_ptr_ty = self.types.cache.ptr_to(vec_ty);
                self.bitcast(src.value, vec_ptr_ty)
            }
            (Simd, FixedSize) => {
                let fixed_ptr = self.fixed_array_ptr_ty(static_ty, elem_tir);
                self.bitcast(src.value, fixed_ptr)
            }

            (a, b) => panic!(
                "codegen bug: unhandled physical conversion {:?} -> {:?}",
                a, b
            ),
        };

        ArrayValue { value, phys: dst }
    }

    /// Bare element pointer of a data-only array value.
    pub(super) fn data_only_ptr(&mut self, src: ArrayValue, elem_tir: TirTypeId) -> ValueId {
        let elem_ptr_ty = self.types.cache.ptr_to(elem_tir);
        match src.phys {
            PhysicalType::FixedSize | PhysicalType::Simd => self.bitcast(src.value, elem_ptr_ty),
            PhysicalType::PointerToData | PhysicalType::StringArraySinglePointer => {
                self.fb.load(self.bb, src.value, elem_ptr_ty)
            }
            PhysicalType::Descriptor => panic!("codegen bug: data_only_ptr on a descriptor"),
        }
    }

    /// Stages a bare pointer in a stack slot (the canonical representation
    /// of pointer-shaped array values).
    fn stage_pointer(&mut self, data: ValueId, elem_tir: TirTypeId) -> ValueId {
        let elem_ptr_ty = self.types.cache.ptr_to(elem_tir);
        let slot = self.alloc_temp(elem_ptr_ty);
        self.fb.store(self.bb, slot, data);
        slot
    }

    /// Builds a fresh stack descriptor over existing storage, populating the
    /// dimension table from the static type's declared bounds.
    fn synthesize_descriptor(
        &mut self,
        data: ValueId,
        elem_tir: TirTypeId,
        static_ty: &Ttype,
    ) -> ValueId {
        let desc_ty = self.types.descriptor_ty(elem_tir);
        let desc = self.alloc_temp(desc_ty);

        let dims = static_ty.array_dims();
        let specs = self.dim_specs_from_ty(dims);
        let dims_addr = self.alloc_dims_storage(dims.len());
        self.fill_dimensions(desc, desc_ty, dims_addr, &specs);

        let elem_ptr_ty = self.types.cache.ptr_to(elem_tir);
        let typed_data = self.bitcast(data, elem_ptr_ty);
        let data_field = self.desc_field_addr(desc, desc_ty, DESC_DATA);
        self.fb.store(self.bb, data_field, typed_data);
        desc
    }

    fn array_elem_tir(&mut self, static_ty: &Ttype) -> TirTypeId {
        match static_ty {
            Ttype::Array { elem, .. } => self.types.lower_type(elem),
            other => panic!("codegen bug: physical conversion of non-array {:?}", other),
        }
    }

    /// `ptr<elem[dims...]>` for the static type's declared extents.
    fn fixed_array_ptr_ty(&mut self, static_ty: &Ttype, elem_tir: TirTypeId) -> TirTypeId {
        let extents = static_ty
            .array_dims()
            .iter()
            .map(|d| {
                d.length
                    .unwrap_or_else(|| panic!("codegen bug: fixed view of deferred extents"))
                    as u64
            })
            .collect();
        let arr_ty = self.types.cache.intern(TirTypeKind::Array {
            elem: elem_tir,
            dims: extents,
        });
        self.types.cache.ptr_to(arr_ty)
    }

    fn simd_ty(&mut self, static_ty: &Ttype, elem_tir: TirTypeId) -> TirTypeId {
        let lanes = static_ty
            .array_dims()
            .iter()
            .map(|d| {
                d.length
                    .unwrap_or_else(|| panic!("codegen bug: simd view of deferred extents"))
                    as u64
            })
            .product();
        self.types.cache.intern(TirTypeKind::Vector {
            elem: elem_tir,
            lanes,
        })
    }
}

#[cfg(test)]
#[path = "../tests/t_convert.rs"]
mod tests;
