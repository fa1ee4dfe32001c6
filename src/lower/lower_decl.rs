//! Function-level lowering: parameter binding, local slots, initializers.

use crate::lower::errors::CodeGenError;
use crate::lower::lowerer::{FuncLowerer, SymBinding};
use crate::lower::types::{DESC_DATA, DESC_DIMS, DESC_OFFSET, STR_DATA, STR_LEN};
use crate::tast::{self, CharLen, Expr, PhysicalType, Storage, Ttype};
use crate::tir::{Terminator, TirTypeKind};

impl<'a> FuncLowerer<'a> {
    /// Lowers one function body into a finished TIR function.
    pub(super) fn lower(mut self, func: &tast::Function) -> Result<crate::tir::Function, CodeGenError> {
        self.bind_params(func);

        for local_id in &func.locals {
            self.declare_local(*local_id)?;
        }

        // Declaration initializers run before the body.
        for local_id in &func.locals {
            let sym = self.sym(*local_id).clone();
            if let Some(init) = &sym.init {
                let target = Expr::var(*local_id, sym.ty.clone());
                self.lower_stmt(&tast::Stmt::assign(target, init.clone()))?;
            }
        }

        self.lower_body(&func.body)?;

        // Implicit fall-off exit: free pending allocations and return.
        // The dead continuation after a trailing return/stop gets no
        // cleanup sequence of its own.
        if self.block_open {
            if self.reachable {
                self.emit_scope_frees();
                self.terminate(Terminator::Return { value: None });
            } else {
                self.terminate(Terminator::Unreachable);
            }
        }

        Ok(self.fb.finish())
    }

    /// Binds incoming parameters to variable slots. Arguments arrive as
    /// addresses (by-reference convention); BindC scalars arrive by value
    /// and are respilled so the slot convention stays uniform.
    fn bind_params(&mut self, func: &tast::Function) {
        for arg_id in &func.args {
            let sym = self.module.symbols.get(*arg_id).clone();
            let value_ty = self.types.lower_type(&sym.ty);
            let value_ptr_ty = self.types.cache.ptr_to(value_ty);

            if func.bind_c && sym.ty.is_scalar() {
                let param = self.fb.add_block_param(self.bb, value_ty);
                let spill = self.alloc_temp(value_ty);
                self.fb.store(self.bb, spill, param);
                let (_, slot) = self.alloc_named_local(value_ptr_ty, &sym.name);
                self.fb.store(self.bb, slot, spill);
                self.bind_symbol(
                    *arg_id,
                    SymBinding {
                        addr: slot,
                        phys: sym.ty.physical(),
                    },
                );
            } else {
                let param = self.fb.add_block_param(self.bb, value_ptr_ty);
                let (_, slot) = self.alloc_named_local(value_ptr_ty, &sym.name);
                self.fb.store(self.bb, slot, param);
                self.bind_symbol(
                    *arg_id,
                    SymBinding {
                        addr: slot,
                        phys: sym.ty.physical(),
                    },
                );
            }
        }
    }

    /// Allocates and initializes the slot for one local variable.
    fn declare_local(&mut self, local_id: tast::SymbolId) -> Result<(), CodeGenError> {
        let sym = self.sym(local_id).clone();

        match &sym.ty {
            Ttype::Array {
                elem,
                dims,
                physical: PhysicalType::Descriptor,
            } => {
                let elem_tir = self.types.lower_type(elem);
                let desc_ty = self.types.descriptor_ty(elem_tir);
                let elem_ptr_ty = self.types.cache.ptr_to(elem_tir);
                let (_, desc) = self.alloc_named_local(desc_ty, &sym.name);
                let dims_addr = self.alloc_dims_storage(dims.len());

                let all_static = dims.iter().all(|d| d.is_static());
                let allocatable =
                    matches!(sym.storage, Storage::Allocatable | Storage::Pointer);

                if all_static && !allocatable {
                    let specs = self.dim_specs_from_ty(dims);
                    let total = self.fill_dimensions(desc, desc_ty, dims_addr, &specs);
                    let data_field = self.desc_field_addr(desc, desc_ty, DESC_DATA);
                    if self.heap_allocate_data(&sym.ty) {
                        let stride = self.types.elem_stride(elem_tir);
                        let stride_val = self.const_i64(stride as i64);
                        let bytes =
                            self.i64_binop(crate::tir::BinOp::Mul, total, stride_val);
                        let raw = self.emit_alloc(bytes);
                        let data = self.bitcast(raw, elem_ptr_ty);
                        self.fb.store(self.bb, data_field, data);
                    } else {
                        let extents: Vec<u64> =
                            dims.iter().map(|d| d.length.unwrap() as u64).collect();
                        let storage_ty = self.types.cache.intern(TirTypeKind::Array {
                            elem: elem_tir,
                            dims: extents,
                        });
                        let storage = self.alloc_temp(storage_ty);
                        let data = self.bitcast(storage, elem_ptr_ty);
                        self.fb.store(self.bb, data_field, data);
                    }
                } else {
                    // Deferred shape: wire up the dims storage, null data.
                    let dims_field = self.desc_field_addr(desc, desc_ty, DESC_DIMS);
                    self.fb.store(self.bb, dims_field, dims_addr);
                    let zero = self.const_i64(0);
                    let offset_field = self.desc_field_addr(desc, desc_ty, DESC_OFFSET);
                    self.fb.store(self.bb, offset_field, zero);
                    let null = self.fb.const_null(self.bb, elem_ptr_ty);
                    let data_field = self.desc_field_addr(desc, desc_ty, DESC_DATA);
                    self.fb.store(self.bb, data_field, null);
                }

                self.bind_symbol(
                    local_id,
                    SymBinding {
                        addr: desc,
                        phys: Some(PhysicalType::Descriptor),
                    },
                );
            }

            Ttype::Character { len } => {
                let str_ty = self.types.string_desc_ty();
                let byte_ptr = self.types.byte_ptr_ty();
                let (_, desc) = self.alloc_named_local(str_ty, &sym.name);
                match len {
                    CharLen::Fixed(n) => {
                        let byte_ty = self.types.byte_ty();
                        let buf_ty = self.types.cache.intern(TirTypeKind::Array {
                            elem: byte_ty,
                            dims: vec![*n],
                        });
                        let buf = self.alloc_temp(buf_ty);
                        let data = self.bitcast(buf, byte_ptr);
                        let data_field = self.desc_field_addr(desc, str_ty, STR_DATA);
                        self.fb.store(self.bb, data_field, data);
                        let len_val = self.const_i64(*n as i64);
                        let len_field = self.desc_field_addr(desc, str_ty, STR_LEN);
                        self.fb.store(self.bb, len_field, len_val);
                    }
                    // Deferred length: data starts null, the length field is
                    // undefined until the first store.
                    CharLen::Deferred | CharLen::Assumed => {
                        let null = self.fb.const_null(self.bb, byte_ptr);
                        let data_field = self.desc_field_addr(desc, str_ty, STR_DATA);
                        self.fb.store(self.bb, data_field, null);
                    }
                }
                self.bind_symbol(
                    local_id,
                    SymBinding {
                        addr: desc,
                        phys: None,
                    },
                );
            }

            _ => {
                let storage = self.types.storage_ty(&sym);
                let (_, addr) = self.alloc_named_local(storage, &sym.name);
                if sym.extra_indirection() {
                    // Pointer/allocatable scalar: starts disassociated.
                    let null = self.fb.const_null(self.bb, storage);
                    self.fb.store(self.bb, addr, null);
                }
                self.bind_symbol(
                    local_id,
                    SymBinding {
                        addr,
                        phys: sym.ty.physical(),
                    },
                );
            }
        }
        Ok(())
    }
}
