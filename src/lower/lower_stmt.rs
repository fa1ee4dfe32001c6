//! Statement lowering.

use crate::lower::convert::ArrayValue;
use crate::lower::errors::CodeGenError;
use crate::lower::load::LoadLevel;
use crate::lower::lowerer::FuncLowerer;
use crate::lower::types::{CLASS_DATA, CLASS_HASH, DESC_DATA, DESC_DIMS};
use crate::tast::{
    AllocExtent, Expr, ExprKind, PhysicalType, Stmt, StmtKind, Storage, Ttype,
};
use crate::tir::{CastKind, RuntimeFn, Terminator, TirTypeId, ValueId};

impl<'a> FuncLowerer<'a> {
    pub(super) fn lower_stmt(&mut self, stmt: &Stmt) -> Result<(), CodeGenError> {
        match &stmt.kind {
            StmtKind::Assignment { target, value } => self.lower_assignment(target, value),
            StmtKind::If {
                cond,
                then_body,
                else_body,
            } => self.lower_if(cond, then_body, else_body),
            StmtKind::While { cond, body } => self.lower_while(cond, body),
            StmtKind::Call { name, args } => self.lower_call_stmt(stmt.span, name, args),
            StmtKind::ExprStmt { expr } => {
                match &expr.kind {
                    ExprKind::MethodCall {
                        target,
                        binding,
                        args,
                    } => {
                        let _ = self.lower_method_call_common(expr.span, target, binding, args)?;
                    }
                    _ => {
                        let _ = self.with_load_level(LoadLevel::TwoLoads, |this| {
                            this.lower_expr(expr)
                        })?;
                    }
                }
                Ok(())
            }
            StmtKind::Return { value } => self.lower_return(value.as_ref()),
            StmtKind::Stop { code } => self.lower_stop(code.as_ref(), false),
            StmtKind::ErrorStop { code } => self.lower_stop(code.as_ref(), true),
            StmtKind::Print { values } => self.lower_print(values),
            StmtKind::Allocate {
                target,
                extents,
                as_type,
            } => self.lower_allocate(target, extents, as_type.as_ref()),
            StmtKind::Deallocate { target } => self.lower_deallocate(target),
            StmtKind::PointerAssociate { target, source } => {
                self.lower_pointer_associate(target, source)
            }
            StmtKind::SelectType { selector, clauses } => {
                self.lower_select_type(*selector, clauses)
            }
        }
    }

    // --- Assignment ---

    fn lower_assignment(&mut self, target: &Expr, value: &Expr) -> Result<(), CodeGenError> {
        let target_ty = self.expr_ty(target);
        match &target_ty {
            ty if ty.is_scalar() => {
                let (addr, _) = self.lower_place(target)?;
                let (val, _) =
                    self.with_load_level(LoadLevel::TwoLoads, |this| this.lower_expr(value))?;
                self.fb.store(self.bb, addr, val);
                Ok(())
            }
            Ttype::Character { .. } => self.lower_string_assignment(target, value),
            Ttype::Array { .. } => self.lower_array_assignment(target, value, &target_ty),
            Ttype::Struct { name } => self.lower_struct_assignment(target, value, name),
            Ttype::Class { .. } => self.lower_class_assignment(target, value),
            Ttype::Complex { bytes } => {
                // Aggregate scalar: copy the two components wholesale.
                let (dst, _) = self.lower_place(target)?;
                let (src, _) =
                    self.with_load_level(LoadLevel::TwoLoads, |this| this.lower_expr(value))?;
                let complex_ty = self.types.complex_ty(bytes * 8);
                let size = self.types.cache.layout(complex_ty).size();
                let bytes_val = self.const_i64(size as i64);
                self.fb.memcopy(self.bb, dst, src, bytes_val);
                Ok(())
            }
            other => Err(CodeGenError::UnsupportedType {
                span: target.span,
                ty: other.clone(),
            }),
        }
    }

    /// Always a deep byte copy through the runtime, never aliasing; the
    /// runtime reallocates allocatable destinations and sets the length.
    fn lower_string_assignment(&mut self, target: &Expr, value: &Expr) -> Result<(), CodeGenError> {
        let (dst_desc, _) = self.lower_place(target)?;
        let src = self.with_load_level(LoadLevel::TwoLoads, |this| {
            this.lower_string_operand(value)
        })?;
        self.str_copy(dst_desc, src);
        Ok(())
    }

    fn lower_array_assignment(
        &mut self,
        target: &Expr,
        value: &Expr,
        target_ty: &Ttype,
    ) -> Result<(), CodeGenError> {
        let Ttype::Array {
            elem,
            dims,
            physical,
        } = target_ty
        else {
            unreachable!();
        };
        let elem_tir = self.types.lower_type(elem);

        let value_ty = self.expr_ty(value);
        // The tracked layout wins over the static tag: conversions may have
        // changed a symbol's physical representation.
        let src_phys = match &value.kind {
            ExprKind::Var(sym) => self.binding(*sym).phys,
            _ => None,
        }
        .or_else(|| value_ty.physical())
        .unwrap_or_else(|| panic!("codegen bug: array assignment from non-array"));
        let (src_val, _) =
            self.with_load_level(LoadLevel::TwoLoads, |this| this.lower_expr(value))?;
        let src = ArrayValue {
            value: src_val,
            phys: src_phys,
        };

        let (dst_addr, _) = self.lower_place(target)?;

        match physical {
            PhysicalType::Descriptor => {
                let desc_ty = self.types.descriptor_ty(elem_tir);
                let src_count = self.array_value_count(&src, &value_ty);

                let target_allocatable = self.place_storage(target) == Some(Storage::Allocatable);
                if target_allocatable && self.options.realloc_lhs {
                    self.emit_realloc_on_assign_array(dst_addr, desc_ty, elem_tir, src_count);
                }

                // Shape follows the source.
                match src.phys {
                    PhysicalType::Descriptor => {
                        let dim_ty = self.types.dim_ty();
                        let dim_ptr_ty = self.types.cache.ptr_to(dim_ty);
                        let src_dims_field =
                            self.desc_field_addr(src.value, desc_ty, DESC_DIMS);
                        let src_dims = self.fb.load(self.bb, src_dims_field, dim_ptr_ty);
                        let dst_dims_field = self.desc_field_addr(dst_addr, desc_ty, DESC_DIMS);
                        let dst_dims = self.fb.load(self.bb, dst_dims_field, dim_ptr_ty);
                        let dim_size = self.types.elem_stride(dim_ty);
                        let bytes = self.const_i64(dim_size as i64 * dims.len() as i64);
                        self.fb.memcopy(self.bb, dst_dims, src_dims, bytes);
                    }
                    _ => {
                        let src_dims = value_ty.array_dims();
                        let pairs = src_dims
                            .iter()
                            .map(|d| {
                                let lower = self.const_i64(d.lower.unwrap_or(1));
                                let size = self.const_i64(d.length.unwrap_or_else(|| {
                                    panic!("codegen bug: data-only source with deferred extent")
                                }));
                                (lower, size)
                            })
                            .collect::<Vec<_>>();
                        self.reset_array_details(dst_addr, desc_ty, &pairs);
                    }
                }

                let dst_data = self.data_ptr_with_offset(dst_addr, desc_ty, elem_tir);
                let src_data = self.array_value_data(&src, elem_tir);
                self.copy_array_data_only(dst_data, src_data, elem_tir, src_count);
                Ok(())
            }
            PhysicalType::FixedSize | PhysicalType::PointerToData => {
                let elem_ptr_ty = self.types.cache.ptr_to(elem_tir);
                let dst_data = match physical {
                    PhysicalType::FixedSize => self.bitcast(dst_addr, elem_ptr_ty),
                    _ => self.fb.load(self.bb, dst_addr, elem_ptr_ty),
                };
                let count = self.static_count(dims);
                let src_data = self.array_value_data(&src, elem_tir);
                self.copy_array_data_only(dst_data, src_data, elem_tir, count);
                Ok(())
            }
            PhysicalType::Simd => {
                // Source must already be (or convert from) a fixed array.
                let simd = self.convert_physical(src, PhysicalType::Simd, &value_ty);
                let vec_ty = self.types.lower_type(target_ty);
                let vector = self.fb.load(self.bb, simd.value, vec_ty);
                self.fb.store(self.bb, dst_addr, vector);
                Ok(())
            }
            PhysicalType::StringArraySinglePointer => {
                let str_ty = self.types.string_desc_ty();
                let str_ptr_ty = self.types.cache.ptr_to(str_ty);
                let dst_data = self.fb.load(self.bb, dst_addr, str_ptr_ty);
                let count = self.static_count(dims);
                let src_data = self.array_value_data(&src, str_ty);
                self.copy_array_data_only(dst_data, src_data, str_ty, count);
                Ok(())
            }
        }
    }

    fn lower_struct_assignment(
        &mut self,
        target: &Expr,
        value: &Expr,
        name: &str,
    ) -> Result<(), CodeGenError> {
        let (dst, _) = self.lower_place(target)?;
        let (src, _) = self.with_load_level(LoadLevel::TwoLoads, |this| this.lower_expr(value))?;
        let tir = self
            .types
            .layout_of(name)
            .unwrap_or_else(|| panic!("codegen bug: assignment to unregistered struct '{}'", name))
            .tir;
        let size = self.types.cache.layout(tir).size();
        let bytes = self.const_i64(size as i64);
        self.fb.memcopy(self.bb, dst, src, bytes);
        Ok(())
    }

    /// Allocatable class assignment: retag/reallocate on runtime type
    /// mismatch, then deep-copy the payload.
    fn lower_class_assignment(&mut self, target: &Expr, value: &Expr) -> Result<(), CodeGenError> {
        let (dst_wrapper, _) = self.lower_place(target)?;
        let wrapper_ty = self.types.class_wrapper_ty();
        let value_ty = self.expr_ty(value);

        match &value_ty {
            // Concrete source: tag is known at compile time.
            Ttype::Struct { name } => {
                let layout = self
                    .types
                    .layout_of(name)
                    .unwrap_or_else(|| panic!("codegen bug: unregistered struct '{}'", name))
                    .clone();
                let size = self.types.cache.layout(layout.tir).size();
                let (src_addr, _) =
                    self.with_load_level(LoadLevel::TwoLoads, |this| this.lower_expr(value))?;

                let target_allocatable = self.place_storage(target) == Some(Storage::Allocatable);
                if target_allocatable && self.options.realloc_lhs {
                    // Stage a wrapper view of the source for the hash check.
                    let src_wrapper = self.alloc_temp(wrapper_ty);
                    let hash_val = self.const_i64(layout.type_hash as i64);
                    let hash_field = self.desc_field_addr(src_wrapper, wrapper_ty, CLASS_HASH);
                    self.fb.store(self.bb, hash_field, hash_val);
                    let byte_ptr = self.types.byte_ptr_ty();
                    let raw = self.bitcast(src_addr, byte_ptr);
                    let data_field = self.desc_field_addr(src_wrapper, wrapper_ty, CLASS_DATA);
                    self.fb.store(self.bb, data_field, raw);

                    let payload_bytes = self.const_i64(size as i64);
                    self.emit_realloc_on_assign_class(
                        dst_wrapper,
                        src_wrapper,
                        wrapper_ty,
                        payload_bytes,
                    );
                }

                let byte_ptr = self.types.byte_ptr_ty();
                let data_field = self.desc_field_addr(dst_wrapper, wrapper_ty, CLASS_DATA);
                let dst_data = self.fb.load(self.bb, data_field, byte_ptr);
                let src_raw = self.bitcast(src_addr, byte_ptr);
                let bytes = self.const_i64(size as i64);
                self.fb.memcopy(self.bb, dst_data, src_raw, bytes);
                Ok(())
            }
            Ttype::Class { name } => {
                let (src_wrapper, _) =
                    self.with_load_level(LoadLevel::TwoLoads, |this| this.lower_expr(value))?;
                let layout = self
                    .types
                    .layout_of(name)
                    .unwrap_or_else(|| panic!("codegen bug: unregistered base '{}'", name))
                    .clone();
                // Payload size is bounded by the declared base layout here;
                // extending types that add fields need a concrete source.
                let size = self.types.cache.layout(layout.tir).size();
                let payload_bytes = self.const_i64(size as i64);

                let target_allocatable = self.place_storage(target) == Some(Storage::Allocatable);
                if target_allocatable && self.options.realloc_lhs {
                    self.emit_realloc_on_assign_class(
                        dst_wrapper,
                        src_wrapper,
                        wrapper_ty,
                        payload_bytes,
                    );
                }

                let byte_ptr = self.types.byte_ptr_ty();
                let dst_data_field = self.desc_field_addr(dst_wrapper, wrapper_ty, CLASS_DATA);
                let dst_data = self.fb.load(self.bb, dst_data_field, byte_ptr);
                let src_data_field = self.desc_field_addr(src_wrapper, wrapper_ty, CLASS_DATA);
                let src_data = self.fb.load(self.bb, src_data_field, byte_ptr);
                self.fb.memcopy(self.bb, dst_data, src_data, payload_bytes);
                Ok(())
            }
            other => Err(CodeGenError::UnsupportedType {
                span: value.span,
                ty: other.clone(),
            }),
        }
    }

    // --- Control flow ---

    fn lower_if(
        &mut self,
        cond: &Expr,
        then_body: &[Stmt],
        else_body: &[Stmt],
    ) -> Result<(), CodeGenError> {
        let (cond_val, _) =
            self.with_load_level(LoadLevel::TwoLoads, |this| this.lower_expr(cond))?;

        let then_bb = self.fb.add_block();
        let else_bb = self.fb.add_block();
        let end_bb = self.fb.add_block();
        self.terminate(Terminator::CondBr {
            cond: cond_val,
            then_bb,
            then_args: Vec::new(),
            else_bb,
            else_args: Vec::new(),
        });

        self.resume_at(then_bb);
        self.lower_body(then_body)?;
        if self.block_open {
            self.branch_to(end_bb);
        }

        self.resume_at(else_bb);
        self.lower_body(else_body)?;
        if self.block_open {
            self.branch_to(end_bb);
        }

        self.resume_at(end_bb);
        Ok(())
    }

    fn lower_while(&mut self, cond: &Expr, body: &[Stmt]) -> Result<(), CodeGenError> {
        let cond_bb = self.fb.add_block();
        let body_bb = self.fb.add_block();
        let end_bb = self.fb.add_block();

        self.branch_to(cond_bb);
        self.resume_at(cond_bb);
        let (cond_val, _) =
            self.with_load_level(LoadLevel::TwoLoads, |this| this.lower_expr(cond))?;
        self.terminate(Terminator::CondBr {
            cond: cond_val,
            then_bb: body_bb,
            then_args: Vec::new(),
            else_bb: end_bb,
            else_args: Vec::new(),
        });

        self.resume_at(body_bb);
        self.lower_body(body)?;
        if self.block_open {
            self.branch_to(cond_bb);
        }

        self.resume_at(end_bb);
        Ok(())
    }

    // --- Exit points ---
    //
    // Every exit re-emits the scope free sequence before leaving; the
    // pending-deallocation list stays intact for the other paths.

    fn lower_return(&mut self, value: Option<&Expr>) -> Result<(), CodeGenError> {
        let ret_val = match value {
            Some(expr) => Some(
                self.with_load_level(LoadLevel::TwoLoads, |this| this.lower_expr(expr))?
                    .0,
            ),
            None => None,
        };
        self.emit_scope_frees();
        self.terminate(Terminator::Return { value: ret_val });
        self.start_dead_block();
        Ok(())
    }

    fn lower_stop(&mut self, code: Option<&Expr>, error: bool) -> Result<(), CodeGenError> {
        let code_val = match code {
            Some(expr) => self.lower_scalar_i64_in_value_ctx(expr)?,
            None => self.const_i64(if error { 1 } else { 0 }),
        };
        self.emit_scope_frees();
        if error {
            self.fb
                .call_runtime(self.bb, RuntimeFn::StackTrace, vec![], None);
        }
        self.fb
            .call_runtime(self.bb, RuntimeFn::Exit, vec![code_val], None);
        self.terminate(Terminator::Unreachable);
        self.start_dead_block();
        Ok(())
    }

    fn lower_print(&mut self, values: &[Expr]) -> Result<(), CodeGenError> {
        for value in values {
            let value_ty = self.expr_ty(value);
            match &value_ty {
                Ttype::Integer { bytes } => {
                    let (val, _) =
                        self.with_load_level(LoadLevel::TwoLoads, |this| this.lower_expr(value))?;
                    let i64_ty = self.types.int_ty(64);
                    let widened = if *bytes < 8 {
                        self.fb
                            .cast(self.bb, CastKind::IntExtend { signed: true }, val, i64_ty)
                    } else {
                        val
                    };
                    self.fb
                        .call_runtime(self.bb, RuntimeFn::PrintI64, vec![widened], None);
                }
                Ttype::Real { bytes } => {
                    let (val, _) =
                        self.with_load_level(LoadLevel::TwoLoads, |this| this.lower_expr(value))?;
                    let f64_ty = self.types.float_ty(64);
                    let widened = if *bytes < 8 {
                        self.fb.cast(self.bb, CastKind::FpExtend, val, f64_ty)
                    } else {
                        val
                    };
                    self.fb
                        .call_runtime(self.bb, RuntimeFn::PrintF64, vec![widened], None);
                }
                Ttype::Logical => {
                    let (val, _) =
                        self.with_load_level(LoadLevel::TwoLoads, |this| this.lower_expr(value))?;
                    self.fb
                        .call_runtime(self.bb, RuntimeFn::PrintBool, vec![val], None);
                }
                Ttype::Character { .. } => {
                    let repr = self.with_load_level(LoadLevel::TwoLoads, |this| {
                        this.lower_string_operand(value)
                    })?;
                    let data = self.str_data(repr);
                    let len = self.str_len(repr);
                    self.fb
                        .call_runtime(self.bb, RuntimeFn::PrintStr, vec![data, len], None);
                }
                other => {
                    return Err(CodeGenError::UnsupportedType {
                        span: value.span,
                        ty: other.clone(),
                    });
                }
            }
        }
        self.fb
            .call_runtime(self.bb, RuntimeFn::PrintNewline, vec![], None);
        Ok(())
    }

    // --- Allocation statements ---

    fn lower_allocate(
        &mut self,
        target: &Expr,
        extents: &[AllocExtent],
        as_type: Option<&Ttype>,
    ) -> Result<(), CodeGenError> {
        let target_ty = self.expr_ty(target);
        match &target_ty {
            Ttype::Array { elem, .. } => {
                let elem_tir = self.types.lower_type(elem);
                let desc_ty = self.types.descriptor_ty(elem_tir);
                let (desc, _) = self.lower_place(target)?;

                let mut specs = Vec::with_capacity(extents.len());
                for extent in extents {
                    let lower = match &extent.lower {
                        Some(expr) => self.lower_scalar_i64_in_value_ctx(expr)?,
                        None => self.const_i64(1),
                    };
                    let size = self.lower_scalar_i64_in_value_ctx(&extent.size)?;
                    specs.push(crate::lower::lower_array::DimSpec::Dynamic { lower, size });
                }
                self.fill_from_malloc(desc, desc_ty, elem_tir, &specs);
                Ok(())
            }
            Ttype::Class { name } => {
                let concrete = match as_type {
                    Some(Ttype::Struct { name }) => name.clone(),
                    _ => name.clone(),
                };
                let layout = self
                    .types
                    .layout_of(&concrete)
                    .ok_or_else(|| CodeGenError::UnknownStruct {
                        span: target.span,
                        name: concrete.clone(),
                    })?
                    .clone();
                let size = self.types.cache.layout(layout.tir).size();

                let (wrapper, _) = self.lower_place(target)?;
                let wrapper_ty = self.types.class_wrapper_ty();
                let bytes = self.const_i64(size as i64);
                let raw = self.emit_alloc(bytes);
                let data_field = self.desc_field_addr(wrapper, wrapper_ty, CLASS_DATA);
                self.fb.store(self.bb, data_field, raw);
                let hash_val = self.const_i64(layout.type_hash as i64);
                let hash_field = self.desc_field_addr(wrapper, wrapper_ty, CLASS_HASH);
                self.fb.store(self.bb, hash_field, hash_val);
                Ok(())
            }
            other => Err(CodeGenError::UnsupportedType {
                span: target.span,
                ty: other.clone(),
            }),
        }
    }

    /// Frees the heap storage now and nulls the pointer; the scope-exit free
    /// of the same pointer is a runtime no-op on null.
    fn lower_deallocate(&mut self, target: &Expr) -> Result<(), CodeGenError> {
        let target_ty = self.expr_ty(target);
        match &target_ty {
            Ttype::Array { elem, .. } => {
                let elem_tir = self.types.lower_type(elem);
                let desc_ty = self.types.descriptor_ty(elem_tir);
                let (desc, _) = self.lower_place(target)?;
                let data = self.get_pointer_to_data(desc, desc_ty, elem_tir);
                self.fb
                    .call_runtime(self.bb, RuntimeFn::Free, vec![data], None);
                let elem_ptr_ty = self.types.cache.ptr_to(elem_tir);
                let null = self.fb.const_null(self.bb, elem_ptr_ty);
                let data_field = self.desc_field_addr(desc, desc_ty, DESC_DATA);
                self.fb.store(self.bb, data_field, null);
                Ok(())
            }
            Ttype::Class { .. } => {
                let (wrapper, _) = self.lower_place(target)?;
                let wrapper_ty = self.types.class_wrapper_ty();
                let byte_ptr = self.types.byte_ptr_ty();
                let data_field = self.desc_field_addr(wrapper, wrapper_ty, CLASS_DATA);
                let data = self.fb.load(self.bb, data_field, byte_ptr);
                self.fb
                    .call_runtime(self.bb, RuntimeFn::Free, vec![data], None);
                let null = self.fb.const_null(self.bb, byte_ptr);
                self.fb.store(self.bb, data_field, null);
                Ok(())
            }
            other => Err(CodeGenError::UnsupportedType {
                span: target.span,
                ty: other.clone(),
            }),
        }
    }

    /// `target => source`: descriptor header copy for whole-array
    /// association, section descriptor construction for sections, plain
    /// address store for scalars. Never copies element data.
    fn lower_pointer_associate(&mut self, target: &Expr, source: &Expr) -> Result<(), CodeGenError> {
        let target_ty = self.expr_ty(target);
        match &target_ty {
            Ttype::Array { elem, dims, .. } => {
                let elem_tir = self.types.lower_type(elem);
                let desc_ty = self.types.descriptor_ty(elem_tir);
                let (dst_desc, _) = self.lower_place(target)?;

                match &source.kind {
                    ExprKind::ArraySection { target: parent, ranges } => {
                        let (src_desc, _) = self.lower_place(parent)?;
                        self.section_descriptor(
                            dst_desc,
                            src_desc,
                            desc_ty,
                            elem_tir,
                            dims.len(),
                            ranges,
                        )
                    }
                    _ => {
                        let (src_desc, _) = self.lower_place(source)?;
                        self.copy_array_descriptor(
                            dst_desc,
                            src_desc,
                            desc_ty,
                            elem_tir,
                            dims.len(),
                        );
                        Ok(())
                    }
                }
            }
            _ => {
                // Scalar pointer: the slot holds the target's address.
                let sym = match &target.kind {
                    ExprKind::Var(sym) => *sym,
                    _ => return Err(CodeGenError::NotAPlace { span: target.span }),
                };
                let binding = self.binding(sym);
                let (src_addr, _) = self.lower_place(source)?;
                self.fb.store(self.bb, binding.addr, src_addr);
                Ok(())
            }
        }
    }

    // --- Helpers ---

    /// Storage class of the symbol at the root of a place expression.
    fn place_storage(&self, expr: &Expr) -> Option<Storage> {
        match &expr.kind {
            ExprKind::Var(sym) => Some(self.sym(*sym).storage),
            ExprKind::ArrayItem { target, .. }
            | ExprKind::ArraySection { target, .. }
            | ExprKind::StructFieldRef { target, .. } => self.place_storage(target),
            _ => None,
        }
    }

    /// Total element count of an array value.
    fn array_value_count(&mut self, src: &ArrayValue, src_ty: &Ttype) -> ValueId {
        match src.phys {
            PhysicalType::Descriptor => {
                let elem_tir = {
                    let elem = src_ty.array_elem().clone();
                    self.types.lower_type(&elem)
                };
                let desc_ty = self.types.descriptor_ty(elem_tir);
                self.get_size(src.value, desc_ty, src_ty.array_rank(), None)
            }
            _ => self.static_count(src_ty.array_dims()),
        }
    }

    /// Bare data pointer of an array value.
    fn array_value_data(&mut self, src: &ArrayValue, elem_tir: TirTypeId) -> ValueId {
        match src.phys {
            PhysicalType::Descriptor => {
                let desc_ty = self.types.descriptor_ty(elem_tir);
                self.data_ptr_with_offset(src.value, desc_ty, elem_tir)
            }
            _ => self.data_only_ptr(*src, elem_tir),
        }
    }

    fn static_count(&mut self, dims: &[crate::tast::Dim]) -> ValueId {
        let count: i64 = dims
            .iter()
            .map(|d| {
                d.length
                    .unwrap_or_else(|| panic!("codegen bug: static count of deferred extent"))
            })
            .product();
        self.const_i64(count)
    }
}

#[cfg(test)]
#[path = "../tests/t_lower.rs"]
mod tests;
