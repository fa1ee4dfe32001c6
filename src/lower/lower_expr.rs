//! Expression lowering.
//!
//! Value representation: scalars are TIR register values; aggregates
//! (arrays, strings, structs, class wrappers, complex numbers) are the
//! address of their storage. Terminal visits (variable, member access,
//! array element) finish by applying the caller's load level; see
//! `lower::load` for the protocol.

use crate::lower::errors::CodeGenError;
use crate::lower::load::{indirection_chain, LoadLevel};
use crate::lower::lower_string::StrRepr;
use crate::lower::lowerer::FuncLowerer;
use crate::tast::{
    BinaryOp, CastKind, CmpOp, Expr, ExprKind, Intrinsic, PhysicalType, Ttype,
};
use crate::tir::{self, BinOp, GlobalInit, RuntimeFn, Terminator, TirTypeId, TirTypeKind, ValueId};

impl<'a> FuncLowerer<'a> {
    /// The expression's effective type, honoring selector rebinding.
    pub(super) fn expr_ty(&self, expr: &Expr) -> Ttype {
        match &expr.kind {
            ExprKind::Var(sym) => self.sym_ty(*sym),
            _ => expr.ty.clone(),
        }
    }

    /// Lowers an expression in the current load-level context.
    /// Returns the produced value and its TIR type.
    pub(super) fn lower_expr(&mut self, expr: &Expr) -> Result<(ValueId, TirTypeId), CodeGenError> {
        match &expr.kind {
            ExprKind::IntConst(value) => {
                let Ttype::Integer { bytes } = expr.ty else {
                    panic!("codegen bug: integer constant with type {:?}", expr.ty);
                };
                let ty = self.types.int_ty(bytes * 8);
                let value = self
                    .fb
                    .const_int(self.bb, *value as i128, true, bytes * 8, ty);
                Ok((value, ty))
            }
            ExprKind::RealConst(value) => {
                let Ttype::Real { bytes } = expr.ty else {
                    panic!("codegen bug: real constant with type {:?}", expr.ty);
                };
                let ty = self.types.float_ty(bytes * 8);
                let value = self.fb.const_float(self.bb, *value, bytes * 8, ty);
                Ok((value, ty))
            }
            ExprKind::LogicalConst(value) => {
                let ty = self.types.bool_ty();
                let value = self.fb.const_bool(self.bb, *value, ty);
                Ok((value, ty))
            }
            ExprKind::ComplexConst { re, im } => self.lower_complex_const(expr, *re, *im),
            ExprKind::StrConst(text) => self.lower_str_const(text),

            ExprKind::Var(sym) => {
                let symbol = self.sym(*sym).clone();
                let binding = self.binding(*sym);
                let storage = {
                    // The selector view changes the value type but not the
                    // slot: a rebound selector's addr is already the payload.
                    if self
                        .selector_view
                        .as_ref()
                        .is_some_and(|(selector, _)| selector == sym)
                    {
                        let view_ty = self.sym_ty(*sym);
                        self.types.lower_type(&view_ty)
                    } else {
                        self.types.storage_ty(&symbol)
                    }
                };
                let slot_ptr_ty = self.types.cache.ptr_to(storage);
                let chain = if self
                    .selector_view
                    .as_ref()
                    .is_some_and(|(selector, _)| selector == sym)
                {
                    0
                } else {
                    indirection_chain(&symbol)
                };
                Ok(self.apply_loads(binding.addr, slot_ptr_ty, chain))
            }

            ExprKind::ArrayItem { target, indices } => {
                self.lower_array_item(target, indices)
            }
            ExprKind::ArraySection { target, ranges } => {
                self.lower_array_section(expr, target, ranges)
            }
            ExprKind::StructFieldRef { target, field } => {
                self.lower_field_ref(expr, target, field)
            }

            ExprKind::BinOp { op, lhs, rhs } => self.lower_binop(expr, *op, lhs, rhs),
            ExprKind::Cmp { op, lhs, rhs } => self.lower_cmp(*op, lhs, rhs),
            ExprKind::Cast { kind, value } => self.lower_cast(expr, *kind, value),

            ExprKind::FuncCall { name, args } => self.lower_func_call(expr, name, args),
            ExprKind::IntrinsicCall { intrinsic, args } => {
                self.lower_intrinsic(expr, *intrinsic, args)
            }
            ExprKind::MethodCall {
                target,
                binding,
                args,
            } => self.lower_method_call(expr, target, binding, args),

            ExprKind::ArrayConstructor { elems } => self.lower_array_constructor(expr, elems),
            ExprKind::ListConstructor { elems } => self.lower_list_constructor(expr, elems),

            ExprKind::StringConcat { lhs, rhs } => {
                let lhs = self.lower_string_operand(lhs)?;
                let rhs = self.lower_string_operand(rhs)?;
                let out = self.str_concat(lhs, rhs);
                let str_ty = self.types.string_desc_ty();
                let ptr_ty = self.types.cache.ptr_to(str_ty);
                Ok((out, ptr_ty))
            }
            ExprKind::StrSliceInclusive { target, start, end } => {
                let out = self.lower_slice_onebased(target, start, end)?;
                let str_ty = self.types.string_desc_ty();
                let ptr_ty = self.types.cache.ptr_to(str_ty);
                Ok((out, ptr_ty))
            }
            ExprKind::StrSliceHalfOpen { target, start, end } => {
                let out = self.lower_slice_halfopen(target, start, end)?;
                let str_ty = self.types.string_desc_ty();
                let ptr_ty = self.types.cache.ptr_to(str_ty);
                Ok((out, ptr_ty))
            }
        }
    }

    /// Lowers an lvalue expression to the address of its value.
    pub(super) fn lower_place(&mut self, expr: &Expr) -> Result<(ValueId, Ttype), CodeGenError> {
        match &expr.kind {
            ExprKind::Var(sym) => {
                let symbol = self.sym(*sym).clone();
                let ty = self.sym_ty(*sym);
                let level = self.place_level(&symbol);
                let binding = self.binding(*sym);
                let is_view = self
                    .selector_view
                    .as_ref()
                    .is_some_and(|(selector, _)| selector == sym);
                if is_view {
                    return Ok((binding.addr, ty));
                }
                let storage = self.types.storage_ty(&symbol);
                let slot_ptr_ty = self.types.cache.ptr_to(storage);
                let chain = indirection_chain(&symbol);
                let (addr, _) = self.with_load_level(level, |this| {
                    this.apply_loads(binding.addr, slot_ptr_ty, chain)
                });
                Ok((addr, ty))
            }
            ExprKind::ArrayItem { target, indices } => {
                let elem_ty = self.expr_ty(expr);
                let (addr, _) = self.with_load_level(LoadLevel::AddressOnly, |this| {
                    this.lower_array_item(target, indices)
                })?;
                Ok((addr, elem_ty))
            }
            ExprKind::StructFieldRef { target, field } => {
                let field_ty = self.expr_ty(expr);
                let (addr, _) = self.with_load_level(LoadLevel::AddressOnly, |this| {
                    this.lower_field_ref(expr, target, field)
                })?;
                Ok((addr, field_ty))
            }
            ExprKind::ArraySection { target, ranges } => {
                let (addr, _) = self.lower_array_section(expr, target, ranges)?;
                Ok((addr, self.expr_ty(expr)))
            }
            _ => Err(CodeGenError::NotAPlace { span: expr.span }),
        }
    }

    /// Member access, descending through the inheritance chain when the
    /// field lives in a parent layout.
    pub(super) fn lower_field_ref(
        &mut self,
        expr: &Expr,
        target: &Expr,
        field: &str,
    ) -> Result<(ValueId, TirTypeId), CodeGenError> {
        let target_ty = self.expr_ty(target);
        let (base_addr, struct_name) = match &target_ty {
            Ttype::Struct { name } => {
                let (addr, _) = self.lower_place(target)?;
                (addr, name.clone())
            }
            Ttype::Class { name } => {
                // Unrebound polymorphic access goes through the payload,
                // viewed as the declared base.
                let (wrapper_addr, _) = self.lower_place(target)?;
                let (payload, _) = self.wrapper_payload_as(wrapper_addr, name);
                (payload, name.clone())
            }
            other => panic!("codegen bug: field access on non-struct type {:?}", other),
        };

        self.with_current_struct(Some(struct_name.clone()), |this| {
            let (path, field_ty) = this
                .types
                .field_path(&struct_name, field)
                .ok_or_else(|| CodeGenError::UnknownField {
                    span: expr.span,
                    // Report against the innermost struct being resolved.
                    name: this
                        .current_struct
                        .clone()
                        .unwrap_or_else(|| struct_name.clone()),
                    field: field.to_string(),
                })?;

            let layout_tir = this
                .types
                .layout_of(&struct_name)
                .unwrap_or_else(|| panic!("codegen bug: unregistered struct '{}'", struct_name))
                .tir;

            let mut addr = base_addr;
            let mut agg_ty = layout_tir;
            for index in path {
                let field_tir = match this.types.cache.kind(agg_ty) {
                    TirTypeKind::Struct { fields } => fields[index].ty,
                    other => panic!("codegen bug: field path through non-struct {:?}", other),
                };
                let ptr_ty = this.types.cache.ptr_to(field_tir);
                addr = this.fb.field_addr(this.bb, addr, index, ptr_ty);
                agg_ty = field_tir;
            }

            let field_ptr_ty = this.types.cache.ptr_to(agg_ty);
            Ok(this.apply_elem_loads(addr, field_ptr_ty, &field_ty))
        })
    }

    // --- Operators ---

    fn lower_binop(
        &mut self,
        expr: &Expr,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<(ValueId, TirTypeId), CodeGenError> {
        match &expr.ty {
            Ttype::Integer { .. } | Ttype::Real { .. } => {
                let ty = self.types.lower_type(&expr.ty);
                let (lhs_val, rhs_val) = self.with_load_level(LoadLevel::TwoLoads, |this| {
                    let lhs_val = this.lower_expr(lhs)?;
                    let rhs_val = this.lower_expr(rhs)?;
                    Ok::<_, CodeGenError>((lhs_val.0, rhs_val.0))
                })?;
                let op = map_binop(op);
                Ok((self.fb.binop(self.bb, op, lhs_val, rhs_val, ty), ty))
            }
            Ttype::Complex { bytes } => self.lower_complex_binop(op, lhs, rhs, *bytes),
            other => Err(CodeGenError::UnsupportedType {
                span: expr.span,
                ty: other.clone(),
            }),
        }
    }

    fn lower_complex_binop(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        component_bytes: u8,
    ) -> Result<(ValueId, TirTypeId), CodeGenError> {
        let complex_ty = self.types.complex_ty(component_bytes * 8);
        let out = self.alloc_temp(complex_ty);

        let (lhs_addr, rhs_addr) = self.with_load_level(LoadLevel::TwoLoads, |this| {
            let lhs_addr = this.lower_expr(lhs)?;
            let rhs_addr = this.lower_expr(rhs)?;
            Ok::<_, CodeGenError>((lhs_addr.0, rhs_addr.0))
        })?;

        let runtime = match op {
            BinaryOp::Add => RuntimeFn::ComplexAdd,
            BinaryOp::Sub => RuntimeFn::ComplexSub,
            BinaryOp::Mul => RuntimeFn::ComplexMul,
            BinaryOp::Div => RuntimeFn::ComplexDiv,
        };

        let byte_ptr = self.types.byte_ptr_ty();
        let out_raw = self.bitcast(out, byte_ptr);
        let lhs_raw = self.bitcast(lhs_addr, byte_ptr);
        let rhs_raw = self.bitcast(rhs_addr, byte_ptr);
        let bits = self.const_i64((component_bytes * 8) as i64);
        self.fb.call_runtime(
            self.bb,
            runtime,
            vec![out_raw, lhs_raw, rhs_raw, bits],
            None,
        );

        let ptr_ty = self.types.cache.ptr_to(complex_ty);
        Ok((out, ptr_ty))
    }

    fn lower_cmp(
        &mut self,
        op: CmpOp,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<(ValueId, TirTypeId), CodeGenError> {
        let bool_ty = self.types.bool_ty();
        let lhs_ty = self.expr_ty(lhs);

        if lhs_ty.is_character() {
            let (lhs_repr, rhs_repr) = self.with_load_level(LoadLevel::TwoLoads, |this| {
                let lhs_repr = this.lower_string_operand(lhs)?;
                let rhs_repr = this.lower_string_operand(rhs)?;
                Ok::<_, CodeGenError>((lhs_repr, rhs_repr))
            })?;
            let ordering = self.str_compare(lhs_repr, rhs_repr);
            let zero = self.const_i64(0);
            let value = self
                .fb
                .cmp(self.bb, map_cmp(op), ordering, zero, bool_ty);
            return Ok((value, bool_ty));
        }

        let (lhs_val, rhs_val) = self.with_load_level(LoadLevel::TwoLoads, |this| {
            let lhs_val = this.lower_expr(lhs)?;
            let rhs_val = this.lower_expr(rhs)?;
            Ok::<_, CodeGenError>((lhs_val.0, rhs_val.0))
        })?;
        let value = self.fb.cmp(self.bb, map_cmp(op), lhs_val, rhs_val, bool_ty);
        Ok((value, bool_ty))
    }

    fn lower_cast(
        &mut self,
        expr: &Expr,
        kind: CastKind,
        value: &Expr,
    ) -> Result<(ValueId, TirTypeId), CodeGenError> {
        let (value_id, _) =
            self.with_load_level(LoadLevel::TwoLoads, |this| this.lower_expr(value))?;
        let to_ty = self.types.lower_type(&expr.ty);

        let tir_kind = match kind {
            CastKind::IntToReal => tir::CastKind::IntToFp { signed: true },
            CastKind::RealToInt => tir::CastKind::FpToInt { signed: true },
            CastKind::IntResize => {
                let from_bytes = match self.expr_ty(value) {
                    Ttype::Integer { bytes } => bytes,
                    other => panic!("codegen bug: int resize from {:?}", other),
                };
                let to_bytes = match expr.ty {
                    Ttype::Integer { bytes } => bytes,
                    _ => panic!("codegen bug: int resize to {:?}", expr.ty),
                };
                if to_bytes < from_bytes {
                    tir::CastKind::IntTrunc
                } else {
                    tir::CastKind::IntExtend { signed: true }
                }
            }
            CastKind::RealResize => {
                let from_bytes = match self.expr_ty(value) {
                    Ttype::Real { bytes } => bytes,
                    other => panic!("codegen bug: real resize from {:?}", other),
                };
                let to_bytes = match expr.ty {
                    Ttype::Real { bytes } => bytes,
                    _ => panic!("codegen bug: real resize to {:?}", expr.ty),
                };
                if to_bytes < from_bytes {
                    tir::CastKind::FpTrunc
                } else {
                    tir::CastKind::FpExtend
                }
            }
            CastKind::LogicalToInt => tir::CastKind::IntExtend { signed: false },
        };

        Ok((self.fb.cast(self.bb, tir_kind, value_id, to_ty), to_ty))
    }

    // --- Intrinsics ---

    fn lower_intrinsic(
        &mut self,
        expr: &Expr,
        intrinsic: Intrinsic,
        args: &[Expr],
    ) -> Result<(ValueId, TirTypeId), CodeGenError> {
        let i64_ty = self.types.int_ty(64);
        match intrinsic {
            Intrinsic::Size => {
                let target = args
                    .first()
                    .unwrap_or_else(|| panic!("codegen bug: size() without argument"));
                let target_ty = self.expr_ty(target);
                let Ttype::Array {
                    dims, physical, elem,
                } = &target_ty
                else {
                    return Err(CodeGenError::UnsupportedIntrinsic { span: expr.span });
                };
                // Optional 1-based dimension argument.
                let dim = match args.get(1) {
                    Some(arg) => match arg.kind {
                        ExprKind::IntConst(d) => Some((d - 1) as usize),
                        _ => return Err(CodeGenError::UnsupportedIntrinsic { span: expr.span }),
                    },
                    None => None,
                };

                match physical {
                    PhysicalType::Descriptor => {
                        let elem_tir = self.types.lower_type(elem);
                        let desc_ty = self.types.descriptor_ty(elem_tir);
                        let (desc, _) = self.lower_place(target)?;
                        let value = self.get_size(desc, desc_ty, dims.len(), dim);
                        Ok((value, i64_ty))
                    }
                    _ => {
                        let value = match dim {
                            Some(d) => dims[d]
                                .length
                                .unwrap_or_else(|| panic!("codegen bug: size() of deferred dim")),
                            None => dims
                                .iter()
                                .map(|d| {
                                    d.length.unwrap_or_else(|| {
                                        panic!("codegen bug: size() of deferred dim")
                                    })
                                })
                                .product(),
                        };
                        Ok((self.const_i64(value), i64_ty))
                    }
                }
            }
            Intrinsic::Len => {
                let target = args
                    .first()
                    .unwrap_or_else(|| panic!("codegen bug: len() without argument"));
                let repr = self.with_load_level(LoadLevel::TwoLoads, |this| {
                    this.lower_string_operand(target)
                })?;
                let value = self.str_len(repr);
                Ok((value, i64_ty))
            }
            Intrinsic::Allocated => {
                let target = args
                    .first()
                    .unwrap_or_else(|| panic!("codegen bug: allocated() without argument"));
                let target_ty = self.expr_ty(target);
                let Ttype::Array { elem, .. } = &target_ty else {
                    return Err(CodeGenError::UnsupportedIntrinsic { span: expr.span });
                };
                let elem_tir = self.types.lower_type(elem);
                let desc_ty = self.types.descriptor_ty(elem_tir);
                let (desc, _) = self.lower_place(target)?;
                let data = self.get_pointer_to_data(desc, desc_ty, elem_tir);
                let elem_ptr_ty = self.types.cache.ptr_to(elem_tir);
                let null = self.fb.const_null(self.bb, elem_ptr_ty);
                let bool_ty = self.types.bool_ty();
                let value = self
                    .fb
                    .cmp(self.bb, tir::CmpOp::Ne, data, null, bool_ty);
                Ok((value, bool_ty))
            }
            Intrinsic::Abs => self.lower_abs(expr, args),
        }
    }

    /// `abs(x)`: branchy select joined through a block parameter.
    fn lower_abs(
        &mut self,
        expr: &Expr,
        args: &[Expr],
    ) -> Result<(ValueId, TirTypeId), CodeGenError> {
        let arg = args
            .first()
            .unwrap_or_else(|| panic!("codegen bug: abs() without argument"));
        let ty = self.types.lower_type(&expr.ty);
        let bool_ty = self.types.bool_ty();

        let (value, _) = self.with_load_level(LoadLevel::TwoLoads, |this| this.lower_expr(arg))?;
        let zero = match expr.ty {
            Ttype::Integer { bytes } => {
                self.fb
                    .const_int(self.bb, 0, true, bytes * 8, ty)
            }
            Ttype::Real { bytes } => self.fb.const_float(self.bb, 0.0, bytes * 8, ty),
            _ => return Err(CodeGenError::UnsupportedIntrinsic { span: expr.span }),
        };
        let negative = self
            .fb
            .cmp(self.bb, tir::CmpOp::Lt, value, zero, bool_ty);

        let neg_bb = self.fb.add_block();
        let join_bb = self.fb.add_block();
        let joined = self.fb.add_block_param(join_bb, ty);
        self.terminate(Terminator::CondBr {
            cond: negative,
            then_bb: neg_bb,
            then_args: Vec::new(),
            else_bb: join_bb,
            else_args: vec![value],
        });

        self.resume_at(neg_bb);
        let negated = self.fb.unop(self.bb, tir::UnOp::Neg, value, ty);
        self.terminate(Terminator::Br {
            target: join_bb,
            args: vec![negated],
        });

        self.resume_at(join_bb);
        Ok((joined, ty))
    }

    // --- Constructors ---

    fn lower_complex_const(
        &mut self,
        expr: &Expr,
        re: f64,
        im: f64,
    ) -> Result<(ValueId, TirTypeId), CodeGenError> {
        let Ttype::Complex { bytes } = expr.ty else {
            panic!("codegen bug: complex constant with type {:?}", expr.ty);
        };
        let bits = bytes * 8;
        let complex_ty = self.types.complex_ty(bits);
        let float_ty = self.types.float_ty(bits);
        let addr = self.alloc_temp(complex_ty);

        let re_val = self.fb.const_float(self.bb, re, bits, float_ty);
        let re_field = self.desc_field_addr(addr, complex_ty, 0);
        self.fb.store(self.bb, re_field, re_val);
        let im_val = self.fb.const_float(self.bb, im, bits, float_ty);
        let im_field = self.desc_field_addr(addr, complex_ty, 1);
        self.fb.store(self.bb, im_field, im_val);

        let ptr_ty = self.types.cache.ptr_to(complex_ty);
        Ok((addr, ptr_ty))
    }

    fn lower_str_const(&mut self, text: &str) -> Result<(ValueId, TirTypeId), CodeGenError> {
        let byte_ty = self.types.byte_ty();
        let bytes_ty = self.types.cache.intern(TirTypeKind::Array {
            elem: byte_ty,
            dims: vec![text.len() as u64],
        });
        let name = format!("str_{}", self.mb.global_count());
        let global = self
            .mb
            .add_global(name, bytes_ty, GlobalInit::Bytes(text.as_bytes().to_vec()));
        let bytes_ptr_ty = self.types.cache.ptr_to(bytes_ty);
        let global_addr = self.fb.addr_of_global(self.bb, global, bytes_ptr_ty);
        let byte_ptr = self.types.byte_ptr_ty();
        let data = self.bitcast(global_addr, byte_ptr);

        let str_ty = self.types.string_desc_ty();
        let desc = self.alloc_temp(str_ty);
        let data_field = self.desc_field_addr(desc, str_ty, crate::lower::types::STR_DATA);
        self.fb.store(self.bb, data_field, data);
        let len = self.const_i64(text.len() as i64);
        let len_field = self.desc_field_addr(desc, str_ty, crate::lower::types::STR_LEN);
        self.fb.store(self.bb, len_field, len);

        let ptr_ty = self.types.cache.ptr_to(str_ty);
        Ok((desc, ptr_ty))
    }

    fn lower_array_constructor(
        &mut self,
        expr: &Expr,
        elems: &[Expr],
    ) -> Result<(ValueId, TirTypeId), CodeGenError> {
        let Ttype::Array { elem, .. } = &expr.ty else {
            panic!("codegen bug: array constructor with type {:?}", expr.ty);
        };
        let elem_tir = self.types.lower_type(elem);
        let arr_ty = self.types.cache.intern(TirTypeKind::Array {
            elem: elem_tir,
            dims: vec![elems.len() as u64],
        });
        let addr = self.alloc_temp(arr_ty);
        let elem_ptr_ty = self.types.cache.ptr_to(elem_tir);
        let data = self.bitcast(addr, elem_ptr_ty);

        for (i, elem_expr) in elems.iter().enumerate() {
            let (value, _) =
                self.with_load_level(LoadLevel::TwoLoads, |this| this.lower_expr(elem_expr))?;
            let index = self.const_i64(i as i64);
            let slot = self.fb.index_addr(self.bb, data, index, elem_ptr_ty);
            self.fb.store(self.bb, slot, value);
        }

        let ptr_ty = self.types.cache.ptr_to(arr_ty);
        Ok((addr, ptr_ty))
    }

    fn lower_list_constructor(
        &mut self,
        expr: &Expr,
        elems: &[Expr],
    ) -> Result<(ValueId, TirTypeId), CodeGenError> {
        let Ttype::List { elem } = &expr.ty else {
            panic!("codegen bug: list constructor with type {:?}", expr.ty);
        };
        let list_ty = self.types.lower_type(&expr.ty);
        let elem_tir = self.types.lower_type(elem);
        let elem_size = self.types.elem_stride(elem_tir);

        let list = self.alloc_temp(list_ty);
        let byte_ptr = self.types.byte_ptr_ty();
        let list_raw = self.bitcast(list, byte_ptr);
        let count = self.const_i64(elems.len() as i64);
        let size_val = self.const_i64(elem_size as i64);
        self.fb.call_runtime(
            self.bb,
            RuntimeFn::ListEnsure,
            vec![list_raw, count, size_val],
            None,
        );

        for elem_expr in elems {
            let (value, value_ty) =
                self.with_load_level(LoadLevel::TwoLoads, |this| this.lower_expr(elem_expr))?;
            // Stage the element in a slot so the runtime sees an address.
            let elem_addr = if self.expr_ty(elem_expr).is_scalar() {
                let slot = self.alloc_temp(value_ty);
                self.fb.store(self.bb, slot, value);
                slot
            } else {
                value
            };
            let elem_raw = self.bitcast(elem_addr, byte_ptr);
            self.fb.call_runtime(
                self.bb,
                RuntimeFn::ListAppend,
                vec![list_raw, elem_raw, size_val],
                None,
            );
        }

        let ptr_ty = self.types.cache.ptr_to(list_ty);
        Ok((list, ptr_ty))
    }

    /// Lowers a character-typed operand into its representation.
    pub(super) fn lower_string_operand(&mut self, expr: &Expr) -> Result<StrRepr, CodeGenError> {
        let (value, _) = self.lower_expr(expr)?;
        Ok(StrRepr::Descriptor(value))
    }
}

pub(super) fn map_binop(op: BinaryOp) -> BinOp {
    match op {
        BinaryOp::Add => BinOp::Add,
        BinaryOp::Sub => BinOp::Sub,
        BinaryOp::Mul => BinOp::Mul,
        BinaryOp::Div => BinOp::Div,
    }
}

pub(super) fn map_cmp(op: CmpOp) -> tir::CmpOp {
    match op {
        CmpOp::Eq => tir::CmpOp::Eq,
        CmpOp::Ne => tir::CmpOp::Ne,
        CmpOp::Lt => tir::CmpOp::Lt,
        CmpOp::Le => tir::CmpOp::Le,
        CmpOp::Gt => tir::CmpOp::Gt,
        CmpOp::Ge => tir::CmpOp::Ge,
    }
}
