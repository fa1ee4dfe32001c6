//! Call lowering: user functions, subroutine calls, and type-bound
//! procedure dispatch.
//!
//! Arguments pass by reference: a place argument passes its address, any
//! other expression is staged in a stack slot first. BindC signatures pass
//! scalars by value, single characters as raw pointers, and complex values
//! by value or by reference depending on the target platform.
//!
//! Dispatch through a polymorphic receiver compares the wrapper's type hash
//! against each candidate's vtable singleton and branches to a direct call,
//! one conditional per concrete type. `nopass` bindings drop the receiver
//! argument. An indexed call table is deliberately not used; the branch
//! chain keeps binding semantics (especially `nopass`) explicit.

use crate::diag::Span;
use crate::lower::errors::CodeGenError;
use crate::lower::load::LoadLevel;
use crate::lower::lowerer::FuncLowerer;
use crate::tast::{CharLen, Expr, ExprKind, Ttype};
use crate::tir::{Callee, CmpOp, Terminator, TirTypeId, ValueId};

impl<'a> FuncLowerer<'a> {
    pub(super) fn lower_func_call(
        &mut self,
        expr: &Expr,
        name: &str,
        args: &[Expr],
    ) -> Result<(ValueId, TirTypeId), CodeGenError> {
        match self.lower_call_common(expr.span, name, args)? {
            Some(result) => Ok(result),
            None => panic!("codegen bug: value use of subroutine '{}'", name),
        }
    }

    /// Lowers a subroutine call statement.
    pub(super) fn lower_call_stmt(
        &mut self,
        span: Span,
        name: &str,
        args: &[Expr],
    ) -> Result<(), CodeGenError> {
        let _ = self.lower_call_common(span, name, args)?;
        Ok(())
    }

    /// Shared path for call expressions and call statements. Returns the
    /// result value for functions, `None` for subroutines.
    fn lower_call_common(
        &mut self,
        span: Span,
        name: &str,
        args: &[Expr],
    ) -> Result<Option<(ValueId, TirTypeId)>, CodeGenError> {
        let callee = self
            .module
            .func(name)
            .ok_or_else(|| CodeGenError::UnknownFunction {
                span,
                name: name.to_string(),
            })?
            .clone();
        let func_id = self
            .mb
            .lookup_func(name)
            .unwrap_or_else(|| panic!("codegen bug: function '{}' not reserved", name));

        let mut arg_vals = Vec::with_capacity(args.len());
        for (arg, param) in args.iter().zip(&callee.args) {
            let param_sym = self.module.symbols.get(*param).clone();
            let value = if callee.bind_c {
                self.lower_bindc_arg(arg, &param_sym.ty)?
            } else {
                self.arg_address(arg)?
            };
            arg_vals.push(value);
        }

        let ret_ty = match &callee.ret {
            Some(ty) if ty.is_scalar() => Some(self.types.lower_type(ty)),
            Some(_) => return Err(CodeGenError::AggregateReturn { span }),
            None => None,
        };

        let result = self
            .fb
            .call(self.bb, Callee::Func(func_id), arg_vals, ret_ty);
        Ok(result.map(|value| (value, ret_ty.unwrap())))
    }

    /// Address of an argument: places pass their storage directly, other
    /// expressions are staged in a temporary slot.
    pub(super) fn arg_address(&mut self, arg: &Expr) -> Result<ValueId, CodeGenError> {
        let is_place = matches!(
            arg.kind,
            ExprKind::Var(_)
                | ExprKind::ArrayItem { .. }
                | ExprKind::StructFieldRef { .. }
                | ExprKind::ArraySection { .. }
        );
        if is_place {
            let (addr, _) = self.lower_place(arg)?;
            return Ok(addr);
        }

        let (value, value_ty) =
            self.with_load_level(LoadLevel::TwoLoads, |this| this.lower_expr(arg))?;
        if self.expr_ty(arg).is_scalar() {
            let slot = self.alloc_temp(value_ty);
            self.fb.store(self.bb, slot, value);
            Ok(slot)
        } else {
            // Aggregates are already addresses.
            Ok(value)
        }
    }

    /// BindC arguments follow the platform ABI rather than the by-reference
    /// convention.
    fn lower_bindc_arg(&mut self, arg: &Expr, param_ty: &Ttype) -> Result<ValueId, CodeGenError> {
        match param_ty {
            // Single characters cross the C boundary as raw pointers.
            Ttype::Character {
                len: CharLen::Fixed(1),
            } => {
                let repr = self.with_load_level(LoadLevel::TwoLoads, |this| {
                    this.lower_string_operand(arg)
                })?;
                let data = self.str_data(repr);
                let cchar = crate::lower::lower_string::StrRepr::CChar(data);
                Ok(self.str_data(cchar))
            }
            Ttype::Complex { bytes } => {
                let (addr, _) =
                    self.with_load_level(LoadLevel::TwoLoads, |this| this.lower_expr(arg))?;
                if self.options.target.pass_complex_by_value(*bytes) {
                    let complex_ty = self.types.complex_ty(bytes * 8);
                    Ok(self.fb.load(self.bb, addr, complex_ty))
                } else {
                    Ok(addr)
                }
            }
            ty if ty.is_scalar() => {
                let (value, _) =
                    self.with_load_level(LoadLevel::TwoLoads, |this| this.lower_expr(arg))?;
                Ok(value)
            }
            _ => self.arg_address(arg),
        }
    }

    // --- Type-bound procedure dispatch ---

    pub(super) fn lower_method_call(
        &mut self,
        expr: &Expr,
        target: &Expr,
        binding: &str,
        args: &[Expr],
    ) -> Result<(ValueId, TirTypeId), CodeGenError> {
        match self.lower_method_call_common(expr.span, target, binding, args)? {
            Some(result) => Ok(result),
            None => panic!("codegen bug: value use of void binding '{}'", binding),
        }
    }

    pub(super) fn lower_method_call_common(
        &mut self,
        span: Span,
        target: &Expr,
        binding: &str,
        args: &[Expr],
    ) -> Result<Option<(ValueId, TirTypeId)>, CodeGenError> {
        let target_ty = self.expr_ty(target);
        match &target_ty {
            Ttype::Struct { name } => {
                let (addr, _) = self.lower_place(target)?;
                self.dispatch_static(span, name, binding, Some(addr), args)
            }
            Ttype::Class { name } => self.dispatch_dynamic(span, target, name, binding, args),
            other => panic!("codegen bug: method call on non-object type {:?}", other),
        }
    }

    /// Direct call of the binding resolved against a concrete type.
    fn dispatch_static(
        &mut self,
        span: Span,
        type_name: &str,
        binding: &str,
        receiver: Option<ValueId>,
        args: &[Expr],
    ) -> Result<Option<(ValueId, TirTypeId)>, CodeGenError> {
        let bound = self
            .types
            .resolve_binding(type_name, binding)
            .ok_or_else(|| CodeGenError::UnknownBinding {
                span,
                name: type_name.to_string(),
                binding: binding.to_string(),
            })?
            .clone();

        let callee = self
            .module
            .func(&bound.proc)
            .ok_or_else(|| CodeGenError::UnknownFunction {
                span,
                name: bound.proc.clone(),
            })?
            .clone();
        let func_id = self
            .mb
            .lookup_func(&bound.proc)
            .unwrap_or_else(|| panic!("codegen bug: binding proc '{}' not reserved", bound.proc));

        let mut arg_vals = Vec::new();
        if !bound.nopass {
            let receiver =
                receiver.unwrap_or_else(|| panic!("codegen bug: pass binding without receiver"));
            arg_vals.push(receiver);
        }
        for arg in args {
            arg_vals.push(self.arg_address(arg)?);
        }

        let ret_ty = match &callee.ret {
            Some(ty) if ty.is_scalar() => Some(self.types.lower_type(ty)),
            Some(_) => return Err(CodeGenError::AggregateReturn { span }),
            None => None,
        };
        let result = self
            .fb
            .call(self.bb, Callee::Func(func_id), arg_vals, ret_ty);
        Ok(result.map(|value| (value, ret_ty.unwrap())))
    }

    /// Hash-compare-and-branch dispatch over the inheritance closure.
    fn dispatch_dynamic(
        &mut self,
        span: Span,
        target: &Expr,
        base: &str,
        binding: &str,
        args: &[Expr],
    ) -> Result<Option<(ValueId, TirTypeId)>, CodeGenError> {
        let (wrapper_addr, _) = self.lower_place(target)?;
        let selector_hash = self.load_wrapper_hash(wrapper_addr);

        let candidates: Vec<String> = self
            .types
            .concrete_types_extending(base)
            .into_iter()
            .filter(|name| self.types.resolve_binding(name, binding).is_some())
            .collect();
        if candidates.is_empty() {
            return Err(CodeGenError::UnknownBinding {
                span,
                name: base.to_string(),
                binding: binding.to_string(),
            });
        }

        // Result staged through a slot so every branch joins on one value.
        let ret_ty = self.binding_ret_ty(span, &candidates[0], binding)?;
        let result_slot = ret_ty.map(|ty| self.alloc_temp(ty));

        let end_bb = self.fb.add_block();
        for name in &candidates {
            let bool_ty = self.types.bool_ty();
            let vtable_hash = self.vtable_hash(name);
            let cond = self
                .fb
                .cmp(self.bb, CmpOp::Eq, selector_hash, vtable_hash, bool_ty);

            let call_bb = self.fb.add_block();
            let next_bb = self.fb.add_block();
            self.terminate(Terminator::CondBr {
                cond,
                then_bb: call_bb,
                then_args: Vec::new(),
                else_bb: next_bb,
                else_args: Vec::new(),
            });

            self.resume_at(call_bb);
            let (payload, _) = self.wrapper_payload_as(wrapper_addr, name);
            let result = self.dispatch_static(span, name, binding, Some(payload), args)?;
            if let (Some(slot), Some((value, _))) = (result_slot, result) {
                self.fb.store(self.bb, slot, value);
            }
            self.branch_to(end_bb);

            self.resume_at(next_bb);
        }

        // No candidate matched; fall through with the slot untouched.
        self.branch_to(end_bb);
        self.resume_at(end_bb);

        match (result_slot, ret_ty) {
            (Some(slot), Some(ty)) => {
                let value = self.fb.load(self.bb, slot, ty);
                Ok(Some((value, ty)))
            }
            _ => Ok(None),
        }
    }

    fn binding_ret_ty(
        &mut self,
        span: Span,
        type_name: &str,
        binding: &str,
    ) -> Result<Option<TirTypeId>, CodeGenError> {
        let bound = self
            .types
            .resolve_binding(type_name, binding)
            .ok_or_else(|| CodeGenError::UnknownBinding {
                span,
                name: type_name.to_string(),
                binding: binding.to_string(),
            })?
            .clone();
        let callee = self
            .module
            .func(&bound.proc)
            .ok_or_else(|| CodeGenError::UnknownFunction {
                span,
                name: bound.proc.clone(),
            })?;
        match &callee.ret {
            Some(ty) if ty.is_scalar() => {
                let ty = ty.clone();
                Ok(Some(self.types.lower_type(&ty)))
            }
            Some(_) => Err(CodeGenError::AggregateReturn { span }),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "../tests/t_dispatch.rs"]
mod tests;
