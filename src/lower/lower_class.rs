//! `select type` / `class is` lowering and the polymorphic helpers.
//!
//! Dynamic type tests load the selector's class-wrapper hash and compare it
//! against each clause's vtable singleton with `==`, one conditional branch
//! per concrete type. `class is` ORs the comparison over the inheritance
//! closure of the named base. Inside a matching clause body the selector is
//! temporarily rebound to a bitcast view of the concrete payload; the
//! original binding is restored on exit.

use crate::lower::errors::CodeGenError;
use crate::lower::lowerer::{FuncLowerer, SymBinding};
use crate::lower::types::{CLASS_DATA, CLASS_HASH};
use crate::tast::{ClauseKind, Stmt, SymbolId, Ttype, TypeClause};
use crate::tir::{BinOp, CmpOp, Terminator, TirTypeId, ValueId};

impl<'a> FuncLowerer<'a> {
    /// Loads the runtime type hash out of a class wrapper.
    pub(super) fn load_wrapper_hash(&mut self, wrapper_addr: ValueId) -> ValueId {
        let wrapper_ty = self.types.class_wrapper_ty();
        let i64_ty = self.types.int_ty(64);
        let hash_field = self.desc_field_addr(wrapper_addr, wrapper_ty, CLASS_HASH);
        self.fb.load(self.bb, hash_field, i64_ty)
    }

    /// Loads the payload pointer out of a class wrapper and casts it to a
    /// pointer to the named concrete struct.
    pub(super) fn wrapper_payload_as(
        &mut self,
        wrapper_addr: ValueId,
        concrete: &str,
    ) -> (ValueId, TirTypeId) {
        let wrapper_ty = self.types.class_wrapper_ty();
        let byte_ptr = self.types.byte_ptr_ty();
        let data_field = self.desc_field_addr(wrapper_addr, wrapper_ty, CLASS_DATA);
        let raw = self.fb.load(self.bb, data_field, byte_ptr);

        let concrete_tir = self
            .types
            .layout_of(concrete)
            .unwrap_or_else(|| panic!("codegen bug: payload view of unregistered type '{}'", concrete))
            .tir;
        let concrete_ptr = self.types.cache.ptr_to(concrete_tir);
        (self.bitcast(raw, concrete_ptr), concrete_ptr)
    }

    /// Hash of the singleton vtable for `type_name` in the current scope.
    pub(super) fn vtable_hash(&mut self, type_name: &str) -> ValueId {
        let global = self.vtables.get_or_create(
            self.mb,
            self.types,
            type_name,
            &self.func_name,
        );
        let vtable_ty = self.types.vtable_ty();
        let vtable_ptr = self.types.cache.ptr_to(vtable_ty);
        let addr = self.fb.addr_of_global(self.bb, global, vtable_ptr);
        let i64_ty = self.types.int_ty(64);
        let hash_field = self.desc_field_addr(addr, vtable_ty, 0);
        self.fb.load(self.bb, hash_field, i64_ty)
    }

    /// `selector_hash == vtable(type_name).hash`
    fn type_test(&mut self, selector_hash: ValueId, type_name: &str) -> ValueId {
        let bool_ty = self.types.bool_ty();
        let vtable_hash = self.vtable_hash(type_name);
        self.fb
            .cmp(self.bb, CmpOp::Eq, selector_hash, vtable_hash, bool_ty)
    }

    /// OR of the type test over the inheritance closure of `base`.
    fn class_test(&mut self, selector_hash: ValueId, base: &str) -> ValueId {
        let bool_ty = self.types.bool_ty();
        let closure = self.types.concrete_types_extending(base);
        if closure.is_empty() {
            return self.fb.const_bool(self.bb, false, bool_ty);
        }
        let mut cond = self.type_test(selector_hash, &closure[0]);
        for name in &closure[1..] {
            let next = self.type_test(selector_hash, name);
            cond = self.fb.binop(self.bb, BinOp::Or, cond, next, bool_ty);
        }
        cond
    }

    pub(super) fn lower_select_type(
        &mut self,
        selector: SymbolId,
        clauses: &[TypeClause],
    ) -> Result<(), CodeGenError> {
        let sym = self.sym(selector).clone();
        let level = self.place_level(&sym);
        let binding = self.binding(selector);
        let storage = self.types.storage_ty(&sym);
        let slot_ptr_ty = self.types.cache.ptr_to(storage);
        let chain = crate::lower::load::indirection_chain(&sym);
        let (wrapper_addr, _) =
            self.with_load_level(level, |this| this.apply_loads(binding.addr, slot_ptr_ty, chain));

        let selector_hash = self.load_wrapper_hash(wrapper_addr);
        let end_bb = self.fb.add_block();

        for clause in clauses {
            match &clause.kind {
                ClauseKind::TypeIs(name) => {
                    let cond = self.type_test(selector_hash, name);
                    let body_bb = self.fb.add_block();
                    let next_bb = self.fb.add_block();
                    self.terminate(Terminator::CondBr {
                        cond,
                        then_bb: body_bb,
                        then_args: Vec::new(),
                        else_bb: next_bb,
                        else_args: Vec::new(),
                    });

                    self.resume_at(body_bb);
                    let (payload, _) = self.wrapper_payload_as(wrapper_addr, name);
                    let view = Ttype::Struct { name: name.clone() };
                    let view_binding = SymBinding {
                        addr: payload,
                        phys: None,
                    };
                    self.with_selector_view(selector, view, view_binding, |this| {
                        this.lower_body(&clause.body)
                    })?;
                    if self.block_open {
                        self.branch_to(end_bb);
                    }

                    self.resume_at(next_bb);
                }
                ClauseKind::ClassIs(name) => {
                    let cond = self.class_test(selector_hash, name);
                    let body_bb = self.fb.add_block();
                    let next_bb = self.fb.add_block();
                    self.terminate(Terminator::CondBr {
                        cond,
                        then_bb: body_bb,
                        then_args: Vec::new(),
                        else_bb: next_bb,
                        else_args: Vec::new(),
                    });

                    self.resume_at(body_bb);
                    // The clause body sees the selector as the named base;
                    // the payload prefix is the base layout.
                    let (payload, _) = self.wrapper_payload_as(wrapper_addr, name);
                    let view = Ttype::Struct { name: name.clone() };
                    let view_binding = SymBinding {
                        addr: payload,
                        phys: None,
                    };
                    self.with_selector_view(selector, view, view_binding, |this| {
                        this.lower_body(&clause.body)
                    })?;
                    if self.block_open {
                        self.branch_to(end_bb);
                    }

                    self.resume_at(next_bb);
                }
                ClauseKind::ClassDefault => {
                    self.lower_body(&clause.body)?;
                    // Remaining clauses after a default are unreachable by
                    // construction; the TAST producer orders it last.
                }
            }
        }

        if self.block_open {
            self.branch_to(end_bb);
        }
        self.resume_at(end_bb);
        Ok(())
    }

    pub(super) fn lower_body(&mut self, body: &[Stmt]) -> Result<(), CodeGenError> {
        for stmt in body {
            self.lower_stmt(stmt)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/t_class.rs"]
mod tests;
