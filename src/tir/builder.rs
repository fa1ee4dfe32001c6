//! Function and module builders managing ID allocation.

use std::collections::HashMap;

use crate::tir::ir::*;
use crate::tir::runtime::RuntimeFn;
use crate::tir::types::{TirTypeCache, TirTypeId};

/// Constructs one TIR function while managing value/block/local allocation.
#[derive(Debug)]
pub struct FunctionBuilder {
    func: Function,
    next_value: u32,
    next_block: u32,
    next_local: u32,
}

impl FunctionBuilder {
    pub fn new(id: FuncId, name: impl Into<String>, sig: FunctionSig) -> Self {
        Self {
            func: Function {
                id,
                name: name.into(),
                sig,
                locals: Vec::new(),
                blocks: Vec::new(),
            },
            next_value: 0,
            next_block: 0,
            next_local: 0,
        }
    }

    pub fn func(&self) -> &Function {
        &self.func
    }

    pub fn add_block(&mut self) -> BlockId {
        let id = BlockId(self.next_block);
        self.next_block += 1;
        self.func.blocks.push(Block {
            id,
            params: Vec::new(),
            insts: Vec::new(),
            term: Terminator::Unreachable,
        });
        id
    }

    pub fn add_local(&mut self, ty: TirTypeId, name: Option<String>) -> LocalId {
        let id = LocalId(self.next_local);
        self.next_local += 1;
        self.func.locals.push(Local { id, ty, name });
        id
    }

    pub fn add_block_param(&mut self, block: BlockId, ty: TirTypeId) -> ValueId {
        let value = self.alloc_value();
        let block = self.block_mut(block);
        block.params.push(BlockParam {
            value: ValueDef { id: value, ty },
        });
        value
    }

    pub fn set_terminator(&mut self, block: BlockId, term: Terminator) {
        self.block_mut(block).term = term;
    }

    pub fn terminator(&self, block: BlockId) -> &Terminator {
        &self.func.blocks[block.index()].term
    }

    pub fn finish(self) -> Function {
        self.func
    }

    // --- Instruction emitters ---

    pub fn const_value(&mut self, block: BlockId, value: ConstValue, ty: TirTypeId) -> ValueId {
        self.push_inst(block, InstKind::Const { value }, Some(ty))
            .unwrap()
    }

    pub fn const_int(&mut self, block: BlockId, value: i128, signed: bool, bits: u8, ty: TirTypeId) -> ValueId {
        self.const_value(
            block,
            ConstValue::Int {
                value,
                signed,
                bits,
            },
            ty,
        )
    }

    pub fn const_float(&mut self, block: BlockId, value: f64, bits: u8, ty: TirTypeId) -> ValueId {
        self.const_value(block, ConstValue::float(value, bits), ty)
    }

    pub fn const_bool(&mut self, block: BlockId, value: bool, ty: TirTypeId) -> ValueId {
        self.const_value(block, ConstValue::Bool(value), ty)
    }

    pub fn const_null(&mut self, block: BlockId, ty: TirTypeId) -> ValueId {
        self.const_value(block, ConstValue::Null, ty)
    }

    pub fn binop(&mut self, block: BlockId, op: BinOp, lhs: ValueId, rhs: ValueId, ty: TirTypeId) -> ValueId {
        self.push_inst(block, InstKind::BinOp { op, lhs, rhs }, Some(ty))
            .unwrap()
    }

    pub fn unop(&mut self, block: BlockId, op: UnOp, value: ValueId, ty: TirTypeId) -> ValueId {
        self.push_inst(block, InstKind::UnOp { op, value }, Some(ty))
            .unwrap()
    }

    pub fn cmp(&mut self, block: BlockId, op: CmpOp, lhs: ValueId, rhs: ValueId, ty: TirTypeId) -> ValueId {
        self.push_inst(block, InstKind::Cmp { op, lhs, rhs }, Some(ty))
            .unwrap()
    }

    pub fn cast(&mut self, block: BlockId, kind: CastKind, value: ValueId, ty: TirTypeId) -> ValueId {
        self.push_inst(block, InstKind::Cast { kind, value, ty }, Some(ty))
            .unwrap()
    }

    pub fn addr_of_local(&mut self, block: BlockId, local: LocalId, ptr_ty: TirTypeId) -> ValueId {
        self.push_inst(block, InstKind::AddrOfLocal { local }, Some(ptr_ty))
            .unwrap()
    }

    pub fn addr_of_global(&mut self, block: BlockId, global: GlobalId, ptr_ty: TirTypeId) -> ValueId {
        self.push_inst(block, InstKind::AddrOfGlobal { global }, Some(ptr_ty))
            .unwrap()
    }

    pub fn field_addr(&mut self, block: BlockId, base: ValueId, index: usize, ptr_ty: TirTypeId) -> ValueId {
        self.push_inst(block, InstKind::FieldAddr { base, index }, Some(ptr_ty))
            .unwrap()
    }

    pub fn index_addr(&mut self, block: BlockId, base: ValueId, index: ValueId, ptr_ty: TirTypeId) -> ValueId {
        self.push_inst(block, InstKind::IndexAddr { base, index }, Some(ptr_ty))
            .unwrap()
    }

    pub fn load(&mut self, block: BlockId, ptr: ValueId, ty: TirTypeId) -> ValueId {
        self.push_inst(block, InstKind::Load { ptr }, Some(ty)).unwrap()
    }

    pub fn store(&mut self, block: BlockId, ptr: ValueId, value: ValueId) {
        self.push_inst(block, InstKind::Store { ptr, value }, None);
    }

    pub fn memcopy(&mut self, block: BlockId, dst: ValueId, src: ValueId, len: ValueId) {
        self.push_inst(block, InstKind::MemCopy { dst, src, len }, None);
    }

    pub fn memset(&mut self, block: BlockId, dst: ValueId, byte: ValueId, len: ValueId) {
        self.push_inst(block, InstKind::MemSet { dst, byte, len }, None);
    }

    pub fn call(
        &mut self,
        block: BlockId,
        callee: Callee,
        args: Vec<ValueId>,
        ret_ty: Option<TirTypeId>,
    ) -> Option<ValueId> {
        self.push_inst(block, InstKind::Call { callee, args }, ret_ty)
    }

    pub fn call_runtime(
        &mut self,
        block: BlockId,
        func: RuntimeFn,
        args: Vec<ValueId>,
        ret_ty: Option<TirTypeId>,
    ) -> Option<ValueId> {
        let sig = func.sig();
        if args.len() != sig.arg_count as usize {
            panic!(
                "codegen bug: runtime call {} expects {} args, got {}",
                sig.name,
                sig.arg_count,
                args.len()
            );
        }
        self.call(block, Callee::Runtime(func), args, ret_ty)
    }

    fn push_inst(
        &mut self,
        block: BlockId,
        kind: InstKind,
        result_ty: Option<TirTypeId>,
    ) -> Option<ValueId> {
        let result = result_ty.map(|ty| ValueDef {
            id: self.alloc_value(),
            ty,
        });
        let id = result.as_ref().map(|def| def.id);
        self.block_mut(block).insts.push(Instruction { result, kind });
        id
    }

    fn alloc_value(&mut self) -> ValueId {
        let id = ValueId(self.next_value);
        self.next_value += 1;
        id
    }

    fn block_mut(&mut self, block: BlockId) -> &mut Block {
        let index = block.index();
        self.func
            .blocks
            .get_mut(index)
            .unwrap_or_else(|| panic!("codegen bug: invalid block id {:?}", block))
    }
}

/// Accumulates globals and finished functions for one target module.
#[derive(Debug, Default)]
pub struct ModuleBuilder {
    globals: Vec<Global>,
    funcs: Vec<Option<Function>>,
    func_names: HashMap<String, FuncId>,
    global_names: HashMap<String, GlobalId>,
}

impl ModuleBuilder {
    pub fn new() -> Self {
        Self {
            globals: Vec::new(),
            funcs: Vec::new(),
            func_names: HashMap::new(),
            global_names: HashMap::new(),
        }
    }

    /// Reserves a function id ahead of lowering so calls can reference
    /// functions that are lowered later.
    pub fn reserve_func(&mut self, name: impl Into<String>) -> FuncId {
        let id = FuncId(self.funcs.len() as u32);
        self.funcs.push(None);
        self.func_names.insert(name.into(), id);
        id
    }

    pub fn lookup_func(&self, name: &str) -> Option<FuncId> {
        self.func_names.get(name).copied()
    }

    pub fn define_func(&mut self, func: Function) {
        let index = func.id.index();
        if self.funcs[index].is_some() {
            panic!("codegen bug: function {:?} defined twice", func.id);
        }
        self.funcs[index] = Some(func);
    }

    pub fn add_global(&mut self, name: impl Into<String>, ty: TirTypeId, init: GlobalInit) -> GlobalId {
        let name = name.into();
        let id = GlobalId(self.globals.len() as u32);
        self.global_names.insert(name.clone(), id);
        self.globals.push(Global { id, name, ty, init });
        id
    }

    pub fn lookup_global(&self, name: &str) -> Option<GlobalId> {
        self.global_names.get(name).copied()
    }

    pub fn global_count(&self) -> usize {
        self.globals.len()
    }

    pub fn global(&self, id: GlobalId) -> &Global {
        &self.globals[id.index()]
    }

    pub fn finish(self, name: impl Into<String>, types: TirTypeCache) -> Module {
        let funcs = self
            .funcs
            .into_iter()
            .enumerate()
            .map(|(index, func)| {
                func.unwrap_or_else(|| panic!("codegen bug: function #{} never defined", index))
            })
            .collect();
        Module {
            name: name.into(),
            funcs,
            globals: self.globals,
            types,
        }
    }
}

#[cfg(test)]
#[path = "../tests/t_tir_builder.rs"]
mod tests;
