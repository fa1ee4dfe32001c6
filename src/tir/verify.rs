//! Structural self-check for lowered modules.
//!
//! Run after lowering completes; a failure here means the lowering rules
//! produced invalid output and is treated as an internal error by the driver.

use std::collections::HashMap;
use std::fmt;

use crate::tir::ir::*;
use crate::tir::types::{TirTypeCache, TirTypeId, TirTypeKind};

#[derive(Debug, Clone)]
pub struct VerifyError {
    message: String,
}

impl VerifyError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for VerifyError {}

pub fn verify_module(module: &Module) -> Result<(), VerifyError> {
    for func in &module.funcs {
        verify_function(func, module)?;
    }
    Ok(())
}

pub fn verify_function(func: &Function, module: &Module) -> Result<(), VerifyError> {
    let types = &module.types;

    let mut blocks = HashMap::new();
    for block in &func.blocks {
        if blocks.insert(block.id, block).is_some() {
            return Err(err(
                func.name.as_str(),
                None,
                format!("duplicate block {:?}", block.id),
            ));
        }
    }
    if func.blocks.is_empty() {
        return Err(err(func.name.as_str(), None, "function has no blocks"));
    }

    let mut value_types: HashMap<ValueId, TirTypeId> = HashMap::new();
    for block in &func.blocks {
        for param in &block.params {
            if value_types.insert(param.value.id, param.value.ty).is_some() {
                return Err(err(
                    func.name.as_str(),
                    Some(block.id),
                    format!("duplicate value {:?}", param.value.id),
                ));
            }
        }
    }

    for block in &func.blocks {
        for inst in &block.insts {
            if let Some(result) = &inst.result {
                if value_types.insert(result.id, result.ty).is_some() {
                    return Err(err(
                        func.name.as_str(),
                        Some(block.id),
                        format!("duplicate value {:?}", result.id),
                    ));
                }
            }

            let mut use_error = None;
            for_each_inst_use(&inst.kind, |value| {
                if use_error.is_none() && !value_types.contains_key(&value) {
                    use_error = Some(err(
                        func.name.as_str(),
                        Some(block.id),
                        format!("use of undefined value {:?}", value),
                    ));
                }
            });
            if let Some(error) = use_error {
                return Err(error);
            }

            verify_inst(func, block.id, inst, &value_types, types, module)?;
        }

        verify_terminator(func.name.as_str(), block, &blocks, &value_types, types)?;
    }

    Ok(())
}

fn verify_inst(
    func: &Function,
    block_id: BlockId,
    inst: &Instruction,
    value_types: &HashMap<ValueId, TirTypeId>,
    types: &TirTypeCache,
    module: &Module,
) -> Result<(), VerifyError> {
    let func_name = func.name.as_str();
    match &inst.kind {
        InstKind::AddrOfLocal { local } => {
            let result = inst.result.as_ref().ok_or_else(|| {
                err(func_name, Some(block_id), "addr_of_local should define a result")
            })?;
            let local = func.locals.get(local.index()).ok_or_else(|| {
                err(
                    func_name,
                    Some(block_id),
                    format!("addr_of_local references missing local {:?}", local),
                )
            })?;
            let TirTypeKind::Ptr { elem } = types.kind(result.ty) else {
                return Err(err(
                    func_name,
                    Some(block_id),
                    "addr_of_local result is not a pointer",
                ));
            };
            if *elem != local.ty {
                return Err(err(
                    func_name,
                    Some(block_id),
                    "addr_of_local result type does not match local",
                ));
            }
        }
        InstKind::AddrOfGlobal { global } => {
            if module.globals.get(global.index()).is_none() {
                return Err(err(
                    func_name,
                    Some(block_id),
                    format!("addr_of_global references missing global {:?}", global),
                ));
            }
        }
        InstKind::FieldAddr { base, .. }
        | InstKind::IndexAddr { base, .. }
        | InstKind::Load { ptr: base }
        | InstKind::Store { ptr: base, .. }
        | InstKind::MemCopy { dst: base, .. }
        | InstKind::MemSet { dst: base, .. } => {
            require_ptr(func_name, block_id, *base, value_types, types)?;
        }
        InstKind::Call { callee, args } => match callee {
            Callee::Func(func_id) => {
                let target = module.funcs.get(func_id.index()).ok_or_else(|| {
                    err(
                        func_name,
                        Some(block_id),
                        format!("call to missing function {:?}", func_id),
                    )
                })?;
                if args.len() != target.sig.params.len() {
                    return Err(err(
                        func_name,
                        Some(block_id),
                        format!(
                            "call to {} expects {} args, got {}",
                            target.name,
                            target.sig.params.len(),
                            args.len()
                        ),
                    ));
                }
            }
            Callee::Runtime(runtime) => {
                let sig = runtime.sig();
                if args.len() != sig.arg_count as usize {
                    return Err(err(
                        func_name,
                        Some(block_id),
                        format!(
                            "runtime call {} expects {} args, got {}",
                            sig.name,
                            sig.arg_count,
                            args.len()
                        ),
                    ));
                }
            }
            Callee::Value(value) => {
                let _ = value_ty(func_name, block_id, *value, value_types)?;
            }
        },
        InstKind::Const { .. }
        | InstKind::BinOp { .. }
        | InstKind::UnOp { .. }
        | InstKind::Cmp { .. }
        | InstKind::Cast { .. } => {}
    }

    Ok(())
}

fn verify_terminator(
    func_name: &str,
    block: &Block,
    blocks: &HashMap<BlockId, &Block>,
    value_types: &HashMap<ValueId, TirTypeId>,
    types: &TirTypeCache,
) -> Result<(), VerifyError> {
    match &block.term {
        Terminator::Br { target, args } => {
            check_block_args(func_name, block.id, *target, args, blocks, value_types)?;
        }
        Terminator::CondBr {
            cond,
            then_bb,
            then_args,
            else_bb,
            else_args,
        } => {
            require_bool(func_name, block.id, *cond, value_types, types)?;
            check_block_args(func_name, block.id, *then_bb, then_args, blocks, value_types)?;
            check_block_args(func_name, block.id, *else_bb, else_args, blocks, value_types)?;
        }
        Terminator::Return { value } => {
            if let Some(value) = value {
                let _ = value_ty(func_name, block.id, *value, value_types)?;
            }
        }
        Terminator::Unreachable => {}
    }

    Ok(())
}

fn check_block_args(
    func_name: &str,
    from_block: BlockId,
    target: BlockId,
    args: &[ValueId],
    blocks: &HashMap<BlockId, &Block>,
    value_types: &HashMap<ValueId, TirTypeId>,
) -> Result<(), VerifyError> {
    let target_block = blocks.get(&target).ok_or_else(|| {
        err(
            func_name,
            Some(from_block),
            format!("branch to missing block {:?}", target),
        )
    })?;

    if args.len() != target_block.params.len() {
        return Err(err(
            func_name,
            Some(from_block),
            format!(
                "block {:?} expects {} args, got {}",
                target,
                target_block.params.len(),
                args.len()
            ),
        ));
    }

    for (idx, (arg, param)) in args.iter().zip(&target_block.params).enumerate() {
        let arg_ty = value_ty(func_name, from_block, *arg, value_types)?;
        if arg_ty != param.value.ty {
            return Err(err(
                func_name,
                Some(from_block),
                format!("arg {} to block {:?} has wrong type", idx, target),
            ));
        }
    }

    Ok(())
}

fn value_ty(
    func_name: &str,
    block_id: BlockId,
    value: ValueId,
    value_types: &HashMap<ValueId, TirTypeId>,
) -> Result<TirTypeId, VerifyError> {
    value_types.get(&value).copied().ok_or_else(|| {
        err(
            func_name,
            Some(block_id),
            format!("use of undefined value {:?}", value),
        )
    })
}

fn require_ptr(
    func_name: &str,
    block_id: BlockId,
    value: ValueId,
    value_types: &HashMap<ValueId, TirTypeId>,
    types: &TirTypeCache,
) -> Result<(), VerifyError> {
    let ty = value_ty(func_name, block_id, value, value_types)?;
    if !matches!(types.kind(ty), TirTypeKind::Ptr { .. }) {
        return Err(err(
            func_name,
            Some(block_id),
            format!("expected pointer value, got {:?}", types.kind(ty)),
        ));
    }
    Ok(())
}

fn require_bool(
    func_name: &str,
    block_id: BlockId,
    value: ValueId,
    value_types: &HashMap<ValueId, TirTypeId>,
    types: &TirTypeCache,
) -> Result<(), VerifyError> {
    let ty = value_ty(func_name, block_id, value, value_types)?;
    if !matches!(types.kind(ty), TirTypeKind::Bool) {
        return Err(err(
            func_name,
            Some(block_id),
            "conditional branch expects bool",
        ));
    }
    Ok(())
}

fn err(func_name: &str, block_id: Option<BlockId>, message: impl Into<String>) -> VerifyError {
    let message = match block_id {
        Some(block_id) => format!("tir verify: {func_name} {:?}: {}", block_id, message.into()),
        None => format!("tir verify: {func_name}: {}", message.into()),
    };
    VerifyError::new(message)
}

#[cfg(test)]
#[path = "../tests/t_verify.rs"]
mod tests;
