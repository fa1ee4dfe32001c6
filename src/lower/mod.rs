//! Type-directed lowering from the TAST to the target IR.
//!
//! Entry point: [`lower_module`]. Lowering is a deterministic, synchronous
//! tree traversal; user-facing failures surface as [`CodeGenError`], and
//! contract violations with the TAST producer panic with a `codegen bug:`
//! marker. The lowered module is verified structurally before it is
//! returned; a verification failure is treated as an internal error, since
//! it means the lowering rules produced invalid output.

pub mod errors;
pub mod types;
pub mod vtable;

mod convert;
mod load;
mod lower_array;
mod lower_call;
mod lower_class;
mod lower_decl;
mod lower_expr;
mod lower_stmt;
mod lower_string;
mod lowerer;
mod mem;

pub use errors::CodeGenError;
pub use load::LoadLevel;

use std::collections::HashMap;

use crate::options::CodegenOptions;
use crate::tast;
use crate::tir::{self, GlobalId, GlobalInit, ModuleBuilder};

use lowerer::FuncLowerer;
use types::TypeLowerer;
use vtable::VtableRegistry;

/// Lowers a fully resolved TAST module into a verified target-IR module.
pub fn lower_module(
    module: &tast::Module,
    options: &CodegenOptions,
) -> Result<tir::Module, CodeGenError> {
    let mut types = TypeLowerer::new();
    types.register_structs(module)?;

    let mut vtables = VtableRegistry::new();
    let mut mb = ModuleBuilder::new();

    // Reserve ids first so forward calls resolve.
    for func in &module.funcs {
        mb.reserve_func(&func.name);
    }

    let mut globals: HashMap<tast::SymbolId, GlobalId> = HashMap::new();
    for sym_id in &module.globals {
        let sym = module.symbols.get(*sym_id);
        let ty = types.lower_type(&sym.ty);
        let id = mb.add_global(sym.name.clone(), ty, GlobalInit::Zero);
        globals.insert(*sym_id, id);
    }

    for func in &module.funcs {
        let func_id = mb
            .lookup_func(&func.name)
            .expect("codegen bug: function id not reserved");
        let lowerer = FuncLowerer::new(
            module,
            options,
            &mut types,
            &mut vtables,
            &mut mb,
            &globals,
            func_id,
            func,
        )?;
        let lowered = lowerer.lower(func)?;
        mb.define_func(lowered);
    }

    let module_ir = mb.finish(&module.name, types.take_cache());

    // Lowering bugs, not user errors, produce invalid IR.
    if let Err(error) = tir::verify_module(&module_ir) {
        panic!("internal compiler error: {}", error);
    }

    Ok(module_ir)
}
