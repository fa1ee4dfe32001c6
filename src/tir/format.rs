//! Text formatter for the target IR.

use std::fmt::Write as _;

use crate::tir::ir::*;
use crate::tir::types::{TirTypeCache, TirTypeId, TirTypeKind};

pub fn format_func(func: &Function, types: &TirTypeCache) -> String {
    let mut formatter = Formatter::new(types);
    formatter.write_function(func, None);
    formatter.finish()
}

pub fn format_module(module: &Module) -> String {
    let mut formatter = Formatter::new(&module.types);
    let _ = writeln!(&mut formatter.out, "module {} {{", module.name);
    for global in &module.globals {
        formatter.write_global(global);
    }
    if !module.globals.is_empty() {
        let _ = writeln!(&mut formatter.out);
    }
    for (index, func) in module.funcs.iter().enumerate() {
        if index > 0 {
            let _ = writeln!(&mut formatter.out);
        }
        formatter.write_function(func, Some(module));
    }
    let _ = writeln!(&mut formatter.out, "}}");
    formatter.finish()
}

struct Formatter<'a> {
    types: &'a TirTypeCache,
    out: String,
}

impl<'a> Formatter<'a> {
    fn new(types: &'a TirTypeCache) -> Self {
        Self {
            types,
            out: String::new(),
        }
    }

    fn finish(self) -> String {
        self.out
    }

    fn write_global(&mut self, global: &Global) {
        let _ = write!(&mut self.out, "  global @{}: ", global.name);
        self.write_type(global.ty);
        match &global.init {
            GlobalInit::Zero => {
                let _ = writeln!(&mut self.out, " = zeroinit");
            }
            GlobalInit::Int(value) => {
                let _ = writeln!(&mut self.out, " = {}", value);
            }
            GlobalInit::Bytes(bytes) => {
                let _ = writeln!(&mut self.out, " = bytes[{}]", bytes.len());
            }
        }
    }

    fn write_function(&mut self, func: &Function, module: Option<&Module>) {
        let _ = write!(&mut self.out, "  fn {}(", func.name);
        for (i, param) in func.sig.params.iter().enumerate() {
            if i > 0 {
                let _ = write!(&mut self.out, ", ");
            }
            self.write_type(*param);
        }
        let _ = write!(&mut self.out, ") -> ");
        self.write_type(func.sig.ret);
        let _ = writeln!(&mut self.out, " {{");

        if !func.locals.is_empty() {
            let _ = writeln!(&mut self.out, "    locals:");
            for local in &func.locals {
                let _ = write!(&mut self.out, "      %l{}: ", local.id.0);
                self.write_type(local.ty);
                if let Some(name) = &local.name {
                    let _ = write!(&mut self.out, " // {}", name);
                }
                let _ = writeln!(&mut self.out);
            }
        }

        for block in &func.blocks {
            self.write_block(block, module);
        }

        let _ = writeln!(&mut self.out, "  }}");
    }

    fn write_block(&mut self, block: &Block, module: Option<&Module>) {
        let _ = write!(&mut self.out, "    bb{}(", block.id.0);
        for (i, param) in block.params.iter().enumerate() {
            if i > 0 {
                let _ = write!(&mut self.out, ", ");
            }
            let _ = write!(&mut self.out, "%v{}: ", param.value.id.0);
            self.write_type(param.value.ty);
        }
        let _ = writeln!(&mut self.out, "):");

        for inst in &block.insts {
            self.write_instruction(inst, module);
        }
        self.write_terminator(&block.term);
    }

    fn write_instruction(&mut self, inst: &Instruction, module: Option<&Module>) {
        let _ = write!(&mut self.out, "      ");
        if let Some(result) = &inst.result {
            let _ = write!(&mut self.out, "%v{}: ", result.id.0);
            self.write_type(result.ty);
            let _ = write!(&mut self.out, " = ");
        }
        match &inst.kind {
            InstKind::Const { value } => {
                let _ = write!(&mut self.out, "const ");
                self.write_const(value);
            }
            InstKind::BinOp { op, lhs, rhs } => {
                let _ = write!(&mut self.out, "{} %v{}, %v{}", binop_name(*op), lhs.0, rhs.0);
            }
            InstKind::UnOp { op, value } => {
                let name = match op {
                    UnOp::Neg => "neg",
                    UnOp::Not => "not",
                };
                let _ = write!(&mut self.out, "{} %v{}", name, value.0);
            }
            InstKind::Cmp { op, lhs, rhs } => {
                let _ = write!(&mut self.out, "cmp.{} %v{}, %v{}", cmp_name(*op), lhs.0, rhs.0);
            }
            InstKind::Cast { kind, value, .. } => {
                let _ = write!(&mut self.out, "cast.{} %v{}", cast_name(*kind), value.0);
            }
            InstKind::AddrOfLocal { local } => {
                let _ = write!(&mut self.out, "addr_of_local %l{}", local.0);
            }
            InstKind::AddrOfGlobal { global } => match module {
                Some(module) => {
                    let name = &module.globals[global.index()].name;
                    let _ = write!(&mut self.out, "addr_of_global @{}", name);
                }
                None => {
                    let _ = write!(&mut self.out, "addr_of_global @g{}", global.0);
                }
            },
            InstKind::FieldAddr { base, index } => {
                let _ = write!(&mut self.out, "field_addr %v{}, {}", base.0, index);
            }
            InstKind::IndexAddr { base, index } => {
                let _ = write!(&mut self.out, "index_addr %v{}, %v{}", base.0, index.0);
            }
            InstKind::Load { ptr } => {
                let _ = write!(&mut self.out, "load %v{}", ptr.0);
            }
            InstKind::Store { ptr, value } => {
                let _ = write!(&mut self.out, "store %v{} -> %v{}", value.0, ptr.0);
            }
            InstKind::MemCopy { dst, src, len } => {
                let _ = write!(&mut self.out, "memcopy %v{} <- %v{}, %v{}", dst.0, src.0, len.0);
            }
            InstKind::MemSet { dst, byte, len } => {
                let _ = write!(&mut self.out, "memset %v{}, %v{}, %v{}", dst.0, byte.0, len.0);
            }
            InstKind::Call { callee, args } => {
                match callee {
                    Callee::Func(func_id) => match module {
                        Some(module) => {
                            let name = &module.funcs[func_id.index()].name;
                            let _ = write!(&mut self.out, "call {}(", name);
                        }
                        None => {
                            let _ = write!(&mut self.out, "call fn#{}(", func_id.0);
                        }
                    },
                    Callee::Runtime(func) => {
                        let _ = write!(&mut self.out, "call {}(", func.sig().name);
                    }
                    Callee::Value(value) => {
                        let _ = write!(&mut self.out, "call %v{}(", value.0);
                    }
                }
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        let _ = write!(&mut self.out, ", ");
                    }
                    let _ = write!(&mut self.out, "%v{}", arg.0);
                }
                let _ = write!(&mut self.out, ")");
            }
        }
        let _ = writeln!(&mut self.out);
    }

    fn write_terminator(&mut self, term: &Terminator) {
        let _ = write!(&mut self.out, "      ");
        match term {
            Terminator::Br { target, args } => {
                let _ = write!(&mut self.out, "br bb{}", target.0);
                self.write_branch_args(args);
            }
            Terminator::CondBr {
                cond,
                then_bb,
                then_args,
                else_bb,
                else_args,
            } => {
                let _ = write!(&mut self.out, "condbr %v{}, bb{}", cond.0, then_bb.0);
                self.write_branch_args(then_args);
                let _ = write!(&mut self.out, ", bb{}", else_bb.0);
                self.write_branch_args(else_args);
            }
            Terminator::Return { value } => match value {
                Some(value) => {
                    let _ = write!(&mut self.out, "ret %v{}", value.0);
                }
                None => {
                    let _ = write!(&mut self.out, "ret");
                }
            },
            Terminator::Unreachable => {
                let _ = write!(&mut self.out, "unreachable");
            }
        }
        let _ = writeln!(&mut self.out);
    }

    fn write_branch_args(&mut self, args: &[ValueId]) {
        if args.is_empty() {
            return;
        }
        let _ = write!(&mut self.out, "(");
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                let _ = write!(&mut self.out, ", ");
            }
            let _ = write!(&mut self.out, "%v{}", arg.0);
        }
        let _ = write!(&mut self.out, ")");
    }

    fn write_const(&mut self, value: &ConstValue) {
        match value {
            ConstValue::Bool(value) => {
                let _ = write!(&mut self.out, "{}", value);
            }
            ConstValue::Int { value, signed, bits } => {
                let prefix = if *signed { "i" } else { "u" };
                let _ = write!(&mut self.out, "{}:{}{}", value, prefix, bits);
            }
            ConstValue::Float { bits, .. } => {
                let _ = write!(&mut self.out, "{}:f{}", value.as_f64(), bits);
            }
            ConstValue::Null => {
                let _ = write!(&mut self.out, "null");
            }
            ConstValue::GlobalAddr(global) => {
                let _ = write!(&mut self.out, "@g{}", global.0);
            }
            ConstValue::FuncAddr(func) => {
                let _ = write!(&mut self.out, "fn#{}", func.0);
            }
        }
    }

    fn write_type(&mut self, id: TirTypeId) {
        if let Some(name) = &self.types.get(id).name {
            let _ = write!(&mut self.out, "{}", name);
            return;
        }
        match self.types.kind(id) {
            TirTypeKind::Void => {
                let _ = write!(&mut self.out, "()");
            }
            TirTypeKind::Bool => {
                let _ = write!(&mut self.out, "bool");
            }
            TirTypeKind::Int { signed, bits } => {
                let prefix = if *signed { "i" } else { "u" };
                let _ = write!(&mut self.out, "{}{}", prefix, bits);
            }
            TirTypeKind::Float { bits } => {
                let _ = write!(&mut self.out, "f{}", bits);
            }
            TirTypeKind::Ptr { elem } => {
                let elem = *elem;
                let _ = write!(&mut self.out, "ptr<");
                self.write_type(elem);
                let _ = write!(&mut self.out, ">");
            }
            TirTypeKind::Array { elem, dims } => {
                let (elem, dims) = (*elem, dims.clone());
                self.write_type(elem);
                let _ = write!(&mut self.out, "[");
                for (i, dim) in dims.iter().enumerate() {
                    if i > 0 {
                        let _ = write!(&mut self.out, ", ");
                    }
                    let _ = write!(&mut self.out, "{}", dim);
                }
                let _ = write!(&mut self.out, "]");
            }
            TirTypeKind::Vector { elem, lanes } => {
                let (elem, lanes) = (*elem, *lanes);
                let _ = write!(&mut self.out, "vec<");
                self.write_type(elem);
                let _ = write!(&mut self.out, " x {}>", lanes);
            }
            TirTypeKind::Struct { fields } => {
                let fields = fields.clone();
                let _ = write!(&mut self.out, "{{ ");
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        let _ = write!(&mut self.out, ", ");
                    }
                    let _ = write!(&mut self.out, "{}: ", field.name);
                    self.write_type(field.ty);
                }
                let _ = write!(&mut self.out, " }}");
            }
            TirTypeKind::Fn { params, ret } => {
                let (params, ret) = (params.clone(), *ret);
                let _ = write!(&mut self.out, "fn(");
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        let _ = write!(&mut self.out, ", ");
                    }
                    self.write_type(*param);
                }
                let _ = write!(&mut self.out, ") -> ");
                self.write_type(ret);
            }
        }
    }
}

fn binop_name(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "add",
        BinOp::Sub => "sub",
        BinOp::Mul => "mul",
        BinOp::Div => "div",
        BinOp::Mod => "mod",
        BinOp::And => "and",
        BinOp::Or => "or",
        BinOp::Xor => "xor",
        BinOp::Shl => "shl",
        BinOp::Shr => "shr",
    }
}

fn cmp_name(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Eq => "eq",
        CmpOp::Ne => "ne",
        CmpOp::Lt => "lt",
        CmpOp::Le => "le",
        CmpOp::Gt => "gt",
        CmpOp::Ge => "ge",
    }
}

fn cast_name(kind: CastKind) -> &'static str {
    match kind {
        CastKind::IntTrunc => "trunc",
        CastKind::IntExtend { signed: true } => "sext",
        CastKind::IntExtend { signed: false } => "zext",
        CastKind::FpTrunc => "fptrunc",
        CastKind::FpExtend => "fpext",
        CastKind::IntToFp { .. } => "itof",
        CastKind::FpToInt { .. } => "ftoi",
        CastKind::PtrToInt => "ptoi",
        CastKind::IntToPtr => "itop",
        CastKind::Bitcast => "bitcast",
    }
}

#[cfg(test)]
#[path = "../tests/t_format.rs"]
mod tests;
