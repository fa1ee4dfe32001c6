use std::collections::HashMap;

use crate::lower::lower_module;
use crate::options::CodegenOptions;
use crate::tast::{
    Dim, Expr, ExprKind, Function, Intrinsic, Module, PhysicalType, SectionRange, Stmt, StmtKind,
    Storage, Symbol, Ttype,
};
use crate::tir::{BinOp, ConstValue, Function as TirFunction, InstKind, ValueId};

fn desc_array(dims: Vec<Dim>) -> Ttype {
    Ttype::Array {
        elem: Box::new(Ttype::real(8)),
        dims,
        physical: PhysicalType::Descriptor,
    }
}

/// Integer constants stored to memory, in emission order.
fn stored_int_consts(func: &TirFunction) -> Vec<i128> {
    let mut consts: HashMap<ValueId, i128> = HashMap::new();
    let mut stored = Vec::new();
    for block in &func.blocks {
        for inst in &block.insts {
            match &inst.kind {
                InstKind::Const {
                    value: ConstValue::Int { value, .. },
                } => {
                    consts.insert(inst.result.as_ref().unwrap().id, *value);
                }
                InstKind::Store { value, .. } => {
                    if let Some(v) = consts.get(value) {
                        stored.push(*v);
                    }
                }
                _ => {}
            }
        }
    }
    stored
}

fn int_consts(func: &TirFunction) -> Vec<i128> {
    func.blocks
        .iter()
        .flat_map(|b| b.insts.iter())
        .filter_map(|inst| match &inst.kind {
            InstKind::Const {
                value: ConstValue::Int { value, .. },
            } => Some(*value),
            _ => None,
        })
        .collect()
}

fn count_binops(func: &TirFunction, op: BinOp) -> usize {
    func.blocks
        .iter()
        .flat_map(|b| b.insts.iter())
        .filter(|inst| matches!(inst.kind, InstKind::BinOp { op: o, .. } if o == op))
        .count()
}

/// Freshly filled descriptor for dims [(1,3),(1,4)]:
/// size = 12, strides = [1, 3], bounds stored verbatim.
#[test]
fn test_fill_dimensions_invariants() {
    let mut module = Module::new("m");
    let x = module.symbols.add(Symbol::local(
        "x",
        desc_array(vec![Dim::fixed(1, 3), Dim::fixed(1, 4)]),
    ));
    module.funcs.push(Function {
        name: "f".to_string(),
        args: Vec::new(),
        ret: None,
        locals: vec![x],
        body: Vec::new(),
        bind_c: false,
    });

    let lowered = lower_module(&module, &CodegenOptions::default()).expect("lower");
    let func = &lowered.funcs[0];

    // offset, then (lower, size, stride) per dimension.
    let stored = stored_int_consts(func);
    assert_eq!(stored, vec![0, 1, 3, 1, 1, 4, 3]);

    // The computed total element count folds to 12.
    assert!(int_consts(func).contains(&12));
}

#[test]
fn test_size_intrinsic_reads_descriptor() {
    let mut module = Module::new("m");
    let x_ty = desc_array(vec![Dim::deferred(), Dim::deferred()]);
    let x = module
        .symbols
        .add(Symbol::local("x", x_ty.clone()).with_storage(Storage::Allocatable));
    let n = module.symbols.add(Symbol::local("n", Ttype::int(8)));
    module.funcs.push(Function {
        name: "f".to_string(),
        args: Vec::new(),
        ret: None,
        locals: vec![x, n],
        body: vec![Stmt::assign(
            Expr::var(n, Ttype::int(8)),
            Expr::new(
                ExprKind::IntrinsicCall {
                    intrinsic: Intrinsic::Size,
                    args: vec![Expr::var(x, x_ty)],
                },
                Ttype::int(8),
            ),
        )],
        bind_c: false,
    });

    let lowered = lower_module(&module, &CodegenOptions::default()).expect("lower");
    let func = &lowered.funcs[0];

    // Rank-2 total size: one multiply per dimension.
    assert!(count_binops(func, BinOp::Mul) >= 2);
}

/// Section association `p => x(1:5:2)` builds a new descriptor whose stride
/// scales by the step and whose extent divides by it.
#[test]
fn test_section_descriptor_association() {
    let mut module = Module::new("m");
    let x = module
        .symbols
        .add(Symbol::local("x", desc_array(vec![Dim::fixed(1, 10)])));
    let p_ty = desc_array(vec![Dim::deferred()]);
    let p = module
        .symbols
        .add(Symbol::local("p", p_ty.clone()).with_storage(Storage::Pointer));

    let section = Expr::new(
        ExprKind::ArraySection {
            target: Box::new(Expr::var(x, desc_array(vec![Dim::fixed(1, 10)]))),
            ranges: vec![SectionRange {
                start: Some(Box::new(Expr::int(1, 8))),
                end: Some(Box::new(Expr::int(5, 8))),
                step: Some(Box::new(Expr::int(2, 8))),
            }],
        },
        p_ty.clone(),
    );

    module.funcs.push(Function {
        name: "f".to_string(),
        args: Vec::new(),
        ret: None,
        locals: vec![x, p],
        body: vec![Stmt::new(StmtKind::PointerAssociate {
            target: Expr::var(p, p_ty),
            source: section,
        })],
        bind_c: false,
    });

    let lowered = lower_module(&module, &CodegenOptions::default()).expect("lower");
    let func = &lowered.funcs[0];

    // (end - start) / step for the new extent.
    assert!(count_binops(func, BinOp::Div) >= 1);
    // offset advance and stride scaling both multiply by parent stride/step.
    assert!(count_binops(func, BinOp::Mul) >= 2);
    // section constants present
    let consts = int_consts(func);
    for expected in [1, 5, 2] {
        assert!(consts.contains(&expected), "missing const {}", expected);
    }
}

/// Element access through a descriptor applies offset + per-dim stride and
/// re-checks bounds at runtime.
#[test]
fn test_descriptor_element_access() {
    let mut module = Module::new("m");
    let x_ty = desc_array(vec![Dim::fixed(1, 8)]);
    let x = module.symbols.add(Symbol::local("x", x_ty.clone()));
    let v = module.symbols.add(Symbol::local("v", Ttype::real(8)));
    module.funcs.push(Function {
        name: "f".to_string(),
        args: Vec::new(),
        ret: None,
        locals: vec![x, v],
        body: vec![Stmt::assign(
            Expr::var(v, Ttype::real(8)),
            Expr::array_item(Expr::var(x, x_ty), vec![Expr::int(3, 8)], Ttype::real(8)),
        )],
        bind_c: false,
    });

    let with_checks = lower_module(&module, &CodegenOptions::default()).expect("lower");
    let without_checks = lower_module(
        &module,
        &CodegenOptions {
            bounds_checks: false,
            ..CodegenOptions::default()
        },
    )
    .expect("lower");

    let count_traps = |func: &TirFunction| {
        func.blocks
            .iter()
            .flat_map(|b| b.insts.iter())
            .filter(|inst| {
                matches!(
                    &inst.kind,
                    InstKind::Call {
                        callee: crate::tir::Callee::Runtime(crate::tir::RuntimeFn::TrapBounds),
                        ..
                    }
                )
            })
            .count()
    };
    assert_eq!(count_traps(&with_checks.funcs[0]), 1);
    assert_eq!(count_traps(&without_checks.funcs[0]), 0);
}
