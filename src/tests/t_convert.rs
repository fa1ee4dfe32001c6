use crate::lower::lower_module;
use crate::options::CodegenOptions;
use crate::tast::{Dim, Expr, ExprKind, Function, Module, PhysicalType, Stmt, Symbol, Ttype};
use crate::tir::{Function as TirFunction, InstKind, TirTypeCache, TirTypeKind};

fn real_array(dims: Vec<Dim>, physical: PhysicalType) -> Ttype {
    Ttype::Array {
        elem: Box::new(Ttype::real(4)),
        dims,
        physical,
    }
}

fn one_func_module(locals: Vec<crate::tast::SymbolId>, body: Vec<Stmt>, mut module: Module) -> Module {
    module.funcs.push(Function {
        name: "f".to_string(),
        args: Vec::new(),
        ret: None,
        locals,
        body,
        bind_c: false,
    });
    module
}

fn count_insts(func: &TirFunction, pred: impl Fn(&InstKind) -> bool) -> usize {
    func.blocks
        .iter()
        .flat_map(|b| b.insts.iter())
        .filter(|inst| pred(&inst.kind))
        .count()
}

/// Assigning a fixed-size array into a descriptor target re-describes the
/// shape from the static type and deep-copies the data; the fixed source
/// buffer itself is never stored through.
#[test]
fn test_fixed_into_descriptor_assignment() {
    let mut module = Module::new("m");
    let fixed_ty = real_array(vec![Dim::fixed(1, 3)], PhysicalType::FixedSize);
    let desc_ty = real_array(vec![Dim::fixed(1, 3)], PhysicalType::Descriptor);
    let b = module.symbols.add(Symbol::local("b", fixed_ty.clone()));
    let a = module.symbols.add(Symbol::local("a", desc_ty.clone()));
    let module = one_func_module(
        vec![b, a],
        vec![Stmt::assign(Expr::var(a, desc_ty), Expr::var(b, fixed_ty))],
        module,
    );

    let lowered = lower_module(&module, &CodegenOptions::default()).expect("lower");
    let func = &lowered.funcs[0];

    // One deep copy of the element data.
    assert_eq!(
        count_insts(func, |k| matches!(k, InstKind::MemCopy { .. })),
        1
    );
}

/// Descriptor-to-descriptor assignment copies the dimension records and the
/// element data separately.
#[test]
fn test_descriptor_into_descriptor_assignment() {
    let mut module = Module::new("m");
    let desc_ty = real_array(vec![Dim::fixed(1, 3)], PhysicalType::Descriptor);
    let a = module.symbols.add(Symbol::local("a", desc_ty.clone()));
    let c = module.symbols.add(Symbol::local("c", desc_ty.clone()));
    let module = one_func_module(
        vec![a, c],
        vec![Stmt::assign(
            Expr::var(c, desc_ty.clone()),
            Expr::var(a, desc_ty),
        )],
        module,
    );

    let lowered = lower_module(&module, &CodegenOptions::default()).expect("lower");
    let func = &lowered.funcs[0];

    assert_eq!(
        count_insts(func, |k| matches!(k, InstKind::MemCopy { .. })),
        2
    );
}

fn vector_load_count(func: &TirFunction, types: &TirTypeCache) -> usize {
    func.blocks
        .iter()
        .flat_map(|b| b.insts.iter())
        .filter(|inst| {
            matches!(inst.kind, InstKind::Load { .. })
                && inst
                    .result
                    .as_ref()
                    .is_some_and(|r| matches!(types.kind(r.ty), TirTypeKind::Vector { .. }))
        })
        .count()
}

/// Fixed-size to SIMD conversion reinterprets the storage and moves the
/// value through a hardware vector load/store pair.
#[test]
fn test_fixed_to_simd_assignment() {
    let mut module = Module::new("m");
    let fixed_ty = real_array(vec![Dim::fixed(1, 4)], PhysicalType::FixedSize);
    let simd_ty = real_array(vec![Dim::fixed(1, 4)], PhysicalType::Simd);
    let b = module.symbols.add(Symbol::local("b", fixed_ty.clone()));
    let s = module.symbols.add(Symbol::local("s", simd_ty.clone()));
    let module = one_func_module(
        vec![b, s],
        vec![Stmt::assign(Expr::var(s, simd_ty), Expr::var(b, fixed_ty))],
        module,
    );

    let lowered = lower_module(&module, &CodegenOptions::default()).expect("lower");
    let func = &lowered.funcs[0];

    assert_eq!(vector_load_count(func, &lowered.types), 1);
    assert!(count_insts(func, |k| matches!(
        k,
        InstKind::Cast {
            kind: crate::tir::CastKind::Bitcast,
            ..
        }
    )) >= 1);
}

/// SIMD never converts to a descriptor; such a request is a contract
/// violation with the TAST producer.
#[test]
#[should_panic(expected = "illegal physical conversion")]
fn test_simd_to_descriptor_is_a_bug() {
    let mut module = Module::new("m");
    let simd_ty = real_array(vec![Dim::fixed(1, 4)], PhysicalType::Simd);
    let desc_ty = real_array(vec![Dim::fixed(1, 4)], PhysicalType::Descriptor);
    let s = module.symbols.add(Symbol::local("s", simd_ty.clone()));
    let a = module.symbols.add(Symbol::local("a", desc_ty.clone()));

    // Force the illegal direction by assigning a descriptor into SIMD
    // storage from a descriptor-shaped source.
    let module = one_func_module(
        vec![s, a],
        vec![Stmt::assign(Expr::var(s, simd_ty), Expr::var(a, desc_ty))],
        module,
    );
    let _ = lower_module(&module, &CodegenOptions::default());
}

/// Array constructors materialize as fixed-size temporaries; storing one
/// into a descriptor array passes through the legal fixed -> descriptor
/// transition.
#[test]
fn test_constructor_into_descriptor() {
    let mut module = Module::new("m");
    let desc_ty = real_array(vec![Dim::fixed(1, 2)], PhysicalType::Descriptor);
    let ctor_ty = real_array(vec![Dim::fixed(1, 2)], PhysicalType::FixedSize);
    let a = module.symbols.add(Symbol::local("a", desc_ty.clone()));
    let ctor = Expr::new(
        ExprKind::ArrayConstructor {
            elems: vec![Expr::real(1.5, 4), Expr::real(2.5, 4)],
        },
        ctor_ty,
    );
    let module = one_func_module(
        vec![a],
        vec![Stmt::assign(Expr::var(a, desc_ty), ctor)],
        module,
    );

    let lowered = lower_module(&module, &CodegenOptions::default()).expect("lower");
    let func = &lowered.funcs[0];
    // Two element stores into the temporary, one block copy into the target.
    assert_eq!(
        count_insts(func, |k| matches!(k, InstKind::MemCopy { .. })),
        1
    );
}
