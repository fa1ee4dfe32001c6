use crate::lower::{lower_module, CodeGenError};
use crate::options::CodegenOptions;
use crate::tast::{Dim, Expr, ExprKind, Function, Module, PhysicalType, Stmt, StmtKind, Symbol, Ttype};
use crate::tir::{Callee, ConstValue, Function as TirFunction, InstKind, RuntimeFn};

fn count_runtime_calls(func: &TirFunction, runtime: RuntimeFn) -> usize {
    func.blocks
        .iter()
        .flat_map(|b| b.insts.iter())
        .filter(|inst| {
            matches!(&inst.kind, InstKind::Call { callee: Callee::Runtime(f), .. } if *f == runtime)
        })
        .count()
}

fn float_consts(func: &TirFunction) -> Vec<f64> {
    func.blocks
        .iter()
        .flat_map(|b| b.insts.iter())
        .filter_map(|inst| match &inst.kind {
            InstKind::Const {
                value: value @ ConstValue::Float { .. },
            } => Some(value.as_f64()),
            _ => None,
        })
        .collect()
}

/// `real :: x(3) = [1.0, 2.0, 3.0]; print x(2)`
///
/// Stores the literal vector into a fixed-size local, reads the element
/// back through one bounded index computation, and prints it.
fn scenario_module() -> Module {
    let mut module = Module::new("demo");
    let x_ty = Ttype::Array {
        elem: Box::new(Ttype::real(8)),
        dims: vec![Dim::fixed(1, 3)],
        physical: PhysicalType::FixedSize,
    };
    let init = Expr::new(
        ExprKind::ArrayConstructor {
            elems: vec![Expr::real(1.0, 8), Expr::real(2.0, 8), Expr::real(3.0, 8)],
        },
        x_ty.clone(),
    );
    let x = module
        .symbols
        .add(Symbol::local("x", x_ty.clone()).with_init(init));

    module.funcs.push(Function {
        name: "main".to_string(),
        args: Vec::new(),
        ret: None,
        locals: vec![x],
        body: vec![Stmt::print(vec![Expr::array_item(
            Expr::var(x, x_ty),
            vec![Expr::int(2, 8)],
            Ttype::real(8),
        )])],
        bind_c: false,
    });
    module
}

#[test]
fn test_scenario_fixed_array_print() {
    let module = scenario_module();
    let lowered = lower_module(&module, &CodegenOptions::default()).expect("lower");
    let func = &lowered.funcs[0];

    // Literal vector stored element by element.
    let floats = float_consts(func);
    for expected in [1.0, 2.0, 3.0] {
        assert!(floats.contains(&expected), "missing literal {}", expected);
    }

    // One bounded index computation: offset = 2 - 1.
    let has_sub = func
        .blocks
        .iter()
        .flat_map(|b| b.insts.iter())
        .any(|inst| matches!(inst.kind, InstKind::BinOp { op: crate::tir::BinOp::Sub, .. }));
    assert!(has_sub);

    // Bounds instrumentation present by default.
    assert_eq!(count_runtime_calls(func, RuntimeFn::TrapBounds), 1);

    // The element is printed as a double.
    assert_eq!(count_runtime_calls(func, RuntimeFn::PrintF64), 1);
    assert_eq!(count_runtime_calls(func, RuntimeFn::PrintNewline), 1);
}

#[test]
fn test_scenario_without_bounds_checks() {
    let module = scenario_module();
    let options = CodegenOptions {
        bounds_checks: false,
        ..CodegenOptions::default()
    };
    let lowered = lower_module(&module, &options).expect("lower");
    let func = &lowered.funcs[0];

    assert_eq!(count_runtime_calls(func, RuntimeFn::TrapBounds), 0);
    assert_eq!(count_runtime_calls(func, RuntimeFn::PrintF64), 1);
}

#[test]
fn test_aggregate_return_is_rejected() {
    let mut module = Module::new("m");
    module.funcs.push(Function {
        name: "make".to_string(),
        args: Vec::new(),
        ret: Some(Ttype::fixed_array(Ttype::real(8), &[3])),
        locals: Vec::new(),
        body: Vec::new(),
        bind_c: false,
    });

    let error = lower_module(&module, &CodegenOptions::default()).unwrap_err();
    assert!(matches!(error, CodeGenError::AggregateReturn { .. }));
}

#[test]
fn test_unknown_function_is_rejected() {
    let mut module = Module::new("m");
    module.funcs.push(Function {
        name: "main".to_string(),
        args: Vec::new(),
        ret: None,
        locals: Vec::new(),
        body: vec![Stmt::new(StmtKind::Call {
            name: "missing".to_string(),
            args: Vec::new(),
        })],
        bind_c: false,
    });

    let error = lower_module(&module, &CodegenOptions::default()).unwrap_err();
    assert!(matches!(error, CodeGenError::UnknownFunction { .. }));
}

#[test]
fn test_unsupported_intrinsic_use_is_rejected() {
    let mut module = Module::new("m");
    let n = module.symbols.add(Symbol::local("n", Ttype::int(8)));
    // size() of a scalar is not lowerable.
    module.funcs.push(Function {
        name: "main".to_string(),
        args: Vec::new(),
        ret: None,
        locals: vec![n],
        body: vec![Stmt::assign(
            Expr::var(n, Ttype::int(8)),
            Expr::new(
                ExprKind::IntrinsicCall {
                    intrinsic: crate::tast::Intrinsic::Size,
                    args: vec![Expr::int(1, 8)],
                },
                Ttype::int(8),
            ),
        )],
        bind_c: false,
    });

    let error = lower_module(&module, &CodegenOptions::default()).unwrap_err();
    assert!(matches!(error, CodeGenError::UnsupportedIntrinsic { .. }));
}

/// Globals lower to zero-initialized module-level storage.
#[test]
fn test_globals_lower_to_module_storage() {
    let mut module = Module::new("m");
    let g = module
        .symbols
        .add(Symbol::local("counter", Ttype::int(8)));
    module.globals.push(g);

    let n = module.symbols.add(Symbol::local("n", Ttype::int(8)));
    module.funcs.push(Function {
        name: "main".to_string(),
        args: Vec::new(),
        ret: None,
        locals: vec![n],
        body: vec![Stmt::assign(
            Expr::var(n, Ttype::int(8)),
            Expr::var(g, Ttype::int(8)),
        )],
        bind_c: false,
    });

    let lowered = lower_module(&module, &CodegenOptions::default()).expect("lower");
    assert!(lowered.globals.iter().any(|g| g.name == "counter"));
    let func = &lowered.funcs[0];
    let has_global_addr = func
        .blocks
        .iter()
        .flat_map(|b| b.insts.iter())
        .any(|inst| matches!(inst.kind, InstKind::AddrOfGlobal { .. }));
    assert!(has_global_addr);
}
