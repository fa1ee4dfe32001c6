use crate::lower::lower_module;
use crate::options::CodegenOptions;
use crate::tast::{
    Binding, Expr, ExprKind, Field, Function, Intent, Module, Stmt, StmtKind, StructDef, Symbol,
    Ttype,
};
use crate::tir::{Callee, Function as TirFunction, InstKind, Module as TirModule, Terminator};

/// animal declares `speak` (pass) and `ping` (nopass); dog overrides
/// `speak`; cat inherits both.
fn clinic_module() -> Module {
    let mut module = Module::new("clinic");

    let struct_with = |name: &str, parent: Option<&str>, field: &str, bindings: Vec<Binding>| {
        StructDef {
            name: name.to_string(),
            parent: parent.map(|p| p.to_string()),
            fields: vec![Field {
                name: field.to_string(),
                ty: Ttype::int(8),
            }],
            bindings,
            bind_c: false,
        }
    };

    module.structs.push(struct_with(
        "animal",
        None,
        "age",
        vec![
            Binding {
                name: "speak".to_string(),
                proc: "animal_speak".to_string(),
                nopass: false,
                deferred: false,
            },
            Binding {
                name: "ping".to_string(),
                proc: "ping_fn".to_string(),
                nopass: true,
                deferred: false,
            },
        ],
    ));
    module.structs.push(struct_with("cat", Some("animal"), "lives", Vec::new()));
    module.structs.push(struct_with(
        "dog",
        Some("animal"),
        "tail",
        vec![Binding {
            name: "speak".to_string(),
            proc: "dog_speak".to_string(),
            nopass: false,
            deferred: false,
        }],
    ));

    // Procedures backing the bindings.
    let animal_self = module.symbols.add(Symbol::arg(
        "self",
        Ttype::Struct {
            name: "animal".to_string(),
        },
        Intent::In,
    ));
    module.funcs.push(Function {
        name: "animal_speak".to_string(),
        args: vec![animal_self],
        ret: Some(Ttype::int(8)),
        locals: Vec::new(),
        body: vec![Stmt::ret(Some(Expr::int(1, 8)))],
        bind_c: false,
    });

    let dog_self = module.symbols.add(Symbol::arg(
        "self",
        Ttype::Struct {
            name: "dog".to_string(),
        },
        Intent::In,
    ));
    module.funcs.push(Function {
        name: "dog_speak".to_string(),
        args: vec![dog_self],
        ret: Some(Ttype::int(8)),
        locals: Vec::new(),
        body: vec![Stmt::ret(Some(Expr::int(2, 8)))],
        bind_c: false,
    });

    module.funcs.push(Function {
        name: "ping_fn".to_string(),
        args: Vec::new(),
        ret: None,
        locals: Vec::new(),
        body: vec![Stmt::ret(None)],
        bind_c: false,
    });

    module
}

fn find_func<'m>(module: &'m TirModule, name: &str) -> &'m TirFunction {
    module
        .funcs
        .iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("function {} not lowered", name))
}

fn calls_to<'m>(module: &'m TirModule, callee: &str) -> Vec<&'m [crate::tir::ValueId]> {
    let caller = find_func(module, "main");
    caller
        .blocks
        .iter()
        .flat_map(|b| b.insts.iter())
        .filter_map(|inst| match &inst.kind {
            InstKind::Call {
                callee: Callee::Func(id),
                args,
            } if module.funcs[id.index()].name == callee => Some(args.as_slice()),
            _ => None,
        })
        .collect()
}

fn count_condbr(func: &TirFunction) -> usize {
    func.blocks
        .iter()
        .filter(|b| matches!(b.term, Terminator::CondBr { .. }))
        .count()
}

/// Dynamic dispatch branches per concrete type: dog's override is called in
/// the dog branch, the inherited procedure everywhere else.
#[test]
fn test_dynamic_dispatch_branches_per_type() {
    let mut module = clinic_module();
    let c_ty = Ttype::Class {
        name: "animal".to_string(),
    };
    let c = module.symbols.add(Symbol::local("c", c_ty.clone()));
    let n = module.symbols.add(Symbol::local("n", Ttype::int(8)));

    module.funcs.push(Function {
        name: "main".to_string(),
        args: Vec::new(),
        ret: None,
        locals: vec![c, n],
        body: vec![Stmt::assign(
            Expr::var(n, Ttype::int(8)),
            Expr::new(
                ExprKind::MethodCall {
                    target: Box::new(Expr::var(c, c_ty)),
                    binding: "speak".to_string(),
                    args: Vec::new(),
                },
                Ttype::int(8),
            ),
        )],
        bind_c: false,
    });

    let lowered = lower_module(&module, &CodegenOptions::default()).expect("lower");
    let main = find_func(&lowered, "main");

    // One hash comparison per candidate type: animal, cat, dog.
    assert_eq!(count_condbr(main), 3);
    let vtable_count = lowered
        .globals
        .iter()
        .filter(|g| g.name.starts_with("vtable_main_"))
        .count();
    assert_eq!(vtable_count, 3);

    // dog branch calls the override; animal and cat call the base proc.
    assert_eq!(calls_to(&lowered, "dog_speak").len(), 1);
    assert_eq!(calls_to(&lowered, "animal_speak").len(), 2);

    // The receiver payload is passed as the single argument.
    for args in calls_to(&lowered, "dog_speak") {
        assert_eq!(args.len(), 1);
    }
}

/// `nopass` bindings never receive the receiver, even through dynamic
/// dispatch.
#[test]
fn test_nopass_drops_receiver() {
    let mut module = clinic_module();
    let c_ty = Ttype::Class {
        name: "animal".to_string(),
    };
    let c = module.symbols.add(Symbol::local("c", c_ty.clone()));

    module.funcs.push(Function {
        name: "main".to_string(),
        args: Vec::new(),
        ret: None,
        locals: vec![c],
        body: vec![Stmt::new(StmtKind::ExprStmt {
            expr: Expr::new(
                ExprKind::MethodCall {
                    target: Box::new(Expr::var(c, c_ty)),
                    binding: "ping".to_string(),
                    args: Vec::new(),
                },
                Ttype::int(8),
            ),
        })],
        bind_c: false,
    });

    let lowered = lower_module(&module, &CodegenOptions::default()).expect("lower");

    let calls = calls_to(&lowered, "ping_fn");
    // All three branches dispatch to the same nopass procedure.
    assert_eq!(calls.len(), 3);
    for args in calls {
        assert!(args.is_empty());
    }
}

/// Calls through a concrete (non-polymorphic) receiver dispatch statically:
/// no hash chain, one direct call.
#[test]
fn test_static_dispatch_is_direct() {
    let mut module = clinic_module();
    let d_ty = Ttype::Struct {
        name: "dog".to_string(),
    };
    let d = module.symbols.add(Symbol::local("d", d_ty.clone()));
    let n = module.symbols.add(Symbol::local("n", Ttype::int(8)));

    module.funcs.push(Function {
        name: "main".to_string(),
        args: Vec::new(),
        ret: None,
        locals: vec![d, n],
        body: vec![Stmt::assign(
            Expr::var(n, Ttype::int(8)),
            Expr::new(
                ExprKind::MethodCall {
                    target: Box::new(Expr::var(d, d_ty)),
                    binding: "speak".to_string(),
                    args: Vec::new(),
                },
                Ttype::int(8),
            ),
        )],
        bind_c: false,
    });

    let lowered = lower_module(&module, &CodegenOptions::default()).expect("lower");
    let main = find_func(&lowered, "main");

    assert_eq!(count_condbr(main), 0);
    assert_eq!(calls_to(&lowered, "dog_speak").len(), 1);
    assert_eq!(calls_to(&lowered, "animal_speak").len(), 0);
}
