use crate::lower::lower_module;
use crate::options::CodegenOptions;
use crate::tast::{
    ClauseKind, Expr, Field, Function, Module, Stmt, StmtKind, StructDef, Symbol, Ttype, TypeClause,
};
use crate::tir::{BinOp, Function as TirFunction, GlobalInit, InstKind, Module as TirModule};

fn animal_module() -> Module {
    let mut module = Module::new("zoo");
    let defs = [
        ("animal", None, vec![("age", Ttype::int(8))]),
        ("cat", Some("animal"), vec![("lives", Ttype::int(8))]),
        ("dog", Some("animal"), vec![("tail", Ttype::int(8))]),
    ];
    for (name, parent, fields) in defs {
        module.structs.push(StructDef {
            name: name.to_string(),
            parent: parent.map(|p: &str| p.to_string()),
            fields: fields
                .into_iter()
                .map(|(n, ty)| Field {
                    name: n.to_string(),
                    ty,
                })
                .collect(),
            bindings: Vec::new(),
            bind_c: false,
        });
    }
    module
}

fn select_stmt(selector: crate::tast::SymbolId, clauses: Vec<TypeClause>) -> Stmt {
    Stmt::new(StmtKind::SelectType { selector, clauses })
}

fn count_condbr(func: &TirFunction) -> usize {
    func.blocks
        .iter()
        .filter(|b| matches!(b.term, crate::tir::Terminator::CondBr { .. }))
        .count()
}

fn count_insts(func: &TirFunction, pred: impl Fn(&InstKind) -> bool) -> usize {
    func.blocks
        .iter()
        .flat_map(|b| b.insts.iter())
        .filter(|inst| pred(&inst.kind))
        .count()
}

fn vtable_global(module: &TirModule, name: &str) -> Option<i128> {
    module.globals.iter().find(|g| g.name == name).map(|g| {
        match &g.init {
            GlobalInit::Int(value) => *value,
            other => panic!("unexpected vtable init {:?}", other),
        }
    })
}

fn clause(kind: ClauseKind, body: Vec<Stmt>) -> TypeClause {
    TypeClause { kind, body }
}

/// `type is` clauses compare the selector hash against one vtable singleton
/// each; the matching clause body sees the selector as the concrete type.
#[test]
fn test_select_type_emits_hash_chain() {
    let mut module = animal_module();
    let c_ty = Ttype::Class {
        name: "animal".to_string(),
    };
    let c = module.symbols.add(Symbol::local("c", c_ty));

    let clauses = vec![
        clause(
            ClauseKind::TypeIs("cat".to_string()),
            // Inherited field through the rebound concrete view.
            vec![Stmt::assign(
                Expr::field(
                    Expr::var(c, Ttype::Struct { name: "cat".to_string() }),
                    "age",
                    Ttype::int(8),
                ),
                Expr::int(1, 8),
            )],
        ),
        clause(
            ClauseKind::TypeIs("dog".to_string()),
            vec![Stmt::assign(
                Expr::field(
                    Expr::var(c, Ttype::Struct { name: "dog".to_string() }),
                    "tail",
                    Ttype::int(8),
                ),
                Expr::int(2, 8),
            )],
        ),
        clause(ClauseKind::ClassDefault, Vec::new()),
    ];

    module.funcs.push(Function {
        name: "main".to_string(),
        args: Vec::new(),
        ret: None,
        locals: vec![c],
        body: vec![select_stmt(c, clauses)],
        bind_c: false,
    });

    let lowered = lower_module(&module, &CodegenOptions::default()).expect("lower");
    let func = &lowered.funcs[0];

    // One singleton per (type, scope), carrying the registration-order hash.
    assert_eq!(vtable_global(&lowered, "vtable_main_cat"), Some(2));
    assert_eq!(vtable_global(&lowered, "vtable_main_dog"), Some(3));
    assert!(vtable_global(&lowered, "vtable_main_animal").is_none());

    // One conditional branch per tested clause.
    assert_eq!(count_condbr(func), 2);
}

/// Vtable globals are singletons per (type, scope): a second select over
/// the same types adds comparisons but no new globals.
#[test]
fn test_vtable_singletons_are_reused() {
    let mut module = animal_module();
    let c_ty = Ttype::Class {
        name: "animal".to_string(),
    };
    let c = module.symbols.add(Symbol::local("c", c_ty));

    let mk_clauses = || {
        vec![clause(ClauseKind::TypeIs("dog".to_string()), Vec::new())]
    };
    module.funcs.push(Function {
        name: "main".to_string(),
        args: Vec::new(),
        ret: None,
        locals: vec![c],
        body: vec![select_stmt(c, mk_clauses()), select_stmt(c, mk_clauses())],
        bind_c: false,
    });

    let lowered = lower_module(&module, &CodegenOptions::default()).expect("lower");
    let func = &lowered.funcs[0];

    let vtable_count = lowered
        .globals
        .iter()
        .filter(|g| g.name.starts_with("vtable_"))
        .count();
    assert_eq!(vtable_count, 1);
    // Both selects load the singleton's hash.
    assert_eq!(
        count_insts(func, |k| matches!(k, InstKind::AddrOfGlobal { .. })),
        2
    );
    assert_eq!(count_condbr(func), 2);
}

/// `class is` ORs the hash test over the inheritance closure of the named
/// base.
#[test]
fn test_class_is_ors_over_closure() {
    let mut module = animal_module();
    let c_ty = Ttype::Class {
        name: "animal".to_string(),
    };
    let c = module.symbols.add(Symbol::local("c", c_ty));

    module.funcs.push(Function {
        name: "main".to_string(),
        args: Vec::new(),
        ret: None,
        locals: vec![c],
        body: vec![select_stmt(
            c,
            vec![clause(ClauseKind::ClassIs("animal".to_string()), Vec::new())],
        )],
        bind_c: false,
    });

    let lowered = lower_module(&module, &CodegenOptions::default()).expect("lower");
    let func = &lowered.funcs[0];

    // Three concrete types in the closure: animal, cat, dog.
    assert_eq!(
        count_insts(func, |k| matches!(k, InstKind::AddrOfGlobal { .. })),
        3
    );
    assert_eq!(
        count_insts(func, |k| matches!(k, InstKind::BinOp { op: BinOp::Or, .. })),
        2
    );
    assert_eq!(count_condbr(func), 1);
}
