//! Statements, declarations, and the module root.

use crate::diag::Span;
use crate::tast::expr::Expr;
use crate::tast::symbol::{SymbolId, SymbolTable};
use crate::tast::types::Ttype;

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Self {
            kind,
            span: Span::default(),
        }
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Self::new(StmtKind::Assignment { target, value })
    }

    pub fn ret(value: Option<Expr>) -> Self {
        Self::new(StmtKind::Return { value })
    }

    pub fn print(values: Vec<Expr>) -> Self {
        Self::new(StmtKind::Print { values })
    }
}

/// Requested extent for one dimension of an `allocate`.
#[derive(Debug, Clone)]
pub struct AllocExtent {
    pub lower: Option<Expr>,
    pub size: Expr,
}

#[derive(Debug, Clone)]
pub enum ClauseKind {
    /// Matches exactly the named concrete type.
    TypeIs(String),
    /// Matches the named type and everything extending it.
    ClassIs(String),
    ClassDefault,
}

#[derive(Debug, Clone)]
pub struct TypeClause {
    pub kind: ClauseKind,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Assignment {
        target: Expr,
        value: Expr,
    },
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        else_body: Vec<Stmt>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
    /// Expression evaluated for its side effects (method call statements).
    ExprStmt {
        expr: Expr,
    },
    Return {
        value: Option<Expr>,
    },
    Stop {
        code: Option<Expr>,
    },
    ErrorStop {
        code: Option<Expr>,
    },
    Print {
        values: Vec<Expr>,
    },
    Allocate {
        target: Expr,
        extents: Vec<AllocExtent>,
        /// Dynamic type to allocate for class targets.
        as_type: Option<Ttype>,
    },
    Deallocate {
        target: Expr,
    },
    /// Pointer association `target => source`; the source may be an array
    /// section, which builds a new descriptor over the parent's storage.
    PointerAssociate {
        target: Expr,
        source: Expr,
    },
    SelectType {
        selector: SymbolId,
        clauses: Vec<TypeClause>,
    },
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub ty: Ttype,
}

/// Type-bound procedure binding.
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    /// Name of the procedure implementing the binding in this type.
    pub proc: String,
    /// `nopass`: the object is not passed as the first argument.
    pub nopass: bool,
    pub deferred: bool,
}

#[derive(Debug, Clone)]
pub struct StructDef {
    pub name: String,
    pub parent: Option<String>,
    pub fields: Vec<Field>,
    pub bindings: Vec<Binding>,
    pub bind_c: bool,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub args: Vec<SymbolId>,
    pub ret: Option<Ttype>,
    pub locals: Vec<SymbolId>,
    pub body: Vec<Stmt>,
    pub bind_c: bool,
}

#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub symbols: SymbolTable,
    pub structs: Vec<StructDef>,
    pub globals: Vec<SymbolId>,
    pub funcs: Vec<Function>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbols: SymbolTable::new(),
            structs: Vec::new(),
            globals: Vec::new(),
            funcs: Vec::new(),
        }
    }

    pub fn struct_def(&self, name: &str) -> Option<&StructDef> {
        self.structs.iter().find(|s| s.name == name)
    }

    pub fn func(&self, name: &str) -> Option<&Function> {
        self.funcs.iter().find(|f| f.name == name)
    }
}
