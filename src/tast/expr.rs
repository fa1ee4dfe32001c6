//! Typed expressions.

use crate::diag::Span;
use crate::tast::symbol::SymbolId;
use crate::tast::types::Ttype;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Numeric conversions inserted by the upstream type checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    IntToReal,
    RealToInt,
    IntResize,
    RealResize,
    LogicalToInt,
}

/// Intrinsics the backend lowers directly onto descriptor/string operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intrinsic {
    /// Total element count, or extent along one dimension.
    Size,
    /// String length.
    Len,
    /// Allocation status of an allocatable.
    Allocated,
    Abs,
}

/// One dimension of an array section: `start:end:step`, any part optional.
#[derive(Debug, Clone)]
pub struct SectionRange {
    pub start: Option<Box<Expr>>,
    pub end: Option<Box<Expr>>,
    pub step: Option<Box<Expr>>,
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Ttype,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Ttype) -> Self {
        Self {
            kind,
            ty,
            span: Span::default(),
        }
    }

    pub fn int(value: i64, bytes: u8) -> Self {
        Self::new(ExprKind::IntConst(value), Ttype::int(bytes))
    }

    pub fn real(value: f64, bytes: u8) -> Self {
        Self::new(ExprKind::RealConst(value), Ttype::real(bytes))
    }

    pub fn logical(value: bool) -> Self {
        Self::new(ExprKind::LogicalConst(value), Ttype::Logical)
    }

    pub fn str_const(value: impl Into<String>) -> Self {
        let value = value.into();
        let len = value.len() as u64;
        Self::new(ExprKind::StrConst(value), Ttype::character(len))
    }

    pub fn var(id: SymbolId, ty: Ttype) -> Self {
        Self::new(ExprKind::Var(id), ty)
    }

    pub fn binop(op: BinaryOp, lhs: Expr, rhs: Expr, ty: Ttype) -> Self {
        Self::new(
            ExprKind::BinOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            ty,
        )
    }

    pub fn cmp(op: CmpOp, lhs: Expr, rhs: Expr) -> Self {
        Self::new(
            ExprKind::Cmp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            Ttype::Logical,
        )
    }

    pub fn array_item(target: Expr, indices: Vec<Expr>, ty: Ttype) -> Self {
        Self::new(
            ExprKind::ArrayItem {
                target: Box::new(target),
                indices,
            },
            ty,
        )
    }

    pub fn field(target: Expr, field: impl Into<String>, ty: Ttype) -> Self {
        Self::new(
            ExprKind::StructFieldRef {
                target: Box::new(target),
                field: field.into(),
            },
            ty,
        )
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    IntConst(i64),
    RealConst(f64),
    ComplexConst { re: f64, im: f64 },
    LogicalConst(bool),
    StrConst(String),

    Var(SymbolId),
    ArrayItem {
        target: Box<Expr>,
        indices: Vec<Expr>,
    },
    ArraySection {
        target: Box<Expr>,
        ranges: Vec<SectionRange>,
    },
    StructFieldRef {
        target: Box<Expr>,
        field: String,
    },

    BinOp {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Cmp {
        op: CmpOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Cast {
        kind: CastKind,
        value: Box<Expr>,
    },

    FuncCall {
        name: String,
        args: Vec<Expr>,
    },
    IntrinsicCall {
        intrinsic: Intrinsic,
        args: Vec<Expr>,
    },
    /// Call through a type-bound procedure binding.
    MethodCall {
        target: Box<Expr>,
        binding: String,
        args: Vec<Expr>,
    },

    ArrayConstructor {
        elems: Vec<Expr>,
    },
    ListConstructor {
        elems: Vec<Expr>,
    },

    StringConcat {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// 1-based inclusive slice: `s(start:end)`.
    StrSliceInclusive {
        target: Box<Expr>,
        start: Box<Expr>,
        end: Box<Expr>,
    },
    /// 0-based half-open slice: `s[start:end]`.
    StrSliceHalfOpen {
        target: Box<Expr>,
        start: Box<Expr>,
        end: Box<Expr>,
    },
}
