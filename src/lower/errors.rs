use thiserror::Error;

use crate::diag::Span;
use crate::tast::Ttype;

/// User-facing diagnostics for TAST constructs the backend legitimately
/// cannot lower. Contract violations with the TAST producer are not errors
/// of this kind; those panic with a `codegen bug:` marker.
#[derive(Debug, Error)]
pub enum CodeGenError {
    #[error("({span}) unsupported type combination: {ty}")]
    UnsupportedType { span: Span, ty: Ttype },

    #[error("({span}) intrinsic not implemented by this backend")]
    UnsupportedIntrinsic { span: Span },

    #[error("({span}) expression not supported in this position")]
    UnsupportedExpr { span: Span },

    #[error("({span}) functions returning aggregates are not supported; use an out argument")]
    AggregateReturn { span: Span },

    #[error("({span}) unknown function '{name}'")]
    UnknownFunction { span: Span, name: String },

    #[error("({span}) type '{name}' has no field '{field}'")]
    UnknownField {
        span: Span,
        name: String,
        field: String,
    },

    #[error("({span}) unknown derived type '{name}'")]
    UnknownStruct { span: Span, name: String },

    #[error("({span}) type '{name}' has no binding '{binding}'")]
    UnknownBinding {
        span: Span,
        name: String,
        binding: String,
    },

    #[error("({span}) expression is not assignable")]
    NotAPlace { span: Span },
}
