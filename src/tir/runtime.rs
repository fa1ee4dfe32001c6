//! Fixed registry of externally-linked runtime functions.
//!
//! The generated module calls these by name; the signatures here are part of
//! the contract with the companion runtime library and must match exactly.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeFn {
    Alloc,
    Realloc,
    Free,

    StrConcat,
    StrCompare,
    StrCopy,
    StrSlice,
    StrRepeat,

    ComplexAdd,
    ComplexSub,
    ComplexMul,
    ComplexDiv,

    ListEnsure,
    ListAppend,

    PrintI64,
    PrintF64,
    PrintStr,
    PrintBool,
    PrintNewline,

    TrapBounds,
    StackTrace,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeFnSig {
    pub name: &'static str,
    pub arg_count: u8,
    pub ret: Option<RuntimeRet>,
    pub effect: CallEffect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeRet {
    Scalar,
    /// Pointer-like scalar, distinct for ABI documentation.
    Addr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEffect {
    Pure,
    ReadOnly,
    ReadWrite,
    NoReturn,
}

impl RuntimeFn {
    pub fn sig(&self) -> RuntimeFnSig {
        match self {
            RuntimeFn::Alloc => RuntimeFnSig {
                name: "__fc_alloc",
                arg_count: 1,
                ret: Some(RuntimeRet::Addr),
                effect: CallEffect::ReadWrite,
            },
            RuntimeFn::Realloc => RuntimeFnSig {
                name: "__fc_realloc",
                arg_count: 2,
                ret: Some(RuntimeRet::Addr),
                effect: CallEffect::ReadWrite,
            },
            // Tolerates a null argument so scope-exit frees of explicitly
            // deallocated (nulled) pointers are no-ops.
            RuntimeFn::Free => RuntimeFnSig {
                name: "__fc_free",
                arg_count: 1,
                ret: None,
                effect: CallEffect::ReadWrite,
            },
            RuntimeFn::StrConcat => RuntimeFnSig {
                name: "__fc_str_concat",
                arg_count: 5,
                ret: None,
                effect: CallEffect::ReadWrite,
            },
            RuntimeFn::StrCompare => RuntimeFnSig {
                name: "__fc_str_compare",
                arg_count: 4,
                ret: Some(RuntimeRet::Scalar),
                effect: CallEffect::ReadOnly,
            },
            RuntimeFn::StrCopy => RuntimeFnSig {
                name: "__fc_str_copy",
                arg_count: 3,
                ret: None,
                effect: CallEffect::ReadWrite,
            },
            RuntimeFn::StrSlice => RuntimeFnSig {
                name: "__fc_str_slice",
                arg_count: 5,
                ret: None,
                effect: CallEffect::ReadWrite,
            },
            RuntimeFn::StrRepeat => RuntimeFnSig {
                name: "__fc_str_repeat",
                arg_count: 4,
                ret: None,
                effect: CallEffect::ReadWrite,
            },
            RuntimeFn::ComplexAdd => RuntimeFnSig {
                name: "__fc_cadd",
                arg_count: 4,
                ret: None,
                effect: CallEffect::ReadWrite,
            },
            RuntimeFn::ComplexSub => RuntimeFnSig {
                name: "__fc_csub",
                arg_count: 4,
                ret: None,
                effect: CallEffect::ReadWrite,
            },
            RuntimeFn::ComplexMul => RuntimeFnSig {
                name: "__fc_cmul",
                arg_count: 4,
                ret: None,
                effect: CallEffect::ReadWrite,
            },
            RuntimeFn::ComplexDiv => RuntimeFnSig {
                name: "__fc_cdiv",
                arg_count: 4,
                ret: None,
                effect: CallEffect::ReadWrite,
            },
            RuntimeFn::ListEnsure => RuntimeFnSig {
                name: "__fc_list_ensure",
                arg_count: 3,
                ret: None,
                effect: CallEffect::ReadWrite,
            },
            RuntimeFn::ListAppend => RuntimeFnSig {
                name: "__fc_list_append",
                arg_count: 3,
                ret: None,
                effect: CallEffect::ReadWrite,
            },
            RuntimeFn::PrintI64 => RuntimeFnSig {
                name: "__fc_print_i64",
                arg_count: 1,
                ret: None,
                effect: CallEffect::ReadOnly,
            },
            RuntimeFn::PrintF64 => RuntimeFnSig {
                name: "__fc_print_f64",
                arg_count: 1,
                ret: None,
                effect: CallEffect::ReadOnly,
            },
            RuntimeFn::PrintStr => RuntimeFnSig {
                name: "__fc_print_str",
                arg_count: 2,
                ret: None,
                effect: CallEffect::ReadOnly,
            },
            RuntimeFn::PrintBool => RuntimeFnSig {
                name: "__fc_print_bool",
                arg_count: 1,
                ret: None,
                effect: CallEffect::ReadOnly,
            },
            RuntimeFn::PrintNewline => RuntimeFnSig {
                name: "__fc_print_nl",
                arg_count: 0,
                ret: None,
                effect: CallEffect::ReadOnly,
            },
            RuntimeFn::TrapBounds => RuntimeFnSig {
                name: "__fc_trap_bounds",
                arg_count: 2,
                ret: None,
                effect: CallEffect::NoReturn,
            },
            RuntimeFn::StackTrace => RuntimeFnSig {
                name: "__fc_stacktrace",
                arg_count: 0,
                ret: None,
                effect: CallEffect::ReadOnly,
            },
            RuntimeFn::Exit => RuntimeFnSig {
                name: "__fc_exit",
                arg_count: 1,
                ret: None,
                effect: CallEffect::NoReturn,
            },
        }
    }
}
