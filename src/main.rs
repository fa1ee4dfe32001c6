use clap::Parser as ClapParser;

use ferric::lower::lower_module;
use ferric::options::{CodegenOptions, TargetPlatform};
use ferric::tast::{Dim, Expr, Module, PhysicalType, Stmt, Symbol, Ttype};
use ferric::tir::format_module;

#[derive(ClapParser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Comma-separated list of things to dump: ir
    #[clap(long)]
    dump: Option<String>,

    /// Heap-allocate local data arrays instead of using the stack.
    #[clap(long)]
    heap_arrays: bool,

    /// Disable bounds-check instrumentation.
    #[clap(long)]
    no_bounds_checks: bool,

    /// Target platform: linux, macos, windows
    #[clap(long, default_value = "linux")]
    target: String,
}

/// Builds the demo program:
///
/// ```text
/// subroutine main()
///     real :: x(3) = [1.0, 2.0, 3.0]
///     print x(2)
/// end
/// ```
fn demo_module() -> Module {
    let mut module = Module::new("demo");

    let x_ty = Ttype::Array {
        elem: Box::new(Ttype::real(8)),
        dims: vec![Dim::fixed(1, 3)],
        physical: PhysicalType::FixedSize,
    };
    let init = Expr::new(
        ferric::tast::ExprKind::ArrayConstructor {
            elems: vec![Expr::real(1.0, 8), Expr::real(2.0, 8), Expr::real(3.0, 8)],
        },
        x_ty.clone(),
    );
    let x = module
        .symbols
        .add(Symbol::local("x", x_ty.clone()).with_init(init));

    let body = vec![Stmt::print(vec![Expr::array_item(
        Expr::var(x, x_ty),
        vec![Expr::int(2, 8)],
        Ttype::real(8),
    )])];

    module.funcs.push(ferric::tast::Function {
        name: "main".to_string(),
        args: Vec::new(),
        ret: None,
        locals: vec![x],
        body,
        bind_c: false,
    });
    module
}

fn main() {
    let args = Args::parse();

    let target = match args.target.as_str() {
        "linux" => TargetPlatform::Linux,
        "macos" => TargetPlatform::MacOs,
        "windows" => TargetPlatform::Windows,
        other => {
            eprintln!("[WARN] unknown target '{}', using linux", other);
            TargetPlatform::Linux
        }
    };
    let options = CodegenOptions {
        heap_arrays: args.heap_arrays,
        bounds_checks: !args.no_bounds_checks,
        debug_info: false,
        realloc_lhs: true,
        target,
    };

    let mut dump_ir = false;
    if let Some(dump) = &args.dump {
        for item in dump.split(',').map(|s| s.trim().to_lowercase()) {
            match item.as_str() {
                "ir" => dump_ir = true,
                "" => {}
                _ => {
                    eprintln!("[WARN] unknown dump flag: {item}");
                }
            }
        }
    }

    let module = demo_module();
    match lower_module(&module, &options) {
        Ok(lowered) => {
            if dump_ir || args.dump.is_none() {
                print!("{}", format_module(&lowered));
            }
        }
        Err(error) => {
            eprintln!("error: {}", error);
            std::process::exit(1);
        }
    }
}
