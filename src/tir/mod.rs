pub mod builder;
pub mod format;
pub mod ir;
pub mod layout;
pub mod runtime;
pub mod types;
pub mod verify;

pub use builder::*;
pub use format::*;
pub use ir::*;
pub use layout::*;
pub use runtime::*;
pub use types::*;
pub use verify::*;
