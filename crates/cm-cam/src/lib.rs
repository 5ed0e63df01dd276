pub mod error;
pub mod ops;
pub mod tabs;

pub use error::CamError;
pub use ops::{compile_operation, CompileConfig, OperationKind};
pub use tabs::split_against_tabs;
