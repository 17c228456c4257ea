// Pipelog Common Package
// 通用类型定义和工具函数

pub mod types;
pub mod errors;

pub use types::*;
pub use errors::*;
