// 错误处理模块
// 定义统一的错误类型

pub mod types;


pub use types::*;
