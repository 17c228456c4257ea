// 日志系统模块
// 配置结构化诊断日志和消息上下文

pub mod setup;
pub mod context;


pub use setup::*;
pub use context::*;
