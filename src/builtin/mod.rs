// 内置组件
// 常用的变换器、过滤器和输出端

pub mod filters;
pub mod mutators;
pub mod sinks;

pub use filters::*;
pub use mutators::*;
pub use sinks::*;
