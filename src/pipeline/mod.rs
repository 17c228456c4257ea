// 日志管道核心
// 变换器、过滤器、策略以及扇出日志器

pub mod builder;
pub mod capability;
pub mod chain;
pub mod logger;
pub mod registry;
pub mod strategy;

#[cfg(test)]
mod tests;

pub use builder::*;
pub use capability::*;
pub use chain::*;
pub use logger::*;
pub use registry::*;
pub use strategy::*;
