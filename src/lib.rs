// Pipelog Library
// 可组合的消息日志管道：变换器 → 过滤器 → 输出，日志器可扇出到多个子策略

pub mod builtin;
pub mod config;
pub mod errors;
pub mod logging;
pub mod pipeline;

pub use errors::{PipelogError, PipelogResult};
pub use pipeline::{
    Filter, Logger, Mutator, Pipeline, SharedFilter, SharedMutator, SharedStrategy, Sink, Strategy,
};
pub use pipelog_common::{AuxData, aux_data};
