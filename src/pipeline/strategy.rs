// 日志策略

use crate::pipeline::{Chain, SharedFilter, SharedMutator};
use pipelog_common::AuxData;
use std::sync::Arc;

/// 独立配置的 变换 → 过滤 → 输出 管道
///
/// 实现者只需提供自己的 [`Chain`] 以及 `log`；注册相关的操作都由默认方法
/// 委托给 `chain()`。`log` 的返回值只表示本策略的过滤器是否放行，
/// 不表示输出是否成功。
pub trait Strategy: Send + Sync {
    /// 本策略的变换器和过滤器
    fn chain(&self) -> &Chain;

    /// 记录一条消息，返回消息是否通过了过滤
    ///
    /// 实现必须通过 `self.chain().run(..)` 完成变换和过滤，只在传给 `run` 的
    /// 输出闭包里投递消息。只需要新的输出目的地时，应实现 [`Sink`] 并用
    /// [`Pipeline`] 包装，而不是直接实现本接口。
    fn log(&self, message: &str, aux: &AuxData) -> bool;

    /// 用于诊断日志的名称
    fn name(&self) -> &str;

    /// 追加变换器，已注册时返回 `false`
    fn add_mutator(&self, mutator: SharedMutator) -> bool {
        self.chain().add_mutator(mutator)
    }

    /// 移除变换器，未注册时返回 `false`
    fn remove_mutator(&self, mutator: &SharedMutator) -> bool {
        self.chain().remove_mutator(mutator)
    }

    fn mutators(&self) -> Vec<SharedMutator> {
        self.chain().mutators()
    }

    fn clear_mutators(&self) {
        self.chain().clear_mutators();
    }

    /// 追加过滤器，已注册时返回 `false`
    fn add_filter(&self, filter: SharedFilter) -> bool {
        self.chain().add_filter(filter)
    }

    /// 移除过滤器，未注册时返回 `false`
    fn remove_filter(&self, filter: &SharedFilter) -> bool {
        self.chain().remove_filter(filter)
    }

    fn filters(&self) -> Vec<SharedFilter> {
        self.chain().filters()
    }

    fn clear_filters(&self) {
        self.chain().clear_filters();
    }

    /// 构建时追加变换器
    fn with_mutator(self, mutator: SharedMutator) -> Self
    where
        Self: Sized,
    {
        self.add_mutator(mutator);
        self
    }

    /// 构建时追加过滤器
    fn with_filter(self, filter: SharedFilter) -> Self
    where
        Self: Sized,
    {
        self.add_filter(filter);
        self
    }
}

/// 共享的策略句柄，可同时挂到多个 [`Logger`](crate::pipeline::Logger) 下
pub type SharedStrategy = Arc<dyn Strategy>;

/// 输出端
///
/// 只负责把已经变换、且未被过滤的消息送到目的地。输出失败由输出端自己处理
/// （通常记录一条 `warn` 诊断日志），不会反馈给 `log` 的调用方。
pub trait Sink: Send + Sync {
    fn deliver(&self, message: &str, aux: &AuxData);

    fn name(&self) -> &str {
        "sink"
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn deliver(&self, message: &str, aux: &AuxData) {
        (**self).deliver(message, aux)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn deliver(&self, message: &str, aux: &AuxData) {
        (**self).deliver(message, aux)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// 由一条处理链和一个输出端组成的具体策略
///
/// 输出端只能通过 `log` 在过滤之后被调用。
pub struct Pipeline<S> {
    name: String,
    chain: Chain,
    sink: S,
}

impl<S: Sink> Pipeline<S> {
    /// 以输出端名称创建策略
    pub fn new(sink: S) -> Self {
        let name = sink.name().to_string();
        Self::named(name, sink)
    }

    /// 指定名称创建策略
    pub fn named(name: impl Into<String>, sink: S) -> Self {
        Self {
            name: name.into(),
            chain: Chain::new(),
            sink,
        }
    }
}

impl<S: Sink> Strategy for Pipeline<S> {
    fn chain(&self) -> &Chain {
        &self.chain
    }

    fn log(&self, message: &str, aux: &AuxData) -> bool {
        self.chain
            .run(message, aux, |mutated, aux| self.sink.deliver(mutated, aux))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<S> std::fmt::Debug for Pipeline<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("chain", &self.chain)
            .finish()
    }
}
