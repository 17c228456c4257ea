// 变换 → 过滤 → 输出 流程

use crate::pipeline::{Filter, Mutator, Registry, SharedFilter, SharedMutator};
use pipelog_common::AuxData;

/// 一个策略自己的变换器链和过滤器链
///
/// 两条链相互独立地排序和去重。[`Chain::run`] 实现了每个策略共用的
/// 处理流程：先变换，再用变换后的消息过滤，未被屏蔽时才交给输出步骤。
#[derive(Debug, Default)]
pub struct Chain {
    mutators: Registry<dyn Mutator>,
    filters: Registry<dyn Filter>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// 处理一条消息
    ///
    /// 返回 `true` 表示消息未被屏蔽且 `deliver` 恰好被调用了一次；
    /// 返回 `false` 表示消息被某个过滤器屏蔽，`deliver` 没有被调用。
    pub fn run<F>(&self, message: &str, aux: &AuxData, deliver: F) -> bool
    where
        F: FnOnce(&str, &AuxData),
    {
        let mutated = self.mutate(message, aux);
        if self.is_suppressed(&mutated, aux) {
            return false;
        }
        deliver(&mutated, aux);
        true
    }

    /// 按注册顺序依次应用全部变换器
    pub fn mutate(&self, message: &str, aux: &AuxData) -> String {
        self.mutators
            .snapshot()
            .iter()
            .fold(message.to_string(), |current, mutator| {
                mutator.mutate(&current, aux)
            })
    }

    /// 按注册顺序检查过滤器，遇到第一个返回 `true` 的即停止
    pub fn is_suppressed(&self, message: &str, aux: &AuxData) -> bool {
        match self
            .filters
            .snapshot()
            .into_iter()
            .find(|filter| filter.filter(message, aux))
        {
            Some(filter) => {
                tracing::trace!(filter = filter.name(), "消息已被过滤");
                true
            }
            None => false,
        }
    }

    pub fn add_mutator(&self, mutator: SharedMutator) -> bool {
        self.mutators.add(mutator)
    }

    pub fn remove_mutator(&self, mutator: &SharedMutator) -> bool {
        self.mutators.remove(mutator)
    }

    pub fn mutators(&self) -> Vec<SharedMutator> {
        self.mutators.snapshot()
    }

    pub fn clear_mutators(&self) {
        self.mutators.clear();
    }

    pub fn add_filter(&self, filter: SharedFilter) -> bool {
        self.filters.add(filter)
    }

    pub fn remove_filter(&self, filter: &SharedFilter) -> bool {
        self.filters.remove(filter)
    }

    pub fn filters(&self) -> Vec<SharedFilter> {
        self.filters.snapshot()
    }

    pub fn clear_filters(&self) {
        self.filters.clear();
    }
}
