// 扇出日志器

use crate::pipeline::{Chain, Registry, SharedStrategy, Strategy};
use pipelog_common::AuxData;
use tracing::trace;

/// 把消息分发给多个子策略的日志器
///
/// `Logger` 本身也是一个 [`Strategy`]：它先用自己的变换器和过滤器处理一次消息，
/// 放行后再把变换结果依次交给每个子策略，子策略各自再应用自己的链。
/// 因此可以在 `Logger` 上统一添加前缀，同时让控制台和文件输出各自保留不同的格式。
///
/// 子策略的结果不会汇总：某个子策略屏蔽或输出失败不影响其它子策略，
/// 也不影响 `Logger::log` 的返回值。
///
/// 子策略可以是另一个 `Logger`，但不得形成环，调用方需自行保证。
#[derive(Debug)]
pub struct Logger {
    name: String,
    chain: Chain,
    strategies: Registry<dyn Strategy>,
}

impl Logger {
    /// 创建没有子策略的日志器
    ///
    /// 至少需要添加一个子策略，否则日志器不会输出任何内容。
    pub fn new() -> Self {
        Self::named("logger")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chain: Chain::new(),
            strategies: Registry::new(),
        }
    }

    /// 以给定的子策略创建日志器，重复的句柄只保留第一次出现
    pub fn with_strategies<I>(strategies: I) -> Self
    where
        I: IntoIterator<Item = SharedStrategy>,
    {
        let logger = Self::new();
        for strategy in strategies {
            logger.add_strategy(strategy);
        }
        logger
    }

    /// 追加子策略，已存在时返回 `false`
    pub fn add_strategy(&self, strategy: SharedStrategy) -> bool {
        self.strategies.add(strategy)
    }

    /// 移除子策略，不存在时返回 `false`
    pub fn remove_strategy(&self, strategy: &SharedStrategy) -> bool {
        self.strategies.remove(strategy)
    }

    pub fn strategies(&self) -> Vec<SharedStrategy> {
        self.strategies.snapshot()
    }

    pub fn clear_strategies(&self) {
        self.strategies.clear();
    }

    /// 构建时追加子策略
    pub fn with_strategy(self, strategy: SharedStrategy) -> Self {
        self.add_strategy(strategy);
        self
    }

    fn fan_out(&self, message: &str, aux: &AuxData) {
        for strategy in self.strategies.snapshot() {
            let delivered = strategy.log(message, aux);
            trace!(
                logger = %self.name,
                strategy = strategy.name(),
                delivered,
                "子策略处理完成"
            );
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for Logger {
    fn chain(&self) -> &Chain {
        &self.chain
    }

    fn log(&self, message: &str, aux: &AuxData) -> bool {
        self.chain
            .run(message, aux, |mutated, aux| self.fan_out(mutated, aux))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
