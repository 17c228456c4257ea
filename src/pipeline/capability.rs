// 变换器与过滤器能力接口

use pipelog_common::AuxData;
use std::sync::Arc;

/// 消息变换器
///
/// 在过滤和输出之前修改消息。同一个策略中的变换器按注册顺序串联，
/// 每个变换器拿到的是上一个变换器的输出，以及调用 `log` 时传入的原始附加数据。
///
/// 变换器不能失败；需要表达内部问题时应原样返回输入。
///
/// 任何 `Fn(&str, &AuxData) -> String` 闭包都自动实现该接口。
pub trait Mutator: Send + Sync {
    /// 返回变换后的消息
    fn mutate(&self, message: &str, aux: &AuxData) -> String;

    /// 用于诊断日志的名称
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// 消息过滤器
///
/// 对已经变换过的消息做判断，返回 `true` 表示屏蔽该消息。
/// 任意一个过滤器返回 `true` 即屏蔽，后续过滤器不再执行。
///
/// 任何 `Fn(&str, &AuxData) -> bool` 闭包都自动实现该接口。
pub trait Filter: Send + Sync {
    /// 是否屏蔽该消息
    fn filter(&self, message: &str, aux: &AuxData) -> bool;

    /// 用于诊断日志的名称
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// 共享的变换器句柄，可同时注册到多个策略
pub type SharedMutator = Arc<dyn Mutator>;

/// 共享的过滤器句柄，可同时注册到多个策略
pub type SharedFilter = Arc<dyn Filter>;

impl<F> Mutator for F
where
    F: Fn(&str, &AuxData) -> String + Send + Sync,
{
    fn mutate(&self, message: &str, aux: &AuxData) -> String {
        self(message, aux)
    }
}

impl<F> Filter for F
where
    F: Fn(&str, &AuxData) -> bool + Send + Sync,
{
    fn filter(&self, message: &str, aux: &AuxData) -> bool {
        self(message, aux)
    }
}

/// 把闭包包装成共享变换器
pub fn mutator_fn<F>(f: F) -> SharedMutator
where
    F: Fn(&str, &AuxData) -> String + Send + Sync + 'static,
{
    Arc::new(f)
}

/// 把闭包包装成共享过滤器
pub fn filter_fn<F>(f: F) -> SharedFilter
where
    F: Fn(&str, &AuxData) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}
