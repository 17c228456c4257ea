// 内置过滤器
// 所有过滤器返回 true 表示屏蔽消息

use crate::errors::PipelogError;
use crate::pipeline::{Filter, SharedFilter};
use pipelog_common::AuxData;
use regex::Regex;

/// 默认的敏感关键词
pub const DEFAULT_SENSITIVE_KEYWORDS: &[&str] = &["password", "token", "secret", "api_key"];

/// 消息包含指定文本时屏蔽
#[derive(Debug, Clone)]
pub struct ContainsFilter {
    needle: String,
}

impl ContainsFilter {
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
        }
    }
}

impl Filter for ContainsFilter {
    fn filter(&self, message: &str, _aux: &AuxData) -> bool {
        message.contains(&self.needle)
    }

    fn name(&self) -> &str {
        "contains"
    }
}

/// 消息匹配正则时屏蔽
#[derive(Debug, Clone)]
pub struct RegexFilter {
    pattern: Regex,
}

impl RegexFilter {
    pub fn new(pattern: &str) -> Result<Self, PipelogError> {
        let pattern =
            Regex::new(pattern).map_err(|e| PipelogError::invalid_pattern(pattern, e.to_string()))?;
        Ok(Self { pattern })
    }
}

impl Filter for RegexFilter {
    fn filter(&self, message: &str, _aux: &AuxData) -> bool {
        self.pattern.is_match(message)
    }

    fn name(&self) -> &str {
        "regex"
    }
}

/// 附加数据中指定键等于指定值时屏蔽
#[derive(Debug, Clone)]
pub struct AuxEqualsFilter {
    key: String,
    value: String,
}

impl AuxEqualsFilter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Filter for AuxEqualsFilter {
    fn filter(&self, _message: &str, aux: &AuxData) -> bool {
        aux.get(&self.key).is_some_and(|value| *value == self.value)
    }

    fn name(&self) -> &str {
        "aux_equals"
    }
}

/// 附加数据中缺少指定键时屏蔽
#[derive(Debug, Clone)]
pub struct AuxMissingFilter {
    key: String,
}

impl AuxMissingFilter {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Filter for AuxMissingFilter {
    fn filter(&self, _message: &str, aux: &AuxData) -> bool {
        !aux.contains_key(&self.key)
    }

    fn name(&self) -> &str {
        "aux_missing"
    }
}

/// 屏蔽空白消息
#[derive(Debug, Clone, Copy, Default)]
pub struct BlankFilter;

impl Filter for BlankFilter {
    fn filter(&self, message: &str, _aux: &AuxData) -> bool {
        message.trim().is_empty()
    }

    fn name(&self) -> &str {
        "blank"
    }
}

/// 屏蔽超过指定字符数的消息
#[derive(Debug, Clone, Copy)]
pub struct MaxLengthFilter {
    limit: usize,
}

impl MaxLengthFilter {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl Filter for MaxLengthFilter {
    fn filter(&self, message: &str, _aux: &AuxData) -> bool {
        message.chars().count() > self.limit
    }

    fn name(&self) -> &str {
        "max_length"
    }
}

/// 屏蔽包含敏感关键词的消息（不区分大小写）
#[derive(Debug, Clone)]
pub struct SensitiveFilter {
    keywords: Vec<String>,
}

impl SensitiveFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|keyword| keyword.into().to_lowercase())
                .collect(),
        }
    }
}

impl Default for SensitiveFilter {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVE_KEYWORDS.iter().copied())
    }
}

impl Filter for SensitiveFilter {
    fn filter(&self, message: &str, _aux: &AuxData) -> bool {
        let message = message.to_lowercase();
        self.keywords.iter().any(|keyword| message.contains(keyword))
    }

    fn name(&self) -> &str {
        "sensitive"
    }
}

/// 反转另一个过滤器的结果，用于“只放行匹配的消息”
pub struct InvertFilter {
    inner: SharedFilter,
}

impl InvertFilter {
    pub fn new(inner: SharedFilter) -> Self {
        Self { inner }
    }
}

impl Filter for InvertFilter {
    fn filter(&self, message: &str, aux: &AuxData) -> bool {
        !self.inner.filter(message, aux)
    }

    fn name(&self) -> &str {
        "invert"
    }
}
