// 内置变换器

use crate::errors::PipelogError;
use chrono::format::{Item, StrftimeItems};
use std::fmt::Write;
use crate::pipeline::Mutator;
use pipelog_common::AuxData;
use regex::Regex;

/// 默认时间戳格式
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 在消息前添加固定前缀
#[derive(Debug, Clone)]
pub struct PrefixMutator {
    prefix: String,
}

impl PrefixMutator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Mutator for PrefixMutator {
    fn mutate(&self, message: &str, _aux: &AuxData) -> String {
        format!("{}{}", self.prefix, message)
    }

    fn name(&self) -> &str {
        "prefix"
    }
}

/// 在消息后追加固定后缀
#[derive(Debug, Clone)]
pub struct SuffixMutator {
    suffix: String,
}

impl SuffixMutator {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }
}

impl Mutator for SuffixMutator {
    fn mutate(&self, message: &str, _aux: &AuxData) -> String {
        format!("{}{}", message, self.suffix)
    }

    fn name(&self) -> &str {
        "suffix"
    }
}

/// 在消息前添加 `[时间戳] `
///
/// 使用 UTC 时间和 chrono 的格式字符串，格式在构造时校验。
#[derive(Debug, Clone)]
pub struct TimestampMutator {
    format: String,
}

impl TimestampMutator {
    pub fn new(format: impl Into<String>) -> Result<Self, PipelogError> {
        let format = format.into();
        check_timestamp_format(&format)?;
        Ok(Self { format })
    }
}

impl Default for TimestampMutator {
    fn default() -> Self {
        Self {
            format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl Mutator for TimestampMutator {
    fn mutate(&self, message: &str, _aux: &AuxData) -> String {
        let now = chrono::Utc::now();
        let mut mutated = String::new();
        // 格式化失败时原样返回
        match write!(mutated, "[{}] {}", now.format(&self.format), message) {
            Ok(()) => mutated,
            Err(_) => message.to_string(),
        }
    }

    fn name(&self) -> &str {
        "timestamp"
    }
}

/// 校验 chrono 格式字符串，包含无法识别的占位符时返回错误
pub fn check_timestamp_format(format: &str) -> Result<(), PipelogError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(PipelogError::invalid_pattern(format, "无法识别的时间格式占位符"));
    }
    Ok(())
}

/// 附加数据中存在指定键时，在消息前添加 `[键=值] `
#[derive(Debug, Clone)]
pub struct AuxFieldMutator {
    key: String,
}

impl AuxFieldMutator {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Mutator for AuxFieldMutator {
    fn mutate(&self, message: &str, aux: &AuxData) -> String {
        match aux.get(&self.key) {
            Some(value) => format!("[{}={}] {}", self.key, value, message),
            None => message.to_string(),
        }
    }

    fn name(&self) -> &str {
        "aux_field"
    }
}

/// 用正则替换消息内容，常用于脱敏
#[derive(Debug, Clone)]
pub struct ReplaceMutator {
    pattern: Regex,
    replacement: String,
}

impl ReplaceMutator {
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, PipelogError> {
        let pattern =
            Regex::new(pattern).map_err(|e| PipelogError::invalid_pattern(pattern, e.to_string()))?;
        Ok(Self {
            pattern,
            replacement: replacement.into(),
        })
    }
}

impl Mutator for ReplaceMutator {
    fn mutate(&self, message: &str, _aux: &AuxData) -> String {
        self.pattern
            .replace_all(message, self.replacement.as_str())
            .into_owned()
    }

    fn name(&self) -> &str {
        "replace"
    }
}

/// 去掉首尾空白
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimMutator;

impl Mutator for TrimMutator {
    fn mutate(&self, message: &str, _aux: &AuxData) -> String {
        message.trim().to_string()
    }

    fn name(&self) -> &str {
        "trim"
    }
}

/// 转为大写
#[derive(Debug, Clone, Copy, Default)]
pub struct UppercaseMutator;

impl Mutator for UppercaseMutator {
    fn mutate(&self, message: &str, _aux: &AuxData) -> String {
        message.to_uppercase()
    }

    fn name(&self) -> &str {
        "uppercase"
    }
}
