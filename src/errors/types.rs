// 统一错误类型定义

use pipelog_common::CommonError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pipelog 统一错误类型
///
/// 只在加载配置和构建组件时产生；管道本身的 `log` 与注册操作从不返回错误。
#[derive(Debug, Error, Serialize, Deserialize)]
#[serde(tag = "error_type", content = "details")]
pub enum PipelogError {
    /// 配置错误
    #[error("配置错误: {message}")]
    Configuration { message: String },

    /// 验证错误
    #[error("验证错误: {field} - {message}")]
    Validation { field: String, message: String },

    /// 未知的组件类型
    #[error("未知的{category}类型: {kind}")]
    UnknownKind { category: String, kind: String },

    /// 组件缺少必需字段
    #[error("{kind} 缺少必需字段: {field}")]
    MissingField { kind: String, field: String },

    /// 无效的正则表达式或时间格式
    #[error("无效的模式 `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// 输出端错误
    #[error("输出端错误: {sink} - {message}")]
    Sink { sink: String, message: String },

    /// IO 错误
    #[error("IO 错误: {message}")]
    Io { message: String },

    /// 内部错误
    #[error("内部错误: {message}")]
    Internal { message: String },
}

impl PipelogError {
    /// 获取错误代码
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::UnknownKind { .. } => "UNKNOWN_KIND",
            Self::MissingField { .. } => "MISSING_FIELD",
            Self::InvalidPattern { .. } => "INVALID_PATTERN",
            Self::Sink { .. } => "SINK_ERROR",
            Self::Io { .. } => "IO_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// 是否应该记录错误日志
    ///
    /// 用户输入类错误直接返回给调用方即可。
    pub fn should_log(&self) -> bool {
        !matches!(
            self,
            Self::Validation { .. }
                | Self::UnknownKind { .. }
                | Self::MissingField { .. }
                | Self::InvalidPattern { .. }
        )
    }

    /// 创建配置错误
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 创建未知类型错误
    pub fn unknown_kind(category: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::UnknownKind {
            category: category.into(),
            kind: kind.into(),
        }
    }

    /// 创建缺少字段错误
    pub fn missing_field(kind: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            kind: kind.into(),
            field: field.into(),
        }
    }

    /// 创建正则错误
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// 创建输出端错误
    pub fn sink(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Sink {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// 从通用错误转换
impl From<CommonError> for PipelogError {
    fn from(err: CommonError) -> Self {
        match err.code.as_str() {
            "CONFIGURATION_ERROR" => Self::configuration(err.message),
            "VALIDATION_ERROR" => Self::validation(
                err.details.unwrap_or_else(|| "general".to_string()),
                err.message,
            ),
            _ => Self::internal(err.message),
        }
    }
}

impl From<config::ConfigError> for PipelogError {
    fn from(err: config::ConfigError) -> Self {
        Self::configuration(err.to_string())
    }
}

impl From<std::io::Error> for PipelogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

/// 结果类型别名
pub type PipelogResult<T> = Result<T, PipelogError>;
