// 通用错误类型定义

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 通用错误类型
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct CommonError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl CommonError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: &str, message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// 配置错误
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new("CONFIGURATION_ERROR", message)
    }

    /// 验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// 内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}
