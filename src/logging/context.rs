// 日志上下文管理
// 为每条消息生成附加数据

use pipelog_common::AuxData;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// 附加数据中的标准键
pub const MESSAGE_ID_KEY: &str = "message_id";
pub const TRACE_ID_KEY: &str = "trace_id";
pub const TIMESTAMP_KEY: &str = "timestamp";
pub const SOURCE_KEY: &str = "source";
pub const USER_ID_KEY: &str = "user_id";

/// 消息上下文
///
/// 管道不会读取附加数据，这里只是为调用方和内置组件提供一组约定好的键。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogContext {
    pub message_id: String,
    pub trace_id: String,
    pub source: Option<String>,
    pub user_id: Option<String>,
    pub extra: HashMap<String, String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl LogContext {
    /// 创建新的消息上下文
    pub fn new() -> Self {
        Self {
            message_id: Uuid::new_v4().to_string(),
            trace_id: Uuid::new_v4().to_string(),
            source: None,
            user_id: None,
            extra: HashMap::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// 沿用已有的追踪 ID
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self
    }

    /// 设置来源
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// 设置用户 ID
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// 添加自定义字段，与标准键同名时以标准字段为准
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// 转换为附加数据
    pub fn into_aux_data(self) -> AuxData {
        let mut aux: AuxData = self.extra;
        aux.insert(MESSAGE_ID_KEY.to_string(), self.message_id);
        aux.insert(TRACE_ID_KEY.to_string(), self.trace_id);
        aux.insert(TIMESTAMP_KEY.to_string(), self.timestamp.to_rfc3339());

        if let Some(source) = self.source {
            aux.insert(SOURCE_KEY.to_string(), source);
        }

        if let Some(user_id) = self.user_id {
            aux.insert(USER_ID_KEY.to_string(), user_id);
        }

        aux
    }
}

impl Default for LogContext {
    fn default() -> Self {
        Self::new()
    }
}

impl From<LogContext> for AuxData {
    fn from(context: LogContext) -> Self {
        context.into_aux_data()
    }
}
