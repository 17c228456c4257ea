// 应用程序设置和配置
// 定义配置结构体和加载逻辑

use crate::errors::PipelogError;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 默认配置文件名（不含扩展名）
pub const DEFAULT_CONFIG_FILE: &str = "pipelog";

/// 应用程序配置
///
/// 各部分缺省时使用各自的默认值；配置文件中给出的列表整体替换默认列表。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub pipeline: PipelineConfig,
    pub environment: EnvironmentConfig,
}

/// 诊断日志配置（程序自身的 tracing 输出）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_enabled: bool,
    pub file_path: Option<String>,
}

/// 顶层日志器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub name: String,
    pub mutators: Vec<MutatorConfig>,
    pub filters: Vec<FilterConfig>,
    pub strategies: Vec<StrategyConfig>,
}

/// 子策略配置
///
/// `kind` 取值: `console`、`stderr`、`file`、`tracing`、`logger`。
/// `logger` 类型通过 `strategies` 嵌套子策略。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    /// `file` 的输出路径
    #[serde(default)]
    pub path: Option<String>,
    /// `tracing` 的事件级别
    #[serde(default)]
    pub level: Option<String>,
    /// `file` 的轮转策略: `never`、`hourly`、`daily`
    #[serde(default)]
    pub rotation: Option<String>,
    #[serde(default)]
    pub mutators: Vec<MutatorConfig>,
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
    #[serde(default)]
    pub strategies: Vec<StrategyConfig>,
}

/// 变换器配置
///
/// `kind` 取值: `prefix`、`suffix`、`timestamp`、`aux_field`、`replace`、`trim`、`uppercase`。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MutatorConfig {
    pub kind: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

/// 过滤器配置
///
/// `kind` 取值: `contains`、`regex`、`aux_equals`、`aux_missing`、`blank`、
/// `max_length`、`sensitive`。`invert` 为真时反转结果。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    pub kind: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub invert: bool,
}

/// 环境配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub name: String,
    pub debug: bool,
    pub version: String,
}

impl MutatorConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl FilterConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn inverted(mut self) -> Self {
        self.invert = true;
        self
    }
}

impl StrategyConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }
}

impl AppConfig {
    /// 从环境变量和配置文件加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Config::builder();

        // 1. 尝试加载配置文件，缺省部分由 serde 默认值补齐
        if Path::new(&format!("{}.toml", DEFAULT_CONFIG_FILE)).exists() {
            config = config.add_source(File::with_name(DEFAULT_CONFIG_FILE));
        }

        // 2. 加载环境变量（优先级最高）
        config = config.add_source(
            Environment::with_prefix("PIPELOG")
                .prefix_separator("_")
                .separator("__"),
        );

        Self::finish(config.build()?)
    }

    /// 从指定的配置文件加载，文件必须存在
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("PIPELOG")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Self::finish(config)
    }

    fn finish(config: Config) -> Result<Self, ConfigError> {
        let mut app_config: AppConfig = config.try_deserialize()?;
        app_config.environment.version = env!("CARGO_PKG_VERSION").to_string();
        Ok(app_config)
    }

    /// 验证配置
    pub fn validate(&self) -> Result<(), PipelogError> {
        use crate::config::ConfigValidator;

        match ConfigValidator::validate_all(self) {
            Ok(()) => Ok(()),
            Err(errors) => {
                let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                Err(PipelogError::configuration(format!(
                    "配置验证失败: {}",
                    error_messages.join("; ")
                )))
            }
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment.name == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment.name == "production"
    }

    pub fn is_test(&self) -> bool {
        self.environment.name == "test"
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
            file_enabled: false,
            file_path: None,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: "pipelog".to_string(),
            mutators: Vec::new(),
            filters: vec![FilterConfig::new("blank")],
            strategies: vec![StrategyConfig {
                mutators: vec![MutatorConfig::new("timestamp")],
                ..StrategyConfig::new("console")
            }],
        }
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            name: "development".to_string(),
            debug: true,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
