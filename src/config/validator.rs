// 配置验证器
// 提供详细的配置验证逻辑

use crate::config::{
    AppConfig, EnvironmentConfig, FilterConfig, LoggingConfig, MutatorConfig, PipelineConfig,
    StrategyConfig,
};
use crate::builtin::check_timestamp_format;
use pipelog_common::CommonError;
use regex::Regex;

/// 支持的诊断日志级别
pub const VALID_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// 支持的诊断日志格式
pub const VALID_FORMATS: &[&str] = &["json", "pretty", "compact", "full"];

/// 支持的策略类型
pub const STRATEGY_KINDS: &[&str] = &["console", "stderr", "file", "tracing", "logger"];

/// 支持的变换器类型
pub const MUTATOR_KINDS: &[&str] = &[
    "prefix",
    "suffix",
    "timestamp",
    "aux_field",
    "replace",
    "trim",
    "uppercase",
];

/// 支持的过滤器类型
pub const FILTER_KINDS: &[&str] = &[
    "contains",
    "regex",
    "aux_equals",
    "aux_missing",
    "blank",
    "max_length",
    "sensitive",
];

/// 支持的文件轮转策略
pub const FILE_ROTATIONS: &[&str] = &["never", "hourly", "daily"];

/// 配置验证器
pub struct ConfigValidator;

impl ConfigValidator {
    /// 验证完整配置
    pub fn validate_all(config: &AppConfig) -> Result<(), Vec<CommonError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_logging(&config.logging) {
            errors.push(e);
        }

        if let Err(e) = Self::validate_environment(&config.environment) {
            errors.push(e);
        }

        errors.extend(Self::validate_pipeline(&config.pipeline));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// 验证诊断日志配置
    pub fn validate_logging(config: &LoggingConfig) -> Result<(), CommonError> {
        if !VALID_LEVELS.contains(&config.level.to_lowercase().as_str()) {
            return Err(CommonError::validation(format!(
                "无效的日志级别: {}，有效值: {:?}",
                config.level, VALID_LEVELS
            )));
        }

        if !VALID_FORMATS.contains(&config.format.as_str()) {
            return Err(CommonError::validation(format!(
                "无效的日志格式: {}，有效值: {:?}",
                config.format, VALID_FORMATS
            )));
        }

        if config.file_enabled {
            match config.file_path.as_deref() {
                Some(path) if !path.trim().is_empty() => {}
                _ => {
                    return Err(CommonError::validation(
                        "启用文件日志时必须指定日志文件路径",
                    ));
                }
            }
        }

        Ok(())
    }

    /// 验证环境配置
    pub fn validate_environment(config: &EnvironmentConfig) -> Result<(), CommonError> {
        if config.name.trim().is_empty() {
            return Err(CommonError::validation("环境名称不能为空"));
        }
        Ok(())
    }

    /// 验证日志器配置，返回全部错误
    pub fn validate_pipeline(config: &PipelineConfig) -> Vec<CommonError> {
        let mut errors = Vec::new();

        if config.name.trim().is_empty() {
            errors.push(CommonError::validation("日志器名称不能为空"));
        }

        Self::collect_chain(
            "pipeline",
            &config.mutators,
            &config.filters,
            &mut errors,
        );

        for (index, strategy) in config.strategies.iter().enumerate() {
            Self::collect_strategy(&format!("pipeline.strategies[{}]", index), strategy, &mut errors);
        }

        errors
    }

    /// 验证单个策略配置
    pub fn validate_strategy(config: &StrategyConfig) -> Result<(), CommonError> {
        let mut errors = Vec::new();
        Self::collect_strategy("strategy", config, &mut errors);
        match errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// 验证变换器配置
    pub fn validate_mutator(config: &MutatorConfig) -> Result<(), CommonError> {
        let kind = config.kind.as_str();
        if !MUTATOR_KINDS.contains(&kind) {
            return Err(CommonError::validation(format!(
                "未知的变换器类型: {}，有效值: {:?}",
                kind, MUTATOR_KINDS
            )));
        }

        match kind {
            "prefix" | "suffix" => require(kind, "value", config.value.as_deref()).map(|_| ()),
            "aux_field" => require(kind, "key", config.key.as_deref()).map(|_| ()),
            "replace" => {
                let pattern = require(kind, "pattern", config.pattern.as_deref())?;
                check_pattern(pattern)
            }
            "timestamp" => match config.value.as_deref() {
                Some(format) => check_timestamp_format(format)
                    .map_err(|e| CommonError::validation(e.to_string())),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }

    /// 验证过滤器配置
    pub fn validate_filter(config: &FilterConfig) -> Result<(), CommonError> {
        let kind = config.kind.as_str();
        if !FILTER_KINDS.contains(&kind) {
            return Err(CommonError::validation(format!(
                "未知的过滤器类型: {}，有效值: {:?}",
                kind, FILTER_KINDS
            )));
        }

        match kind {
            "contains" => require(kind, "value", config.value.as_deref()).map(|_| ()),
            "regex" => {
                let pattern = require(kind, "pattern", config.pattern.as_deref())?;
                check_pattern(pattern)
            }
            "aux_equals" => {
                require(kind, "key", config.key.as_deref())?;
                require(kind, "value", config.value.as_deref()).map(|_| ())
            }
            "aux_missing" => require(kind, "key", config.key.as_deref()).map(|_| ()),
            "max_length" => match config.limit {
                Some(0) => Err(CommonError::validation("max_length 的 limit 必须大于 0")),
                Some(_) => Ok(()),
                None => Err(missing(kind, "limit")),
            },
            _ => Ok(()),
        }
    }

    fn collect_strategy(path: &str, config: &StrategyConfig, errors: &mut Vec<CommonError>) {
        let kind = config.kind.as_str();
        if !STRATEGY_KINDS.contains(&kind) {
            errors.push(CommonError::validation(format!(
                "{}: 未知的策略类型: {}，有效值: {:?}",
                path, kind, STRATEGY_KINDS
            )));
            return;
        }

        match kind {
            "file" => {
                if let Err(e) = require(kind, "path", config.path.as_deref()) {
                    errors.push(at(path, e));
                }
                if let Some(rotation) = config.rotation.as_deref() {
                    if !FILE_ROTATIONS.contains(&rotation.to_lowercase().as_str()) {
                        errors.push(CommonError::validation(format!(
                            "{}: 无效的文件轮转策略: {}，有效值: {:?}",
                            path, rotation, FILE_ROTATIONS
                        )));
                    }
                }
            }
            "tracing" => {
                if let Some(level) = config.level.as_deref() {
                    if !VALID_LEVELS.contains(&level.to_lowercase().as_str()) {
                        errors.push(CommonError::validation(format!(
                            "{}: 无效的事件级别: {}，有效值: {:?}",
                            path, level, VALID_LEVELS
                        )));
                    }
                }
            }
            "logger" => {
                for (index, child) in config.strategies.iter().enumerate() {
                    Self::collect_strategy(&format!("{}.strategies[{}]", path, index), child, errors);
                }
            }
            _ => {}
        }

        if kind != "logger" && !config.strategies.is_empty() {
            errors.push(CommonError::validation(format!(
                "{}: 只有 logger 类型可以包含子策略",
                path
            )));
        }

        Self::collect_chain(path, &config.mutators, &config.filters, errors);
    }

    fn collect_chain(
        path: &str,
        mutators: &[MutatorConfig],
        filters: &[FilterConfig],
        errors: &mut Vec<CommonError>,
    ) {
        for (index, mutator) in mutators.iter().enumerate() {
            if let Err(e) = Self::validate_mutator(mutator) {
                errors.push(at(&format!("{}.mutators[{}]", path, index), e));
            }
        }
        for (index, filter) in filters.iter().enumerate() {
            if let Err(e) = Self::validate_filter(filter) {
                errors.push(at(&format!("{}.filters[{}]", path, index), e));
            }
        }
    }
}

fn require<'a>(kind: &str, field: &str, value: Option<&'a str>) -> Result<&'a str, CommonError> {
    value.ok_or_else(|| missing(kind, field))
}

fn missing(kind: &str, field: &str) -> CommonError {
    CommonError::validation(format!("{} 缺少必需字段: {}", kind, field))
}

fn check_pattern(pattern: &str) -> Result<(), CommonError> {
    Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| CommonError::validation(format!("无效的正则表达式 `{}`: {}", pattern, e)))
}

// 在错误信息前加上配置路径
fn at(path: &str, error: CommonError) -> CommonError {
    CommonError {
        message: format!("{}: {}", path, error.message),
        ..error
    }
}
