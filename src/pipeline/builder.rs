// 从配置构建日志器

use crate::builtin::*;
use crate::config::{FilterConfig, MutatorConfig, PipelineConfig, StrategyConfig};
use crate::errors::{PipelogError, PipelogResult};
use crate::logging::LoggingSetup;
use crate::pipeline::{Chain, Logger, Pipeline, SharedFilter, SharedMutator, SharedStrategy, Strategy};
use std::sync::Arc;
use tracing::{debug, info};

/// 日志器构建器
///
/// 把 [`PipelineConfig`] 转换为一棵可用的 [`Logger`]。配置只在构建时读取，
/// 构建完成后日志器与配置再无关联。
pub struct PipelineBuilder;

impl PipelineBuilder {
    /// 构建顶层日志器
    pub fn build(config: &PipelineConfig) -> PipelogResult<Logger> {
        let logger = Logger::named(config.name.clone());
        Self::attach_chain(logger.chain(), &config.mutators, &config.filters)?;

        for strategy in &config.strategies {
            logger.add_strategy(Self::build_strategy(strategy)?);
        }

        info!(
            logger = %config.name,
            strategies = logger.strategies().len(),
            "日志器构建完成"
        );
        Ok(logger)
    }

    /// 构建单个子策略
    pub fn build_strategy(config: &StrategyConfig) -> PipelogResult<SharedStrategy> {
        if config.kind != "logger" && !config.strategies.is_empty() {
            return Err(PipelogError::validation(
                "strategies",
                format!("{} 类型不能包含子策略", config.kind),
            ));
        }

        let name = config.name.clone().unwrap_or_else(|| config.kind.clone());

        let strategy: SharedStrategy = match config.kind.as_str() {
            "console" => Arc::new(Pipeline::named(name, ConsoleSink::stdout())),
            "stderr" => Arc::new(Pipeline::named(name, ConsoleSink::stderr())),
            "tracing" => {
                let level = config
                    .level
                    .as_deref()
                    .map(LoggingSetup::parse_level)
                    .unwrap_or(tracing::Level::INFO);
                Arc::new(Pipeline::named(name, TracingSink::new(level)))
            }
            "file" => Self::build_file(name, config)?,
            "logger" => {
                let logger = Logger::named(name);
                for child in &config.strategies {
                    logger.add_strategy(Self::build_strategy(child)?);
                }
                Arc::new(logger)
            }
            other => return Err(PipelogError::unknown_kind("策略", other)),
        };

        Self::attach_chain(strategy.chain(), &config.mutators, &config.filters)?;
        debug!(
            strategy = strategy.name(),
            kind = %config.kind,
            mutators = config.mutators.len(),
            filters = config.filters.len(),
            "子策略构建完成"
        );
        Ok(strategy)
    }

    /// 构建变换器
    pub fn build_mutator(config: &MutatorConfig) -> PipelogResult<SharedMutator> {
        let kind = config.kind.as_str();
        let mutator: SharedMutator = match kind {
            "prefix" => Arc::new(PrefixMutator::new(required(kind, "value", &config.value)?)),
            "suffix" => Arc::new(SuffixMutator::new(required(kind, "value", &config.value)?)),
            "timestamp" => Arc::new(match config.value.as_deref() {
                Some(format) => TimestampMutator::new(format)?,
                None => TimestampMutator::default(),
            }),
            "aux_field" => Arc::new(AuxFieldMutator::new(required(kind, "key", &config.key)?)),
            "replace" => Arc::new(ReplaceMutator::new(
                required(kind, "pattern", &config.pattern)?,
                config.value.clone().unwrap_or_default(),
            )?),
            "trim" => Arc::new(TrimMutator),
            "uppercase" => Arc::new(UppercaseMutator),
            other => return Err(PipelogError::unknown_kind("变换器", other)),
        };
        Ok(mutator)
    }

    /// 构建过滤器，`invert` 为真时包一层 [`InvertFilter`]
    pub fn build_filter(config: &FilterConfig) -> PipelogResult<SharedFilter> {
        let kind = config.kind.as_str();
        let filter: SharedFilter = match kind {
            "contains" => Arc::new(ContainsFilter::new(required(kind, "value", &config.value)?)),
            "regex" => Arc::new(RegexFilter::new(required(kind, "pattern", &config.pattern)?)?),
            "aux_equals" => Arc::new(AuxEqualsFilter::new(
                required(kind, "key", &config.key)?,
                required(kind, "value", &config.value)?,
            )),
            "aux_missing" => Arc::new(AuxMissingFilter::new(required(kind, "key", &config.key)?)),
            "blank" => Arc::new(BlankFilter),
            "max_length" => Arc::new(MaxLengthFilter::new(
                config
                    .limit
                    .ok_or_else(|| PipelogError::missing_field(kind, "limit"))?,
            )),
            "sensitive" => Arc::new(if config.keywords.is_empty() {
                SensitiveFilter::default()
            } else {
                SensitiveFilter::new(config.keywords.iter().cloned())
            }),
            other => return Err(PipelogError::unknown_kind("过滤器", other)),
        };

        if config.invert {
            Ok(Arc::new(InvertFilter::new(filter)))
        } else {
            Ok(filter)
        }
    }

    fn attach_chain(
        chain: &Chain,
        mutators: &[MutatorConfig],
        filters: &[FilterConfig],
    ) -> PipelogResult<()> {
        for mutator in mutators {
            chain.add_mutator(Self::build_mutator(mutator)?);
        }
        for filter in filters {
            chain.add_filter(Self::build_filter(filter)?);
        }
        Ok(())
    }

    #[cfg(feature = "file")]
    fn build_file(name: String, config: &StrategyConfig) -> PipelogResult<SharedStrategy> {
        let path = required("file", "path", &config.path)?;
        let rotation = match config.rotation.as_deref() {
            Some(value) => FileRotation::parse(value).ok_or_else(|| {
                PipelogError::validation("rotation", format!("无效的文件轮转策略: {}", value))
            })?,
            None => FileRotation::Never,
        };
        Ok(Arc::new(Pipeline::named(name, FileSink::open(path, rotation)?)))
    }

    #[cfg(not(feature = "file"))]
    fn build_file(_name: String, _config: &StrategyConfig) -> PipelogResult<SharedStrategy> {
        Err(PipelogError::configuration("file 策略需要启用 `file` 特性"))
    }
}

fn required<'a>(kind: &str, field: &str, value: &'a Option<String>) -> PipelogResult<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| PipelogError::missing_field(kind, field))
}
