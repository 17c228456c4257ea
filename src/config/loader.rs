// 配置加载器
// 处理配置文件加载和环境变量解析

use crate::config::AppConfig;
use crate::errors::PipelogError;
use dotenvy::dotenv;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

/// 全局配置实例
static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// 加载到的 .env 文件，未找到时为 `None`
static ENV_FILE: OnceLock<Option<PathBuf>> = OnceLock::new();

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 初始化配置
    ///
    /// 指定 `path` 时只读取该文件，否则读取当前目录下的 `pipelog.toml`（如果存在）。
    ///
    /// 此时诊断日志通常尚未初始化，加载结果由 [`ConfigLoader::report`] 输出。
    pub fn init(path: Option<&Path>) -> Result<&'static AppConfig, PipelogError> {
        // 加载 .env 文件
        let _ = ENV_FILE.set(dotenv().ok());

        let config = match path {
            Some(path) => AppConfig::load_from(path)?,
            None => AppConfig::load()?,
        };

        config.validate()?;

        CONFIG
            .set(config)
            .map_err(|_| PipelogError::internal("配置已经初始化"))?;
        Self::get().ok_or_else(|| PipelogError::internal("配置未初始化"))
    }

    /// 输出配置加载结果，需在诊断日志初始化之后调用
    pub fn report(config: &AppConfig) {
        match ENV_FILE.get() {
            Some(Some(path)) => info!("已加载 .env 文件: {}", path.display()),
            _ => debug!("未找到 .env 文件"),
        }

        info!("配置加载成功");
        info!("环境: {}", config.environment.name);
        info!("版本: {}", config.environment.version);
        info!(
            "日志器: {} ({} 个子策略)",
            config.pipeline.name,
            config.pipeline.strategies.len()
        );
    }

    /// 获取配置
    pub fn get() -> Option<&'static AppConfig> {
        CONFIG.get()
    }

    /// 打印配置摘要
    pub fn summary(config: &AppConfig) -> String {
        let mut lines = vec![
            "=== Pipelog 配置摘要 ===".to_string(),
            format!("环境: {}", config.environment.name),
            format!("版本: {}", config.environment.version),
            format!("调试模式: {}", config.environment.debug),
            format!("诊断日志: {} / {}", config.logging.level, config.logging.format),
            format!("日志器: {}", config.pipeline.name),
        ];
        for strategy in &config.pipeline.strategies {
            lines.push(format!(
                "  - {} ({} 个变换器, {} 个过滤器)",
                strategy.name.as_deref().unwrap_or(&strategy.kind),
                strategy.mutators.len(),
                strategy.filters.len()
            ));
        }
        lines.push("========================".to_string());
        lines.join("\n")
    }
}
