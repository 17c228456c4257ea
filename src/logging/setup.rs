// 日志系统设置
// 程序自身的诊断输出，与管道输出的消息相互独立

use crate::config::LoggingConfig;
use anyhow::Result;

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

#[cfg(feature = "file")]
use tracing_appender::non_blocking::WorkerGuard;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// 日志系统守卫
///
/// 启用文件日志时必须在程序运行期间持有，丢弃后后台写线程会刷新并退出。
#[derive(Default)]
pub struct LoggingGuard {
    #[cfg(feature = "file")]
    _file: Option<WorkerGuard>,
}

/// 日志系统初始化器
pub struct LoggingSetup;

impl LoggingSetup {
    /// 初始化日志系统
    ///
    /// 诊断日志写到标准错误，标准输出留给控制台输出端。
    pub fn init(config: &LoggingConfig) -> Result<LoggingGuard> {
        // 创建环境过滤器
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        #[allow(unused_mut)]
        let mut layers: Vec<BoxedLayer> = vec![Self::format_layer(&config.format, std::io::stderr, true)];

        #[allow(unused_mut)]
        let mut guard = LoggingGuard::default();

        if config.file_enabled {
            #[cfg(feature = "file")]
            {
                let (writer, file_guard) = Self::file_writer(config)?;
                layers.push(Self::format_layer(&config.format, writer, false));
                guard._file = Some(file_guard);
            }
            #[cfg(not(feature = "file"))]
            anyhow::bail!("文件日志需要启用 `file` 特性");
        }

        tracing_subscriber::registry()
            .with(layers)
            .with(env_filter)
            .try_init()?;

        tracing::info!("日志系统初始化完成");
        tracing::info!("日志级别: {}", config.level);
        tracing::info!("日志格式: {}", config.format);

        if config.file_enabled {
            tracing::info!("文件日志已启用: {:?}", config.file_path);
        }

        Ok(guard)
    }

    fn format_layer<W>(format: &str, writer: W, ansi: bool) -> BoxedLayer
    where
        W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
    {
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(true);

        match format {
            "json" => layer
                .json()
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
            "pretty" => layer
                .pretty()
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
            "compact" => layer.compact().boxed(),
            _ => layer
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
        }
    }

    #[cfg(feature = "file")]
    fn file_writer(
        config: &LoggingConfig,
    ) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
        use std::path::Path;
        use tracing_appender::rolling::{RollingFileAppender, Rotation};

        let path = config
            .file_path
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("启用文件日志时必须指定日志文件路径"))?;
        let path = Path::new(path);
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow::anyhow!("无效的日志文件路径: {}", path.display()))?;

        std::fs::create_dir_all(directory)?;
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(file_name)
            .build(directory)?;

        Ok(tracing_appender::non_blocking(appender))
    }

    /// 解析日志级别
    pub fn parse_level(level: &str) -> Level {
        match level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// 创建开发环境日志配置
    pub fn development_config() -> LoggingConfig {
        LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
            file_enabled: false,
            file_path: None,
        }
    }

    /// 创建生产环境日志配置
    pub fn production_config() -> LoggingConfig {
        LoggingConfig {
            level: "info".to_string(),
            format: "json".to_string(),
            file_enabled: true,
            file_path: Some("./logs/pipelog.log".to_string()),
        }
    }

    /// 创建测试环境日志配置
    pub fn test_config() -> LoggingConfig {
        LoggingConfig {
            level: "warn".to_string(),
            format: "compact".to_string(),
            file_enabled: false,
            file_path: None,
        }
    }
}
