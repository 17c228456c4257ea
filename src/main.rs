use anyhow::{Context, Result};
use std::io::BufRead;
use std::path::PathBuf;

use pipelog::config::ConfigLoader;
use pipelog::logging::{LogContext, LoggingSetup};
use pipelog::pipeline::{PipelineBuilder, Strategy};

/// 从标准输入逐行读取消息，交给配置好的日志器处理
///
/// 用法: `pipelog [配置文件]`，未指定时读取当前目录下的 `pipelog.toml`。
fn main() -> Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);

    // 初始化配置
    let config = ConfigLoader::init(config_path.as_deref()).context("加载配置失败")?;

    // 初始化诊断日志，守卫需要保持到程序结束
    let _guard = LoggingSetup::init(&config.logging)?;
    ConfigLoader::report(config);

    tracing::info!("🚀 启动 Pipelog v{}", config.environment.version);
    tracing::debug!("\n{}", ConfigLoader::summary(config));

    let logger = match PipelineBuilder::build(&config.pipeline) {
        Ok(logger) => logger,
        Err(e) => {
            if e.should_log() {
                tracing::error!(code = e.error_code(), "构建日志器失败: {}", e);
            }
            return Err(e).context("构建日志器失败");
        }
    };

    let mut delivered = 0usize;
    let mut suppressed = 0usize;
    let trace_id = LogContext::new().trace_id;

    for (index, line) in std::io::stdin().lock().lines().enumerate() {
        let line = line.context("读取标准输入失败")?;
        let aux = LogContext::new()
            .with_trace_id(trace_id.clone())
            .with_source("stdin")
            .with_field("line", (index + 1).to_string())
            .into_aux_data();

        if logger.log(&line, &aux) {
            delivered += 1;
        } else {
            suppressed += 1;
        }
    }

    tracing::info!(delivered, suppressed, "输入处理完成");
    Ok(())
}
