// 内置输出端

use crate::pipeline::Sink;
use pipelog_common::{AuxData, aux_to_json};
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{Level, warn};

/// 控制台输出目标
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Stderr,
}

/// 写到标准输出或标准错误，每条消息一行
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink {
    target: ConsoleTarget,
}

impl ConsoleSink {
    pub fn stdout() -> Self {
        Self {
            target: ConsoleTarget::Stdout,
        }
    }

    pub fn stderr() -> Self {
        Self {
            target: ConsoleTarget::Stderr,
        }
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }
}

impl Sink for ConsoleSink {
    fn deliver(&self, message: &str, _aux: &AuxData) {
        let result = match self.target {
            ConsoleTarget::Stdout => writeln!(std::io::stdout().lock(), "{}", message),
            ConsoleTarget::Stderr => writeln!(std::io::stderr().lock(), "{}", message),
        };
        if let Err(e) = result {
            warn!(sink = self.name(), "控制台输出失败: {}", e);
        }
    }

    fn name(&self) -> &str {
        match self.target {
            ConsoleTarget::Stdout => "console",
            ConsoleTarget::Stderr => "stderr",
        }
    }
}

/// 把消息作为 `tracing` 事件重新发出，附加数据以 JSON 形式放在 `aux` 字段
#[derive(Debug, Clone, Copy)]
pub struct TracingSink {
    level: Level,
}

impl TracingSink {
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

impl Sink for TracingSink {
    fn deliver(&self, message: &str, aux: &AuxData) {
        let aux = aux_to_json(aux);
        match self.level {
            Level::ERROR => tracing::error!(target: "pipelog::sink", aux = %aux, "{}", message),
            Level::WARN => tracing::warn!(target: "pipelog::sink", aux = %aux, "{}", message),
            Level::INFO => tracing::info!(target: "pipelog::sink", aux = %aux, "{}", message),
            Level::DEBUG => tracing::debug!(target: "pipelog::sink", aux = %aux, "{}", message),
            _ => tracing::trace!(target: "pipelog::sink", aux = %aux, "{}", message),
        }
    }

    fn name(&self) -> &str {
        "tracing"
    }
}

/// 内存中保存的一条已输出消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub message: String,
    pub aux: AuxData,
}

/// 把消息保存在内存中
///
/// 克隆出的句柄共享同一份记录，可以在把输出端交给策略之后继续读取。
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<Record>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Record> {
        self.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|record| record.message.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Record>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sink for MemorySink {
    fn deliver(&self, message: &str, aux: &AuxData) {
        self.lock().push(Record {
            message: message.to_string(),
            aux: aux.clone(),
        });
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// 用闭包实现的输出端
pub struct FnSink<F> {
    name: String,
    deliver: F,
}

impl<F> FnSink<F>
where
    F: Fn(&str, &AuxData) + Send + Sync,
{
    pub fn new(name: impl Into<String>, deliver: F) -> Self {
        Self {
            name: name.into(),
            deliver,
        }
    }
}

impl<F> Sink for FnSink<F>
where
    F: Fn(&str, &AuxData) + Send + Sync,
{
    fn deliver(&self, message: &str, aux: &AuxData) {
        (self.deliver)(message, aux)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(feature = "file")]
pub use file::{FileRotation, FileSink};

#[cfg(feature = "file")]
mod file {
    use super::*;
    use crate::errors::PipelogError;
    use std::path::Path;
    use tracing_appender::rolling::{RollingFileAppender, Rotation};

    /// 文件轮转策略
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub enum FileRotation {
        #[default]
        Never,
        Hourly,
        Daily,
    }

    impl FileRotation {
        /// 解析配置中的轮转名称
        pub fn parse(value: &str) -> Option<Self> {
            match value.to_lowercase().as_str() {
                "never" => Some(Self::Never),
                "hourly" => Some(Self::Hourly),
                "daily" => Some(Self::Daily),
                _ => None,
            }
        }

        fn into_rotation(self) -> Rotation {
            match self {
                Self::Never => Rotation::NEVER,
                Self::Hourly => Rotation::HOURLY,
                Self::Daily => Rotation::DAILY,
            }
        }
    }

    /// 追加写入文件，每条消息一行
    pub struct FileSink {
        name: String,
        writer: Mutex<RollingFileAppender>,
    }

    impl FileSink {
        /// 打开 `path` 指向的文件，按需创建父目录
        ///
        /// 启用轮转时 `path` 的文件名作为前缀，实际文件名会带上日期后缀。
        pub fn open(path: impl AsRef<Path>, rotation: FileRotation) -> Result<Self, PipelogError> {
            let path = path.as_ref();
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| {
                    PipelogError::sink("file", format!("无效的文件路径: {}", path.display()))
                })?;
            let directory = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            std::fs::create_dir_all(directory)?;

            let writer = RollingFileAppender::builder()
                .rotation(rotation.into_rotation())
                .filename_prefix(file_name)
                .build(directory)
                .map_err(|e| PipelogError::sink("file", e.to_string()))?;

            Ok(Self {
                name: format!("file:{}", path.display()),
                writer: Mutex::new(writer),
            })
        }
    }

    impl Sink for FileSink {
        fn deliver(&self, message: &str, _aux: &AuxData) {
            let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = writeln!(writer, "{}", message).and_then(|_| writer.flush()) {
                warn!(sink = %self.name, "文件输出失败: {}", e);
            }
        }

        fn name(&self) -> &str {
            &self.name
        }
    }
}
