use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Incoming,
    Outgoing,
}

impl Channel {
    pub fn file_name(self) -> &'static str {
        match self {
            Channel::Incoming => "incoming.log",
            Channel::Outgoing => "outgoing.log",
        }
    }
}

/// Best-effort diagnostic sink. A failed append must never affect the
/// webhook response.
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn append(&self, channel: Channel, message: &str);
}

/// Appends timestamped blocks to per-channel files under a directory.
pub struct FileLogSink {
    dir: PathBuf,
}

impl FileLogSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn try_append(&self, channel: Channel, message: &str) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(channel.file_name());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        let block = format!("---- {} ----\n{message}\n\n", Utc::now().to_rfc3339());
        file.write_all(block.as_bytes()).await?;
        Ok(())
    }
}

#[async_trait]
impl LogSink for FileLogSink {
    async fn append(&self, channel: Channel, message: &str) {
        if let Err(e) = self.try_append(channel, message).await {
            tracing::warn!("Failed to append to {}: {e}", channel.file_name());
        }
    }
}

/// Used when debug logging is off or file access is unavailable.
pub struct NoopLogSink;

#[async_trait]
impl LogSink for NoopLogSink {
    async fn append(&self, _channel: Channel, _message: &str) {}
}
