//! Append-only record of exchange commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

#[async_trait]
pub trait CommandLog: Send + Sync {
    async fn append(&self, line: &str) -> Result<()>;
}

/// `<timestamp>: <sender> <raw command>`
pub fn command_entry(at: DateTime<Local>, sender: &str, command: &str) -> String {
    format!("{}: {sender} {command}", at.format(TIMESTAMP_FORMAT))
}

/// Appends each line to a file, creating it on first use.
pub struct FileCommandLog {
    path: PathBuf,
    // Serializes appends so concurrent lines never interleave.
    write_lock: Mutex<()>,
}

impl FileCommandLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CommandLog for FileCommandLog {
    async fn append(&self, line: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("failed to open command log {}", self.path.display()))?;

        let mut entry = String::with_capacity(line.len() + 1);
        entry.push_str(line);
        entry.push('\n');
        file.write_all(entry.as_bytes())
            .await
            .with_context(|| format!("failed to append to {}", self.path.display()))?;
        file.flush().await?;
        Ok(())
    }
}
