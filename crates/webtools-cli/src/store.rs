//! Per-tool history files under one directory.

use std::path::{Path, PathBuf};

use webtools_common::{HistoryItem, HistoryLog, StorageKey};

#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
    capacity: usize,
}

impl HistoryStore {
    pub fn new(dir: impl Into<PathBuf>, capacity: usize) -> Self {
        Self { dir: dir.into(), capacity }
    }

    /// `~/.webtools/history`
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".webtools").join("history"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, key: StorageKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }

    pub fn load(&self, key: StorageKey) -> webtools_common::Result<HistoryLog> {
        HistoryLog::load(self.path(key), self.capacity)
    }

    pub fn save(&self, key: StorageKey, log: &HistoryLog) -> webtools_common::Result<()> {
        log.save(self.path(key))
    }

    pub fn record(&self, key: StorageKey, item: HistoryItem) -> webtools_common::Result<()> {
        let mut log = self.load(key)?;
        log.push(item);
        self.save(key, &log)?;
        tracing::debug!(key = %key, items = log.len(), "Recorded history");
        Ok(())
    }
}
