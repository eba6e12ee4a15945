//! Audit sink implementations
//!
//! Three backends for the same port: a whole-file JSON array (the primary
//! store, human-inspectable), an append-only JSON-lines segment log, and an
//! in-memory sink for tests. All of them skip individual records that fail
//! to deserialize; a reader must never lose the whole trail to one corrupt
//! entry.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use async_trait::async_trait;
use tracing::warn;

use adgate_core::domain::AuditEntry;
use adgate_core::ports::AuditSink;

/// Whole-file JSON array sink.
///
/// Every append rewrites the file; concurrent writers are not supported.
/// Suited to the single-service deployment this store is built for.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AuditSink for JsonFileSink {
    async fn load(&self) -> anyhow::Result<Vec<AuditEntry>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Ok(Vec::new()),
        };
        let values: Vec<serde_json::Value> = match serde_json::from_str(&content) {
            Ok(values) => values,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "audit file unreadable, treating as empty");
                return Ok(Vec::new());
            }
        };
        Ok(values
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "skipping corrupt audit record");
                    None
                }
            })
            .collect())
    }

    async fn store(&self, entries: &[AuditEntry]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating audit directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("writing audit file {}", self.path.display()))?;
        Ok(())
    }

    async fn append(&self, entry: &AuditEntry) -> anyhow::Result<()> {
        let mut entries = self.load().await?;
        entries.push(entry.clone());
        self.store(&entries).await
    }
}

/// Append-only JSON-lines sink, one entry per line.
///
/// Appends never touch existing bytes, so a crash mid-write can damage at
/// most the final line, which `load` then skips.
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AuditSink for JsonlSink {
    async fn load(&self) -> anyhow::Result<Vec<AuditEntry>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Ok(Vec::new()),
        };
        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "skipping corrupt audit line");
                    None
                }
            })
            .collect())
    }

    async fn store(&self, entries: &[AuditEntry]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating audit directory {}", parent.display()))?;
        }
        let mut lines = String::new();
        for entry in entries {
            lines.push_str(&serde_json::to_string(entry)?);
            lines.push('\n');
        }
        std::fs::write(&self.path, lines)
            .with_context(|| format!("writing audit file {}", self.path.display()))?;
        Ok(())
    }

    async fn append(&self, entry: &AuditEntry) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating audit directory {}", parent.display()))?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening audit file {}", self.path.display()))?;
        let line = serde_json::to_string(entry)?;
        writeln!(file, "{line}")
            .with_context(|| format!("appending to audit file {}", self.path.display()))?;
        Ok(())
    }
}

/// In-memory sink for tests.
#[derive(Default)]
pub struct MemorySink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditSink for MemorySink {
    async fn load(&self) -> anyhow::Result<Vec<AuditEntry>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("audit sink lock poisoned"))?;
        Ok(entries.clone())
    }

    async fn store(&self, new_entries: &[AuditEntry]) -> anyhow::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("audit sink lock poisoned"))?;
        *entries = new_entries.to_vec();
        Ok(())
    }

    async fn append(&self, entry: &AuditEntry) -> anyhow::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("audit sink lock poisoned"))?;
        entries.push(entry.clone());
        Ok(())
    }
}
