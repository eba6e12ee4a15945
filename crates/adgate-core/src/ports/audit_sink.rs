//! Audit persistence port

use async_trait::async_trait;

use crate::domain::AuditEntry;

/// Persistence backend for audit entries.
///
/// The store treats the backing medium as append-mostly: entries are added
/// one at a time and read back in bulk for queries. Implementations decide
/// whether `append` rewrites the whole store or extends it.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Loads every entry currently persisted.
    ///
    /// A missing or unreadable store is an empty one, not an error: the
    /// audit trail must never block the operations it records. Entries
    /// that fail to deserialize are skipped.
    async fn load(&self) -> anyhow::Result<Vec<AuditEntry>>;

    /// Replaces the persisted entries with exactly `entries`.
    async fn store(&self, entries: &[AuditEntry]) -> anyhow::Result<()>;

    /// Persists one new entry.
    ///
    /// Whole-file backends implement this as load, push, store; segment
    /// backends append a single record. Write failures propagate to the
    /// caller.
    async fn append(&self, entry: &AuditEntry) -> anyhow::Result<()>;
}
