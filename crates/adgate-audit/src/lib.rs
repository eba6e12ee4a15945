//! Audit log store
//!
//! Persists immutable [`AuditEntry`](adgate_core::domain::AuditEntry)
//! records through an injectable sink and answers filtered queries and
//! aggregate statistics over them. The trail is append-only: nothing in
//! this crate rewrites or deletes an existing entry.

pub mod query;
pub mod sink;
pub mod store;

pub use query::{LogPage, LogQuery};
pub use sink::{JsonFileSink, JsonlSink, MemorySink};
pub use store::{AuditStatistics, AuditStore};
