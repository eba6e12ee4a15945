//! Port traits (hexagonal architecture)
//!
//! Ports define the interfaces between the domain and the outside world.
//! Adapters in other crates implement them.

pub mod audit_sink;

pub use audit_sink::AuditSink;
