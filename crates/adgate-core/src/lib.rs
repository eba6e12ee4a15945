//! adgate Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `User`, `Computer`, `Group`, `GroupMember`, `AuditEntry`
//! - **Attribute decoding** - typed mapping from raw directory attribute bags
//! - **Codecs** - AD FILETIME timestamps, `userAccountControl` bit flags
//! - **Port definitions** - `AuditSink`, implemented by the audit adapter crate
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure decode and aggregation logic with no
//! protocol dependencies. The LDAP adapter (`adgate-directory`) and the
//! audit persistence adapter (`adgate-audit`) build on these types.

pub mod config;
pub mod domain;
pub mod ports;
