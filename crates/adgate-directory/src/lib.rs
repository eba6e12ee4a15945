//! LDAP directory adapter
//!
//! Implements the directory side of the system over the `ldap3` crate:
//! session lifecycle, search and decode plumbing, name-to-DN resolution,
//! and every supported mutation. All methods live on [`DirectoryClient`],
//! split across modules by the kind of object they operate on.

pub mod changes;
pub mod client;
pub mod dashboard;
pub mod filter;
pub mod password;

mod computers;
mod groups;
mod users;

pub use changes::{ChangeScope, RecentChange};
pub use client::DirectoryClient;
pub use dashboard::{DashboardStats, ExpiringPassword};
