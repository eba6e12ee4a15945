//! Audit entry domain entities
//!
//! This module defines the core audit types for tracking every mutation
//! performed through the directory layer, plus changes detected to have
//! happened outside of it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Actions that can be recorded in the audit log
///
/// Each action represents a significant operation that should be tracked
/// for accountability and later review. The serialized names are the wire
/// format of the log store and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A user's password was reset
    PasswordReset,
    /// A user account was enabled
    AccountEnable,
    /// A user account was disabled
    AccountDisable,
    /// A user was added to a group
    GroupAdd,
    /// A user was removed from a group
    GroupRemove,
    /// A computer account was enabled
    ComputerEnable,
    /// A computer account was disabled
    ComputerDisable,
    /// A computer was added to a group
    ComputerGroupAdd,
    /// A computer was removed from a group
    ComputerGroupRemove,
    /// A member was added to a group (group-centric view)
    MemberAdd,
    /// A member was removed from a group (group-centric view)
    MemberRemove,
    /// A group was created
    GroupCreate,
    /// A group was deleted
    GroupDelete,
    /// A computer was moved to another organizational unit
    ComputerMove,
    /// A change was detected that did not originate here
    AdChangeDetected,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuditAction::PasswordReset => "password_reset",
            AuditAction::AccountEnable => "account_enable",
            AuditAction::AccountDisable => "account_disable",
            AuditAction::GroupAdd => "group_add",
            AuditAction::GroupRemove => "group_remove",
            AuditAction::ComputerEnable => "computer_enable",
            AuditAction::ComputerDisable => "computer_disable",
            AuditAction::ComputerGroupAdd => "computer_group_add",
            AuditAction::ComputerGroupRemove => "computer_group_remove",
            AuditAction::MemberAdd => "member_add",
            AuditAction::MemberRemove => "member_remove",
            AuditAction::GroupCreate => "group_create",
            AuditAction::GroupDelete => "group_delete",
            AuditAction::ComputerMove => "computer_move",
            AuditAction::AdChangeDetected => "ad_change_detected",
        };
        write!(f, "{}", s)
    }
}

/// Where an audited change originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSource {
    /// The change was performed through this system
    WebApp,
    /// The change happened elsewhere and was detected after the fact
    AdDetected,
}

impl std::fmt::Display for AuditSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuditSource::WebApp => "web_app",
            AuditSource::AdDetected => "ad_detected",
        };
        write!(f, "{}", s)
    }
}

/// The kind of object an audited action targeted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    User,
    Computer,
    Group,
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TargetType::User => "user",
            TargetType::Computer => "computer",
            TargetType::Group => "group",
        };
        write!(f, "{}", s)
    }
}

/// An audit log entry recording a significant operation
///
/// Entries are immutable once created; the store only ever appends them.
/// The identifier embeds the creation instant so lexicographic order of
/// ids matches chronological order within a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique, time-ordered identifier for this entry
    id: String,
    /// When the action occurred
    timestamp: DateTime<Utc>,
    /// The type of action that was performed
    action: AuditAction,
    /// Where the change originated
    source: AuditSource,
    /// Account name of whoever performed the action
    performed_by: String,
    /// Name of the object acted upon
    target_object: String,
    /// Kind of the object acted upon
    target_type: TargetType,
    /// Additional structured details about the action
    details: Value,
    /// Whether the action succeeded
    success: bool,
    /// Error message when the action failed
    error_message: Option<String>,
}

impl AuditEntry {
    /// Creates a new successful audit entry with a fresh id and timestamp.
    ///
    /// # Arguments
    ///
    /// * `action` - The type of action being recorded
    /// * `source` - Where the change originated
    /// * `performed_by` - Who performed the action
    /// * `target_object` - The object acted upon
    /// * `target_type` - The kind of that object
    pub fn new(
        action: AuditAction,
        source: AuditSource,
        performed_by: impl Into<String>,
        target_object: impl Into<String>,
        target_type: TargetType,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: format!("{}-{}", now.format("%Y%m%d%H%M%S%f"), Uuid::new_v4().simple()),
            timestamp: now,
            action,
            source,
            performed_by: performed_by.into(),
            target_object: target_object.into(),
            target_type,
            details: Value::Null,
            success: true,
            error_message: None,
        }
    }

    /// Returns the entry id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns when the action occurred
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the action type
    pub fn action(&self) -> AuditAction {
        self.action
    }

    /// Returns where the change originated
    pub fn source(&self) -> AuditSource {
        self.source
    }

    /// Returns who performed the action
    pub fn performed_by(&self) -> &str {
        &self.performed_by
    }

    /// Returns the object acted upon
    pub fn target_object(&self) -> &str {
        &self.target_object
    }

    /// Returns the kind of the object acted upon
    pub fn target_type(&self) -> TargetType {
        self.target_type
    }

    /// Returns the additional details
    pub fn details(&self) -> &Value {
        &self.details
    }

    /// Returns whether the action succeeded
    pub fn success(&self) -> bool {
        self.success
    }

    /// Returns the error message if the action failed
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Sets additional details for this audit entry
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Marks this entry as failed with the given error message
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.success = false;
        self.error_message = Some(message.into());
        self
    }
}
