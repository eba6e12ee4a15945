//! Audit store service

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use adgate_core::domain::{AuditAction, AuditEntry, AuditSource, TargetType};
use adgate_core::ports::AuditSink;

use crate::query::{LogPage, LogQuery};

/// Aggregate view over the whole trail.
#[derive(Debug, Clone)]
pub struct AuditStatistics {
    pub total_actions: usize,
    pub actions_by_type: BTreeMap<String, usize>,
    pub actions_by_source: BTreeMap<String, usize>,
    pub actions_by_user: BTreeMap<String, usize>,
    /// Percentage of successful actions, rounded to two decimals.
    /// `0.0` for an empty trail.
    pub success_rate: f64,
    /// The ten most recent entries, newest first.
    pub recent: Vec<AuditEntry>,
}

/// Records and queries audit entries through an injected sink.
#[derive(Clone)]
pub struct AuditStore {
    sink: Arc<dyn AuditSink>,
}

impl AuditStore {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Records one entry and returns it.
    ///
    /// Sink write failures propagate: an action whose audit record cannot
    /// be persisted must be visible as a failure to the caller.
    #[allow(clippy::too_many_arguments)]
    pub async fn log(
        &self,
        action: AuditAction,
        source: AuditSource,
        performed_by: &str,
        target_object: &str,
        target_type: TargetType,
        details: Value,
        success: bool,
        error_message: Option<String>,
    ) -> anyhow::Result<AuditEntry> {
        let mut entry = AuditEntry::new(action, source, performed_by, target_object, target_type)
            .with_details(details);
        if !success {
            entry = entry.with_failure(error_message.unwrap_or_default());
        }

        self.sink.append(&entry).await?;
        debug!(id = entry.id(), action = %entry.action(), "audit entry recorded");
        Ok(entry)
    }

    /// Records a password reset performed through the system.
    pub async fn log_password_reset(
        &self,
        performed_by: &str,
        target: &str,
        success: bool,
        error: Option<String>,
    ) -> anyhow::Result<AuditEntry> {
        self.log(
            AuditAction::PasswordReset,
            AuditSource::WebApp,
            performed_by,
            target,
            TargetType::User,
            json!({"action": "password reset"}),
            success,
            error,
        )
        .await
    }

    /// Records an enable/disable toggle on a user or computer account.
    pub async fn log_status_change(
        &self,
        performed_by: &str,
        target: &str,
        target_type: TargetType,
        enabled: bool,
        success: bool,
        error: Option<String>,
    ) -> anyhow::Result<AuditEntry> {
        let action = match (target_type, enabled) {
            (TargetType::Computer, true) => AuditAction::ComputerEnable,
            (TargetType::Computer, false) => AuditAction::ComputerDisable,
            (_, true) => AuditAction::AccountEnable,
            (_, false) => AuditAction::AccountDisable,
        };
        self.log(
            action,
            AuditSource::WebApp,
            performed_by,
            target,
            target_type,
            json!({"enabled": enabled}),
            success,
            error,
        )
        .await
    }

    /// Records a group membership change on a user or computer.
    #[allow(clippy::too_many_arguments)]
    pub async fn log_membership_change(
        &self,
        performed_by: &str,
        target: &str,
        target_type: TargetType,
        group_name: &str,
        added: bool,
        success: bool,
        error: Option<String>,
    ) -> anyhow::Result<AuditEntry> {
        let action = match (target_type, added) {
            (TargetType::Computer, true) => AuditAction::ComputerGroupAdd,
            (TargetType::Computer, false) => AuditAction::ComputerGroupRemove,
            (_, true) => AuditAction::GroupAdd,
            (_, false) => AuditAction::GroupRemove,
        };
        self.log(
            action,
            AuditSource::WebApp,
            performed_by,
            target,
            target_type,
            json!({"group": group_name, "added": added}),
            success,
            error,
        )
        .await
    }

    /// Records a change detected to have happened outside this system.
    pub async fn log_ad_change_detected(
        &self,
        detected_by: &str,
        target: &str,
        target_type: TargetType,
        change_type: &str,
    ) -> anyhow::Result<AuditEntry> {
        self.log(
            AuditAction::AdChangeDetected,
            AuditSource::AdDetected,
            detected_by,
            target,
            target_type,
            json!({"change_type": change_type}),
            true,
            None,
        )
        .await
    }

    /// Queries the trail, newest first, with AND-conjunction filters and
    /// offset/limit paging.
    pub async fn get_logs(&self, query: &LogQuery) -> anyhow::Result<LogPage> {
        let mut entries = self.sink.load().await?;
        entries.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));

        let matching: Vec<AuditEntry> = entries
            .into_iter()
            .filter(|entry| query.matches(entry))
            .collect();
        let total_count = matching.len();

        let entries: Vec<AuditEntry> = matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect();

        Ok(LogPage {
            entries,
            total_count,
            limit: query.limit,
            offset: query.offset,
        })
    }

    /// Aggregates the whole trail.
    pub async fn get_statistics(&self) -> anyhow::Result<AuditStatistics> {
        let mut entries = self.sink.load().await?;
        entries.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));

        let total_actions = entries.len();
        let mut actions_by_type: BTreeMap<String, usize> = BTreeMap::new();
        let mut actions_by_source: BTreeMap<String, usize> = BTreeMap::new();
        let mut actions_by_user: BTreeMap<String, usize> = BTreeMap::new();
        let mut successes = 0usize;

        for entry in &entries {
            *actions_by_type.entry(entry.action().to_string()).or_default() += 1;
            *actions_by_source.entry(entry.source().to_string()).or_default() += 1;
            *actions_by_user
                .entry(entry.performed_by().to_string())
                .or_default() += 1;
            if entry.success() {
                successes += 1;
            }
        }

        let success_rate = if total_actions == 0 {
            0.0
        } else {
            (successes as f64 / total_actions as f64 * 100.0 * 100.0).round() / 100.0
        };

        entries.truncate(10);

        Ok(AuditStatistics {
            total_actions,
            actions_by_type,
            actions_by_source,
            actions_by_user,
            success_rate,
            recent: entries,
        })
    }
}
