//! Audit log query model
//!
//! A query is an AND-conjunction of optional predicates. Enum-typed fields
//! match exactly; the name fields match case-insensitive substrings; the
//! date range is inclusive and compares only the date portion, so a range
//! of one day covers that whole day.

use chrono::NaiveDate;

use adgate_core::domain::{AuditAction, AuditEntry, AuditSource, TargetType};

/// Default page size for log queries.
const DEFAULT_LIMIT: usize = 100;

/// Filter and paging parameters for [`AuditStore::get_logs`].
///
/// [`AuditStore::get_logs`]: crate::store::AuditStore::get_logs
#[derive(Debug, Clone)]
pub struct LogQuery {
    pub action: Option<AuditAction>,
    pub source: Option<AuditSource>,
    pub target_type: Option<TargetType>,
    pub target_object: Option<String>,
    pub performed_by: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Free text matched against target, performer and action name.
    pub search: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            action: None,
            source: None,
            target_type: None,
            target_object: None,
            performed_by: None,
            date_from: None,
            date_to: None,
            search: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl LogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_action(mut self, action: AuditAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_source(mut self, source: AuditSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_target_type(mut self, target_type: TargetType) -> Self {
        self.target_type = Some(target_type);
        self
    }

    pub fn with_target_object(mut self, target: impl Into<String>) -> Self {
        self.target_object = Some(target.into());
        self
    }

    pub fn with_performed_by(mut self, performer: impl Into<String>) -> Self {
        self.performed_by = Some(performer.into());
        self
    }

    pub fn with_date_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Whether `entry` satisfies every set predicate.
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(action) = self.action {
            if entry.action() != action {
                return false;
            }
        }
        if let Some(source) = self.source {
            if entry.source() != source {
                return false;
            }
        }
        if let Some(target_type) = self.target_type {
            if entry.target_type() != target_type {
                return false;
            }
        }
        if let Some(target) = &self.target_object {
            if !contains_ci(entry.target_object(), target) {
                return false;
            }
        }
        if let Some(performer) = &self.performed_by {
            if !contains_ci(entry.performed_by(), performer) {
                return false;
            }
        }

        let entry_date = entry.timestamp().date_naive();
        if let Some(from) = self.date_from {
            if entry_date < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if entry_date > to {
                return false;
            }
        }

        if let Some(text) = &self.search {
            let haystack = format!(
                "{} {} {}",
                entry.target_object(),
                entry.performed_by(),
                entry.action()
            );
            if !contains_ci(&haystack, text) {
                return false;
            }
        }

        true
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// One page of matching log entries.
#[derive(Debug, Clone)]
pub struct LogPage {
    /// The requested slice, newest first.
    pub entries: Vec<AuditEntry>,
    /// Matching entries before paging.
    pub total_count: usize,
    pub limit: usize,
    pub offset: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(action: AuditAction, performer: &str, target: &str) -> AuditEntry {
        AuditEntry::new(
            action,
            AuditSource::WebApp,
            performer,
            target,
            TargetType::User,
        )
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let q = LogQuery::new();
        assert!(q.matches(&entry(AuditAction::PasswordReset, "admin", "alice")));
    }

    #[test]
    fn test_action_is_exact() {
        let q = LogQuery::new().with_action(AuditAction::PasswordReset);
        assert!(q.matches(&entry(AuditAction::PasswordReset, "admin", "alice")));
        assert!(!q.matches(&entry(AuditAction::AccountDisable, "admin", "alice")));
    }

    #[test]
    fn test_target_is_case_insensitive_substring() {
        let q = LogQuery::new().with_target_object("ALI");
        assert!(q.matches(&entry(AuditAction::PasswordReset, "admin", "alice")));
        assert!(!q.matches(&entry(AuditAction::PasswordReset, "admin", "bob")));
    }

    #[test]
    fn test_performer_substring() {
        let q = LogQuery::new().with_performed_by("adm");
        assert!(q.matches(&entry(AuditAction::PasswordReset, "Admin", "alice")));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let e = entry(AuditAction::PasswordReset, "admin", "alice");
        let today = e.timestamp().date_naive();

        let q = LogQuery::new().with_date_range(Some(today), Some(today));
        assert!(q.matches(&e));

        let q = LogQuery::new().with_date_range(Some(today.succ_opt().unwrap()), None);
        assert!(!q.matches(&e));
    }

    #[test]
    fn test_free_text_covers_action_name() {
        let q = LogQuery::new().with_search("password_reset");
        assert!(q.matches(&entry(AuditAction::PasswordReset, "admin", "alice")));
        assert!(!q.matches(&entry(AuditAction::GroupAdd, "admin", "alice")));
    }

    #[test]
    fn test_conjunction() {
        let q = LogQuery::new()
            .with_action(AuditAction::PasswordReset)
            .with_performed_by("root");
        assert!(!q.matches(&entry(AuditAction::PasswordReset, "admin", "alice")));
    }
}
