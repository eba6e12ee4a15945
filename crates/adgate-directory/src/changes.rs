//! Recent-changes query
//!
//! One bounded search per object type over `whenChanged >= cutoff`, with
//! creations told apart from modifications by `whenCreated == whenChanged`.
//! The raw generalized-time string is fixed-width, so sorting by it is
//! sorting chronologically; that keeps the merge free of timestamp parsing.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use adgate_core::domain::filetime;
use adgate_core::domain::{AttributeBag, DirectoryError, TargetType};

use crate::client::DirectoryClient;
use crate::filter;

/// Which object types a recent-changes query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeScope {
    All,
    Users,
    Computers,
    Groups,
}

impl ChangeScope {
    /// Object classes to search, paired with their target type.
    fn classes(self) -> Vec<(&'static str, TargetType)> {
        match self {
            ChangeScope::All => vec![
                ("user", TargetType::User),
                ("computer", TargetType::Computer),
                ("group", TargetType::Group),
            ],
            ChangeScope::Users => vec![("user", TargetType::User)],
            ChangeScope::Computers => vec![("computer", TargetType::Computer)],
            ChangeScope::Groups => vec![("group", TargetType::Group)],
        }
    }
}

/// Whether an entry was created or merely modified inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Modified,
}

/// One object changed within the queried window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentChange {
    pub name: String,
    pub object_type: TargetType,
    pub change: ChangeKind,
    pub distinguished_name: String,
    /// Raw `whenChanged` value, kept for ordering.
    pub when_changed: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Builds a change record from a search entry. `None` when the entry lacks
/// the attributes needed to place it in the timeline.
fn change_from_bag(bag: &AttributeBag, object_type: TargetType) -> Option<RecentChange> {
    let name = bag
        .first("cn")
        .or_else(|| bag.first("sAMAccountName"))?
        .to_string();
    let when_changed = bag.first("whenChanged")?.to_string();
    let change = match bag.first("whenCreated") {
        Some(created) if created == when_changed => ChangeKind::Created,
        _ => ChangeKind::Modified,
    };
    Some(RecentChange {
        name,
        object_type,
        change,
        distinguished_name: bag.dn().to_string(),
        timestamp: filetime::parse_generalized_time(&when_changed),
        when_changed,
    })
}

impl DirectoryClient {
    /// Lists objects created or modified within the last `hours` hours,
    /// newest first.
    pub async fn get_recent_changes(
        &mut self,
        hours: i64,
        scope: ChangeScope,
    ) -> Result<Vec<RecentChange>, DirectoryError> {
        let cutoff = filetime::to_generalized_time(Utc::now() - Duration::hours(hours));
        let attrs = vec!["cn", "sAMAccountName", "whenCreated", "whenChanged"];

        let mut changes = Vec::new();
        for (object_class, object_type) in scope.classes() {
            let filter = filter::changed_since(object_class, &cutoff);
            let bags = self.search(&filter, attrs.clone()).await?;
            for bag in &bags {
                match change_from_bag(bag, object_type) {
                    Some(change) => changes.push(change),
                    None => warn!(dn = bag.dn(), "change entry without usable timestamps"),
                }
            }
        }

        changes.sort_by(|a, b| b.when_changed.cmp(&a.when_changed));
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(name: &str, created: &str, changed: &str) -> AttributeBag {
        AttributeBag::new(
            format!("CN={name},DC=example,DC=com"),
            [
                ("cn".to_string(), vec![name.to_string()]),
                ("whenCreated".to_string(), vec![created.to_string()]),
                ("whenChanged".to_string(), vec![changed.to_string()]),
            ],
        )
    }

    #[test]
    fn test_equal_timestamps_classify_as_created() {
        let change =
            change_from_bag(&bag("A", "20240101120000.0Z", "20240101120000.0Z"), TargetType::User)
                .unwrap();
        assert_eq!(change.change, ChangeKind::Created);
    }

    #[test]
    fn test_differing_timestamps_classify_as_modified() {
        let change =
            change_from_bag(&bag("A", "20240101120000.0Z", "20240301080000.0Z"), TargetType::User)
                .unwrap();
        assert_eq!(change.change, ChangeKind::Modified);
        assert!(change.timestamp.is_some());
    }

    #[test]
    fn test_missing_when_changed_yields_none() {
        let bag = AttributeBag::new(
            "CN=A,DC=example,DC=com",
            [("cn".to_string(), vec!["A".to_string()])],
        );
        assert!(change_from_bag(&bag, TargetType::Group).is_none());
    }

    #[test]
    fn test_name_falls_back_to_account_name() {
        let bag = AttributeBag::new(
            "CN=PC1,DC=example,DC=com",
            [
                ("sAMAccountName".to_string(), vec!["PC1$".to_string()]),
                ("whenChanged".to_string(), vec!["20240101120000.0Z".to_string()]),
            ],
        );
        let change = change_from_bag(&bag, TargetType::Computer).unwrap();
        assert_eq!(change.name, "PC1$");
    }

    #[test]
    fn test_generalized_time_strings_sort_chronologically() {
        let mut values = vec!["20240301080000.0Z", "20230601120000.0Z", "20241231235959.0Z"];
        values.sort_by(|a, b| b.cmp(a));
        assert_eq!(
            values,
            vec!["20241231235959.0Z", "20240301080000.0Z", "20230601120000.0Z"]
        );
    }
}
