//! Dashboard aggregation
//!
//! The numbers are computed in one pass over lightweight listings fetched
//! without per-user group lookups. The aggregation itself is a pure
//! function over decoded entities, so the math is tested without a server.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use adgate_core::domain::{decode_all, Computer, DirectoryError, User};

use crate::client::DirectoryClient;
use crate::filter;

/// Attributes needed for dashboard math, a strict subset of the listing set.
const DASHBOARD_USER_ATTRS: &[&str] = &[
    "sAMAccountName",
    "displayName",
    "department",
    "pwdLastSet",
    "userAccountControl",
];

const DASHBOARD_COMPUTER_ATTRS: &[&str] =
    &["sAMAccountName", "cn", "operatingSystem", "userAccountControl"];

/// Sentinel bucket for users without a department.
const UNSPECIFIED: &str = "Unspecified";

/// Sentinel bucket for computers without an operating system value.
const UNKNOWN: &str = "Unknown";

/// A user whose password expires within the warn window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiringPassword {
    pub account_name: String,
    pub display_name: String,
    pub days_left: i64,
}

/// Aggregate counts for the overview screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_users: usize,
    pub active_users: usize,
    pub disabled_users: usize,
    pub total_computers: usize,
    pub active_computers: usize,
    pub disabled_computers: usize,
    pub total_groups: usize,
    pub users_by_department: BTreeMap<String, usize>,
    pub computers_by_os: BTreeMap<String, usize>,
    /// Soonest-expiring first, capped.
    pub expiring_passwords: Vec<ExpiringPassword>,
}

/// Computes dashboard numbers from decoded entities.
pub fn aggregate(
    users: &[User],
    computers: &[Computer],
    total_groups: usize,
    now: DateTime<Utc>,
    warn_days: i64,
    expiring_cap: usize,
) -> DashboardStats {
    let mut users_by_department: BTreeMap<String, usize> = BTreeMap::new();
    let mut expiring: Vec<ExpiringPassword> = Vec::new();
    let mut disabled_users = 0;

    for user in users {
        if user.disabled {
            disabled_users += 1;
        }
        let department = user.department.as_deref().unwrap_or(UNSPECIFIED);
        *users_by_department.entry(department.to_string()).or_default() += 1;

        if let Some(expires) = user.password_expires {
            let days_left = (expires - now).num_days();
            if (0..=warn_days).contains(&days_left) {
                expiring.push(ExpiringPassword {
                    account_name: user.account_name.clone(),
                    display_name: user.display_name.clone(),
                    days_left,
                });
            }
        }
    }

    expiring.sort_by_key(|e| e.days_left);
    expiring.truncate(expiring_cap);

    let mut computers_by_os: BTreeMap<String, usize> = BTreeMap::new();
    let mut disabled_computers = 0;
    for pc in computers {
        if pc.disabled {
            disabled_computers += 1;
        }
        let os = pc.operating_system.as_deref().unwrap_or(UNKNOWN);
        *computers_by_os.entry(os.to_string()).or_default() += 1;
    }

    DashboardStats {
        total_users: users.len(),
        active_users: users.len() - disabled_users,
        disabled_users,
        total_computers: computers.len(),
        active_computers: computers.len() - disabled_computers,
        disabled_computers,
        total_groups,
        users_by_department,
        computers_by_os,
        expiring_passwords: expiring,
    }
}

impl DirectoryClient {
    /// Fetches and aggregates the overview numbers.
    pub async fn get_dashboard_stats(&mut self) -> Result<DashboardStats, DirectoryError> {
        let user_bags = self
            .search(&filter::users(None, None), DASHBOARD_USER_ATTRS.to_vec())
            .await?;
        let max_age = self.policy.password_max_age_days;
        let (users, user_warnings) = decode_all(&user_bags, |bag| User::decode(bag, max_age));
        for e in &user_warnings {
            warn!(error = %e, "skipping undecodable user entry");
        }

        let computer_bags = self
            .search(&filter::computers(None), DASHBOARD_COMPUTER_ATTRS.to_vec())
            .await?;
        let (computers, pc_warnings) = decode_all(&computer_bags, Computer::decode);
        for e in &pc_warnings {
            warn!(error = %e, "skipping undecodable computer entry");
        }

        let total_groups = self.search(&filter::groups(), vec!["cn"]).await?.len();

        Ok(aggregate(
            &users,
            &computers,
            total_groups,
            Utc::now(),
            self.policy.password_expiry_warn_days,
            self.policy.dashboard_expiring_cap,
        ))
    }
}

#[cfg(test)]
mod tests {
    use adgate_core::domain::AttributeBag;
    use chrono::Duration;

    use super::*;

    fn user(name: &str, department: Option<&str>, uac: &str, pwd_last_set: Option<i64>) -> User {
        let mut attrs: Vec<(String, Vec<String>)> = vec![
            ("sAMAccountName".to_string(), vec![name.to_string()]),
            ("userAccountControl".to_string(), vec![uac.to_string()]),
        ];
        if let Some(dept) = department {
            attrs.push(("department".to_string(), vec![dept.to_string()]));
        }
        if let Some(filetime) = pwd_last_set {
            attrs.push(("pwdLastSet".to_string(), vec![filetime.to_string()]));
        }
        let bag = AttributeBag::new(format!("CN={name},DC=example,DC=com"), attrs);
        User::decode(&bag, 90).unwrap()
    }

    fn computer(name: &str, os: Option<&str>, uac: &str) -> Computer {
        let mut attrs: Vec<(String, Vec<String>)> = vec![
            ("sAMAccountName".to_string(), vec![format!("{name}$")]),
            ("userAccountControl".to_string(), vec![uac.to_string()]),
        ];
        if let Some(os) = os {
            attrs.push(("operatingSystem".to_string(), vec![os.to_string()]));
        }
        let bag = AttributeBag::new(format!("CN={name},DC=example,DC=com"), attrs);
        Computer::decode(&bag).unwrap()
    }

    /// FILETIME for a password last set so it expires `days_from_now` days
    /// from `now` under a 90-day policy.
    fn pwd_set_expiring_in(now: DateTime<Utc>, days_from_now: i64) -> i64 {
        let last_set = now - Duration::days(90 - days_from_now);
        adgate_core::domain::filetime::encode(last_set).unwrap()
    }

    #[test]
    fn test_counts_and_department_tally() {
        let now = Utc::now();
        let users = vec![
            user("a", Some("IT"), "512", None),
            user("b", Some("IT"), "514", None),
            user("c", None, "512", None),
        ];
        let computers = vec![
            computer("PC1", Some("Windows 11 Pro"), "4096"),
            computer("PC2", None, "4098"),
        ];
        let stats = aggregate(&users, &computers, 7, now, 7, 10);

        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.active_users, 2);
        assert_eq!(stats.disabled_users, 1);
        assert_eq!(stats.total_computers, 2);
        assert_eq!(stats.active_computers, 1);
        assert_eq!(stats.disabled_computers, 1);
        assert_eq!(stats.total_groups, 7);
        assert_eq!(stats.users_by_department["IT"], 2);
        assert_eq!(stats.users_by_department["Unspecified"], 1);
        assert_eq!(stats.computers_by_os["Windows 11 Pro"], 1);
        assert_eq!(stats.computers_by_os["Unknown"], 1);
    }

    #[test]
    fn test_expiring_passwords_sorted_and_capped() {
        let now = Utc::now();
        let users = vec![
            user("late", None, "512", Some(pwd_set_expiring_in(now, 6))),
            user("soon", None, "512", Some(pwd_set_expiring_in(now, 1))),
            user("mid", None, "512", Some(pwd_set_expiring_in(now, 3))),
            user("far", None, "512", Some(pwd_set_expiring_in(now, 30))),
            user("unset", None, "512", None),
        ];
        let stats = aggregate(&users, &[], 0, now, 7, 2);

        let names: Vec<&str> = stats
            .expiring_passwords
            .iter()
            .map(|e| e.account_name.as_str())
            .collect();
        assert_eq!(names, vec!["soon", "mid"]);
        assert!(stats.expiring_passwords[0].days_left <= stats.expiring_passwords[1].days_left);
    }

    #[test]
    fn test_already_expired_passwords_are_excluded() {
        let now = Utc::now();
        let users = vec![user("expired", None, "512", Some(pwd_set_expiring_in(now, -5)))];
        let stats = aggregate(&users, &[], 0, now, 7, 10);
        assert!(stats.expiring_passwords.is_empty());
    }

    #[test]
    fn test_empty_inputs() {
        let stats = aggregate(&[], &[], 0, Utc::now(), 7, 10);
        assert_eq!(stats.total_users, 0);
        assert!(stats.users_by_department.is_empty());
        assert!(stats.expiring_passwords.is_empty());
    }
}
