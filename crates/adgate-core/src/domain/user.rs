//! User entity and its strict decode from a directory attribute bag

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::attrs::{AttributeBag, RawAttribute};
use super::errors::DecodeError;
use super::{filetime, uac};

/// A user account decoded from the directory.
///
/// `enabled` and `disabled` are both present because the service layer
/// serves them to clients as-is; they are derived exactly once from the
/// same `userAccountControl` bit and can never drift apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub account_name: String,
    pub display_name: String,
    pub distinguished_name: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub department: Option<String>,
    /// Display names of groups this user belongs to. Filled by the
    /// directory adapter in a separate best-effort lookup; decoding alone
    /// leaves this empty.
    pub groups: Vec<String>,
    pub password_last_set: Option<DateTime<Utc>>,
    /// `password_last_set` plus the configured policy window. `None`
    /// whenever `password_last_set` is unset.
    pub password_expires: Option<DateTime<Utc>>,
    pub last_logon: Option<DateTime<Utc>>,
    pub last_logon_timestamp: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub enabled: bool,
    pub disabled: bool,
    /// Raw name/value pairs preserved for display, not otherwise interpreted.
    pub attributes: Vec<RawAttribute>,
}

impl User {
    /// Decodes a user from an attribute bag.
    ///
    /// Fallback rules, all deliberate:
    /// - `display_name` falls back to the account name when `displayName`
    ///   is absent.
    /// - a missing `userAccountControl` is treated as the directory default
    ///   for users (512) before the disable-bit test.
    /// - `pwdLastSet == 0` means "never set / must change at next logon"
    ///   and decodes to `None`; a non-zero value that fails FILETIME
    ///   conversion also becomes `None` but logs a warning.
    ///
    /// `sAMAccountName` and the distinguished name are required; their
    /// absence is a [`DecodeError`], not a defaulted entity.
    pub fn decode(bag: &AttributeBag, password_max_age_days: i64) -> Result<Self, DecodeError> {
        let account_name = bag
            .first("sAMAccountName")
            .ok_or_else(|| DecodeError::missing("sAMAccountName"))?
            .to_string();
        if bag.dn().is_empty() {
            return Err(DecodeError::missing("distinguishedName"));
        }
        let display_name = bag
            .first("displayName")
            .unwrap_or(&account_name)
            .to_string();

        let password_last_set = decode_filetime_attr(bag, "pwdLastSet");
        let password_expires =
            password_last_set.map(|ts| ts + Duration::days(password_max_age_days));

        let flags = bag
            .first_i64("userAccountControl")
            .map(|v| v as u32)
            .unwrap_or(uac::DEFAULT_USER_FLAGS);
        let disabled = uac::is_disabled(flags);

        Ok(Self {
            account_name,
            display_name,
            distinguished_name: bag.dn().to_string(),
            email: bag.first("mail").map(str::to_string),
            first_name: bag.first("givenName").map(str::to_string),
            last_name: bag.first("sn").map(str::to_string),
            title: bag.first("title").map(str::to_string),
            department: bag.first("department").map(str::to_string),
            groups: Vec::new(),
            password_last_set,
            password_expires,
            last_logon: decode_filetime_attr(bag, "lastLogon"),
            last_logon_timestamp: decode_filetime_attr(bag, "lastLogonTimestamp"),
            created_at: bag.first("whenCreated").and_then(filetime::parse_generalized_time),
            modified_at: bag.first("whenChanged").and_then(filetime::parse_generalized_time),
            enabled: !disabled,
            disabled,
            attributes: bag.pairs(),
        })
    }
}

/// Decodes a FILETIME attribute, distinguishing unset (zero) from garbage.
pub(crate) fn decode_filetime_attr(bag: &AttributeBag, name: &str) -> Option<DateTime<Utc>> {
    let raw = bag.first_i64(name)?;
    if raw == 0 {
        return None;
    }
    let decoded = filetime::decode(raw);
    if decoded.is_none() {
        warn!(attribute = name, value = raw, "unconvertible FILETIME value");
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bag(extra: &[(&str, &str)]) -> AttributeBag {
        let mut attrs: Vec<(String, Vec<String>)> = vec![
            ("sAMAccountName".to_string(), vec!["alice".to_string()]),
            ("displayName".to_string(), vec!["Alice Adams".to_string()]),
            ("mail".to_string(), vec!["alice@example.com".to_string()]),
        ];
        for (name, value) in extra {
            attrs.push((name.to_string(), vec![value.to_string()]));
        }
        AttributeBag::new("CN=Alice,OU=Staff,DC=example,DC=com", attrs)
    }

    #[test]
    fn test_decode_basic_fields() {
        let user = User::decode(&bag(&[]), 90).unwrap();
        assert_eq!(user.account_name, "alice");
        assert_eq!(user.display_name, "Alice Adams");
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
        assert_eq!(user.distinguished_name, "CN=Alice,OU=Staff,DC=example,DC=com");
        assert!(user.groups.is_empty());
    }

    #[test]
    fn test_missing_account_name_is_an_error() {
        let bag = AttributeBag::new("CN=X,DC=example,DC=com", []);
        let err = User::decode(&bag, 90).unwrap_err();
        assert_eq!(err.attribute, "sAMAccountName");
    }

    #[test]
    fn test_display_name_falls_back_to_account_name() {
        let bag = AttributeBag::new(
            "CN=Bob,DC=example,DC=com",
            [("sAMAccountName".to_string(), vec!["bob".to_string()])],
        );
        let user = User::decode(&bag, 90).unwrap();
        assert_eq!(user.display_name, "bob");
    }

    #[test]
    fn test_enabled_disabled_are_mutually_exclusive() {
        let enabled = User::decode(&bag(&[("userAccountControl", "512")]), 90).unwrap();
        assert!(enabled.enabled && !enabled.disabled);

        let disabled = User::decode(&bag(&[("userAccountControl", "514")]), 90).unwrap();
        assert!(!disabled.enabled && disabled.disabled);
    }

    #[test]
    fn test_missing_uac_defaults_to_normal_account() {
        let user = User::decode(&bag(&[]), 90).unwrap();
        assert!(user.enabled);
    }

    #[test]
    fn test_pwd_last_set_zero_is_unset() {
        let user = User::decode(&bag(&[("pwdLastSet", "0")]), 90).unwrap();
        assert_eq!(user.password_last_set, None);
        assert_eq!(user.password_expires, None);
    }

    #[test]
    fn test_password_expiry_window() {
        // 2024-01-01T00:00:00Z
        let user = User::decode(&bag(&[("pwdLastSet", "133485408000000000")]), 90).unwrap();
        let last_set = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(user.password_last_set, Some(last_set));
        assert_eq!(user.password_expires, Some(last_set + Duration::days(90)));
    }

    #[test]
    fn test_garbage_pwd_last_set_degrades_to_none() {
        let user = User::decode(&bag(&[("pwdLastSet", "not-a-number")]), 90).unwrap();
        assert_eq!(user.password_last_set, None);
    }

    #[test]
    fn test_when_created_and_changed() {
        let user = User::decode(
            &bag(&[
                ("whenCreated", "20230601120000.0Z"),
                ("whenChanged", "20240115083000.0Z"),
            ]),
            90,
        )
        .unwrap();
        assert_eq!(
            user.created_at,
            Some(Utc.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap())
        );
        assert_eq!(
            user.modified_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let user = User::decode(&bag(&[("userAccountControl", "514")]), 90).unwrap();
        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
    }
}
