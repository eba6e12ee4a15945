//! Computer entity and its strict decode from a directory attribute bag

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::attrs::{AttributeBag, RawAttribute};
use super::errors::DecodeError;
use super::user::decode_filetime_attr;
use super::{filetime, uac};

/// A computer account decoded from the directory.
///
/// The inventory fields (`ip_address`, `mac_address`, `last_logged_on_user`)
/// are reserved for an external collector and are never populated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Computer {
    pub account_name: String,
    /// The common name. Falls back to the account name with its trailing
    /// `$` stripped (computer account names carry a `$` suffix).
    pub name: String,
    pub dns_host_name: Option<String>,
    pub operating_system: Option<String>,
    pub operating_system_version: Option<String>,
    pub operating_system_service_pack: Option<String>,
    pub distinguished_name: String,
    /// OU path segments of the distinguished name, reversed and joined
    /// with `/` so the outermost container comes first.
    pub organizational_unit: Option<String>,
    pub location: Option<String>,
    pub managed_by: Option<String>,
    pub description: Option<String>,
    /// Group display names parsed from the `memberOf` reference leaves.
    pub groups: Vec<String>,
    pub last_logon: Option<DateTime<Utc>>,
    pub last_logon_timestamp: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub enabled: bool,
    pub disabled: bool,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub last_logged_on_user: Option<String>,
    pub attributes: Vec<RawAttribute>,
}

impl Computer {
    /// Decodes a computer from an attribute bag.
    ///
    /// A missing `userAccountControl` defaults to the directory default for
    /// computers (4096) before the disable-bit test.
    pub fn decode(bag: &AttributeBag) -> Result<Self, DecodeError> {
        let account_name = bag
            .first("sAMAccountName")
            .ok_or_else(|| DecodeError::missing("sAMAccountName"))?
            .to_string();
        if bag.dn().is_empty() {
            return Err(DecodeError::missing("distinguishedName"));
        }
        let name = bag
            .first("cn")
            .map(str::to_string)
            .unwrap_or_else(|| account_name.trim_end_matches('$').to_string());

        let flags = bag
            .first_i64("userAccountControl")
            .map(|v| v as u32)
            .unwrap_or(uac::DEFAULT_COMPUTER_FLAGS);
        let disabled = uac::is_disabled(flags);

        Ok(Self {
            account_name,
            name,
            dns_host_name: bag.first("dNSHostName").map(str::to_string),
            operating_system: bag.first("operatingSystem").map(str::to_string),
            operating_system_version: bag.first("operatingSystemVersion").map(str::to_string),
            operating_system_service_pack: bag
                .first("operatingSystemServicePack")
                .map(str::to_string),
            distinguished_name: bag.dn().to_string(),
            organizational_unit: organizational_unit_of(bag.dn()),
            location: bag.first("location").map(str::to_string),
            managed_by: bag.first("managedBy").map(str::to_string),
            description: bag.first("description").map(str::to_string),
            groups: bag.all("memberOf").iter().filter_map(|dn| cn_leaf(dn)).collect(),
            last_logon: decode_filetime_attr(bag, "lastLogon"),
            last_logon_timestamp: decode_filetime_attr(bag, "lastLogonTimestamp"),
            created_at: bag.first("whenCreated").and_then(filetime::parse_generalized_time),
            modified_at: bag.first("whenChanged").and_then(filetime::parse_generalized_time),
            enabled: !disabled,
            disabled,
            ip_address: None,
            mac_address: None,
            last_logged_on_user: None,
            attributes: bag.pairs(),
        })
    }
}

/// Extracts the OU path from a distinguished name.
///
/// `CN=PC1,OU=Desktops,OU=Berlin,DC=example,DC=com` becomes
/// `Berlin/Desktops`: segments are reversed so the path reads outermost
/// container first. Returns `None` when the DN has no OU segments.
pub fn organizational_unit_of(dn: &str) -> Option<String> {
    let parts: Vec<&str> = dn
        .split(',')
        .filter_map(|part| part.trim().strip_prefix("OU="))
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.into_iter().rev().collect::<Vec<_>>().join("/"))
}

/// The CN value of a distinguished name's leaf, for group display names.
fn cn_leaf(dn: &str) -> Option<String> {
    dn.split(',')
        .next()
        .and_then(|leaf| leaf.trim().strip_prefix("CN="))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(extra: &[(&str, &str)]) -> AttributeBag {
        let mut attrs: Vec<(String, Vec<String>)> = vec![
            ("sAMAccountName".to_string(), vec!["PC-042$".to_string()]),
            ("cn".to_string(), vec!["PC-042".to_string()]),
            ("dNSHostName".to_string(), vec!["pc-042.example.com".to_string()]),
            ("operatingSystem".to_string(), vec!["Windows 11 Pro".to_string()]),
        ];
        for (name, value) in extra {
            attrs.push((name.to_string(), vec![value.to_string()]));
        }
        AttributeBag::new("CN=PC-042,OU=Desktops,OU=Berlin,DC=example,DC=com", attrs)
    }

    #[test]
    fn test_decode_basic_fields() {
        let pc = Computer::decode(&bag(&[])).unwrap();
        assert_eq!(pc.account_name, "PC-042$");
        assert_eq!(pc.name, "PC-042");
        assert_eq!(pc.dns_host_name.as_deref(), Some("pc-042.example.com"));
        assert_eq!(pc.operating_system.as_deref(), Some("Windows 11 Pro"));
    }

    #[test]
    fn test_name_falls_back_to_trimmed_account_name() {
        let bag = AttributeBag::new(
            "CN=SRV01,DC=example,DC=com",
            [("sAMAccountName".to_string(), vec!["SRV01$".to_string()])],
        );
        let pc = Computer::decode(&bag).unwrap();
        assert_eq!(pc.name, "SRV01");
    }

    #[test]
    fn test_organizational_unit_is_reversed_path() {
        let pc = Computer::decode(&bag(&[])).unwrap();
        assert_eq!(pc.organizational_unit.as_deref(), Some("Berlin/Desktops"));
    }

    #[test]
    fn test_dn_without_ou_has_no_organizational_unit() {
        assert_eq!(organizational_unit_of("CN=PC1,CN=Computers,DC=example,DC=com"), None);
    }

    #[test]
    fn test_groups_from_member_of_leaves() {
        let attrs = vec![
            ("sAMAccountName".to_string(), vec!["PC-042$".to_string()]),
            (
                "memberOf".to_string(),
                vec![
                    "CN=Workstations,OU=Groups,DC=example,DC=com".to_string(),
                    "CN=Berlin Machines,DC=example,DC=com".to_string(),
                ],
            ),
        ];
        let pc = Computer::decode(&AttributeBag::new("CN=PC-042,DC=example,DC=com", attrs)).unwrap();
        assert_eq!(pc.groups, vec!["Workstations", "Berlin Machines"]);
    }

    #[test]
    fn test_missing_uac_defaults_to_workstation_trust() {
        let pc = Computer::decode(&bag(&[])).unwrap();
        assert!(pc.enabled && !pc.disabled);
    }

    #[test]
    fn test_disabled_computer() {
        let pc = Computer::decode(&bag(&[("userAccountControl", "4098")])).unwrap();
        assert!(pc.disabled && !pc.enabled);
    }

    #[test]
    fn test_inventory_fields_stay_empty() {
        let pc = Computer::decode(&bag(&[])).unwrap();
        assert_eq!(pc.ip_address, None);
        assert_eq!(pc.mac_address, None);
        assert_eq!(pc.last_logged_on_user, None);
    }
}
