//! Search filter construction
//!
//! All filters are built here so RFC 4515 escaping cannot be forgotten at
//! a call site. User-supplied text only ever enters a filter through
//! [`escape_value`].

/// Escapes special characters in filter values (RFC 4515).
pub fn escape_value(value: &str) -> String {
    value
        .replace('\\', "\\5c")
        .replace('*', "\\2a")
        .replace('(', "\\28")
        .replace(')', "\\29")
        .replace('\0', "\\00")
}

/// Filter for user accounts, optionally constrained to a group and a
/// free-text query.
///
/// `objectCategory=person` excludes computer accounts, which also carry
/// `objectClass=user`. The group constraint takes the group's resolved DN;
/// callers that fail to resolve the name pass `None` and get the
/// unconstrained listing.
pub fn users(group_dn: Option<&str>, query: Option<&str>) -> String {
    let mut parts = String::from("(objectClass=user)(objectCategory=person)");
    if let Some(dn) = group_dn {
        parts.push_str(&format!("(memberOf={})", escape_value(dn)));
    }
    if let Some(q) = query.filter(|q| !q.is_empty()) {
        let q = escape_value(q);
        parts.push_str(&format!(
            "(|(cn=*{q}*)(sAMAccountName=*{q}*)(mail=*{q}*))"
        ));
    }
    format!("(&{parts})")
}

/// Filter for one user by account name.
pub fn user_by_name(name: &str) -> String {
    format!(
        "(&(objectClass=user)(objectCategory=person)(sAMAccountName={}))",
        escape_value(name)
    )
}

/// Filter for computer accounts, optionally constrained to a free-text query.
pub fn computers(query: Option<&str>) -> String {
    match query.filter(|q| !q.is_empty()) {
        Some(q) => {
            let q = escape_value(q);
            format!("(&(objectClass=computer)(|(cn=*{q}*)(dNSHostName=*{q}*)(description=*{q}*)))")
        }
        None => "(objectClass=computer)".to_string(),
    }
}

/// Filter for one computer by account name.
pub fn computer_by_account(account_name: &str) -> String {
    format!(
        "(&(objectClass=computer)(sAMAccountName={}))",
        escape_value(account_name)
    )
}

/// Filter for all groups.
pub fn groups() -> String {
    "(objectClass=group)".to_string()
}

/// Filter for one group by name.
pub fn group_by_name(name: &str) -> String {
    format!("(&(objectClass=group)(cn={}))", escape_value(name))
}

/// Filter for the groups that directly contain `member_dn`.
pub fn groups_containing(member_dn: &str) -> String {
    format!("(&(objectClass=group)(member={}))", escape_value(member_dn))
}

/// Filter for all organizational units.
pub fn org_units() -> String {
    "(objectClass=organizationalUnit)".to_string()
}

/// Filter for entries of `object_class` changed at or after `cutoff`
/// (generalized time).
pub fn changed_since(object_class: &str, cutoff: &str) -> String {
    format!("(&(objectClass={object_class})(whenChanged>={cutoff}))")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_value() {
        assert_eq!(escape_value("a*b"), "a\\2ab");
        assert_eq!(escape_value("(admin)"), "\\28admin\\29");
        assert_eq!(escape_value("back\\slash"), "back\\5cslash");
        assert_eq!(escape_value("plain"), "plain");
    }

    #[test]
    fn test_users_unconstrained() {
        assert_eq!(users(None, None), "(&(objectClass=user)(objectCategory=person))");
    }

    #[test]
    fn test_users_with_group_and_query() {
        let f = users(Some("CN=Engineers,DC=example,DC=com"), Some("ali"));
        assert_eq!(
            f,
            "(&(objectClass=user)(objectCategory=person)\
             (memberOf=CN=Engineers,DC=example,DC=com)\
             (|(cn=*ali*)(sAMAccountName=*ali*)(mail=*ali*)))"
        );
    }

    #[test]
    fn test_users_query_is_escaped() {
        let f = users(None, Some("a*"));
        assert!(f.contains("(cn=*a\\2a*)"));
    }

    #[test]
    fn test_empty_query_is_ignored() {
        assert_eq!(users(None, Some("")), users(None, None));
        assert_eq!(computers(Some("")), computers(None));
    }

    #[test]
    fn test_computers_with_query() {
        let f = computers(Some("pc"));
        assert_eq!(
            f,
            "(&(objectClass=computer)(|(cn=*pc*)(dNSHostName=*pc*)(description=*pc*)))"
        );
    }

    #[test]
    fn test_group_by_name_escapes() {
        assert_eq!(
            group_by_name("Ops (Berlin)"),
            "(&(objectClass=group)(cn=Ops \\28Berlin\\29))"
        );
    }

    #[test]
    fn test_changed_since() {
        assert_eq!(
            changed_since("user", "20240101000000.0Z"),
            "(&(objectClass=user)(whenChanged>=20240101000000.0Z))"
        );
    }
}
