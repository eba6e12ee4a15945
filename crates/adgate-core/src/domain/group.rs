//! Group, group member, and organizational unit entities

use serde::{Deserialize, Serialize};

use super::attrs::AttributeBag;
use super::errors::DecodeError;

/// A security group.
///
/// `member_count` counts raw member references without resolving them;
/// nested groups and computer accounts count like any other reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub distinguished_name: String,
    pub member_count: usize,
}

impl Group {
    /// Decodes a group from an attribute bag.
    pub fn decode(bag: &AttributeBag) -> Result<Self, DecodeError> {
        let name = bag
            .first("cn")
            .ok_or_else(|| DecodeError::missing("cn"))?
            .to_string();
        if bag.dn().is_empty() {
            return Err(DecodeError::missing("distinguishedName"));
        }
        Ok(Self {
            name,
            distinguished_name: bag.dn().to_string(),
            member_count: bag.all("member").len(),
        })
    }
}

/// A resolved, user-only view of one group member reference.
///
/// Non-user members (computer accounts, nested groups) are silently
/// excluded when a group's members are listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub account_name: String,
    pub display_name: String,
    pub email: Option<String>,
    pub distinguished_name: String,
}

impl GroupMember {
    /// Decodes a member from the user entry its reference resolved to.
    pub fn decode(bag: &AttributeBag) -> Result<Self, DecodeError> {
        let account_name = bag
            .first("sAMAccountName")
            .ok_or_else(|| DecodeError::missing("sAMAccountName"))?
            .to_string();
        let display_name = bag
            .first("displayName")
            .unwrap_or(&account_name)
            .to_string();
        Ok(Self {
            account_name,
            display_name,
            email: bag.first("mail").map(str::to_string),
            distinguished_name: bag.dn().to_string(),
        })
    }
}

/// An organizational unit, used as a move target for computer objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgUnit {
    pub name: String,
    pub distinguished_name: String,
    pub description: Option<String>,
}

impl OrgUnit {
    /// Decodes an organizational unit from an attribute bag.
    pub fn decode(bag: &AttributeBag) -> Result<Self, DecodeError> {
        let name = bag
            .first("ou")
            .ok_or_else(|| DecodeError::missing("ou"))?
            .to_string();
        Ok(Self {
            name,
            distinguished_name: bag.dn().to_string(),
            description: bag.first("description").map(str::to_string),
        })
    }
}
