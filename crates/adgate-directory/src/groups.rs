//! Group retrieval, membership, and lifecycle mutations

use std::collections::HashSet;

use ldap3::Mod;
use tracing::{info, warn};

use adgate_core::domain::{
    decode_all, DirectoryError, Group, GroupMember, ObjectKind, OrgUnit,
};

use crate::client::DirectoryClient;
use crate::filter;

/// `groupType` value for a global security group.
const GLOBAL_SECURITY_GROUP: &str = "-2147483646";

impl DirectoryClient {
    /// Lists all groups, sorted by name.
    pub async fn get_groups(&mut self) -> Result<Vec<Group>, DirectoryError> {
        let bags = self.search(&filter::groups(), vec!["cn", "member"]).await?;
        let (mut groups, warnings) = decode_all(&bags, Group::decode);
        for e in &warnings {
            warn!(error = %e, "skipping undecodable group entry");
        }
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    /// Fetches one group by name.
    pub async fn get_group(&mut self, name: &str) -> Result<Option<Group>, DirectoryError> {
        let bags = self
            .search(&filter::group_by_name(name), vec!["cn", "member"])
            .await?;
        match bags.first() {
            Some(bag) => Ok(Some(Group::decode(bag)?)),
            None => Ok(None),
        }
    }

    /// Resolves a group name to its distinguished name.
    pub async fn group_dn(&mut self, name: &str) -> Result<String, DirectoryError> {
        let bags = self.search(&filter::group_by_name(name), vec!["cn"]).await?;
        bags.first()
            .map(|bag| bag.dn().to_string())
            .ok_or_else(|| DirectoryError::not_found(ObjectKind::Group, name))
    }

    /// Lists the user members of a group, sorted by display name.
    ///
    /// Each `member` reference is resolved to its entry; references that
    /// are not user accounts (nested groups, computers) or fail to resolve
    /// are excluded.
    pub async fn get_group_members(
        &mut self,
        name: &str,
    ) -> Result<Vec<GroupMember>, DirectoryError> {
        let bags = self
            .search(&filter::group_by_name(name), vec!["member"])
            .await?;
        let bag = bags
            .first()
            .ok_or_else(|| DirectoryError::not_found(ObjectKind::Group, name))?;
        let member_dns: Vec<String> = bag.all("member").to_vec();

        let mut members = Vec::new();
        for dn in member_dns {
            let entries = match self
                .search_under(
                    &dn,
                    "(&(objectClass=user)(objectCategory=person))",
                    vec!["sAMAccountName", "displayName", "mail"],
                )
                .await
            {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(member = %dn, error = %e, "member reference did not resolve");
                    continue;
                }
            };
            if let Some(entry) = entries.first() {
                match GroupMember::decode(entry) {
                    Ok(member) => members.push(member),
                    Err(e) => warn!(member = %dn, error = %e, "skipping undecodable member"),
                }
            }
        }

        members.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(members)
    }

    /// Lists all organizational units.
    pub async fn get_organizational_units(&mut self) -> Result<Vec<OrgUnit>, DirectoryError> {
        let bags = self
            .search(&filter::org_units(), vec!["ou", "description"])
            .await?;
        let (mut units, warnings) = decode_all(&bags, OrgUnit::decode);
        for e in &warnings {
            warn!(error = %e, "skipping undecodable organizational unit");
        }
        units.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(units)
    }

    /// Creates a global security group.
    ///
    /// The group lands under `parent_dn` when given, otherwise under the
    /// configured default container relative to the search base.
    pub async fn create_group(
        &mut self,
        name: &str,
        description: Option<&str>,
        parent_dn: Option<&str>,
    ) -> Result<(), DirectoryError> {
        let parent = match parent_dn {
            Some(dn) => dn.to_string(),
            None => format!(
                "{},{}",
                self.config.default_group_container, self.config.base_dn
            ),
        };
        let dn = format!("CN={name},{parent}");

        let mut attrs: Vec<(String, HashSet<String>)> = vec![
            (
                "objectClass".to_string(),
                HashSet::from(["top".to_string(), "group".to_string()]),
            ),
            ("cn".to_string(), HashSet::from([name.to_string()])),
            (
                "sAMAccountName".to_string(),
                HashSet::from([name.to_string()]),
            ),
            (
                "groupType".to_string(),
                HashSet::from([GLOBAL_SECURITY_GROUP.to_string()]),
            ),
        ];
        if let Some(desc) = description.filter(|d| !d.is_empty()) {
            attrs.push((
                "description".to_string(),
                HashSet::from([desc.to_string()]),
            ));
        }

        self.add_entry(&dn, attrs).await?;
        info!(group = name, dn = %dn, "group created");
        Ok(())
    }

    /// Deletes a group by name.
    pub async fn delete_group(&mut self, name: &str) -> Result<(), DirectoryError> {
        let dn = self.group_dn(name).await?;
        self.delete_entry(&dn).await?;
        info!(group = name, "group deleted");
        Ok(())
    }

    /// Adds a user to a group.
    ///
    /// Both names resolve to DNs first; no mutation is issued when either
    /// resolution fails.
    pub async fn add_user_to_group(
        &mut self,
        user_name: &str,
        group_name: &str,
    ) -> Result<(), DirectoryError> {
        let user_dn = self.user_dn(user_name).await?;
        let group_dn = self.group_dn(group_name).await?;
        self.apply_mods(
            &group_dn,
            vec![Mod::Add("member".to_string(), HashSet::from([user_dn]))],
        )
        .await?;
        info!(user = user_name, group = group_name, "user added to group");
        Ok(())
    }

    /// Removes a user from a group.
    pub async fn remove_user_from_group(
        &mut self,
        user_name: &str,
        group_name: &str,
    ) -> Result<(), DirectoryError> {
        let user_dn = self.user_dn(user_name).await?;
        let group_dn = self.group_dn(group_name).await?;
        self.apply_mods(
            &group_dn,
            vec![Mod::Delete("member".to_string(), HashSet::from([user_dn]))],
        )
        .await?;
        info!(user = user_name, group = group_name, "user removed from group");
        Ok(())
    }
}
