//! Computer retrieval and computer-account mutations

use std::collections::HashSet;

use ldap3::Mod;
use tracing::{info, warn};

use adgate_core::domain::{decode_all, paginate, Computer, DirectoryError, ObjectKind, Page};
use adgate_core::domain::uac;

use crate::client::DirectoryClient;
use crate::filter;

/// Attributes fetched for computer listings.
const COMPUTER_ATTRS: &[&str] = &[
    "sAMAccountName",
    "cn",
    "dNSHostName",
    "operatingSystem",
    "operatingSystemVersion",
    "operatingSystemServicePack",
    "location",
    "managedBy",
    "description",
    "memberOf",
    "lastLogon",
    "lastLogonTimestamp",
    "whenCreated",
    "whenChanged",
    "userAccountControl",
];

impl DirectoryClient {
    /// Lists computer accounts, optionally constrained to a free-text query
    /// and an organizational-unit filter.
    ///
    /// The OU filter is a case-insensitive substring test against the
    /// decoded OU path, applied after the search; the directory has no
    /// cheap server-side equivalent for path fragments.
    pub async fn get_computers(
        &mut self,
        query: Option<&str>,
        ou_filter: Option<&str>,
    ) -> Result<Vec<Computer>, DirectoryError> {
        let bags = self
            .search(&filter::computers(query), COMPUTER_ATTRS.to_vec())
            .await?;

        let (mut computers, warnings) = decode_all(&bags, Computer::decode);
        for e in &warnings {
            warn!(error = %e, "skipping undecodable computer entry");
        }

        if let Some(fragment) = ou_filter.filter(|f| !f.is_empty()) {
            let fragment = fragment.to_lowercase();
            computers.retain(|pc| {
                pc.organizational_unit
                    .as_deref()
                    .is_some_and(|ou| ou.to_lowercase().contains(&fragment))
            });
        }

        Ok(computers)
    }

    /// One page of the computer listing.
    pub async fn get_computers_paginated(
        &mut self,
        query: Option<&str>,
        ou_filter: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> Result<Page<Computer>, DirectoryError> {
        let computers = self.get_computers(query, ou_filter).await?;
        Ok(paginate(computers, page, page_size))
    }

    /// Resolves a computer name to its distinguished name.
    ///
    /// Computer account names carry a trailing `$`; callers usually pass
    /// the bare name, so the suffixed form is probed first and the name is
    /// tried verbatim as a fallback.
    pub async fn computer_dn(&mut self, name: &str) -> Result<String, DirectoryError> {
        let bare = name.trim_end_matches('$');
        for candidate in [format!("{bare}$"), name.to_string()] {
            let bags = self
                .search(&filter::computer_by_account(&candidate), vec!["cn"])
                .await?;
            if let Some(bag) = bags.first() {
                return Ok(bag.dn().to_string());
            }
        }
        Err(DirectoryError::not_found(ObjectKind::Computer, name))
    }

    /// Enables or disables a computer account, preserving all other
    /// `userAccountControl` flags.
    pub async fn set_computer_status(
        &mut self,
        name: &str,
        enabled: bool,
    ) -> Result<(), DirectoryError> {
        let dn = self.computer_dn(name).await?;
        let bags = self
            .search_under(&dn, "(objectClass=computer)", vec!["userAccountControl"])
            .await?;
        let flags = bags
            .first()
            .and_then(|bag| bag.first_i64("userAccountControl"))
            .map(|v| v as u32)
            .unwrap_or(uac::DEFAULT_COMPUTER_FLAGS);

        self.apply_mods(&dn, crate::users::status_mods(flags, enabled))
            .await?;

        info!(computer = name, enabled, "computer status changed");
        Ok(())
    }

    /// Adds a computer to a group.
    pub async fn add_computer_to_group(
        &mut self,
        computer_name: &str,
        group_name: &str,
    ) -> Result<(), DirectoryError> {
        let computer_dn = self.computer_dn(computer_name).await?;
        let group_dn = self.group_dn(group_name).await?;
        self.apply_mods(
            &group_dn,
            vec![Mod::Add("member".to_string(), HashSet::from([computer_dn]))],
        )
        .await?;
        info!(computer = computer_name, group = group_name, "computer added to group");
        Ok(())
    }

    /// Removes a computer from a group.
    pub async fn remove_computer_from_group(
        &mut self,
        computer_name: &str,
        group_name: &str,
    ) -> Result<(), DirectoryError> {
        let computer_dn = self.computer_dn(computer_name).await?;
        let group_dn = self.group_dn(group_name).await?;
        self.apply_mods(
            &group_dn,
            vec![Mod::Delete(
                "member".to_string(),
                HashSet::from([computer_dn]),
            )],
        )
        .await?;
        info!(computer = computer_name, group = group_name, "computer removed from group");
        Ok(())
    }

    /// Moves a computer under another organizational unit, keeping its
    /// leaf RDN.
    pub async fn move_computer(
        &mut self,
        name: &str,
        target_ou_dn: &str,
    ) -> Result<(), DirectoryError> {
        let dn = self.computer_dn(name).await?;
        self.move_entry(&dn, target_ou_dn).await?;
        info!(computer = name, target = target_ou_dn, "computer moved");
        Ok(())
    }
}
