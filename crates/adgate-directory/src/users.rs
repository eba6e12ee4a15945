//! User retrieval and user-account mutations

use std::collections::HashSet;

use ldap3::Mod;
use tracing::{info, warn};

use adgate_core::domain::{decode_all, paginate, DirectoryError, ObjectKind, Page, User};
use adgate_core::domain::uac;

use crate::client::DirectoryClient;
use crate::filter;
use crate::password::encode_password;

/// Attributes fetched for user listings.
const USER_ATTRS: &[&str] = &[
    "sAMAccountName",
    "displayName",
    "mail",
    "givenName",
    "sn",
    "title",
    "department",
    "pwdLastSet",
    "lastLogon",
    "lastLogonTimestamp",
    "whenCreated",
    "whenChanged",
    "userAccountControl",
];

impl DirectoryClient {
    /// Lists user accounts, optionally constrained to one group and a
    /// free-text query.
    ///
    /// An unresolvable group name drops the membership constraint instead
    /// of failing the listing. Per-entry decode failures are skipped with
    /// a warning; group membership is filled per user in a best-effort
    /// reverse lookup that degrades to an empty list.
    pub async fn get_users(
        &mut self,
        group: Option<&str>,
        query: Option<&str>,
    ) -> Result<Vec<User>, DirectoryError> {
        let group_dn = match group {
            Some(name) => match self.group_dn(name).await {
                Ok(dn) => Some(dn),
                Err(e) => {
                    warn!(group = name, error = %e, "group filter not resolvable, listing all users");
                    None
                }
            },
            None => None,
        };

        let filter = filter::users(group_dn.as_deref(), query);
        let bags = self.search(&filter, USER_ATTRS.to_vec()).await?;

        let max_age = self.policy.password_max_age_days;
        let (mut users, warnings) = decode_all(&bags, |bag| User::decode(bag, max_age));
        for e in &warnings {
            warn!(error = %e, "skipping undecodable user entry");
        }

        for user in &mut users {
            let dn = user.distinguished_name.clone();
            user.groups = self.user_groups(&dn).await;
        }

        Ok(users)
    }

    /// One page of the user listing.
    pub async fn get_users_paginated(
        &mut self,
        group: Option<&str>,
        query: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> Result<Page<User>, DirectoryError> {
        let users = self.get_users(group, query).await?;
        Ok(paginate(users, page, page_size))
    }

    /// Fetches one user by account name with its full attribute set.
    ///
    /// Returns `Ok(None)` when the name does not resolve; a present entry
    /// that fails to decode is an error, unlike the list path.
    pub async fn get_user(&mut self, name: &str) -> Result<Option<User>, DirectoryError> {
        let filter = filter::user_by_name(name);
        let bags = self.search(&filter, vec!["*"]).await?;
        let Some(bag) = bags.first() else {
            return Ok(None);
        };

        let mut user = User::decode(bag, self.policy.password_max_age_days)?;
        let dn = user.distinguished_name.clone();
        user.groups = self.user_groups(&dn).await;
        Ok(Some(user))
    }

    /// Resolves an account name to its distinguished name.
    pub async fn user_dn(&mut self, name: &str) -> Result<String, DirectoryError> {
        let filter = filter::user_by_name(name);
        let bags = self.search(&filter, vec!["sAMAccountName"]).await?;
        bags.first()
            .map(|bag| bag.dn().to_string())
            .ok_or_else(|| DirectoryError::not_found(ObjectKind::User, name))
    }

    /// Display names of the groups directly containing `dn`.
    ///
    /// Degrades to an empty list on search failure so one broken lookup
    /// cannot fail a whole listing.
    pub(crate) async fn user_groups(&mut self, dn: &str) -> Vec<String> {
        let filter = filter::groups_containing(dn);
        match self.search(&filter, vec!["cn"]).await {
            Ok(bags) => bags
                .iter()
                .filter_map(|bag| bag.first("cn").map(str::to_string))
                .collect(),
            Err(e) => {
                warn!(dn = dn, error = %e, "group membership lookup failed");
                Vec::new()
            }
        }
    }

    /// Resets a user's password.
    ///
    /// With `must_change` set, a second modify writes `pwdLastSet = 0`
    /// after the password change, forcing a change at next logon. The two
    /// writes are deliberately separate operations: the password must be
    /// in place before the expiry marker flips. The name is resolved
    /// first; nothing is written when it does not resolve.
    pub async fn reset_password(
        &mut self,
        name: &str,
        new_password: &str,
        must_change: bool,
    ) -> Result<(), DirectoryError> {
        let dn = self.user_dn(name).await?;

        let (password_mods, marker_mods) = password_reset_mods(new_password, must_change);
        self.apply_binary_mods(&dn, password_mods).await?;
        if let Some(mods) = marker_mods {
            self.apply_mods(&dn, mods).await?;
        }

        info!(user = name, must_change, "password reset");
        Ok(())
    }

    /// Enables or disables a user account.
    ///
    /// Reads the current `userAccountControl`, flips only the disable bit
    /// and writes the full integer back, preserving every other flag.
    pub async fn set_account_status(
        &mut self,
        name: &str,
        enabled: bool,
    ) -> Result<(), DirectoryError> {
        let filter = filter::user_by_name(name);
        let bags = self.search(&filter, vec!["userAccountControl"]).await?;
        let bag = bags
            .first()
            .ok_or_else(|| DirectoryError::not_found(ObjectKind::User, name))?;

        let flags = bag
            .first_i64("userAccountControl")
            .map(|v| v as u32)
            .unwrap_or(uac::DEFAULT_USER_FLAGS);
        let dn = bag.dn().to_string();

        self.apply_mods(&dn, status_mods(flags, enabled)).await?;

        info!(user = name, enabled, "account status changed");
        Ok(())
    }
}

/// Builds the modify batches for a password reset: always the
/// `unicodePwd` replace, plus the `pwdLastSet = 0` marker batch when a
/// change at next logon is forced. Two batches mean two protocol writes.
fn password_reset_mods(
    new_password: &str,
    must_change: bool,
) -> (Vec<Mod<Vec<u8>>>, Option<Vec<Mod<String>>>) {
    let password_mods = vec![Mod::Replace(
        b"unicodePwd".to_vec(),
        HashSet::from([encode_password(new_password)]),
    )];
    let marker_mods = must_change.then(|| {
        vec![Mod::Replace(
            "pwdLastSet".to_string(),
            HashSet::from(["0".to_string()]),
        )]
    });
    (password_mods, marker_mods)
}

/// Builds the modify batch for an account status toggle, writing the full
/// flag integer with only the disable bit changed.
pub(crate) fn status_mods(flags: u32, enabled: bool) -> Vec<Mod<String>> {
    vec![Mod::Replace(
        "userAccountControl".to_string(),
        HashSet::from([uac::with_enabled(flags, enabled).to_string()]),
    )]
}
