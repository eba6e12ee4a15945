//! Directory session lifecycle and protocol plumbing
//!
//! One [`DirectoryClient`] wraps one logical LDAP session. Connections are
//! lazy: every operation goes through [`DirectoryClient::ensure_connected`],
//! which rebinds when the previous session handle has been closed by the
//! server. Connection failures are never auto-retried; they surface as
//! [`DirectoryError::Connection`] to the caller.

use std::future::Future;
use std::pin::Pin;

use ldap3::{Ldap, LdapConnAsync, Mod, Scope, SearchEntry};
use tracing::{debug, info, warn};

use adgate_core::config::{DirectoryConfig, PolicyConfig};
use adgate_core::domain::{AttributeBag, DirectoryError};

/// Result code for invalidCredentials (RFC 4511).
const RC_INVALID_CREDENTIALS: u32 = 49;

/// Client for one directory server, bound as the configured service account.
pub struct DirectoryClient {
    pub(crate) config: DirectoryConfig,
    pub(crate) policy: PolicyConfig,
    ldap: Option<Ldap>,
}

impl DirectoryClient {
    /// Creates an unconnected client with default policy values. No
    /// protocol traffic happens until the first operation.
    pub fn new(config: DirectoryConfig) -> Self {
        Self {
            config,
            policy: PolicyConfig::default(),
            ldap: None,
        }
    }

    /// Overrides the account policy used for password expiry math.
    pub fn with_policy(mut self, policy: PolicyConfig) -> Self {
        self.policy = policy;
        self
    }

    /// The configured search base.
    pub fn base_dn(&self) -> &str {
        &self.config.base_dn
    }

    /// Establishes a session and binds as the service account.
    pub async fn connect(&mut self) -> Result<(), DirectoryError> {
        let url = if self.config.server.contains("://") {
            self.config.server.clone()
        } else {
            format!("ldap://{}", self.config.server)
        };

        debug!(url = %url, "connecting to directory server");

        let (conn, mut ldap) = LdapConnAsync::new(&url)
            .await
            .map_err(|e| DirectoryError::Connection(format!("connect to {url} failed: {e}")))?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "directory connection driver error");
            }
        });

        let principal = self.config.bind_principal();
        debug!(principal = %principal, "binding to directory");

        let result = ldap
            .simple_bind(&principal, &self.config.password)
            .await
            .map_err(|e| DirectoryError::Connection(format!("bind failed: {e}")))?;

        if result.rc != 0 {
            if result.rc == RC_INVALID_CREDENTIALS {
                return Err(DirectoryError::Connection(
                    "invalid credentials for service account".to_string(),
                ));
            }
            return Err(DirectoryError::Connection(format!(
                "bind failed with code {}: {}",
                result.rc, result.text
            )));
        }

        info!(server = %self.config.server, "directory session established");
        self.ldap = Some(ldap);
        Ok(())
    }

    /// Returns a live session handle, reconnecting if necessary.
    pub(crate) async fn ensure_connected(&mut self) -> Result<Ldap, DirectoryError> {
        let stale = match &mut self.ldap {
            Some(ldap) => ldap.is_closed(),
            None => true,
        };
        if stale {
            self.connect().await?;
        }
        // connect() stored the handle on success
        self.ldap
            .clone()
            .ok_or_else(|| DirectoryError::Connection("no directory session".to_string()))
    }

    /// Unbinds and drops the session. Safe to call when not connected.
    pub async fn disconnect(&mut self) {
        if let Some(mut ldap) = self.ldap.take() {
            if let Err(e) = ldap.unbind().await {
                warn!(error = %e, "error during directory unbind");
            }
        }
    }

    /// Runs `op` inside a scoped session: connect, run, disconnect.
    ///
    /// The session is released whenever `op` returns, with a value or an
    /// error. If the future is dropped before `op` finishes, the unbind
    /// is skipped and the next operation rebinds over the stale handle.
    pub async fn with_session<T, F>(&mut self, op: F) -> Result<T, DirectoryError>
    where
        F: for<'a> FnOnce(
            &'a mut DirectoryClient,
        )
            -> Pin<Box<dyn Future<Output = Result<T, DirectoryError>> + Send + 'a>>,
    {
        self.ensure_connected().await?;
        let result = op(self).await;
        self.disconnect().await;
        result
    }

    /// Subtree search under the configured base, decoded to attribute bags.
    pub(crate) async fn search(
        &mut self,
        filter: &str,
        attrs: Vec<&str>,
    ) -> Result<Vec<AttributeBag>, DirectoryError> {
        let base = self.config.base_dn.clone();
        self.search_under(&base, filter, attrs).await
    }

    /// Subtree search under an explicit base DN.
    pub(crate) async fn search_under(
        &mut self,
        base: &str,
        filter: &str,
        attrs: Vec<&str>,
    ) -> Result<Vec<AttributeBag>, DirectoryError> {
        let mut ldap = self.ensure_connected().await?;

        debug!(base = %base, filter = %filter, "directory search");

        let result = ldap
            .search(base, Scope::Subtree, filter, attrs)
            .await
            .map_err(|e| DirectoryError::Connection(format!("search failed: {e}")))?;

        let (entries, _res) = result
            .success()
            .map_err(|e| DirectoryError::Connection(format!("search failed: {e}")))?;

        Ok(entries
            .into_iter()
            .map(SearchEntry::construct)
            .map(|entry| AttributeBag::new(entry.dn, entry.attrs))
            .collect())
    }

    /// Applies a modify operation, mapping protocol failure to
    /// [`DirectoryError::Mutation`] with the server's diagnostic text.
    pub(crate) async fn apply_mods(
        &mut self,
        dn: &str,
        mods: Vec<Mod<String>>,
    ) -> Result<(), DirectoryError> {
        let mut ldap = self.ensure_connected().await?;
        let result = ldap
            .modify(dn, mods)
            .await
            .map_err(|e| DirectoryError::Mutation(e.to_string()))?;
        check_result(result.rc, &result.text)
    }

    /// Binary-valued modify, used for `unicodePwd`.
    pub(crate) async fn apply_binary_mods(
        &mut self,
        dn: &str,
        mods: Vec<Mod<Vec<u8>>>,
    ) -> Result<(), DirectoryError> {
        let mut ldap = self.ensure_connected().await?;
        let result = ldap
            .modify(dn, mods)
            .await
            .map_err(|e| DirectoryError::Mutation(e.to_string()))?;
        check_result(result.rc, &result.text)
    }

    /// Adds a new entry.
    pub(crate) async fn add_entry(
        &mut self,
        dn: &str,
        attrs: Vec<(String, std::collections::HashSet<String>)>,
    ) -> Result<(), DirectoryError> {
        let mut ldap = self.ensure_connected().await?;
        let result = ldap
            .add(dn, attrs)
            .await
            .map_err(|e| DirectoryError::Mutation(e.to_string()))?;
        check_result(result.rc, &result.text)
    }

    /// Deletes an entry.
    pub(crate) async fn delete_entry(&mut self, dn: &str) -> Result<(), DirectoryError> {
        let mut ldap = self.ensure_connected().await?;
        let result = ldap
            .delete(dn)
            .await
            .map_err(|e| DirectoryError::Mutation(e.to_string()))?;
        check_result(result.rc, &result.text)
    }

    /// Moves an entry under a new parent, keeping its leaf RDN.
    pub(crate) async fn move_entry(
        &mut self,
        dn: &str,
        new_superior: &str,
    ) -> Result<(), DirectoryError> {
        let rdn = dn
            .split(',')
            .next()
            .ok_or_else(|| DirectoryError::Mutation(format!("malformed DN: {dn}")))?
            .to_string();
        let mut ldap = self.ensure_connected().await?;
        let result = ldap
            .modifydn(dn, &rdn, true, Some(new_superior))
            .await
            .map_err(|e| DirectoryError::Mutation(e.to_string()))?;
        check_result(result.rc, &result.text)
    }
}

/// Maps a non-zero protocol result code to a mutation error.
fn check_result(rc: u32, text: &str) -> Result<(), DirectoryError> {
    if rc == 0 {
        Ok(())
    } else {
        Err(DirectoryError::Mutation(format!("{text} ({rc})")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DirectoryConfig {
        DirectoryConfig {
            server: "dc01.example.com".into(),
            domain: "example.com".into(),
            username: "svc-adgate".into(),
            password: "secret".into(),
            base_dn: "DC=example,DC=com".into(),
            default_group_container: "CN=Users".into(),
        }
    }

    #[test]
    fn test_new_client_is_unconnected() {
        let client = DirectoryClient::new(config());
        assert!(client.ldap.is_none());
        assert_eq!(client.base_dn(), "DC=example,DC=com");
    }

    #[tokio::test]
    async fn test_disconnect_without_session_is_a_no_op() {
        let mut client = DirectoryClient::new(config());
        client.disconnect().await;
        assert!(client.ldap.is_none());
    }

    #[test]
    fn test_check_result() {
        assert!(check_result(0, "").is_ok());
        let err = check_result(68, "entryAlreadyExists").unwrap_err();
        assert!(err.to_string().contains("entryAlreadyExists (68)"));
    }
}
