//! Configuration module.
//!
//! Provides typed configuration structs that map to the YAML configuration
//! file, with loading, validation, and defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub directory: DirectoryConfig,
    pub audit: AuditConfig,
    pub policy: PolicyConfig,
}

/// Directory server connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Directory server host or URL, e.g. `ldap://dc01.example.com`.
    pub server: String,
    /// DNS domain used to form the bind principal, e.g. `example.com`.
    pub domain: String,
    /// Service account name (without the domain suffix).
    pub username: String,
    /// Service account password.
    pub password: String,
    /// Search base for every query, e.g. `DC=example,DC=com`.
    pub base_dn: String,
    /// Container for newly created groups, relative to `base_dn`.
    pub default_group_container: String,
}

impl DirectoryConfig {
    /// The userPrincipalName-style identity used for the bind.
    pub fn bind_principal(&self) -> String {
        format!("{}@{}", self.username, self.domain)
    }
}

/// Audit log storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Path to the audit log file.
    pub log_file: PathBuf,
}

/// Account policy knobs that mirror the directory's own policy.
///
/// The directory does not expose its effective password policy through the
/// attributes read here, so expiry math uses these values. They must be
/// kept in line with the domain policy by the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Password maximum age in days, used to derive expiry timestamps.
    pub password_max_age_days: i64,
    /// Passwords expiring within this many days count as "expiring soon".
    pub password_expiry_warn_days: i64,
    /// Maximum number of expiring-password rows on the dashboard.
    pub dashboard_expiring_cap: usize,
}

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/adgate/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("adgate")
            .join("config.yaml")
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            domain: String::new(),
            username: String::new(),
            password: String::new(),
            base_dn: String::new(),
            default_group_container: "CN=Users".to_string(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("adgate");
        Self {
            log_file: data_dir.join("audit_logs.json"),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            password_max_age_days: 90,
            password_expiry_warn_days: 7,
            dashboard_expiring_cap: 10,
        }
    }
}

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"directory.server"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- directory ---
        if self.directory.server.is_empty() {
            errors.push(ValidationError {
                field: "directory.server".into(),
                message: "must not be empty".into(),
            });
        }
        if self.directory.domain.is_empty() {
            errors.push(ValidationError {
                field: "directory.domain".into(),
                message: "must not be empty".into(),
            });
        }
        if self.directory.username.is_empty() {
            errors.push(ValidationError {
                field: "directory.username".into(),
                message: "must not be empty".into(),
            });
        }
        if self.directory.base_dn.is_empty() {
            errors.push(ValidationError {
                field: "directory.base_dn".into(),
                message: "must not be empty".into(),
            });
        }

        // --- policy ---
        if self.policy.password_max_age_days <= 0 {
            errors.push(ValidationError {
                field: "policy.password_max_age_days".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.policy.password_expiry_warn_days <= 0 {
            errors.push(ValidationError {
                field: "policy.password_expiry_warn_days".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.policy.password_expiry_warn_days > self.policy.password_max_age_days {
            errors.push(ValidationError {
                field: "policy.password_expiry_warn_days".into(),
                message: format!(
                    "warn window ({}) must not exceed the maximum age ({})",
                    self.policy.password_expiry_warn_days, self.policy.password_max_age_days
                ),
            });
        }

        errors
    }
}
