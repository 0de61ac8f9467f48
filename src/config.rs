use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Backing-store (Vault) configuration.
///
/// The master token is the only privileged credential the service holds; it
/// is used exclusively to mint scoped share tokens, never to read or write
/// secret contents.
#[derive(Debug, Deserialize, Clone)]
pub struct VaultConfig {
    /// Base address of the Vault HTTP API
    #[serde(default = "default_vault_addr")]
    pub addr: String,
    /// Privileged token used to mint share tokens (required)
    #[serde(default)]
    pub master_token: String,
    /// Base namespace path under which secrets are stashed
    #[serde(default = "default_secret_base")]
    pub secret_base: String,
    /// Policy attached to every minted share token
    #[serde(default = "default_policy")]
    pub policy: String,
    /// Lease granted to share tokens and their records, in hours
    #[serde(default = "default_lease_hours")]
    pub lease_hours: u64,
    /// Request timeout towards the backing store, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_vault_addr() -> String {
    "http://127.0.0.1:8200".to_string()
}

fn default_secret_base() -> String {
    "cubbyhole/cachette".to_string()
}

fn default_policy() -> String {
    "cachette-share".to_string()
}

fn default_lease_hours() -> u64 {
    168
}

fn default_timeout_secs() -> u64 {
    10
}

/// Web server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// Public base URL used to build share links
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}

fn default_web_port() -> u16 {
    3000
}

fn default_public_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            public_url: default_public_url(),
        }
    }
}

/// Payload limits enforced before any backing-store call.
#[derive(Debug, Deserialize, Clone)]
pub struct LimitsConfig {
    /// Maximum length of the secret name and of every field name/value
    #[serde(default = "default_max_string_len")]
    pub max_string_len: usize,
    /// Minimum number of fields a secret must carry
    #[serde(default = "default_min_fields")]
    pub min_fields: usize,
}

fn default_max_string_len() -> usize {
    100
}

fn default_min_fields() -> usize {
    1
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_string_len: default_max_string_len(),
            min_fields: default_min_fields(),
        }
    }
}

/// Root application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub vault: VaultConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default config file
            .add_source(File::with_name("config/default").required(false))
            // Override with local config if present
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (prefix: CACHETTE_)
            // e.g., CACHETTE_VAULT__MASTER_TOKEN, CACHETTE_WEB__PORT
            .add_source(
                Environment::with_prefix("CACHETTE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Initialize the global config singleton
    pub fn init() -> Result<&'static Self, ConfigError> {
        let config = Self::load()?;
        Ok(CONFIG.get_or_init(|| config))
    }

    /// Get reference to the global config
    pub fn get() -> &'static Self {
        CONFIG.get().expect("Config not initialized. Call AppConfig::init() first.")
    }
}

impl VaultConfig {
    /// Path of the namespaced secret record: the configured base plus a
    /// constant segment. Deliberately independent of any token; scoping is
    /// the backing store's job, not the path's.
    pub fn secret_path(&self) -> String {
        let base = self.secret_base.trim_end_matches('/');
        format!("{}/secret", base)
    }

    /// Lease in the `<hours>h` form the backing store expects.
    pub fn lease(&self) -> String {
        format!("{}h", self.lease_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault_config(secret_base: &str) -> VaultConfig {
        VaultConfig {
            addr: default_vault_addr(),
            master_token: "root".to_string(),
            secret_base: secret_base.to_string(),
            policy: default_policy(),
            lease_hours: default_lease_hours(),
            timeout_secs: default_timeout_secs(),
        }
    }

    #[test]
    fn test_secret_path() {
        assert_eq!(vault_config("cubbyhole/cachette").secret_path(), "cubbyhole/cachette/secret");
        assert_eq!(vault_config("cubbyhole/cachette/").secret_path(), "cubbyhole/cachette/secret");
    }

    #[test]
    fn test_lease_format() {
        let config = vault_config("cubbyhole/cachette");
        assert_eq!(config.lease(), "168h");
        assert_eq!(config.lease_hours * 3600, 604800);
    }
}
