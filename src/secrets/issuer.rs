use crate::config::{AppConfig, LimitsConfig};
use crate::secrets::validate::{validate_secret, ValidationError};
use crate::vault::{VaultClient, VaultError};
use cachette_types::Secret;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, info};

/// Issuance errors.
#[derive(Debug, Error)]
pub enum IssueError {
    #[error("Invalid payload: {0}")]
    Validation(#[from] ValidationError),

    #[error("Backing store failure: {0}")]
    Vault(#[from] VaultError),
}

/// A successfully issued secret: the share token and its computed expiry.
#[derive(Debug, Clone)]
pub struct IssuedSecret {
    pub token: String,
    /// Lease the store granted, in seconds
    pub lease_duration: u64,
    pub expiration: DateTime<Utc>,
}

/// Wraps a submitted secret behind a freshly minted scoped token.
///
/// Holds the privileged master token, passed in explicitly at construction;
/// the master credential is used only to mint share tokens and never
/// touches secret contents.
pub struct Issuer {
    vault: VaultClient,
    master_token: String,
    policies: Vec<String>,
    lease: String,
    secret_path: String,
    limits: LimitsConfig,
}

impl std::fmt::Debug for Issuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Issuer")
            .field("policies", &self.policies)
            .field("lease", &self.lease)
            .field("secret_path", &self.secret_path)
            .finish_non_exhaustive()
    }
}

impl Issuer {
    /// Create a new issuer from config and an explicit master credential.
    pub fn new(vault: VaultClient, master_token: impl Into<String>, config: &AppConfig) -> Self {
        Self {
            vault,
            master_token: master_token.into(),
            policies: vec![config.vault.policy.clone()],
            lease: config.vault.lease(),
            secret_path: config.vault.secret_path(),
            limits: config.limits.clone(),
        }
    }

    /// Issue a share token for `secret`.
    ///
    /// Validates the payload, mints a scoped token under the master
    /// session with the secret's display name as credential metadata, then
    /// writes the payload to the fixed cubbyhole path under a session on
    /// the new token, with the same lease. Mint and write are two
    /// independent calls; if the write fails, the error propagates and the
    /// orphaned token is left to its lease — the caller never receives a
    /// token it cannot redeem.
    pub async fn issue(&self, secret: &Secret) -> Result<IssuedSecret, IssueError> {
        validate_secret(secret, &self.limits)?;

        let mut metadata = HashMap::new();
        metadata.insert("name".to_string(), secret.name.clone());

        let minted = {
            let master = self.vault.session(&self.master_token);
            master.mint_token(&self.policies, &self.lease, &metadata).await.map_err(|e| {
                error!("Minting share token failed: {}", e);
                e
            })?
        };

        {
            let session = self.vault.session(&minted.token);
            session.write(&self.secret_path, &self.lease, secret).await.map_err(|e| {
                error!("Writing secret record failed after mint: {}", e);
                e
            })?;
        }

        // Expiration reflects the lease the store actually granted, so
        // clock or backend drift is reported faithfully to the caller.
        let expiration = Utc::now() + Duration::seconds(minted.lease_duration as i64);

        info!(
            "Issued share token for '{}' with lease {}s",
            secret.name, minted.lease_duration
        );

        Ok(IssuedSecret {
            token: minted.token,
            lease_duration: minted.lease_duration,
            expiration,
        })
    }
}
