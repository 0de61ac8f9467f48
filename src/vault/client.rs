use crate::config::VaultConfig;
use cachette_types::{Secret, SecretField, TokenInfo};
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error};

/// Errors talking to the backing store.
///
/// `Forbidden` is the store refusing the token; everything else is the
/// store (or the network) misbehaving. The distinction matters: only
/// `Forbidden` may ever be collapsed into an outward "not found".
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("Backing store denied the operation")]
    Forbidden,

    #[error("Backing store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Backing store unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected backing store response: {0}")]
    InvalidResponse(String),
}

/// A freshly minted scoped credential.
#[derive(Debug, Clone)]
pub struct MintedToken {
    pub token: String,
    /// Lease the store actually granted, in seconds
    pub lease_duration: u64,
}

/// Health report from the store
#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub initialized: bool,
    pub sealed: bool,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Serialize)]
struct CreateTokenRequest<'a> {
    policies: &'a [String],
    ttl: &'a str,
    meta: &'a HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct CreateTokenResponse {
    auth: TokenAuth,
}

#[derive(Debug, Deserialize)]
struct TokenAuth {
    client_token: String,
    lease_duration: u64,
}

#[derive(Debug, Serialize)]
struct WriteRecordRequest<'a> {
    lease: &'a str,
    name: &'a str,
    fields: &'a [SecretField],
}

#[derive(Debug, Deserialize)]
struct ReadRecordResponse {
    data: RecordData,
}

#[derive(Debug, Deserialize)]
struct RecordData {
    #[allow(dead_code)]
    #[serde(default)]
    lease: Option<String>,
    #[serde(default)]
    name: String,
    fields: Vec<SecretField>,
}

#[derive(Debug, Deserialize)]
struct LookupSelfResponse {
    data: LookupData,
}

#[derive(Debug, Deserialize)]
struct LookupData {
    #[serde(default)]
    policies: Vec<String>,
    /// Remaining lease in seconds
    ttl: u64,
    /// Unix timestamp of issuance
    creation_time: i64,
    #[serde(default)]
    meta: Option<HashMap<String, String>>,
}

/// Client for the Vault HTTP API.
///
/// Holds no token itself; callers open a [`VaultSession`] per operation
/// with whichever token that operation is entitled to. Cheap to clone.
#[derive(Clone)]
pub struct VaultClient {
    http: Client,
    base_url: String,
}

impl std::fmt::Debug for VaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl VaultClient {
    /// Create a new client from config
    pub fn new(config: &VaultConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: config.addr.trim_end_matches('/').to_string(),
        }
    }

    /// Open a session scoped to exactly one token. The session lives for
    /// the enclosing scope and is released when dropped.
    pub fn session<'a>(&'a self, token: &'a str) -> VaultSession<'a> {
        VaultSession { client: self, token }
    }

    /// Check whether the store is reachable and unsealed. Unauthenticated;
    /// used only at startup.
    pub async fn health(&self) -> Result<HealthResponse, VaultError> {
        let url = self.url("sys/health");
        debug!("Checking backing store health at {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        // The store reports standby and sealed states through non-200
        // codes with the same body shape
        if !status.is_success() && status != StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().await.unwrap_or_default();
            return Err(VaultError::Status { status: status.as_u16(), body });
        }

        response
            .json()
            .await
            .map_err(|e| VaultError::InvalidResponse(e.to_string()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// A per-call scoped view of the store, authenticated with a single token.
pub struct VaultSession<'a> {
    client: &'a VaultClient,
    token: &'a str,
}

impl std::fmt::Debug for VaultSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSession")
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl VaultSession<'_> {
    /// Mint a new scoped token from this session's credential.
    ///
    /// Only the master session may do this; the store enforces it.
    pub async fn mint_token(
        &self,
        policies: &[String],
        ttl: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<MintedToken, VaultError> {
        let url = self.client.url("auth/token/create");
        debug!("Minting scoped token with policies {:?}, ttl {}", policies, ttl);

        let request = CreateTokenRequest { policies, ttl, meta: metadata };
        let response = self
            .client
            .http
            .post(&url)
            .header("X-Vault-Token", self.token)
            .json(&request)
            .send()
            .await?;

        let response = ensure_ok(response).await?;
        let parsed: CreateTokenResponse = response
            .json()
            .await
            .map_err(|e| VaultError::InvalidResponse(e.to_string()))?;

        Ok(MintedToken {
            token: parsed.auth.client_token,
            lease_duration: parsed.auth.lease_duration,
        })
    }

    /// Write the secret payload at `path`, reachable only by this
    /// session's token, with the given lease.
    pub async fn write(
        &self,
        path: &str,
        lease: &str,
        secret: &Secret,
    ) -> Result<(), VaultError> {
        let url = self.client.url(path);
        debug!("Writing secret record to {}", path);

        let request = WriteRecordRequest { lease, name: &secret.name, fields: &secret.fields };
        let response = self
            .client
            .http
            .post(&url)
            .header("X-Vault-Token", self.token)
            .json(&request)
            .send()
            .await?;

        ensure_ok(response).await?;
        Ok(())
    }

    /// Read the secret payload at `path`. Returns `None` when the store
    /// has no record there (the token is valid but nothing was written, or
    /// the record's lease ran out ahead of the token's).
    pub async fn read(&self, path: &str) -> Result<Option<Secret>, VaultError> {
        let url = self.client.url(path);
        debug!("Reading secret record from {}", path);

        let response = self
            .client
            .http
            .get(&url)
            .header("X-Vault-Token", self.token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = ensure_ok(response).await?;
        let parsed: ReadRecordResponse = response
            .json()
            .await
            .map_err(|e| VaultError::InvalidResponse(e.to_string()))?;

        Ok(Some(Secret { name: parsed.data.name, fields: parsed.data.fields }))
    }

    /// Look up this session's own token: policies, remaining lease,
    /// issuance time, and metadata.
    pub async fn lookup_self(&self) -> Result<TokenInfo, VaultError> {
        let url = self.client.url("auth/token/lookup-self");
        debug!("Looking up token metadata");

        let response = self
            .client
            .http
            .get(&url)
            .header("X-Vault-Token", self.token)
            .send()
            .await?;

        let response = ensure_ok(response).await?;
        let parsed: LookupSelfResponse = response
            .json()
            .await
            .map_err(|e| VaultError::InvalidResponse(e.to_string()))?;

        let issued_at = DateTime::<Utc>::from_timestamp(parsed.data.creation_time, 0)
            .ok_or_else(|| {
                VaultError::InvalidResponse(format!(
                    "creation_time {} out of range",
                    parsed.data.creation_time
                ))
            })?;

        Ok(TokenInfo {
            policies: parsed.data.policies,
            lease_duration: parsed.data.ttl,
            issued_at,
            metadata: parsed.data.meta.unwrap_or_default(),
        })
    }
}

/// Map non-success statuses into the error taxonomy. 403 is the store
/// denying the token; anything else non-success is a backend failure.
async fn ensure_ok(response: reqwest::Response) -> Result<reqwest::Response, VaultError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::FORBIDDEN {
        debug!("Backing store denied the token");
        return Err(VaultError::Forbidden);
    }

    let body = response.text().await.unwrap_or_default();
    error!("Backing store returned {}: {}", status, body);
    Err(VaultError::Status { status: status.as_u16(), body })
}
