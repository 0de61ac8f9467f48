//! Wire types shared by the cachette service and the companion CLI.
//!
//! These are the request/response shapes of the public HTTP API. Secret
//! payload types hold plaintext secret material while a request is in
//! flight, so they zeroize their values on drop; they are never persisted
//! outside the backing store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use zeroize::Zeroize;

/// One named value inside a shared secret.
///
/// Both `name` and `value` are bounded (100 characters by default); the
/// service validates the bounds before touching the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretField {
    pub name: String,
    pub value: String,
}

impl Drop for SecretField {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

/// The full payload a sender wants to share: a display name plus an ordered
/// list of fields. Exists only transiently in requests and responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    pub name: String,
    pub fields: Vec<SecretField>,
}

/// Response to a successful secret creation.
///
/// `token` is the sole capability for redeeming the secret; `url` is the
/// informational share link built from the service's public URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSecretResponse {
    pub url: String,
    pub token: String,
    /// ISO-8601 expiration, computed from the lease the backing store
    /// actually granted.
    pub expiration: DateTime<Utc>,
}

/// Metadata view of an issued credential, as reported by the backing
/// store's self-lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub policies: Vec<String>,
    /// Remaining lease in seconds.
    pub lease_duration: u64,
    pub issued_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_round_trip() {
        let secret = Secret {
            name: "db-creds".to_string(),
            fields: vec![
                SecretField { name: "user".to_string(), value: "alice".to_string() },
                SecretField { name: "pass".to_string(), value: "s3cr3t".to_string() },
            ],
        };

        let json = serde_json::to_string(&secret).unwrap();
        let parsed: Secret = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, secret);
        assert_eq!(parsed.fields[0].name, "user");
        assert_eq!(parsed.fields[1].value, "s3cr3t");
    }

    #[test]
    fn test_token_info_defaults_metadata() {
        let json = r#"{
            "policies": ["cachette-share"],
            "lease_duration": 604800,
            "issued_at": "2024-05-01T00:00:00Z"
        }"#;
        let info: TokenInfo = serde_json::from_str(json).unwrap();
        assert!(info.metadata.is_empty());
        assert_eq!(info.lease_duration, 604800);
    }

    #[test]
    fn test_create_secret_response_expiration_is_iso8601() {
        let response = CreateSecretResponse {
            url: "http://localhost:3000/show/tok".to_string(),
            token: "tok".to_string(),
            expiration: "2024-05-08T00:00:00Z".parse().unwrap(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("2024-05-08T00:00:00Z"));
    }
}
