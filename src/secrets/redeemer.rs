use crate::config::AppConfig;
use crate::vault::{VaultClient, VaultError};
use cachette_types::{Secret, TokenInfo};
use tracing::debug;

/// Outward result of a redemption: either the data, or a deliberately
/// uninformative "not found". Wrong, expired, foreign, and never-issued
/// tokens all land on [`Redemption::NotFound`].
#[derive(Debug, Clone, PartialEq)]
pub enum Redemption<T> {
    Found(T),
    NotFound,
}

/// Redeems previously issued share tokens.
///
/// Holds no privileged credentials; every operation opens a session on the
/// supplied token alone, performs exactly one read, and lets the session
/// end with the scope.
#[derive(Debug)]
pub struct Redeemer {
    vault: VaultClient,
    secret_path: String,
}

impl Redeemer {
    pub fn new(vault: VaultClient, config: &AppConfig) -> Self {
        Self { vault, secret_path: config.vault.secret_path() }
    }

    /// Look up the token's own metadata: policies, remaining lease,
    /// issuance time.
    pub async fn peek_metadata(&self, token: &str) -> Result<Redemption<TokenInfo>, VaultError> {
        let session = self.vault.session(token);
        let result = session.lookup_self().await.map(Some);
        self.collapse(token, result)
    }

    /// Read the secret payload the token was issued for.
    pub async fn read_contents(&self, token: &str) -> Result<Redemption<Secret>, VaultError> {
        let session = self.vault.session(token);
        let result = session.read(&self.secret_path).await;
        self.collapse(token, result)
    }

    /// The single mapping point for the uniform not-found policy: the
    /// store denying a token collapses to `NotFound`, as does a missing
    /// record; every other failure propagates untouched.
    fn collapse<T>(
        &self,
        token: &str,
        result: Result<Option<T>, VaultError>,
    ) -> Result<Redemption<T>, VaultError> {
        match result {
            Ok(Some(value)) => Ok(Redemption::Found(value)),
            Ok(None) => Ok(Redemption::NotFound),
            Err(VaultError::Forbidden) => {
                debug!("Redemption denied for token {}…", &token[..8.min(token.len())]);
                Ok(Redemption::NotFound)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, LimitsConfig, VaultConfig, WebConfig};

    fn redeemer() -> Redeemer {
        let config = AppConfig {
            vault: VaultConfig {
                addr: "http://127.0.0.1:8200".to_string(),
                master_token: String::new(),
                secret_base: "cubbyhole/cachette".to_string(),
                policy: "cachette-share".to_string(),
                lease_hours: 168,
                timeout_secs: 1,
            },
            web: WebConfig::default(),
            limits: LimitsConfig::default(),
        };
        Redeemer::new(VaultClient::new(&config.vault), &config)
    }

    #[test]
    fn test_collapse_found() {
        let r = redeemer();
        assert_eq!(r.collapse("tok", Ok(Some(1))).unwrap(), Redemption::Found(1));
    }

    #[test]
    fn test_collapse_missing_record() {
        let r = redeemer();
        assert_eq!(r.collapse::<u32>("tok", Ok(None)).unwrap(), Redemption::NotFound);
    }

    #[test]
    fn test_collapse_denied_is_not_found() {
        // Wrong token and expired token must be indistinguishable
        let r = redeemer();
        let result = r.collapse::<u32>("tok", Err(VaultError::Forbidden));
        assert_eq!(result.unwrap(), Redemption::NotFound);
    }

    #[test]
    fn test_collapse_short_token_does_not_panic() {
        let r = redeemer();
        assert_eq!(
            r.collapse::<u32>("ab", Err(VaultError::Forbidden)).unwrap(),
            Redemption::NotFound
        );
    }

    #[test]
    fn test_backend_errors_are_not_collapsed() {
        let r = redeemer();
        let result = r.collapse::<u32>(
            "tok",
            Err(VaultError::Status { status: 500, body: "internal".to_string() }),
        );
        assert!(matches!(result, Err(VaultError::Status { status: 500, .. })));
    }
}
