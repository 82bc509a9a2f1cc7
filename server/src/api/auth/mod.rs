//! Session authentication
//!
//! HS256 JWT session cookies signed with a key generated once and persisted
//! in the data directory. OTP and password verification happens in the auth
//! routes; this module owns token lifecycle and the route guard.

pub mod jwt;
pub mod middleware;

pub use jwt::{JwtError, SessionClaims, create_session_token, validate_session_token};
pub use middleware::{AuthState, SessionMember, require_auth};

use anyhow::{Context, Result};

use crate::core::config::AuthConfig;
use crate::core::constants::SIGNING_KEY_FILENAME;
use crate::core::storage::{AppStorage, DataSubdir};
use crate::utils::crypto::generate_signing_key;

/// Manages the session signing key and token issuance
pub struct AuthManager {
    enabled: bool,
    session_ttl_days: u32,
    signing_key: Vec<u8>,
}

impl AuthManager {
    /// Load the signing key from the data directory, generating it on first run
    pub async fn init(storage: &AppStorage, config: &AuthConfig) -> Result<Self> {
        let key_path = storage.subdir_path(DataSubdir::Keys, SIGNING_KEY_FILENAME);

        let signing_key = match tokio::fs::read_to_string(&key_path).await {
            Ok(contents) => hex::decode(contents.trim())
                .with_context(|| format!("Corrupt signing key file: {}", key_path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let key = generate_signing_key();
                tokio::fs::write(&key_path, hex::encode(&key))
                    .await
                    .with_context(|| {
                        format!("Failed to write signing key: {}", key_path.display())
                    })?;
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    let perms = std::fs::Permissions::from_mode(0o600);
                    tokio::fs::set_permissions(&key_path, perms).await.ok();
                }
                tracing::debug!(path = %key_path.display(), "Generated session signing key");
                key
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read signing key: {}", key_path.display())
                });
            }
        };

        Ok(Self {
            enabled: config.enabled,
            session_ttl_days: config.session_ttl_days,
            signing_key,
        })
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn session_ttl_days(&self) -> u32 {
        self.session_ttl_days
    }

    /// Issue a session token for a member
    pub fn create_session(&self, member_id: &str, auth_method: &str) -> Result<String> {
        create_session_token(
            &self.signing_key,
            member_id,
            auth_method,
            self.session_ttl_days,
        )
    }

    /// Validate a session token
    pub fn validate(&self, token: &str) -> Result<SessionClaims, JwtError> {
        validate_session_token(token, &self.signing_key)
    }

    #[cfg(test)]
    pub fn for_test(enabled: bool) -> Self {
        Self {
            enabled,
            session_ttl_days: 30,
            signing_key: vec![9u8; 32],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_key_persisted_across_inits() {
        let temp = tempfile::tempdir().unwrap();
        let data_dir = temp.path().to_path_buf();
        tokio::fs::create_dir_all(data_dir.join("keys"))
            .await
            .unwrap();
        let storage = AppStorage::init_for_test(data_dir);
        let config = AuthConfig {
            enabled: true,
            session_ttl_days: 30,
        };

        let first = AuthManager::init(&storage, &config).await.unwrap();
        let token = first.create_session("m1", "otp").unwrap();

        // A second init reads the same key and can validate the token
        let second = AuthManager::init(&storage, &config).await.unwrap();
        let claims = second.validate(&token).unwrap();
        assert_eq!(claims.member_id(), "m1");
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let auth = AuthManager::for_test(true);
        let token = auth.create_session("m2", "password").unwrap();
        let claims = auth.validate(&token).unwrap();
        assert_eq!(claims.auth_method, "password");
    }
}
