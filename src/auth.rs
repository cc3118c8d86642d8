use std::time::Duration;

use axum::http::HeaderMap;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use sha1::Digest;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

pub const SESSION_HEADER: &str = "x-session-token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Resident,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Resident => "resident",
        }
    }
}

/// Identity carried by a logged-in session. Passed explicitly through
/// request handling; there is no ambient current-user state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub role: Role,
    pub name: String,
    pub room: Option<String>,
}

/// In-memory session store. Tokens are random UUIDs handed to the client at
/// login; the cache is keyed by the SHA-1 digest of the token so the raw
/// value is never retained server-side.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<String, Session>,
}

impl SessionStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(config.session_cache_max_entries)
                .time_to_live(Duration::from_secs(config.session_ttl_seconds))
                .build(),
        }
    }

    /// Create a session and return the raw token for the client to present.
    pub async fn issue(&self, session: Session) -> String {
        let raw_token = uuid::Uuid::new_v4().to_string();
        self.sessions.insert(hash_token(&raw_token), session).await;
        raw_token
    }

    pub async fn resolve(&self, raw_token: &str) -> Option<Session> {
        self.sessions.get(&hash_token(raw_token)).await
    }

    pub async fn revoke(&self, raw_token: &str) {
        self.sessions.invalidate(&hash_token(raw_token)).await;
    }
}

pub fn hash_token(raw_token: &str) -> String {
    hex_encode(sha1::Sha1::digest(raw_token.as_bytes()))
}

fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    bytes
        .as_ref()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

pub fn session_token_from_headers(headers: &HeaderMap) -> AppResult<&str> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Unauthorized(format!("Missing {SESSION_HEADER} header.")))
}

/// Resolve the session presented on a request, or fail with 401.
pub async fn require_session(store: &SessionStore, headers: &HeaderMap) -> AppResult<Session> {
    let raw_token = session_token_from_headers(headers)?;
    store
        .resolve(raw_token)
        .await
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired session.".to_string()))
}

/// Same as `require_session` but additionally demands the admin role.
pub async fn require_admin(store: &SessionStore, headers: &HeaderMap) -> AppResult<Session> {
    let session = require_session(store, headers).await?;
    if session.role != Role::Admin {
        return Err(AppError::Forbidden(
            "Forbidden: administrator access required.".to_string(),
        ));
    }
    Ok(session)
}

/// Check a login attempt against the configured admin credential pair.
pub fn verify_admin_credentials(config: &AppConfig, username: &str, password: &str) -> bool {
    username == config.admin_username && password == config.admin_password
}

#[cfg(test)]
mod tests {
    use super::{
        hash_token, require_admin, require_session, verify_admin_credentials, Role, Session,
        SessionStore, SESSION_HEADER,
    };
    use crate::config::AppConfig;
    use axum::http::HeaderMap;

    fn test_config() -> AppConfig {
        let mut config = AppConfig::from_env();
        config.admin_username = "admin".to_string();
        config.admin_password = "admin123".to_string();
        config
    }

    fn admin_session() -> Session {
        Session {
            user_id: "admin".to_string(),
            role: Role::Admin,
            name: "Admin".to_string(),
            room: None,
        }
    }

    #[test]
    fn token_hashing_is_stable_and_hex() {
        let digest = hash_token("abc");
        assert_eq!(digest.len(), 40);
        assert_eq!(digest, hash_token("abc"));
        assert_ne!(digest, hash_token("abd"));
    }

    #[test]
    fn admin_credentials_require_exact_match() {
        let config = test_config();
        assert!(verify_admin_credentials(&config, "admin", "admin123"));
        assert!(!verify_admin_credentials(&config, "admin", "wrong"));
        assert!(!verify_admin_credentials(&config, "Admin", "admin123"));
    }

    #[tokio::test]
    async fn issued_sessions_resolve_until_revoked() {
        let store = SessionStore::new(&test_config());
        let token = store.issue(admin_session()).await;

        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, token.parse().unwrap());
        let session = require_session(&store, &headers).await.unwrap();
        assert_eq!(session.role, Role::Admin);

        store.revoke(&token).await;
        assert!(require_session(&store, &headers).await.is_err());
    }

    #[tokio::test]
    async fn resident_sessions_fail_admin_guard() {
        let store = SessionStore::new(&test_config());
        let token = store
            .issue(Session {
                user_id: "r-1".to_string(),
                role: Role::Resident,
                name: "Rahul Kumar".to_string(),
                room: Some("101".to_string()),
            })
            .await;

        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, token.parse().unwrap());
        assert!(require_session(&store, &headers).await.is_ok());
        assert!(require_admin(&store, &headers).await.is_err());
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let store = SessionStore::new(&test_config());
        assert!(require_session(&store, &HeaderMap::new()).await.is_err());
    }
}
