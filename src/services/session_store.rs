use crate::domain::admin::{AdminSession, AdminUser, IssuedSession};
use base64::Engine;
use dashmap::DashMap;
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use time::{Duration, OffsetDateTime};

/// Server-side admin sessions, keyed by the SHA-256 of the opaque cookie token.
///
/// Lives in process memory, so sessions do not survive a restart and are not
/// shared between instances.
#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, AdminSession>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, admin: &AdminUser, ttl: Duration) -> IssuedSession {
        let now = OffsetDateTime::now_utc();
        self.sessions.retain(|_, session| !session.is_expired_at(now));

        let token = generate_opaque_token();
        let session = AdminSession { admin_id: admin.id, email: admin.email.clone(), expires_at: now + ttl };
        self.sessions.insert(hash_opaque_token(&token), session.clone());

        IssuedSession { token, session }
    }

    /// Looks up a live session. Expired sessions are dropped on sight.
    #[must_use]
    pub fn get(&self, token: &str) -> Option<AdminSession> {
        let key = hash_opaque_token(token);
        let session = self.sessions.get(&key).map(|entry| entry.value().clone())?;

        if session.is_expired_at(OffsetDateTime::now_utc()) {
            self.sessions.remove(&key);
            return None;
        }
        Some(session)
    }

    pub fn revoke(&self, token: &str) {
        self.sessions.remove(&hash_opaque_token(token));
    }
}

fn generate_opaque_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn hash_opaque_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> AdminUser {
        AdminUser { id: 7, email: "ops@example.com".to_string(), password_hash: String::new() }
    }

    #[test]
    fn test_issue_then_get() {
        let store = SessionStore::new();
        let issued = store.issue(&admin(), Duration::hours(1));

        let session = store.get(&issued.token).unwrap();
        assert_eq!(session.admin_id, 7);
        assert_eq!(session.email, "ops@example.com");
        assert!(store.get("not-a-token").is_none());
    }

    #[test]
    fn test_tokens_are_unique_and_not_stored_in_clear() {
        let store = SessionStore::new();
        let first = store.issue(&admin(), Duration::hours(1));
        let second = store.issue(&admin(), Duration::hours(1));

        assert_ne!(first.token, second.token);
        assert!(!store.sessions.contains_key(&first.token));
        assert!(store.sessions.contains_key(&hash_opaque_token(&first.token)));
    }

    #[test]
    fn test_expired_session_rejected_and_pruned() {
        let store = SessionStore::new();
        let issued = store.issue(&admin(), Duration::seconds(-1));

        assert!(store.get(&issued.token).is_none());
        assert!(store.sessions.is_empty());
    }

    #[test]
    fn test_revoke() {
        let store = SessionStore::new();
        let issued = store.issue(&admin(), Duration::hours(1));

        store.revoke(&issued.token);
        assert!(store.get(&issued.token).is_none());
    }
}
