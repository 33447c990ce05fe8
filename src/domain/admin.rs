use time::OffsetDateTime;

#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub admin_id: i64,
    pub email: String,
    pub expires_at: OffsetDateTime,
}

impl AdminSession {
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

/// A freshly issued session together with the opaque token handed to the browser.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub session: AdminSession,
}
