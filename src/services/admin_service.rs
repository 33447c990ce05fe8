use crate::adapters::database::DbPool;
use crate::adapters::database::admin_repo::AdminRepository;
use crate::config::AdminConfig;
use crate::domain::admin::{AdminSession, IssuedSession};
use crate::error::{AppError, Result};
use crate::services::session_store::SessionStore;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use opentelemetry::{KeyValue, global, metrics::Counter};
use rand::rngs::OsRng;
use time::Duration;

#[derive(Clone, Debug)]
struct Metrics {
    login_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("relay-server");
        Self {
            login_total: meter
                .u64_counter("relay_admin_login_total")
                .with_description("Admin login attempts by result")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AdminService {
    pool: DbPool,
    repo: AdminRepository,
    sessions: SessionStore,
    config: AdminConfig,
    metrics: Metrics,
}

impl AdminService {
    #[must_use]
    pub fn new(pool: DbPool, repo: AdminRepository, sessions: SessionStore, config: AdminConfig) -> Self {
        Self { pool, repo, sessions, config, metrics: Metrics::new() }
    }

    /// Verifies credentials and opens a session.
    ///
    /// # Errors
    /// Returns `AppError::AuthError` for an unknown email or a wrong password.
    #[tracing::instrument(skip(self, email, password), fields(admin_id = tracing::field::Empty), err(level = "warn"))]
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedSession> {
        let mut conn = self.pool.acquire().await?;
        let Some(admin) = self.repo.find_by_email(&mut conn, email).await? else {
            tracing::warn!("Login failed: admin not found");
            self.metrics.login_total.add(1, &[KeyValue::new("result", "failure")]);
            return Err(AppError::AuthError);
        };
        drop(conn);

        tracing::Span::current().record("admin_id", admin.id);

        if !self.verify_password(password, &admin.password_hash).await? {
            tracing::warn!("Login failed: invalid password");
            self.metrics.login_total.add(1, &[KeyValue::new("result", "failure")]);
            return Err(AppError::AuthError);
        }

        let ttl = Duration::seconds(i64::try_from(self.config.session_ttl_secs).unwrap_or(i64::MAX));
        let issued = self.sessions.issue(&admin, ttl);
        self.metrics.login_total.add(1, &[KeyValue::new("result", "success")]);
        tracing::info!("Admin logged in");
        Ok(issued)
    }

    #[must_use]
    pub fn authenticate(&self, token: &str) -> Option<AdminSession> {
        self.sessions.get(token)
    }

    pub fn logout(&self, token: &str) {
        self.sessions.revoke(token);
    }

    #[must_use]
    pub const fn config(&self) -> &AdminConfig {
        &self.config
    }

    /// Creates the admin account if no account with this email exists yet.
    /// Returns `true` when an account was created.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the write fails, `AppError::Internal` if hashing fails.
    #[tracing::instrument(skip(self, password), err)]
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<bool> {
        let password_hash = self.hash_password(password).await?;
        let mut conn = self.pool.acquire().await?;
        let created = self.repo.create_if_absent(&mut conn, email, &password_hash).await?;
        if created {
            tracing::info!("Bootstrap admin account created");
        }
        Ok(created)
    }

    #[tracing::instrument(err, skip(self, password))]
    pub async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map_err(|_| AppError::Internal)
                .map(|h| h.to_string())
        })
        .await
        .map_err(|_| AppError::Internal)?
    }

    #[tracing::instrument(err, skip(self, password, password_hash))]
    pub async fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool> {
        let password = password.to_string();
        let password_hash = password_hash.to_string();
        tokio::task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash).map_err(|_| AppError::Internal)?;
            Ok(Argon2::default().verify_password(password.as_bytes(), &parsed_hash).is_ok())
        })
        .await
        .map_err(|_| AppError::Internal)?
    }
}
