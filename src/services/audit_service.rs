use crate::adapters::database::DbPool;
use crate::adapters::database::message_repo::MessageRepository;
use crate::domain::message::{AuditFilter, AuditStats, DeliveryStatus, MessageAttempt, STATS_DAYS};
use crate::error::Result;
use time::OffsetDateTime;

/// Append-only log of delivery attempts with a filtered read path.
#[derive(Clone, Debug)]
pub struct AuditService {
    pool: DbPool,
    repo: MessageRepository,
}

impl AuditService {
    #[must_use]
    pub const fn new(pool: DbPool, repo: MessageRepository) -> Self {
        Self { pool, repo }
    }

    /// Persists one attempt, stamped with the current time.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the write fails.
    #[tracing::instrument(err(level = "warn"), skip(self, message), fields(phone_number = %phone_number, status = status.as_str()))]
    pub async fn append(&self, phone_number: &str, message: &str, status: DeliveryStatus) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        self.repo.create(&mut conn, phone_number, message, status, OffsetDateTime::now_utc()).await
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn query(&self, filter: &AuditFilter) -> Result<Vec<MessageAttempt>> {
        let mut conn = self.pool.acquire().await?;
        self.repo.find_all(&mut conn, filter).await
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn count(&self, filter: &AuditFilter) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        self.repo.count(&mut conn, filter).await
    }

    /// All-time totals plus a per-day breakdown of the last seven days with traffic.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn aggregate_stats(&self) -> Result<AuditStats> {
        let mut conn = self.pool.acquire().await?;
        self.repo.stats(&mut conn, STATS_DAYS).await
    }
}
