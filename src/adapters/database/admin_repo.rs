use crate::adapters::database::records::{AdminUserRecord, datetime_to_micros};
use crate::domain::admin::AdminUser;
use crate::error::Result;
use sqlx::SqliteConnection;
use time::OffsetDateTime;

#[derive(Clone, Debug, Default)]
pub struct AdminRepository {}

impl AdminRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn find_by_email(&self, conn: &mut SqliteConnection, email: &str) -> Result<Option<AdminUser>> {
        let record = sqlx::query_as::<_, AdminUserRecord>(
            "SELECT id, email, password_hash FROM admin_users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(conn)
        .await?;

        Ok(record.map(Into::into))
    }

    /// Inserts an admin account unless one with the same email already exists.
    /// Returns `true` when a row was written.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, conn, password_hash))]
    pub(crate) async fn create_if_absent(
        &self,
        conn: &mut SqliteConnection,
        email: &str,
        password_hash: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO admin_users (email, password_hash, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT (email) DO NOTHING
            ",
        )
        .bind(email)
        .bind(password_hash)
        .bind(datetime_to_micros(OffsetDateTime::now_utc())?)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
