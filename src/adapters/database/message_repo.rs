use crate::adapters::database::records::{MessageRecord, datetime_to_micros};
use crate::domain::message::{AuditFilter, AuditStats, DailyCount, DeliveryStatus, MessageAttempt};
use crate::error::{AppError, Result};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use time::macros::format_description;
use time::{Date, OffsetDateTime};

const DAY_OF: &str = "DATE(created_at / 1000000, 'unixepoch')";

#[derive(Clone, Debug, Default)]
pub struct MessageRepository {}

impl MessageRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Records one delivery attempt and returns its identifier.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, conn, message))]
    pub async fn create(
        &self,
        conn: &mut SqliteConnection,
        phone_number: &str,
        message: &str,
        status: DeliveryStatus,
        created_at: OffsetDateTime,
    ) -> Result<i64> {
        let result = sqlx::query(
            r"
            INSERT INTO messages (phone_number, message, status, created_at)
            VALUES (?, ?, ?, ?)
            ",
        )
        .bind(phone_number)
        .bind(message)
        .bind(status.as_str())
        .bind(datetime_to_micros(created_at)?)
        .execute(conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Fetches attempts matching the filter, newest first.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub async fn find_all(&self, conn: &mut SqliteConnection, filter: &AuditFilter) -> Result<Vec<MessageAttempt>> {
        let mut builder =
            QueryBuilder::<Sqlite>::new("SELECT id, phone_number, message, status, created_at FROM messages");
        push_filters(&mut builder, filter);
        builder.push(" ORDER BY created_at DESC, id DESC");
        if let Some(limit) = filter.limit {
            builder.push(" LIMIT ").push_bind(limit);
        }

        let records = builder.build_query_as::<MessageRecord>().fetch_all(conn).await?;
        records.into_iter().map(MessageAttempt::try_from).collect()
    }

    /// Counts attempts matching the filter. The filter's limit is ignored.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub async fn count(&self, conn: &mut SqliteConnection, filter: &AuditFilter) -> Result<i64> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM messages");
        push_filters(&mut builder, filter);

        let count = builder.build_query_scalar::<i64>().fetch_one(conn).await?;
        Ok(count)
    }

    /// All-time totals plus per-day counts for the `days` most recent days that have traffic.
    ///
    /// # Errors
    /// Returns `AppError::Database` if a query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub async fn stats(&self, conn: &mut SqliteConnection, days: i64) -> Result<AuditStats> {
        let (total, unique): (i64, i64) =
            sqlx::query_as("SELECT COUNT(*), COUNT(DISTINCT phone_number) FROM messages").fetch_one(&mut *conn).await?;

        let rows: Vec<(String, i64)> = sqlx::query_as(&format!(
            "SELECT {DAY_OF} AS day, COUNT(*) AS count FROM messages GROUP BY day ORDER BY day DESC LIMIT ?"
        ))
        .bind(days)
        .fetch_all(&mut *conn)
        .await?;

        let daily = rows
            .into_iter()
            .map(|(day, count)| parse_day(&day).map(|date| DailyCount { date, count }))
            .collect::<Result<Vec<_>>>()?;

        Ok(AuditStats { total, unique, daily })
    }
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Sqlite>, filter: &'a AuditFilter) {
    builder.push(" WHERE 1 = 1");

    if let Some(phone_number) = &filter.phone_number {
        builder.push(" AND phone_number = ").push_bind(phone_number.as_str());
    }

    if let Some(date) = filter.date {
        builder.push(format!(" AND {DAY_OF} = ")).push_bind(date.to_string());
    }

    if let Some((start, end)) = filter.date_range {
        builder
            .push(format!(" AND {DAY_OF} BETWEEN "))
            .push_bind(start.to_string())
            .push(" AND ")
            .push_bind(end.to_string());
    }
}

fn parse_day(day: &str) -> Result<Date> {
    Date::parse(day, format_description!("[year]-[month]-[day]"))
        .map_err(|e| AppError::InternalMsg(format!("Unexpected day bucket {day}: {e}")))
}
