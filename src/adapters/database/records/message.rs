use crate::domain::message::{DeliveryStatus, MessageAttempt};
use crate::error::AppError;
use time::OffsetDateTime;

#[derive(Debug, sqlx::FromRow)]
pub struct MessageRecord {
    pub(crate) id: i64,
    pub(crate) phone_number: String,
    pub(crate) message: String,
    pub(crate) status: String,
    pub(crate) created_at: i64,
}

impl TryFrom<MessageRecord> for MessageAttempt {
    type Error = AppError;

    fn try_from(record: MessageRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            phone_number: record.phone_number,
            message: record.message,
            status: record.status.parse::<DeliveryStatus>().map_err(AppError::InternalMsg)?,
            created_at: micros_to_datetime(record.created_at)?,
        })
    }
}

/// Timestamps are stored as microseconds since the unix epoch (UTC).
///
/// # Errors
/// Returns `AppError::InternalMsg` if the value is outside the representable range.
pub fn datetime_to_micros(at: OffsetDateTime) -> Result<i64, AppError> {
    i64::try_from(at.unix_timestamp_nanos() / 1_000)
        .map_err(|e| AppError::InternalMsg(format!("Timestamp out of range: {e}")))
}

/// # Errors
/// Returns `AppError::InternalMsg` if the value is outside the representable range.
pub fn micros_to_datetime(micros: i64) -> Result<OffsetDateTime, AppError> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(micros) * 1_000)
        .map_err(|e| AppError::InternalMsg(format!("Invalid stored timestamp {micros}: {e}")))
}
