use crate::domain::message::{AuditFilter, AuditStats, DailyCount, MessageAttempt};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, OffsetDateTime};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Query string of `GET /admin/api/messages`. Empty values count as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MessageQuery {
    pub phone_number: Option<String>,
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<String>,
}

impl TryFrom<MessageQuery> for AuditFilter {
    type Error = AppError;

    fn try_from(query: MessageQuery) -> Result<Self, Self::Error> {
        let present = |v: Option<String>| v.filter(|s| !s.is_empty());

        let date = present(query.date).map(|d| parse_date("date", &d)).transpose()?;
        // A range only applies when both ends are given.
        let date_range = match (present(query.start_date), present(query.end_date)) {
            (Some(start), Some(end)) => Some((parse_date("start_date", &start)?, parse_date("end_date", &end)?)),
            _ => None,
        };
        let limit = present(query.limit)
            .map(|raw| match raw.parse::<i64>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(AppError::BadRequest("limit must be a positive integer".to_string())),
            })
            .transpose()?;

        Ok(Self { phone_number: present(query.phone_number), date, date_range, limit })
    }
}

fn parse_date(field: &str, raw: &str) -> Result<Date, AppError> {
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::BadRequest(format!("{field} must be a date in YYYY-MM-DD format")))
}

#[derive(Debug, Serialize)]
pub struct MessageAttemptView {
    pub id: i64,
    pub phone_number: String,
    pub message: String,
    pub status: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<MessageAttempt> for MessageAttemptView {
    fn from(attempt: MessageAttempt) -> Self {
        Self {
            id: attempt.id,
            phone_number: attempt.phone_number,
            message: attempt.message,
            status: attempt.status.as_str(),
            created_at: attempt.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub success: bool,
    pub total: i64,
    pub messages: Vec<MessageAttemptView>,
}

#[derive(Debug, Serialize)]
pub struct DailyCountView {
    pub date: String,
    pub count: i64,
}

impl From<DailyCount> for DailyCountView {
    fn from(day: DailyCount) -> Self {
        Self { date: day.date.to_string(), count: day.count }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsView {
    pub total: i64,
    pub unique: i64,
    pub daily: Vec<DailyCountView>,
}

impl From<AuditStats> for StatsView {
    fn from(stats: AuditStats) -> Self {
        Self { total: stats.total, unique: stats.unique, daily: stats.daily.into_iter().map(Into::into).collect() }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: StatsView,
}
