use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use time::{Date, OffsetDateTime};

static E164: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+[1-9][0-9]{1,14}$").expect("valid E.164 pattern"));

/// Upper bound on a message body, counted in characters.
pub const MAX_BODY_CHARS: usize = 4096;

/// A recipient identifier in E.164 form (`+` followed by 2-15 digits, no leading zero).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        E164.is_match(raw).then(|| Self(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBody(String);

impl MessageBody {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let len = raw.chars().count();
        (1..=MAX_BODY_CHARS).contains(&len).then(|| Self(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

impl DeliveryStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown delivery status: {other}")),
        }
    }
}

/// A single problem with an inbound request, reported against the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

/// A send request that has passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchRequest {
    Single { recipient: PhoneNumber, body: MessageBody },
    Bulk { recipients: Vec<PhoneNumber>, body: MessageBody },
}

impl DispatchRequest {
    #[must_use]
    pub fn recipients(&self) -> &[PhoneNumber] {
        match self {
            Self::Single { recipient, .. } => std::slice::from_ref(recipient),
            Self::Bulk { recipients, .. } => recipients,
        }
    }

    #[must_use]
    pub const fn body(&self) -> &MessageBody {
        match self {
            Self::Single { body, .. } | Self::Bulk { body, .. } => body,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Single { .. } => "single",
            Self::Bulk { .. } => "bulk",
        }
    }
}

/// Outcome of a dispatch whose gateway call succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReceipt {
    pub recipients: usize,
    pub payload: serde_json::Value,
}

/// One audited delivery attempt for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageAttempt {
    pub id: i64,
    pub phone_number: String,
    pub message: String,
    pub status: DeliveryStatus,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub phone_number: Option<String>,
    pub date: Option<Date>,
    /// Inclusive range of creation dates.
    pub date_range: Option<(Date, Date)>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyCount {
    pub date: Date,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditStats {
    pub total: i64,
    pub unique: i64,
    /// Most recent days first, at most [`STATS_DAYS`] entries.
    pub daily: Vec<DailyCount>,
}

pub const STATS_DAYS: i64 = 7;
