use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Fields stay raw JSON: missing or mistyped values are reported by validation, not rejected here.
#[derive(Debug, Deserialize)]
pub struct SendMessage {
    pub phone_number: Option<Value>,
    pub message: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct SendBulkMessage {
    pub phone_numbers: Option<Value>,
    pub message: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendResponse {
    pub success: bool,
    pub message: String,
    pub data: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct ServiceDescriptor {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

impl ServiceDescriptor {
    #[must_use]
    pub fn current() -> Self {
        Self {
            name: "Signal Relay",
            version: env!("CARGO_PKG_VERSION"),
            description: "REST API for sending Signal messages",
            endpoints: BTreeMap::from([
                ("POST /api/send", "Send a message to a single recipient"),
                ("POST /api/send/bulk", "Send a message to multiple recipients"),
                ("GET /api/health", "Check Signal CLI REST API health"),
            ]),
        }
    }
}
