use thiserror::Error;

/// Why a call to the messaging gateway did not succeed.
///
/// The `Display` output is the human-readable reason handed back to API callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The gateway answered with a non-success status.
    #[error("{0}")]
    Rejected(String),
    /// The gateway could not be reached at all.
    #[error("Failed to connect to Signal CLI REST API. Make sure it is running.")]
    Unreachable,
    /// The status endpoint did not report the gateway as available.
    #[error("Signal CLI REST API is not available")]
    Unavailable,
}

/// Payload reported by the gateway on success.
pub type GatewayResult = Result<serde_json::Value, GatewayError>;
