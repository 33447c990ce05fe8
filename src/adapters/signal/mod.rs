use crate::config::GatewayConfig;
use crate::domain::gateway::{GatewayError, GatewayResult};
use crate::domain::message::{DispatchRequest, PhoneNumber};
use crate::services::gateway::MessagingGateway;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

/// Client for the signal-cli REST API (`/v2/send`, `/v1/about`).
#[derive(Debug, Clone)]
pub struct SignalRestGateway {
    client: Client,
    base_url: String,
    sender_number: String,
}

#[derive(Debug, Serialize)]
struct SendPayload<'a> {
    message: &'a str,
    number: &'a str,
    recipients: Vec<&'a str>,
}

impl SignalRestGateway {
    #[must_use]
    pub fn new(config: &GatewayConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    #[must_use]
    pub fn with_client(client: Client, config: &GatewayConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            sender_number: config.sender_number.clone(),
        }
    }
}

#[async_trait]
impl MessagingGateway for SignalRestGateway {
    #[tracing::instrument(skip(self, request), fields(kind = request.kind(), recipient_count = request.recipients().len()))]
    async fn send_message(&self, request: &DispatchRequest) -> GatewayResult {
        let payload = SendPayload {
            message: request.body().as_str(),
            number: &self.sender_number,
            recipients: request.recipients().iter().map(PhoneNumber::as_str).collect(),
        };

        let response = match self.client.post(format!("{}/v2/send", self.base_url)).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Gateway unreachable");
                return Err(GatewayError::Unreachable);
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(bytes) => serde_json::from_slice::<Value>(&bytes).unwrap_or(Value::Null),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read gateway response");
                return Err(GatewayError::Unreachable);
            }
        };

        if status.is_success() {
            return Ok(body);
        }

        let reason = rejection_reason(request, &body);
        tracing::warn!(status = %status.as_u16(), reason = %reason, "Gateway rejected message");
        Err(GatewayError::Rejected(reason))
    }

    #[tracing::instrument(skip(self))]
    async fn health_check(&self) -> GatewayResult {
        match self.client.get(format!("{}/v1/about", self.base_url)).send().await {
            Ok(response) if response.status().is_success() => {
                Ok(response.json::<Value>().await.unwrap_or(Value::Null))
            }
            Ok(response) => {
                tracing::debug!(status = %response.status().as_u16(), "Gateway status check failed");
                Err(GatewayError::Unavailable)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Gateway status check failed");
                Err(GatewayError::Unavailable)
            }
        }
    }
}

/// The gateway's own `error` text, or a default worded by request kind.
fn rejection_reason(request: &DispatchRequest, body: &Value) -> String {
    if let Some(reason) = body.get("error").and_then(Value::as_str) {
        return reason.to_string();
    }
    match request {
        DispatchRequest::Single { .. } => "Failed to send message via Signal".to_string(),
        DispatchRequest::Bulk { .. } => "Failed to send messages via Signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message::MessageBody;

    #[test]
    fn test_trailing_slash_trimmed_from_base_url() {
        let gateway = SignalRestGateway::new(&GatewayConfig {
            base_url: "http://signal:8080/".to_string(),
            sender_number: "+15550000000".to_string(),
        });

        assert_eq!(gateway.base_url, "http://signal:8080");
    }

    #[test]
    fn test_payload_shape() {
        let recipients = [PhoneNumber::parse("+15551111111").unwrap(), PhoneNumber::parse("+15552222222").unwrap()];
        let payload = SendPayload {
            message: "hi",
            number: "+15550000000",
            recipients: recipients.iter().map(PhoneNumber::as_str).collect(),
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({
                "message": "hi",
                "number": "+15550000000",
                "recipients": ["+15551111111", "+15552222222"],
            })
        );
    }

    #[test]
    fn test_rejection_reason_prefers_gateway_error() {
        let request = DispatchRequest::Single {
            recipient: PhoneNumber::parse("+15551111111").unwrap(),
            body: MessageBody::parse("hi").unwrap(),
        };

        assert_eq!(rejection_reason(&request, &serde_json::json!({ "error": "Unregistered user" })), "Unregistered user");
        assert_eq!(rejection_reason(&request, &Value::Null), "Failed to send message via Signal");
    }

    #[test]
    fn test_rejection_reason_follows_request_kind_not_recipient_count() {
        let request = DispatchRequest::Bulk {
            recipients: vec![PhoneNumber::parse("+15551111111").unwrap()],
            body: MessageBody::parse("hi").unwrap(),
        };

        assert_eq!(rejection_reason(&request, &Value::Null), "Failed to send messages via Signal");
    }
}
