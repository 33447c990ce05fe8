use crate::domain::gateway::GatewayResult;
use crate::domain::message::DispatchRequest;
use async_trait::async_trait;

#[async_trait]
pub trait MessagingGateway: Send + Sync + std::fmt::Debug {
    /// Sends the request's body to every one of its recipients with a single gateway call.
    ///
    /// Transport failures and gateway-reported errors both resolve to `Err`; nothing is retried.
    async fn send_message(&self, request: &DispatchRequest) -> GatewayResult;

    /// Asks the gateway whether it is available. Never panics, always resolves.
    async fn health_check(&self) -> GatewayResult;
}
