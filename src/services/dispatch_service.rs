use crate::domain::message::{DeliveryStatus, DispatchReceipt, DispatchRequest};
use crate::error::{AppError, Result};
use crate::services::audit_service::AuditService;
use crate::services::gateway::MessagingGateway;
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub(crate) struct Metrics {
    pub(crate) dispatch_total: Counter<u64>,
    pub(crate) audit_failures_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("relay-server");
        Self {
            dispatch_total: meter
                .u64_counter("relay_dispatch_total")
                .with_description("Dispatch attempts by kind and gateway outcome")
                .build(),
            audit_failures_total: meter
                .u64_counter("relay_audit_write_failures_total")
                .with_description("Audit records that could not be persisted")
                .build(),
        }
    }
}

/// Forwards validated requests to the gateway and audits the outcome per recipient.
#[derive(Clone, Debug)]
pub struct DispatchService {
    gateway: Arc<dyn MessagingGateway>,
    audit: AuditService,
    metrics: Metrics,
}

impl DispatchService {
    #[must_use]
    pub fn new(gateway: Arc<dyn MessagingGateway>, audit: AuditService) -> Self {
        Self { gateway, audit, metrics: Metrics::new() }
    }

    /// Makes exactly one gateway call for the whole request, then writes one audit
    /// record per recipient carrying that call's outcome.
    ///
    /// Audit writes are best-effort: a failed write is logged and never changes the
    /// result returned to the caller.
    ///
    /// # Errors
    /// Returns `AppError::Gateway` with the gateway's reason if the send failed.
    #[tracing::instrument(
        err(level = "warn"),
        skip(self, request),
        fields(kind = request.kind(), recipient_count = request.recipients().len())
    )]
    pub async fn dispatch(&self, request: DispatchRequest) -> Result<DispatchReceipt> {
        let recipients = request.recipients();
        let body = request.body().as_str();

        let outcome = self.gateway.send_message(&request).await;
        let status = if outcome.is_ok() { DeliveryStatus::Sent } else { DeliveryStatus::Failed };

        for recipient in recipients {
            if let Err(e) = self.audit.append(recipient.as_str(), body, status).await {
                tracing::error!(error = %e, recipient = %recipient, "Failed to record delivery attempt");
                self.metrics.audit_failures_total.add(1, &[]);
            }
        }

        self.metrics
            .dispatch_total
            .add(1, &[KeyValue::new("kind", request.kind()), KeyValue::new("status", status.as_str())]);

        match outcome {
            Ok(payload) => {
                tracing::info!("Message dispatched");
                Ok(DispatchReceipt { recipients: recipients.len(), payload })
            }
            Err(e) => Err(AppError::Gateway(e.to_string())),
        }
    }
}
