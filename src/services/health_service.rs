use crate::adapters::database::DbPool;
use crate::config::HealthConfig;
use crate::domain::gateway::GatewayResult;
use crate::services::gateway::MessagingGateway;
use opentelemetry::{KeyValue, global, metrics::Gauge};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

#[derive(Clone, Debug)]
pub struct Metrics {
    pub status: Gauge<i64>,
}

impl Metrics {
    #[must_use]
    pub(crate) fn new() -> Self {
        let meter = global::meter("relay-server");
        Self {
            status: meter
                .i64_gauge("relay_health_status")
                .with_description("Status of health checks (1 for ok, 0 for error)")
                .build(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
pub struct HealthService {
    pool: DbPool,
    gateway: Arc<dyn MessagingGateway>,
    config: HealthConfig,
    metrics: Metrics,
}

impl HealthService {
    #[must_use]
    pub fn new(pool: DbPool, gateway: Arc<dyn MessagingGateway>, config: HealthConfig) -> Self {
        Self { pool, gateway, config, metrics: Metrics::new() }
    }

    /// Raw gateway status as reported by its status endpoint.
    pub async fn gateway_status(&self) -> GatewayResult {
        let result = self.gateway.health_check().await;
        self.metrics.status.record(i64::from(result.is_ok()), &[KeyValue::new("component", "gateway")]);
        result
    }

    /// Checks database connectivity.
    ///
    /// # Errors
    /// Returns a string describing the failure if the database is unreachable.
    pub async fn check_db(&self) -> Result<(), String> {
        let db_timeout = Duration::from_millis(self.config.db_timeout_ms);

        match timeout(db_timeout, sqlx::query("SELECT 1").execute(&self.pool)).await {
            Ok(Ok(_)) => {
                self.metrics.status.record(1, &[KeyValue::new("component", "database")]);
                Ok(())
            }
            Ok(Err(e)) => {
                self.metrics.status.record(0, &[KeyValue::new("component", "database")]);
                Err(format!("Database connection failed: {e:?}"))
            }
            Err(_) => {
                self.metrics.status.record(0, &[KeyValue::new("component", "database")]);
                Err("Database connection timed out".to_string())
            }
        }
    }

    /// Checks that the messaging gateway answers its status endpoint.
    ///
    /// # Errors
    /// Returns a string describing the failure if the gateway is unavailable.
    pub async fn check_gateway(&self) -> Result<(), String> {
        let gateway_timeout = Duration::from_millis(self.config.gateway_timeout_ms);

        match timeout(gateway_timeout, self.gateway_status()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => {
                self.metrics.status.record(0, &[KeyValue::new("component", "gateway")]);
                Err("Gateway status check timed out".to_string())
            }
        }
    }
}
