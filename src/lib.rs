#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;

use crate::adapters::database::DbPool;
use crate::adapters::database::admin_repo::AdminRepository;
use crate::adapters::database::message_repo::MessageRepository;
use crate::adapters::signal::SignalRestGateway;
use crate::api::ServiceContainer;
use crate::config::Config;
use crate::services::admin_service::AdminService;
use crate::services::audit_service::AuditService;
use crate::services::dispatch_service::DispatchService;
use crate::services::gateway::MessagingGateway;
use crate::services::health_service::HealthService;
use crate::services::session_store::SessionStore;
use std::sync::Arc;
use tokio::sync::watch;

/// Applies pending schema migrations.
///
/// # Errors
/// Returns `MigrateError` if a migration fails to apply.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!().run(pool).await
}

/// Flips the shutdown channel on Ctrl+C or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }

        tracing::info!("Shutdown signal received, starting graceful shutdown");
        let _ = shutdown_tx.send(true);
    });
}

/// Routes panics through `tracing` so they reach the configured log sink.
pub fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map(ToString::to_string).unwrap_or_default();
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("unknown panic");
        tracing::error!(panic.location = %location, panic.payload = %payload, "Process panicked");
    }));
}

#[derive(Debug)]
pub struct App {
    pub services: ServiceContainer,
    pub health_service: HealthService,
}

/// Wires repositories and services on top of already-initialized infrastructure.
#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    pool: Option<DbPool>,
    gateway: Option<Arc<dyn MessagingGateway>>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, pool: None, gateway: None }
    }

    #[must_use]
    pub fn with_database(mut self, pool: DbPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Overrides the messaging gateway. Defaults to the Signal CLI REST client.
    #[must_use]
    pub fn with_gateway(mut self, gateway: Arc<dyn MessagingGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Builds the service graph and creates the configured bootstrap admin.
    ///
    /// # Errors
    /// Returns an error if no database was provided or the admin account cannot be created.
    pub async fn build(self) -> anyhow::Result<App> {
        let pool = self.pool.ok_or_else(|| anyhow::anyhow!("Database pool is required"))?;
        let gateway: Arc<dyn MessagingGateway> = match self.gateway {
            Some(gateway) => gateway,
            None => Arc::new(SignalRestGateway::new(&self.config.gateway)),
        };

        let audit_service = AuditService::new(pool.clone(), MessageRepository::new());
        let dispatch_service = DispatchService::new(Arc::clone(&gateway), audit_service.clone());
        let admin_service =
            AdminService::new(pool.clone(), AdminRepository::new(), SessionStore::new(), self.config.admin.clone());
        let health_service = HealthService::new(pool.clone(), gateway, self.config.health.clone());

        if let (Some(email), Some(password)) = (&self.config.admin.email, &self.config.admin.password) {
            admin_service.ensure_admin(email, password).await?;
        }

        Ok(App {
            services: ServiceContainer {
                pool,
                dispatch_service,
                audit_service,
                admin_service,
                health_service: health_service.clone(),
            },
            health_service,
        })
    }
}
