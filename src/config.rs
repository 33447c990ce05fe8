use clap::{Args, Parser, ValueEnum};

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub gateway: GatewayConfig,

    #[command(flatten)]
    pub admin: AdminConfig,

    #[command(flatten)]
    pub health: HealthConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "RELAY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port for the public API
    #[arg(long, env = "RELAY_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Port for the management server (liveness and readiness probes)
    #[arg(long, env = "RELAY_MGMT_PORT", default_value_t = 9090)]
    pub mgmt_port: u16,

    /// How long to wait for in-flight work on shutdown
    #[arg(long, env = "RELAY_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct DatabaseConfig {
    /// Database connection URL (`sqlite://path/to/file.db` or `sqlite::memory:`)
    #[arg(long = "database-url", env = "RELAY_DATABASE_URL", default_value = "sqlite://data/relay.db")]
    pub url: String,

    /// Maximum number of pooled connections
    #[arg(long = "db-max-connections", env = "RELAY_DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Seconds to wait for a free connection
    #[arg(long = "db-acquire-timeout-secs", env = "RELAY_DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 5)]
    pub acquire_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct GatewayConfig {
    /// Base URL of the Signal CLI REST API
    #[arg(long = "gateway-url", env = "RELAY_GATEWAY_URL", default_value = "http://localhost:8080")]
    pub base_url: String,

    /// Registered sender number used for all outbound messages
    #[arg(long, env = "RELAY_SENDER_NUMBER")]
    pub sender_number: String,
}

#[derive(Clone, Debug, Args)]
pub struct AdminConfig {
    /// Email of an admin account to create at startup if it does not exist
    #[arg(long = "admin-email", env = "RELAY_ADMIN_EMAIL", requires = "password")]
    pub email: Option<String>,

    /// Password for the bootstrap admin account
    #[arg(long = "admin-password", env = "RELAY_ADMIN_PASSWORD", requires = "email", hide_env_values = true)]
    pub password: Option<String>,

    /// Admin session lifetime in seconds
    #[arg(long = "admin-session-ttl-secs", env = "RELAY_ADMIN_SESSION_TTL_SECS", default_value_t = 28_800)]
    pub session_ttl_secs: u64,

    /// Mark the session cookie `Secure` (enable when served over HTTPS)
    #[arg(long = "admin-secure-cookie", env = "RELAY_ADMIN_SECURE_COOKIE", default_value_t = false)]
    pub secure_cookie: bool,
}

#[derive(Clone, Debug, Args)]
pub struct HealthConfig {
    /// Timeout for the database readiness check
    #[arg(long, env = "RELAY_HEALTH_DB_TIMEOUT_MS", default_value_t = 2000)]
    pub db_timeout_ms: u64,

    /// Timeout for the gateway availability check
    #[arg(long, env = "RELAY_HEALTH_GATEWAY_TIMEOUT_MS", default_value_t = 2000)]
    pub gateway_timeout_ms: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Default log filter, overridden by `RUST_LOG`
    #[arg(long, env = "RELAY_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "RELAY_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP collector endpoint; traces and metrics are only exported when set
    #[arg(long, env = "RELAY_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}
