use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, ValueEnum};
use thiserror::Error;

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Connection string for the queue transport (a Redis URL, may embed credentials)
    #[arg(long, env = "COMPLAINT_SEND_PRIMARY_CONNECTION_STRING", hide_env_values = true)]
    pub queue_url: String,

    /// Name of the queue that receives complaint messages
    #[arg(long, env = "SERVICE_BUS_QUEUE_NAME", default_value = "complaints-event")]
    pub queue_name: String,

    /// Service name reported by the health endpoint
    #[arg(long, env = "APP_NAME", default_value = "ComplaintService")]
    pub app_name: String,

    /// Service version reported by the health endpoint
    #[arg(long, env = "APP_VERSION", default_value = "0.1.0")]
    pub app_version: String,

    /// Verbose logging. Never changes validation or publish behavior.
    #[arg(long, env = "DEBUG", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    pub debug: bool,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub publisher: PublisherConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "COMPLAINT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "COMPLAINT_PORT", default_value_t = 8000)]
    pub port: u16,

    /// How long to wait for in-flight work during shutdown
    #[arg(long, env = "COMPLAINT_SHUTDOWN_TIMEOUT_SECS", default_value_t = 10)]
    pub shutdown_timeout_secs: u64,

    /// Maximum accepted request body size in bytes
    #[arg(long, env = "COMPLAINT_MAX_BODY_BYTES", default_value_t = 65_536)]
    pub max_body_bytes: usize,
}

#[derive(Clone, Debug, Args)]
pub struct PublisherConfig {
    /// Upper bound for a single publish attempt
    #[arg(long, env = "COMPLAINT_PUBLISH_TIMEOUT_MS", default_value_t = 5000)]
    pub publish_timeout_ms: u64,

    /// Upper bound for establishing the queue connection
    #[arg(long, env = "COMPLAINT_CONNECT_TIMEOUT_MS", default_value_t = 3000)]
    pub connect_timeout_ms: u64,

    /// Connection attempts made at startup before falling back to lazy connection
    #[arg(long, env = "COMPLAINT_CONNECT_MAX_RETRIES", default_value_t = 3)]
    pub connect_max_retries: usize,

    /// Minimum backoff between startup connection attempts
    #[arg(long, env = "COMPLAINT_CONNECT_MIN_BACKOFF_MS", default_value_t = 200)]
    pub connect_min_backoff_ms: u64,

    /// Maximum backoff between startup connection attempts
    #[arg(long, env = "COMPLAINT_CONNECT_MAX_BACKOFF_MS", default_value_t = 2000)]
    pub connect_max_backoff_ms: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "COMPLAINT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP collector endpoint. Export is disabled when unset.
    #[arg(long, env = "COMPLAINT_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("queue connection string must not be empty")]
    MissingQueueUrl,
    #[error("queue name must not be empty")]
    MissingQueueName,
    #[error("publish timeout must be greater than zero")]
    ZeroPublishTimeout,
}

impl Config {
    /// Parses the process arguments and environment, exiting on missing or malformed values.
    ///
    /// # Errors
    /// Returns `ConfigError` if a parsed value is present but unusable.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Checks constraints that clap cannot express on its own.
    ///
    /// # Errors
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_url.trim().is_empty() {
            return Err(ConfigError::MissingQueueUrl);
        }
        if self.queue_name.trim().is_empty() {
            return Err(ConfigError::MissingQueueName);
        }
        if self.publisher.publish_timeout_ms == 0 {
            return Err(ConfigError::ZeroPublishTimeout);
        }
        Ok(())
    }
}
