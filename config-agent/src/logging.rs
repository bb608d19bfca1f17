use serde::Deserialize;
use std::fmt::Debug;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::PrettyFields;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Environment variable overriding the configured filter, using the `EnvFilter` directive syntax.
const LOG_LEVEL_ENV_VAR: &str = "LOG_LEVEL";

/// An enum representing possible errors during the logging initialization.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("init logging error: `{0}`")]
    TryInitError(String),
    #[error("invalid logging directive: `{0}`")]
    InvalidDirective(String),
}

/// Defines the logging configuration for the agent.
///
/// # Fields:
/// - `format`: Specifies the `LoggingFormat` the agent will use for logging.
/// - `level`: Level of the events emitted by the agent itself. Other crates log errors only.
#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub(crate) format: LoggingFormat,
    #[serde(default)]
    pub(crate) level: LogLevel,
}

/// Defines the format to be used for logging, including target and timestamp.
#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
pub struct LoggingFormat {
    #[serde(default)]
    pub(crate) target: bool,
    #[serde(default)]
    pub(crate) timestamp: TimestampFormat,
}

/// Custom time stamp format, following
/// [chrono strftime](https://docs.rs/chrono/latest/chrono/format/strftime/index.html).
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub(crate) struct TimestampFormat(pub(crate) String);

impl Default for TimestampFormat {
    fn default() -> Self {
        Self("%Y-%m-%dT%H:%M:%S".to_string())
    }
}

impl LoggingConfig {
    /// Attempts to initialize the global logging subscriber with the inner configuration.
    pub fn try_init(&self) -> Result<(), LoggingError> {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(self.format.target)
            .with_timer(ChronoLocal::new(self.format.timestamp.0.clone()))
            .fmt_fields(PrettyFields::new())
            .with_filter(self.logging_filter()?);

        tracing_subscriber::Registry::default()
            .with(console_layer)
            .try_init()
            .map_err(|_| {
                LoggingError::TryInitError(
                    "unable to set agent global logging subscriber".to_string(),
                )
            })?;

        debug!("Logging initialized successfully");
        Ok(())
    }

    fn logging_filter(&self) -> Result<EnvFilter, LoggingError> {
        self.filter_with(std::env::var(LOG_LEVEL_ENV_VAR).ok().as_deref())
    }

    /// Everything logs errors, the agent logs at the configured level. `env_directives` come last
    /// so they replace the configured directive for the same target.
    fn filter_with(&self, env_directives: Option<&str>) -> Result<EnvFilter, LoggingError> {
        let level = self.level.as_level().to_string().to_lowercase();
        let crate_directive = format!("{}={}", env!("CARGO_CRATE_NAME"), level);
        crate_directive
            .parse::<Directive>()
            .map_err(|err| LoggingError::InvalidDirective(err.to_string()))?;

        let directives = [
            Some(LevelFilter::ERROR.to_string()),
            Some(crate_directive),
            env_directives.map(String::from),
        ]
        .into_iter()
        .flatten()
        .filter(|directive| !directive.trim().is_empty())
        .collect::<Vec<_>>()
        .join(",");
        Ok(EnvFilter::builder().parse_lossy(directives))
    }
}

#[derive(Debug, PartialEq, Clone)]
pub(crate) struct LogLevel(Level);

impl LogLevel {
    fn as_level(&self) -> Level {
        self.0
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self(Level::INFO)
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value_str = String::deserialize(deserializer)?;
        Level::from_str(&value_str)
            .map(LogLevel)
            .map_err(serde::de::Error::custom)
    }
}
