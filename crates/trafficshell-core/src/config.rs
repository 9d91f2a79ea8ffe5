//! Shell configuration.
//!
//! Configuration is loaded from environment variables with defaults that
//! match the platform's conventions.

use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// Default log group for traffic shells.
pub const DEFAULT_LOG_GROUP: &str = "traffic_shells";

/// Default model name of traffic-generator ports.
pub const DEFAULT_PORT_MODEL: &str = "Generic Traffic Generator Port";

/// Options for the reservation polling helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Number of retries; the poll makes `timeout + 1` attempts (default: 4).
    pub timeout: u32,
    /// Sleep between attempts (default: 1 second).
    pub interval: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            timeout: 4,
            interval: Duration::from_secs(1),
        }
    }
}

impl PollOptions {
    /// Options with the given timeout and the default interval.
    pub fn with_timeout(timeout: u32) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }
}

/// Configuration validation error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("log group must not be empty")]
    EmptyLogGroup,

    #[error("poll interval must be > 0")]
    ZeroPollInterval,

    #[error("keep-alive interval must be > 0")]
    ZeroKeepAliveInterval,

    #[error("port model must not be empty")]
    EmptyPortModel,
}

/// Configuration shared by the helpers and the controller driver.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Log group the controller logger is filed under.
    pub log_group: String,
    /// Level the controller logger is set to (default: DEBUG).
    pub log_level: Level,
    /// Polling options.
    pub poll: PollOptions,
    /// Interval at which keep-alive checks for cancellation (default: 2 seconds).
    pub keep_alive_interval: Duration,
    /// Model name of traffic-generator ports.
    pub port_model: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            log_group: DEFAULT_LOG_GROUP.to_string(),
            log_level: Level::DEBUG,
            poll: PollOptions::default(),
            keep_alive_interval: Duration::from_secs(2),
            port_model: DEFAULT_PORT_MODEL.to_string(),
        }
    }
}

impl ShellConfig {
    /// Create a new config builder.
    pub fn builder() -> ShellConfigBuilder {
        ShellConfigBuilder::default()
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `TRAFFICSHELL_LOG_GROUP` | `traffic_shells` |
    /// | `TRAFFICSHELL_LOG_LEVEL` | `debug` |
    /// | `TRAFFICSHELL_POLL_TIMEOUT` | `4` |
    /// | `TRAFFICSHELL_POLL_INTERVAL_MS` | `1000` |
    /// | `TRAFFICSHELL_KEEP_ALIVE_MS` | `2000` |
    /// | `TRAFFICSHELL_PORT_MODEL` | `Generic Traffic Generator Port` |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();

        let log_level = lookup("TRAFFICSHELL_LOG_LEVEL")
            .and_then(|v| Level::from_str(&v).ok())
            .unwrap_or(default.log_level);

        let timeout = lookup("TRAFFICSHELL_POLL_TIMEOUT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(default.poll.timeout);

        let interval = lookup("TRAFFICSHELL_POLL_INTERVAL_MS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(default.poll.interval);

        let keep_alive_interval = lookup("TRAFFICSHELL_KEEP_ALIVE_MS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(default.keep_alive_interval);

        Self {
            log_group: lookup("TRAFFICSHELL_LOG_GROUP").unwrap_or(default.log_group),
            log_level,
            poll: PollOptions { timeout, interval },
            keep_alive_interval,
            port_model: lookup("TRAFFICSHELL_PORT_MODEL").unwrap_or(default.port_model),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_group.is_empty() {
            return Err(ConfigError::EmptyLogGroup);
        }
        if self.poll.interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.keep_alive_interval.is_zero() {
            return Err(ConfigError::ZeroKeepAliveInterval);
        }
        if self.port_model.is_empty() {
            return Err(ConfigError::EmptyPortModel);
        }
        Ok(())
    }
}

/// Builder for ShellConfig.
#[derive(Debug, Default)]
pub struct ShellConfigBuilder {
    config: ShellConfig,
}

impl ShellConfigBuilder {
    /// Set the log group.
    pub fn log_group(mut self, group: impl Into<String>) -> Self {
        self.config.log_group = group.into();
        self
    }

    /// Set the controller log level.
    pub fn log_level(mut self, level: Level) -> Self {
        self.config.log_level = level;
        self
    }

    /// Set the polling timeout.
    pub fn poll_timeout(mut self, timeout: u32) -> Self {
        self.config.poll.timeout = timeout;
        self
    }

    /// Set the polling interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll.interval = interval;
        self
    }

    /// Set the keep-alive interval.
    pub fn keep_alive_interval(mut self, interval: Duration) -> Self {
        self.config.keep_alive_interval = interval;
        self
    }

    /// Set the traffic-generator port model name.
    pub fn port_model(mut self, model: impl Into<String>) -> Self {
        self.config.port_model = model.into();
        self
    }

    /// Build the configuration, validating all fields.
    pub fn build(self) -> Result<ShellConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
