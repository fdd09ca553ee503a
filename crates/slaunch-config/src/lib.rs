//! Shared configuration for the session launch service and its clients.
//!
//! Both ends agree on the service address (bus name and object path) and the
//! logging knobs. Values are layered: an explicit command-line flag wins, then
//! the matching `SLAUNCH_*` environment variable, then the built-in default.
//! Binaries flatten [`ConfigArgs`] into their own clap parser and turn the
//! parsed arguments into a validated [`Config`].

mod address;
mod defaults;
mod logging;

use std::time::Duration;

use clap::Args;
use thiserror::Error;

pub use address::{AddressError, ServiceAddress};
pub use defaults::{
    DEFAULT_BUS_NAME, DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_LOG_FILTER, DEFAULT_OBJECT_PATH,
    default_call_timeout, default_log_filter, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Configuration flags shared by every binary.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ConfigArgs {
    /// Well-known bus name of the launch service.
    #[arg(long, env = "SLAUNCH_BUS_NAME", default_value = DEFAULT_BUS_NAME)]
    pub bus_name: String,
    /// Object path serving the launch interface.
    #[arg(long, env = "SLAUNCH_OBJECT_PATH", default_value = DEFAULT_OBJECT_PATH)]
    pub object_path: String,
    /// Seconds a client waits for the service to reply.
    #[arg(
        long = "call-timeout",
        env = "SLAUNCH_CALL_TIMEOUT",
        value_name = "SECONDS",
        default_value_t = DEFAULT_CALL_TIMEOUT_SECS
    )]
    pub call_timeout_secs: u64,
    /// Exit the service after this many seconds without in-flight requests.
    #[arg(long = "idle-timeout", env = "SLAUNCH_IDLE_TIMEOUT", value_name = "SECONDS")]
    pub idle_timeout_secs: Option<u64>,
    /// Tracing filter expression for the service.
    #[arg(long, env = "SLAUNCH_LOG_FILTER", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
    /// Log output format for the service (`json` or `compact`).
    #[arg(long, env = "SLAUNCH_LOG_FORMAT", default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Validated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    address: ServiceAddress,
    call_timeout: Duration,
    idle_timeout: Option<Duration>,
    log_filter: String,
    log_format: LogFormat,
}

/// Errors raised while validating configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The service address failed validation.
    #[error(transparent)]
    Address(#[from] AddressError),
    /// A zero call timeout would fail every request immediately.
    #[error("call timeout must be at least one second")]
    ZeroCallTimeout,
    /// A zero idle timeout would exit before the first request.
    #[error("idle timeout must be at least one second")]
    ZeroIdleTimeout,
}

impl Config {
    /// Validates parsed arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the address is malformed or a timeout is
    /// zero.
    pub fn from_args(args: ConfigArgs) -> Result<Self, ConfigError> {
        let ConfigArgs {
            bus_name,
            object_path,
            call_timeout_secs,
            idle_timeout_secs,
            log_filter,
            log_format,
        } = args;
        let address = ServiceAddress::new(bus_name, object_path)?;
        if call_timeout_secs == 0 {
            return Err(ConfigError::ZeroCallTimeout);
        }
        let idle_timeout = match idle_timeout_secs {
            Some(0) => return Err(ConfigError::ZeroIdleTimeout),
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };
        Ok(Self {
            address,
            call_timeout: Duration::from_secs(call_timeout_secs),
            idle_timeout,
            log_filter,
            log_format,
        })
    }

    /// Service address shared by client and daemon.
    #[must_use]
    pub fn address(&self) -> &ServiceAddress {
        &self.address
    }

    /// Upper bound on a single client call, connection included.
    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Idle period after which the service exits, if enabled.
    #[must_use]
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Replaces the service address, keeping every other setting.
    #[must_use]
    pub fn with_address(mut self, address: ServiceAddress) -> Self {
        self.address = address;
        self
    }

    /// Replaces the client call timeout.
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Replaces the idle timeout.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: ServiceAddress::default(),
            call_timeout: default_call_timeout(),
            idle_timeout: None,
            log_filter: default_log_filter().to_owned(),
            log_format: default_log_format(),
        }
    }
}
