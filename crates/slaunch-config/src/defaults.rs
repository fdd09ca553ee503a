use std::time::Duration;

/// Well-known bus name claimed by the service.
pub const DEFAULT_BUS_NAME: &str = "simonbru.SessionLaunch";

/// Object path at which the launch interface is served.
pub const DEFAULT_OBJECT_PATH: &str = "/simonbru/SessionLaunch";

/// Client call timeout. Generous so long-running `Exec` targets can finish.
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 600;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binaries.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binaries.
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Compact
}

/// Default client call timeout as a [`Duration`].
pub fn default_call_timeout() -> Duration {
    Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS)
}
