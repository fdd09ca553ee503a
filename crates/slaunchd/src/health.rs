//! Structured health reporting for service lifecycle events.

use std::sync::Arc;

use slaunch_config::Config;

use crate::errors::ServiceError;

/// Tracing target for lifecycle events.
pub(crate) const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before the bus connection is opened.
    fn service_starting(&self, config: &Config);

    /// Invoked once the well-known name is owned.
    fn name_acquired(&self, name: &str);

    /// Invoked when the bus takes the name away.
    fn name_lost(&self, name: &str);

    /// Invoked when a termination signal arrives.
    fn shutdown_requested(&self);

    /// Invoked when the idle timeout elapses.
    fn idle_exit(&self);

    /// Invoked when the service stops with a fatal error.
    fn service_failed(&self, error: &ServiceError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn service_starting(&self, config: &Config) {
        (**self).service_starting(config);
    }

    fn name_acquired(&self, name: &str) {
        (**self).name_acquired(name);
    }

    fn name_lost(&self, name: &str) {
        (**self).name_lost(name);
    }

    fn shutdown_requested(&self) {
        (**self).shutdown_requested();
    }

    fn idle_exit(&self) {
        (**self).idle_exit();
    }

    fn service_failed(&self, error: &ServiceError) {
        (**self).service_failed(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn service_starting(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "service_starting",
            bus_name = config.address().bus_name(),
            object_path = config.address().object_path(),
            idle_timeout_secs = config.idle_timeout().map(|timeout| timeout.as_secs()),
            log_filter = config.log_filter(),
            log_format = %config.log_format(),
            "starting launch service"
        );
    }

    fn name_acquired(&self, name: &str) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "name_acquired",
            bus_name = name,
            "bus name acquired"
        );
    }

    fn name_lost(&self, name: &str) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "name_lost",
            bus_name = name,
            "bus name lost"
        );
    }

    fn shutdown_requested(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "shutdown_requested",
            "termination signal received"
        );
    }

    fn idle_exit(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "idle_exit",
            "idle timeout elapsed"
        );
    }

    fn service_failed(&self, error: &ServiceError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "service_failed",
            error = %error,
            "launch service failed"
        );
    }
}
