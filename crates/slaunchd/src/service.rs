//! Service loop: own the bus name and route calls until told to stop.

use std::future::{self, Future};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{BoxStream, Stream, StreamExt};
use tokio::signal::unix::{Signal, SignalKind, signal};
use tracing::{debug, info};
use zbus::Connection;
use zbus::fdo::{DBusProxy, RequestNameFlags, RequestNameReply};

use slaunch_config::Config;

use crate::activity::ActivityTracker;
use crate::bus::LaunchInterface;
use crate::dispatch::RequestDispatcher;
use crate::errors::ServiceError;
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::spawner::{ProcessSpawner, SystemSpawner};

/// Tracing target for the service loop.
pub(crate) const SERVICE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::service");

/// Longest pause between idle checks while requests are in flight.
const IDLE_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Serves the launch interface on the session bus.
pub struct ServiceLoop {
    config: Config,
    spawner: Arc<dyn ProcessSpawner>,
    reporter: Arc<dyn HealthReporter>,
}

impl std::fmt::Debug for ServiceLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceLoop")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ServiceLoop {
    /// Builds a loop that spawns real processes and reports through `tracing`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            spawner: Arc::new(SystemSpawner),
            reporter: Arc::new(StructuredHealthReporter::new()),
        }
    }

    /// Replaces the process spawner.
    #[must_use]
    pub fn with_spawner(mut self, spawner: Arc<dyn ProcessSpawner>) -> Self {
        self.spawner = spawner;
        self
    }

    /// Replaces the health reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn HealthReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Serves until SIGTERM or SIGINT, the idle timeout, or a fatal error.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when signal handlers cannot be installed, the
    /// bus name cannot be acquired, or the name is lost.
    pub async fn run(self) -> Result<(), ServiceError> {
        let shutdown = match ShutdownSignal::install() {
            Ok(shutdown) => shutdown,
            Err(error) => {
                self.reporter.service_failed(&error);
                return Err(error);
            }
        };
        self.serve(shutdown.wait()).await
    }

    /// Serves until `shutdown` resolves, the idle timeout, or a fatal error.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when connecting, serving the object, or
    /// acquiring the name fails, or when the name is lost afterwards.
    pub async fn serve<S>(self, shutdown: S) -> Result<(), ServiceError>
    where
        S: Future<Output = ()>,
    {
        self.reporter.service_starting(&self.config);
        let result = self.serve_until(shutdown).await;
        if let Err(error) = &result {
            self.reporter.service_failed(error);
        }
        result
    }

    async fn serve_until<S>(&self, shutdown: S) -> Result<(), ServiceError>
    where
        S: Future<Output = ()>,
    {
        let address = self.config.address();
        let dispatcher = Arc::new(RequestDispatcher::new(Arc::clone(&self.spawner)));
        let connection = connect(
            address.object_path(),
            LaunchInterface::new(Arc::clone(&dispatcher)),
        )
        .await?;

        let lost = name_lost_events(&connection).await?;
        acquire_name(&connection, address.bus_name()).await?;
        self.reporter.name_acquired(address.bus_name());

        let idle = self
            .config
            .idle_timeout()
            .map(|timeout| IdleWatch::new(dispatcher.activity().clone(), timeout));
        let result = supervise(
            address.bus_name(),
            lost,
            shutdown,
            idle,
            self.reporter.as_ref(),
        )
        .await;
        info!(
            target: SERVICE_TARGET,
            in_flight = dispatcher.activity().in_flight(),
            watched = dispatcher.watcher().outstanding(),
            "service loop stopped"
        );
        result
    }
}

async fn connect(
    object_path: &str,
    interface: LaunchInterface,
) -> Result<Connection, ServiceError> {
    let to_connect = |source| ServiceError::Connect { source };
    zbus::connection::Builder::session()
        .map_err(to_connect)?
        .serve_at(object_path, interface)
        .map_err(to_connect)?
        .build()
        .await
        .map_err(to_connect)
}

/// Claims `bus_name`, replacing a current owner that allows it.
async fn acquire_name(connection: &Connection, bus_name: &str) -> Result<(), ServiceError> {
    let flags = RequestNameFlags::AllowReplacement
        | RequestNameFlags::ReplaceExisting
        | RequestNameFlags::DoNotQueue;
    match connection.request_name_with_flags(bus_name, flags).await {
        Ok(RequestNameReply::PrimaryOwner | RequestNameReply::AlreadyOwner) => {
            debug!(target: SERVICE_TARGET, bus_name, "primary owner of bus name");
            Ok(())
        }
        Ok(reply) => Err(ServiceError::NameUnavailable {
            name: bus_name.to_owned(),
            reason: format!("bus replied {reply:?}"),
        }),
        Err(zbus::Error::NameTaken) => Err(ServiceError::NameUnavailable {
            name: bus_name.to_owned(),
            reason: String::from("owned by another connection that does not allow replacement"),
        }),
        Err(source) => Err(ServiceError::Bus { source }),
    }
}

/// Names this connection loses, in the order the bus reports them.
async fn name_lost_events(connection: &Connection) -> Result<BoxStream<'static, String>, ServiceError> {
    let to_bus = |source| ServiceError::Bus { source };
    let proxy = DBusProxy::new(connection).await.map_err(to_bus)?;
    let signals = proxy.receive_name_lost().await.map_err(to_bus)?;
    Ok(signals
        .filter_map(|signal| async move {
            signal.args().ok().map(|args| args.name().to_string())
        })
        .boxed())
}

/// Waits for whichever ends the service first.
///
/// Shutdown and idle expiry are clean exits. Losing `bus_name`, or the lost
/// stream ending with the connection, is fatal.
pub(crate) async fn supervise<L, S>(
    bus_name: &str,
    mut lost: L,
    shutdown: S,
    idle: Option<IdleWatch>,
    reporter: &dyn HealthReporter,
) -> Result<(), ServiceError>
where
    L: Stream<Item = String> + Unpin,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let idle_expired = async move {
        match idle {
            Some(watch) => watch.expired().await,
            None => future::pending().await,
        }
    };
    tokio::pin!(idle_expired);

    loop {
        tokio::select! {
            () = &mut shutdown => {
                reporter.shutdown_requested();
                return Ok(());
            }
            () = &mut idle_expired => {
                reporter.idle_exit();
                return Ok(());
            }
            event = lost.next() => match event {
                Some(name) if name != bus_name => {
                    debug!(target: SERVICE_TARGET, name = %name, "ignoring loss of unrelated name");
                }
                _ => {
                    reporter.name_lost(bus_name);
                    return Err(ServiceError::NameLost {
                        name: bus_name.to_owned(),
                    });
                }
            },
        }
    }
}

/// Resolves once no request has been in flight for the configured timeout.
#[derive(Debug, Clone)]
pub(crate) struct IdleWatch {
    tracker: ActivityTracker,
    timeout: Duration,
}

impl IdleWatch {
    pub(crate) const fn new(tracker: ActivityTracker, timeout: Duration) -> Self {
        Self { tracker, timeout }
    }

    pub(crate) async fn expired(self) {
        loop {
            let pause = match self.tracker.idle_for() {
                Some(idle) if idle >= self.timeout => return,
                Some(idle) => self.timeout.saturating_sub(idle),
                None => IDLE_POLL_INTERVAL,
            };
            tokio::time::sleep(pause).await;
        }
    }
}

/// SIGTERM and SIGINT listeners.
struct ShutdownSignal {
    terminate: Signal,
    interrupt: Signal,
}

impl ShutdownSignal {
    fn install() -> Result<Self, ServiceError> {
        let to_signals = |source| ServiceError::Signals { source };
        Ok(Self {
            terminate: signal(SignalKind::terminate()).map_err(to_signals)?,
            interrupt: signal(SignalKind::interrupt()).map_err(to_signals)?,
        })
    }

    async fn wait(mut self) {
        tokio::select! {
            _ = self.terminate.recv() => {
                info!(target: SERVICE_TARGET, signal = "SIGTERM", "shutdown signal received");
            }
            _ = self.interrupt.recv() => {
                info!(target: SERVICE_TARGET, signal = "SIGINT", "shutdown signal received");
            }
        }
    }
}
