//! Shared doubles for service tests.

use std::io;
use std::sync::{Arc, Mutex};

use camino::Utf8PathBuf;

use slaunch_config::Config;

use crate::errors::ServiceError;
use crate::health::HealthReporter;
use crate::spawner::{ProcessSpawner, SpawnCommand, SpawnError, SpawnedProcess, SystemSpawner};

/// Lifecycle events captured by [`RecordingHealthReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    ServiceStarting,
    NameAcquired(String),
    NameLost(String),
    ShutdownRequested,
    IdleExit,
    ServiceFailed(String),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn service_starting(&self, _config: &Config) {
        self.record(HealthEvent::ServiceStarting);
    }

    fn name_acquired(&self, name: &str) {
        self.record(HealthEvent::NameAcquired(name.to_owned()));
    }

    fn name_lost(&self, name: &str) {
        self.record(HealthEvent::NameLost(name.to_owned()));
    }

    fn shutdown_requested(&self) {
        self.record(HealthEvent::ShutdownRequested);
    }

    fn idle_exit(&self) {
        self.record(HealthEvent::IdleExit);
    }

    fn service_failed(&self, error: &ServiceError) {
        self.record(HealthEvent::ServiceFailed(error.to_string()));
    }
}

/// A spawn as seen by [`RecordingSpawner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSpawn {
    pub executable: String,
    pub args: Vec<String>,
    pub workdir: Option<Utf8PathBuf>,
    pub tracked: bool,
}

/// Spawns real processes and remembers what it was asked to start.
#[derive(Debug, Default, Clone)]
pub struct RecordingSpawner {
    spawns: Arc<Mutex<Vec<RecordedSpawn>>>,
}

impl RecordingSpawner {
    pub fn spawns(&self) -> Vec<RecordedSpawn> {
        self.spawns
            .lock()
            .expect("spawn log mutex poisoned")
            .clone()
    }
}

impl ProcessSpawner for RecordingSpawner {
    fn spawn(&self, command: &SpawnCommand<'_>) -> Result<SpawnedProcess, SpawnError> {
        self.spawns
            .lock()
            .expect("spawn log mutex poisoned")
            .push(RecordedSpawn {
                executable: command.executable().to_owned(),
                args: command.args().to_vec(),
                workdir: command.workdir().map(ToOwned::to_owned),
                tracked: command.track_exit(),
            });
        SystemSpawner.spawn(command)
    }
}

/// Refuses every spawn with a generic OS error.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingSpawner;

impl ProcessSpawner for FailingSpawner {
    fn spawn(&self, command: &SpawnCommand<'_>) -> Result<SpawnedProcess, SpawnError> {
        Err(SpawnError::Io {
            executable: command.executable().to_owned(),
            source: io::Error::other("deliberate spawn failure"),
        })
    }
}
