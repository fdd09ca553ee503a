//! Session bus transport for launch calls.
//!
//! Each invocation opens its own connection on a short-lived current-thread
//! runtime. Connecting and calling share one deadline, so an unreachable bus,
//! an absent service and a child that never exits all end in the same bounded
//! wait.

use std::future::Future;

use tokio::time;
use zbus::{Connection, Message};

use slaunch_config::Config;
use slaunch_daemon_types::{INTERFACE_NAME, LaunchRequest};

use crate::errors::AppError;

/// Successful answer to a launch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallReply {
    /// Exec finished with this status.
    Status(i32),
    /// Open started the program.
    Acknowledged,
}

/// Delivers a launch request to the service.
pub(crate) trait LaunchTransport {
    fn call(&self, config: &Config, request: &LaunchRequest) -> Result<CallReply, AppError>;
}

/// Transport over the user's session bus.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SessionBusTransport;

impl LaunchTransport for SessionBusTransport {
    fn call(&self, config: &Config, request: &LaunchRequest) -> Result<CallReply, AppError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| AppError::Runtime { source })?;
        runtime.block_on(within_deadline(config, call_service(config, request)))
    }
}

async fn within_deadline<F>(config: &Config, call: F) -> Result<CallReply, AppError>
where
    F: Future<Output = Result<CallReply, AppError>>,
{
    let timeout = config.call_timeout();
    time::timeout(timeout, call)
        .await
        .map_err(|_| AppError::Timeout {
            seconds: timeout.as_secs(),
        })?
}

async fn call_service(config: &Config, request: &LaunchRequest) -> Result<CallReply, AppError> {
    let connection = Connection::session()
        .await
        .map_err(|source| AppError::Connect { source })?;
    let reply = invoke(&connection, config, request)
        .await
        .map_err(AppError::from_call)?;
    match request {
        LaunchRequest::Exec { .. } => reply
            .body()
            .deserialize::<i32>()
            .map(CallReply::Status)
            .map_err(|source| AppError::Decode { source }),
        LaunchRequest::Open { .. } => Ok(CallReply::Acknowledged),
    }
}

async fn invoke(
    connection: &Connection,
    config: &Config,
    request: &LaunchRequest,
) -> zbus::Result<Message> {
    let address = config.address();
    let method = request.mode().method_name();
    match request {
        LaunchRequest::Exec { executable, args } => {
            connection
                .call_method(
                    Some(address.bus_name()),
                    address.object_path(),
                    Some(INTERFACE_NAME),
                    method,
                    &(executable.as_str(), args.as_slice()),
                )
                .await
        }
        LaunchRequest::Open {
            workdir,
            executable,
            args,
        } => {
            connection
                .call_method(
                    Some(address.bus_name()),
                    address.object_path(),
                    Some(INTERFACE_NAME),
                    method,
                    &(workdir.as_str(), executable.as_str(), args.as_slice()),
                )
                .await
        }
    }
}
