//! Scripted transport used in place of the session bus.

use std::cell::RefCell;
use std::time::Duration;

use slaunch_config::Config;
use slaunch_daemon_types::LaunchRequest;

use crate::errors::AppError;
use crate::transport::{CallReply, LaunchTransport};

/// How the fake service answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeReply {
    Status(i32),
    Acknowledged,
    Remote(String),
    Timeout,
    Unreachable,
}

/// A call as seen by [`FakeTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub bus_name: String,
    pub call_timeout: Duration,
    pub request: LaunchRequest,
}

#[derive(Debug)]
pub struct FakeTransport {
    reply: FakeReply,
    calls: RefCell<Vec<RecordedCall>>,
}

impl FakeTransport {
    pub fn replying(reply: FakeReply) -> Self {
        Self {
            reply,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }
}

impl LaunchTransport for FakeTransport {
    fn call(&self, config: &Config, request: &LaunchRequest) -> Result<CallReply, AppError> {
        self.calls.borrow_mut().push(RecordedCall {
            bus_name: config.address().bus_name().to_owned(),
            call_timeout: config.call_timeout(),
            request: request.clone(),
        });
        match &self.reply {
            FakeReply::Status(status) => Ok(CallReply::Status(*status)),
            FakeReply::Acknowledged => Ok(CallReply::Acknowledged),
            FakeReply::Remote(name) => Err(AppError::Remote {
                name: name.clone(),
                message: String::from("scripted failure"),
            }),
            FakeReply::Timeout => Err(AppError::Timeout {
                seconds: config.call_timeout().as_secs(),
            }),
            FakeReply::Unreachable => Err(AppError::Connect {
                source: zbus::Error::Address(String::from("no session bus")),
            }),
        }
    }
}

/// Captured output of one client run.
#[derive(Debug)]
pub struct RunOutput {
    pub exit: std::process::ExitCode,
    pub stdout: String,
    pub stderr: String,
}

pub fn run_client(
    mode: slaunch_daemon_types::LaunchMode,
    args: &[&str],
    transport: &FakeTransport,
) -> RunOutput {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = crate::run_with_transport(
        mode,
        args.iter().map(std::ffi::OsString::from).collect(),
        &mut stdout,
        &mut stderr,
        transport,
    );
    RunOutput {
        exit,
        stdout: String::from_utf8(stdout).expect("stdout should be UTF-8"),
        stderr: String::from_utf8(stderr).expect("stderr should be UTF-8"),
    }
}
