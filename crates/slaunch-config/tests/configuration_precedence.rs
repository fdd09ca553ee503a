//! Behavioural coverage for flag, environment, and default layering.

use std::cell::RefCell;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, PoisonError};

use clap::Parser;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use slaunch_config::{Config, ConfigArgs};

const MANAGED_VARIABLES: &[&str] = &[
    "SLAUNCH_BUS_NAME",
    "SLAUNCH_OBJECT_PATH",
    "SLAUNCH_CALL_TIMEOUT",
    "SLAUNCH_IDLE_TIMEOUT",
    "SLAUNCH_LOG_FILTER",
    "SLAUNCH_LOG_FORMAT",
];

// Scenarios run on parallel test threads but share one process environment.
static ENVIRONMENT: Mutex<()> = Mutex::new(());

#[derive(Debug, Parser)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
}

struct Harness {
    _lock: MutexGuard<'static, ()>,
    saved: Vec<(&'static str, Option<OsString>)>,
    cli_args: RefCell<Vec<OsString>>,
    outcome: RefCell<Option<Result<Config, String>>>,
}

impl Harness {
    fn new() -> Self {
        let lock = ENVIRONMENT.lock().unwrap_or_else(PoisonError::into_inner);
        let saved = MANAGED_VARIABLES
            .iter()
            .map(|key| (*key, std::env::var_os(key)))
            .collect();
        Self {
            _lock: lock,
            saved,
            cli_args: RefCell::new(vec![OsString::from("slaunch")]),
            outcome: RefCell::new(None),
        }
    }

    fn clear_environment(&self) {
        for key in MANAGED_VARIABLES {
            // Guarded by `ENVIRONMENT`; restored in `Drop`.
            unsafe { std::env::remove_var(key) };
        }
    }

    fn set_env(&self, key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) };
    }

    fn push_cli_arg(&self, arg: impl Into<OsString>) {
        self.cli_args.borrow_mut().push(arg.into());
    }

    fn load(&self) {
        let args = self.cli_args.borrow().clone();
        let outcome = Cli::try_parse_from(args)
            .map_err(|error| error.to_string())
            .and_then(|cli| Config::from_args(cli.config).map_err(|error| error.to_string()));
        *self.outcome.borrow_mut() = Some(outcome);
    }

    fn config(&self) -> Config {
        match self.outcome.borrow().as_ref() {
            Some(Ok(config)) => config.clone(),
            Some(Err(error)) => panic!("configuration failed to load: {error}"),
            None => panic!("configuration was not loaded"),
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(value) => unsafe { std::env::set_var(key, value) },
                None => unsafe { std::env::remove_var(key) },
            }
        }
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[given("a clean configuration environment")]
fn given_clean_environment(harness: &Harness) {
    harness.clear_environment();
}

#[given("the environment sets {key} to \"{value}\"")]
fn given_environment(harness: &Harness, key: String, value: String) {
    harness.set_env(&key, &value);
}

#[given("the CLI sets the bus name to \"{name}\"")]
fn given_cli_bus_name(harness: &Harness, name: String) {
    harness.push_cli_arg("--bus-name");
    harness.push_cli_arg(name);
}

#[when("the configuration is loaded")]
fn when_loaded(harness: &Harness) {
    harness.load();
}

#[then("the bus name is \"{name}\"")]
fn then_bus_name(harness: &Harness, name: String) {
    assert_eq!(harness.config().address().bus_name(), name);
}

#[then("the call timeout is {seconds} seconds")]
fn then_call_timeout(harness: &Harness, seconds: u64) {
    assert_eq!(harness.config().call_timeout().as_secs(), seconds);
}

#[then("loading fails mentioning \"{fragment}\"")]
fn then_loading_fails(harness: &Harness, fragment: String) {
    match harness.outcome.borrow().as_ref() {
        Some(Err(error)) => assert!(
            error.contains(&fragment),
            "error '{error}' should mention '{fragment}'"
        ),
        Some(Ok(config)) => panic!("expected failure, loaded {config:?}"),
        None => panic!("configuration was not loaded"),
    }
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Defaults apply when nothing is overridden"
)]
fn defaults_apply(#[from(harness)] harness: Harness) {
    drop(harness);
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Environment overrides defaults"
)]
fn environment_overrides_defaults(#[from(harness)] harness: Harness) {
    drop(harness);
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Flags override the environment"
)]
fn flags_override_environment(#[from(harness)] harness: Harness) {
    drop(harness);
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Invalid environment values fail fast"
)]
fn invalid_environment_fails_fast(#[from(harness)] harness: Harness) {
    drop(harness);
}
