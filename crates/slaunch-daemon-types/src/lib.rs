//! Wire-level schema shared by the session launch service and its clients.
//!
//! The service exposes a single D-Bus interface with two methods. Requests
//! are modelled as a [`LaunchRequest`] enum so the daemon performs explicit
//! case analysis instead of matching on method-name strings.
//!
//! ```text
//! Exec(executable: s, args: as) -> (status: i)
//! Open(workdir: s, executable: s, args: as) -> ()
//! ```

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};

/// D-Bus interface implemented by the launch service.
pub const INTERFACE_NAME: &str = "simonbru.SessionLaunch";

/// Prefix shared by every error name the service replies with.
///
/// The service derives its error names from `LaunchBusError` in
/// `slaunchd::bus`, whose `#[zbus(prefix)]` attribute needs a literal. Keep
/// that attribute and its variant names in step with the constants here.
pub const ERROR_PREFIX: &str = "simonbru.SessionLaunch.Error";

/// Error name used when the executable cannot be found on the search path.
pub const ERROR_NOT_FOUND: &str = "simonbru.SessionLaunch.Error.NotFound";

/// Error name used when the executable exists but may not be executed.
pub const ERROR_PERMISSION_DENIED: &str = "simonbru.SessionLaunch.Error.PermissionDenied";

/// Error name used when the requested working directory is unusable.
pub const ERROR_INVALID_WORKDIR: &str = "simonbru.SessionLaunch.Error.InvalidWorkdir";

/// Error name used for every other launch failure.
pub const ERROR_UNKNOWN: &str = "simonbru.SessionLaunch.Error.Unknown";

/// Interaction mode of a launch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaunchMode {
    /// Launch and wait: the caller receives the child's exit status.
    Exec,
    /// Launch and forget: the caller is released once the child is spawned.
    Open,
}

impl LaunchMode {
    /// D-Bus member name of the method implementing this mode.
    #[must_use]
    pub const fn method_name(self) -> &'static str {
        match self {
            Self::Exec => "Exec",
            Self::Open => "Open",
        }
    }

    /// Lower-case label used in logs and diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exec => "exec",
            Self::Open => "open",
        }
    }
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to start a program in the service's session context.
///
/// Requests are immutable once built. `Exec` runs in the service's own working
/// directory; `Open` names the directory explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchRequest {
    /// Spawn and report the exit status once the child terminates.
    Exec {
        /// Program name, resolved against the executable search path.
        executable: String,
        /// Argument vector passed after the program name.
        args: Vec<String>,
    },
    /// Spawn in `workdir` and acknowledge as soon as the spawn succeeds.
    Open {
        /// Working directory for the child.
        workdir: Utf8PathBuf,
        /// Program name, resolved against the executable search path.
        executable: String,
        /// Argument vector passed after the program name.
        args: Vec<String>,
    },
}

impl LaunchRequest {
    /// Builds an `Exec` request.
    #[must_use]
    pub fn exec(executable: impl Into<String>, args: Vec<String>) -> Self {
        Self::Exec {
            executable: executable.into(),
            args,
        }
    }

    /// Builds an `Open` request.
    #[must_use]
    pub fn open(
        workdir: impl Into<Utf8PathBuf>,
        executable: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self::Open {
            workdir: workdir.into(),
            executable: executable.into(),
            args,
        }
    }

    /// Interaction mode of the request.
    #[must_use]
    pub const fn mode(&self) -> LaunchMode {
        match self {
            Self::Exec { .. } => LaunchMode::Exec,
            Self::Open { .. } => LaunchMode::Open,
        }
    }

    /// Program name to resolve and start.
    #[must_use]
    pub fn executable(&self) -> &str {
        match self {
            Self::Exec { executable, .. } | Self::Open { executable, .. } => executable,
        }
    }

    /// Arguments passed to the program.
    #[must_use]
    pub fn args(&self) -> &[String] {
        match self {
            Self::Exec { args, .. } | Self::Open { args, .. } => args,
        }
    }

    /// Explicit working directory, present only for `Open`.
    #[must_use]
    pub fn workdir(&self) -> Option<&Utf8Path> {
        match self {
            Self::Exec { .. } => None,
            Self::Open { workdir, .. } => Some(workdir.as_path()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(LaunchMode::Exec, "Exec", "exec")]
    #[case(LaunchMode::Open, "Open", "open")]
    fn mode_names(#[case] mode: LaunchMode, #[case] method: &str, #[case] label: &str) {
        assert_eq!(mode.method_name(), method);
        assert_eq!(mode.to_string(), label);
    }

    #[rstest]
    fn exec_requests_have_no_workdir() {
        let request = LaunchRequest::exec("true", vec![]);
        assert_eq!(request.mode(), LaunchMode::Exec);
        assert_eq!(request.executable(), "true");
        assert!(request.workdir().is_none());
    }

    #[rstest]
    fn open_requests_carry_their_workdir() {
        let request = LaunchRequest::open("/tmp", "sleep", vec!["5".to_owned()]);
        assert_eq!(request.mode(), LaunchMode::Open);
        assert_eq!(request.workdir(), Some(Utf8Path::new("/tmp")));
        assert_eq!(request.args(), ["5".to_owned()]);
    }

    #[rstest]
    fn error_names_share_the_prefix() {
        for name in [
            ERROR_NOT_FOUND,
            ERROR_PERMISSION_DENIED,
            ERROR_INVALID_WORKDIR,
            ERROR_UNKNOWN,
        ] {
            assert!(name.starts_with(ERROR_PREFIX), "{name} lacks the prefix");
        }
    }
}
