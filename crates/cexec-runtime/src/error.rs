//! Error types for installation and the action as a whole.

use std::path::PathBuf;
use std::process::ExitStatus;

use cexec_common::error::ConfigError;
use cexec_core::error::{MountError, TransitionError};
use thiserror::Error;

use crate::runtime::ContainerRuntime;

/// Failure while fetching or running an install script.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The plan carries no script location.
    #[error("install script URL is empty")]
    EmptySource,

    /// The script could not be downloaded.
    #[error("failed to download {url}: {source}")]
    Download {
        /// Script location.
        url: String,
        /// Underlying HTTP client error.
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// Script location.
        url: String,
        /// Status code returned.
        status: u16,
    },

    /// No `sh` was found on `PATH`.
    #[error("no shell found to run the install script: {source}")]
    ShellNotFound {
        /// Lookup error.
        source: which::Error,
    },

    /// The shell could not be started.
    #[error("failed to start {shell}: {source}")]
    Spawn {
        /// Shell binary.
        shell: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Waiting on the shell failed.
    #[error("failed to wait for the install script: {source}")]
    Wait {
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The script ran but did not succeed.
    #[error("install script exited with {status}")]
    ScriptFailed {
        /// Exit status of the shell.
        status: ExitStatus,
    },
}

/// Any failure that ends the action.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Inputs were rejected before touching the host.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The mountpoint, device, or pseudo-filesystems could not be set up.
    #[error(transparent)]
    Mount(#[from] MountError),

    /// The new root could not be entered.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// The container runtime could not be installed.
    #[error("failed to install {runtime}: {source}")]
    Install {
        /// Runtime being installed.
        runtime: ContainerRuntime,
        /// Underlying install failure.
        source: InstallError,
    },
}

impl ActionError {
    /// Process exit code for this failure category.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Mount(_) => 3,
            Self::Transition(_) => 4,
            Self::Install { .. } => 5,
        }
    }
}
