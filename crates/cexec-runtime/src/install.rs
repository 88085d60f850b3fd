//! Container runtime installation.
//!
//! The runtime name is resolved into a [`RuntimeSelection`] up front, so a
//! runtime without an install source is rejected before the host is
//! touched. The [`Installer`] then fetches the script and pipes it to the
//! shell, like `curl -fsSL <url> | sh`.

use cexec_common::constants::ENV_INSTALL_SCRIPT_URL;
use cexec_common::error::ConfigError;

use crate::error::InstallError;
use crate::fetch::{HttpFetcher, ScriptFetcher};
use crate::runtime::ContainerRuntime;
use crate::shell::{ScriptRunner, ShellRunner};

/// A runtime and the script that installs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    /// Runtime being installed.
    pub runtime: ContainerRuntime,
    /// Location of the install script.
    pub script_url: String,
}

/// What the action should do about a container runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeSelection {
    /// No runtime was requested.
    NotRequested,
    /// The requested name is not a known runtime; it is skipped.
    Unsupported(String),
    /// Install a known runtime.
    Install(InstallPlan),
}

impl RuntimeSelection {
    /// Resolves a runtime name and optional script override.
    ///
    /// The override replaces the runtime's published script.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingInstallSource`] when a known runtime
    /// has neither a published script nor an override.
    pub fn resolve(name: &str, override_url: Option<&str>) -> Result<Self, ConfigError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Self::NotRequested);
        }
        let Some(runtime) = ContainerRuntime::from_name(name) else {
            return Ok(Self::Unsupported(name.to_string()));
        };

        let script_url = override_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .or_else(|| runtime.install_source())
            .ok_or_else(|| ConfigError::MissingInstallSource {
                runtime: runtime.to_string(),
                var: ENV_INSTALL_SCRIPT_URL,
            })?;

        Ok(Self::Install(InstallPlan {
            runtime,
            script_url: script_url.to_string(),
        }))
    }
}

/// Installs a container runtime from a plan.
pub trait RuntimeInstaller {
    /// Fetches and runs the plan's install script.
    ///
    /// # Errors
    ///
    /// Returns an [`InstallError`] if the script is missing, cannot be
    /// downloaded, or fails.
    fn install(&self, plan: &InstallPlan) -> Result<(), InstallError>;
}

/// [`RuntimeInstaller`] composed of a fetcher and a runner.
#[derive(Debug, Clone)]
pub struct Installer<F, R> {
    fetcher: F,
    runner: R,
}

impl Installer<HttpFetcher, ShellRunner> {
    /// Installer that downloads over HTTP and runs scripts with `sh`.
    #[must_use]
    pub const fn system() -> Self {
        Self::new(HttpFetcher::new(), ShellRunner::new())
    }
}

impl<F: ScriptFetcher, R: ScriptRunner> Installer<F, R> {
    /// Creates an installer from its parts.
    #[must_use]
    pub const fn new(fetcher: F, runner: R) -> Self {
        Self { fetcher, runner }
    }
}

impl<F: ScriptFetcher, R: ScriptRunner> RuntimeInstaller for Installer<F, R> {
    fn install(&self, plan: &InstallPlan) -> Result<(), InstallError> {
        if plan.script_url.trim().is_empty() {
            return Err(InstallError::EmptySource);
        }

        tracing::info!(runtime = %plan.runtime, url = %plan.script_url, "installing container runtime");
        let script = self.fetcher.fetch(&plan.script_url)?;
        self.runner.run(&script)?;
        tracing::info!(runtime = %plan.runtime, "container runtime installed");
        Ok(())
    }
}
