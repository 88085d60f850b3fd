//! Action engine that sequences mounts, the root change, and installation.

use std::path::PathBuf;

use cexec_common::config::{ActionConfig, ActionInputs};
use cexec_core::filesystem::chroot::RootTransition;
use cexec_core::filesystem::mount::MountController;
use cexec_core::host::Host;

use crate::error::ActionError;
use crate::install::{RuntimeInstaller, RuntimeSelection};
use crate::runtime::ContainerRuntime;

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Directory the device was mounted on.
    pub mountpoint: PathBuf,
    /// Filesystem type the device ended up mounted with.
    pub fs_type: String,
    /// Whether the installer ran inside the device's root.
    pub entered_root: bool,
    /// Runtime that was installed, if any.
    pub installed: Option<ContainerRuntime>,
    /// `Some(false)` when leaving the root failed; `None` when no root was
    /// entered.
    pub root_restored: Option<bool>,
}

/// Runs the action against a host and an installer.
///
/// Fatal failures stop the run immediately and leave earlier mounts in
/// place. Once the root has been entered it is always reversed before
/// returning, including when installation fails.
#[derive(Debug)]
pub struct Engine<'a, H: Host, I: RuntimeInstaller> {
    host: &'a H,
    installer: &'a I,
    mountpoint: Option<PathBuf>,
}

impl<'a, H: Host, I: RuntimeInstaller> Engine<'a, H, I> {
    /// Creates an engine using the fixed action mountpoint.
    #[must_use]
    pub const fn new(host: &'a H, installer: &'a I) -> Self {
        Self {
            host,
            installer,
            mountpoint: None,
        }
    }

    /// Mounts somewhere other than the fixed action mountpoint.
    #[must_use]
    pub fn with_mountpoint(mut self, mountpoint: impl Into<PathBuf>) -> Self {
        self.mountpoint = Some(mountpoint.into());
        self
    }

    /// Validates `inputs` and runs the action.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Config`] before any host call if the inputs
    /// are unusable, otherwise as [`Engine::run_config`].
    pub fn run(&self, inputs: ActionInputs) -> Result<RunReport, ActionError> {
        let mut config = ActionConfig::from_inputs(inputs)?;
        if let Some(mountpoint) = &self.mountpoint {
            config = config.with_mountpoint(mountpoint.clone());
        }
        self.run_config(&config)
    }

    /// Runs the action for an already validated configuration.
    ///
    /// # Errors
    ///
    /// Returns the first fatal failure: a configuration, mount, root
    /// entry, or installation error. Failing to leave the root is logged
    /// and reported in [`RunReport::root_restored`] instead.
    pub fn run_config(&self, config: &ActionConfig) -> Result<RunReport, ActionError> {
        let selection = RuntimeSelection::resolve(
            &config.runtime_name,
            config.install_script_url.as_deref(),
        )?;

        let controller = MountController::new(self.host);
        controller.create_mountpoint(&config.mountpoint)?;
        let device = controller.attach_device(
            config.block_device.as_str(),
            &config.mountpoint,
            &config.fs_type,
        )?;
        let fs_type = device.fs_type().to_string();

        let mut transition = if config.chroot {
            let prepared = controller.attach_pseudo_filesystems(device)?;
            tracing::info!("changing root before executing command");
            Some(RootTransition::enter(self.host, prepared.root())?)
        } else {
            None
        };

        let installed = self.install(&selection);

        let root_restored = transition.as_mut().map(|capability| {
            capability.reverse().map_or_else(
                |e| {
                    tracing::error!(
                        root = %config.mountpoint.display(),
                        error = %e,
                        "error exiting root, execution continuing"
                    );
                    false
                },
                |()| true,
            )
        });

        Ok(RunReport {
            mountpoint: config.mountpoint.clone(),
            fs_type,
            entered_root: transition.is_some(),
            installed: installed?,
            root_restored,
        })
    }

    fn install(
        &self,
        selection: &RuntimeSelection,
    ) -> Result<Option<ContainerRuntime>, ActionError> {
        match selection {
            RuntimeSelection::NotRequested => {
                tracing::info!("no container runtime requested");
                Ok(None)
            }
            RuntimeSelection::Unsupported(name) => {
                tracing::warn!(runtime = %name, "unsupported container runtime");
                Ok(None)
            }
            RuntimeSelection::Install(plan) => {
                self.installer
                    .install(plan)
                    .map_err(|source| ActionError::Install {
                        runtime: plan.runtime,
                        source,
                    })?;
                Ok(Some(plan.runtime))
            }
        }
    }
}
