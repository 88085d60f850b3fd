//! Validated configuration for a single action run.

use std::path::PathBuf;

use crate::constants::{ENV_BLOCK_DEVICE, MOUNT_ACTION_DIR};
use crate::error::{ConfigError, Result};
use crate::types::BlockDevice;

/// Raw inputs as read from flags or the environment.
///
/// Every field is optional here; [`ActionConfig::from_inputs`] decides
/// which absences are fatal.
#[derive(Debug, Clone, Default)]
pub struct ActionInputs {
    /// Block device to mount.
    pub block_device: Option<String>,
    /// Filesystem type of the device. Empty means auto-detect.
    pub fs_type: Option<String>,
    /// Any non-empty value requests a root change.
    pub chroot: Option<String>,
    /// Container runtime to install.
    pub container_runtime: Option<String>,
    /// Override for the runtime's install script location.
    pub install_script_url: Option<String>,
}

/// Configuration for one run of the action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionConfig {
    /// Device attached at [`ActionConfig::mountpoint`].
    pub block_device: BlockDevice,
    /// Filesystem type passed to the mount call. Empty means auto-detect.
    pub fs_type: String,
    /// Whether to mount pseudo-filesystems and chroot into the device.
    pub chroot: bool,
    /// Lower-cased runtime name. Empty when none was requested.
    pub runtime_name: String,
    /// Install script override, if any.
    pub install_script_url: Option<String>,
    /// Directory the device is mounted on.
    pub mountpoint: PathBuf,
}

impl ActionConfig {
    /// Validates raw inputs into a run configuration rooted at
    /// [`MOUNT_ACTION_DIR`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingBlockDevice`] if no device was given.
    pub fn from_inputs(inputs: ActionInputs) -> Result<Self> {
        let block_device = inputs
            .block_device
            .and_then(BlockDevice::new)
            .ok_or(ConfigError::MissingBlockDevice {
                var: ENV_BLOCK_DEVICE,
            })?;

        Ok(Self {
            block_device,
            fs_type: inputs.fs_type.unwrap_or_default().trim().to_string(),
            chroot: inputs.chroot.is_some_and(|v| !v.is_empty()),
            runtime_name: inputs
                .container_runtime
                .unwrap_or_default()
                .trim()
                .to_lowercase(),
            install_script_url: inputs
                .install_script_url
                .filter(|url| !url.trim().is_empty()),
            mountpoint: PathBuf::from(MOUNT_ACTION_DIR),
        })
    }

    /// Replaces the fixed mountpoint, for tests running without privileges.
    #[must_use]
    pub fn with_mountpoint(mut self, mountpoint: impl Into<PathBuf>) -> Self {
        self.mountpoint = mountpoint.into();
        self
    }
}
