//! Mountpoint setup for the action.
//!
//! Creates the mountpoint, attaches the block device to it, and attaches
//! `/dev`, `/proc`, and `/sys` inside it when the run will chroot.

use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::mount::MsFlags;

use crate::error::MountError;
use crate::host::Host;

/// Pseudo-source name used for virtual filesystems.
const PSEUDO_SOURCE: &str = "none";

/// Shown in errors when no filesystem type could be probed.
const AUTO_FS_TYPE: &str = "auto";

/// Virtual filesystems userspace tooling expects inside the new root,
/// as `(subdirectory, filesystem type)`.
const PSEUDO_FILESYSTEMS: [(&str, &str); 3] =
    [("dev", "devtmpfs"), ("proc", "proc"), ("sys", "sysfs")];

/// A single `mount(2)` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPoint {
    /// Device or pseudo-source being attached.
    pub source: String,
    /// Directory the filesystem is attached to.
    pub target: PathBuf,
    /// Filesystem type. Empty lets the kernel decide.
    pub fs_type: String,
    /// Mount flags.
    pub flags: MsFlags,
}

impl MountPoint {
    /// Describes a mount of `source` on `target`.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        target: impl Into<PathBuf>,
        fs_type: impl Into<String>,
        flags: MsFlags,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            fs_type: fs_type.into(),
            flags,
        }
    }
}

/// Proof that the block device is attached.
///
/// Only [`MountController::attach_device`] creates one, and
/// [`MountController::attach_pseudo_filesystems`] consumes it, so the
/// pseudo-filesystems cannot be mounted before the device or twice.
#[derive(Debug)]
pub struct DeviceMount {
    device: String,
    mountpoint: PathBuf,
    fs_type: String,
}

impl DeviceMount {
    /// Device that was attached.
    #[must_use]
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Directory the device is attached to.
    #[must_use]
    pub fn mountpoint(&self) -> &Path {
        &self.mountpoint
    }

    /// Filesystem type the device was mounted with, after any probing.
    #[must_use]
    pub fn fs_type(&self) -> &str {
        &self.fs_type
    }
}

/// Proof that the device and its pseudo-filesystems are attached, so the
/// mountpoint is ready to be entered as a root.
#[derive(Debug)]
pub struct PseudoMounts {
    device: DeviceMount,
    targets: Vec<PathBuf>,
}

impl PseudoMounts {
    /// Root directory ready to be entered.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.device.mountpoint()
    }

    /// The device mount underneath.
    #[must_use]
    pub const fn device(&self) -> &DeviceMount {
        &self.device
    }

    /// Directories the pseudo-filesystems were attached to, in order.
    #[must_use]
    pub fn targets(&self) -> &[PathBuf] {
        &self.targets
    }
}

/// Attaches the filesystems the rest of the run depends on.
///
/// Mounts are never detached here; teardown is left to the process or
/// container going away.
#[derive(Debug)]
pub struct MountController<'h, H: Host> {
    host: &'h H,
}

impl<'h, H: Host> MountController<'h, H> {
    /// Creates a controller issuing calls through `host`.
    #[must_use]
    pub const fn new(host: &'h H) -> Self {
        Self { host }
    }

    /// Creates the mountpoint directory.
    ///
    /// # Errors
    ///
    /// Returns [`MountError::DirectoryCreateFailed`] if the directory
    /// already exists, its parent is missing, or permission is denied.
    pub fn create_mountpoint(&self, path: &Path) -> Result<(), MountError> {
        self.host
            .create_dir(path)
            .map_err(|source| MountError::DirectoryCreateFailed {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(path = %path.display(), "created mountpoint");
        Ok(())
    }

    /// Attaches `device` to `mountpoint` without special flags.
    ///
    /// An empty `fs_type` probes each device-backed filesystem the kernel
    /// knows, in kernel order, and keeps the first that mounts.
    ///
    /// # Errors
    ///
    /// Returns [`MountError::MountFailed`] if the mount fails, or
    /// [`MountError::FilesystemProbeFailed`] if probing cannot start.
    pub fn attach_device(
        &self,
        device: &str,
        mountpoint: &Path,
        fs_type: &str,
    ) -> Result<DeviceMount, MountError> {
        let fs_type = if fs_type.is_empty() {
            self.probe_device(device, mountpoint)?
        } else {
            let request = MountPoint::new(device, mountpoint, fs_type, MsFlags::empty());
            self.host
                .mount(&request)
                .map_err(|cause| mount_failed(&request, cause))?;
            fs_type.to_string()
        };

        tracing::info!(
            device,
            path = %mountpoint.display(),
            fs_type = %fs_type,
            "mounted block device"
        );
        Ok(DeviceMount {
            device: device.to_string(),
            mountpoint: mountpoint.to_path_buf(),
            fs_type,
        })
    }

    /// Attaches read-only `devtmpfs`, `proc`, and `sysfs` under the device
    /// mount's `dev`, `proc`, and `sys` directories.
    ///
    /// The directories must already exist on the device. Stops at the first
    /// failure and leaves earlier mounts in place.
    ///
    /// # Errors
    ///
    /// Returns [`MountError::MountFailed`] naming the first target that
    /// could not be mounted.
    pub fn attach_pseudo_filesystems(
        &self,
        device: DeviceMount,
    ) -> Result<PseudoMounts, MountError> {
        let mut targets = Vec::with_capacity(PSEUDO_FILESYSTEMS.len());
        for (dir, fs_type) in PSEUDO_FILESYSTEMS {
            let request = MountPoint::new(
                PSEUDO_SOURCE,
                device.mountpoint().join(dir),
                fs_type,
                MsFlags::MS_RDONLY,
            );
            self.host
                .mount(&request)
                .map_err(|cause| mount_failed(&request, cause))?;
            tracing::debug!(path = %request.target.display(), fs_type, "mounted pseudo-filesystem");
            targets.push(request.target);
        }
        Ok(PseudoMounts { device, targets })
    }

    fn probe_device(&self, device: &str, mountpoint: &Path) -> Result<String, MountError> {
        let candidates = self
            .host
            .block_filesystems()
            .map_err(|source| MountError::FilesystemProbeFailed { source })?;

        let mut last_failure = None;
        for fs_type in candidates {
            let request = MountPoint::new(device, mountpoint, fs_type, MsFlags::empty());
            match self.host.mount(&request) {
                Ok(()) => return Ok(request.fs_type),
                Err(cause) if rejects_fs_type(cause) => {
                    tracing::debug!(device, fs_type = %request.fs_type, %cause, "filesystem probe rejected");
                    last_failure = Some(mount_failed(&request, cause));
                }
                Err(cause) => return Err(mount_failed(&request, cause)),
            }
        }

        Err(last_failure.unwrap_or_else(|| MountError::MountFailed {
            device: device.to_string(),
            target: mountpoint.to_path_buf(),
            fs_type: AUTO_FS_TYPE.to_string(),
            cause: Errno::EINVAL,
        }))
    }
}

/// Whether a mount error only says the filesystem type does not match, so
/// the next candidate is worth trying. Anything else concerns the device or
/// the mountpoint and would fail the same way for every type.
const fn rejects_fs_type(cause: Errno) -> bool {
    matches!(cause, Errno::EINVAL | Errno::ENODEV)
}

fn mount_failed(request: &MountPoint, cause: Errno) -> MountError {
    MountError::MountFailed {
        device: request.source.clone(),
        target: request.target.clone(),
        fs_type: request.fs_type.clone(),
        cause,
    }
}
