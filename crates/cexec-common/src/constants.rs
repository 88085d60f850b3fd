//! System-wide constants and fixed paths.

/// Mountpoint the block device is attached to on every run.
///
/// Scratch action images ship no directory hierarchy, so this path is
/// created fresh and must not already exist.
pub const MOUNT_ACTION_DIR: &str = "/mountAction";

/// Environment variable naming the block device to mount.
pub const ENV_BLOCK_DEVICE: &str = "BLOCK_DEVICE";
/// Environment variable naming the filesystem type of the block device.
pub const ENV_FS_TYPE: &str = "FS_TYPE";
/// Environment variable enabling the chroot path when non-empty.
pub const ENV_CHROOT: &str = "CHROOT";
/// Environment variable naming the container runtime to install.
pub const ENV_CONTAINER_RUNTIME: &str = "CONTAINER_RUNTIME";
/// Environment variable overriding the install script location.
pub const ENV_INSTALL_SCRIPT_URL: &str = "INSTALL_SCRIPT_URL";

/// Application name used in log output.
pub const APP_NAME: &str = "cexec";

/// Banner printed when the action starts.
pub const BANNER: &str = "CEXEC - Chroot Exec";
