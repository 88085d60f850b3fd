//! Error types for mount and root-change operations.

use std::path::PathBuf;

use nix::errno::Errno;
use thiserror::Error;

/// Failure while preparing the action's filesystems.
#[derive(Debug, Error)]
pub enum MountError {
    /// The mountpoint directory could not be created.
    #[error("error creating the action mountpoint [{path}]: {source}")]
    DirectoryCreateFailed {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A `mount(2)` call failed.
    #[error("mounting [{device}] -> [{target}] ({fs_type}) error [{cause}]")]
    MountFailed {
        /// Device or pseudo-source being attached.
        device: String,
        /// Directory it was being attached to.
        target: PathBuf,
        /// Filesystem type requested, or the last one probed.
        fs_type: String,
        /// Errno returned by the kernel.
        #[source]
        cause: Errno,
    },

    /// The kernel's filesystem list could not be read for auto-detection.
    #[error("cannot list kernel filesystems for auto-detection: {source}")]
    FilesystemProbeFailed {
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Failure while entering or leaving the new root.
#[derive(Debug, Error)]
pub enum TransitionError {
    /// The working directory could not be determined before entering.
    #[error("cannot determine the current working directory: {source}")]
    CurrentDirUnavailable {
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The working directory could not be opened for the way back.
    #[error("cannot open working directory [{path}]: {source}")]
    CaptureFailed {
        /// Working directory at the time of entry.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// `chroot(2)` into the new root failed.
    #[error("error changing root to [{root}]: {cause}")]
    RootChangeFailed {
        /// Root that was being entered.
        root: PathBuf,
        /// Errno returned by the kernel.
        #[source]
        cause: Errno,
    },

    /// `chdir("/")` inside the new root failed.
    #[error("cannot reset working directory inside the new root: {cause}")]
    WorkingDirectoryResetFailed {
        /// Errno returned by the kernel.
        #[source]
        cause: Errno,
    },

    /// Returning to the original root failed. The handle was still released.
    #[error("error exiting root: {cause}")]
    ReversalFailed {
        /// Errno returned by the kernel.
        #[source]
        cause: Errno,
    },

    /// The reversal capability was already used.
    #[error("root transition was already reversed")]
    AlreadyReversed,
}
