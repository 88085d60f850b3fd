//! The privileged host operations the action depends on.
//!
//! [`LinuxHost`] issues the real syscalls. Everything above this module
//! takes a `&impl Host`, which keeps ordering and error handling testable
//! without root.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use nix::errno::Errno;

use crate::filesystem::mount::MountPoint;

/// Kernel list of registered filesystem types.
const PROC_FILESYSTEMS: &str = "/proc/filesystems";

/// Process-global filesystem operations.
pub trait Host {
    /// Creates a single directory. The parent must exist.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from `mkdir(2)`.
    fn create_dir(&self, path: &Path) -> io::Result<()>;

    /// Attaches a filesystem as described by `mount`.
    ///
    /// # Errors
    ///
    /// Returns the errno from `mount(2)`.
    fn mount(&self, mount: &MountPoint) -> Result<(), Errno>;

    /// Lists filesystem types backed by a device, in kernel order.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from reading the kernel's filesystem list.
    fn block_filesystems(&self) -> io::Result<Vec<String>>;

    /// Returns the current working directory.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from `getcwd(3)`.
    fn current_dir(&self) -> io::Result<PathBuf>;

    /// Changes the process root.
    ///
    /// # Errors
    ///
    /// Returns the errno from `chroot(2)`.
    fn chroot(&self, path: &Path) -> Result<(), Errno>;

    /// Changes the working directory by path.
    ///
    /// # Errors
    ///
    /// Returns the errno from `chdir(2)`.
    fn chdir(&self, path: &Path) -> Result<(), Errno>;

    /// Changes the working directory to an open directory handle.
    ///
    /// # Errors
    ///
    /// Returns the errno from `fchdir(2)`.
    fn fchdir(&self, dir: &File) -> Result<(), Errno>;
}

/// [`Host`] backed by the running kernel.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxHost;

impl LinuxHost {
    /// Creates a handle to the running kernel.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Host for LinuxHost {
    fn create_dir(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir(path)
    }

    fn mount(&self, mount: &MountPoint) -> Result<(), Errno> {
        let fs_type = (!mount.fs_type.is_empty()).then_some(mount.fs_type.as_str());
        nix::mount::mount(
            Some(mount.source.as_str()),
            mount.target.as_path(),
            fs_type,
            mount.flags,
            None::<&str>,
        )
    }

    fn block_filesystems(&self) -> io::Result<Vec<String>> {
        let listing = std::fs::read_to_string(PROC_FILESYSTEMS)?;
        Ok(parse_block_filesystems(&listing))
    }

    fn current_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }

    fn chroot(&self, path: &Path) -> Result<(), Errno> {
        nix::unistd::chroot(path)
    }

    fn chdir(&self, path: &Path) -> Result<(), Errno> {
        nix::unistd::chdir(path)
    }

    fn fchdir(&self, dir: &File) -> Result<(), Errno> {
        nix::unistd::fchdir(dir)
    }
}

/// Extracts device-backed filesystem types from `/proc/filesystems`.
///
/// Lines flagged `nodev` describe virtual filesystems and are skipped.
pub(crate) fn parse_block_filesystems(listing: &str) -> Vec<String> {
    listing
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some(fs_type), None) => Some(fs_type.to_string()),
                _ => None,
            }
        })
        .collect()
}
