//! In-memory [`Host`] for exercising mount and chroot sequencing without
//! privileges.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use nix::errno::Errno;

use crate::filesystem::mount::MountPoint;
use crate::host::Host;

/// One privileged operation observed by [`RecordingHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    /// `mkdir(2)`.
    CreateDir(PathBuf),
    /// `mount(2)`.
    Mount(MountPoint),
    /// `chroot(2)`.
    Chroot(PathBuf),
    /// `chdir(2)`.
    Chdir(PathBuf),
    /// `fchdir(2)`, recorded with the path the handle refers to.
    Fchdir(PathBuf),
}

/// Records every call and simulates the working directory.
///
/// Calls succeed unless a failure was injected with one of the `failing_*`
/// builders. Failed calls are still recorded.
#[derive(Debug)]
pub struct RecordingHost {
    calls: RefCell<Vec<HostCall>>,
    cwd: RefCell<PathBuf>,
    filesystems: Vec<String>,
    create_dir_failure: Option<io::ErrorKind>,
    mount_failures: HashMap<PathBuf, Errno>,
    fs_type_failures: HashMap<String, Errno>,
    chroot_failures: HashMap<PathBuf, Errno>,
    chdir_failure: Option<Errno>,
    fchdir_failure: Option<Errno>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingHost {
    /// Creates a host whose simulated working directory is the real one.
    #[must_use]
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            cwd: RefCell::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"))),
            filesystems: vec!["ext4".into(), "xfs".into(), "vfat".into()],
            create_dir_failure: None,
            mount_failures: HashMap::new(),
            fs_type_failures: HashMap::new(),
            chroot_failures: HashMap::new(),
            chdir_failure: None,
            fchdir_failure: None,
        }
    }

    /// Starts from the given working directory. It must exist on disk.
    #[must_use]
    pub fn with_cwd(self, cwd: impl Into<PathBuf>) -> Self {
        let _ = self.cwd.replace(cwd.into());
        self
    }

    /// Replaces the filesystem types offered for auto-detection.
    #[must_use]
    pub fn with_filesystems(mut self, filesystems: &[&str]) -> Self {
        self.filesystems = filesystems.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Makes `create_dir` fail with `kind`.
    #[must_use]
    pub fn failing_create_dir(mut self, kind: io::ErrorKind) -> Self {
        self.create_dir_failure = Some(kind);
        self
    }

    /// Makes mounts onto `target` fail with `errno`.
    #[must_use]
    pub fn failing_mount_on(mut self, target: impl Into<PathBuf>, errno: Errno) -> Self {
        let _ = self.mount_failures.insert(target.into(), errno);
        self
    }

    /// Makes mounts with filesystem type `fs_type` fail with `errno`.
    #[must_use]
    pub fn failing_fs_type(mut self, fs_type: &str, errno: Errno) -> Self {
        let _ = self.fs_type_failures.insert(fs_type.to_string(), errno);
        self
    }

    /// Makes `chroot(path)` fail with `errno`.
    #[must_use]
    pub fn failing_chroot_into(mut self, path: impl Into<PathBuf>, errno: Errno) -> Self {
        let _ = self.chroot_failures.insert(path.into(), errno);
        self
    }

    /// Makes every `chdir` fail with `errno`.
    #[must_use]
    pub fn failing_chdir(mut self, errno: Errno) -> Self {
        self.chdir_failure = Some(errno);
        self
    }

    /// Makes every `fchdir` fail with `errno`.
    #[must_use]
    pub fn failing_fchdir(mut self, errno: Errno) -> Self {
        self.fchdir_failure = Some(errno);
        self
    }

    /// Returns all recorded calls in order.
    #[must_use]
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    /// Returns the recorded mount calls in order.
    #[must_use]
    pub fn mounts(&self) -> Vec<MountPoint> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                HostCall::Mount(mount) => Some(mount.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns the paths passed to `chroot`, in order.
    #[must_use]
    pub fn chroots(&self) -> Vec<PathBuf> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                HostCall::Chroot(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns the simulated working directory.
    #[must_use]
    pub fn cwd(&self) -> PathBuf {
        self.cwd.borrow().clone()
    }

    fn record(&self, call: HostCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Host for RecordingHost {
    fn create_dir(&self, path: &Path) -> io::Result<()> {
        self.record(HostCall::CreateDir(path.to_path_buf()));
        self.create_dir_failure.map_or(Ok(()), |kind| Err(kind.into()))
    }

    fn mount(&self, mount: &MountPoint) -> Result<(), Errno> {
        self.record(HostCall::Mount(mount.clone()));
        if let Some(errno) = self.mount_failures.get(&mount.target) {
            return Err(*errno);
        }
        if let Some(errno) = self.fs_type_failures.get(&mount.fs_type) {
            return Err(*errno);
        }
        Ok(())
    }

    fn block_filesystems(&self) -> io::Result<Vec<String>> {
        Ok(self.filesystems.clone())
    }

    fn current_dir(&self) -> io::Result<PathBuf> {
        Ok(self.cwd())
    }

    fn chroot(&self, path: &Path) -> Result<(), Errno> {
        self.record(HostCall::Chroot(path.to_path_buf()));
        self.chroot_failures.get(path).map_or(Ok(()), |errno| Err(*errno))
    }

    fn chdir(&self, path: &Path) -> Result<(), Errno> {
        self.record(HostCall::Chdir(path.to_path_buf()));
        if let Some(errno) = self.chdir_failure {
            return Err(errno);
        }
        let _ = self.cwd.replace(path.to_path_buf());
        Ok(())
    }

    fn fchdir(&self, dir: &File) -> Result<(), Errno> {
        let target = std::fs::read_link(format!("/proc/self/fd/{}", dir.as_raw_fd()))
            .unwrap_or_default();
        self.record(HostCall::Fchdir(target.clone()));
        if let Some(errno) = self.fchdir_failure {
            return Err(errno);
        }
        let _ = self.cwd.replace(target);
        Ok(())
    }
}
