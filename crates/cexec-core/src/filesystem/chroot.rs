//! Reversible root changes via `chroot(2)`.
//!
//! Entering keeps an open handle to the previous working directory. The
//! handle still refers to the old tree after the root moves, so `fchdir`
//! to it followed by `chroot(".")` puts the process back.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::TransitionError;
use crate::host::Host;

/// Enters a new root.
#[derive(Debug, Clone, Copy)]
pub struct RootTransition;

impl RootTransition {
    /// Changes the process root to `new_root` and the working directory to
    /// its top.
    ///
    /// `new_root` must already be mounted. On failure nothing is held and
    /// the root is unchanged, except when the `chdir("/")` fails after the
    /// root already moved.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::RootChangeFailed`] or
    /// [`TransitionError::WorkingDirectoryResetFailed`] for the privileged
    /// steps, and [`TransitionError::CurrentDirUnavailable`] or
    /// [`TransitionError::CaptureFailed`] if the way back cannot be captured.
    pub fn enter<'h, H: Host>(
        host: &'h H,
        new_root: &Path,
    ) -> Result<ReversalCapability<'h, H>, TransitionError> {
        let original_dir = host
            .current_dir()
            .map_err(|source| TransitionError::CurrentDirUnavailable { source })?;
        let handle = File::open(&original_dir).map_err(|source| TransitionError::CaptureFailed {
            path: original_dir.clone(),
            source,
        })?;

        host.chroot(new_root)
            .map_err(|cause| TransitionError::RootChangeFailed {
                root: new_root.to_path_buf(),
                cause,
            })?;
        host.chdir(Path::new("/"))
            .map_err(|cause| TransitionError::WorkingDirectoryResetFailed { cause })?;

        tracing::info!(
            root = %new_root.display(),
            previous = %original_dir.display(),
            "changed root"
        );
        Ok(ReversalCapability {
            host,
            original_dir,
            state: State::Entered(handle),
        })
    }
}

#[derive(Debug)]
enum State {
    Entered(File),
    Exited,
}

/// One-shot way back out of a root entered with [`RootTransition::enter`].
///
/// Owns the only handle to the previous working directory. The handle is
/// released by [`ReversalCapability::reverse`] whatever its outcome.
#[derive(Debug)]
pub struct ReversalCapability<'h, H: Host> {
    host: &'h H,
    original_dir: PathBuf,
    state: State,
}

impl<H: Host> ReversalCapability<'_, H> {
    /// Working directory recorded before the root changed.
    #[must_use]
    pub fn original_dir(&self) -> &Path {
        &self.original_dir
    }

    /// Whether [`ReversalCapability::reverse`] has been called.
    #[must_use]
    pub const fn is_reversed(&self) -> bool {
        matches!(self.state, State::Exited)
    }

    /// Restores the original root and working directory.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::AlreadyReversed`] without touching the
    /// host if called a second time, and [`TransitionError::ReversalFailed`]
    /// if `fchdir` or `chroot(".")` fails. In that case the process may be
    /// left with only one of the two restored.
    pub fn reverse(&mut self) -> Result<(), TransitionError> {
        let State::Entered(handle) = std::mem::replace(&mut self.state, State::Exited) else {
            return Err(TransitionError::AlreadyReversed);
        };

        let result = self
            .host
            .fchdir(&handle)
            .and_then(|()| self.host.chroot(Path::new(".")));
        drop(handle);
        result.map_err(|cause| TransitionError::ReversalFailed { cause })?;

        tracing::info!(restored = %self.original_dir.display(), "exited root");
        Ok(())
    }
}

impl<H: Host> Drop for ReversalCapability<'_, H> {
    fn drop(&mut self) {
        if !self.is_reversed() {
            tracing::warn!(
                previous = %self.original_dir.display(),
                "root transition dropped without being reversed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use nix::errno::Errno;

    use super::*;
    use crate::testing::{HostCall, RecordingHost};

    fn new_root() -> PathBuf {
        PathBuf::from("/mountAction")
    }

    #[test]
    fn enter_chroots_then_resets_working_directory() {
        let start = tempfile::tempdir().expect("failed to create tempdir");
        let host = RecordingHost::new().with_cwd(start.path());

        let capability = RootTransition::enter(&host, &new_root()).unwrap();

        assert_eq!(
            host.calls(),
            [HostCall::Chroot(new_root()), HostCall::Chdir(PathBuf::from("/"))]
        );
        assert_eq!(capability.original_dir(), start.path());
        assert_eq!(host.cwd(), PathBuf::from("/"));
        assert!(!capability.is_reversed());
    }

    #[test]
    fn reverse_restores_recorded_working_directory() {
        let start = tempfile::tempdir().expect("failed to create tempdir");
        let nested = start.path().join("work").join("dir");
        std::fs::create_dir_all(&nested).unwrap();
        let recorded = nested.canonicalize().unwrap();
        let host = RecordingHost::new().with_cwd(&recorded);

        let mut capability = RootTransition::enter(&host, &new_root()).unwrap();
        capability.reverse().unwrap();

        assert_eq!(host.cwd(), recorded);
        assert_eq!(host.chroots(), [new_root(), PathBuf::from(".")]);
        assert!(capability.is_reversed());
    }

    #[test]
    fn second_reverse_is_rejected_without_host_calls() {
        let start = tempfile::tempdir().expect("failed to create tempdir");
        let host = RecordingHost::new().with_cwd(start.path());

        let mut capability = RootTransition::enter(&host, &new_root()).unwrap();
        capability.reverse().unwrap();
        let calls_after_first = host.calls().len();

        let err = capability.reverse().unwrap_err();
        assert!(matches!(err, TransitionError::AlreadyReversed));
        assert_eq!(host.calls().len(), calls_after_first);
    }

    #[test]
    fn enter_failure_holds_nothing() {
        let start = tempfile::tempdir().expect("failed to create tempdir");
        let host = RecordingHost::new()
            .with_cwd(start.path())
            .failing_chroot_into(new_root(), Errno::EPERM);

        let err = RootTransition::enter(&host, &new_root()).unwrap_err();
        assert!(matches!(
            err,
            TransitionError::RootChangeFailed { cause: Errno::EPERM, .. }
        ));
        assert_eq!(host.calls(), [HostCall::Chroot(new_root())]);
    }

    #[test]
    fn enter_reports_working_directory_reset_failure() {
        let start = tempfile::tempdir().expect("failed to create tempdir");
        let host = RecordingHost::new()
            .with_cwd(start.path())
            .failing_chdir(Errno::ENOENT);

        let err = RootTransition::enter(&host, &new_root()).unwrap_err();
        assert!(matches!(
            err,
            TransitionError::WorkingDirectoryResetFailed { cause: Errno::ENOENT }
        ));
    }

    #[test]
    fn enter_fails_when_working_directory_cannot_be_opened() {
        let host = RecordingHost::new().with_cwd("/nonexistent/cexec/cwd");

        let err = RootTransition::enter(&host, &new_root()).unwrap_err();
        assert!(matches!(err, TransitionError::CaptureFailed { .. }));
        assert!(host.calls().is_empty());
    }

    #[test]
    fn failed_fchdir_skips_chroot_and_consumes_capability() {
        let start = tempfile::tempdir().expect("failed to create tempdir");
        let host = RecordingHost::new()
            .with_cwd(start.path())
            .failing_fchdir(Errno::EBADF);

        let mut capability = RootTransition::enter(&host, &new_root()).unwrap();
        let err = capability.reverse().unwrap_err();

        assert!(matches!(
            err,
            TransitionError::ReversalFailed { cause: Errno::EBADF }
        ));
        assert_eq!(host.chroots(), [new_root()]);
        assert!(capability.is_reversed());
        assert!(matches!(
            capability.reverse().unwrap_err(),
            TransitionError::AlreadyReversed
        ));
    }

    #[test]
    fn failed_chroot_back_is_a_reversal_failure() {
        let start = tempfile::tempdir().expect("failed to create tempdir");
        let host = RecordingHost::new()
            .with_cwd(start.path())
            .failing_chroot_into(".", Errno::EPERM);

        let mut capability = RootTransition::enter(&host, &new_root()).unwrap();
        let err = capability.reverse().unwrap_err();

        assert!(matches!(
            err,
            TransitionError::ReversalFailed { cause: Errno::EPERM }
        ));
        assert!(capability.is_reversed());
    }

    /// Needs `CAP_SYS_CHROOT`: `sudo -E cargo test -- --ignored`.
    #[test]
    #[ignore = "requires root"]
    fn real_chroot_round_trip_restores_root_and_cwd() {
        let host = crate::host::LinuxHost::new();
        let root = tempfile::tempdir().expect("failed to create tempdir");
        std::fs::write(root.path().join("marker"), b"inside").unwrap();
        let before = std::env::current_dir().unwrap();

        let mut capability = RootTransition::enter(&host, root.path()).unwrap();
        assert!(Path::new("/marker").exists());
        capability.reverse().unwrap();

        assert_eq!(std::env::current_dir().unwrap(), before);
        assert!(!Path::new("/marker").exists());
    }
}
