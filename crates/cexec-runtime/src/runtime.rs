//! Known container runtimes and where their install scripts live.

use std::fmt;

/// Convenience script published by Docker.
pub const DOCKER_INSTALL_URL: &str = "https://get.docker.com";

const _: () = assert!(!DOCKER_INSTALL_URL.is_empty());

/// Container runtimes the action knows how to look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerRuntime {
    /// Docker Engine.
    Docker,
    /// Podman.
    Podman,
    /// containerd.
    Containerd,
}

impl ContainerRuntime {
    /// Every known runtime.
    pub const ALL: [Self; 3] = [Self::Docker, Self::Podman, Self::Containerd];

    /// Looks up a runtime by name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|runtime| runtime.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Lower-case name of the runtime.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Podman => "podman",
            Self::Containerd => "containerd",
        }
    }

    /// Published install script, if the project ships one.
    ///
    /// Podman and containerd only ship distribution packages, so they need
    /// an explicit script location from the operator.
    #[must_use]
    pub const fn install_source(self) -> Option<&'static str> {
        match self {
            Self::Docker => Some(DOCKER_INSTALL_URL),
            Self::Podman | Self::Containerd => None,
        }
    }
}

impl fmt::Display for ContainerRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
