//! Command-line and environment inputs.

use cexec_common::config::ActionInputs;
use cexec_common::constants::{
    ENV_BLOCK_DEVICE, ENV_CHROOT, ENV_CONTAINER_RUNTIME, ENV_FS_TYPE, ENV_INSTALL_SCRIPT_URL,
};
use clap::{Parser, ValueEnum};

/// cexec — mount a block device, chroot into it, and install a container runtime.
///
/// Every option can also be given through its environment variable, which
/// is how workflow actions pass them.
#[derive(Parser, Debug)]
#[command(name = "cexec", version, about, long_about = None)]
pub struct Cli {
    /// Block device to mount at /mountAction.
    #[arg(long, env = ENV_BLOCK_DEVICE)]
    pub block_device: Option<String>,

    /// Filesystem type of the block device. Empty probes the kernel's list.
    #[arg(long, env = ENV_FS_TYPE)]
    pub fs_type: Option<String>,

    /// Any non-empty value chroots into the device before installing.
    #[arg(long, env = ENV_CHROOT)]
    pub chroot: Option<String>,

    /// Container runtime to install (docker, podman, containerd).
    #[arg(long, env = ENV_CONTAINER_RUNTIME)]
    pub container_runtime: Option<String>,

    /// Install script to use instead of the runtime's published one.
    #[arg(long, env = ENV_INSTALL_SCRIPT_URL)]
    pub install_script_url: Option<String>,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// How log events are rendered on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

impl From<Cli> for ActionInputs {
    fn from(cli: Cli) -> Self {
        Self {
            block_device: cli.block_device,
            fs_type: cli.fs_type,
            chroot: cli.chroot,
            container_runtime: cli.container_runtime,
            install_script_url: cli.install_script_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_map_onto_action_inputs() {
        let cli = Cli::try_parse_from([
            "cexec",
            "--block-device",
            "/dev/sdb1",
            "--fs-type",
            "ext4",
            "--chroot",
            "true",
            "--container-runtime",
            "docker",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Text);

        let inputs = ActionInputs::from(cli);
        assert_eq!(inputs.block_device.as_deref(), Some("/dev/sdb1"));
        assert_eq!(inputs.fs_type.as_deref(), Some("ext4"));
        assert_eq!(inputs.chroot.as_deref(), Some("true"));
        assert_eq!(inputs.container_runtime.as_deref(), Some("docker"));
    }

    #[test]
    fn json_log_format_is_accepted() {
        let cli = Cli::try_parse_from(["cexec", "--log-format", "json"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
    }
}
