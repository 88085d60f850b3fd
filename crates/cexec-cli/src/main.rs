//! # cexec — Chroot Exec
//!
//! Mounts a block device at `/mountAction`, optionally chroots into it,
//! and installs a container runtime from inside.

#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;
mod output;

use std::process::ExitCode;

use cexec_core::host::LinuxHost;
use cexec_runtime::engine::Engine;
use cexec_runtime::error::ActionError;
use cexec_runtime::install::Installer;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, LogFormat};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format);
    output::print_header();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            let code = err
                .downcast_ref::<ActionError>()
                .map_or(1, ActionError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let host = LinuxHost::new();
    let installer = Installer::system();
    let report = Engine::new(&host, &installer).run(cli.into())?;
    output::print_report(&report);
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
