//! Banner and run summary printed to stderr.

use cexec_common::constants::BANNER;
use cexec_runtime::engine::RunReport;

/// Prints the startup banner.
#[allow(clippy::print_stderr)]
pub fn print_header() {
    eprintln!("{BANNER}");
    eprintln!("{}", "-".repeat(24));
}

/// Prints a one-line summary of a finished run.
#[allow(clippy::print_stderr)]
pub fn print_report(report: &RunReport) {
    eprintln!("{}", format_report(report));
}

/// Formats a run summary, e.g. `mounted /mountAction (ext4), chroot: restored, runtime: docker`.
#[must_use]
pub fn format_report(report: &RunReport) -> String {
    let chroot = match report.root_restored {
        None => "no",
        Some(true) => "restored",
        Some(false) => "NOT restored",
    };
    let runtime = report.installed.map_or("none", |r| r.name());
    format!(
        "mounted {} ({}), chroot: {chroot}, runtime: {runtime}",
        report.mountpoint.display(),
        report.fs_type
    )
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use cexec_runtime::runtime::ContainerRuntime;

    use super::*;

    fn report() -> RunReport {
        RunReport {
            mountpoint: PathBuf::from("/mountAction"),
            fs_type: "ext4".to_string(),
            entered_root: false,
            installed: None,
            root_restored: None,
        }
    }

    #[test]
    fn format_report_without_chroot_or_runtime() {
        assert_eq!(
            format_report(&report()),
            "mounted /mountAction (ext4), chroot: no, runtime: none"
        );
    }

    #[test]
    fn format_report_flags_unrestored_root() {
        let report = RunReport {
            entered_root: true,
            installed: Some(ContainerRuntime::Docker),
            root_restored: Some(false),
            ..report()
        };
        assert_eq!(
            format_report(&report),
            "mounted /mountAction (ext4), chroot: NOT restored, runtime: docker"
        );
    }
}
