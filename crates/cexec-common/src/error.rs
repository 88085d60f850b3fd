//! Configuration errors shared across the workspace.
//!
//! Each higher-level crate defines its own domain-specific error enum;
//! this one covers inputs that are rejected before any host state changes.

use thiserror::Error;

/// A required input is missing or unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No block device was given.
    #[error("no block device specified with environment variable [{var}]")]
    MissingBlockDevice {
        /// Environment variable that should carry the device.
        var: &'static str,
    },

    /// The selected runtime has no install script and no override was given.
    #[error("container runtime '{runtime}' has no install source; set [{var}]")]
    MissingInstallSource {
        /// Name of the selected runtime.
        runtime: String,
        /// Environment variable that can supply the source.
        var: &'static str,
    },
}

/// Convenience alias for configuration results.
pub type Result<T> = std::result::Result<T, ConfigError>;
