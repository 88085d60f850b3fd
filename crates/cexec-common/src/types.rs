//! Domain primitive types used across the cexec workspace.

use std::fmt;

/// Path or identifier of the block device the action mounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockDevice(String);

impl BlockDevice {
    /// Creates a block device identifier, rejecting blank input.
    #[must_use]
    pub fn new(device: impl Into<String>) -> Option<Self> {
        let device = device.into();
        if device.trim().is_empty() {
            None
        } else {
            Some(Self(device))
        }
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_device_rejects_empty_identifier() {
        assert!(BlockDevice::new("").is_none());
        assert!(BlockDevice::new("   ").is_none());
    }

    #[test]
    fn block_device_keeps_identifier_verbatim() {
        let device = BlockDevice::new("/dev/sdb1").unwrap();
        assert_eq!(device.as_str(), "/dev/sdb1");
        assert_eq!(device.to_string(), "/dev/sdb1");
    }
}
