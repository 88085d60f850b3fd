//! Filesystem management for the action.
//!
//! Provides the mountpoint and pseudo-filesystem setup plus the reversible
//! `chroot` into the mounted device.

pub mod chroot;
pub mod mount;
