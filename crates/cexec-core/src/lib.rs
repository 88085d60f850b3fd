//! # cexec-core
//!
//! Low-level Linux filesystem primitives for the cexec action.
//!
//! This crate provides safe abstractions over:
//! - **Mounts**: creating the action mountpoint, attaching the block device,
//!   and attaching `/dev`, `/proc`, and `/sys` inside it.
//! - **Root changes**: entering the mounted device with `chroot(2)` and
//!   getting back out through a one-shot reversal capability.
//!
//! Every privileged call goes through the [`host::Host`] trait so the
//! sequencing can be exercised without root.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod error;
pub mod filesystem;
pub mod host;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
