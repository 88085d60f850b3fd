//! Action orchestration for cexec.
//!
//! Ties the mount and root-change primitives from `cexec-core` to the
//! container runtime installer, in the order the action requires.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod engine;
pub mod error;
pub mod fetch;
pub mod install;
pub mod runtime;
pub mod shell;
