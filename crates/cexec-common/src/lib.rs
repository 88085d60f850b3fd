//! # cexec-common
//!
//! Shared types, error definitions, configuration models, and constants
//! used across the cexec workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and holds the validated inputs every later stage reads.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
