//! Toolchainbot - cross-compilation toolchain builder
//!
//! Builds binutils, a two-pass gcc, kernel headers and glibc from source
//! archives into an installable cross toolchain.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Target profiles, source acquisition and the stage pipeline
//! - [`infra`] - Infrastructure layer (filesystem, processes, downloads)
//! - [`config`] - Compile-time defaults
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
