//! Core build logic
//!
//! # Submodules
//!
//! - [`version`] - Dotted component versions and minimum-version checks
//! - [`profile`] - Built-in target catalog and resolution
//! - [`options`] - Flags shared by all build stages
//! - [`settings`] - Config file loading and the build configuration
//! - [`source`] - Archive lookup, extraction and the glibc ports merge
//! - [`stage`] - Components, stages and the skip list
//! - [`pipeline`] - The five-stage build
//! - [`lib_path`] - Library path normalization for sysroot builds

pub mod lib_path;
pub mod options;
pub mod pipeline;
pub mod profile;
pub mod settings;
pub mod source;
pub mod stage;
pub mod version;
