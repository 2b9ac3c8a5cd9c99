//! Infrastructure layer
//!
//! Handles I/O operations: filesystem, external processes and archive
//! retrieval. Build logic in [`crate::core`] reaches the outside world
//! through these modules.

pub mod download;
pub mod filesystem;
pub mod process;
