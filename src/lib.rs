//! Beamline storage provisioning CLI.
//!
//! Creates the shared config, experiments and bluesky scripts directories
//! under a shared root, reserves a placeholder script, and opens the tree to
//! group and other read/write.
//!
//! ## Modules
//! - `cli` — Command-line handlers
//! - `core` — Layout, provisioner, read-only inspection
//! - `models` — Report structures
//! - `util` — Filesystem, path and privilege helpers

pub mod cli;
pub mod constants;
pub mod core;
pub mod logging;
pub mod models;
pub mod util;
