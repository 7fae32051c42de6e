//! Utility modules for filesystem, path and privilege handling.

pub mod fs;
pub mod path;
pub mod privilege;
