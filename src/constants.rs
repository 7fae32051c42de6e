//! Centralized constants for the provisioned layout and permission mask.

/// Default shared root under which everything is provisioned.
pub const DEFAULT_SHARED_ROOT: &str = "/nsls2/data/srx";

/// Environment variable overriding the shared root.
pub const ROOT_ENV_VAR: &str = "BEAMLINE_PROVISION_ROOT";

/// Shared configuration directory, relative to the root.
pub const CONFIG_DIR: &str = "shared/config";

/// Experiments directory, relative to the root.
pub const EXPERIMENTS_DIR: &str = "experiments";

/// Shared bluesky scripts directory, relative to the root.
pub const SCRIPTS_DIR: &str = "shared/src/bluesky_scripts";

/// Placeholder file reserved inside the scripts directory.
pub const PLACEHOLDER_FILE: &str = "simple_batch.py";

/// Bits added on every entry under the root: g+rw,o+rw.
pub const RELAX_MODE_BITS: u32 = 0o066;

/// Mask of the permission bits we read and write back (includes setuid/setgid/sticky).
pub const MODE_MASK: u32 = 0o7777;
