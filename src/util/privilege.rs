//! Privilege checks for root enforcement.

use anyhow::{bail, Result};
use nix::unistd::{Gid, Uid};
use serde::Serialize;
use std::env;

/// Effective privilege of the running process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Privilege {
    Elevated,
    Unprivileged,
}

impl Privilege {
    /// Privilege of the current process, from its effective uid.
    pub fn current() -> Self {
        if is_root() {
            Privilege::Elevated
        } else {
            Privilege::Unprivileged
        }
    }

    pub fn is_elevated(self) -> bool {
        self == Privilege::Elevated
    }
}

/// Check if the current process is running as root (euid 0).
pub fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

/// The account that ran the process through sudo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvokingUser {
    pub uid: Uid,
    pub gid: Gid,
}

/// Read `SUDO_UID`/`SUDO_GID`. `None` unless both are present and numeric.
pub fn invoking_user() -> Option<InvokingUser> {
    parse_invoking_user(
        env::var("SUDO_UID").ok().as_deref(),
        env::var("SUDO_GID").ok().as_deref(),
    )
}

pub fn parse_invoking_user(uid: Option<&str>, gid: Option<&str>) -> Option<InvokingUser> {
    let uid = uid?.trim().parse::<u32>().ok()?;
    let gid = gid?.trim().parse::<u32>().ok()?;
    Some(InvokingUser {
        uid: Uid::from_raw(uid),
        gid: Gid::from_raw(gid),
    })
}

/// Require root for a given action, or bail with an error.
pub fn require(privilege: Privilege, action: &str) -> Result<()> {
    if !privilege.is_elevated() {
        bail!("'{}' requires root privileges. Run with sudo.", action);
    }
    Ok(())
}
