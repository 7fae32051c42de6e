//! Serializable outcomes of apply, plan and verify.

use crate::util::privilege::Privilege;
use serde::Serialize;
use std::path::PathBuf;

/// What a single provisioning step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepReport {
    EnsureDirectories {
        created: Vec<PathBuf>,
        existing: Vec<PathBuf>,
    },
    EnsurePlaceholder {
        path: PathBuf,
        created: bool,
        /// Set when a new placeholder was handed to the invoking user.
        owner_uid: Option<u32>,
    },
    RelaxPermissions {
        root: PathBuf,
        visited: usize,
        changed: usize,
    },
}

impl StepReport {
    /// Whether the step touched the filesystem.
    pub fn changed_anything(&self) -> bool {
        match self {
            StepReport::EnsureDirectories { created, .. } => !created.is_empty(),
            StepReport::EnsurePlaceholder { created, .. } => *created,
            StepReport::RelaxPermissions { changed, .. } => *changed > 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    pub root: PathBuf,
    pub steps: Vec<StepReport>,
}

impl ProvisionReport {
    pub fn changed_anything(&self) -> bool {
        self.steps.iter().any(StepReport::changed_anything)
    }
}

/// Dry-run preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanReport {
    pub root: PathBuf,
    pub privilege: Privilege,
    pub can_apply: bool,
    pub directories_to_create: Vec<PathBuf>,
    pub placeholder_to_create: Option<PathBuf>,
    /// Entries that exist now and lack the mask. Paths created by apply are not counted.
    pub entries_to_relax: usize,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Pass,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    pub status: CheckStatus,
    pub message: String,
}

impl Check {
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Pass,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Fail,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub root: PathBuf,
    pub checks: Vec<Check>,
}

impl VerifyReport {
    pub fn passed(&self) -> usize {
        self.count(CheckStatus::Pass)
    }

    pub fn failed(&self) -> usize {
        self.count(CheckStatus::Fail)
    }

    fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }
}
