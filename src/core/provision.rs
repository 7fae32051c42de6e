//! The provisioner: ensure directories, ensure the placeholder, relax permissions.
//!
//! Steps run strictly in order and the first failure aborts the rest. Nothing
//! already done is rolled back.

use crate::constants;
use crate::core::layout::Layout;
use crate::models::report::{ProvisionReport, StepReport};
use crate::util::fs as prov_fs;
use crate::util::privilege::{self, InvokingUser, Privilege};
use anyhow::{Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    EnsureDirectories,
    EnsurePlaceholder,
    RelaxPermissions,
}

impl Step {
    /// Execution order.
    pub const ALL: [Step; 3] = [
        Step::EnsureDirectories,
        Step::EnsurePlaceholder,
        Step::RelaxPermissions,
    ];

    /// Directory creation and the permission change run elevated. The
    /// placeholder belongs to the invoking user when one is known.
    pub fn requires_elevation(self) -> bool {
        match self {
            Step::EnsureDirectories | Step::RelaxPermissions => true,
            Step::EnsurePlaceholder => false,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Step::EnsureDirectories => "ensure directories",
            Step::EnsurePlaceholder => "ensure placeholder",
            Step::RelaxPermissions => "relax permissions",
        }
    }
}

pub struct Provisioner<'a> {
    layout: &'a Layout,
    privilege: Privilege,
    placeholder_owner: Option<InvokingUser>,
}

impl<'a> Provisioner<'a> {
    pub fn new(layout: &'a Layout, privilege: Privilege) -> Self {
        Self {
            layout,
            privilege,
            placeholder_owner: None,
        }
    }

    /// Give a newly created placeholder to `owner` instead of the process user.
    pub fn with_placeholder_owner(mut self, owner: Option<InvokingUser>) -> Self {
        self.placeholder_owner = owner;
        self
    }

    /// Refuse to start if any step needs rights the process lacks.
    pub fn preflight(&self) -> Result<()> {
        for step in Step::ALL {
            if step.requires_elevation() {
                privilege::require(self.privilege, step.name())?;
            }
        }
        Ok(())
    }

    pub fn run(&self) -> Result<ProvisionReport> {
        self.preflight()?;
        tracing::info!(root = %self.layout.root.display(), "provisioning");

        let mut steps = Vec::with_capacity(Step::ALL.len());
        for step in Step::ALL {
            let report = self
                .run_step(step)
                .with_context(|| format!("step '{}' failed", step.name()))?;
            tracing::info!(step = step.name(), changed = report.changed_anything(), "step done");
            steps.push(report);
        }

        Ok(ProvisionReport {
            root: self.layout.root.clone(),
            steps,
        })
    }

    fn run_step(&self, step: Step) -> Result<StepReport> {
        match step {
            Step::EnsureDirectories => self.ensure_directories(),
            Step::EnsurePlaceholder => self.ensure_placeholder(),
            Step::RelaxPermissions => self.relax_permissions(),
        }
    }

    fn ensure_directories(&self) -> Result<StepReport> {
        let mut created = Vec::new();
        let mut existing = Vec::new();
        for dir in self.layout.directories() {
            if prov_fs::ensure_dir(dir)? {
                created.push(dir.to_path_buf());
            } else {
                existing.push(dir.to_path_buf());
            }
        }
        Ok(StepReport::EnsureDirectories { created, existing })
    }

    fn ensure_placeholder(&self) -> Result<StepReport> {
        let path = &self.layout.placeholder;
        let created = prov_fs::ensure_file(path)?;
        let owner_uid = match self.placeholder_owner {
            Some(owner) if created && !Step::EnsurePlaceholder.requires_elevation() => {
                prov_fs::chown(path, owner.uid, owner.gid)?;
                Some(owner.uid.as_raw())
            }
            _ => None,
        };
        Ok(StepReport::EnsurePlaceholder {
            path: path.clone(),
            created,
            owner_uid,
        })
    }

    fn relax_permissions(&self) -> Result<StepReport> {
        let summary = prov_fs::relax_tree(&self.layout.root, constants::RELAX_MODE_BITS)?;
        Ok(StepReport::RelaxPermissions {
            root: self.layout.root.clone(),
            visited: summary.visited,
            changed: summary.changed,
        })
    }
}
