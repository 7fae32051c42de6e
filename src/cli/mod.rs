//! CLI routing and command dispatch.

use crate::core::layout::Layout;
use crate::util::privilege::{self, Privilege};
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod apply;
pub mod plan;
pub mod verify;

/// Shared context passed to all command handlers.
pub struct CliContext {
    pub layout: Layout,
    pub privilege: Privilege,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "beamline-provision",
    version,
    about = "Provision beamline config, experiment and script directories"
)]
pub struct Cli {
    /// Shared root to provision under [default: $BEAMLINE_PROVISION_ROOT, then /nsls2/data/srx]
    #[arg(long, global = true, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Defaults to `apply` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let layout = Layout::resolve(self.root)?;
        let ctx = CliContext {
            layout,
            privilege: Privilege::current(),
        };

        let command = self
            .command
            .unwrap_or(Commands::Apply(apply::ApplyArgs::default()));

        // Enforce root for mutating commands
        if command.requires_root() {
            privilege::require(ctx.privilege, command.name())?;
        }

        match command {
            Commands::Apply(args) => apply::run(&ctx, args),
            Commands::Plan(args) => plan::run(&ctx, args),
            Commands::Verify(args) => verify::run(&ctx, args),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the directories and placeholder, then relax permissions (default)
    Apply(apply::ApplyArgs),
    /// Dry-run preview of what apply would change
    Plan(plan::PlanArgs),
    /// Check that the layout is provisioned (read-only)
    Verify(verify::VerifyArgs),
}

impl Commands {
    /// Whether this command requires root privileges.
    pub fn requires_root(&self) -> bool {
        matches!(self, Commands::Apply(_))
    }

    /// Command name for error messages.
    pub fn name(&self) -> &str {
        match self {
            Commands::Apply(_) => "apply",
            Commands::Plan(_) => "plan",
            Commands::Verify(_) => "verify",
        }
    }
}
