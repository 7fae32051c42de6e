use crate::cli::{CliContext, OutputFormat};
use crate::core::provision::Provisioner;
use crate::models::report::{ProvisionReport, StepReport};
use crate::util::privilege;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug, Default)]
pub struct ApplyArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run(ctx: &CliContext, args: ApplyArgs) -> Result<()> {
    let report = Provisioner::new(&ctx.layout, ctx.privilege)
        .with_placeholder_owner(privilege::invoking_user())
        .run()?;
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_text(&report),
    }
    Ok(())
}

fn print_text(report: &ProvisionReport) {
    for step in &report.steps {
        match step {
            StepReport::EnsureDirectories { created, existing } => {
                for dir in created {
                    println!("created directory {}", dir.display());
                }
                for dir in existing {
                    println!("directory exists {}", dir.display());
                }
            }
            StepReport::EnsurePlaceholder {
                path,
                created,
                owner_uid,
            } => {
                let verb = if *created { "created" } else { "kept" };
                match owner_uid {
                    Some(uid) => println!("{} placeholder {} (uid {})", verb, path.display(), uid),
                    None => println!("{} placeholder {}", verb, path.display()),
                }
            }
            StepReport::RelaxPermissions {
                root,
                visited,
                changed,
            } => {
                println!(
                    "g+rw,o+rw under {}: {} of {} entries changed",
                    root.display(),
                    changed,
                    visited
                );
            }
        }
    }
    println!("provisioned {}", report.root.display());
}
