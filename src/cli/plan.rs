//! Dry-run preview of the provisioning steps.

use crate::cli::{CliContext, OutputFormat};
use crate::core::inspect;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug, Default)]
pub struct PlanArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run(ctx: &CliContext, args: PlanArgs) -> Result<()> {
    let plan = inspect::plan(&ctx.layout, ctx.privilege);

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("Plan: provision {}", plan.root.display());
    if plan.directories_to_create.is_empty() {
        println!("  directories: all present");
    } else {
        for dir in &plan.directories_to_create {
            println!("  create directory: {}", dir.display());
        }
    }
    match &plan.placeholder_to_create {
        Some(path) => println!("  create placeholder: {}", path.display()),
        None => println!("  placeholder: present (left untouched)"),
    }
    println!("  existing entries missing g+rw,o+rw: {}", plan.entries_to_relax);
    println!("  privilege: {:?}", plan.privilege);
    if plan.issues.is_empty() {
        println!("  issues: none");
    } else {
        for issue in &plan.issues {
            println!("  [WARN] {}", issue);
        }
    }
    println!();
    println!(
        "Plan summary: {}",
        if plan.can_apply { "ready to apply" } else { "apply would fail" }
    );
    Ok(())
}
