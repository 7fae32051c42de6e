//! Post-provisioning verification.

use crate::cli::{CliContext, OutputFormat};
use crate::core::inspect;
use crate::models::report::CheckStatus;
use anyhow::{bail, Result};
use clap::Args;

#[derive(Args, Debug, Default)]
pub struct VerifyArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run(ctx: &CliContext, args: VerifyArgs) -> Result<()> {
    let report = inspect::verify(&ctx.layout);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            println!("Verify: {}", ctx.layout);
            for check in &report.checks {
                let tag = match check.status {
                    CheckStatus::Pass => "PASS",
                    CheckStatus::Fail => "FAIL",
                };
                println!("  [{}] {}", tag, check.message);
            }
            println!();
            println!(
                "Verify summary: {} passed, {} failed",
                report.passed(),
                report.failed()
            );
        }
    }

    if report.failed() > 0 {
        bail!("{} verification check(s) failed", report.failed());
    }
    Ok(())
}
