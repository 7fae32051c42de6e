use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    beamline_provision::logging::init();
    let cli = beamline_provision::cli::Cli::parse();
    cli.run()
}
