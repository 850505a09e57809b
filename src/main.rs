use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = access_key_rotate::cli::Cli::parse();
    access_key_rotate::util::logging::init(cli.verbose)?;
    cli.run().await
}
