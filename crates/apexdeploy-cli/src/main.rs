use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli_args;
mod cli_command;
mod modules;

use crate::cli_args::Cli;
use crate::cli_command::handle_command;
use crate::modules::config::RunConfig;
use crate::modules::validate::validate_cli;

const USAGE_EXAMPLES: &str = "\
Examples:
  apexdeploy deploy https://apex.example.com/ords/ws/ ocid1.vaultsecret.oc1.phx.<id> app.sql -e
  apexdeploy deploy https://apex.example.com/ords/ws/ ocid1.vaultsecret.oc1.phx.<id> -i
  apexdeploy export https://apex.example.com/ords/ws/ ocid1.vaultsecret.oc1.phx.<id> -i

  -e  read the API key identity from pem, tenancyOCID, userOCID, fingerprint, region
  -i  use the instance principal of this host";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return usage_error(&err),
    };
    if let Err(err) = init_logging(cli.verbose) {
        eprintln!("error: {err:#}");
        return ExitCode::FAILURE;
    }
    if let Err(err) = validate_cli(&cli) {
        eprintln!("error: {err:#}");
        eprintln!();
        eprintln!("{USAGE_EXAMPLES}");
        return ExitCode::FAILURE;
    }

    let result = match RunConfig::from_cli(cli) {
        Ok(config) => handle_command(config).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn usage_error(err: &clap::Error) -> ExitCode {
    let _ = err.print();
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
        _ => {
            eprintln!();
            eprintln!("{USAGE_EXAMPLES}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(filter)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests;
