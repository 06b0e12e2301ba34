//! Ferry CLI - versioned, reversible SQL schema migrations

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod context;

use cli::{Cli, Commands};
use commands::common::ExitCode;
use commands::{down, reset, up, version};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    if let Err(err) = run(&cli).await {
        if let Some(ExitCode(code)) = err.downcast_ref::<ExitCode>() {
            std::process::exit(*code);
        }
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Up => up::execute(&cli.global).await,
        Commands::Down => down::execute(&cli.global).await,
        Commands::Reset => reset::execute(&cli.global).await,
        Commands::Version(args) => version::execute(args, &cli.global).await,
    }
}

/// `info` by default, `debug` with `--verbose`; `RUST_LOG` overrides both
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_target(false)
        .init();
}
