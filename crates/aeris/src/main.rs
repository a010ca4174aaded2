mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use aeris_core::PollerConfig;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands never talk to the network
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "aeris", &mut std::io::stdout());
            Ok(())
        }

        Command::Fetch(args) => {
            let config = build_poller_config(&cli.global)?;
            commands::fetch::handle(args, config, &cli.global).await
        }

        Command::Watch(args) => {
            let config = build_poller_config(&cli.global)?;
            commands::watch::handle(args, config, &cli.global).await
        }
    }
}

/// Merge the config file, env overrides, and CLI flags into a
/// `PollerConfig`. CLI flags win.
fn build_poller_config(global: &GlobalOpts) -> Result<PollerConfig, CliError> {
    let mut cfg = aeris_config::load()?;

    if let Some(ref key) = global.api_key {
        cfg.api_key = Some(key.clone());
    }
    if let Some(lat) = global.latitude {
        cfg.latitude = Some(lat);
    }
    if let Some(lon) = global.longitude {
        cfg.longitude = Some(lon);
    }
    if let Some(ref lang) = global.language {
        cfg.language = lang.clone();
    }
    if let Some(interval) = global.interval {
        cfg.scan_interval_minutes = interval;
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout_secs = timeout;
    }

    Ok(aeris_config::resolve(&cfg)?)
}
