//! Covenant CLI - Command-line interface for contract conflict analysis.

use clap::Parser;
use covenant_cli::cli::{ConfigAction, ConfigArgs};
use covenant_cli::commands;
use covenant_cli::{init_tracing, Cli, Command, Config, Formatter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> covenant_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // A broken file must not block writing a fresh one
    let config = match &cli.command {
        Command::Config(ConfigArgs {
            action: ConfigAction::Init { .. },
        }) => Config::default(),
        _ => Config::load(cli.config.as_deref())?,
    };

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    // Handle commands
    match cli.command {
        Command::Scan(args) => commands::execute_scan(args, &config, &formatter)?,
        Command::Candidates(args) => commands::execute_candidates(args, &config, &formatter)?,
        Command::Analyze(args) => commands::execute_analyze(args, &config, &formatter).await?,
        Command::Runs(args) => commands::execute_runs(args, &config, &formatter)?,
        Command::Config(args) => {
            commands::execute_config(args, cli.config.as_deref(), &config, &formatter)?
        }
    }

    Ok(())
}
