use std::process::ExitCode;

use clap::Parser;
use pmd::adapter::inbound::cli::command::{Cli, Commands};
use pmd::adapter::inbound::cli::output::{self, OutputConfig};
use pmd::adapter::inbound::cli::{check, once, run, settings, theme};
use pmd::application::pipeline::report::PassStatus;
use pmd::infrastructure::config::settings::Config;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet), cli.color);

    match dispatch(cli).await {
        Ok(code) => code,
        Err(err) => {
            output::error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Theme(args) => {
            theme::execute(&args);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check => {
            check::execute(&cli.config)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Settings(args) => {
            let config = Config::load(&cli.config)?;
            settings::execute(&config, &args)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Once => {
            let config = Config::load(&cli.config)?;
            config.logging.init();
            let report = once::execute(config).await?;
            Ok(match report.status {
                PassStatus::Failed => ExitCode::FAILURE,
                _ => ExitCode::SUCCESS,
            })
        }
        Commands::Run(args) => {
            let config = Config::load(&cli.config)?;
            config.logging.init();
            run::execute(config, &args).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
