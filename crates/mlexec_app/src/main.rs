mod cli;
mod config;
mod platform;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use cli::{Cli, Command};
use config::AppConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::resolve(&cli)?;

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    engine_logging::initialize(config.log.into(), level, &config.log_file);

    match cli.command {
        Command::Run {
            algorithm,
            file,
            json,
        } => platform::run_once(&config, algorithm, file, json),
        Command::Shell => platform::run_shell(&config),
        Command::Algorithms => {
            println!("{}", platform::ui::render::render_algorithms());
            Ok(())
        }
    }
}
