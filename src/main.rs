mod cli;
mod commands;
mod config;
mod engine;
mod paths;
mod ui;

use anyhow::{Context as _, Result};
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::Config;
use engine::{Engine, Settings};
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub config: Config,
    pub saidata_dir: Option<PathBuf>,
    pub provider_dir: Option<PathBuf>,
}

impl Context {
    /// Build a resolution engine for the running platform
    pub fn engine(&self) -> Result<Engine> {
        let settings = Settings {
            saidata_dir: self.config.saidata_root(self.saidata_dir.as_deref())?,
            provider_dir: self.config.provider_root(self.provider_dir.as_deref())?,
            port_timeout: self.config.port_timeout(),
            default_provider: self.config.default_provider.clone(),
            policies: self.config.policies.clone(),
        };
        log::debug!(
            "Saidata: {}, providers: {}",
            settings.saidata_dir.display(),
            settings.provider_dir.display()
        );
        let platform = sysprobe::platform::detect().context("Unsupported platform")?;
        Engine::new(settings, platform)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    if let Command::Completions { shell } = cli.command {
        generate(shell, &mut Cli::command(), "sai", &mut io::stdout());
        return Ok(());
    }

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config: Config::load()?,
        saidata_dir: cli.saidata_dir,
        provider_dir: cli.provider_dir,
    };

    if let Some((action, args)) = cli.command.action() {
        return commands::action::run(&ctx, action, args);
    }

    match cli.command {
        Command::Saidata { software, json } => commands::saidata::show(&ctx, &software, json),
        Command::Validate {
            software,
            action,
            resource,
        } => commands::saidata::validate(&ctx, &software, &action, &resource),
        Command::Defaults { software } => commands::saidata::defaults(&ctx, &software),
        Command::Search { query } => commands::search::search(&ctx, &query),
        Command::List => commands::search::list(&ctx),
        Command::Providers => commands::providers::run(&ctx),
        _ => Ok(()),
    }
}
