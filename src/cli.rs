use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sai")]
#[command(author = "sai contributors")]
#[command(version)]
#[command(about = "Resolve software actions into provider commands", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Saidata repository root
    #[arg(long, env = "SAI_SAIDATA_DIR", global = true)]
    pub saidata_dir: Option<PathBuf>,

    /// Directory of provider documents
    #[arg(long, env = "SAI_PROVIDER_DIR", global = true)]
    pub provider_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Install software
    Install(ActionArgs),

    /// Remove software
    Uninstall(ActionArgs),

    /// Upgrade software to the latest version
    Upgrade(ActionArgs),

    /// Start the software's service
    Start(ActionArgs),

    /// Stop the software's service
    Stop(ActionArgs),

    /// Restart the software's service
    Restart(ActionArgs),

    /// Enable the service at boot
    Enable(ActionArgs),

    /// Disable the service at boot
    Disable(ActionArgs),

    /// Show service status
    Status(ActionArgs),

    /// Show package information
    Info(ActionArgs),

    /// Show installed version
    Version(ActionArgs),

    /// Show service logs
    Logs(ActionArgs),

    /// Show configuration files
    Config(ActionArgs),

    /// Check whether the software is installed
    Check(ActionArgs),

    /// Print merged saidata for the current platform
    Saidata {
        /// Software name
        software: String,

        /// Print JSON instead of YAML
        #[arg(long)]
        json: bool,
    },

    /// Check declared resources against the system
    Validate {
        /// Software name
        software: String,

        /// Action the resources are needed for
        #[arg(short, long, default_value = "install")]
        action: String,

        /// Also check a single resource, e.g. `port:6379` or `file:/etc/hosts`
        #[arg(short, long, value_name = "KIND:NAME")]
        resource: Vec<String>,
    },

    /// Print saidata generated from platform conventions
    Defaults {
        /// Software name
        software: String,
    },

    /// Search the saidata repository
    Search {
        /// Case-insensitive text matched against names and descriptions
        query: String,
    },

    /// List software in the saidata repository
    List,

    /// List providers available on this platform
    Providers,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct ActionArgs {
    /// Software name
    pub software: String,

    /// Use this provider instead of choosing one
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Print the resolution as JSON
    #[arg(long)]
    pub json: bool,
}

impl Command {
    /// Action name and arguments for software action subcommands
    pub fn action(&self) -> Option<(&'static str, &ActionArgs)> {
        let pair = match self {
            Self::Install(args) => ("install", args),
            Self::Uninstall(args) => ("uninstall", args),
            Self::Upgrade(args) => ("upgrade", args),
            Self::Start(args) => ("start", args),
            Self::Stop(args) => ("stop", args),
            Self::Restart(args) => ("restart", args),
            Self::Enable(args) => ("enable", args),
            Self::Disable(args) => ("disable", args),
            Self::Status(args) => ("status", args),
            Self::Info(args) => ("info", args),
            Self::Version(args) => ("version", args),
            Self::Logs(args) => ("logs", args),
            Self::Config(args) => ("config", args),
            Self::Check(args) => ("check", args),
            _ => return None,
        };
        Some(pair)
    }
}
