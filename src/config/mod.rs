#[cfg(feature = "cli")]
pub mod cli;
pub mod policy;
pub mod seed;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "small-library")]
#[command(about = "A small library catalog manager with a text menu and a terminal UI")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Which front end to start
    #[arg(long, value_enum, default_value_t = cli::Frontend::Text)]
    pub frontend: cli::Frontend,

    /// Extra catalog to load (CSV: title,author,isbn,genre,copies)
    #[arg(long)]
    pub catalog: Option<String>,

    /// Start with an empty shelf instead of the default classics
    #[arg(long)]
    pub no_seed: bool,

    /// Write logs to this file
    #[arg(long)]
    pub log_file: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}
