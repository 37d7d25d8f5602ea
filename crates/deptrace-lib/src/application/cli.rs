use crate::graph::MaxDepth;
use crate::primitives::ConfigError;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use super::config::AppConfig;

/// deptrace CLI - transitive dependency graphs and cycle detection
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "deptrace")]
#[command(about = "Trace a package's transitive dependencies and report cycles")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Global configuration options
    #[command(flatten)]
    pub config: AppConfig,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Configuration loaded from CLI
pub struct CliConfig {
    pub app_config: AppConfig,
    pub command: Option<Commands>,
}

impl CliConfig {
    /// Load configuration from command line arguments
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::from(Cli::parse()))
    }
}

impl From<Cli> for CliConfig {
    fn from(cli: Cli) -> Self {
        Self {
            app_config: cli.config,
            command: cli.command,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Build the dependency graph for a package and report cycles
    Analyze(AnalyzeArgs),

    /// Show version information
    Version,
}

/// Where the analysis parameters come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum InputMode {
    /// Read a TOML configuration file
    #[default]
    Config,
    /// Ask for each parameter on the terminal
    Interactive,
}

#[derive(Debug, Clone, Args)]
pub struct AnalyzeArgs {
    /// How to obtain the analysis parameters
    #[arg(long, value_enum, default_value_t = InputMode::Config)]
    pub mode: InputMode,

    /// Analysis configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Write the flat dependency listing to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override the depth bound (a number or "unbounded")
    #[arg(long, value_name = "N|unbounded")]
    pub max_depth: Option<MaxDepth>,

    /// Print the full result as JSON instead of the tree
    #[arg(long)]
    pub json: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            mode: InputMode::Config,
            config: PathBuf::from("config.toml"),
            output: None,
            max_depth: None,
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    include!("cli.test.rs");
}
