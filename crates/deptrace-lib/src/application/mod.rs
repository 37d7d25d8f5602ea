//! Application layer modules
//!
//! CLI interface, global and per-analysis configuration, interactive
//! prompts, result reporting, and command dispatch.

pub mod analysis;
pub mod cli;
pub mod commands;
pub mod config;
pub mod env;
pub mod loader;
pub mod prompt;
pub mod report;

// Re-export main types for convenience
pub use analysis::AnalysisConfig;
pub use cli::{AnalyzeArgs, Cli, CliConfig, Commands, InputMode};
pub use commands::{emit_report, execute_command, run_analysis};
pub use config::AppConfig;
pub use loader::*;
pub use prompt::{Prompter, TerminalPrompter};
pub use report::{Reporter, render_flat, render_json, write_flat};
