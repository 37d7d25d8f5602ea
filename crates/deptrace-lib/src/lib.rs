//! # deptrace Library
//!
//! Transitive dependency graphs with path-based cycle detection.
//!
//! ## Core Modules
//!
//! - [`primitives`] - Shared types and configuration/logger errors
//! - [`logger`] - Structured logging with per-fetch spinners
//! - [`networking`] - HTTP client with concurrency bounds and 429 retries
//! - [`graph`] - Dependency sources, the traversal engine, and its results
//! - [`application`] - CLI interface, configuration, and reporting
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use deptrace_lib::graph::{MaxDepth, PackageKey, StaticSource, TraversalEngine};
//!
//! # async fn run() -> Result<(), deptrace_lib::graph::TraversalError> {
//! let engine = TraversalEngine::new(Arc::new(StaticSource::demo()));
//! let traversal = engine
//!     .build_graph(PackageKey::new("A", "1.0"), MaxDepth::Unbounded)
//!     .await?;
//! for cycle in traversal.cycles.iter() {
//!     println!("{}", cycle.names());
//! }
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod graph;
pub mod logger;
pub mod networking;
pub mod primitives;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types for convenience
pub use application::{AnalysisConfig, AppConfig, Cli, Commands, execute_command};
pub use graph::{
    Completion, DependencyGraph, DependencySource, MaxDepth, PackageKey, Traversal,
    TraversalEngine, TraversalError,
};
pub use logger::Logger;
pub use networking::{NetworkingConfig, NetworkingManager};
pub use primitives::{ColorIntent, ConfigError, LogFormat, LogLevel, LogOutput, LoggerError};

// Private imports for the main function
use anyhow::Result;
use application::{CliConfig, load_env_files};

pub async fn main() -> Result<()> {
    // .env values must be in the environment before clap reads DEPTRACE_*
    load_env_files()?;
    let cli = CliConfig::load()?;

    let app_config = AppConfig::load(cli.app_config)?;
    Logger::init(app_config.to_logger_config())?;
    AppConfig::init_global(app_config.clone())?;

    execute_command(CliConfig {
        app_config,
        command: cli.command,
    })
    .await
}
