//! Command execution handlers

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use super::analysis::AnalysisConfig;
use super::cli::{AnalyzeArgs, CliConfig, Commands, InputMode};
use super::config::AppConfig;
use super::prompt::TerminalPrompter;
use super::report::{Reporter, render_json, write_flat};
use crate::graph::{Traversal, TraversalEngine};

/// Execute a parsed command line
pub async fn execute_command(config: CliConfig) -> Result<()> {
    let command = match config.command {
        Some(cmd) => cmd,
        None => {
            println!("deptrace - transitive dependency analysis");
            println!("Run 'deptrace --help' for usage information");
            return Ok(());
        }
    };

    match command {
        Commands::Version => handle_version(),
        Commands::Analyze(args) => handle_analyze(&config.app_config, args).await,
    }
}

fn handle_version() -> Result<()> {
    println!("deptrace {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}

async fn handle_analyze(app: &AppConfig, args: AnalyzeArgs) -> Result<()> {
    let analysis = match args.mode {
        InputMode::Config => AnalysisConfig::load(&args.config).with_context(|| {
            format!(
                "Could not load analysis configuration from {}",
                args.config.display()
            )
        })?,
        InputMode::Interactive => {
            AnalysisConfig::from_prompts(&TerminalPrompter::new(app.report_color()))
                .context("Could not collect analysis parameters")?
        }
    }
    .with_overrides(&args);

    // Ctrl-C stops the walk; whatever was gathered is still reported
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing with partial results");
            let _ = cancel_tx.send(true);
        }
    });

    let result = run_analysis(app, &analysis, Some(cancel_rx)).await;
    interrupt.abort();
    let traversal = result?;

    emit_report(app, &analysis, &traversal, args.json)
}

/// Build the source and run the traversal described by `analysis`
pub async fn run_analysis(
    app: &AppConfig,
    analysis: &AnalysisConfig,
    cancel: Option<watch::Receiver<bool>>,
) -> Result<Traversal> {
    info!(
        "Building dependency graph for {} {} (max depth {}, test repository: {})",
        analysis.package_name,
        analysis.package_version,
        analysis.max_depth,
        analysis.use_test_repository
    );

    let source = Arc::new(analysis.build_source(app)?);
    let options = analysis.traversal_options(app, cancel);
    TraversalEngine::new(source)
        .with_options(options)
        .build_graph(analysis.root_key(), analysis.max_depth)
        .await
        .context("Invalid traversal parameters")
}

/// Print the result and write the flat listing if an output path is set
pub fn emit_report(
    app: &AppConfig,
    analysis: &AnalysisConfig,
    traversal: &Traversal,
    json: bool,
) -> Result<()> {
    if json {
        println!("{}", render_json(traversal)?);
    } else {
        print!("{}", Reporter::new(app.report_color()).render_tree(traversal));
    }

    if let Some(path) = &analysis.output {
        write_flat(traversal, path)?;
        info!("Dependency graph written to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    include!("commands.test.rs");
}
