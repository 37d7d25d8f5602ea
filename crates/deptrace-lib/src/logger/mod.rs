use crate::primitives::*;
use indicatif::ProgressStyle;
use std::sync::OnceLock;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Global logger instance - ensures single initialization
static GLOBAL_LOGGER: OnceLock<Logger> = OnceLock::new();

/// Spinner shown for each in-flight dependency fetch span
const FETCH_SPINNER_TEMPLATE: &str = "{spinner:.cyan} {span_name} {span_fields}";

/// Logger implementation using tracing with indicatif span spinners
#[derive(Debug)]
pub struct Logger {
    level: LogLevel,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(config: LoggerConfig) -> Result<&'static Self, LoggerError> {
        if GLOBAL_LOGGER.get().is_some() {
            return Err(LoggerError::AlreadyInitialized);
        }

        let style = ProgressStyle::with_template(FETCH_SPINNER_TEMPLATE).map_err(|e| {
            LoggerError::ProgressStyle {
                reason: e.to_string(),
            }
        })?;
        let indicatif_layer = IndicatifLayer::new().with_progress_style(style);

        // RUST_LOG wins; otherwise deptrace at the configured level, HTTP stack at warn
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(Self::default_directives(config.level)));

        let fmt_layer = match (config.output, config.format) {
            (LogOutput::Stderr, LogFormat::Text) => fmt::layer()
                .with_writer(indicatif_layer.get_stderr_writer())
                .with_ansi(config.ansi)
                .compact()
                .boxed(),
            (LogOutput::Stderr, LogFormat::Json) => fmt::layer()
                .with_writer(indicatif_layer.get_stderr_writer())
                .with_ansi(false)
                .json()
                .boxed(),
            (LogOutput::Stderr, LogFormat::Yaml) => fmt::layer()
                .with_writer(indicatif_layer.get_stderr_writer())
                .with_ansi(config.ansi)
                .pretty()
                .boxed(),
            (LogOutput::Stdout, LogFormat::Text) => fmt::layer()
                .with_writer(indicatif_layer.get_stdout_writer())
                .with_ansi(config.ansi)
                .compact()
                .boxed(),
            (LogOutput::Stdout, LogFormat::Json) => fmt::layer()
                .with_writer(indicatif_layer.get_stdout_writer())
                .with_ansi(false)
                .json()
                .boxed(),
            (LogOutput::Stdout, LogFormat::Yaml) => fmt::layer()
                .with_writer(indicatif_layer.get_stdout_writer())
                .with_ansi(config.ansi)
                .pretty()
                .boxed(),
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(indicatif_layer)
            .try_init()
            .map_err(|e| LoggerError::InitializationFailed {
                reason: e.to_string(),
            })?;

        let logger = GLOBAL_LOGGER.get_or_init(|| Logger {
            level: config.level,
        });

        tracing::debug!(
            level = ?config.level,
            format = ?config.format,
            output = ?config.output,
            ansi = config.ansi,
            "Logger initialized"
        );

        Ok(logger)
    }

    /// Filter used when RUST_LOG is not set
    pub fn default_directives(level: LogLevel) -> String {
        let level = level.as_directive();
        format!(
            "deptrace={level},deptrace_lib={level},hyper_util=warn,reqwest=warn,h2=warn,tokio=warn,mio=warn,want=warn,{level}"
        )
    }

    /// Get reference to the global logger instance
    pub fn global() -> Option<&'static Self> {
        GLOBAL_LOGGER.get()
    }

    /// Check if logger is initialized
    pub fn is_initialized() -> bool {
        GLOBAL_LOGGER.get().is_some()
    }

    /// Level the logger was initialized with
    pub fn level(&self) -> LogLevel {
        self.level
    }
}

/// Span wrapping one dependency fetch; rendered as a spinner while open
#[macro_export]
macro_rules! fetch_span {
    ($key:expr) => {
        tracing::info_span!("fetch", package = %$key)
    };
    ($key:expr, depth = $depth:expr) => {
        tracing::info_span!("fetch", package = %$key, depth = $depth)
    };
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
