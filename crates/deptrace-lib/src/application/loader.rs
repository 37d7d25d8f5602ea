//! Configuration loading and global state management
//!
//! Coordinates loading configuration from various sources and provides
//! global application configuration access.

use crate::primitives::ConfigError;
use std::sync::OnceLock;

use super::{config::AppConfig, env::EnvironmentConfig};

// Global configuration available throughout the application
static GLOBAL_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Files read into the process environment before flags are parsed
pub const ENV_FILES: [&str; 2] = [".env.local", ".env"];

/// Load `.env` files; a missing file is not an error
pub fn load_env_files() -> Result<(), ConfigError> {
    for env_file in ENV_FILES {
        if let Err(e) = dotenvy::from_filename(env_file) {
            if !e.not_found() {
                return Err(ConfigError::EnvFileError {
                    file: env_file.to_string(),
                    source: e,
                });
            }
        }
    }
    Ok(())
}

impl AppConfig {
    /// Finish loading: defaults and `DEPTRACE_*` vars already came in
    /// through clap; apply the standard colour variables and validate
    pub fn load(cli: AppConfig) -> Result<Self, ConfigError> {
        let env_config = EnvironmentConfig::load()?;
        Self::resolve(cli, &env_config)
    }

    /// Combine parsed flags with environment colour settings
    pub fn resolve(cli: AppConfig, env: &EnvironmentConfig) -> Result<Self, ConfigError> {
        let mut config = AppConfig::default();
        config.color = env.apply_color_config(config.color);

        // Explicit flags beat environment conventions
        let config = config.merge_with(cli);
        config.validate()?;
        Ok(config)
    }

    /// Initialize global configuration (call once in main)
    pub fn init_global(config: AppConfig) -> Result<(), ConfigError> {
        GLOBAL_CONFIG
            .set(config)
            .map_err(|_| ConfigError::AlreadyInitialized)
    }

    /// Global configuration, if initialised
    pub fn global() -> Option<&'static AppConfig> {
        GLOBAL_CONFIG.get()
    }
}

#[cfg(test)]
mod tests {
    include!("loader.test.rs");
}
