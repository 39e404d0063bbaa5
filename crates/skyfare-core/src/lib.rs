pub mod app_config;
pub mod config;
pub mod trip;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use trip::{SearchParams, TripQuery, DEFAULT_DESTINATION, DEFAULT_ORIGIN, DEFAULT_STAY_DAYS};

/// Errors raised while loading application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
