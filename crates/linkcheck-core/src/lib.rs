pub mod app_config;
pub mod classify;
pub mod config;
pub mod normalize;
pub mod profile;

use thiserror::Error;

pub use app_config::{AppConfig, LlmProvider};
pub use classify::classify;
pub use config::{load_app_config, load_app_config_from_env};
pub use normalize::normalize_profile_url;
pub use profile::{ClassificationResult, ConnectionStatus, PageSignals, Profile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
