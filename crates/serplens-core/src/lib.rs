mod app_config;
mod config;
mod profiles;
mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use profiles::{load_profiles, BrandProfile, ContactPoint, ProfilesFile};
pub use types::{
    AiRecommendation, AuditResult, ChatMessage, ChatRole, Extraction, Generation, GroundingSource,
    ModelProvider, PageType, SeoVariant, StrategicImpact, ValidationSummary,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read profiles file at {path}: {source}")]
    ProfilesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse profiles file: {0}")]
    ProfilesFileParse(#[from] serde_yaml::Error),

    #[error("profile validation failed: {0}")]
    Validation(String),
}
