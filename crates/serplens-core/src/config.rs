use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values fail to parse.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values fail to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup
/// function. Decoupled from the real environment so tests can drive it
/// with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("SERPLENS_ENV", "development"));

    let bind_addr = parse_addr("SERPLENS_BIND_ADDR", "0.0.0.0:3007")?;
    let log_level = or_default("SERPLENS_LOG_LEVEL", "info");
    let profiles_path = PathBuf::from(or_default(
        "SERPLENS_PROFILES_PATH",
        "./config/profiles.yaml",
    ));
    let archive_path = PathBuf::from(or_default("SERPLENS_ARCHIVE_PATH", "./data/archive.json"));

    // Provider credentials are optional at startup; a missing key only
    // fails the request that needs that provider.
    let gemini_api_key = lookup("GEMINI_API_KEY").ok().filter(|v| !v.is_empty());
    let openai_api_key = lookup("OPENAI_API_KEY").ok().filter(|v| !v.is_empty());

    let gemini_model = or_default("SERPLENS_GEMINI_MODEL", "gemini-2.5-flash");
    let gemini_grounded_model = or_default("SERPLENS_GEMINI_GROUNDED_MODEL", "gemini-1.5-pro");
    let openai_model = or_default("SERPLENS_OPENAI_MODEL", "gpt-4o");
    let openai_chat_model = or_default("SERPLENS_OPENAI_CHAT_MODEL", "gpt-4o-mini");

    let audit_timeout_secs = parse_u64("SERPLENS_AUDIT_TIMEOUT_SECS", "120")?;
    let provider_request_timeout_secs =
        parse_u64("SERPLENS_PROVIDER_REQUEST_TIMEOUT_SECS", "130")?;

    let rate_limit_max_requests = parse_usize("SERPLENS_RATE_LIMIT_MAX_REQUESTS", "20")?;
    let rate_limit_window_secs = parse_u64("SERPLENS_RATE_LIMIT_WINDOW_SECS", "900")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        profiles_path,
        archive_path,
        gemini_api_key,
        openai_api_key,
        gemini_model,
        gemini_grounded_model,
        openai_model,
        openai_chat_model,
        audit_timeout_secs,
        provider_request_timeout_secs,
        rate_limit_max_requests,
        rate_limit_window_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
