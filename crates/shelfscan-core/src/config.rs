use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function,
/// so parsing can be tested against a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let value = parse_u64(var, default)?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("SHELFSCAN_ENV", "development"));
    let log_level = or_default("SHELFSCAN_LOG_LEVEL", "info");
    let sources_path = optional("SHELFSCAN_SOURCES_PATH").map(PathBuf::from);

    let job_timeout_secs = parse_positive_u64("SHELFSCAN_JOB_TIMEOUT_SECS", "30")?;
    let navigation_timeout_secs = parse_positive_u64("SHELFSCAN_NAVIGATION_TIMEOUT_SECS", "15")?;
    let fetch_max_retries = parse_u32("SHELFSCAN_FETCH_MAX_RETRIES", "3")?;
    let fetch_backoff_base_ms = parse_u64("SHELFSCAN_FETCH_BACKOFF_BASE_MS", "500")?;
    let user_agent = or_default("SHELFSCAN_USER_AGENT", DEFAULT_USER_AGENT);

    let fallback_seed = optional("SHELFSCAN_FALLBACK_SEED")
        .map(|raw| {
            raw.parse::<u64>()
                .map_err(|e| invalid("SHELFSCAN_FALLBACK_SEED", e.to_string()))
        })
        .transpose()?;

    let llm_url = optional("SHELFSCAN_LLM_URL").map(|url| url.trim_end_matches('/').to_string());
    let llm_api_key = optional("SHELFSCAN_LLM_API_KEY");
    let llm_model = or_default("SHELFSCAN_LLM_MODEL", "gpt-4o-mini");
    let llm_timeout_secs = parse_positive_u64("SHELFSCAN_LLM_TIMEOUT_SECS", "20")?;

    Ok(AppConfig {
        env,
        log_level,
        sources_path,
        job_timeout_secs,
        navigation_timeout_secs,
        fetch_max_retries,
        fetch_backoff_base_ms,
        user_agent,
        fallback_seed,
        llm_url,
        llm_api_key,
        llm_model,
        llm_timeout_secs,
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
