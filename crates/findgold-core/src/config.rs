use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Reads the proxy configuration, loading a `.env` file first if present.
///
/// # Errors
///
/// Returns `ConfigError` when `OPENAI_API_KEY` is absent or a numeric or
/// address variable does not parse.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Same as [`load_app_config`] without touching `.env`.
///
/// # Errors
///
/// See [`load_app_config`].
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Builds the configuration from an arbitrary variable lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let openai_api_key = require("OPENAI_API_KEY")?;

    let env = parse_environment(&or_default("FINDGOLD_ENV", "development"));

    // `PORT` is what hosting platforms inject; an explicit bind address wins.
    let port = or_default("PORT", "3000")
        .parse::<u16>()
        .map_err(|e| invalid("PORT", e.to_string()))?;
    let bind_addr = match lookup("FINDGOLD_BIND_ADDR") {
        Ok(raw) => raw
            .parse::<SocketAddr>()
            .map_err(|e| invalid("FINDGOLD_BIND_ADDR", e.to_string()))?,
        Err(_) => SocketAddr::from(([0, 0, 0, 0], port)),
    };

    let log_level = or_default("FINDGOLD_LOG_LEVEL", "info");
    let openai_base_url = or_default("FINDGOLD_OPENAI_BASE_URL", "https://api.openai.com/v1/");
    let openai_model = or_default("FINDGOLD_OPENAI_MODEL", "gpt-4o");
    let openai_max_tokens = parse_u32("FINDGOLD_OPENAI_MAX_TOKENS", "500")?;
    let max_body_bytes = parse_usize("FINDGOLD_MAX_BODY_BYTES", "10485760")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        openai_api_key,
        openai_base_url,
        openai_model,
        openai_max_tokens,
        max_body_bytes,
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
