use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
/// Every variable is optional; unset or blank values fall back to defaults.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if a value is present but invalid.
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
/// Returns `ConfigError::InvalidEnvVar` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can pass a `HashMap` lookup
/// instead of calling `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("SKYFARE_ENV", "development"))?;
    let bind_addr = parse_addr("SKYFARE_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("SKYFARE_LOG_LEVEL", "info");

    let upstream_base_url = or_default("SKYFARE_UPSTREAM_BASE_URL", "https://api.skypicker.com");
    if !(upstream_base_url.starts_with("http://") || upstream_base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "SKYFARE_UPSTREAM_BASE_URL".to_string(),
            reason: format!("expected an http(s) URL, got \"{upstream_base_url}\""),
        });
    }

    let partner_id = or_default("SKYFARE_PARTNER_ID", "picky");
    let user_agent = or_default("SKYFARE_USER_AGENT", "skyfare/0.1 (flight-search)");

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        upstream_base_url,
        partner_id,
        user_agent,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SKYFARE_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}
