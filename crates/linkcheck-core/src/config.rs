use crate::app_config::{AppConfig, LlmProvider};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation are decoupled from the process environment so tests
/// can drive them with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> { lookup(var).ok().filter(|v| !v.is_empty()) };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
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

    let spreadsheet_id = require("LINKCHECK_SPREADSHEET_ID")?;
    let sheets_access_token = require("LINKCHECK_SHEETS_ACCESS_TOKEN")?;
    let sheet_name = or_default("LINKCHECK_SHEET_NAME", "Sheet1");
    let sheets_api_base = or_default("LINKCHECK_SHEETS_API_BASE", "https://sheets.googleapis.com");
    let log_level = or_default("LINKCHECK_LOG_LEVEL", "info");

    let linkedin_email = optional("LINKEDIN_EMAIL");
    let linkedin_password = optional("LINKEDIN_PASSWORD");

    let cdp_endpoint = or_default("LINKCHECK_CDP_ENDPOINT", "http://127.0.0.1:9222");
    let cookies_path = PathBuf::from(or_default(
        "LINKCHECK_COOKIES_PATH",
        "./linkedin_cookies.json",
    ));
    let navigation_timeout_secs = parse_u64("LINKCHECK_NAVIGATION_TIMEOUT_SECS", "30")?;
    let login_timeout_secs = parse_u64("LINKCHECK_LOGIN_TIMEOUT_SECS", "60")?;
    let profile_delay_ms = parse_u64("LINKCHECK_PROFILE_DELAY_MS", "3000")?;

    let update_max_attempts = parse_u32("LINKCHECK_UPDATE_MAX_ATTEMPTS", "3")?;
    if update_max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "LINKCHECK_UPDATE_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let update_backoff_step_ms = parse_u64("LINKCHECK_UPDATE_BACKOFF_STEP_MS", "1000")?;

    let llm_provider = parse_llm_provider(&or_default("LINKCHECK_LLM_PROVIDER", "none"))?;
    let llm_api_key = match llm_provider {
        LlmProvider::None => optional("LINKCHECK_LLM_API_KEY"),
        LlmProvider::Anthropic | LlmProvider::OpenAi => Some(require("LINKCHECK_LLM_API_KEY")?),
    };
    let llm_model = optional("LINKCHECK_LLM_MODEL");
    let llm_base_url = optional("LINKCHECK_LLM_BASE_URL");

    let export_dir = PathBuf::from(or_default("LINKCHECK_EXPORT_DIR", "."));

    Ok(AppConfig {
        log_level,
        spreadsheet_id,
        sheet_name,
        sheets_access_token,
        sheets_api_base,
        linkedin_email,
        linkedin_password,
        cdp_endpoint,
        cookies_path,
        navigation_timeout_secs,
        login_timeout_secs,
        profile_delay_ms,
        update_max_attempts,
        update_backoff_step_ms,
        llm_provider,
        llm_api_key,
        llm_model,
        llm_base_url,
        export_dir,
    })
}

/// Parse the `LINKCHECK_LLM_PROVIDER` value (case-insensitive).
fn parse_llm_provider(s: &str) -> Result<LlmProvider, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "" | "none" => Ok(LlmProvider::None),
        "anthropic" | "claude" => Ok(LlmProvider::Anthropic),
        "openai" => Ok(LlmProvider::OpenAi),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LINKCHECK_LLM_PROVIDER".to_string(),
            reason: format!("unknown provider '{other}' (expected none, anthropic or openai)"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
