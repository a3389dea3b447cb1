use crate::app_config::AppConfig;
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
/// Unlike [`load_app_config`], this does NOT load `.env` files. Use it in tests
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation are decoupled from the process environment so they
/// can be tested with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .map(|v| v.trim_end_matches('/').to_string())
            .map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

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

    // Sizes and counts must be non-zero.
    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        let value = raw
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })?;
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(value)
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        let value = raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })?;
        if !value.is_finite() {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be a finite number".to_string(),
            });
        }
        Ok(value)
    };

    let parse_unit_interval = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = parse_f64(var, default)?;
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("{value} is outside [0, 1]"),
            });
        }
        Ok(value)
    };

    let sentiment_url = require("TERRACE_SENTIMENT_URL")?;
    let emotion_url = require("TERRACE_EMOTION_URL")?;
    let ner_url = require("TERRACE_NER_URL")?;
    let tei_url = require("TERRACE_TEI_URL")?;

    let bind_addr = parse_addr("TERRACE_BIND_ADDR", "0.0.0.0:8000")?;
    let log_level = or_default("TERRACE_LOG_LEVEL", "info");
    let lexicon_path = lookup("TERRACE_LEXICON_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let provider_batch_size = parse_positive_usize("TERRACE_PROVIDER_BATCH_SIZE", "32")?;
    let provider_concurrency = parse_positive_usize("TERRACE_PROVIDER_CONCURRENCY", "4")?;
    let provider_timeout_secs = parse_u64("TERRACE_PROVIDER_TIMEOUT_SECS", "60")?;

    let emotion_top_k = parse_positive_usize("TERRACE_EMOTION_TOP_K", "3")?;
    let emotion_threshold = parse_unit_interval("TERRACE_EMOTION_THRESHOLD", "0.3")?;
    let polarity_cutoff = parse_unit_interval("TERRACE_POLARITY_CUTOFF", "0.05")?;

    let topic_count = parse_positive_usize("TERRACE_TOPIC_COUNT", "10")?;
    let min_topic_size = parse_positive_usize("TERRACE_MIN_TOPIC_SIZE", "5")?;

    let engagement_cap = parse_f64("TERRACE_ENGAGEMENT_CAP", "100")?;
    if engagement_cap <= 0.0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "TERRACE_ENGAGEMENT_CAP".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(AppConfig {
        bind_addr,
        log_level,
        sentiment_url,
        emotion_url,
        ner_url,
        tei_url,
        lexicon_path,
        provider_batch_size,
        provider_concurrency,
        provider_timeout_secs,
        emotion_top_k,
        emotion_threshold,
        polarity_cutoff,
        topic_count,
        min_topic_size,
        engagement_cap,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
