//! Configuration commands.
//!
//! - `config show`: Display the effective configuration
//! - `config get`: Print one value
//! - `config set`: Change one value and save

use std::str::FromStr;

use owo_colors::OwoColorize;
use serde_json::{Value, json};

use super::CommandOutput;
use crate::config::{Config, ENV_API_URL, ENV_TOKEN};
use crate::error::{AdminError, Result};

/// Keys accepted by `config get` and `config set`
pub const CONFIG_KEYS: &[&str] = &[
    "api.base_url",
    "api.token",
    "api.timeout_secs",
    "query.page_size",
    "query.debounce_ms",
    "query.stale_time_ms",
    "query.cache_time_ms",
    "query.use_cache",
];

fn unknown_key(key: &str) -> AdminError {
    AdminError::Config(format!(
        "unknown config key '{key}'. Valid keys: {}",
        CONFIG_KEYS.join(", ")
    ))
}

/// Mask a sensitive value by showing only the first 2 and last 2 characters
fn mask_sensitive_value(value: &str) -> String {
    let char_count = value.chars().count();
    if char_count > 4 {
        let first: String = value.chars().take(2).collect();
        let last: String = value.chars().skip(char_count - 2).collect();
        format!("{first}...{last}")
    } else {
        "****".to_string()
    }
}

/// Current value of `key`, with the token masked
fn read_key(config: &Config, key: &str) -> Result<Value> {
    let value = match key {
        "api.base_url" => json!(config.base_url()),
        "api.token" => json!(config.token().as_deref().map(mask_sensitive_value)),
        "api.timeout_secs" => json!(config.api.timeout_secs),
        "query.page_size" => json!(config.query.page_size),
        "query.debounce_ms" => json!(config.query.debounce_ms),
        "query.stale_time_ms" => json!(config.query.stale_time_ms),
        "query.cache_time_ms" => json!(config.query.cache_time_ms),
        "query.use_cache" => json!(config.query.use_cache),
        _ => return Err(unknown_key(key)),
    };
    Ok(value)
}

fn parse_value<T: FromStr>(key: &str, value: &str, expected: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        AdminError::Config(format!(
            "invalid value '{value}' for {key}. Expected: {expected}"
        ))
    })
}

/// Apply `key = value` to `config`, returning what should be echoed back
fn write_key(config: &mut Config, key: &str, value: &str) -> Result<Value> {
    let echoed = match key {
        "api.base_url" => {
            let url = url::Url::parse(value)?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(AdminError::Config(format!(
                    "invalid value '{value}' for api.base_url. Expected an http(s) URL"
                )));
            }
            config.api.base_url = value.trim_end_matches('/').to_string();
            json!(config.api.base_url)
        }
        "api.token" => {
            config.api.token = Some(value.to_string());
            json!(mask_sensitive_value(value))
        }
        "api.timeout_secs" => {
            config.api.timeout_secs = parse_value(key, value, "a number of seconds")?;
            json!(config.api.timeout_secs)
        }
        "query.page_size" => {
            let size: u32 = parse_value(key, value, "a positive integer")?;
            if size == 0 {
                return Err(AdminError::Config(
                    "query.page_size must be a positive integer".to_string(),
                ));
            }
            config.query.page_size = size;
            json!(size)
        }
        "query.debounce_ms" => {
            config.query.debounce_ms = parse_value(key, value, "milliseconds")?;
            json!(config.query.debounce_ms)
        }
        "query.stale_time_ms" => {
            config.query.stale_time_ms = parse_value(key, value, "milliseconds")?;
            json!(config.query.stale_time_ms)
        }
        "query.cache_time_ms" => {
            config.query.cache_time_ms = parse_value(key, value, "milliseconds")?;
            json!(config.query.cache_time_ms)
        }
        "query.use_cache" => {
            config.query.use_cache = parse_value(key, value, "true or false")?;
            json!(config.query.use_cache)
        }
        _ => return Err(unknown_key(key)),
    };
    Ok(echoed)
}

/// Show current configuration
pub fn cmd_config_show(json: bool) -> Result<()> {
    let config = Config::load()?;

    let mut values = serde_json::Map::new();
    for key in CONFIG_KEYS {
        values.insert(key.to_string(), read_key(&config, key)?);
    }

    let json_output = json!({
        "values": values.clone(),
        "select": {
            "scroll_threshold": config.select.scroll_threshold,
            "max_height": config.select.max_height,
        },
        "identity_configured": !config.identity.is_empty(),
        "storage_path": config.storage_path().to_string_lossy(),
        "config_file": Config::config_path().to_string_lossy(),
    });

    let mut text = String::new();
    text.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));

    let mut section = "";
    for key in CONFIG_KEYS {
        let (head, name) = key.split_once('.').unwrap_or(("", key));
        if head != section {
            if !section.is_empty() {
                text.push('\n');
            }
            text.push_str(&format!("{}:\n", head.cyan()));
            section = head;
        }
        let shown = match &values[*key] {
            Value::Null => "not configured".dimmed().to_string(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        text.push_str(&format!("  {name}: {shown}\n"));
    }

    text.push('\n');
    text.push_str(&format!(
        "{}\n",
        format!(
            "Environment overrides: {ENV_API_URL}, {ENV_TOKEN}"
        )
        .dimmed()
    ));
    text.push_str(&format!(
        "{}",
        format!("Config file: {}", Config::config_path().display()).dimmed()
    ));

    CommandOutput::new(json_output).with_text(text).print(json)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, json: bool) -> Result<()> {
    let mut config = Config::load()?;
    let echoed = write_key(&mut config, key, value)?;
    config.save()?;

    let shown = match &echoed {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "value": echoed,
        "success": true,
    }))
    .with_text(format!("Set {} to {}", key.cyan(), shown))
    .print(json)
}

/// Get a specific configuration value
pub fn cmd_config_get(key: &str, json: bool) -> Result<()> {
    let config = Config::load()?;
    let value = read_key(&config, key)?;
    let configured = !value.is_null();

    let text = match &value {
        Value::Null => "not configured".dimmed().to_string(),
        Value::String(s) if key == "api.token" => {
            format!("{s} (masked - showing first 2 and last 2 characters)")
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    CommandOutput::new(json!({
        "key": key,
        "value": value,
        "configured": configured,
        "masked": key == "api.token" && configured,
    }))
    .with_text(text)
    .print(json)
}
