//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, CaptureSource};
use crate::domain::error::ConfigError;
use crate::domain::recording::{Codec, Duration, Quality};

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS, VALID_LOG_LEVELS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    validate_config_value(key, value)?;

    let mut config = store.load().await?;
    set_value(&mut config, key, value)?;
    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let config = store.load().await?;
    presenter.output(get_value(&config, key).as_deref().unwrap_or(NOT_SET));

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, get_value(&config, key).as_deref().unwrap_or(NOT_SET));
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

/// Stored value of a key, rendered as text
fn get_value(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "duration" => config.duration.clone(),
        "max_duration" => config.max_duration.clone(),
        "output_dir" => config.output_dir.clone(),
        "codec" => config.codec.clone(),
        "quality" => config.quality.clone(),
        "source" => config.source.clone(),
        "notify" => config.notify.map(|b| b.to_string()),
        "log_level" => config.log_level.clone(),
        _ => None,
    }
}

/// Store a validated value. Enumerated values are stored in canonical form.
fn set_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };

    match key {
        "duration" => config.duration = Some(value.to_string()),
        "max_duration" => config.max_duration = Some(value.to_string()),
        "output_dir" => config.output_dir = Some(value.to_string()),
        "codec" => {
            let codec: Codec = value.parse().map_err(|e| invalid(format!("{}", e)))?;
            config.codec = Some(codec.to_string());
        }
        "quality" => {
            let quality: Quality = value.parse().map_err(|e| invalid(format!("{}", e)))?;
            config.quality = Some(quality.to_string());
        }
        "source" => {
            let source: CaptureSource = value.parse().map_err(|e| invalid(format!("{}", e)))?;
            config.source = Some(source.to_string());
        }
        "notify" => config.notify = Some(parse_bool(value).map_err(|_| invalid(BOOL_HINT.into()))?),
        "log_level" => config.log_level = Some(value.to_lowercase()),
        _ => return Err(invalid("Unknown key".into())),
    }
    Ok(())
}

const BOOL_HINT: &str = "Value must be 'true' or 'false'";

/// Validate a config value based on key type
fn validate_config_value(key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };

    match key {
        "duration" | "max_duration" => {
            value
                .parse::<Duration>()
                .map_err(|e| invalid(e.to_string()))?;
        }
        "codec" => {
            value.parse::<Codec>().map_err(|e| invalid(e.to_string()))?;
        }
        "quality" => {
            value.parse::<Quality>().map_err(|e| invalid(e.to_string()))?;
        }
        "source" => {
            value
                .parse::<CaptureSource>()
                .map_err(|e| invalid(e.to_string()))?;
        }
        "notify" => {
            parse_bool(value).map_err(|_| invalid(BOOL_HINT.into()))?;
        }
        "output_dir" => {
            if value.trim().is_empty() {
                return Err(invalid("Directory must not be empty".into()));
            }
        }
        "log_level" => {
            if !VALID_LOG_LEVELS.contains(&value.to_lowercase().as_str()) {
                return Err(invalid(format!(
                    "Invalid value '{}'. Valid options: {}",
                    value,
                    VALID_LOG_LEVELS.join(", ")
                )));
            }
        }
        _ => {}
    }
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool, ()> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(()),
    }
}
