//! Configuration loading from the flat `KEY=value` settings file.
//!
//! The file is written by the external setup tool. Loading is total: a
//! missing file yields the defaults, unknown keys are ignored, and a
//! recognized key with an invalid value falls back to that field's default
//! with a warning — never an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};
use wheel_bridge_types::Settings;

use crate::error::DaemonError;

/// Default location: `$XDG_CONFIG_HOME/wheel-bridge/wheel-bridge.conf`.
#[must_use]
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("wheel-bridge")
        .join("wheel-bridge.conf")
}

/// Load settings from the given path, or the default location.
pub fn load(path: Option<&Path>) -> Result<Settings, DaemonError> {
    let path = path.map_or_else(default_config_path, Path::to_path_buf);
    if !path.exists() {
        info!(path = %path.display(), "no config file found, using defaults");
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(&path)
        .map_err(|e| DaemonError::Config(format!("failed to read {}: {e}", path.display())))?;
    info!(path = %path.display(), "loaded config");
    Ok(parse(&content))
}

/// Parse line-oriented `KEY=value` text. `#` comments and blank lines are
/// ignored.
#[must_use]
pub fn parse(content: &str) -> Settings {
    let mut settings = Settings::default();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            warn!(line, "ignoring malformed config line");
            continue;
        };
        apply(&mut settings, key.trim(), value.trim());
    }
    settings
}

#[allow(clippy::too_many_lines)]
fn apply(settings: &mut Settings, key: &str, value: &str) {
    let defaults = Settings::default();
    let lower = value.to_lowercase();
    match key {
        "SCROLL_DIRECTION" => match lower.parse() {
            Ok(direction) => settings.direction = direction,
            Err(()) => {
                settings.direction = defaults.direction;
                warn_fallback(key, value);
            }
        },
        "HORIZONTAL_SCROLL" => match parse_bool(&lower) {
            Some(enabled) => settings.horizontal_scroll = enabled,
            None => {
                settings.horizontal_scroll = defaults.horizontal_scroll;
                warn_fallback(key, value);
            }
        },
        "SENSITIVITY" => match lower.as_str() {
            "low" => settings.sensitivity = 30,
            "medium" => settings.sensitivity = 15,
            "high" => settings.sensitivity = 8,
            _ => {
                settings.sensitivity = defaults.sensitivity;
                warn_fallback(key, value);
            }
        },
        "DEAD_ZONE" => match lower.as_str() {
            "none" => settings.dead_zone = 0,
            "low" => settings.dead_zone = 2,
            "default" => settings.dead_zone = 5,
            "high" => settings.dead_zone = 10,
            _ => {
                settings.dead_zone = defaults.dead_zone;
                warn_fallback(key, value);
            }
        },
        "POINTER_LOCK" => match parse_bool(&lower) {
            Some(enabled) => settings.pointer_lock = enabled,
            None => {
                settings.pointer_lock = defaults.pointer_lock;
                warn_fallback(key, value);
            }
        },
        "MIDDLE_BUTTON" => match lower.parse() {
            Ok(mode) => settings.middle_button = mode,
            Err(()) => {
                settings.middle_button = defaults.middle_button;
                warn_fallback(key, value);
            }
        },
        "EDGE_SCROLL_ENABLED" => match parse_bool(&lower) {
            Some(enabled) => settings.edge_scroll = enabled,
            None => {
                settings.edge_scroll = defaults.edge_scroll;
                warn_fallback(key, value);
            }
        },
        "EDGE_SCROLL_ZONE" => match lower.as_str() {
            "small" => settings.edge_zone = 0.20,
            "medium" => settings.edge_zone = 0.25,
            "large" => settings.edge_zone = 0.30,
            _ => {
                settings.edge_zone = defaults.edge_zone;
                warn_fallback(key, value);
            }
        },
        "EDGE_SCROLL_DWELL" => match value.parse::<u64>() {
            Ok(ms) if (100..=1000).contains(&ms) => {
                settings.edge_dwell = Duration::from_millis(ms);
            }
            _ => {
                settings.edge_dwell = defaults.edge_dwell;
                warn_fallback(key, value);
            }
        },
        _ => debug!(key, "ignoring unrecognized config key"),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn warn_fallback(key: &str, value: &str) {
    warn!(key, value, "invalid config value, using the field default");
}

/// One info line with every effective field, for the supervisor journal.
pub fn log_summary(settings: &Settings) {
    info!(
        direction = ?settings.direction,
        horizontal_scroll = settings.horizontal_scroll,
        sensitivity = settings.sensitivity,
        dead_zone = settings.dead_zone,
        pointer_lock = settings.pointer_lock,
        middle_button = ?settings.middle_button,
        edge_scroll = settings.edge_scroll,
        edge_zone = settings.edge_zone,
        edge_dwell_ms = u64::try_from(settings.edge_dwell.as_millis()).unwrap_or(u64::MAX),
        "effective configuration"
    );
}
