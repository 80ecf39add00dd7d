//! Base-URL and token resolution: environment first, then whatever the
//! user last persisted, then the local default.

use std::path::PathBuf;

use thiserror::Error;

pub const ENV_BASE_URL: &str = "LOCALAGENT_BASE_URL";
pub const ENV_WS_URL: &str = "LOCALAGENT_WS_URL";
pub const ENV_TOKEN_FILE: &str = "LOCALAGENT_TOKEN_FILE";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

pub const BASE_URL_SOURCE_STORED: &str = "stored";
pub const BASE_URL_SOURCE_DEFAULT_LOCAL: &str = "default_local";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config_dir_unavailable")]
    ConfigDirUnavailable,
    #[error("token_file_io:{message}")]
    TokenFileIo { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBaseUrl {
    pub base_url: String,
    pub source: String,
}

#[must_use]
pub fn resolve_base_url(stored: Option<&str>) -> ResolvedBaseUrl {
    if let Some(base_url) = env_non_empty(ENV_BASE_URL) {
        return ResolvedBaseUrl {
            base_url,
            source: ENV_BASE_URL.to_string(),
        };
    }

    if let Some(base_url) = stored
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| value.trim_end_matches('/').to_string())
    {
        return ResolvedBaseUrl {
            base_url,
            source: BASE_URL_SOURCE_STORED.to_string(),
        };
    }

    ResolvedBaseUrl {
        base_url: DEFAULT_BASE_URL.to_string(),
        source: BASE_URL_SOURCE_DEFAULT_LOCAL.to_string(),
    }
}

/// Push-channel URL: env override, else derived from the HTTP base by
/// swapping the scheme and appending `/ws`.
#[must_use]
pub fn resolve_ws_url(base_url: &str) -> String {
    if let Some(ws_url) = env_non_empty(ENV_WS_URL) {
        return ws_url;
    }
    let derived = if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        format!("ws://{base_url}")
    };
    format!("{}/ws", derived.trim_end_matches('/'))
}

pub fn token_file_path() -> Result<PathBuf, ConfigError> {
    if let Some(path) = env_non_empty(ENV_TOKEN_FILE) {
        return Ok(PathBuf::from(path));
    }
    let dir = dirs::config_dir().ok_or(ConfigError::ConfigDirUnavailable)?;
    Ok(dir.join("localagent").join("token"))
}

pub fn load_token() -> Result<Option<String>, ConfigError> {
    let path = token_file_path()?;
    match std::fs::read_to_string(&path) {
        Ok(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(error) => Err(ConfigError::TokenFileIo {
            message: error.to_string(),
        }),
    }
}

pub fn store_token(token: &str) -> Result<(), ConfigError> {
    let path = token_file_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|error| ConfigError::TokenFileIo {
            message: error.to_string(),
        })?;
    }
    std::fs::write(&path, token).map_err(|error| ConfigError::TokenFileIo {
        message: error.to_string(),
    })
}

pub fn clear_token() -> Result<(), ConfigError> {
    let path = token_file_path()?;
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(ConfigError::TokenFileIo {
            message: error.to_string(),
        }),
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn with_env<T>(overrides: &[(&str, Option<&str>)], test: impl FnOnce() -> T) -> T {
        let lock = ENV_LOCK.get_or_init(|| Mutex::new(()));
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let previous = overrides
            .iter()
            .map(|(key, _)| (*key, std::env::var(key).ok()))
            .collect::<Vec<_>>();

        for (key, value) in overrides {
            if let Some(value) = value {
                unsafe { std::env::set_var(key, value) };
            } else {
                unsafe { std::env::remove_var(key) };
            }
        }

        let result = test();

        for (key, value) in previous {
            if let Some(value) = value {
                unsafe { std::env::set_var(key, value) };
            } else {
                unsafe { std::env::remove_var(key) };
            }
        }

        result
    }

    #[test]
    fn env_override_wins_over_stored() {
        with_env(&[(ENV_BASE_URL, Some("https://agent.example.com/"))], || {
            let resolved = resolve_base_url(Some("http://stored.example.com"));
            assert_eq!(resolved.base_url, "https://agent.example.com");
            assert_eq!(resolved.source, ENV_BASE_URL);
        });
    }

    #[test]
    fn stored_wins_over_default() {
        with_env(&[(ENV_BASE_URL, None)], || {
            let resolved = resolve_base_url(Some(" http://stored.example.com/ "));
            assert_eq!(resolved.base_url, "http://stored.example.com");
            assert_eq!(resolved.source, BASE_URL_SOURCE_STORED);
        });
    }

    #[test]
    fn default_local_is_the_fallback() {
        with_env(&[(ENV_BASE_URL, None)], || {
            let resolved = resolve_base_url(None);
            assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
            assert_eq!(resolved.source, BASE_URL_SOURCE_DEFAULT_LOCAL);
        });
    }

    #[test]
    fn ws_url_is_derived_from_http_base() {
        with_env(&[(ENV_WS_URL, None)], || {
            assert_eq!(resolve_ws_url("http://localhost:8000"), "ws://localhost:8000/ws");
            assert_eq!(
                resolve_ws_url("https://agent.example.com/"),
                "wss://agent.example.com/ws"
            );
        });
    }

    #[test]
    fn token_round_trips_through_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("token").to_string_lossy().to_string();
        with_env(
            &[(ENV_TOKEN_FILE, Some(file.as_str()))],
            || {
                assert_eq!(load_token().expect("load"), None);
                store_token("tok_abc").expect("store");
                assert_eq!(load_token().expect("load"), Some("tok_abc".to_string()));
                clear_token().expect("clear");
                assert_eq!(load_token().expect("load"), None);
            },
        );
    }
}
