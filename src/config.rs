use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Stroke Prediction System";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable names for runtime overrides.
pub const ENV_MODEL_PATH: &str = "STROKE_MODEL_PATH";
pub const ENV_DATASET_PATH: &str = "STROKE_DATASET_PATH";
pub const ENV_BIND_ADDR: &str = "STROKE_BIND_ADDR";
pub const ENV_HISTORY_LIMIT: &str = "STROKE_HISTORY_LIMIT";
pub const ENV_SESSION_TIMEOUT: &str = "STROKE_SESSION_TIMEOUT_SECS";

/// Default model artifact, resolved against the working directory.
pub const DEFAULT_MODEL_FILE: &str = "model.json";
/// Default reference cohort, resolved against the working directory.
pub const DEFAULT_DATASET_FILE: &str = "cleaned_stroke_data.csv";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";
/// Sessions idle longer than this are dropped along with their history.
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 3600;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,stroke_risk=debug"
}

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub dataset_path: PathBuf,
    pub bind_addr: SocketAddr,
    /// `None` keeps every history entry for the lifetime of the session.
    pub history_limit: Option<usize>,
    pub session_idle_timeout_secs: u64,
    pub log_filter: String,
}

impl AppConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary key lookup.
    ///
    /// Unset keys fall back to defaults; set-but-malformed keys are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = non_empty(lookup(ENV_MODEL_PATH)) {
            config.model_path = PathBuf::from(path);
        }
        if let Some(path) = non_empty(lookup(ENV_DATASET_PATH)) {
            config.dataset_path = PathBuf::from(path);
        }
        if let Some(addr) = non_empty(lookup(ENV_BIND_ADDR)) {
            config.bind_addr = addr.parse().map_err(|_| ConfigError::Invalid {
                key: ENV_BIND_ADDR,
                value: addr.clone(),
            })?;
        }
        if let Some(limit) = non_empty(lookup(ENV_HISTORY_LIMIT)) {
            let parsed: usize = limit.parse().map_err(|_| ConfigError::Invalid {
                key: ENV_HISTORY_LIMIT,
                value: limit.clone(),
            })?;
            // 0 means "no cap", matching the unset default
            config.history_limit = (parsed > 0).then_some(parsed);
        }
        if let Some(secs) = non_empty(lookup(ENV_SESSION_TIMEOUT)) {
            // A zero timeout would evict every session on the next request
            config.session_idle_timeout_secs = secs
                .parse()
                .ok()
                .filter(|parsed: &u64| *parsed > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    key: ENV_SESSION_TIMEOUT,
                    value: secs.clone(),
                })?;
        }

        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_FILE),
            dataset_path: PathBuf::from(DEFAULT_DATASET_FILE),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8501)),
            history_limit: None,
            session_idle_timeout_secs: DEFAULT_SESSION_TIMEOUT_SECS,
            log_filter: default_log_filter().to_string(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.model_path, PathBuf::from("model.json"));
        assert_eq!(config.dataset_path, PathBuf::from("cleaned_stroke_data.csv"));
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert!(config.history_limit.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_MODEL_PATH, "/srv/models/stroke.json"),
            (ENV_DATASET_PATH, "/srv/data/cohort.csv"),
            (ENV_BIND_ADDR, "0.0.0.0:9000"),
            (ENV_HISTORY_LIMIT, "25"),
            (ENV_SESSION_TIMEOUT, "120"),
        ]))
        .unwrap();

        assert_eq!(config.model_path, PathBuf::from("/srv/models/stroke.json"));
        assert_eq!(config.dataset_path, PathBuf::from("/srv/data/cohort.csv"));
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.history_limit, Some(25));
        assert_eq!(config.session_idle_timeout_secs, 120);
    }

    #[test]
    fn zero_history_limit_means_unbounded() {
        let config = AppConfig::from_lookup(lookup_from(&[(ENV_HISTORY_LIMIT, "0")])).unwrap();
        assert!(config.history_limit.is_none());
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[(ENV_MODEL_PATH, "   ")])).unwrap();
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_FILE));
    }

    #[test]
    fn malformed_bind_addr_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[(ENV_BIND_ADDR, "not-an-addr")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_BIND_ADDR));
    }

    #[test]
    fn malformed_history_limit_is_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[(ENV_HISTORY_LIMIT, "-3")]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { key: ENV_HISTORY_LIMIT, .. })
        ));
    }

    #[test]
    fn zero_session_timeout_is_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[(ENV_SESSION_TIMEOUT, "0")]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { key: ENV_SESSION_TIMEOUT, .. })
        ));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
