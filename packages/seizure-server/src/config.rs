use seizure_rs::{InferenceSettings, ModelType};
use std::env;
use std::path::PathBuf;

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Bind address (0.0.0.0 for LAN, 127.0.0.1 for localhost)
    pub bind_addr: String,
    /// Path to the JSON model checkpoint
    pub model_path: PathBuf,
    /// Architecture the checkpoint must contain
    pub model_type: ModelType,
    /// Probability above which a window counts as a seizure
    pub decision_threshold: f32,
    /// Windows evaluated per inference batch
    pub inference_batch_size: usize,
    /// Maximum request body size in bytes (default 500MB)
    pub max_upload_size: usize,
    /// CORS allowed origins (comma-separated in env var, `*` for any)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let inference = InferenceSettings::default();
        Self {
            port: 8000,
            bind_addr: "127.0.0.1".to_string(),
            model_path: PathBuf::from("models/gru_model.json"),
            model_type: ModelType::Gru,
            decision_threshold: inference.threshold,
            inference_batch_size: inference.batch_size,
            max_upload_size: 524_288_000,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("SEIZURE_PORT") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidPort)?,
            None => defaults.port,
        };

        let model_type = match lookup("MODEL_TYPE") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("MODEL_TYPE={}", v)))?,
            None => defaults.model_type,
        };

        let decision_threshold: f32 = parse_or(&lookup, "DECISION_THRESHOLD", defaults.decision_threshold)?;
        if !(0.0..1.0).contains(&decision_threshold) {
            return Err(ConfigError::InvalidValue(format!(
                "DECISION_THRESHOLD must be in [0, 1), got {}",
                decision_threshold
            )));
        }

        let inference_batch_size: usize =
            parse_or(&lookup, "INFERENCE_BATCH_SIZE", defaults.inference_batch_size)?;
        if inference_batch_size == 0 {
            return Err(ConfigError::InvalidValue(
                "INFERENCE_BATCH_SIZE must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            port,
            bind_addr: lookup("SEIZURE_BIND_ADDR").unwrap_or(defaults.bind_addr),
            model_path: lookup("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            model_type,
            decision_threshold,
            inference_batch_size,
            max_upload_size: parse_or(&lookup, "MAX_UPLOAD_SIZE", defaults.max_upload_size)?,
            cors_origins: lookup("CORS_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
        })
    }

    /// Get the full bind address (addr:port)
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn inference_settings(&self) -> InferenceSettings {
        InferenceSettings {
            threshold: self.decision_threshold,
            batch_size: self.inference_batch_size,
        }
    }

    /// True when any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(format!("{}={}", key, v))),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:8000");
        assert_eq!(config.model_type, ModelType::Gru);
        assert_eq!(config.inference_settings(), InferenceSettings::default());
        assert!(config.allows_any_origin());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("SEIZURE_PORT", "9001"),
            ("MODEL_TYPE", "lstm"),
            ("MODEL_PATH", "/opt/models/lstm.json"),
            ("DECISION_THRESHOLD", "0.7"),
            ("CORS_ORIGINS", "http://localhost:8050, http://127.0.0.1:8050"),
        ])
        .unwrap();
        assert_eq!(config.port, 9001);
        assert_eq!(config.model_type, ModelType::Lstm);
        assert_eq!(config.model_path, PathBuf::from("/opt/models/lstm.json"));
        assert_eq!(config.decision_threshold, 0.7);
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:8050", "http://127.0.0.1:8050"]
        );
        assert!(!config.allows_any_origin());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            config_from(&[("SEIZURE_PORT", "eighty")]),
            Err(ConfigError::InvalidPort)
        ));
        assert!(config_from(&[("MODEL_TYPE", "transformer")]).is_err());
        assert!(config_from(&[("INFERENCE_BATCH_SIZE", "0")]).is_err());
        assert!(config_from(&[("DECISION_THRESHOLD", "1.5")]).is_err());
        assert!(config_from(&[("MAX_UPLOAD_SIZE", "lots")]).is_err());
    }
}
