use std::env;

/// UI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct UiConfig {
    /// Port to listen on
    pub port: u16,
    /// Bind address (0.0.0.0 for LAN, 127.0.0.1 for localhost)
    pub bind_addr: String,
    /// Base URL of the prediction backend, as reachable from the browser
    pub backend_url: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            port: 8050,
            bind_addr: "127.0.0.1".to_string(),
            backend_url: "http://127.0.0.1:8000".to_string(),
        }
    }
}

impl UiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("UI_PORT") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidPort)?,
            None => defaults.port,
        };

        let backend_url = lookup("BACKEND_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.backend_url);
        if !(backend_url.starts_with("http://") || backend_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(format!(
                "BACKEND_URL must be an http(s) URL, got '{}'",
                backend_url
            )));
        }

        Ok(Self {
            port,
            bind_addr: lookup("UI_BIND_ADDR").unwrap_or(defaults.bind_addr),
            backend_url,
        })
    }

    /// Get the full bind address (addr:port)
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn ranges_url(&self) -> String {
        format!("{}/ranges", self.backend_url)
    }

    pub fn process_url(&self) -> String {
        format!("{}/process", self.backend_url)
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

    #[test]
    fn test_backend_urls() {
        let config = UiConfig::from_lookup(|key| match key {
            "BACKEND_URL" => Some("https://eeg.example.org/api/".to_string()),
            "UI_PORT" => Some("9050".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:9050");
        assert_eq!(config.ranges_url(), "https://eeg.example.org/api/ranges");
        assert_eq!(config.process_url(), "https://eeg.example.org/api/process");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            UiConfig::from_lookup(|key| (key == "UI_PORT").then(|| "x".to_string())),
            Err(ConfigError::InvalidPort)
        ));
        assert!(UiConfig::from_lookup(|key| (key == "BACKEND_URL").then(|| "localhost:8000".to_string())).is_err());
    }
}
