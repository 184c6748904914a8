use seizure_rs::InferenceEngine;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::ApiError;

/// Main server state shared across all handlers
pub struct ServerState {
    pub config: ServerConfig,
    engine: Result<Arc<InferenceEngine>, String>,
    pub start_time: Instant,
}

impl ServerState {
    /// Loads the configured checkpoint. A failure is kept and reported per
    /// request rather than aborting start-up.
    pub fn new(config: ServerConfig) -> Self {
        let engine = match InferenceEngine::load(
            &config.model_path,
            Some(config.model_type),
            config.inference_settings(),
        ) {
            Ok(engine) => {
                let model = engine.model();
                info!(
                    "Loaded {} checkpoint from {:?} ({} layer(s), hidden size {})",
                    model.model_type(),
                    config.model_path,
                    model.num_layers(),
                    model.hidden_size()
                );
                Ok(Arc::new(engine))
            }
            Err(e) => {
                warn!("Model checkpoint {:?} could not be loaded: {}", config.model_path, e);
                Err(e.to_string())
            }
        };

        Self {
            config,
            engine,
            start_time: Instant::now(),
        }
    }

    pub fn with_engine(config: ServerConfig, engine: InferenceEngine) -> Self {
        Self {
            config,
            engine: Ok(Arc::new(engine)),
            start_time: Instant::now(),
        }
    }

    pub fn engine(&self) -> Result<Arc<InferenceEngine>, ApiError> {
        self.engine.clone().map_err(|reason| {
            ApiError::Internal(format!("Model checkpoint unavailable: {}", reason))
        })
    }

    /// Reason the model could not be loaded, if any
    pub fn model_error(&self) -> Option<&str> {
        self.engine.as_ref().err().map(String::as_str)
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
