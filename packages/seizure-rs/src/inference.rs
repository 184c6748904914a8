use crate::error::{Result, SeizureError};
use crate::model::{Checkpoint, ModelType, RecurrentClassifier};
use crate::types::{Label, Prediction};
use rayon::prelude::*;
use std::path::Path;

/// Decision rule and batching for window classification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceSettings {
    /// Windows scoring strictly above this probability are seizures
    pub threshold: f32,
    pub batch_size: usize,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            batch_size: 32,
        }
    }
}

/// Zero-mean, unit-variance copy of a window (population statistics).
///
/// Returns `None` for a flat window, which has no defined scale.
pub fn standardize(window: &[f64]) -> Option<Vec<f32>> {
    if window.is_empty() {
        return None;
    }

    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    if !std.is_finite() || std == 0.0 {
        return None;
    }

    Some(window.iter().map(|v| ((v - mean) / std) as f32).collect())
}

pub struct InferenceEngine {
    model: RecurrentClassifier,
    settings: InferenceSettings,
}

impl InferenceEngine {
    pub fn new(model: RecurrentClassifier, settings: InferenceSettings) -> Self {
        Self { model, settings }
    }

    /// Loads a checkpoint, optionally insisting on a specific architecture
    pub fn load(
        path: &Path,
        expected: Option<ModelType>,
        settings: InferenceSettings,
    ) -> Result<Self> {
        let checkpoint = Checkpoint::from_path(path)?;
        let found = checkpoint.resolved_model_type();
        if let Some(expected) = expected {
            if expected != found {
                return Err(SeizureError::Checkpoint(format!(
                    "expected a {} checkpoint, found {}",
                    expected, found
                )));
            }
        }

        let model = RecurrentClassifier::from_checkpoint(&checkpoint)?;
        Ok(Self::new(model, settings))
    }

    pub fn model(&self) -> &RecurrentClassifier {
        &self.model
    }

    pub fn settings(&self) -> InferenceSettings {
        self.settings
    }

    fn classify(&self, window: &[f64]) -> Prediction {
        match standardize(window) {
            Some(sequence) => {
                let probability = self.model.forward(&sequence);
                let label = if probability > self.settings.threshold {
                    Label::Seizure
                } else {
                    Label::NonSeizure
                };
                Prediction { label, probability }
            }
            None => Prediction {
                label: Label::NonSeizure,
                probability: 0.0,
            },
        }
    }

    /// Classifies each window; batches run one after another, windows inside a batch in parallel
    pub fn predict_windows(&self, windows: &[&[f64]]) -> Vec<Prediction> {
        let batch_size = self.settings.batch_size.max(1);
        let mut predictions = Vec::with_capacity(windows.len());

        for batch in windows.chunks(batch_size) {
            let batch_predictions: Vec<Prediction> =
                batch.par_iter().map(|window| self.classify(window)).collect();
            predictions.extend(batch_predictions);
        }

        log::debug!(
            "Classified {} windows, {} seizure",
            predictions.len(),
            predictions.iter().filter(|p| p.label.is_seizure()).count()
        );

        predictions
    }
}
