//! Recurrent window classifier restored from an exported PyTorch state dict.
//!
//! The checkpoint is a JSON document:
//!
//! ```json
//! {
//!   "model_type": "gru",
//!   "state_dict": {
//!     "gru.weight_ih_l0": [[...], ...],
//!     "gru.weight_hh_l0": [[...], ...],
//!     "gru.bias_ih_l0": [...],
//!     "gru.bias_hh_l0": [...],
//!     "fc.weight": [[...]],
//!     "fc.bias": [...]
//!   }
//! }
//! ```
//!
//! Hidden size and layer count are read off the tensor shapes. The network
//! consumes one feature per time step and emits a single sigmoid probability
//! computed from the last layer's final hidden state.

use crate::error::{Result, SeizureError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    Gru,
    Lstm,
}

impl ModelType {
    fn gate_count(&self) -> usize {
        match self {
            ModelType::Gru => 3,
            ModelType::Lstm => 4,
        }
    }

    /// Module name used as the state-dict key prefix
    pub fn prefix(&self) -> &'static str {
        match self {
            ModelType::Gru => "gru",
            ModelType::Lstm => "lstm",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for ModelType {
    type Err = SeizureError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gru" => Ok(ModelType::Gru),
            "lstm" => Ok(ModelType::Lstm),
            other => Err(SeizureError::InvalidParameter(format!(
                "Unsupported model type: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TensorData {
    Matrix(Vec<Vec<f32>>),
    Vector(Vec<f32>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Checkpoint {
    #[serde(default)]
    pub model_type: Option<ModelType>,
    pub state_dict: HashMap<String, TensorData>,
}

impl Checkpoint {
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            SeizureError::Checkpoint(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| SeizureError::Checkpoint(format!("malformed checkpoint: {}", e)))
    }

    /// Declared type, or the one implied by the tensor names
    pub fn resolved_model_type(&self) -> ModelType {
        self.model_type.unwrap_or_else(|| {
            if self.state_dict.keys().any(|k| k.starts_with("lstm.")) {
                ModelType::Lstm
            } else {
                ModelType::Gru
            }
        })
    }

    fn matrix(&self, name: &str, rows: usize, cols: usize) -> Result<Array2<f32>> {
        let data = match self.state_dict.get(name) {
            Some(TensorData::Matrix(data)) => data,
            Some(TensorData::Vector(_)) => {
                return Err(SeizureError::Checkpoint(format!("{} must be 2-dimensional", name)))
            }
            None => return Err(SeizureError::Checkpoint(format!("missing tensor {}", name))),
        };

        if data.len() != rows || data.iter().any(|row| row.len() != cols) {
            return Err(SeizureError::Checkpoint(format!(
                "{} has shape {}x{}, expected {}x{}",
                name,
                data.len(),
                data.first().map_or(0, |row| row.len()),
                rows,
                cols
            )));
        }

        let flat: Vec<f32> = data.iter().flatten().copied().collect();
        Array2::from_shape_vec((rows, cols), flat)
            .map_err(|e| SeizureError::Checkpoint(format!("{}: {}", name, e)))
    }

    fn vector(&self, name: &str, len: usize) -> Result<Array1<f32>> {
        match self.state_dict.get(name) {
            Some(TensorData::Vector(data)) if data.len() == len => Ok(Array1::from(data.clone())),
            Some(TensorData::Vector(data)) => Err(SeizureError::Checkpoint(format!(
                "{} has length {}, expected {}",
                name,
                data.len(),
                len
            ))),
            Some(TensorData::Matrix(_)) => Err(SeizureError::Checkpoint(format!(
                "{} must be 1-dimensional",
                name
            ))),
            None => Err(SeizureError::Checkpoint(format!("missing tensor {}", name))),
        }
    }

    fn rows_of(&self, name: &str) -> Result<(usize, usize)> {
        match self.state_dict.get(name) {
            Some(TensorData::Matrix(data)) => {
                Ok((data.len(), data.first().map_or(0, |row| row.len())))
            }
            Some(TensorData::Vector(_)) => {
                Err(SeizureError::Checkpoint(format!("{} must be 2-dimensional", name)))
            }
            None => Err(SeizureError::Checkpoint(format!("missing tensor {}", name))),
        }
    }
}

#[derive(Debug, Clone)]
struct RecurrentLayer {
    weight_ih: Array2<f32>,
    weight_hh: Array2<f32>,
    bias_ih: Array1<f32>,
    bias_hh: Array1<f32>,
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[derive(Debug, Clone)]
pub struct RecurrentClassifier {
    model_type: ModelType,
    hidden_size: usize,
    layers: Vec<RecurrentLayer>,
    fc_weight: Array1<f32>,
    fc_bias: f32,
}

impl RecurrentClassifier {
    pub fn from_checkpoint(checkpoint: &Checkpoint) -> Result<Self> {
        let model_type = checkpoint.resolved_model_type();
        let prefix = model_type.prefix();
        let gates = model_type.gate_count();

        let (hh_rows, hidden_size) = checkpoint.rows_of(&format!("{}.weight_hh_l0", prefix))?;
        if hidden_size == 0 || hh_rows != gates * hidden_size {
            return Err(SeizureError::Checkpoint(format!(
                "{}.weight_hh_l0 has {} rows, expected {} gates x {} hidden units",
                prefix, hh_rows, gates, hidden_size
            )));
        }

        let (_, input_size) = checkpoint.rows_of(&format!("{}.weight_ih_l0", prefix))?;
        if input_size != 1 {
            return Err(SeizureError::Checkpoint(format!(
                "expected a single input feature, checkpoint has {}",
                input_size
            )));
        }

        let mut layers = Vec::new();
        while checkpoint
            .state_dict
            .contains_key(&format!("{}.weight_ih_l{}", prefix, layers.len()))
        {
            let k = layers.len();
            let layer_input = if k == 0 { input_size } else { hidden_size };
            layers.push(RecurrentLayer {
                weight_ih: checkpoint.matrix(
                    &format!("{}.weight_ih_l{}", prefix, k),
                    gates * hidden_size,
                    layer_input,
                )?,
                weight_hh: checkpoint.matrix(
                    &format!("{}.weight_hh_l{}", prefix, k),
                    gates * hidden_size,
                    hidden_size,
                )?,
                bias_ih: checkpoint.vector(&format!("{}.bias_ih_l{}", prefix, k), gates * hidden_size)?,
                bias_hh: checkpoint.vector(&format!("{}.bias_hh_l{}", prefix, k), gates * hidden_size)?,
            });
        }

        let fc = checkpoint.matrix("fc.weight", 1, hidden_size)?;
        let fc_bias = checkpoint.vector("fc.bias", 1)?;

        log::info!(
            "Restored {} classifier: {} layer(s), hidden size {}",
            model_type,
            layers.len(),
            hidden_size
        );

        Ok(Self {
            model_type,
            hidden_size,
            layers,
            fc_weight: fc.row(0).to_owned(),
            fc_bias: fc_bias[0],
        })
    }

    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    fn gru_step(&self, layer: &RecurrentLayer, x: &Array1<f32>, h: &Array1<f32>) -> Array1<f32> {
        let hs = self.hidden_size;
        let gi = layer.weight_ih.dot(x) + &layer.bias_ih;
        let gh = layer.weight_hh.dot(h) + &layer.bias_hh;

        Array1::from_shape_fn(hs, |j| {
            let r = sigmoid(gi[j] + gh[j]);
            let z = sigmoid(gi[hs + j] + gh[hs + j]);
            let n = (gi[2 * hs + j] + r * gh[2 * hs + j]).tanh();
            (1.0 - z) * n + z * h[j]
        })
    }

    fn lstm_step(
        &self,
        layer: &RecurrentLayer,
        x: &Array1<f32>,
        h: &Array1<f32>,
        c: &Array1<f32>,
    ) -> (Array1<f32>, Array1<f32>) {
        let hs = self.hidden_size;
        let gates = layer.weight_ih.dot(x) + &layer.bias_ih + layer.weight_hh.dot(h) + &layer.bias_hh;

        let next_c = Array1::from_shape_fn(hs, |j| {
            let i = sigmoid(gates[j]);
            let f = sigmoid(gates[hs + j]);
            let g = gates[2 * hs + j].tanh();
            f * c[j] + i * g
        });
        let next_h = Array1::from_shape_fn(hs, |j| sigmoid(gates[3 * hs + j]) * next_c[j].tanh());
        (next_h, next_c)
    }

    /// Seizure probability for one standardized window
    pub fn forward(&self, sequence: &[f32]) -> f32 {
        let mut hidden = vec![Array1::<f32>::zeros(self.hidden_size); self.layers.len()];
        let mut cell = vec![Array1::<f32>::zeros(self.hidden_size); self.layers.len()];

        for &value in sequence {
            let mut x = Array1::from_elem(1, value);
            for (k, layer) in self.layers.iter().enumerate() {
                match self.model_type {
                    ModelType::Gru => {
                        hidden[k] = self.gru_step(layer, &x, &hidden[k]);
                    }
                    ModelType::Lstm => {
                        let (h, c) = self.lstm_step(layer, &x, &hidden[k], &cell[k]);
                        hidden[k] = h;
                        cell[k] = c;
                    }
                }
                x = hidden[k].clone();
            }
        }

        let last = hidden
            .last()
            .cloned()
            .unwrap_or_else(|| Array1::zeros(self.hidden_size));
        sigmoid(self.fc_weight.dot(&last) + self.fc_bias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn checkpoint(value: serde_json::Value) -> Checkpoint {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_model_type_parsing() {
        assert_eq!("GRU".parse::<ModelType>().unwrap(), ModelType::Gru);
        assert_eq!(" lstm ".parse::<ModelType>().unwrap(), ModelType::Lstm);
        assert!("transformer".parse::<ModelType>().is_err());
    }

    #[test]
    fn test_zero_weights_yield_sigmoid_of_bias() {
        let ckpt = checkpoint(json!({
            "model_type": "gru",
            "state_dict": {
                "gru.weight_ih_l0": [[0.0], [0.0], [0.0], [0.0], [0.0], [0.0]],
                "gru.weight_hh_l0": [[0.0, 0.0], [0.0, 0.0], [0.0, 0.0],
                                     [0.0, 0.0], [0.0, 0.0], [0.0, 0.0]],
                "gru.bias_ih_l0": [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                "gru.bias_hh_l0": [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                "fc.weight": [[1.0, 1.0]],
                "fc.bias": [0.7]
            }
        }));
        let model = RecurrentClassifier::from_checkpoint(&ckpt).unwrap();
        assert_eq!(model.hidden_size(), 2);
        assert_eq!(model.num_layers(), 1);

        let p = model.forward(&[1.0, -2.0, 3.0]);
        assert!((p - sigmoid(0.7)).abs() < 1e-6);
    }

    #[test]
    fn test_gru_single_step_matches_hand_computation() {
        // hidden size 1: r, z, n rows
        let ckpt = checkpoint(json!({
            "state_dict": {
                "gru.weight_ih_l0": [[0.5], [-0.3], [0.8]],
                "gru.weight_hh_l0": [[0.1], [0.2], [0.4]],
                "gru.bias_ih_l0": [0.05, 0.1, -0.2],
                "gru.bias_hh_l0": [0.0, -0.1, 0.3],
                "fc.weight": [[2.0]],
                "fc.bias": [-0.5]
            }
        }));
        let model = RecurrentClassifier::from_checkpoint(&ckpt).unwrap();
        assert_eq!(model.model_type(), ModelType::Gru);

        let x = 1.5_f32;
        let r = sigmoid(0.5 * x + 0.05 + 0.0);
        let z = sigmoid(-0.3 * x + 0.1 - 0.1);
        let n = (0.8 * x - 0.2 + r * 0.3).tanh();
        let h = (1.0 - z) * n;
        let expected = sigmoid(2.0 * h - 0.5);

        assert!((model.forward(&[x]) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_lstm_single_step_matches_hand_computation() {
        let ckpt = checkpoint(json!({
            "model_type": "lstm",
            "state_dict": {
                "lstm.weight_ih_l0": [[0.5], [0.25], [-0.4], [1.0]],
                "lstm.weight_hh_l0": [[0.0], [0.0], [0.0], [0.0]],
                "lstm.bias_ih_l0": [0.1, 0.0, 0.2, 0.0],
                "lstm.bias_hh_l0": [0.0, 0.0, 0.0, -0.5],
                "fc.weight": [[1.5]],
                "fc.bias": [0.0]
            }
        }));
        let model = RecurrentClassifier::from_checkpoint(&ckpt).unwrap();

        let x = 0.8_f32;
        let i = sigmoid(0.5 * x + 0.1);
        let g = (-0.4 * x + 0.2).tanh();
        let o = sigmoid(1.0 * x - 0.5);
        let c = i * g;
        let h = o * c.tanh();
        let expected = sigmoid(1.5 * h);

        assert!((model.forward(&[x]) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_two_layer_shapes_are_detected() {
        let ckpt = checkpoint(json!({
            "state_dict": {
                "gru.weight_ih_l0": [[0.1], [0.1], [0.1]],
                "gru.weight_hh_l0": [[0.1], [0.1], [0.1]],
                "gru.bias_ih_l0": [0.0, 0.0, 0.0],
                "gru.bias_hh_l0": [0.0, 0.0, 0.0],
                "gru.weight_ih_l1": [[0.1], [0.1], [0.1]],
                "gru.weight_hh_l1": [[0.1], [0.1], [0.1]],
                "gru.bias_ih_l1": [0.0, 0.0, 0.0],
                "gru.bias_hh_l1": [0.0, 0.0, 0.0],
                "fc.weight": [[1.0]],
                "fc.bias": [0.0]
            }
        }));
        let model = RecurrentClassifier::from_checkpoint(&ckpt).unwrap();
        assert_eq!(model.num_layers(), 2);
        let p = model.forward(&[0.5, -0.5, 1.0]);
        assert!(p > 0.0 && p < 1.0);
    }

    #[test]
    fn test_missing_and_misshapen_tensors_are_rejected() {
        let missing_fc = checkpoint(json!({
            "state_dict": {
                "gru.weight_ih_l0": [[0.1], [0.1], [0.1]],
                "gru.weight_hh_l0": [[0.1], [0.1], [0.1]],
                "gru.bias_ih_l0": [0.0, 0.0, 0.0],
                "gru.bias_hh_l0": [0.0, 0.0, 0.0]
            }
        }));
        let err = RecurrentClassifier::from_checkpoint(&missing_fc).unwrap_err();
        assert!(err.to_string().contains("fc.weight"));

        let wide_input = checkpoint(json!({
            "state_dict": {
                "gru.weight_ih_l0": [[0.1, 0.2], [0.1, 0.2], [0.1, 0.2]],
                "gru.weight_hh_l0": [[0.1], [0.1], [0.1]],
                "gru.bias_ih_l0": [0.0, 0.0, 0.0],
                "gru.bias_hh_l0": [0.0, 0.0, 0.0],
                "fc.weight": [[1.0]],
                "fc.bias": [0.0]
            }
        }));
        let err = RecurrentClassifier::from_checkpoint(&wide_input).unwrap_err();
        assert!(err.to_string().contains("single input feature"));

        assert!(Checkpoint::from_slice(b"not json").is_err());
    }
}
