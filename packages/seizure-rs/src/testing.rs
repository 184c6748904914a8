//! Synthetic checkpoints and recordings with predictable classifications.

use crate::edf::write_single_channel;
use crate::error::Result;
use crate::model::{Checkpoint, RecurrentClassifier};
use chrono::NaiveDateTime;

/// One-unit GRU whose update gate is pinned shut, so the final hidden state is
/// `tanh(5 * x_last)`. A window is a seizure exactly when its last sample lies
/// above the window mean.
pub const SIGN_OF_LAST_SAMPLE_CHECKPOINT: &str = r#"{
  "model_type": "gru",
  "state_dict": {
    "gru.weight_ih_l0": [[0.0], [0.0], [5.0]],
    "gru.weight_hh_l0": [[0.0], [0.0], [0.0]],
    "gru.bias_ih_l0": [0.0, -20.0, 0.0],
    "gru.bias_hh_l0": [0.0, 0.0, 0.0],
    "fc.weight": [[10.0]],
    "fc.bias": [0.0]
  }
}"#;

pub fn sign_of_last_sample_model() -> RecurrentClassifier {
    let checkpoint = Checkpoint::from_slice(SIGN_OF_LAST_SAMPLE_CHECKPOINT.as_bytes())
        .expect("fixture checkpoint is valid JSON");
    RecurrentClassifier::from_checkpoint(&checkpoint).expect("fixture checkpoint is well formed")
}

/// Signal made of `window_length`-sample ramps: rising ramps for the window
/// indices in `seizure_windows`, falling ramps elsewhere.
pub fn labelled_ramps(num_windows: usize, window_length: usize, seizure_windows: &[usize]) -> Vec<f64> {
    (0..num_windows)
        .flat_map(|w| {
            let rising = seizure_windows.contains(&w);
            (0..window_length).map(move |i| {
                let step = if rising { i } else { window_length - 1 - i };
                step as f64 * 10.0 - 50.0
            })
        })
        .collect()
}

/// Single-channel EDF bytes containing [`labelled_ramps`]
pub fn labelled_edf(
    num_windows: usize,
    window_length: usize,
    seizure_windows: &[usize],
    sample_rate: usize,
    start: Option<NaiveDateTime>,
) -> Result<Vec<u8>> {
    let signal = labelled_ramps(num_windows, window_length, seizure_windows);
    write_single_channel("EEG Fp1-F7", &signal, sample_rate, start)
}
