//! EEG seizure-onset prediction: EDF ingestion, fixed-window segmentation,
//! recurrent-network classification and spreadsheet export of the predicted
//! seizure intervals.

pub mod edf;
pub mod error;
pub mod export;
pub mod inference;
pub mod intervals;
pub mod model;
pub mod pipeline;
pub mod segment;
pub mod types;

#[cfg(any(test, feature = "fixtures"))]
pub mod testing;

pub use edf::{load_recording, load_recording_from_bytes, EDFReader, EDFWriter};
pub use error::{Result, SeizureError};
pub use export::{
    export_file_name, extract_column_names, read_ground_truth_headers, write_workbook,
    XLSX_CONTENT_TYPE,
};
pub use inference::{InferenceEngine, InferenceSettings};
pub use model::{Checkpoint, ModelType, RecurrentClassifier};
pub use pipeline::{file_range, predict_recordings, summarize_ranges, NamedRecording};
pub use types::*;
