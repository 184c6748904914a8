use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO-8601 layout with second precision, as returned to the UI
pub const ISO_SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Layout used for interval timestamps in exported workbooks
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Single data channel extracted from an EDF upload
#[derive(Debug, Clone)]
pub struct Recording {
    pub channel_label: String,
    pub signal: Vec<f64>,
    /// Offset of every sample from the start of the recording, in seconds
    pub times: Vec<f64>,
    pub sample_rate: f64,
    /// Measurement start (naive UTC), when the header carries a valid one
    pub meas_start: Option<NaiveDateTime>,
}

impl Recording {
    pub fn len(&self) -> usize {
        self.signal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signal.is_empty()
    }

    pub fn duration(&self) -> f64 {
        self.signal.len() as f64 / self.sample_rate
    }
}

/// Window classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "Seizure")]
    Seizure,
    #[serde(rename = "Non-Seizure")]
    NonSeizure,
}

impl Label {
    pub fn is_seizure(&self) -> bool {
        matches!(self, Label::Seizure)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Seizure => write!(f, "Seizure"),
            Label::NonSeizure => write!(f, "Non-Seizure"),
        }
    }
}

/// Model output for one window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Label,
    pub probability: f32,
}

/// Contiguous run of seizure windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start_offset: f64,
    pub end_offset: f64,
    pub start: String,
    pub end: String,
}

/// Available time bounds of one uploaded file
#[derive(Debug, Clone, PartialEq)]
pub struct FileRange {
    pub name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Bounds across every file of an upload
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSummary {
    pub files: Vec<FileRange>,
    pub overall_start: NaiveDateTime,
    pub overall_end: NaiveDateTime,
}

/// Predicted intervals for one file
#[derive(Debug, Clone, PartialEq)]
pub struct FileIntervals {
    pub name: String,
    pub intervals: Vec<Interval>,
}

/// Start/end header pair written to exported sheets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub start: String,
    pub end: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            start: "Start time".to_string(),
            end: "End time".to_string(),
        }
    }
}

pub fn to_iso_seconds(ts: &NaiveDateTime) -> String {
    ts.format(ISO_SECONDS_FORMAT).to_string()
}
