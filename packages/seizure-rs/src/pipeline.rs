use crate::error::{Result, SeizureError};
use crate::inference::InferenceEngine;
use crate::intervals::build_prediction_intervals;
use crate::segment::{filter_by_range, offset_to_datetime, segment_signal};
use crate::types::{FileIntervals, FileRange, RangeSummary, Recording};
use chrono::NaiveDateTime;

/// A decoded upload together with its original name and position
#[derive(Debug, Clone)]
pub struct NamedRecording {
    pub name: String,
    pub order: usize,
    pub recording: Recording,
}

/// Time span covered by a recording, if it has samples and a measurement start
pub fn file_range(name: &str, recording: &Recording) -> Option<FileRange> {
    let meas_start = recording.meas_start?;
    let first = *recording.times.first()?;
    let last = *recording.times.last()?;

    Some(FileRange {
        name: name.to_string(),
        start: offset_to_datetime(meas_start, first)?,
        end: offset_to_datetime(meas_start, last)?,
    })
}

/// Earliest start and latest end across all files
pub fn summarize_ranges(files: Vec<FileRange>) -> Option<RangeSummary> {
    let overall_start = files.iter().map(|f| f.start).min()?;
    let overall_end = files.iter().map(|f| f.end).max()?;

    Some(RangeSummary {
        files,
        overall_start,
        overall_end,
    })
}

/// Chronological order: recordings with a measurement start first, ties by upload order
pub fn sort_chronologically(recordings: &mut [NamedRecording]) {
    recordings.sort_by_key(|entry| {
        (
            entry.recording.meas_start.is_none(),
            entry.recording.meas_start.unwrap_or(NaiveDateTime::MAX),
            entry.order,
        )
    });
}

/// Filters, segments and classifies every recording.
///
/// Recordings without samples in the requested range, or too short for a
/// single window, are left out of the result.
pub fn predict_recordings(
    engine: &InferenceEngine,
    mut recordings: Vec<NamedRecording>,
    window_length: usize,
    analysis_start: Option<NaiveDateTime>,
    analysis_end: Option<NaiveDateTime>,
) -> Result<Vec<FileIntervals>> {
    if window_length == 0 {
        return Err(SeizureError::InvalidParameter(
            "window_length must be at least 1".to_string(),
        ));
    }

    sort_chronologically(&mut recordings);

    let mut results = Vec::new();
    for entry in &recordings {
        let slice = filter_by_range(&entry.recording, analysis_start, analysis_end);
        if slice.is_empty() {
            log::info!("{}: no samples in the selected range", entry.name);
            continue;
        }

        let windows = segment_signal(slice.signal, window_length)?;
        if windows.is_empty() {
            log::info!(
                "{}: {} samples is shorter than one {}-sample window",
                entry.name,
                slice.signal.len(),
                window_length
            );
            continue;
        }

        let predictions = engine.predict_windows(&windows);
        let intervals = build_prediction_intervals(
            &predictions,
            slice.times,
            window_length,
            entry.recording.meas_start,
        );
        log::info!(
            "{}: {} windows, {} seizure interval(s)",
            entry.name,
            windows.len(),
            intervals.len()
        );

        results.push(FileIntervals {
            name: entry.name.clone(),
            intervals,
        });
    }

    Ok(results)
}
