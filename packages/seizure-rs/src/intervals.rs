use crate::segment::offset_to_datetime;
use crate::types::{Interval, Prediction, EXPORT_TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;

/// Renders an offset either as a wall-clock timestamp or, lacking a
/// measurement start (or past the representable date range), as seconds
/// with two decimals.
pub fn format_timestamp(meas_start: Option<NaiveDateTime>, seconds_offset: f64) -> String {
    match meas_start.and_then(|start| offset_to_datetime(start, seconds_offset)) {
        Some(ts) => ts.format(EXPORT_TIMESTAMP_FORMAT).to_string(),
        None => format!("{:.2}", seconds_offset),
    }
}

/// Half-open `[start, end)` window index runs of consecutive seizure predictions
pub fn seizure_runs(predictions: &[Prediction]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut active_start: Option<usize> = None;

    for (idx, prediction) in predictions.iter().enumerate() {
        match (prediction.label.is_seizure(), active_start) {
            (true, None) => active_start = Some(idx),
            (false, Some(start)) => {
                runs.push((start, idx));
                active_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = active_start {
        runs.push((start, predictions.len()));
    }

    runs
}

/// Converts per-window predictions into timed seizure intervals.
///
/// `times` are the sample offsets (seconds) of the analysed slice; the sample
/// interval is taken from its first two entries, defaulting to one second.
pub fn build_prediction_intervals(
    predictions: &[Prediction],
    times: &[f64],
    window_length: usize,
    meas_start: Option<NaiveDateTime>,
) -> Vec<Interval> {
    let sample_interval = if times.len() > 1 {
        times[1] - times[0]
    } else {
        1.0
    };
    let window_duration = window_length as f64 * sample_interval;
    let window_start_time = times.first().copied().unwrap_or(0.0);

    seizure_runs(predictions)
        .into_iter()
        .map(|(start_idx, end_idx)| {
            let start_offset = window_start_time + start_idx as f64 * window_duration;
            let end_offset = window_start_time + end_idx as f64 * window_duration;
            Interval {
                start_offset,
                end_offset,
                start: format_timestamp(meas_start, start_offset),
                end: format_timestamp(meas_start, end_offset),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Label;
    use chrono::NaiveDate;

    fn preds(pattern: &str) -> Vec<Prediction> {
        pattern
            .chars()
            .map(|c| Prediction {
                label: if c == 'S' { Label::Seizure } else { Label::NonSeizure },
                probability: if c == 'S' { 0.9 } else { 0.1 },
            })
            .collect()
    }

    #[test]
    fn test_runs_close_at_boundaries() {
        assert_eq!(seizure_runs(&preds("NSSNSN")), vec![(1, 3), (4, 5)]);
        assert_eq!(seizure_runs(&preds("SSNSS")), vec![(0, 2), (3, 5)]);
        assert!(seizure_runs(&preds("NNN")).is_empty());
        assert!(seizure_runs(&[]).is_empty());
    }

    #[test]
    fn test_intervals_without_meas_start_are_seconds() {
        // 4 Hz, 8-sample windows => 2 s per window, slice starting at 10 s
        let times: Vec<f64> = (0..40).map(|i| 10.0 + i as f64 * 0.25).collect();
        let intervals = build_prediction_intervals(&preds("NSSNS"), &times, 8, None);
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].start, "12.00");
        assert_eq!(intervals[0].end, "16.00");
        assert_eq!(intervals[1].start, "18.00");
        assert_eq!(intervals[1].end, "20.00");
    }

    #[test]
    fn test_intervals_with_meas_start_are_timestamps() {
        let start = NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        let times: Vec<f64> = (0..120).map(|i| i as f64).collect();
        let intervals = build_prediction_intervals(&preds("NS"), &times, 60, Some(start));
        assert_eq!(intervals[0].start, "01/01/2024 00:00:00");
        assert_eq!(intervals[0].end, "01/01/2024 00:01:00");
    }

    #[test]
    fn test_single_sample_falls_back_to_one_second() {
        let intervals = build_prediction_intervals(&preds("S"), &[3.0], 1, None);
        assert_eq!(intervals[0].start, "3.00");
        assert_eq!(intervals[0].end, "4.00");
    }
}
