use crate::error::{Result, SeizureError};
use crate::types::Recording;
use chrono::{Duration, NaiveDateTime};

/// Splits `signal` into non-overlapping windows of `window_length` samples.
///
/// Trailing samples that do not fill a whole window are dropped.
pub fn segment_signal(signal: &[f64], window_length: usize) -> Result<Vec<&[f64]>> {
    if window_length == 0 {
        return Err(SeizureError::InvalidParameter(
            "window_length must be at least 1".to_string(),
        ));
    }

    Ok(signal.chunks_exact(window_length).collect())
}

/// Absolute time of an offset in seconds, `None` past the representable range
pub(crate) fn offset_to_datetime(
    meas_start: NaiveDateTime,
    seconds: f64,
) -> Option<NaiveDateTime> {
    if !seconds.is_finite() {
        return None;
    }
    meas_start.checked_add_signed(Duration::microseconds((seconds * 1_000_000.0).round() as i64))
}

/// Samples of a recording whose absolute time falls inside the requested bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalSlice<'a> {
    pub signal: &'a [f64],
    pub times: &'a [f64],
}

impl SignalSlice<'_> {
    pub fn is_empty(&self) -> bool {
        self.signal.is_empty() || self.times.is_empty()
    }
}

/// Restricts a recording to `[start, end]` (inclusive, each bound optional).
///
/// Without bounds the full recording is returned. With a bound but no
/// measurement start there is nothing to align against, so the slice is empty.
pub fn filter_by_range(
    recording: &Recording,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> SignalSlice<'_> {
    if start.is_none() && end.is_none() {
        return SignalSlice {
            signal: &recording.signal,
            times: &recording.times,
        };
    }

    let Some(meas_start) = recording.meas_start else {
        return SignalSlice {
            signal: &[],
            times: &[],
        };
    };

    // Times are monotonic, so the mask is a single contiguous run
    let in_range = |t: &f64| {
        offset_to_datetime(meas_start, *t).is_some_and(|ts| {
            start.map_or(true, |s| ts >= s) && end.map_or(true, |e| ts <= e)
        })
    };
    let first = recording.times.iter().position(in_range);
    let Some(first) = first else {
        return SignalSlice {
            signal: &[],
            times: &[],
        };
    };
    let last = recording.times[first..]
        .iter()
        .position(|t| !in_range(t))
        .map_or(recording.times.len(), |n| first + n);

    let last = last.min(recording.signal.len());
    SignalSlice {
        signal: &recording.signal[first..last],
        times: &recording.times[first..last],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn recording(samples: usize, rate: f64, meas_start: Option<NaiveDateTime>) -> Recording {
        Recording {
            channel_label: "EEG".to_string(),
            signal: (0..samples).map(|i| i as f64).collect(),
            times: (0..samples).map(|i| i as f64 / rate).collect(),
            sample_rate: rate,
            meas_start,
        }
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_segment_drops_remainder() {
        let signal: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let windows = segment_signal(&signal, 3).unwrap();
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[2], &[6.0, 7.0, 8.0]);

        assert!(segment_signal(&signal, 11).unwrap().is_empty());
        assert!(segment_signal(&signal, 0).is_err());
    }

    #[test]
    fn test_offset_past_date_range_is_none() {
        let start = at(0, 0, 0);
        assert_eq!(
            offset_to_datetime(start, 1.5),
            Some(at(0, 0, 1) + Duration::milliseconds(500))
        );
        assert!(offset_to_datetime(start, 1e13).is_none());
        assert!(offset_to_datetime(start, f64::INFINITY).is_none());
        assert!(offset_to_datetime(start, f64::NAN).is_none());
    }

    #[test]
    fn test_filter_skips_unrepresentable_offsets() {
        let mut rec = recording(3, 1.0, Some(at(10, 0, 0)));
        rec.times[2] = 1e13;
        let slice = filter_by_range(&rec, Some(at(10, 0, 0)), None);
        assert_eq!(slice.times, &[0.0, 1.0]);
    }

    #[test]
    fn test_filter_without_bounds_keeps_everything() {
        let rec = recording(20, 2.0, None);
        let slice = filter_by_range(&rec, None, None);
        assert_eq!(slice.signal.len(), 20);
    }

    #[test]
    fn test_filter_without_meas_start_is_empty() {
        let rec = recording(20, 2.0, None);
        let slice = filter_by_range(&rec, Some(at(0, 0, 0)), None);
        assert!(slice.is_empty());
    }

    #[test]
    fn test_filter_bounds_are_inclusive() {
        // 1 Hz for 60 s starting at 10:00:00
        let rec = recording(60, 1.0, Some(at(10, 0, 0)));
        let slice = filter_by_range(&rec, Some(at(10, 0, 10)), Some(at(10, 0, 19)));
        assert_eq!(slice.signal.len(), 10);
        assert_eq!(slice.times[0], 10.0);
        assert_eq!(slice.times[9], 19.0);

        let tail = filter_by_range(&rec, Some(at(10, 0, 55)), None);
        assert_eq!(tail.signal.len(), 5);

        let outside = filter_by_range(&rec, Some(at(11, 0, 0)), None);
        assert!(outside.is_empty());
    }
}
