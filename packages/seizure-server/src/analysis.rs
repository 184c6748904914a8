//! Upload decoding and the range / prediction flows shared by the HTTP
//! handlers and the offline CLI commands. Everything here is blocking.

use axum::body::Bytes;
use chrono::NaiveDateTime;
use seizure_rs::{
    export_file_name, file_range, load_recording_from_bytes, predict_recordings,
    summarize_ranges, to_iso_seconds, write_workbook, ColumnNames, InferenceEngine,
    NamedRecording, RangeSummary,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;

/// Raw EDF part as received, before decoding
#[derive(Debug, Clone)]
pub struct EdfUpload {
    pub name: Option<String>,
    pub bytes: Bytes,
}

/// Decodes uploads in submission order.
///
/// Parts whose name does not end in `.edf` and empty parts are skipped; a part
/// that fails to parse rejects the whole request.
pub fn decode_uploads(uploads: Vec<EdfUpload>) -> Result<Vec<NamedRecording>, ApiError> {
    let mut recordings = Vec::with_capacity(uploads.len());

    for (idx, upload) in uploads.into_iter().enumerate() {
        let order = idx + 1;
        let name = upload
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("file_{}", order));

        if !name.to_lowercase().ends_with(".edf") {
            debug!("Skipping non-EDF upload '{}'", name);
            continue;
        }
        if upload.bytes.is_empty() {
            debug!("Skipping empty upload '{}'", name);
            continue;
        }

        let recording = load_recording_from_bytes(&upload.bytes).map_err(|e| {
            ApiError::BadRequest(format!("Failed to read EDF file '{}': {}", name, e))
        })?;
        debug!(
            "Decoded '{}': channel '{}', {} samples at {} Hz",
            name,
            recording.channel_label,
            recording.len(),
            recording.sample_rate
        );

        recordings.push(NamedRecording {
            name,
            order,
            recording,
        });
    }

    Ok(recordings)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRangeResponse {
    pub name: String,
    pub start: String,
    pub end: String,
}

/// Available analysis window of an upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangesResponse {
    pub files: Vec<FileRangeResponse>,
    pub overall_start: String,
    pub overall_end: String,
}

impl From<RangeSummary> for RangesResponse {
    fn from(summary: RangeSummary) -> Self {
        Self {
            files: summary
                .files
                .iter()
                .map(|f| FileRangeResponse {
                    name: f.name.clone(),
                    start: to_iso_seconds(&f.start),
                    end: to_iso_seconds(&f.end),
                })
                .collect(),
            overall_start: to_iso_seconds(&summary.overall_start),
            overall_end: to_iso_seconds(&summary.overall_end),
        }
    }
}

/// Time bounds of every recording that has samples and a measurement start
pub fn collect_ranges(recordings: &[NamedRecording]) -> Result<RangesResponse, ApiError> {
    let ranges = recordings
        .iter()
        .filter_map(|entry| file_range(&entry.name, &entry.recording))
        .collect();

    summarize_ranges(ranges).map(RangesResponse::from).ok_or_else(|| {
        ApiError::BadRequest("No EDF files with valid measurement timestamps were found.".to_string())
    })
}

/// Parameters of one prediction run
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub window_length: usize,
    pub analysis_start: Option<NaiveDateTime>,
    pub analysis_end: Option<NaiveDateTime>,
    pub columns: ColumnNames,
}

/// Finished workbook and its download name
#[derive(Debug, Clone)]
pub struct AnalysisExport {
    pub file_name: String,
    pub workbook: Vec<u8>,
    pub interval_count: usize,
}

pub fn run_analysis(
    engine: &InferenceEngine,
    recordings: Vec<NamedRecording>,
    request: &AnalysisRequest,
) -> Result<AnalysisExport, ApiError> {
    let results = predict_recordings(
        engine,
        recordings,
        request.window_length,
        request.analysis_start,
        request.analysis_end,
    )?;

    if results.is_empty() {
        return Err(ApiError::BadRequest(
            "No samples matched the selected analysis window.".to_string(),
        ));
    }

    let workbook = write_workbook(&results, &request.columns)
        .map_err(|e| ApiError::Internal(format!("Failed to write workbook: {}", e)))?;

    Ok(AnalysisExport {
        file_name: export_file_name(&results),
        workbook,
        interval_count: results.iter().map(|r| r.intervals.len()).sum(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use seizure_rs::testing::{labelled_edf, sign_of_last_sample_model};
    use seizure_rs::InferenceSettings;

    fn upload(name: &str, bytes: Vec<u8>) -> EdfUpload {
        EdfUpload {
            name: Some(name.to_string()),
            bytes: Bytes::from(bytes),
        }
    }

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(6, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_decode_skips_foreign_and_empty_parts() {
        let edf = labelled_edf(4, 10, &[], 10, Some(start())).unwrap();
        let decoded = decode_uploads(vec![
            upload("notes.txt", b"hello".to_vec()),
            upload("empty.edf", vec![]),
            upload("NIGHT.EDF", edf),
        ])
        .unwrap();

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].name, "NIGHT.EDF");
        assert_eq!(decoded[0].order, 3);
    }

    #[test]
    fn test_decode_rejects_corrupt_edf() {
        let err = decode_uploads(vec![upload("broken.edf", vec![b'0'; 300])]).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert!(err.to_string().starts_with("Failed to read EDF file 'broken.edf': "));
    }

    #[test]
    fn test_ranges_need_a_measurement_start() {
        let undated = decode_uploads(vec![upload(
            "a.edf",
            labelled_edf(2, 10, &[], 10, None).unwrap(),
        )])
        .unwrap();
        assert!(collect_ranges(&undated).is_err());

        let dated = decode_uploads(vec![upload(
            "b.edf",
            labelled_edf(3, 10, &[], 10, Some(start())).unwrap(),
        )])
        .unwrap();
        let ranges = collect_ranges(&dated).unwrap();
        assert_eq!(ranges.overall_start, "2024-02-29T06:30:00");
        assert_eq!(ranges.files[0].end, "2024-02-29T06:30:02");
    }

    #[test]
    fn test_analysis_reports_empty_selection() {
        let engine = InferenceEngine::new(sign_of_last_sample_model(), InferenceSettings::default());
        let recordings = decode_uploads(vec![upload(
            "c.edf",
            labelled_edf(5, 10, &[1, 2], 10, Some(start())).unwrap(),
        )])
        .unwrap();

        let mut request = AnalysisRequest {
            window_length: 10,
            analysis_start: None,
            analysis_end: None,
            columns: ColumnNames::default(),
        };
        let export = run_analysis(&engine, recordings.clone(), &request).unwrap();
        assert_eq!(export.file_name, "c_predictions.xlsx");
        assert_eq!(export.interval_count, 1);

        request.analysis_start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0);
        let err = run_analysis(&engine, recordings, &request).unwrap_err();
        assert_eq!(err.to_string(), "No samples matched the selected analysis window.");
    }
}
