use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use seizure_rs::{extract_column_names, read_ground_truth_headers, XLSX_CONTENT_TYPE};
use std::sync::Arc;
use tracing::info;

use super::form::{parse_datetime, parse_window_length, UploadForm};
use crate::analysis::{decode_uploads, run_analysis, AnalysisRequest};
use crate::error::ApiError;
use crate::state::ServerState;

/// Classifies the uploaded recordings and returns the predicted seizure
/// intervals as an XLSX attachment.
pub async fn process_edf(
    State(state): State<Arc<ServerState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let window_length = parse_window_length(form.window_length.as_deref())?;

    let uploads = form.take_uploads();
    if uploads.is_empty() {
        return Err(ApiError::BadRequest(
            "Please upload at least one EDF file.".to_string(),
        ));
    }

    let analysis_start = parse_datetime(form.analysis_start.as_deref())?;
    let analysis_end = parse_datetime(form.analysis_end.as_deref())?;
    if let (Some(start), Some(end)) = (analysis_start, analysis_end) {
        if start > end {
            return Err(ApiError::BadRequest(
                "Analysis start must be before end time.".to_string(),
            ));
        }
    }

    let ground_truth_headers = match form.gt_excel.take() {
        Some(bytes) => Some(read_ground_truth_headers(&bytes).map_err(|e| {
            ApiError::BadRequest(format!("Failed to read ground-truth workbook: {}", e))
        })?),
        None => None,
    };
    let columns = extract_column_names(ground_truth_headers.as_deref());

    let recordings = tokio::task::spawn_blocking(move || decode_uploads(uploads)).await??;
    if recordings.is_empty() {
        return Err(ApiError::BadRequest(
            "No valid EDF data found in the upload.".to_string(),
        ));
    }

    let engine = state.engine()?;
    let request = AnalysisRequest {
        window_length,
        analysis_start,
        analysis_end,
        columns,
    };
    let file_count = recordings.len();
    let export =
        tokio::task::spawn_blocking(move || run_analysis(&engine, recordings, &request)).await??;

    info!(
        "Processed {} file(s): {} interval(s) written to {}",
        file_count, export.interval_count, export.file_name
    );

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&export.file_name)),
        ],
        export.workbook,
    )
        .into_response())
}

/// `attachment` disposition with a header-safe quoted filename
pub fn content_disposition(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_is_header_safe() {
        assert_eq!(
            content_disposition("night_01_predictions.xlsx"),
            "attachment; filename=\"night_01_predictions.xlsx\""
        );
        assert_eq!(
            content_disposition("pat\"ient é_predictions.xlsx"),
            "attachment; filename=\"pat_ient __predictions.xlsx\""
        );
    }
}
