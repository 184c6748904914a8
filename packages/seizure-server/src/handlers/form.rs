use axum::body::Bytes;
use axum::extract::multipart::Field;
use axum::extract::Multipart;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::analysis::EdfUpload;
use crate::error::ApiError;

// Offsets are normalised to UTC and then dropped
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Fields of an upload form. Unknown fields are ignored.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub edf_files: Vec<EdfUpload>,
    pub edf_file: Option<EdfUpload>,
    pub window_length: Option<String>,
    pub analysis_start: Option<String>,
    pub analysis_end: Option<String>,
    pub gt_excel: Option<Bytes>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart data: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();

            match name.as_str() {
                "edf_files" => form.edf_files.push(read_upload(field).await?),
                "edf_file" => form.edf_file = Some(read_upload(field).await?),
                "window_length" => form.window_length = Some(read_text(field).await?),
                "analysis_start" => form.analysis_start = Some(read_text(field).await?),
                "analysis_end" => form.analysis_end = Some(read_text(field).await?),
                "gt_excel" => {
                    let bytes = read_bytes(field).await?;
                    if !bytes.is_empty() {
                        form.gt_excel = Some(bytes);
                    }
                }
                _ => debug!("Ignoring unknown form field '{}'", name),
            }
        }

        Ok(form)
    }

    /// EDF parts in submission order: repeated `edf_files`, then `edf_file`
    pub fn take_uploads(&mut self) -> Vec<EdfUpload> {
        let mut uploads = std::mem::take(&mut self.edf_files);
        uploads.extend(self.edf_file.take());
        uploads
    }
}

async fn read_bytes(field: Field<'_>) -> Result<Bytes, ApiError> {
    field
        .bytes()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))
}

async fn read_upload(field: Field<'_>) -> Result<EdfUpload, ApiError> {
    let name = field.file_name().map(str::to_string);
    let bytes = read_bytes(field).await?;
    Ok(EdfUpload { name, bytes })
}

async fn read_text(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid form field: {}", e)))
}

/// Window length in samples; required and at least 1
pub fn parse_window_length(value: Option<&str>) -> Result<usize, ApiError> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Unprocessable("Field required: window_length".to_string()))?;

    let parsed: i64 = raw.parse().map_err(|_| {
        ApiError::Unprocessable(format!("window_length must be an integer, got '{}'", raw))
    })?;

    usize::try_from(parsed)
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| ApiError::BadRequest("window_length must be at least 1".to_string()))
}

/// Optional ISO-8601 date-time; `""` and `"null"` mean absent
pub fn parse_datetime(value: Option<&str>) -> Result<Option<NaiveDateTime>, ApiError> {
    let raw = match value.map(str::trim) {
        None | Some("") | Some("null") => return Ok(None),
        Some(v) => v,
    };

    let mut normalized = raw.replacen(' ', "T", 1);
    if let Some(stripped) = normalized.strip_suffix(['Z', 'z']) {
        normalized = format!("{}+00:00", stripped);
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Ok(Some(dt.naive_utc()));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Ok(Some(dt));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0));
    }

    Err(ApiError::BadRequest(format!("Invalid date-time value: {}", raw)))
}
