use axum::{extract::Multipart, Json};
use tracing::info;

use super::form::UploadForm;
use crate::analysis::{collect_ranges, decode_uploads, RangesResponse};
use crate::error::ApiError;

/// Reports the time span covered by each uploaded EDF file
pub async fn get_available_ranges(multipart: Multipart) -> Result<Json<RangesResponse>, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let uploads = form.take_uploads();
    if uploads.is_empty() {
        return Err(ApiError::BadRequest(
            "Please upload at least one EDF file.".to_string(),
        ));
    }

    let ranges = tokio::task::spawn_blocking(move || {
        let recordings = decode_uploads(uploads)?;
        collect_ranges(&recordings)
    })
    .await??;

    info!(
        "Ranges for {} file(s): {} .. {}",
        ranges.files.len(),
        ranges.overall_start,
        ranges.overall_end
    );
    Ok(Json(ranges))
}
