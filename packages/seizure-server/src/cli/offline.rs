use anyhow::{bail, Context};
use axum::body::Bytes;
use seizure_rs::{extract_column_names, read_ground_truth_headers, ColumnNames, InferenceEngine};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::PredictArgs;
use crate::analysis::{
    collect_ranges, decode_uploads, run_analysis, AnalysisRequest, EdfUpload, RangesResponse,
};
use crate::config::ServerConfig;
use crate::handlers::{parse_datetime, parse_window_length};

fn read_uploads(files: &[PathBuf]) -> anyhow::Result<Vec<EdfUpload>> {
    files
        .iter()
        .map(|path| {
            let bytes =
                fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(EdfUpload {
                name: path
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string()),
                bytes: Bytes::from(bytes),
            })
        })
        .collect()
}

fn ground_truth_columns(path: Option<&Path>) -> anyhow::Result<ColumnNames> {
    let Some(path) = path else {
        return Ok(ColumnNames::default());
    };
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let headers = read_ground_truth_headers(&bytes)
        .with_context(|| format!("Failed to read ground-truth workbook {}", path.display()))?;
    Ok(extract_column_names(Some(&headers)))
}

/// Time ranges of local EDF files
pub fn ranges(files: &[PathBuf]) -> anyhow::Result<RangesResponse> {
    let recordings = decode_uploads(read_uploads(files)?)?;
    Ok(collect_ranges(&recordings)?)
}

/// Classifies local EDF files and writes the workbook, returning its path
pub fn predict(config: &ServerConfig, args: &PredictArgs) -> anyhow::Result<PathBuf> {
    let window_length = parse_window_length(Some(&args.window_length.to_string()))?;
    let analysis_start = parse_datetime(args.start.as_deref())?;
    let analysis_end = parse_datetime(args.end.as_deref())?;
    if let (Some(start), Some(end)) = (analysis_start, analysis_end) {
        if start > end {
            bail!("Analysis start must be before end time.");
        }
    }
    let columns = ground_truth_columns(args.ground_truth.as_deref())?;

    let recordings = decode_uploads(read_uploads(&args.files)?)?;
    if recordings.is_empty() {
        bail!("No valid EDF data found in the input files.");
    }

    let (model_path, expected) = match &args.model {
        Some(path) => (path.clone(), None),
        None => (config.model_path.clone(), Some(config.model_type)),
    };
    let engine = InferenceEngine::load(&model_path, expected, config.inference_settings())
        .with_context(|| format!("Model checkpoint unavailable: {}", model_path.display()))?;

    let request = AnalysisRequest {
        window_length,
        analysis_start,
        analysis_end,
        columns,
    };
    let export = run_analysis(&engine, recordings, &request)?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&export.file_name));
    fs::write(&output, &export.workbook)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(
        "{} interval(s) written to {}",
        export.interval_count,
        output.display()
    );

    Ok(output)
}
