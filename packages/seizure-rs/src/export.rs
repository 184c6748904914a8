use crate::error::{Result, SeizureError};
use crate::types::{ColumnNames, FileIntervals};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::{Format, FormatBorder, Workbook};
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const START_TIME_KEYS: [&str; 4] = ["Start time", "Start Time", "start time", "start time "];
pub const END_TIME_KEYS: [&str; 4] = ["End time", "End Time", "end time", "end time "];

const MAX_SHEET_NAME_CHARS: usize = 31;
const FORBIDDEN_SHEET_CHARS: [char; 7] = ['\\', '/', '[', ']', ':', '*', '?'];

/// Picks the start/end headers to mirror from a ground-truth sheet.
///
/// Both a start and an end key must be present, otherwise the canonical
/// `Start time` / `End time` pair is used.
pub fn extract_column_names(headers: Option<&[String]>) -> ColumnNames {
    let Some(headers) = headers else {
        return ColumnNames::default();
    };

    let find = |keys: &[&str]| {
        keys.iter()
            .find(|key| headers.iter().any(|h| h == *key))
            .map(|key| key.to_string())
    };

    match (find(&START_TIME_KEYS), find(&END_TIME_KEYS)) {
        (Some(start), Some(end)) => ColumnNames { start, end },
        _ => ColumnNames::default(),
    }
}

/// Header row of the first worksheet of an `.xlsx` / `.xls` / `.ods` upload
pub fn read_ground_truth_headers(bytes: &[u8]) -> Result<Vec<String>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SeizureError::Spreadsheet("workbook has no worksheets".to_string()))??;

    let headers = range
        .rows()
        .next()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::String(s) => s.clone(),
                    Data::Empty => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(headers)
}

/// File stem of an uploaded name, or `fallback` when there is none
pub fn base_filename(original_name: Option<&str>, fallback: &str) -> String {
    original_name
        .and_then(|name| Path::new(name).file_stem())
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

// Excel compares sheet names case-insensitively
fn is_taken(candidate: &str, used: &HashSet<String>) -> bool {
    let candidate = candidate.to_lowercase();
    used.iter().any(|name| name.to_lowercase() == candidate)
}

/// Excel-safe, unique (against `used`) sheet name of at most 31 characters
pub fn make_sheet_name(filename: Option<&str>, idx: usize, used: &HashSet<String>) -> String {
    let fallback = format!("File{}", idx);
    let mut base: String = base_filename(filename, &fallback)
        .chars()
        .map(|c| if FORBIDDEN_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    // Excel also rejects names that begin or end with an apostrophe
    if base.starts_with('\'') {
        base.replace_range(..1, "_");
    }
    if base.ends_with('\'') {
        let last = base.len() - 1;
        base.replace_range(last.., "_");
    }

    let mut candidate = truncate_chars(&base, MAX_SHEET_NAME_CHARS);
    if candidate.is_empty() {
        candidate = fallback.clone();
    }

    let mut suffix = 1;
    while is_taken(&candidate, used) {
        let suffix_str = format!("_{}", suffix);
        let room = MAX_SHEET_NAME_CHARS.saturating_sub(suffix_str.chars().count());
        let stem = if room > 0 {
            truncate_chars(&base, room)
        } else {
            fallback.clone()
        };
        candidate = format!("{}{}", stem, suffix_str);
        suffix += 1;
    }

    candidate
}

/// Download name for the exported workbook
pub fn export_file_name(results: &[FileIntervals]) -> String {
    let stem = match results {
        [single] => base_filename(Some(&single.name), "predictions"),
        _ => "batch".to_string(),
    };
    format!("{}_predictions.xlsx", stem)
}

/// Writes predicted intervals to an XLSX workbook.
///
/// A single result lands on the default `Sheet1`; several results get one
/// sheet per file.
pub fn write_workbook(results: &[FileIntervals], columns: &ColumnNames) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold().set_border(FormatBorder::Thin);
    let mut used_sheet_names = HashSet::new();

    for (idx, result) in results.iter().enumerate() {
        let worksheet = workbook.add_worksheet();
        if results.len() > 1 {
            let name = make_sheet_name(Some(&result.name), idx + 1, &used_sheet_names);
            worksheet.set_name(&name)?;
            used_sheet_names.insert(name);
        }

        worksheet.write_string_with_format(0, 0, &columns.start, &header_format)?;
        worksheet.write_string_with_format(0, 1, &columns.end, &header_format)?;
        for (row, interval) in result.intervals.iter().enumerate() {
            let row = row as u32 + 1;
            worksheet.write_string(row, 0, &interval.start)?;
            worksheet.write_string(row, 1, &interval.end)?;
        }
        worksheet.set_column_width(0, 22)?;
        worksheet.set_column_width(1, 22)?;
    }

    Ok(workbook.save_to_buffer()?)
}
