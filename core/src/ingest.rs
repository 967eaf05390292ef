//! Ingest: raw survey CSV -> cleaned, positionally-identified respondents.
//!
//! Steps, in order:
//!   1. Header cleanup: trim, collapse double spaces, apply column renames.
//!   2. Required-column check (fatal for the batch).
//!   3. Per row: assign `INV###` from the row's position, repair mojibake
//!      in every cell, parse the timestamp.
//!
//! IDs are handed out before any row can be rejected, so a rejected row
//! still consumes its ID and later IDs never shift.

use crate::{
    config::CleaningConfig,
    error::{PortfolioError, PortfolioResult},
    record::RespondentRecord,
    types::investor_id,
};
use chrono::{NaiveDate, NaiveDateTime};
use std::io::Read;
use std::path::Path;

pub const COL_TIMESTAMP: &str = "Timestamp";
pub const COL_NAME: &str = "Name";
pub const COL_INVESTMENT_RANGE: &str = "Investment_Range";
pub const COL_RISK_TOLERANCE: &str = "Risk_Tolerance";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%Y/%m/%d %I:%M:%S %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// A row ingest could not turn into a respondent.
#[derive(Debug)]
pub struct RejectedRow {
    pub row:         usize,
    pub investor_id: String,
    pub error:       PortfolioError,
}

#[derive(Debug, Default)]
pub struct IngestedBatch {
    pub records:  Vec<RespondentRecord>,
    pub rejected: Vec<RejectedRow>,
}

impl IngestedBatch {
    pub fn rows_read(&self) -> usize {
        self.records.len() + self.rejected.len()
    }
}

/// Trim a header and replace each double space with a single one.
pub fn clean_header(raw: &str) -> String {
    raw.trim().replace("  ", " ")
}

pub fn repair_cell(raw: &str, cleaning: &CleaningConfig) -> String {
    cleaning
        .replacements
        .iter()
        .fold(raw.to_string(), |cell, r| cell.replace(&r.from, &r.to))
}

/// Parse a survey timestamp. Tries each known layout in order; a trailing
/// timezone tag such as `GMT+5:30` is dropped first.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    let value = match trimmed.rfind(" GMT") {
        Some(idx) => trimmed[..idx].trim_end(),
        None => trimmed,
    };

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

struct ColumnIndex {
    timestamp:        usize,
    name:             usize,
    investment_range: usize,
    risk_tolerance:   usize,
}

impl ColumnIndex {
    fn resolve(headers: &[String]) -> PortfolioResult<Self> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| PortfolioError::MissingColumn { column: column.to_string() })
        };
        Ok(Self {
            timestamp:        find(COL_TIMESTAMP)?,
            name:             find(COL_NAME)?,
            investment_range: find(COL_INVESTMENT_RANGE)?,
            risk_tolerance:   find(COL_RISK_TOLERANCE)?,
        })
    }
}

fn normalize_headers(raw: &csv::StringRecord, cleaning: &CleaningConfig) -> Vec<String> {
    raw.iter()
        .map(|h| {
            let cleaned = clean_header(h);
            cleaning
                .column_renames
                .iter()
                .find(|r| r.from == cleaned)
                .map(|r| r.to.clone())
                .unwrap_or(cleaned)
        })
        .collect()
}

/// Read and clean a survey export from any reader.
pub fn read_survey<R: Read>(reader: R, cleaning: &CleaningConfig) -> PortfolioResult<IngestedBatch> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = normalize_headers(csv_reader.headers()?, cleaning);
    let columns = ColumnIndex::resolve(&headers)?;
    log::debug!("Survey columns: {headers:?}");

    let mut batch = IngestedBatch::default();
    for (position, result) in csv_reader.records().enumerate() {
        let id = investor_id(position);
        let row = position + 1;

        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Row {row} ({id}) rejected: {e}");
                batch.rejected.push(RejectedRow { row, investor_id: id, error: e.into() });
                continue;
            }
        };
        let cell = |idx: usize| repair_cell(raw.get(idx).unwrap_or_default(), cleaning);

        let timestamp_raw = cell(columns.timestamp);
        let Some(timestamp) = parse_timestamp(&timestamp_raw) else {
            let error = PortfolioError::InvalidTimestamp {
                row,
                investor_id: id.clone(),
                value: timestamp_raw,
            };
            log::warn!("{error}");
            batch.rejected.push(RejectedRow { row, investor_id: id, error });
            continue;
        };

        batch.records.push(RespondentRecord {
            investor_id:            id,
            name:                   cell(columns.name),
            investment_range_label: cell(columns.investment_range),
            risk_tolerance_label:   cell(columns.risk_tolerance),
            timestamp,
        });
    }

    log::info!(
        "Ingested {} respondents ({} rejected)",
        batch.records.len(),
        batch.rejected.len()
    );
    Ok(batch)
}

pub fn read_survey_file(path: impl AsRef<Path>, cleaning: &CleaningConfig) -> PortfolioResult<IngestedBatch> {
    let file = std::fs::File::open(path.as_ref())?;
    read_survey(file, cleaning)
}
