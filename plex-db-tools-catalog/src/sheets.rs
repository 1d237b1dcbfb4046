//! Published collections sheet.
//!
//! The sheet is published as CSV with a header line and one collection per
//! row:
//!
//! | column | content                                   |
//! |--------|-------------------------------------------|
//! | 0      | row id                                    |
//! | 1      | collection name                           |
//! | 2      | poster URL                                |
//! | 3      | summary                                   |
//! | 4      | comma-separated TMDB movie ids            |
//! | 5      | last-changed timestamp                    |
//!
//! Row id 0 is a template row and is never applied in bulk.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::blocking::Client;

use crate::error::CatalogError;
use crate::types::SheetRow;

/// Published CSV export of the curated collections sheet.
pub const DEFAULT_SHEETS_URL: &str = "https://docs.google.com/spreadsheets/d/e/\
2PACX-1vTXDpwSDxKxWHNEfYSqnlaC_GVxzVavu7iPuAnEa_7LEGzhiQS29fD_1tplegJvljE5Zy1MB63umLzk/pub?output=csv";

/// Id of the reserved template row.
pub const TEMPLATE_ROW_ID: u32 = 0;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Source of collection rows.
pub trait CollectionSheet {
    fn rows(&self) -> Result<Vec<SheetRow>, CatalogError>;
}

/// Downloads the published sheet on every call. Nothing is cached.
pub struct SheetsClient {
    http: Client,
    url: String,
}

impl SheetsClient {
    pub fn new(url: &str) -> Result<Self, CatalogError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            url: url.to_string(),
        })
    }
}

impl CollectionSheet for SheetsClient {
    fn rows(&self) -> Result<Vec<SheetRow>, CatalogError> {
        log::debug!("Retrieving collections sheet from {}", self.url);
        let response = self.http.get(&self.url).send()?;
        if !response.status().is_success() {
            return Err(CatalogError::Status {
                what: "collections sheet".to_string(),
                status: response.status().as_u16(),
            });
        }
        let content = response.text()?;
        let rows = parse_sheet_csv(&content)?;
        log::debug!("Retrieved {} rows from collections sheet", rows.len());
        Ok(rows)
    }
}

/// Find the row with the given id.
pub fn find_row(rows: &[SheetRow], id: u32) -> Result<&SheetRow, CatalogError> {
    rows.iter()
        .find(|r| r.id == id)
        .ok_or_else(|| CatalogError::not_found(format!("sheets collection {id}")))
}

/// Rows eligible for a bulk run: not the template row, and complete.
pub fn available_rows(rows: Vec<SheetRow>) -> Vec<SheetRow> {
    rows.into_iter()
        .filter(|row| {
            if row.id == TEMPLATE_ROW_ID {
                return false;
            }
            if !row.is_complete() {
                log::trace!(
                    "Skipping sheets collection with id {} as it did not have the required settings",
                    row.id
                );
                return false;
            }
            true
        })
        .collect()
}

/// Parse the collections sheet CSV content.
pub fn parse_sheet_csv(content: &str) -> Result<Vec<SheetRow>, CatalogError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let columns = reader.headers()?.len();
    log::trace!("Collections sheet has {columns} columns");

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Skipping malformed sheet row: {e}");
                continue;
            }
        };

        let cell = |i: usize| {
            record
                .get(i)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let id = match cell(0).and_then(|s| parse_row_id(&s)) {
            Some(id) => id,
            None => {
                log::trace!("Skipping sheet row without a numeric id: {:?}", record.get(0));
                continue;
            }
        };

        let member_ids = cell(4)
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let changed_at = cell(5).and_then(|s| {
            let parsed = parse_timestamp(&s);
            if parsed.is_none() {
                log::warn!("Sheet row {id} has an unrecognized timestamp: {s:?}");
            }
            parsed
        });

        rows.push(SheetRow {
            id,
            name: cell(1).unwrap_or_default(),
            poster_url: cell(2),
            summary: cell(3),
            member_ids,
            changed_at,
        });
    }

    Ok(rows)
}

/// Row ids may be exported as floats (`"3.0"`).
fn parse_row_id(s: &str) -> Option<u32> {
    s.parse::<u32>()
        .ok()
        .or_else(|| s.strip_suffix(".0").and_then(|s| s.parse().ok()))
}

/// Parse a sheet timestamp. Values without an offset are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for format in FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
