// src/process/header.rs
//! Header-row detection and canonical column resolution.
//!
//! Payment sheets arrive with title rows above the real header, line breaks
//! inside header cells, and loosely worded labels. The scoring and matching here
//! are pure functions over row text so they can be exercised with literal rows.

use tracing::{debug, info, warn};

use crate::error::{ReminderError, ReminderResult};
use crate::process::raw_table::{RawTable, Table};
use crate::process::utils::{contains_all, contains_any, words};

pub const MODE_OF_PAYMENT: &str = "Mode of Payment";
pub const DATE_OF_TRANSFER: &str = "Date of Transfer";
pub const CANONICAL_FIELDS: [&str; 2] = [MODE_OF_PAYMENT, DATE_OF_TRANSFER];

/// Rows read for header detection.
const SCAN_ROWS: usize = 10;
/// Rows eligible to be scored as the header.
const SCORED_ROWS: usize = 5;
/// Header positions probed when no row scores.
const PROBE_ROWS: usize = 4;

/// Score of a row in half-points: 2 per target fully present in some cell,
/// 1 if some cell only carries part of it.
pub fn score_row(row: &[String], targets: &[&str]) -> u32 {
    let cells: Vec<String> = row.iter().map(|c| c.to_lowercase()).collect();
    targets
        .iter()
        .map(|target| {
            let target_words = words(target);
            if cells.iter().any(|c| contains_all(c, &target_words)) {
                2
            } else if cells.iter().any(|c| contains_any(c, &target_words)) {
                1
            } else {
                0
            }
        })
        .sum()
}

/// Index of the highest scoring row among `rows`; earliest wins a tie. `None`
/// when nothing scores above zero.
pub fn best_scoring_row<F>(rows: &[Vec<String>], score: F) -> Option<usize>
where
    F: Fn(&[String]) -> u32,
{
    let mut best: Option<(usize, u32)> = None;
    for (idx, row) in rows.iter().enumerate() {
        let s = score(row);
        debug!(row = idx, score = s, "header candidate");
        if s > 0 && best.map_or(true, |(_, b)| s > b) {
            best = Some((idx, s));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Pick the header row of `raw`: best score among the first rows, else the
/// first probed position that leaves any data below it, else row 0.
pub fn detect_header_row(raw: &RawTable) -> usize {
    let head = raw.head_text(SCAN_ROWS);
    let scored = &head[..head.len().min(SCORED_ROWS)];
    if let Some(idx) = best_scoring_row(scored, |row| score_row(row, &CANONICAL_FIELDS)) {
        info!(header_row = idx, "header row detected by score");
        return idx;
    }

    for idx in 0..PROBE_ROWS.min(raw.rows.len()) {
        if !raw.with_header(idx).rows.is_empty() {
            warn!(header_row = idx, "no header row scored; using first row with data below it");
            return idx;
        }
    }
    warn!("no usable header row found; defaulting to row 0");
    0
}

/// Where each canonical field lives in a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub mode_of_payment: usize,
    pub date_of_transfer: usize,
}

fn keywords(field: &str) -> &'static [&'static str] {
    match field {
        MODE_OF_PAYMENT => &["mode", "payment", "pay", "method"],
        DATE_OF_TRANSFER => &["date", "transfer", "due"],
        _ => &[],
    }
}

/// Find the column for `field`: exact label, then all words present, then a
/// field-specific keyword. Columns in `taken` are skipped.
pub fn find_column(headers: &[String], field: &str, taken: &[usize]) -> Option<usize> {
    let lowered: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| !taken.contains(i))
        .map(|(i, h)| (i, h.trim().to_lowercase()))
        .collect();
    let field_lc = field.to_lowercase();
    let field_words = words(field);

    lowered
        .iter()
        .find(|(_, h)| *h == field_lc)
        .or_else(|| lowered.iter().find(|(_, h)| contains_all(h, &field_words)))
        .or_else(|| {
            lowered
                .iter()
                .find(|(_, h)| contains_any(h, keywords(field)))
        })
        .map(|(i, _)| *i)
}

/// Resolve both canonical fields, or name the first one that is missing.
pub fn resolve_columns(headers: &[String]) -> Result<ColumnMapping, &'static str> {
    let mode = find_column(headers, MODE_OF_PAYMENT, &[]).ok_or(MODE_OF_PAYMENT)?;
    let date = find_column(headers, DATE_OF_TRANSFER, &[mode]).ok_or(DATE_OF_TRANSFER)?;
    Ok(ColumnMapping {
        mode_of_payment: mode,
        date_of_transfer: date,
    })
}

/// A table whose canonical columns carry their canonical labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTable {
    pub table: Table,
    pub columns: ColumnMapping,
}

/// Detect the header, resolve the canonical columns and rename them.
pub fn resolve_table(raw: &RawTable) -> ReminderResult<ResolvedTable> {
    let header_row = detect_header_row(raw);
    let mut table = raw.with_header(header_row);
    info!(
        header_row,
        rows = table.rows.len(),
        columns = ?table.headers,
        "table loaded"
    );

    let columns = resolve_columns(&table.headers).map_err(|missing| {
        let err = ReminderError::Schema {
            missing: missing.to_string(),
            available: table.headers.clone(),
            sample: table.sample(3),
        };
        warn!(error = %err, "column resolution failed");
        err
    })?;

    for (field, idx) in [
        (MODE_OF_PAYMENT, columns.mode_of_payment),
        (DATE_OF_TRANSFER, columns.date_of_transfer),
    ] {
        if table.headers[idx] != field {
            info!(field, column = %table.headers[idx], "mapped column");
            table.headers[idx] = field.to_string();
        }
    }

    Ok(ResolvedTable { table, columns })
}
