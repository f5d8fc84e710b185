// src/process/mod.rs
use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDateTime;
use std::io::Cursor;
use tracing::{debug, info, instrument};

use crate::error::{ReminderError, ReminderResult};

pub mod date_parser;
pub mod filter;
pub mod header;
pub mod raw_table;
pub mod utils;

use raw_table::{Cell, RawTable};

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::Number(dt.as_f64())),
        Data::DateTimeIso(s) => parse_iso(s)
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("{:?}", e)),
    }
}

fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn read_first_sheet(bytes: &[u8]) -> Result<RawTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .context("unrecognised or corrupt workbook")?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("workbook has no worksheets"))?;
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("reading worksheet {:?}", sheet))?;
    debug!(sheet = %sheet, size = ?range.get_size(), "worksheet range");

    let rows = range
        .rows()
        .map(|r| r.iter().map(cell_from_data).collect())
        .collect();
    Ok(RawTable::new(rows))
}

/// Read the first worksheet of an xlsx/xls/xlsb/ods workbook into a raw grid.
#[instrument(level = "info", skip(bytes), fields(bytes = bytes.len()))]
pub fn load_workbook(bytes: &[u8]) -> ReminderResult<RawTable> {
    let raw = read_first_sheet(bytes).map_err(|e| ReminderError::Workbook(format!("{:#}", e)))?;
    info!(rows = raw.rows.len(), "workbook loaded");
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use chrono::NaiveDate;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

    #[test]
    fn loads_typed_cells() -> Result<()> {
        let mut book = Workbook::new();
        let sheet = book.add_worksheet();
        sheet.write_string(0, 0, "Payments register")?;
        sheet.write_string(1, 0, "Mode of Payment")?;
        sheet.write_string(1, 1, "Date of Transfer")?;
        sheet.write_string(1, 2, "Amount")?;
        sheet.write_string(2, 0, "Cheque")?;
        let date_fmt = Format::new().set_num_format("yyyy-mm-dd");
        sheet.write_datetime_with_format(2, 1, &ExcelDateTime::from_ymd(2024, 1, 4)?, &date_fmt)?;
        sheet.write_number(2, 2, 100)?;
        let bytes = book.save_to_buffer()?;

        let raw = load_workbook(&bytes)?;
        assert_eq!(raw.rows.len(), 3);
        assert_eq!(raw.rows[1][0], Cell::from("Mode of Payment"));
        assert_eq!(
            raw.rows[2][1],
            Cell::Date(NaiveDate::from_ymd_opt(2024, 1, 4).unwrap().and_hms_opt(0, 0, 0).unwrap())
        );
        assert_eq!(raw.rows[2][2], Cell::Number(100.0));
        Ok(())
    }

    #[test]
    fn garbage_is_a_workbook_error() {
        let mut bytes = b"PK\x03\x04".to_vec();
        bytes.resize(2048, 7);
        assert!(matches!(
            load_workbook(&bytes),
            Err(ReminderError::Workbook(_))
        ));
    }
}
