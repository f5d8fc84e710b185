use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::process::date_parser::parse_date_column;
use crate::process::header::{ColumnMapping, ResolvedTable};
use crate::process::raw_table::Cell;

/// Substrings that mark a payment mode as a cheque.
const CHEQUE_MARKERS: &[&str] = &["cheque", "check"];

/// One cheque payment with a usable transfer date.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRecord {
    pub payment_mode: String,
    pub transfer_date: NaiveDate,
    /// The full source row, in column order. The canonical columns hold the
    /// coerced mode text and the parsed date.
    pub cells: Vec<Cell>,
}

/// Cheque payments pulled from a sheet, with the sheet's column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ChequePayments {
    pub headers: Vec<String>,
    pub columns: ColumnMapping,
    pub records: Vec<PaymentRecord>,
}

pub fn is_cheque(mode: &str) -> bool {
    let mode = mode.to_lowercase();
    CHEQUE_MARKERS.iter().any(|m| mode.contains(m))
}

/// Keep cheque rows whose transfer date parses.
///
/// Rows with both canonical cells empty are dropped first. An empty result is a
/// normal outcome, not an error.
#[instrument(level = "info", skip_all, fields(rows = resolved.table.rows.len()))]
pub fn cheque_payments(resolved: ResolvedTable) -> ChequePayments {
    let ResolvedTable { table, columns } = resolved;
    let mode_idx = columns.mode_of_payment;
    let date_idx = columns.date_of_transfer;

    let cheques: Vec<(String, Vec<Cell>)> = table
        .rows
        .into_iter()
        .filter(|row| !(row[mode_idx].is_empty() && row[date_idx].is_empty()))
        .map(|row| (row[mode_idx].as_text(), row))
        .filter(|(mode, _)| is_cheque(mode))
        .collect();

    if cheques.is_empty() {
        info!("no cheque payments found");
        return ChequePayments {
            headers: table.headers,
            columns,
            records: Vec::new(),
        };
    }

    let date_cells: Vec<&Cell> = cheques.iter().map(|(_, row)| &row[date_idx]).collect();
    let dates = parse_date_column(&date_cells).values;
    let before = cheques.len();

    let records: Vec<PaymentRecord> = cheques
        .into_iter()
        .zip(dates)
        .filter_map(|((mode, mut cells), date)| {
            let date = date?;
            cells[mode_idx] = Cell::Text(mode.clone());
            cells[date_idx] = Cell::Date(date.and_hms_opt(0, 0, 0)?);
            Some(PaymentRecord {
                payment_mode: mode,
                transfer_date: date,
                cells,
            })
        })
        .collect();

    info!(
        kept = records.len(),
        cheque_rows = before,
        "cheque payments with valid dates"
    );
    ChequePayments {
        headers: table.headers,
        columns,
        records,
    }
}
