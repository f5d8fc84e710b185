use chrono::{NaiveDateTime, Timelike};
use std::collections::HashMap;

use crate::process::utils::normalize_label;

/// One spreadsheet cell, typed only as far as the workbook itself types it.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// A cell the workbook stores as a date (or an ISO datetime string).
    Date(NaiveDateTime),
}

impl Cell {
    /// Untyped text view, as a CSV export would show it.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format_number(*n),
            Cell::Bool(b) => b.to_string(),
            Cell::Date(dt) if dt.time().num_seconds_from_midnight() == 0 => {
                dt.date().format("%Y-%m-%d").to_string()
            }
            Cell::Date(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

/// Whole numbers print without a trailing `.0`.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Row-major cell grid straight out of the first worksheet. No header assumed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub rows: Vec<Vec<Cell>>,
}

/// A grid split into column labels and data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Normalized, unique column labels.
    pub headers: Vec<String>,
    /// Data rows, each exactly `headers.len()` wide.
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Text view of the first `n` rows.
    pub fn head_text(&self, n: usize) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .take(n)
            .map(|r| r.iter().map(Cell::as_text).collect())
            .collect()
    }

    /// Re-read the grid using row `header_row` as column labels. Rows above the
    /// header and rows with no content are dropped.
    pub fn with_header(&self, header_row: usize) -> Table {
        let width = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let label_cells = self.rows.get(header_row).cloned().unwrap_or_default();

        let mut seen: HashMap<String, usize> = HashMap::new();
        let headers = (0..width)
            .map(|i| {
                let label = label_cells
                    .get(i)
                    .map(|c| normalize_label(&c.as_text()))
                    .filter(|l| !l.is_empty())
                    .unwrap_or_else(|| format!("Unnamed: {}", i));
                let n = seen.entry(label.clone()).or_insert(0);
                let unique = if *n == 0 {
                    label
                } else {
                    format!("{}.{}", label, n)
                };
                *n += 1;
                unique
            })
            .collect();

        let rows = self
            .rows
            .iter()
            .skip(header_row + 1)
            .filter(|r| r.iter().any(|c| !c.is_empty()))
            .map(|r| {
                let mut row = r.clone();
                row.resize(width, Cell::Empty);
                row
            })
            .collect();

        Table { headers, rows }
    }
}

impl Table {
    /// First few rows flattened to one line, for diagnostics.
    pub fn sample(&self, n: usize) -> String {
        self.rows
            .iter()
            .take(n)
            .map(|r| {
                r.iter()
                    .map(Cell::as_text)
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join(" ; ")
    }
}
