use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::process::raw_table::Cell;

/// Column-level formats, in the order they are tried. The first one that parses
/// at least one text cell is used for the whole column.
pub const DATE_FORMATS: &[&str] = &[
    "%d-%b-%y", // 04-Jan-24
    "%d-%b-%Y", // 04-Jan-2024
    "%d/%m/%y", // 04/01/24
    "%d/%m/%Y", // 04/01/2024
    "%Y-%m-%d", // 2024-01-04
    "%m/%d/%Y", // 01/04/2024
    "%d.%m.%Y", // 04.01.2024
    "%Y/%m/%d", // 2024/01/04
    "%d-%m-%y", // 04-01-24
    "%d-%m-%Y", // 04-01-2024
];

/// Extra shapes accepted only by the per-cell fallback.
const LOOSE_DATE_FORMATS: &[&str] = &[
    "%d %b %Y",
    "%d %B %Y",
    "%d-%B-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %b %y",
    "%Y.%m.%d",
    "%m-%d-%Y",
    "%Y%m%d",
];

const LOOSE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d-%b-%Y %H:%M:%S",
];

/// Plausible range for a bare number holding an Excel serial date (1954..2119).
const EXCEL_SERIAL_RANGE: std::ops::RangeInclusive<f64> = 20_000.0..=80_000.0;

/// Outcome of parsing a whole date column.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDates {
    /// Format the column committed to; `None` means the loose fallback ran.
    pub format: Option<&'static str>,
    /// One entry per input cell.
    pub values: Vec<Option<NaiveDate>>,
}

/// Parse one string with one format. Years before 1000 are rejected so a
/// two-digit year never slips through a four-digit pattern.
pub fn parse_with(s: &str, fmt: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), fmt)
        .ok()
        .filter(|d| d.year() >= 1000)
}

/// Best-effort parse of a single value in any shape we know.
pub fn parse_loose(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .chain(LOOSE_DATE_FORMATS)
        .find_map(|fmt| parse_with(s, fmt))
        .or_else(|| {
            LOOSE_DATETIME_FORMATS.iter().find_map(|fmt| {
                NaiveDateTime::parse_from_str(s, fmt)
                    .ok()
                    .map(|dt| dt.date())
            })
        })
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Excel serial day number to a calendar date (1900 date system).
pub fn from_excel_serial(n: f64) -> Option<NaiveDate> {
    if !EXCEL_SERIAL_RANGE.contains(&n) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(n.trunc() as i64))
}

/// Parse a date column.
///
/// Cells the workbook already types as dates are kept as-is. Text cells go
/// through [`DATE_FORMATS`] in order; the first format that parses any of them
/// is applied to every text cell, and the ones it cannot parse become `None`.
/// If no format parses anything, each cell gets a loose per-value attempt.
pub fn parse_date_column(cells: &[&Cell]) -> ParsedDates {
    let texts: Vec<Option<String>> = cells
        .iter()
        .map(|c| match c {
            Cell::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
        .collect();

    let committed = DATE_FORMATS.iter().copied().find(|fmt| {
        texts
            .iter()
            .flatten()
            .any(|s| parse_with(s, fmt).is_some())
    });

    let values: Vec<Option<NaiveDate>> = cells
        .iter()
        .zip(&texts)
        .map(|(cell, text)| match (cell, text) {
            (Cell::Date(dt), _) => Some(dt.date()),
            (_, Some(s)) => match committed {
                Some(fmt) => parse_with(s, fmt),
                None => parse_loose(s),
            },
            (Cell::Number(n), _) if committed.is_none() => from_excel_serial(*n),
            _ => None,
        })
        .collect();

    let parsed = values.iter().filter(|v| v.is_some()).count();
    match committed {
        Some(fmt) => info!(format = fmt, parsed, total = cells.len(), "parsed transfer dates"),
        None if parsed > 0 => {
            info!(parsed, total = cells.len(), "parsed transfer dates with loose fallback")
        }
        None => warn!(total = cells.len(), "no transfer date could be parsed"),
    }
    debug!(unparsed = cells.len() - parsed, "dates left unparsed");

    ParsedDates {
        format: committed,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn texts(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|s| Cell::from(*s)).collect()
    }

    fn parse(cells: &[Cell]) -> ParsedDates {
        let refs: Vec<&Cell> = cells.iter().collect();
        parse_date_column(&refs)
    }

    #[test]
    fn abbreviated_month_two_digit_year_first() {
        let got = parse(&texts(&["04-Jan-24", "15-Feb-24"]));
        assert_eq!(got.format, Some("%d-%b-%y"));
        assert_eq!(got.values, vec![Some(d(2024, 1, 4)), Some(d(2024, 2, 15))]);
    }

    #[test]
    fn four_digit_years_skip_two_digit_patterns() {
        assert_eq!(parse(&texts(&["04-Jan-2024"])).format, Some("%d-%b-%Y"));
        assert_eq!(parse(&texts(&["04/01/2024"])).format, Some("%d/%m/%Y"));
        assert_eq!(parse(&texts(&["2024-01-04"])).format, Some("%Y-%m-%d"));
        assert_eq!(parse(&texts(&["04.01.2024"])).format, Some("%d.%m.%Y"));
        assert_eq!(parse(&texts(&["2024/01/04"])).format, Some("%Y/%m/%d"));
        assert_eq!(parse(&texts(&["04-01-2024"])).format, Some("%d-%m-%Y"));
    }

    #[test]
    fn day_first_wins_over_month_first() {
        let got = parse(&texts(&["01/04/2024"]));
        assert_eq!(got.values, vec![Some(d(2024, 4, 1))]);
    }

    #[test]
    fn month_first_used_when_day_first_cannot_parse() {
        let got = parse(&texts(&["12/25/2024"]));
        assert_eq!(got.format, Some("%m/%d/%Y"));
        assert_eq!(got.values, vec![Some(d(2024, 12, 25))]);
    }

    #[test]
    fn mixed_column_commits_to_first_format() {
        let got = parse(&texts(&["04-Jan-24", "2024-01-05", "bogus"]));
        assert_eq!(got.format, Some("%d-%b-%y"));
        assert_eq!(got.values, vec![Some(d(2024, 1, 4)), None, None]);
    }

    #[test]
    fn native_dates_pass_through() {
        let native = d(2024, 1, 4).and_hms_opt(0, 0, 0).unwrap();
        let cells = vec![Cell::Date(native), Cell::from("05-Jan-24"), Cell::Empty];
        let got = parse(&cells);
        assert_eq!(got.values, vec![Some(d(2024, 1, 4)), Some(d(2024, 1, 5)), None]);
    }

    #[test]
    fn loose_fallback() {
        let cells = vec![
            Cell::from("4 January 2024"),
            Cell::from("2024-01-04 10:30:00"),
            Cell::Number(45295.0),
            Cell::from("someday"),
        ];
        let got = parse(&cells);
        assert_eq!(got.format, None);
        assert_eq!(
            got.values,
            vec![
                Some(d(2024, 1, 4)),
                Some(d(2024, 1, 4)),
                Some(d(2024, 1, 4)),
                None
            ]
        );
    }
}
