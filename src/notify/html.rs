use std::fmt::Write;

use crate::process::raw_table::Cell;
use crate::reminder::{ReminderSet, LEAD_DAYS};

pub const DISPLAY_DATE_FORMAT: &str = "%d-%b-%Y";

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// How a cell reads in the email.
pub fn display_cell(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Date(dt) => dt.format(DISPLAY_DATE_FORMAT).to_string(),
        other => other.as_text(),
    }
}

/// Render the reminder table as a standalone HTML document.
pub fn render(set: &ReminderSet) -> String {
    let mut html = String::new();
    html.push_str("<html>\n<body>\n");
    html.push_str("<h2>Cheque Transfer Reminder</h2>\n");
    let _ = writeln!(
        html,
        "<p>The following cheque payments are due for transfer in <strong>{} days</strong>:</p>",
        LEAD_DAYS
    );
    html.push_str(
        "<table border=\"1\" style=\"border-collapse: collapse; width: 100%; margin: 20px 0;\">\n",
    );

    html.push_str("<thead>\n<tr style=\"background-color: #f2f2f2;\">");
    for h in &set.headers {
        let _ = write!(
            html,
            "<th style=\"padding: 12px; text-align: left; font-weight: bold;\">{}</th>",
            escape(h)
        );
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for (i, record) in set.records.iter().enumerate() {
        let style = if i % 2 == 0 {
            "background-color: #f9f9f9;"
        } else {
            ""
        };
        let _ = write!(html, "<tr style=\"{}\">", style);
        for idx in 0..set.headers.len() {
            let value = record.cells.get(idx).map(display_cell).unwrap_or_default();
            let _ = write!(
                html,
                "<td style=\"padding: 10px; border-bottom: 1px solid #ddd;\">{}</td>",
                escape(&value)
            );
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");

    let _ = write!(
        html,
        "<div style=\"margin-top: 20px; padding: 15px; background-color: #e8f4fd; \
         border-left: 4px solid #2196F3;\">\n\
         <p><strong>Reminder Date:</strong> {}</p>\n\
         <p><strong>Target Transfer Date:</strong> {}</p>\n\
         </div>\n",
        set.today.format(DISPLAY_DATE_FORMAT),
        set.target.format(DISPLAY_DATE_FORMAT)
    );
    html.push_str(
        "<p style=\"color: #666; font-size: 14px;\">\
         <em>This is an automated reminder generated from your shared payments workbook.</em><br>\
         <em>Please ensure these cheques are processed on time to avoid any delays.</em></p>\n",
    );
    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::filter::PaymentRecord;
    use chrono::NaiveDate;

    fn set() -> ReminderSet {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let due = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        let record = |vendor: &str| PaymentRecord {
            payment_mode: "Cheque".into(),
            transfer_date: due,
            cells: vec![
                Cell::from("Cheque"),
                Cell::Date(due.and_hms_opt(0, 0, 0).unwrap()),
                Cell::Number(100.0),
                Cell::from(vendor),
                Cell::Empty,
            ],
        };
        ReminderSet {
            today,
            target: due,
            headers: vec![
                "Mode of Payment".into(),
                "Date of Transfer".into(),
                "Amount".into(),
                "Vendor".into(),
                "Notes".into(),
            ],
            records: vec![record("Smith & <Sons>"), record("Acme")],
        }
    }

    #[test]
    fn renders_headers_rows_and_dates() {
        let html = render(&set());
        assert!(html.contains(">Date of Transfer</th>"));
        assert!(html.contains(">04-Jan-2024</td>"));
        assert!(html.contains(">100</td>"));
        assert!(html.contains("Smith &amp; &lt;Sons&gt;"));
        assert!(html.contains("<strong>Reminder Date:</strong> 01-Jan-2024"));
        assert!(html.contains("<strong>Target Transfer Date:</strong> 04-Jan-2024"));
        assert_eq!(html.matches("<tr style=\"background-color: #f9f9f9;\">").count(), 1);
        assert_eq!(html.matches("<tr style=\"\">").count(), 1);
    }

    #[test]
    fn empty_cells_render_empty() {
        let html = render(&set());
        assert!(html.contains("border-bottom: 1px solid #ddd;\"></td>"));
    }
}
