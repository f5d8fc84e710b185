// src/run.rs

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::error::{ReminderError, ReminderResult};
use crate::fetch::SpreadsheetSource;
use crate::notify::{self, ReminderSender};
use crate::process::{filter, header, load_workbook};
use crate::reminder::select_due;

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing to send: no cheque payment falls on `target`.
    NothingDue {
        cheque_payments: usize,
        target: NaiveDate,
    },
    /// One reminder email went out.
    Sent { reminders: usize, target: NaiveDate },
}

/// One pass of fetch, parse, filter, select and notify.
#[instrument(level = "info", skip(source, sender))]
pub fn run(
    source: &dyn SpreadsheetSource,
    sender: &dyn ReminderSender,
    today: NaiveDate,
) -> ReminderResult<RunOutcome> {
    let bytes = source.fetch_spreadsheet().ok_or(ReminderError::Fetch)?;
    let raw = load_workbook(&bytes)?;
    let resolved = header::resolve_table(&raw)?;
    let cheques = filter::cheque_payments(resolved);
    let cheque_payments = cheques.records.len();
    let due = select_due(cheques, today);

    if due.is_empty() {
        info!(due_date = %due.target, "no cheque transfer reminders needed today");
        return Ok(RunOutcome::NothingDue {
            cheque_payments,
            target: due.target,
        });
    }

    let email = notify::compose(&due);
    sender.send(&email)?;
    Ok(RunOutcome::Sent {
        reminders: due.len(),
        target: due.target,
    })
}
