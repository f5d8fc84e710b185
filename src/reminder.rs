use chrono::{Days, NaiveDate};
use tracing::info;

use crate::process::filter::{ChequePayments, PaymentRecord};

/// Days between the reminder and the transfer it announces.
pub const LEAD_DAYS: u64 = 3;

pub fn target_date(today: NaiveDate) -> NaiveDate {
    today + Days::new(LEAD_DAYS)
}

/// Cheque payments falling exactly on the target date.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderSet {
    pub today: NaiveDate,
    pub target: NaiveDate,
    pub headers: Vec<String>,
    pub records: Vec<PaymentRecord>,
}

impl ReminderSet {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Keep payments whose transfer date is exactly `today + LEAD_DAYS`.
pub fn select_due(payments: ChequePayments, today: NaiveDate) -> ReminderSet {
    let target = target_date(today);
    let records: Vec<PaymentRecord> = payments
        .records
        .into_iter()
        .filter(|r| r.transfer_date == target)
        .collect();
    info!(%today, due_date = %target, due = records.len(), "selected reminders");
    ReminderSet {
        today,
        target,
        headers: payments.headers,
        records,
    }
}
