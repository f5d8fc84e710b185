// src/notify/mod.rs

use crate::error::ReminderResult;
use crate::reminder::{ReminderSet, LEAD_DAYS};

pub mod html;
pub mod smtp;

/// A rendered reminder, ready to hand to a sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderEmail {
    pub subject: String,
    pub html: String,
}

/// Delivery backend for reminder emails.
pub trait ReminderSender {
    fn send(&self, email: &ReminderEmail) -> ReminderResult<()>;
}

pub fn subject(count: usize) -> String {
    format!(
        "Cheque Transfer Reminder - {} payment(s) due in {} days",
        count, LEAD_DAYS
    )
}

pub fn compose(set: &ReminderSet) -> ReminderEmail {
    ReminderEmail {
        subject: subject(set.len()),
        html: html::render(set),
    }
}
