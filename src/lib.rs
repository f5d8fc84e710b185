//! Emails a reminder for cheque transfers due in three days, read from a
//! spreadsheet published through a shared link.

pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod notify;
pub mod process;
pub mod reminder;
pub mod run;

pub use config::Config;
pub use error::{ReminderError, ReminderResult};
pub use run::{run, RunOutcome};
