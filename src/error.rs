use thiserror::Error;

pub type ReminderResult<T> = Result<T, ReminderError>;

/// Every way a reminder run can end unsuccessfully.
#[derive(Error, Debug)]
pub enum ReminderError {
    #[error("missing required environment variables: {}", names.join(", "))]
    MissingConfig { names: Vec<String> },

    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidConfig {
        name: String,
        value: String,
        reason: String,
    },

    #[error("no candidate URL yielded an acceptable spreadsheet")]
    Fetch,

    #[error("could not read workbook: {0}")]
    Workbook(String),

    #[error(
        "required column {missing:?} not found; available columns: {available:?}; sample: {sample}"
    )]
    Schema {
        missing: String,
        available: Vec<String>,
        sample: String,
    },

    #[error("failed to send reminder email: {0}")]
    Delivery(String),
}
