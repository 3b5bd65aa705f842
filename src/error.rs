use thiserror::Error;

#[derive(Error, Debug)]
pub enum BudgetError {
    #[error("Required column '{column}' is missing from the header row")]
    MissingColumn { column: String },

    #[error("Row {row}: required field '{column}' is empty")]
    MissingField { row: usize, column: String },

    #[error("Row {row}: invalid type '{value}': must be Income or Expense")]
    InvalidType { row: usize, value: String },

    #[error("Row {row}: invalid amount '{value}' in column '{column}': must be a finite decimal")]
    InvalidAmount {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Row {row}: invalid date '{value}' in column '{column}': expected {expected}")]
    InvalidDateFormat {
        row: usize,
        column: String,
        value: String,
        expected: &'static str,
    },

    #[error("Row {row}: date {date} belongs to {date_month}, which does not match month {month}")]
    DateMonthMismatch {
        row: usize,
        date: String,
        date_month: String,
        month: String,
    },

    #[error("Row {row}: invalid section '{value}': must be Needs, Wants or Savings")]
    InvalidSection { row: usize, value: String },

    #[error("Invalid month '{0}': expected YYYY-MM")]
    InvalidMonth(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BudgetError>;
