use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown law code: {0}")]
    UnknownLaw(String),

    #[error("month out of range (1-12): {0}")]
    InvalidMonth(i64),

    #[error("unknown month: {0}")]
    UnknownMonth(String),

    #[error("quarter out of range (1-4): {0}")]
    InvalidQuarter(i64),

    #[error("unknown view mode: {0}")]
    UnknownViewMode(String),
}
