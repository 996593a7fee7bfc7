use thiserror::Error;

/// Request rejected before it reaches the bridge core.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("too many alerts: {count} (max {max})")]
    TooManyAlerts { count: usize, max: usize },
    #[error("alert {index} is too long: {len} characters (max {max})")]
    AlertTooLong { index: usize, len: usize, max: usize },
    #[error("id is too long: {len} characters (max {max})")]
    IdTooLong { len: usize, max: usize },
}
