use thiserror::Error;

/// Why a `TimeWindow` could not be built from upstream strings.
#[derive(Error, Debug)]
pub enum WindowError {
    #[error("Missing end timestamp")]
    MissingEnd,

    #[error("Invalid {field} timestamp: {value:?}")]
    InvalidTimestamp { field: &'static str, value: String },
}
