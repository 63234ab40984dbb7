//! Core types for the MDF decoder library
//!
//! This module defines the error type shared by every component. The decoder
//! distinguishes soft failures (an out-of-range link, recovered locally as a
//! missing block) from hard per-channel failures (an unsupported encoding),
//! which are surfaced as typed errors instead of aborting the whole scan.

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Errors that can occur during decoding
///
/// Out-of-range links are NOT represented here: the navigator recovers them
/// locally by marking the file context corrupt and reporting the block as
/// absent. Everything below is terminal for the operation that raised it.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Failed to read MDF file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not an MDF file image: {0}")]
    InvalidFile(String),

    #[error("Unsupported signal data type: {0}")]
    UnsupportedDataType(u16),

    #[error("Unsupported conversion type: {0}")]
    UnsupportedConversion(u16),

    #[error("Malformed conversion block: {0}")]
    MalformedConversion(String),

    #[error("Invalid bit field: {0}")]
    InvalidBitField(String),

    #[error("Record data out of range: {0}")]
    RecordOutOfRange(String),

    #[error("Invalid record layout: {0}")]
    InvalidRecordLayout(String),

    #[error("Time and value series differ in length: {time} vs {values}")]
    SeriesLengthMismatch { time: usize, values: usize },
}
