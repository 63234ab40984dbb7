//! MDF Decoder Library
//!
//! A library for decoding MDF 3.x (Measurement Data Format) files — binary
//! containers storing time-sampled CAN-bus signals — into physical-unit time
//! series.
//!
//! # Architecture
//!
//! The library is intentionally minimal and focused on decoding:
//! - Navigates the MDF block graph with bounds-checked, zero-copy views
//! - Extracts arbitrarily bit-packed signal values in either byte order
//! - Applies physical conversion formulas (linear, tabular, rational)
//! - Iterates channel-group records and delivers per-channel time/value
//!   series to a caller-supplied sink
//!
//! The library does NOT:
//! - Write or modify MDF files
//! - Resolve text-table conversions to strings (the raw number is kept)
//! - Plot, export or otherwise post-process the decoded series
//!
//! All higher-level functionality belongs to the application layer.
//!
//! # Example Usage
//!
//! ```no_run
//! use mdf_decoder::{DecodeConfig, MdfFile, process_file};
//! use std::path::Path;
//!
//! let file = MdfFile::open(Path::new("measurement.mdf")).unwrap();
//!
//! // Only deliver the engine speed signal
//! let config = DecodeConfig::new()
//!     .with_signal_filter(vec!["EngineSpeed".to_string()]);
//!
//! let outcome = process_file(&file, &config, |_, series| {
//!     println!(
//!         "{} ({}): {} records in {}",
//!         series.signal_name,
//!         series.message_name,
//!         series.record_count,
//!         series.unit
//!     );
//!     for (t, v) in series.time().iter().zip(series.values()) {
//!         println!("  {:.6} s: {}", t, v);
//!     }
//! })
//! .unwrap();
//!
//! println!(
//!     "{} channels from {} groups, {} failed",
//!     outcome.channels_delivered,
//!     outcome.groups_processed,
//!     outcome.errors.len()
//! );
//! ```

// Public modules
pub mod blocks;
pub mod config;
pub mod decode;
pub mod file;
pub mod process;
pub mod types;

// Re-export main types for convenience
pub use blocks::{
    CcBlock, CeBlock, CgBlock, CnBlock, DgBlock, HdBlock, IdBlock, Link, MessageInfo, PrBlock,
    TxBlock, CHANNEL_TYPE_DATA, CHANNEL_TYPE_TIME,
};
pub use config::DecodeConfig;
pub use decode::{apply_conversion, decode_signal, extract_raw, RawValue};
pub use file::MdfFile;
pub use process::{
    process_channel, process_file, process_group, ChannelError, FileOutcome, GroupOutcome,
    RecordCount, SignalSeries,
};
pub use types::{DecodeError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: a minimal identification block attaches cleanly
        let mut image = vec![0u8; 64];
        image[..8].copy_from_slice(b"MDF     ");
        image[28..30].copy_from_slice(&330u16.to_le_bytes());
        let file = MdfFile::from_bytes(image).unwrap();
        assert_eq!(file.version(), 330);
        assert!(!file.is_corrupt());
    }
}
