//! Error types for the GSF reader.

use gsf2arrow_arrow::ArrowConvertError;
use gsf2arrow_core::{BeamWidthExceeded, GsfError};

/// Errors produced by [`GsfReader`](crate::GsfReader).
#[derive(Debug, thiserror::Error)]
pub enum GsfReaderError {
    /// I/O error while opening or memory-mapping a file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Fatal error from the index pass or a ping decode.
    #[error(transparent)]
    Gsf(#[from] GsfError),

    /// A reconciled chunk could not be converted to a `RecordBatch`.
    #[error(transparent)]
    Arrow(#[from] ArrowConvertError),

    /// A ping holds more beams than the fixed beam width allows.
    #[error(transparent)]
    BeamWidth(#[from] BeamWidthExceeded),

    /// The requested ping is not in the index.
    #[error("ping {ping} not found ({count} pings indexed)")]
    PingNotFound { ping: usize, count: usize },

    /// The indexed ping lies outside the byte source it is decoded from.
    #[error("ping {ping} data range {start}..{end} exceeds source of {len} bytes")]
    PingOutOfBounds {
        ping: usize,
        start: u64,
        end: u64,
        len: usize,
    },

    /// An error returned by the user-supplied callback in
    /// [`GsfReader::for_each_record_batch`](crate::GsfReader::for_each_record_batch)
    /// or [`GsfReader::for_each_ping_chunk`](crate::GsfReader::for_each_ping_chunk).
    #[error(transparent)]
    Callback(Box<dyn std::error::Error + Send + Sync>),
}
