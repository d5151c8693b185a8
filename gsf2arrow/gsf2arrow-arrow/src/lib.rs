//! Arrow integration layer for `gsf2arrow`.
//!
//! Two layouts are produced from a reconciled [`PingChunk`](gsf2arrow_core::PingChunk):
//! - [`ping_chunk_to_record_batch`]: one row per ping, beam fields as `List`
//!   columns (or `FixedSizeList` when the chunk uses a fixed beam width).
//! - [`beam_chunk_to_record_batch`]: one row per beam with flat scalar columns,
//!   suited to writers without nested types such as CSV.
//!
//! Both prepend an `@time` column holding the ping time as a nanosecond
//! `Timestamp` in UTC.

pub mod beam_batch;
pub mod columns;
pub mod error;
pub mod ping_batch;

/// Re-export of [`beam_batch::beam_chunk_to_record_batch`].
pub use beam_batch::beam_chunk_to_record_batch;
/// Re-export of [`error::ArrowConvertError`].
pub use error::ArrowConvertError;
/// Re-export of [`ping_batch::ping_chunk_to_record_batch`].
pub use ping_batch::ping_chunk_to_record_batch;

pub(crate) const TIMESTAMP_TZ: &str = "+00:00";

/// Name of the prepended ping time column.
pub const TIME_COLUMN: &str = "@time";
