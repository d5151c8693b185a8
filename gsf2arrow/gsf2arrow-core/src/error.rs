//! Error types for record decoding.

use crate::wire::WireError;

/// Why a subrecord id cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// The id was defined by earlier format revisions and withdrawn.
    Obsolete,
    /// The id lies in the beam-array range but has no definition.
    Reserved,
}

impl std::fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Obsolete => "obsolete",
            Self::Reserved => "reserved",
        })
    }
}

/// Error returned by [`SensorDecoder`](crate::SensorDecoder) implementations.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error(transparent)]
    Wire(#[from] WireError),

    /// The payload decoded but one of its values is out of range.
    #[error("invalid {field}: {detail}")]
    InvalidField { field: &'static str, detail: String },
}

/// Errors produced while framing and decoding a byte stream.
///
/// Variants other than [`GsfError::Truncated`] and [`GsfError::Io`] are scoped to a
/// single ping: a scan logs them, records the failing ping and carries on.
#[derive(Debug, thiserror::Error)]
pub enum GsfError {
    /// Underlying byte source failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The stream ended inside a record header or record body.
    #[error("stream truncated at offset {offset}: expected {expected} bytes, got {actual}")]
    Truncated {
        offset: u64,
        expected: u64,
        actual: u64,
    },

    /// A record or subrecord header is short or inconsistent with its container.
    #[error("malformed header in record at offset {record_offset}: {detail}")]
    MalformedHeader { record_offset: u64, detail: String },

    /// A payload ended early or carries values that cannot be interpreted.
    #[error("malformed payload in record at offset {record_offset}: {source}")]
    MalformedPayload {
        record_offset: u64,
        #[source]
        source: WireError,
    },

    /// A beam-array payload has a size that does not divide into the beam count.
    #[error(
        "invalid {field} array in record at offset {record_offset} (subrecord at {subrecord_offset}): {detail}"
    )]
    InvalidBeamArray {
        field: &'static str,
        record_offset: u64,
        subrecord_offset: u64,
        detail: String,
    },

    /// Obsolete or reserved-undefined subrecord id.
    #[error(
        "{reason} subrecord id {subrecord_id} in record at offset {record_offset} (subrecord at {subrecord_offset})"
    )]
    UnsupportedSubrecord {
        subrecord_id: u8,
        reason: UnsupportedReason,
        record_offset: u64,
        subrecord_offset: u64,
    },

    /// A vendor-specific payload failed its fixed-layout decode.
    #[error(
        "sensor subrecord {sensor_id} in record at offset {record_offset} (subrecord at {subrecord_offset}): {source}"
    )]
    SensorDecode {
        sensor_id: u8,
        record_offset: u64,
        subrecord_offset: u64,
        #[source]
        source: SensorError,
    },

    /// A scaled beam array was found but no scale factor is known for it.
    #[error("no scale factor for subrecord {subrecord_id} in record at offset {record_offset}")]
    MissingScaleFactor { subrecord_id: u8, record_offset: u64 },
}

impl GsfError {
    pub(crate) fn payload(record_offset: u64, source: WireError) -> Self {
        Self::MalformedPayload {
            record_offset,
            source,
        }
    }

    /// Whether a scan may skip the offending ping and continue.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Io(_) | Self::Truncated { .. })
    }
}

pub type Result<T> = std::result::Result<T, GsfError>;
