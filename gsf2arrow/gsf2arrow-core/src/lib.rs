//! Arrow-independent decoding of GSF (Generic Sensor Format) survey sonar files.
//!
//! This crate frames records and subrecords, reconstructs beam arrays from
//! scale factors, projects beam positions, merges pings into reconciled chunks
//! and analyses file-wide consistency. Vendor sensor payloads are decoded
//! through the [`SensorDecoder`] registry.

mod beam;
mod error;
mod framing;
mod geodetic;
mod index;
mod intensity;
mod ping;
mod ping_group;
mod ping_header;
mod quality;
mod reconcile;
mod record_type;
mod records;
mod scale_factor;
pub mod sentinel;
mod sensor;
mod subrecord;
mod wire;

pub use beam::{BeamArrayDecoder, BeamArrays, BeamColumn, BeamIntensity};
pub use error::{GsfError, Result, SensorError, UnsupportedReason};
pub use framing::{
    CHECKSUM_LEN, RECORD_HEADER_LEN, RecordHeader, SUBRECORD_HEADER_LEN, SubRecordHeader,
    record_checksum, split_subrecords,
};
pub use geodetic::{LonLat, metres_per_degree_latitude, metres_per_degree_longitude, project_beams};
pub use index::{FailedPing, FileIndex, FileIndexBuilder, RecordEntry, RecordIndex, RecordStats};
pub use intensity::{IntensitySeries, decode_intensity_series};
pub use ping::{DecodedPing, PingDecoder, PingInfo, PingScan, PingScanFailure};
pub use ping_group::{PingGroup, group_pings};
pub use ping_header::{PING_HEADER_LEN_V2, PING_HEADER_LEN_V3, PingHeader};
pub use quality::QualityInfo;
pub use reconcile::{BeamLayout, BeamWidthExceeded, PingChunk, PingColumns};
pub use record_type::RecordType;
pub use records::{
    AttitudeSample, Comment, FormatVersion, History, HvNavigationError, Parameters, Record,
    SoundVelocityProfile, SwathSummary, decode_record,
};
pub use scale_factor::{FieldSize, ScaleFactor, ScaleFactorTable};
pub use sensor::{
    CustomSensor, EchotracSensor, Em3Sensor, Em4Sensor, ImageryMetadata, R2SonicSensor,
    Reson7kSensor, SensorDecoder, SensorMetadata, SensorRegistry, sensor_name,
};
pub use subrecord::{
    BeamField, BeamWidth, FieldKind, SCALE_FACTORS_ID, SubrecordKind, subrecord_name,
};
pub use wire::{WireError, WireReader};
