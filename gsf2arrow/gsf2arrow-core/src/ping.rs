//! Swath bathymetry ping records: light-weight indexing and full decode.

use std::sync::Arc;

use crate::{
    beam::{BeamArrayDecoder, BeamArrays, BeamColumn},
    error::{GsfError, Result},
    framing::{SUBRECORD_HEADER_LEN, SubRecordHeader, split_subrecords},
    geodetic::{LonLat, project_beams},
    intensity::decode_intensity_series,
    ping_header::PingHeader,
    records::FormatVersion,
    scale_factor::ScaleFactorTable,
    sensor::{ImageryMetadata, SensorMetadata, SensorRegistry},
    subrecord::{BeamField, SCALE_FACTORS_ID, SubrecordKind},
    wire::WireReader,
};

/// Per-ping metadata gathered by the index pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PingInfo {
    /// Position of the ping among all swath pings of the file.
    pub index: usize,
    pub record_offset: u64,
    pub data_offset: u64,
    pub data_size: u32,
    /// Nanoseconds since the Unix epoch.
    pub time: i64,
    pub beam_count: usize,
    /// Subrecord ids in file order, scale factors excluded.
    pub subrecord_ids: Vec<u8>,
    /// Whether the ping carries its own scale-factor subrecord.
    pub has_scale_factors: bool,
    /// Own or inherited table; `None` before the first table in the file.
    pub scale_factors: Option<Arc<ScaleFactorTable>>,
}

impl PingInfo {
    /// Byte range of the ping data, relative to the start of the stream.
    pub fn data_range(&self) -> std::ops::Range<u64> {
        self.data_offset..self.data_offset + u64::from(self.data_size)
    }
}

/// What the index pass learns from one ping record without decoding its arrays.
#[derive(Debug, Clone)]
pub struct PingScan {
    pub header: PingHeader,
    pub subrecord_ids: Vec<u8>,
    pub scale_factors: Option<ScaleFactorTable>,
}

/// A ping that failed the index pass.
///
/// Carries the scale-factor table when it was read before the failure, so
/// later pings still inherit it.
#[derive(Debug)]
pub struct PingScanFailure {
    pub error: GsfError,
    pub scale_factors: Option<ScaleFactorTable>,
}

impl From<GsfError> for PingScanFailure {
    fn from(error: GsfError) -> Self {
        Self {
            error,
            scale_factors: None,
        }
    }
}

impl PingScan {
    /// Reads the ping header and walks the subrecords in file order.
    pub fn scan(
        data: &[u8],
        data_offset: u64,
        version: FormatVersion,
        record_offset: u64,
    ) -> std::result::Result<Self, PingScanFailure> {
        let mut reader = WireReader::new(data, data_offset);
        let header = PingHeader::decode(&mut reader, version, record_offset)?;
        let mut scan = Self {
            header,
            subrecord_ids: Vec::new(),
            scale_factors: None,
        };
        match scan.read_subrecords(&mut reader, record_offset) {
            Ok(()) => Ok(scan),
            Err(error) => Err(PingScanFailure {
                error,
                scale_factors: scan.scale_factors,
            }),
        }
    }

    fn read_subrecords(&mut self, reader: &mut WireReader<'_>, record_offset: u64) -> Result<()> {
        while reader.remaining() >= SUBRECORD_HEADER_LEN as usize {
            let sub = SubRecordHeader::parse(reader, record_offset)?;
            let mut payload = sub.payload(reader)?;
            if sub.id == SCALE_FACTORS_ID {
                self.scale_factors = Some(ScaleFactorTable::decode(&mut payload, record_offset)?);
            } else {
                self.subrecord_ids.push(sub.id);
            }
        }
        Ok(())
    }
}

/// Fully decoded ping.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPing {
    pub index: usize,
    pub header: PingHeader,
    pub beams: BeamArrays,
    /// Per-beam positions, when projection is enabled.
    pub position: Option<LonLat>,
    pub sensor: Option<SensorMetadata>,
    pub imagery: Option<ImageryMetadata>,
}

impl DecodedPing {
    pub fn beam_count(&self) -> usize {
        self.beams.len()
    }

    /// Beam fields decoded for this ping, in subrecord order.
    pub fn observed_fields(&self) -> Vec<BeamField> {
        self.beams.fields().collect()
    }
}

/// Decodes ping records against an index entry.
///
/// Holds only shared read-only state, so one decoder can be used from many
/// threads at once.
#[derive(Debug, Clone, Copy)]
pub struct PingDecoder<'a> {
    version: FormatVersion,
    sensors: &'a SensorRegistry,
    projection: bool,
}

impl<'a> PingDecoder<'a> {
    pub fn new(version: FormatVersion, sensors: &'a SensorRegistry) -> Self {
        Self {
            version,
            sensors,
            projection: true,
        }
    }

    pub fn with_projection(mut self, projection: bool) -> Self {
        self.projection = projection;
        self
    }

    /// Decodes `data`, the record data of the ping described by `info`.
    pub fn decode(&self, info: &PingInfo, data: &[u8]) -> Result<DecodedPing> {
        let record_offset = info.record_offset;
        let mut reader = WireReader::new(data, info.data_offset);
        let header = PingHeader::decode(&mut reader, self.version, record_offset)?;
        let beam_count = header.beam_count();
        let subrecords = split_subrecords(&mut reader, record_offset)?;

        let mut sensor_ids = subrecords.iter().filter_map(|(sub, _)| {
            matches!(SubrecordKind::classify(sub.id), SubrecordKind::SensorSpecific(_))
                .then_some(sub.id)
        });
        let sensor_id = sensor_ids.next();
        if let Some(extra) = sensor_ids.next() {
            return Err(GsfError::MalformedHeader {
                record_offset,
                detail: format!(
                    "ping carries sensor subrecords {} and {extra}",
                    sensor_id.unwrap_or_default()
                ),
            });
        }

        let mut arrays =
            BeamArrayDecoder::new(beam_count, info.scale_factors.as_deref(), record_offset);
        let mut sensor = None;
        let mut imagery = None;

        for (sub, mut payload) in subrecords {
            match SubrecordKind::classify(sub.id) {
                SubrecordKind::ScaleFactors => {}
                SubrecordKind::Beam(BeamField::IntensitySeries) => {
                    match decode_intensity_series(
                        &sub,
                        &mut payload,
                        beam_count,
                        sensor_id,
                        self.sensors,
                        record_offset,
                    )? {
                        Some(series) => {
                            imagery = Some(series.imagery);
                            arrays.push(
                                BeamField::IntensitySeries,
                                BeamColumn::Intensity(series.beams),
                            );
                        }
                        None => log::warn!(
                            "ping {}: intensity series skipped, no imagery layout for sensor {:?}",
                            info.index,
                            sensor_id
                        ),
                    }
                }
                SubrecordKind::Beam(field) => arrays.decode(field, &sub, &mut payload)?,
                SubrecordKind::SensorSpecific(_) => {
                    sensor = Some(self.sensors.decode(&sub, &mut payload, record_offset)?);
                }
                SubrecordKind::Unsupported(subrecord_id, reason) => {
                    return Err(GsfError::UnsupportedSubrecord {
                        subrecord_id,
                        reason,
                        record_offset,
                        subrecord_offset: sub.header_offset,
                    });
                }
            }
        }

        let beams = arrays.finish();
        let position = self.projection.then(|| project(&header, &beams));

        Ok(DecodedPing {
            index: info.index,
            header,
            beams,
            position,
            sensor,
            imagery,
        })
    }
}

/// Beam positions, or null positions when a track offset array is missing.
fn project(header: &PingHeader, beams: &BeamArrays) -> LonLat {
    match (
        beams.values(BeamField::AcrossTrack),
        beams.values(BeamField::AlongTrack),
    ) {
        (Some(across), Some(along)) => project_beams(
            header.longitude,
            header.latitude,
            header.heading,
            across,
            along,
        ),
        _ => LonLat::nulls(beams.len()),
    }
}
