//! Sensor-specific subrecord contract and registry.
//!
//! Vendor layouts live outside this crate. A [`SensorDecoder`] claims one or
//! more subrecord ids (101 and above) and turns their payloads into a
//! [`SensorMetadata`] variant; families with backscatter also decode the
//! imagery block embedded in the intensity series.

use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
    error::{GsfError, Result, SensorError},
    framing::SubRecordHeader,
    wire::WireReader,
};

/// Decoder for a family of sensor-specific subrecords.
pub trait SensorDecoder: Send + Sync {
    /// Subrecord ids handled by this decoder.
    fn sensor_ids(&self) -> &[u8];

    /// Decodes the sensor-specific subrecord payload.
    fn decode_sensor(
        &self,
        sensor_id: u8,
        payload: &mut WireReader<'_>,
    ) -> std::result::Result<SensorMetadata, SensorError>;

    /// Decodes the sensor imagery block at the start of an intensity series.
    ///
    /// Returns `Ok(None)` when the family carries no imagery layout.
    fn decode_imagery(
        &self,
        _sensor_id: u8,
        _payload: &mut WireReader<'_>,
    ) -> std::result::Result<Option<ImageryMetadata>, SensorError> {
        Ok(None)
    }
}

/// Kongsberg EM3000-series runtime header.
#[derive(Debug, Clone, PartialEq)]
pub struct Em3Sensor {
    pub model_number: u16,
    pub ping_counter: u16,
    pub serial_number: u16,
    pub surface_velocity: f64,
    pub transducer_depth: f64,
    pub valid_beams: u16,
    pub sample_rate: u16,
    pub depth_difference: f64,
    pub offset_multiplier: i8,
}

/// Kongsberg EM4-series (EM710/EM302/EM122/EM2040) header.
#[derive(Debug, Clone, PartialEq)]
pub struct Em4Sensor {
    pub model_number: u16,
    pub ping_counter: u16,
    pub serial_number: u16,
    pub surface_velocity: f64,
    pub transducer_depth: f64,
    pub valid_detections: u16,
    pub sampling_frequency: f64,
    pub doppler_correction_scale: u32,
    pub vehicle_depth: f64,
    pub transmit_sectors: u16,
}

/// Reson 7k-series header.
#[derive(Debug, Clone, PartialEq)]
pub struct Reson7kSensor {
    pub protocol_version: u16,
    pub device_id: u32,
    pub major_serial_number: u32,
    pub minor_serial_number: u32,
    pub ping_counter: u32,
    pub multi_ping_sequence: u16,
    pub frequency: f64,
    pub sample_rate: f64,
    pub receiver_bandwidth: f64,
    pub tx_pulse_width: f64,
    pub sound_velocity: f64,
}

/// R2Sonic 2020/2022/2024 header.
#[derive(Debug, Clone, PartialEq)]
pub struct R2SonicSensor {
    pub model_number: String,
    pub serial_number: String,
    /// Nanoseconds since the Unix epoch.
    pub time: i64,
    pub ping_number: u32,
    pub ping_period: f64,
    pub sound_speed: f64,
    pub frequency: f64,
    pub tx_power: f64,
    pub tx_pulse_width: f64,
    pub tx_beamwidth_vert: f64,
    pub tx_beamwidth_horiz: f64,
}

/// Echotrac single-beam sounder carried in a swath ping.
#[derive(Debug, Clone, PartialEq)]
pub struct EchotracSensor {
    pub navigation_error: u16,
    pub mpp_source: u8,
    pub tide_source: u8,
    pub dynamic_draft: f64,
}

/// Metadata from a decoder registered outside the bundled catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomSensor {
    pub sensor_id: u8,
    pub family: &'static str,
    pub fields: Vec<(&'static str, f64)>,
}

/// Decoded sensor-specific subrecord, tagged by sensor family.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorMetadata {
    KongsbergEm3 { sensor_id: u8, sensor: Em3Sensor },
    KongsbergEm4 { sensor_id: u8, sensor: Em4Sensor },
    Reson7k { sensor_id: u8, sensor: Reson7kSensor },
    R2Sonic { sensor_id: u8, sensor: R2SonicSensor },
    Echotrac { sensor_id: u8, sensor: EchotracSensor },
    Custom(CustomSensor),
    /// No decoder is registered for the id; the raw payload is kept.
    Opaque { sensor_id: u8, payload: Arc<[u8]> },
}

impl SensorMetadata {
    pub fn sensor_id(&self) -> u8 {
        match self {
            Self::KongsbergEm3 { sensor_id, .. }
            | Self::KongsbergEm4 { sensor_id, .. }
            | Self::Reson7k { sensor_id, .. }
            | Self::R2Sonic { sensor_id, .. }
            | Self::Echotrac { sensor_id, .. }
            | Self::Opaque { sensor_id, .. } => *sensor_id,
            Self::Custom(custom) => custom.sensor_id,
        }
    }

    pub fn family(&self) -> &'static str {
        match self {
            Self::KongsbergEm3 { .. } => "kongsberg_em3",
            Self::KongsbergEm4 { .. } => "kongsberg_em4",
            Self::Reson7k { .. } => "reson_7k",
            Self::R2Sonic { .. } => "r2sonic",
            Self::Echotrac { .. } => "echotrac",
            Self::Custom(custom) => custom.family,
            Self::Opaque { .. } => "opaque",
        }
    }

    /// Numeric fields as name/value pairs, used for tabular output.
    pub fn fields(&self) -> Vec<(&'static str, f64)> {
        match self {
            Self::KongsbergEm3 { sensor: s, .. } => vec![
                ("model_number", f64::from(s.model_number)),
                ("ping_counter", f64::from(s.ping_counter)),
                ("serial_number", f64::from(s.serial_number)),
                ("surface_velocity", s.surface_velocity),
                ("transducer_depth", s.transducer_depth),
                ("valid_beams", f64::from(s.valid_beams)),
                ("sample_rate", f64::from(s.sample_rate)),
                ("depth_difference", s.depth_difference),
                ("offset_multiplier", f64::from(s.offset_multiplier)),
            ],
            Self::KongsbergEm4 { sensor: s, .. } => vec![
                ("model_number", f64::from(s.model_number)),
                ("ping_counter", f64::from(s.ping_counter)),
                ("serial_number", f64::from(s.serial_number)),
                ("surface_velocity", s.surface_velocity),
                ("transducer_depth", s.transducer_depth),
                ("valid_detections", f64::from(s.valid_detections)),
                ("sampling_frequency", s.sampling_frequency),
                ("doppler_correction_scale", f64::from(s.doppler_correction_scale)),
                ("vehicle_depth", s.vehicle_depth),
                ("transmit_sectors", f64::from(s.transmit_sectors)),
            ],
            Self::Reson7k { sensor: s, .. } => vec![
                ("protocol_version", f64::from(s.protocol_version)),
                ("device_id", f64::from(s.device_id)),
                ("major_serial_number", f64::from(s.major_serial_number)),
                ("minor_serial_number", f64::from(s.minor_serial_number)),
                ("ping_counter", f64::from(s.ping_counter)),
                ("multi_ping_sequence", f64::from(s.multi_ping_sequence)),
                ("frequency", s.frequency),
                ("sample_rate", s.sample_rate),
                ("receiver_bandwidth", s.receiver_bandwidth),
                ("tx_pulse_width", s.tx_pulse_width),
                ("sound_velocity", s.sound_velocity),
            ],
            Self::R2Sonic { sensor: s, .. } => vec![
                ("ping_number", f64::from(s.ping_number)),
                ("ping_period", s.ping_period),
                ("sound_speed", s.sound_speed),
                ("frequency", s.frequency),
                ("tx_power", s.tx_power),
                ("tx_pulse_width", s.tx_pulse_width),
                ("tx_beamwidth_vert", s.tx_beamwidth_vert),
                ("tx_beamwidth_horiz", s.tx_beamwidth_horiz),
            ],
            Self::Echotrac { sensor: s, .. } => vec![
                ("navigation_error", f64::from(s.navigation_error)),
                ("mpp_source", f64::from(s.mpp_source)),
                ("tide_source", f64::from(s.tide_source)),
                ("dynamic_draft", s.dynamic_draft),
            ],
            Self::Custom(custom) => custom.fields.clone(),
            Self::Opaque { .. } => Vec::new(),
        }
    }
}

/// Imagery block of an intensity series, tagged by sensor family.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageryMetadata {
    KongsbergEm3 {
        range_norm: u16,
        start_tvg_ramp: u16,
        stop_tvg_ramp: u16,
        bsn: i8,
        bso: i8,
        mean_absorption: f64,
    },
    KongsbergEm4 {
        sampling_frequency: f64,
        mean_absorption: f64,
        tx_pulse_length: f64,
        range_norm: u16,
        start_tvg_ramp: u16,
        stop_tvg_ramp: u16,
        bsn: f64,
        bso: f64,
        tx_beam_width: f64,
        tvg_cross_over: f64,
    },
    Reson7k {
        size: u16,
    },
    /// Transmit settings are shared with the sensor subrecord; the receive
    /// settings only appear here.
    R2Sonic {
        sensor: R2SonicSensor,
        tx_steering_vert: f64,
        tx_steering_horiz: f64,
        tx_misc_info: u32,
        rx_bandwidth: f64,
        rx_sample_rate: f64,
        rx_range: f64,
        rx_gain: f64,
        rx_spreading: f64,
        rx_absorption: f64,
        rx_mount_tilt: f64,
        rx_misc_info: u32,
        num_beams: u16,
        more_info: [f64; 6],
    },
    Custom {
        family: &'static str,
        fields: Vec<(&'static str, f64)>,
    },
}

/// Decoders keyed by sensor-specific subrecord id.
#[derive(Clone, Default)]
pub struct SensorRegistry {
    decoders: HashMap<u8, Arc<dyn SensorDecoder>>,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `decoder` for every id it claims. Later registrations win.
    pub fn register(&mut self, decoder: Arc<dyn SensorDecoder>) {
        for &id in decoder.sensor_ids() {
            if self.decoders.insert(id, Arc::clone(&decoder)).is_some() {
                log::debug!("sensor decoder for subrecord {id} replaced");
            }
        }
    }

    pub fn contains(&self, sensor_id: u8) -> bool {
        self.decoders.contains_key(&sensor_id)
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Registered ids in ascending order.
    pub fn sensor_ids(&self) -> Vec<u8> {
        let mut ids: Vec<u8> = self.decoders.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Decodes a sensor-specific subrecord.
    ///
    /// Unregistered ids yield [`SensorMetadata::Opaque`] holding the payload.
    pub fn decode(
        &self,
        header: &SubRecordHeader,
        payload: &mut WireReader<'_>,
        record_offset: u64,
    ) -> Result<SensorMetadata> {
        let Some(decoder) = self.decoders.get(&header.id) else {
            log::debug!(
                "no decoder registered for sensor subrecord {} ({})",
                header.id,
                sensor_name(header.id).unwrap_or("unknown")
            );
            return Ok(SensorMetadata::Opaque {
                sensor_id: header.id,
                payload: Arc::from(payload.rest()),
            });
        };
        decoder
            .decode_sensor(header.id, payload)
            .map_err(|source| GsfError::SensorDecode {
                sensor_id: header.id,
                record_offset,
                subrecord_offset: header.header_offset,
                source,
            })
    }

    /// Decodes the imagery block of an intensity series for `sensor_id`.
    ///
    /// `Ok(None)` means no registered decoder knows the block layout.
    pub fn decode_imagery(
        &self,
        sensor_id: u8,
        header: &SubRecordHeader,
        payload: &mut WireReader<'_>,
        record_offset: u64,
    ) -> Result<Option<ImageryMetadata>> {
        let Some(decoder) = self.decoders.get(&sensor_id) else {
            return Ok(None);
        };
        decoder
            .decode_imagery(sensor_id, payload)
            .map_err(|source| GsfError::SensorDecode {
                sensor_id,
                record_offset,
                subrecord_offset: header.header_offset,
                source,
            })
    }
}

impl fmt::Debug for SensorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorRegistry")
            .field("sensor_ids", &self.sensor_ids())
            .finish()
    }
}

/// Name of a sensor-specific subrecord id.
pub fn sensor_name(id: u8) -> Option<&'static str> {
    let name = match id {
        101 => "seabeam",
        102 => "em12",
        103 => "em100",
        104 => "em950",
        105 => "em121a",
        106 => "em121",
        107 => "sass",
        108 => "seamap",
        109 => "seabat",
        110 => "em1000",
        111 => "typeiii_seabeam",
        112 => "sb_amp",
        113 => "seabat_ii",
        114 => "seabat_8101",
        115 => "seabeam_2112",
        116 => "elac_mkii",
        117 => "em3000",
        118 => "em1002",
        119 => "em300",
        120 => "cmp_sass",
        121 => "reson_8101",
        122 => "reson_8111",
        123 => "reson_8124",
        124 => "reson_8125",
        125 => "reson_8150",
        126 => "reson_8160",
        127 => "em120",
        128 => "em3002",
        129 => "em3000d",
        130 => "em3002d",
        131 => "em121a_sis",
        132 => "em710",
        133 => "em302",
        134 => "em122",
        135 => "geoswath_plus",
        136 => "klein_5410_bss",
        137 => "reson_7125",
        138 => "em2000",
        139 => "em300_raw",
        140 => "em1002_raw",
        141 => "em2000_raw",
        142 => "em3000_raw",
        143 => "em120_raw",
        144 => "em3002_raw",
        145 => "em3000d_raw",
        146 => "em3002d_raw",
        147 => "em121a_sis_raw",
        148 => "em2040",
        149 => "delta_t",
        150 => "r2sonic_2022",
        151 => "r2sonic_2024",
        152 => "r2sonic_2020",
        154 => "reson_tseries",
        155 => "kmall",
        201 => "sb_echotrac",
        202 => "sb_bathy2000",
        203 => "sb_mgd77",
        204 => "sb_bdb",
        205 => "sb_noshdb",
        206 => "sb_pdd",
        207 => "sb_navisound",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl SensorDecoder for Fixed {
        fn sensor_ids(&self) -> &[u8] {
            &[201]
        }

        fn decode_sensor(
            &self,
            sensor_id: u8,
            payload: &mut WireReader<'_>,
        ) -> std::result::Result<SensorMetadata, SensorError> {
            Ok(SensorMetadata::Echotrac {
                sensor_id,
                sensor: EchotracSensor {
                    navigation_error: payload.u16("navigation error")?,
                    mpp_source: payload.u8("mpp source")?,
                    tide_source: payload.u8("tide source")?,
                    dynamic_draft: 0.0,
                },
            })
        }
    }

    fn header(id: u8) -> SubRecordHeader {
        SubRecordHeader {
            id,
            size: 0,
            header_offset: 80,
            payload_offset: 84,
        }
    }

    #[test]
    fn dispatches_by_id_and_wraps_failures() {
        let mut registry = SensorRegistry::new();
        registry.register(Arc::new(Fixed));
        assert_eq!(registry.sensor_ids(), vec![201]);

        let raw = [0, 7, 1, 2];
        let meta = registry
            .decode(&header(201), &mut WireReader::new(&raw, 84), 8)
            .unwrap();
        assert_eq!(meta.sensor_id(), 201);
        assert_eq!(meta.family(), "echotrac");
        assert_eq!(meta.fields()[0], ("navigation_error", 7.0));

        let err = registry
            .decode(&header(201), &mut WireReader::new(&raw[..1], 84), 8)
            .unwrap_err();
        assert!(matches!(
            err,
            GsfError::SensorDecode {
                sensor_id: 201,
                record_offset: 8,
                subrecord_offset: 80,
                ..
            }
        ));
    }

    #[test]
    fn unregistered_ids_keep_raw_payload() {
        let registry = SensorRegistry::new();
        let raw = [9u8, 9];
        let meta = registry
            .decode(&header(117), &mut WireReader::new(&raw, 0), 0)
            .unwrap();
        assert!(matches!(meta, SensorMetadata::Opaque { sensor_id: 117, ref payload } if payload.len() == 2));
        assert_eq!(sensor_name(117), Some("em3000"));
        assert_eq!(sensor_name(153), None);
    }
}
