//! Intensity series (per-beam backscatter time series) subrecord.

use crate::{
    beam::BeamIntensity,
    error::{GsfError, Result},
    framing::SubRecordHeader,
    sensor::{ImageryMetadata, SensorRegistry},
    subrecord::BeamField,
    wire::{WireError, WireReader},
};

/// Decoded intensity-series subrecord.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensitySeries {
    pub bits_per_sample: u8,
    pub applied_corrections: u32,
    pub imagery: ImageryMetadata,
    pub beams: Vec<BeamIntensity>,
}

/// Decodes an intensity series for a ping of `beam_count` beams.
///
/// The embedded imagery block has a sensor-dependent length, so the series can
/// only be walked when a decoder for `sensor_id` knows its layout. Returns
/// `Ok(None)` otherwise.
pub fn decode_intensity_series(
    header: &SubRecordHeader,
    payload: &mut WireReader<'_>,
    beam_count: usize,
    sensor_id: Option<u8>,
    sensors: &SensorRegistry,
    record_offset: u64,
) -> Result<Option<IntensitySeries>> {
    let wire = |e: WireError| GsfError::payload(record_offset, e);

    let bits_per_sample = payload.u8("bits per sample").map_err(wire)?;
    let applied_corrections = payload.u32("applied corrections").map_err(wire)?;
    payload.skip(16, "intensity spare").map_err(wire)?;

    let Some(sensor_id) = sensor_id else {
        return Ok(None);
    };
    let Some(imagery) = sensors.decode_imagery(sensor_id, header, payload, record_offset)? else {
        return Ok(None);
    };

    let width = match bits_per_sample {
        8 => 1,
        16 => 2,
        32 => 4,
        other => {
            return Err(GsfError::InvalidBeamArray {
                field: BeamField::IntensitySeries.name(),
                record_offset,
                subrecord_offset: header.header_offset,
                detail: format!("unsupported sample width of {other} bits"),
            });
        }
    };

    let mut beams = Vec::with_capacity(beam_count);
    for _ in 0..beam_count {
        let sample_count = payload.u16("sample count").map_err(wire)?;
        let detect_sample = payload.u16("detect sample").map_err(wire)?;
        let start_range_samples = payload.u16("start range samples").map_err(wire)?;
        payload.skip(8, "beam spare").map_err(wire)?;
        let mut samples = Vec::with_capacity(usize::from(sample_count));
        for _ in 0..sample_count {
            let raw = payload.unsigned(width, "intensity sample").map_err(wire)?;
            samples.push(raw as f32);
        }
        beams.push(BeamIntensity {
            sample_count,
            detect_sample,
            start_range_samples,
            samples,
        });
    }

    Ok(Some(IntensitySeries {
        bits_per_sample,
        applied_corrections,
        imagery,
        beams,
    }))
}
