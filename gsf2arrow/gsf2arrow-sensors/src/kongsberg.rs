//! Kongsberg EM3000 and EM4 series.

use gsf2arrow_core::{
    Em3Sensor, Em4Sensor, ImageryMetadata, SensorDecoder, SensorError, SensorMetadata, WireReader,
};

use crate::{scaled_i16, scaled_i32, scaled_u16};

/// EM3000, EM3002, EM1002, EM300, EM120, EM121A (SIS) and EM2000.
pub struct Em3Decoder;

const EM3_IDS: [u8; 9] = [117, 118, 119, 127, 128, 129, 130, 131, 138];

impl SensorDecoder for Em3Decoder {
    fn sensor_ids(&self) -> &[u8] {
        &EM3_IDS
    }

    fn decode_sensor(
        &self,
        sensor_id: u8,
        r: &mut WireReader<'_>,
    ) -> Result<SensorMetadata, SensorError> {
        let sensor = Em3Sensor {
            model_number: r.u16("model number")?,
            ping_counter: r.u16("ping counter")?,
            serial_number: r.u16("serial number")?,
            surface_velocity: scaled_u16(r.u16("surface velocity")?, 10.0),
            transducer_depth: scaled_u16(r.u16("transducer depth")?, 100.0),
            valid_beams: r.u16("valid beams")?,
            sample_rate: r.u16("sample rate")?,
            depth_difference: scaled_i16(r.i16("depth difference")?, 100.0),
            offset_multiplier: r.i8("offset multiplier")?,
        };
        Ok(SensorMetadata::KongsbergEm3 { sensor_id, sensor })
    }

    fn decode_imagery(
        &self,
        _sensor_id: u8,
        r: &mut WireReader<'_>,
    ) -> Result<Option<ImageryMetadata>, SensorError> {
        let imagery = ImageryMetadata::KongsbergEm3 {
            range_norm: r.u16("range norm")?,
            start_tvg_ramp: r.u16("start tvg ramp")?,
            stop_tvg_ramp: r.u16("stop tvg ramp")?,
            bsn: r.i8("normal incidence backscatter")?,
            bso: r.i8("oblique backscatter")?,
            mean_absorption: scaled_u16(r.u16("mean absorption")?, 100.0),
        };
        r.skip(6, "em3 imagery offset and spare")?;
        Ok(Some(imagery))
    }
}

/// EM710, EM302 and EM122.
pub struct Em4Decoder;

const EM4_IDS: [u8; 3] = [132, 133, 134];

fn sampling_frequency(r: &mut WireReader<'_>) -> Result<f64, SensorError> {
    let whole = r.u32("sampling frequency")?;
    let fraction = r.u32("sampling frequency fraction")?;
    Ok(f64::from(whole) + f64::from(fraction) / 4.0e9)
}

impl SensorDecoder for Em4Decoder {
    fn sensor_ids(&self) -> &[u8] {
        &EM4_IDS
    }

    fn decode_sensor(
        &self,
        sensor_id: u8,
        r: &mut WireReader<'_>,
    ) -> Result<SensorMetadata, SensorError> {
        let model_number = r.u16("model number")?;
        let ping_counter = r.u16("ping counter")?;
        let serial_number = r.u16("serial number")?;
        let surface_velocity = scaled_u16(r.u16("surface velocity")?, 10.0);
        let transducer_depth = scaled_i32(r.i32("transducer depth")?, 20_000.0);
        let valid_detections = r.u16("valid detections")?;
        let sampling_frequency = sampling_frequency(r)?;
        let doppler_correction_scale = r.u32("doppler correction scale")?;
        let vehicle_depth = scaled_i32(r.i32("vehicle depth")?, 1000.0);
        r.skip(16, "em4 spare")?;
        let transmit_sectors = r.u16("transmit sectors")?;
        if transmit_sectors > 20 {
            return Err(SensorError::InvalidField {
                field: "transmit sectors",
                detail: format!("{transmit_sectors} exceeds the 20 sectors the format allows"),
            });
        }
        Ok(SensorMetadata::KongsbergEm4 {
            sensor_id,
            sensor: Em4Sensor {
                model_number,
                ping_counter,
                serial_number,
                surface_velocity,
                transducer_depth,
                valid_detections,
                sampling_frequency,
                doppler_correction_scale,
                vehicle_depth,
                transmit_sectors,
            },
        })
    }

    fn decode_imagery(
        &self,
        _sensor_id: u8,
        r: &mut WireReader<'_>,
    ) -> Result<Option<ImageryMetadata>, SensorError> {
        let imagery = ImageryMetadata::KongsbergEm4 {
            sampling_frequency: sampling_frequency(r)?,
            mean_absorption: scaled_u16(r.u16("mean absorption")?, 100.0),
            tx_pulse_length: f64::from(r.u16("tx pulse length")?),
            range_norm: r.u16("range norm")?,
            start_tvg_ramp: r.u16("start tvg ramp")?,
            stop_tvg_ramp: r.u16("stop tvg ramp")?,
            bsn: scaled_i16(r.i16("normal incidence backscatter")?, 10.0),
            bso: scaled_i16(r.i16("oblique backscatter")?, 10.0),
            tx_beam_width: scaled_u16(r.u16("tx beam width")?, 10.0),
            tvg_cross_over: scaled_u16(r.u16("tvg cross over")?, 10.0),
        };
        r.skip(22, "em4 imagery offset and spare")?;
        Ok(Some(imagery))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn em3_header_fields() {
        let mut raw = Vec::new();
        for v in [3000u16, 12, 501, 15_000, 450, 127, 9000] {
            raw.extend_from_slice(&v.to_be_bytes());
        }
        raw.extend_from_slice(&(-250i16).to_be_bytes());
        raw.push(0xFF);

        let meta = Em3Decoder
            .decode_sensor(117, &mut WireReader::new(&raw, 0))
            .unwrap();
        let SensorMetadata::KongsbergEm3 { sensor_id, sensor } = meta else {
            panic!("wrong family");
        };
        assert_eq!(sensor_id, 117);
        assert_eq!(sensor.surface_velocity, 1500.0);
        assert_eq!(sensor.transducer_depth, 4.5);
        assert_eq!(sensor.depth_difference, -2.5);
        assert_eq!(sensor.offset_multiplier, -1);
    }

    #[test]
    fn em4_rejects_too_many_sectors() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&[0; 8]);
        raw.extend_from_slice(&0i32.to_be_bytes());
        raw.extend_from_slice(&[0; 2]);
        raw.extend_from_slice(&[0; 8]);
        raw.extend_from_slice(&[0; 4]);
        raw.extend_from_slice(&0i32.to_be_bytes());
        raw.extend_from_slice(&[0; 16]);
        raw.extend_from_slice(&21u16.to_be_bytes());

        let err = Em4Decoder
            .decode_sensor(132, &mut WireReader::new(&raw, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            SensorError::InvalidField {
                field: "transmit sectors",
                ..
            }
        ));
    }
}
