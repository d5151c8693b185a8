//! R2Sonic 2020, 2022 and 2024.

use gsf2arrow_core::{
    ImageryMetadata, R2SonicSensor, SensorDecoder, SensorError, SensorMetadata, WireReader,
};

use crate::{scaled_i32, scaled_u32};

pub struct R2SonicDecoder;

const R2SONIC_IDS: [u8; 3] = [150, 151, 152];
const NAME_LEN: usize = 12;

/// Identification and transmit settings leading both the sensor subrecord and
/// the imagery block.
fn transmit_header(r: &mut WireReader<'_>) -> Result<R2SonicSensor, SensorError> {
    Ok(R2SonicSensor {
        model_number: r.text(NAME_LEN, "model number")?,
        serial_number: r.text(NAME_LEN, "serial number")?,
        time: r.time("r2sonic time")?,
        ping_number: r.u32("ping number")?,
        ping_period: scaled_u32(r.u32("ping period")?, 1.0e6),
        sound_speed: scaled_u32(r.u32("sound speed")?, 1.0e2),
        frequency: scaled_u32(r.u32("frequency")?, 1.0e3),
        tx_power: scaled_u32(r.u32("tx power")?, 1.0e2),
        tx_pulse_width: scaled_u32(r.u32("tx pulse width")?, 1.0e7),
        tx_beamwidth_vert: scaled_u32(r.u32("tx beamwidth vertical")?, 1.0e6),
        tx_beamwidth_horiz: scaled_u32(r.u32("tx beamwidth horizontal")?, 1.0e6),
    })
}

impl SensorDecoder for R2SonicDecoder {
    fn sensor_ids(&self) -> &[u8] {
        &R2SONIC_IDS
    }

    fn decode_sensor(
        &self,
        sensor_id: u8,
        r: &mut WireReader<'_>,
    ) -> Result<SensorMetadata, SensorError> {
        let sensor = transmit_header(r)?;
        Ok(SensorMetadata::R2Sonic { sensor_id, sensor })
    }

    fn decode_imagery(
        &self,
        _sensor_id: u8,
        r: &mut WireReader<'_>,
    ) -> Result<Option<ImageryMetadata>, SensorError> {
        let sensor = transmit_header(r)?;
        let tx_steering_vert = scaled_i32(r.i32("tx steering vertical")?, 1.0e6);
        let tx_steering_horiz = scaled_i32(r.i32("tx steering horizontal")?, 1.0e6);
        let tx_misc_info = r.u32("tx misc info")?;
        let rx_bandwidth = scaled_u32(r.u32("rx bandwidth")?, 1.0e4);
        let rx_sample_rate = scaled_u32(r.u32("rx sample rate")?, 1.0e3);
        let rx_range = scaled_u32(r.u32("rx range")?, 1.0e5);
        let rx_gain = scaled_u32(r.u32("rx gain")?, 1.0e2);
        let rx_spreading = scaled_u32(r.u32("rx spreading")?, 1.0e3);
        let rx_absorption = scaled_u32(r.u32("rx absorption")?, 1.0e3);
        let rx_mount_tilt = scaled_i32(r.i32("rx mount tilt")?, 1.0e6);
        let rx_misc_info = r.u32("rx misc info")?;
        r.skip(2, "r2sonic imagery reserved")?;
        let num_beams = r.u16("r2sonic imagery beams")?;
        let mut more_info = [0.0; 6];
        for slot in &mut more_info {
            *slot = scaled_i32(r.i32("more info")?, 1.0e6);
        }
        r.skip(32, "r2sonic imagery spare")?;
        Ok(Some(ImageryMetadata::R2Sonic {
            sensor,
            tx_steering_vert,
            tx_steering_horiz,
            tx_misc_info,
            rx_bandwidth,
            rx_sample_rate,
            rx_range,
            rx_gain,
            rx_spreading,
            rx_absorption,
            rx_mount_tilt,
            rx_misc_info,
            num_beams,
            more_info,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leading_fields() -> Vec<u8> {
        let mut raw = b"2024\0\0\0\0\0\0\0\0".to_vec();
        raw.extend_from_slice(b"SN-77\0\0\0\0\0\0\0");
        raw.extend_from_slice(&[0; 8]);
        raw.extend_from_slice(&42u32.to_be_bytes());
        raw.extend_from_slice(&50_000u32.to_be_bytes());
        raw.extend_from_slice(&150_000u32.to_be_bytes());
        raw.extend_from_slice(&400_000u32.to_be_bytes());
        raw.extend_from_slice(&[0; 16]);
        raw
    }

    #[test]
    fn names_are_nul_trimmed() {
        let raw = leading_fields();
        let SensorMetadata::R2Sonic { sensor, .. } = R2SonicDecoder
            .decode_sensor(151, &mut WireReader::new(&raw, 0))
            .unwrap()
        else {
            panic!("wrong family");
        };
        assert_eq!(sensor.model_number, "2024");
        assert_eq!(sensor.serial_number, "SN-77");
        assert_eq!(sensor.ping_number, 42);
        assert_eq!(sensor.ping_period, 0.05);
        assert_eq!(sensor.sound_speed, 1500.0);
        assert_eq!(sensor.frequency, 400.0);
    }

    #[test]
    fn imagery_block_reads_receive_settings_and_spare() {
        let mut raw = leading_fields();
        raw.extend_from_slice(&(-2_000_000i32).to_be_bytes());
        raw.extend_from_slice(&0i32.to_be_bytes());
        raw.extend_from_slice(&7u32.to_be_bytes());
        raw.extend_from_slice(&600_000u32.to_be_bytes());
        raw.extend_from_slice(&[0; 20]);
        raw.extend_from_slice(&30_000_000i32.to_be_bytes());
        raw.extend_from_slice(&9u32.to_be_bytes());
        raw.extend_from_slice(&[0, 0]);
        raw.extend_from_slice(&256u16.to_be_bytes());
        raw.extend_from_slice(&1_500_000i32.to_be_bytes());
        raw.extend_from_slice(&[0; 20]);
        raw.extend_from_slice(&[0; 32]);
        assert_eq!(raw.len(), 168);
        raw.extend_from_slice(&0xABCDu16.to_be_bytes());

        let mut r = WireReader::new(&raw, 0);
        let Some(ImageryMetadata::R2Sonic {
            sensor,
            tx_steering_vert,
            tx_misc_info,
            rx_bandwidth,
            rx_mount_tilt,
            rx_misc_info,
            num_beams,
            more_info,
            ..
        }) = R2SonicDecoder.decode_imagery(150, &mut r).unwrap()
        else {
            panic!("wrong family");
        };
        assert_eq!(sensor.frequency, 400.0);
        assert_eq!(tx_steering_vert, -2.0);
        assert_eq!(tx_misc_info, 7);
        assert_eq!(rx_bandwidth, 60.0);
        assert_eq!(rx_mount_tilt, 30.0);
        assert_eq!(rx_misc_info, 9);
        assert_eq!(num_beams, 256);
        assert_eq!(more_info[0], 1.5);
        assert_eq!(r.u16("after block").unwrap(), 0xABCD);
    }
}
