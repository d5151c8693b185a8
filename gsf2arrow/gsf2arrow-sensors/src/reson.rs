//! Reson 7k series (7125 and T-series).

use gsf2arrow_core::{
    ImageryMetadata, Reson7kSensor, SensorDecoder, SensorError, SensorMetadata, WireReader,
};

use crate::scaled_u32;

pub struct Reson7kDecoder;

const RESON_7K_IDS: [u8; 2] = [137, 154];

impl SensorDecoder for Reson7kDecoder {
    fn sensor_ids(&self) -> &[u8] {
        &RESON_7K_IDS
    }

    fn decode_sensor(
        &self,
        sensor_id: u8,
        r: &mut WireReader<'_>,
    ) -> Result<SensorMetadata, SensorError> {
        let protocol_version = r.u16("protocol version")?;
        let device_id = r.u32("device id")?;
        r.skip(16, "reson reserved")?;
        let sensor = Reson7kSensor {
            protocol_version,
            device_id,
            major_serial_number: r.u32("major serial number")?,
            minor_serial_number: r.u32("minor serial number")?,
            ping_counter: r.u32("ping counter")?,
            multi_ping_sequence: r.u16("multi ping sequence")?,
            frequency: scaled_u32(r.u32("frequency")?, 1.0e3),
            sample_rate: scaled_u32(r.u32("sample rate")?, 1.0e4),
            receiver_bandwidth: scaled_u32(r.u32("receiver bandwidth")?, 1.0e4),
            tx_pulse_width: scaled_u32(r.u32("tx pulse width")?, 1.0e7),
            sound_velocity: scaled_u32(r.u32("sound velocity")?, 1.0e3),
        };
        Ok(SensorMetadata::Reson7k { sensor_id, sensor })
    }

    fn decode_imagery(
        &self,
        _sensor_id: u8,
        r: &mut WireReader<'_>,
    ) -> Result<Option<ImageryMetadata>, SensorError> {
        let size = r.u16("reson imagery size")?;
        r.skip(64, "reson imagery spare")?;
        Ok(Some(ImageryMetadata::Reson7k { size }))
    }
}
