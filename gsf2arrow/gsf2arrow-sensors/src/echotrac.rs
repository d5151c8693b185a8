use gsf2arrow_core::{EchotracSensor, SensorDecoder, SensorError, SensorMetadata, WireReader};

use crate::scaled_i16;

/// Odom Echotrac single-beam sounder recorded in a swath ping.
pub struct EchotracDecoder;

const ECHOTRAC_IDS: [u8; 1] = [201];

impl SensorDecoder for EchotracDecoder {
    fn sensor_ids(&self) -> &[u8] {
        &ECHOTRAC_IDS
    }

    fn decode_sensor(
        &self,
        sensor_id: u8,
        r: &mut WireReader<'_>,
    ) -> Result<SensorMetadata, SensorError> {
        let sensor = EchotracSensor {
            navigation_error: r.u16("navigation error")?,
            mpp_source: r.u8("mpp source")?,
            tide_source: r.u8("tide source")?,
            dynamic_draft: scaled_i16(r.i16("dynamic draft")?, 100.0),
        };
        r.skip(4, "echotrac spare")?;
        Ok(SensorMetadata::Echotrac { sensor_id, sensor })
    }
}
