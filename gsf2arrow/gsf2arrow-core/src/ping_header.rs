//! Fixed header at the start of every swath bathymetry ping record.

use crate::{
    error::{GsfError, Result},
    records::FormatVersion,
    sentinel,
    wire::{WireError, WireReader},
};

/// Header length for format major versions up to 2.
pub const PING_HEADER_LEN_V2: usize = 42;
/// Header length once the height/separation/GPS-tide block was added.
pub const PING_HEADER_LEN_V3: usize = 56;

/// Navigation, attitude and correctors of one ping.
#[derive(Debug, Clone, PartialEq)]
pub struct PingHeader {
    /// Nanoseconds since the Unix epoch.
    pub time: i64,
    pub longitude: f64,
    pub latitude: f64,
    pub number_beams: u16,
    pub centre_beam: u16,
    pub ping_flags: u16,
    pub tide_corrector: f64,
    pub depth_corrector: f64,
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
    pub heave: f64,
    pub course: f64,
    pub speed: f64,
    pub height: Option<f64>,
    pub separation: Option<f64>,
    pub gps_tide_corrector: Option<f64>,
}

impl PingHeader {
    pub fn encoded_len(version: FormatVersion) -> usize {
        if version.major > 2 {
            PING_HEADER_LEN_V3
        } else {
            PING_HEADER_LEN_V2
        }
    }

    /// Decodes the header and leaves `reader` at the first subrecord.
    pub fn decode(
        reader: &mut WireReader<'_>,
        version: FormatVersion,
        record_offset: u64,
    ) -> Result<Self> {
        Self::decode_inner(reader, version).map_err(|e| GsfError::MalformedHeader {
            record_offset,
            detail: format!("ping header: {e}"),
        })
    }

    fn decode_inner(
        reader: &mut WireReader<'_>,
        version: FormatVersion,
    ) -> std::result::Result<Self, WireError> {
        let time = reader.time("ping time")?;
        let longitude = f64::from(reader.i32("longitude")?) / 1.0e7;
        let latitude = f64::from(reader.i32("latitude")?) / 1.0e7;
        let number_beams = reader.u16("number of beams")?;
        let centre_beam = reader.u16("centre beam")?;
        let ping_flags = reader.u16("ping flags")?;
        reader.skip(2, "reserved")?;
        let tide_corrector = f64::from(reader.i16("tide corrector")?) / 100.0;
        let depth_corrector = f64::from(reader.i32("depth corrector")?) / 100.0;
        let heading = f64::from(reader.u16("heading")?) / 100.0;
        let pitch = f64::from(reader.i16("pitch")?) / 100.0;
        let roll = f64::from(reader.i16("roll")?) / 100.0;
        let heave = f64::from(reader.i16("heave")?) / 100.0;
        let course = f64::from(reader.u16("course")?) / 100.0;
        let speed = f64::from(reader.u16("speed")?) / 100.0;

        let (height, separation, gps_tide_corrector) = if version.major > 2 {
            let height = f64::from(reader.i32("height")?) / 1000.0;
            let separation = f64::from(reader.i32("separation")?) / 1000.0;
            let gps_tide = f64::from(reader.i32("gps tide corrector")?) / 1000.0;
            reader.skip(2, "spare")?;
            (Some(height), Some(separation), Some(gps_tide))
        } else {
            (None, None, None)
        };

        Ok(Self {
            time,
            longitude,
            latitude,
            number_beams,
            centre_beam,
            ping_flags,
            tide_corrector,
            depth_corrector,
            heading,
            pitch,
            roll,
            heave,
            course,
            speed,
            height,
            separation,
            gps_tide_corrector,
        })
    }

    pub fn beam_count(&self) -> usize {
        usize::from(self.number_beams)
    }

    pub fn heading_value(&self) -> Option<f64> {
        non_null(self.heading, sentinel::NULL_HEADING)
    }

    pub fn course_value(&self) -> Option<f64> {
        non_null(self.course, sentinel::NULL_COURSE)
    }

    pub fn speed_value(&self) -> Option<f64> {
        non_null(self.speed, sentinel::NULL_SPEED)
    }

    pub fn pitch_value(&self) -> Option<f64> {
        non_null(self.pitch, sentinel::NULL_PITCH)
    }

    pub fn roll_value(&self) -> Option<f64> {
        non_null(self.roll, sentinel::NULL_ROLL)
    }

    pub fn heave_value(&self) -> Option<f64> {
        non_null(self.heave, sentinel::NULL_HEAVE)
    }

    pub fn tide_corrector_value(&self) -> Option<f64> {
        non_null(self.tide_corrector, sentinel::NULL_TIDE_CORRECTOR)
    }

    pub fn depth_corrector_value(&self) -> Option<f64> {
        non_null(self.depth_corrector, sentinel::NULL_DEPTH_CORRECTOR)
    }
}

fn non_null(value: f64, null: f64) -> Option<f64> {
    (!sentinel::is_null(value, null)).then_some(value)
}
