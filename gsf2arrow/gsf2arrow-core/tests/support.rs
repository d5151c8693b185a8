//! Builders for synthetic GSF byte streams.

#![allow(dead_code)]

pub const HEADER: u32 = 1;
pub const SWATH_PING: u32 = 2;
pub const SVP: u32 = 3;
pub const PROCESSING_PARAMETERS: u32 = 4;
pub const SENSOR_PARAMETERS: u32 = 5;
pub const COMMENT: u32 = 6;
pub const HISTORY: u32 = 7;
pub const NAV_ERROR: u32 = 8;
pub const SWATH_SUMMARY: u32 = 9;
pub const HV_NAV_ERROR: u32 = 11;
pub const ATTITUDE: u32 = 12;

/// Frames `payload` as a subrecord.
pub fn subrecord(id: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = ((u32::from(id) << 24) | payload.len() as u32)
        .to_be_bytes()
        .to_vec();
    out.extend_from_slice(payload);
    out
}

/// Scale-factor subrecord from `(subrecord id, scale, offset)` entries.
pub fn scale_factors(entries: &[(u8, u32, i32)]) -> Vec<u8> {
    let mut payload = (entries.len() as u32).to_be_bytes().to_vec();
    for &(id, scale, offset) in entries {
        payload.extend_from_slice(&(u32::from(id) << 24).to_be_bytes());
        payload.extend_from_slice(&scale.to_be_bytes());
        payload.extend_from_slice(&offset.to_be_bytes());
    }
    subrecord(100, &payload)
}

/// Beam-array subrecord of big-endian integers `width` bytes wide.
pub fn beam_array(id: u8, width: usize, values: &[i64]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(width * values.len());
    for &v in values {
        let bytes = v.to_be_bytes();
        payload.extend_from_slice(&bytes[8 - width..]);
    }
    subrecord(id, &payload)
}

/// Swath ping record data with a format version 3 header.
#[derive(Debug, Clone)]
pub struct PingBuilder {
    pub seconds: u32,
    pub nanoseconds: u32,
    pub longitude: f64,
    pub latitude: f64,
    pub heading: f64,
    pub beams: u16,
    pub subrecords: Vec<Vec<u8>>,
}

impl PingBuilder {
    pub fn new(seconds: u32, beams: u16) -> Self {
        Self {
            seconds,
            nanoseconds: 0,
            longitude: -70.0,
            latitude: 42.0,
            heading: 0.0,
            beams,
            subrecords: Vec::new(),
        }
    }

    pub fn heading(mut self, heading: f64) -> Self {
        self.heading = heading;
        self
    }

    pub fn with(mut self, subrecord: Vec<u8>) -> Self {
        self.subrecords.push(subrecord);
        self
    }

    pub fn data(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.seconds.to_be_bytes());
        out.extend_from_slice(&self.nanoseconds.to_be_bytes());
        out.extend_from_slice(&((self.longitude * 1.0e7).round() as i32).to_be_bytes());
        out.extend_from_slice(&((self.latitude * 1.0e7).round() as i32).to_be_bytes());
        out.extend_from_slice(&self.beams.to_be_bytes());
        out.extend_from_slice(&(self.beams / 2).to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&0i16.to_be_bytes());
        out.extend_from_slice(&0i32.to_be_bytes());
        out.extend_from_slice(&((self.heading * 100.0).round() as u16).to_be_bytes());
        out.extend_from_slice(&150i16.to_be_bytes());
        out.extend_from_slice(&(-25i16).to_be_bytes());
        out.extend_from_slice(&9900i16.to_be_bytes());
        out.extend_from_slice(&9000u16.to_be_bytes());
        out.extend_from_slice(&550u16.to_be_bytes());
        out.extend_from_slice(&12_345i32.to_be_bytes());
        out.extend_from_slice(&(-500i32).to_be_bytes());
        out.extend_from_slice(&0i32.to_be_bytes());
        out.extend_from_slice(&[0, 0]);
        for sub in &self.subrecords {
            out.extend_from_slice(sub);
        }
        out
    }
}

/// Sequential record writer.
#[derive(Debug, Default)]
pub struct GsfWriter {
    buf: Vec<u8>,
}

impl GsfWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(mut self, record_type: u32, data: &[u8]) -> Self {
        self.buf.extend_from_slice(&(data.len() as u32).to_be_bytes());
        self.buf.extend_from_slice(&record_type.to_be_bytes());
        self.buf.extend_from_slice(data);
        self
    }

    pub fn record_with_checksum(mut self, record_type: u32, data: &[u8], checksum: u32) -> Self {
        self.buf.extend_from_slice(&(data.len() as u32).to_be_bytes());
        self.buf
            .extend_from_slice(&(0x8000_0000 | record_type).to_be_bytes());
        self.buf.extend_from_slice(&checksum.to_be_bytes());
        self.buf.extend_from_slice(data);
        self
    }

    pub fn header(self, version: &str) -> Self {
        let mut data = version.as_bytes().to_vec();
        data.resize(12, 0);
        self.record(HEADER, &data)
    }

    pub fn ping(self, ping: &PingBuilder) -> Self {
        self.record(SWATH_PING, &ping.data())
    }

    pub fn comment(self, seconds: u32, text: &str) -> Self {
        let mut data = seconds.to_be_bytes().to_vec();
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(&(text.len() as u32).to_be_bytes());
        data.extend_from_slice(text.as_bytes());
        self.record(COMMENT, &data)
    }

    pub fn swath_summary(self) -> Self {
        let mut data = Vec::new();
        for word in [100u32, 0, 200, 0] {
            data.extend_from_slice(&word.to_be_bytes());
        }
        for v in [420_000_000i32, -700_000_000, 421_000_000, -699_000_000, 1000, 5000] {
            data.extend_from_slice(&v.to_be_bytes());
        }
        self.record(SWATH_SUMMARY, &data)
    }

    pub fn svp(self, points: &[(u32, u32)]) -> Self {
        let mut data = Vec::new();
        for word in [100u32, 0, 100, 0] {
            data.extend_from_slice(&word.to_be_bytes());
        }
        data.extend_from_slice(&0i32.to_be_bytes());
        data.extend_from_slice(&0i32.to_be_bytes());
        data.extend_from_slice(&(points.len() as u32).to_be_bytes());
        for &(depth, speed) in points {
            data.extend_from_slice(&depth.to_be_bytes());
            data.extend_from_slice(&speed.to_be_bytes());
        }
        self.record(SVP, &data)
    }

    pub fn history(self, seconds: u32, fields: [&str; 4]) -> Self {
        let mut data = seconds.to_be_bytes().to_vec();
        data.extend_from_slice(&0u32.to_be_bytes());
        for field in fields {
            data.extend_from_slice(&(field.len() as u16).to_be_bytes());
            data.extend_from_slice(field.as_bytes());
        }
        self.record(HISTORY, &data)
    }

    /// Processing or sensor parameters record of `KEY=VALUE` strings.
    pub fn parameters(self, record_type: u32, seconds: u32, entries: &[&str]) -> Self {
        let mut data = seconds.to_be_bytes().to_vec();
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(&(entries.len() as i16).to_be_bytes());
        for entry in entries {
            data.extend_from_slice(&(entry.len() as i16).to_be_bytes());
            data.extend_from_slice(entry.as_bytes());
        }
        self.record(record_type, &data)
    }

    /// Horizontal/vertical navigation error, errors in millimetres.
    pub fn hv_nav_error(self, seconds: u32, record_id: i32, errors: (i32, i32), kind: &str) -> Self {
        let mut data = seconds.to_be_bytes().to_vec();
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(&record_id.to_be_bytes());
        data.extend_from_slice(&errors.0.to_be_bytes());
        data.extend_from_slice(&errors.1.to_be_bytes());
        data.extend_from_slice(&[0, 0]);
        data.extend_from_slice(&(kind.len() as u16).to_be_bytes());
        data.extend_from_slice(kind.as_bytes());
        self.record(HV_NAV_ERROR, &data)
    }

    /// Attitude record from `(offset ms, pitch, roll, heave, heading)` samples
    /// in hundredths.
    pub fn attitude(self, seconds: u32, samples: &[(i16, i16, i16, i16, u16)]) -> Self {
        let mut data = seconds.to_be_bytes().to_vec();
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(&(samples.len() as u16).to_be_bytes());
        for &(offset, pitch, roll, heave, heading) in samples {
            data.extend_from_slice(&offset.to_be_bytes());
            data.extend_from_slice(&pitch.to_be_bytes());
            data.extend_from_slice(&roll.to_be_bytes());
            data.extend_from_slice(&heave.to_be_bytes());
            data.extend_from_slice(&heading.to_be_bytes());
        }
        self.record(ATTITUDE, &data)
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Two-beam ping with its own depth/across/along scale factors.
pub fn two_beam_ping(seconds: u32) -> PingBuilder {
    PingBuilder::new(seconds, 2)
        .with(scale_factors(&[(1, 100, 0), (2, 100, 0), (3, 100, 0)]))
        .with(beam_array(1, 2, &[1000, 2000]))
        .with(beam_array(2, 2, &[-500, 500]))
        .with(beam_array(3, 2, &[0, 0]))
}
