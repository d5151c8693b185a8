//! Decoders for the non-ping top-level records.

use std::fmt;

use crate::{
    error::{GsfError, Result},
    record_type::RecordType,
    wire::{WireError, WireReader},
};

/// Major/minor version parsed from the `GSF-vMM.mm` header string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FormatVersion {
    pub major: u16,
    pub minor: u16,
}

impl FormatVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Parses `GSF-v03.09` style strings; the `GSF-v` prefix is optional.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim_matches(char::from(0)).trim();
        let digits = text.strip_prefix("GSF-v").unwrap_or(text);
        let (major, minor) = digits.split_once('.')?;
        let minor: String = minor.chars().take_while(char::is_ascii_digit).collect();
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }
}

impl Default for FormatVersion {
    /// Files without a header record are decoded with the current layout.
    fn default() -> Self {
        Self::new(3, 9)
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GSF-v{:02}.{:02}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub time: i64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct History {
    pub time: i64,
    pub host_name: String,
    pub operator_name: String,
    pub command_line: String,
    pub comment: String,
}

/// Processing or sensor parameters as `KEY=VALUE` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub time: i64,
    pub entries: Vec<(String, String)>,
}

impl Parameters {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwathSummary {
    pub start_time: i64,
    pub end_time: i64,
    pub min_latitude: f64,
    pub min_longitude: f64,
    pub max_latitude: f64,
    pub max_longitude: f64,
    pub min_depth: f64,
    pub max_depth: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SoundVelocityProfile {
    pub observation_time: i64,
    pub application_time: i64,
    pub longitude: f64,
    pub latitude: f64,
    /// `(depth m, sound speed m/s)` pairs.
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttitudeSample {
    /// Nanoseconds since the Unix epoch.
    pub time: i64,
    pub pitch: f64,
    pub roll: f64,
    pub heave: f64,
    pub heading: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HvNavigationError {
    pub time: i64,
    pub record_id: i32,
    pub horizontal_error: f64,
    pub vertical_error: f64,
    pub position_type: String,
}

/// A decoded non-ping record.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Header(FormatVersion),
    SoundVelocityProfile(SoundVelocityProfile),
    ProcessingParameters(Parameters),
    SensorParameters(Parameters),
    Comment(Comment),
    History(History),
    SwathSummary(SwathSummary),
    HvNavigationError(HvNavigationError),
    Attitude(Vec<AttitudeSample>),
}

impl Record {
    /// Number of measurements the record contributes to the file statistics.
    pub fn measurement_count(&self) -> u64 {
        match self {
            Self::SoundVelocityProfile(svp) => svp.points.len() as u64,
            Self::Attitude(samples) => samples.len() as u64,
            _ => 1,
        }
    }
}

/// Decodes the data of a non-ping record.
///
/// Returns `Ok(None)` for ping records, obsolete records and unknown ids,
/// which are indexed but not decoded here.
pub fn decode_record(
    record_type: RecordType,
    data: &[u8],
    record_offset: u64,
    data_offset: u64,
) -> Result<Option<Record>> {
    let mut r = WireReader::new(data, data_offset);
    let wire = |e: WireError| GsfError::payload(record_offset, e);
    let record = match record_type {
        RecordType::Header => {
            let text = r.text(data.len(), "version string").map_err(wire)?;
            let version =
                FormatVersion::parse(&text).ok_or_else(|| GsfError::MalformedHeader {
                    record_offset,
                    detail: format!("unrecognized version string {text:?}"),
                })?;
            Record::Header(version)
        }
        RecordType::Comment => Record::Comment(comment(&mut r).map_err(wire)?),
        RecordType::History => Record::History(history(&mut r).map_err(wire)?),
        RecordType::ProcessingParameters => {
            Record::ProcessingParameters(parameters(&mut r).map_err(wire)?)
        }
        RecordType::SensorParameters => {
            Record::SensorParameters(parameters(&mut r).map_err(wire)?)
        }
        RecordType::SwathSummary => Record::SwathSummary(swath_summary(&mut r).map_err(wire)?),
        RecordType::SoundVelocityProfile => {
            Record::SoundVelocityProfile(svp(&mut r).map_err(wire)?)
        }
        RecordType::HvNavigationError => {
            Record::HvNavigationError(hv_nav_error(&mut r).map_err(wire)?)
        }
        RecordType::Attitude => Record::Attitude(attitude(&mut r).map_err(wire)?),
        RecordType::SwathBathymetryPing
        | RecordType::SingleBeamPing
        | RecordType::NavigationError
        | RecordType::Unknown(_) => return Ok(None),
    };
    Ok(Some(record))
}

fn comment(r: &mut WireReader<'_>) -> std::result::Result<Comment, WireError> {
    let time = r.time("comment time")?;
    let len = r.u32("comment length")? as usize;
    let text = r.text(len, "comment text")?;
    Ok(Comment { time, text })
}

fn counted_text(
    r: &mut WireReader<'_>,
    what: &'static str,
) -> std::result::Result<String, WireError> {
    let len = r.u16(what)? as usize;
    r.text(len, what)
}

fn history(r: &mut WireReader<'_>) -> std::result::Result<History, WireError> {
    Ok(History {
        time: r.time("history time")?,
        host_name: counted_text(r, "host name")?,
        operator_name: counted_text(r, "operator name")?,
        command_line: counted_text(r, "command line")?,
        comment: counted_text(r, "history comment")?,
    })
}

fn parameters(r: &mut WireReader<'_>) -> std::result::Result<Parameters, WireError> {
    let time = r.time("parameter time")?;
    let count = r.i16("parameter count")?.max(0) as usize;
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let len = r.i16("parameter length")?.max(0) as usize;
        let text = r.text(len, "parameter")?;
        let (key, value) = text.split_once('=').unwrap_or((text.as_str(), ""));
        entries.push((key.trim().to_string(), value.trim().to_string()));
    }
    Ok(Parameters { time, entries })
}

fn swath_summary(r: &mut WireReader<'_>) -> std::result::Result<SwathSummary, WireError> {
    Ok(SwathSummary {
        start_time: r.time("start time")?,
        end_time: r.time("end time")?,
        min_latitude: f64::from(r.i32("min latitude")?) / 1.0e7,
        min_longitude: f64::from(r.i32("min longitude")?) / 1.0e7,
        max_latitude: f64::from(r.i32("max latitude")?) / 1.0e7,
        max_longitude: f64::from(r.i32("max longitude")?) / 1.0e7,
        min_depth: f64::from(r.i32("min depth")?) / 100.0,
        max_depth: f64::from(r.i32("max depth")?) / 100.0,
    })
}

fn svp(r: &mut WireReader<'_>) -> std::result::Result<SoundVelocityProfile, WireError> {
    let observation_time = r.time("observation time")?;
    let application_time = r.time("application time")?;
    let longitude = f64::from(r.i32("svp longitude")?) / 1.0e7;
    let latitude = f64::from(r.i32("svp latitude")?) / 1.0e7;
    let count = r.u32("svp point count")? as usize;
    // Each point is 8 bytes; cap the allocation by what the record can hold.
    let mut points = Vec::with_capacity(count.min(r.remaining() / 8));
    for _ in 0..count {
        let depth = f64::from(r.u32("svp depth")?) / 100.0;
        let speed = f64::from(r.u32("sound speed")?) / 100.0;
        points.push((depth, speed));
    }
    Ok(SoundVelocityProfile {
        observation_time,
        application_time,
        longitude,
        latitude,
        points,
    })
}

fn hv_nav_error(r: &mut WireReader<'_>) -> std::result::Result<HvNavigationError, WireError> {
    let time = r.time("navigation error time")?;
    let record_id = r.i32("navigation error record id")?;
    let horizontal_error = f64::from(r.i32("horizontal error")?) / 1000.0;
    let vertical_error = f64::from(r.i32("vertical error")?) / 1000.0;
    r.skip(2, "spare")?;
    let position_type = counted_text(r, "position type")?;
    Ok(HvNavigationError {
        time,
        record_id,
        horizontal_error,
        vertical_error,
        position_type,
    })
}

fn attitude(r: &mut WireReader<'_>) -> std::result::Result<Vec<AttitudeSample>, WireError> {
    let base = r.time("attitude time")?;
    let count = r.u16("attitude count")? as usize;
    let mut samples = Vec::with_capacity(count);
    for _ in 0..count {
        let offset_ms = i64::from(r.i16("attitude time offset")?);
        samples.push(AttitudeSample {
            time: base + offset_ms * 1_000_000,
            pitch: f64::from(r.i16("attitude pitch")?) / 100.0,
            roll: f64::from(r.i16("attitude roll")?) / 100.0,
            heave: f64::from(r.i16("attitude heave")?) / 100.0,
            heading: f64::from(r.u16("attitude heading")?) / 100.0,
        });
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_version_strings() {
        assert_eq!(FormatVersion::parse("GSF-v03.09"), Some(FormatVersion::new(3, 9)));
        assert_eq!(FormatVersion::parse("GSF-v02.01\0\0"), Some(FormatVersion::new(2, 1)));
        assert_eq!(FormatVersion::parse("nonsense"), None);
        assert_eq!(FormatVersion::new(3, 9).to_string(), "GSF-v03.09");
    }
}
