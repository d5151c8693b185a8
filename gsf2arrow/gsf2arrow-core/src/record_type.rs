use std::fmt;

/// Top-level record types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordType {
    /// File header carrying the format version string (`1`)
    Header,
    /// Multibeam ping (`2`)
    SwathBathymetryPing,
    /// Sound velocity profile (`3`)
    SoundVelocityProfile,
    /// Processing parameters (`4`)
    ProcessingParameters,
    /// Sensor parameters (`5`)
    SensorParameters,
    /// Free text comment (`6`)
    Comment,
    /// Processing history (`7`)
    History,
    /// Navigation error, withdrawn in favour of `HvNavigationError` (`8`)
    NavigationError,
    /// Bounding box and time range of the file (`9`)
    SwathSummary,
    /// Single-beam ping (`10`)
    SingleBeamPing,
    /// Horizontal/vertical navigation error (`11`)
    HvNavigationError,
    /// Attitude time series (`12`)
    Attitude,
    /// Unrecognized id
    Unknown(u32),
}

impl RecordType {
    /// Every recognized record type, in id order.
    pub const ALL: [RecordType; 12] = [
        Self::Header,
        Self::SwathBathymetryPing,
        Self::SoundVelocityProfile,
        Self::ProcessingParameters,
        Self::SensorParameters,
        Self::Comment,
        Self::History,
        Self::NavigationError,
        Self::SwathSummary,
        Self::SingleBeamPing,
        Self::HvNavigationError,
        Self::Attitude,
    ];

    pub fn id(&self) -> u32 {
        match self {
            Self::Header => 1,
            Self::SwathBathymetryPing => 2,
            Self::SoundVelocityProfile => 3,
            Self::ProcessingParameters => 4,
            Self::SensorParameters => 5,
            Self::Comment => 6,
            Self::History => 7,
            Self::NavigationError => 8,
            Self::SwathSummary => 9,
            Self::SingleBeamPing => 10,
            Self::HvNavigationError => 11,
            Self::Attitude => 12,
            Self::Unknown(id) => *id,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::SwathBathymetryPing => "swath_bathymetry_ping",
            Self::SoundVelocityProfile => "sound_velocity_profile",
            Self::ProcessingParameters => "processing_parameters",
            Self::SensorParameters => "sensor_parameters",
            Self::Comment => "comment",
            Self::History => "history",
            Self::NavigationError => "navigation_error",
            Self::SwathSummary => "swath_summary",
            Self::SingleBeamPing => "single_beam_ping",
            Self::HvNavigationError => "hv_navigation_error",
            Self::Attitude => "attitude",
            Self::Unknown(_) => "unknown",
        }
    }

    /// Inverse of [`RecordType::as_str`]; `None` for names outside the table.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl From<u32> for RecordType {
    fn from(id: u32) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.id() == id)
            .unwrap_or(Self::Unknown(id))
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(id) => write!(f, "unknown({id})"),
            other => f.write_str(other.as_str()),
        }
    }
}
