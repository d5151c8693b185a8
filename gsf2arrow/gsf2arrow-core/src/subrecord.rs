//! Subrecord id tables for swath bathymetry ping records.

use std::fmt;

use crate::{error::UnsupportedReason, sentinel};

/// Subrecord id of the scale-factor table.
pub const SCALE_FACTORS_ID: u8 = 100;

/// Obsolete beam-array ids (depth/across/along-track error).
const OBSOLETE_IDS: [u8; 3] = [11, 12, 13];

/// How the per-beam byte width of an array is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeamWidth {
    /// `subrecord_size / beam_count`.
    Derived,
    /// Mandated by the format; the self-reported size is not trusted.
    Fixed(usize),
}

/// How raw integers of a beam array become values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `raw / scale - offset`, stored as `f64`.
    Scaled,
    /// Raw status bytes, no scale applied.
    Flags,
    /// Variable-length per-beam time series.
    Intensity,
}

/// Per-beam attributes carried by beam-array subrecords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BeamField {
    Depth,
    AcrossTrack,
    AlongTrack,
    TravelTime,
    BeamAngle,
    MeanCalAmplitude,
    MeanRelAmplitude,
    EchoWidth,
    QualityFactor,
    ReceiveHeave,
    NominalDepth,
    QualityFlags,
    BeamFlags,
    SignalToNoise,
    BeamAngleForward,
    VerticalError,
    HorizontalError,
    IntensitySeries,
    SectorNumber,
    DetectionInfo,
    IncidentBeamAdjustment,
    SystemCleaning,
    DopplerCorrection,
    SonarVerticalUncertainty,
    SonarHorizontalUncertainty,
    DetectionWindow,
    MeanAbsorptionCoefficient,
}

impl BeamField {
    pub const ALL: [BeamField; 27] = [
        Self::Depth,
        Self::AcrossTrack,
        Self::AlongTrack,
        Self::TravelTime,
        Self::BeamAngle,
        Self::MeanCalAmplitude,
        Self::MeanRelAmplitude,
        Self::EchoWidth,
        Self::QualityFactor,
        Self::ReceiveHeave,
        Self::NominalDepth,
        Self::QualityFlags,
        Self::BeamFlags,
        Self::SignalToNoise,
        Self::BeamAngleForward,
        Self::VerticalError,
        Self::HorizontalError,
        Self::IntensitySeries,
        Self::SectorNumber,
        Self::DetectionInfo,
        Self::IncidentBeamAdjustment,
        Self::SystemCleaning,
        Self::DopplerCorrection,
        Self::SonarVerticalUncertainty,
        Self::SonarHorizontalUncertainty,
        Self::DetectionWindow,
        Self::MeanAbsorptionCoefficient,
    ];

    pub fn id(&self) -> u8 {
        match self {
            Self::Depth => 1,
            Self::AcrossTrack => 2,
            Self::AlongTrack => 3,
            Self::TravelTime => 4,
            Self::BeamAngle => 5,
            Self::MeanCalAmplitude => 6,
            Self::MeanRelAmplitude => 7,
            Self::EchoWidth => 8,
            Self::QualityFactor => 9,
            Self::ReceiveHeave => 10,
            Self::NominalDepth => 14,
            Self::QualityFlags => 15,
            Self::BeamFlags => 16,
            Self::SignalToNoise => 17,
            Self::BeamAngleForward => 18,
            Self::VerticalError => 19,
            Self::HorizontalError => 20,
            Self::IntensitySeries => 21,
            Self::SectorNumber => 22,
            Self::DetectionInfo => 23,
            Self::IncidentBeamAdjustment => 24,
            Self::SystemCleaning => 25,
            Self::DopplerCorrection => 26,
            Self::SonarVerticalUncertainty => 27,
            Self::SonarHorizontalUncertainty => 28,
            Self::DetectionWindow => 29,
            Self::MeanAbsorptionCoefficient => 30,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Depth => "depth",
            Self::AcrossTrack => "across_track",
            Self::AlongTrack => "along_track",
            Self::TravelTime => "travel_time",
            Self::BeamAngle => "beam_angle",
            Self::MeanCalAmplitude => "mean_cal_amplitude",
            Self::MeanRelAmplitude => "mean_rel_amplitude",
            Self::EchoWidth => "echo_width",
            Self::QualityFactor => "quality_factor",
            Self::ReceiveHeave => "receive_heave",
            Self::NominalDepth => "nominal_depth",
            Self::QualityFlags => "quality_flags",
            Self::BeamFlags => "beam_flags",
            Self::SignalToNoise => "signal_to_noise",
            Self::BeamAngleForward => "beam_angle_forward",
            Self::VerticalError => "vertical_error",
            Self::HorizontalError => "horizontal_error",
            Self::IntensitySeries => "intensity_series",
            Self::SectorNumber => "sector_number",
            Self::DetectionInfo => "detection_info",
            Self::IncidentBeamAdjustment => "incident_beam_adjustment",
            Self::SystemCleaning => "system_cleaning",
            Self::DopplerCorrection => "doppler_correction",
            Self::SonarVerticalUncertainty => "sonar_vertical_uncertainty",
            Self::SonarHorizontalUncertainty => "sonar_horizontal_uncertainty",
            Self::DetectionWindow => "detection_window",
            Self::MeanAbsorptionCoefficient => "mean_absorption_coefficient",
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.id() == id)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn width(&self) -> BeamWidth {
        match self {
            Self::QualityFlags
            | Self::BeamFlags
            | Self::SectorNumber
            | Self::DetectionInfo
            | Self::IncidentBeamAdjustment
            | Self::SystemCleaning
            | Self::DopplerCorrection => BeamWidth::Fixed(1),
            _ => BeamWidth::Derived,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            Self::AcrossTrack
                | Self::AlongTrack
                | Self::BeamAngle
                | Self::MeanCalAmplitude
                | Self::ReceiveHeave
                | Self::SignalToNoise
                | Self::IncidentBeamAdjustment
                | Self::DopplerCorrection
        )
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::QualityFlags | Self::BeamFlags | Self::SystemCleaning => FieldKind::Flags,
            Self::IntensitySeries => FieldKind::Intensity,
            _ => FieldKind::Scaled,
        }
    }

    /// Null value appended for beams that carry no measurement of this field.
    pub fn null_value(&self) -> f64 {
        match self {
            Self::HorizontalError => sentinel::NULL_HORIZONTAL_ERROR,
            Self::VerticalError => sentinel::NULL_VERTICAL_ERROR,
            Self::IntensitySeries => sentinel::NULL_INTENSITY_SAMPLE as f64,
            _ => sentinel::NULL_BEAM_VALUE,
        }
    }
}

impl fmt::Display for BeamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classification of a subrecord id within a ping record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubrecordKind {
    Beam(BeamField),
    ScaleFactors,
    SensorSpecific(u8),
    Unsupported(u8, UnsupportedReason),
}

impl SubrecordKind {
    pub fn classify(id: u8) -> Self {
        if let Some(field) = BeamField::from_id(id) {
            return Self::Beam(field);
        }
        if OBSOLETE_IDS.contains(&id) {
            return Self::Unsupported(id, UnsupportedReason::Obsolete);
        }
        match id {
            SCALE_FACTORS_ID => Self::ScaleFactors,
            0..SCALE_FACTORS_ID => Self::Unsupported(id, UnsupportedReason::Reserved),
            _ => Self::SensorSpecific(id),
        }
    }
}

/// Readable name for any subrecord id.
pub fn subrecord_name(id: u8) -> String {
    match SubrecordKind::classify(id) {
        SubrecordKind::Beam(field) => field.name().to_string(),
        SubrecordKind::ScaleFactors => "scale_factors".to_string(),
        SubrecordKind::SensorSpecific(id) => crate::sensor_name(id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("sensor_{id}")),
        SubrecordKind::Unsupported(id, reason) => format!("{reason}_{id}"),
    }
}
