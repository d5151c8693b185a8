//! Canonical null values used when a measurement is absent.

/// Depth, position, travel time, track offsets, angles, amplitudes.
pub const NULL_BEAM_VALUE: f64 = 0.0;
/// Beam usability and quality flags.
pub const NULL_FLAG: u8 = 0;
/// Missing intensity time-series sample.
pub const NULL_INTENSITY_SAMPLE: f32 = f32::NAN;

pub const NULL_LONGITUDE: f64 = 181.0;
pub const NULL_LATITUDE: f64 = 91.0;
pub const NULL_HEADING: f64 = 361.0;
pub const NULL_COURSE: f64 = 361.0;
pub const NULL_SPEED: f64 = 99.0;
pub const NULL_PITCH: f64 = 99.0;
pub const NULL_ROLL: f64 = 99.0;
pub const NULL_HEAVE: f64 = 99.0;
pub const NULL_TIDE_CORRECTOR: f64 = 99.99;
pub const NULL_DEPTH_CORRECTOR: f64 = 99.99;
pub const NULL_HORIZONTAL_ERROR: f64 = -1.0;
pub const NULL_VERTICAL_ERROR: f64 = -1.0;

/// Compares a decoded value against a sentinel with the resolution of the
/// coarsest scale the format uses for it (1/100).
pub fn is_null(value: f64, sentinel: f64) -> bool {
    (value - sentinel).abs() < 0.005
}
