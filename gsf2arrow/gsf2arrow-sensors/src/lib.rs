//! [`SensorDecoder`] implementations for common survey sonars.
//!
//! Each decoder covers one sensor family and claims the subrecord ids of
//! every model sharing its layout. [`register_default_sensors`] installs all
//! of them into a [`SensorRegistry`].

mod echotrac;
mod kongsberg;
mod r2sonic;
mod reson;

use std::sync::Arc;

pub use echotrac::EchotracDecoder;
use gsf2arrow_core::{SensorDecoder, SensorRegistry};
pub use kongsberg::{Em3Decoder, Em4Decoder};
pub use r2sonic::R2SonicDecoder;
pub use reson::Reson7kDecoder;

/// Every bundled decoder.
pub fn default_decoders() -> Vec<Arc<dyn SensorDecoder>> {
    vec![
        Arc::new(Em3Decoder),
        Arc::new(Em4Decoder),
        Arc::new(Reson7kDecoder),
        Arc::new(R2SonicDecoder),
        Arc::new(EchotracDecoder),
    ]
}

/// Registers every bundled decoder with `registry`.
pub fn register_default_sensors(registry: &mut SensorRegistry) {
    for decoder in default_decoders() {
        registry.register(decoder);
    }
    log::debug!("registered {} sensor subrecord ids", registry.len());
}

/// A registry holding only the bundled decoders.
pub fn default_registry() -> SensorRegistry {
    let mut registry = SensorRegistry::new();
    register_default_sensors(&mut registry);
    registry
}

pub(crate) fn scaled_u16(value: u16, divisor: f64) -> f64 {
    f64::from(value) / divisor
}

pub(crate) fn scaled_i16(value: i16, divisor: f64) -> f64 {
    f64::from(value) / divisor
}

pub(crate) fn scaled_u32(value: u32, divisor: f64) -> f64 {
    f64::from(value) / divisor
}

pub(crate) fn scaled_i32(value: i32, divisor: f64) -> f64 {
    f64::from(value) / divisor
}
