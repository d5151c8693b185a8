//! Scale-factor subrecord decoding.

use std::collections::BTreeMap;

use crate::{
    error::{GsfError, Result},
    wire::{WireError, WireReader},
};

/// Field-size code carried in the high nibble of the compression byte.
///
/// Parsed and exposed, but beam-array widths are still taken from the
/// subrecord size or the format-mandated width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSize {
    Default,
    One,
    Two,
    Four,
    Other(u8),
}

impl From<u8> for FieldSize {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Default,
            1 => Self::One,
            2 => Self::Two,
            4 => Self::Four,
            other => Self::Other(other),
        }
    }
}

/// Scale and offset for one subrecord type: `physical = raw / scale - offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor {
    pub subrecord_id: u8,
    pub scale: f64,
    pub offset: f64,
    pub compressed: bool,
    pub field_size: FieldSize,
}

impl ScaleFactor {
    pub fn new(subrecord_id: u8, scale: f64, offset: f64) -> Self {
        Self {
            subrecord_id,
            scale,
            offset,
            compressed: false,
            field_size: FieldSize::Default,
        }
    }

    pub fn apply(&self, raw: f64) -> f64 {
        raw / self.scale - self.offset
    }

    /// Inverse of [`ScaleFactor::apply`], rounded to the nearest integer.
    pub fn encode(&self, physical: f64) -> i64 {
        ((physical + self.offset) * self.scale).round() as i64
    }
}

/// Scale factors of one ping group, keyed by subrecord id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScaleFactorTable {
    entries: BTreeMap<u8, ScaleFactor>,
}

impl ScaleFactorTable {
    /// Decodes a scale-factor subrecord payload.
    ///
    /// Consumes exactly `4 + 12 * N` bytes from `reader`.
    pub fn decode(reader: &mut WireReader<'_>, record_offset: u64) -> Result<Self> {
        let err = |e: WireError| GsfError::payload(record_offset, e);
        let count = reader.u32("scale factor count").map_err(err)?;
        let mut entries = BTreeMap::new();
        for _ in 0..count {
            let packed = reader.u32("scale factor id").map_err(err)?;
            let scale = reader.u32("scale").map_err(err)?;
            let offset = reader.i32("scale offset").map_err(err)?;

            let subrecord_id = (packed >> 24) as u8;
            let compression = ((packed >> 16) & 0xFF) as u8;
            entries.insert(
                subrecord_id,
                ScaleFactor {
                    subrecord_id,
                    scale: f64::from(scale),
                    offset: f64::from(offset),
                    compressed: compression & 0x0F != 0,
                    field_size: FieldSize::from(compression >> 4),
                },
            );
        }
        Ok(Self { entries })
    }

    pub fn byte_len(count: usize) -> usize {
        4 + 12 * count
    }

    pub fn insert(&mut self, factor: ScaleFactor) {
        self.entries.insert(factor.subrecord_id, factor);
    }

    pub fn get(&self, subrecord_id: u8) -> Option<&ScaleFactor> {
        self.entries.get(&subrecord_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScaleFactor> {
        self.entries.values()
    }
}

impl FromIterator<ScaleFactor> for ScaleFactorTable {
    fn from_iter<T: IntoIterator<Item = ScaleFactor>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|f| (f.subrecord_id, f)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u8, compression: u8, scale: u32, offset: i32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&((u32::from(id) << 24) | (u32::from(compression) << 16)).to_be_bytes());
        out.extend_from_slice(&scale.to_be_bytes());
        out.extend_from_slice(&offset.to_be_bytes());
        out
    }

    #[test]
    fn decodes_entries_and_consumes_exact_length() {
        let mut raw = 2u32.to_be_bytes().to_vec();
        raw.extend(entry(1, 0x21, 100, 0));
        raw.extend(entry(2, 0x00, 1000, -5));
        raw.extend_from_slice(&[0xAA, 0xBB]);

        let mut reader = WireReader::new(&raw, 0);
        let table = ScaleFactorTable::decode(&mut reader, 0).unwrap();
        assert_eq!(reader.position(), ScaleFactorTable::byte_len(2));
        assert_eq!(table.len(), 2);

        let depth = table.get(1).unwrap();
        assert!(depth.compressed);
        assert_eq!(depth.field_size, FieldSize::Two);
        assert_eq!(depth.scale, 100.0);

        let across = table.get(2).unwrap();
        assert!(!across.compressed);
        assert_eq!(across.offset, -5.0);
    }

    #[test]
    fn apply_and_encode_are_inverse() {
        let factor = ScaleFactor::new(1, 100.0, 0.0);
        let physical = factor.apply(12345.0);
        assert!((physical - 123.45).abs() < 1e-9);
        assert_eq!(factor.encode(physical), 12345);
    }

    #[test]
    fn short_table_is_malformed_payload() {
        let raw = 1u32.to_be_bytes();
        let err = ScaleFactorTable::decode(&mut WireReader::new(&raw, 0), 64).unwrap_err();
        assert!(matches!(
            err,
            GsfError::MalformedPayload {
                record_offset: 64,
                ..
            }
        ));
    }
}
