//! Per-beam arrays and the decoder that reconstructs them from scaled integers.

use crate::{
    error::{GsfError, Result},
    framing::SubRecordHeader,
    scale_factor::ScaleFactorTable,
    sentinel,
    subrecord::{BeamField, BeamWidth, FieldKind},
    wire::WireReader,
};

/// Backscatter time series of one beam.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamIntensity {
    pub sample_count: u16,
    pub detect_sample: u16,
    pub start_range_samples: u16,
    pub samples: Vec<f32>,
}

impl BeamIntensity {
    /// Placeholder for a beam without a time series: one NaN sample, zeroed companions.
    pub fn null() -> Self {
        Self {
            sample_count: 0,
            detect_sample: 0,
            start_range_samples: 0,
            samples: vec![sentinel::NULL_INTENSITY_SAMPLE],
        }
    }
}

/// Values of one beam attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum BeamColumn {
    Values(Vec<f64>),
    Flags(Vec<u8>),
    Intensity(Vec<BeamIntensity>),
}

impl BeamColumn {
    pub fn empty(field: BeamField) -> Self {
        match field.kind() {
            FieldKind::Scaled => Self::Values(Vec::new()),
            FieldKind::Flags => Self::Flags(Vec::new()),
            FieldKind::Intensity => Self::Intensity(Vec::new()),
        }
    }

    /// A column of `n` null beams.
    pub fn nulls(field: BeamField, n: usize) -> Self {
        let mut column = Self::empty(field);
        column.extend_null(field, n);
        column
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Values(v) => v.len(),
            Self::Flags(v) => v.len(),
            Self::Intensity(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends `n` canonical null values for `field`.
    pub fn extend_null(&mut self, field: BeamField, n: usize) {
        match self {
            Self::Values(v) => v.extend(std::iter::repeat_n(field.null_value(), n)),
            Self::Flags(v) => v.extend(std::iter::repeat_n(sentinel::NULL_FLAG, n)),
            Self::Intensity(v) => v.extend(std::iter::repeat_with(BeamIntensity::null).take(n)),
        }
    }

    /// Appends `other`; a column of another kind contributes nulls of the same length.
    pub fn append(&mut self, field: BeamField, other: BeamColumn) {
        match (self, other) {
            (Self::Values(a), Self::Values(b)) => a.extend(b),
            (Self::Flags(a), Self::Flags(b)) => a.extend(b),
            (Self::Intensity(a), Self::Intensity(b)) => a.extend(b),
            (this, other) => this.extend_null(field, other.len()),
        }
    }

    pub fn as_values(&self) -> Option<&[f64]> {
        match self {
            Self::Values(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_flags(&self) -> Option<&[u8]> {
        match self {
            Self::Flags(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_intensity(&self) -> Option<&[BeamIntensity]> {
        match self {
            Self::Intensity(v) => Some(v),
            _ => None,
        }
    }
}

/// Struct-of-arrays holding every decoded beam attribute of one ping (or of a
/// merged chunk of pings). Columns keep the order in which they were added.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BeamArrays {
    len: usize,
    columns: Vec<(BeamField, BeamColumn)>,
}

impl BeamArrays {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            columns: Vec::new(),
        }
    }

    /// Number of beams every column holds.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn fields(&self) -> impl Iterator<Item = BeamField> + '_ {
        self.columns.iter().map(|(f, _)| *f)
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields().map(|f| f.name()).collect()
    }

    pub fn contains(&self, field: BeamField) -> bool {
        self.columns.iter().any(|(f, _)| *f == field)
    }

    pub fn columns(&self) -> impl Iterator<Item = (BeamField, &BeamColumn)> {
        self.columns.iter().map(|(f, c)| (*f, c))
    }

    pub fn get(&self, field: BeamField) -> Option<&BeamColumn> {
        self.columns
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, c)| c)
    }

    pub(crate) fn get_mut(&mut self, field: BeamField) -> Option<&mut BeamColumn> {
        self.columns
            .iter_mut()
            .find(|(f, _)| *f == field)
            .map(|(_, c)| c)
    }

    pub fn values(&self, field: BeamField) -> Option<&[f64]> {
        self.get(field).and_then(BeamColumn::as_values)
    }

    pub fn flags(&self, field: BeamField) -> Option<&[u8]> {
        self.get(field).and_then(BeamColumn::as_flags)
    }

    pub fn intensity(&self) -> Option<&[BeamIntensity]> {
        self.get(BeamField::IntensitySeries)
            .and_then(BeamColumn::as_intensity)
    }

    /// Sets the column for `field`, replacing an earlier one.
    ///
    /// The column must hold exactly [`BeamArrays::len`] beams.
    pub fn insert(&mut self, field: BeamField, column: BeamColumn) {
        debug_assert_eq!(column.len(), self.len, "column length for {field}");
        match self.get_mut(field) {
            Some(existing) => *existing = column,
            None => self.columns.push((field, column)),
        }
    }

    /// Appends `n` null beams to every column.
    pub fn extend_null(&mut self, n: usize) {
        for (field, column) in &mut self.columns {
            column.extend_null(*field, n);
        }
        self.len += n;
    }

    /// Adds a column of nulls for `field` when absent.
    pub fn ensure_field(&mut self, field: BeamField) {
        if !self.contains(field) {
            self.columns.push((field, BeamColumn::nulls(field, self.len)));
        }
    }

    pub(crate) fn set_len(&mut self, len: usize) {
        self.len = len;
    }

    pub(crate) fn take_column(&mut self, field: BeamField) -> Option<BeamColumn> {
        let pos = self.columns.iter().position(|(f, _)| *f == field)?;
        Some(self.columns.remove(pos).1)
    }
}

/// Turns beam-array subrecord payloads of one ping into physical values.
///
/// Records the fields it decoded so the ping's observed schema can be compared
/// against its neighbours.
pub struct BeamArrayDecoder<'a> {
    beam_count: usize,
    scale_factors: Option<&'a ScaleFactorTable>,
    record_offset: u64,
    arrays: BeamArrays,
}

impl<'a> BeamArrayDecoder<'a> {
    pub fn new(
        beam_count: usize,
        scale_factors: Option<&'a ScaleFactorTable>,
        record_offset: u64,
    ) -> Self {
        Self {
            beam_count,
            scale_factors,
            record_offset,
            arrays: BeamArrays::new(beam_count),
        }
    }

    /// Decodes one scaled or flag array subrecord.
    pub fn decode(
        &mut self,
        field: BeamField,
        header: &SubRecordHeader,
        payload: &mut WireReader<'_>,
    ) -> Result<()> {
        let invalid = |detail: String| GsfError::InvalidBeamArray {
            field: field.name(),
            record_offset: self.record_offset,
            subrecord_offset: header.header_offset,
            detail,
        };

        let width = self.beam_width(field, header.size as usize).map_err(invalid)?;

        let column = match field.kind() {
            FieldKind::Flags => {
                let mut flags = Vec::with_capacity(self.beam_count);
                for _ in 0..self.beam_count {
                    let raw = payload
                        .unsigned(width, field.name())
                        .map_err(|e| GsfError::payload(self.record_offset, e))?;
                    flags.push(raw as u8);
                }
                BeamColumn::Flags(flags)
            }
            FieldKind::Scaled => {
                let factor = self
                    .scale_factors
                    .and_then(|t| t.get(field.id()))
                    .ok_or(GsfError::MissingScaleFactor {
                        subrecord_id: field.id(),
                        record_offset: self.record_offset,
                    })?;
                if factor.scale == 0.0 {
                    return Err(invalid("scale factor has zero scale".to_string()));
                }
                let negate = field == BeamField::Depth;
                let mut values = Vec::with_capacity(self.beam_count);
                for _ in 0..self.beam_count {
                    let raw = if field.is_signed() {
                        payload.signed(width, field.name()).map(f64::from)
                    } else {
                        payload.unsigned(width, field.name()).map(f64::from)
                    };
                    let raw = raw.map_err(|e| GsfError::payload(self.record_offset, e))?;
                    let value = factor.apply(raw);
                    values.push(if negate { -value } else { value });
                }
                BeamColumn::Values(values)
            }
            FieldKind::Intensity => {
                return Err(invalid(
                    "intensity series must be decoded with its sensor context".to_string(),
                ));
            }
        };

        self.push(field, column);
        Ok(())
    }

    /// Stores a column decoded elsewhere (the intensity series).
    pub fn push(&mut self, field: BeamField, column: BeamColumn) {
        if self.arrays.contains(field) {
            log::debug!(
                "record at offset {}: repeated {field} subrecord replaces the earlier one",
                self.record_offset
            );
        }
        self.arrays.insert(field, column);
    }

    fn beam_width(&self, field: BeamField, size: usize) -> std::result::Result<usize, String> {
        if self.beam_count == 0 {
            return Ok(0);
        }
        let width = match field.width() {
            BeamWidth::Fixed(width) => width,
            BeamWidth::Derived => {
                if size % self.beam_count != 0 {
                    return Err(format!(
                        "{size} bytes do not divide into {} beams",
                        self.beam_count
                    ));
                }
                size / self.beam_count
            }
        };
        if !matches!(width, 1 | 2 | 4) {
            return Err(format!("unsupported beam width {width}"));
        }
        if width * self.beam_count > size {
            return Err(format!(
                "{size} bytes cannot hold {} beams of {width} bytes",
                self.beam_count
            ));
        }
        Ok(width)
    }

    pub fn beam_count(&self) -> usize {
        self.beam_count
    }

    /// Fields decoded so far, in subrecord order.
    pub fn observed(&self) -> Vec<BeamField> {
        self.arrays.fields().collect()
    }

    pub fn finish(self) -> BeamArrays {
        self.arrays
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale_factor::ScaleFactor;

    fn header(id: u8, size: usize) -> SubRecordHeader {
        SubRecordHeader {
            id,
            size: size as u32,
            header_offset: 0,
            payload_offset: 4,
        }
    }

    fn table() -> ScaleFactorTable {
        [
            ScaleFactor::new(1, 100.0, 0.0),
            ScaleFactor::new(2, 10.0, 1.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn depth_is_scaled_and_negated() {
        let table = table();
        let mut decoder = BeamArrayDecoder::new(2, Some(&table), 0);
        let raw: Vec<u8> = [1000u16, 2550].iter().flat_map(|v| v.to_be_bytes()).collect();
        decoder
            .decode(BeamField::Depth, &header(1, 4), &mut WireReader::new(&raw, 4))
            .unwrap();
        let arrays = decoder.finish();
        assert_eq!(arrays.values(BeamField::Depth).unwrap(), &[-10.0, -25.5]);
    }

    #[test]
    fn signed_fields_use_offset() {
        let table = table();
        let mut decoder = BeamArrayDecoder::new(2, Some(&table), 0);
        let raw: Vec<u8> = [-20i16, 30].iter().flat_map(|v| v.to_be_bytes()).collect();
        decoder
            .decode(BeamField::AcrossTrack, &header(2, 4), &mut WireReader::new(&raw, 4))
            .unwrap();
        assert_eq!(
            decoder.finish().values(BeamField::AcrossTrack).unwrap(),
            &[-3.0, 2.0]
        );
    }

    #[test]
    fn flags_use_fixed_width_regardless_of_reported_size() {
        let mut decoder = BeamArrayDecoder::new(3, None, 0);
        let raw = [1u8, 0, 8, 0, 0, 0];
        decoder
            .decode(BeamField::BeamFlags, &header(16, 6), &mut WireReader::new(&raw, 4))
            .unwrap();
        assert_eq!(decoder.observed(), vec![BeamField::BeamFlags]);
        assert_eq!(decoder.finish().flags(BeamField::BeamFlags).unwrap(), &[1, 0, 8]);
    }

    #[test]
    fn missing_scale_factor_is_reported() {
        let mut decoder = BeamArrayDecoder::new(1, None, 16);
        let raw = [0u8, 1];
        let err = decoder
            .decode(BeamField::Depth, &header(1, 2), &mut WireReader::new(&raw, 4))
            .unwrap_err();
        assert!(matches!(
            err,
            GsfError::MissingScaleFactor {
                subrecord_id: 1,
                record_offset: 16
            }
        ));
    }

    #[test]
    fn ragged_payload_is_invalid() {
        let table = table();
        let mut decoder = BeamArrayDecoder::new(2, Some(&table), 0);
        let raw = [0u8; 3];
        let err = decoder
            .decode(BeamField::Depth, &header(1, 3), &mut WireReader::new(&raw, 4))
            .unwrap_err();
        assert!(matches!(err, GsfError::InvalidBeamArray { field: "depth", .. }));
    }

    #[test]
    fn extend_null_uses_field_sentinels() {
        let mut arrays = BeamArrays::new(1);
        arrays.insert(BeamField::HorizontalError, BeamColumn::Values(vec![0.5]));
        arrays.insert(BeamField::QualityFlags, BeamColumn::Flags(vec![3]));
        arrays.extend_null(2);
        assert_eq!(arrays.len(), 3);
        assert_eq!(
            arrays.values(BeamField::HorizontalError).unwrap(),
            &[0.5, -1.0, -1.0]
        );
        assert_eq!(arrays.flags(BeamField::QualityFlags).unwrap(), &[3, 0, 0]);
    }
}
