//! Column builders shared by the ping-row and beam-row layouts.

use std::sync::Arc;

use arrow::{
    array::{
        ArrayRef, Float32Array, Float64Array, ListArray, StructArray, TimestampNanosecondArray,
        UInt16Array, UInt8Array,
    },
    buffer::OffsetBuffer,
    datatypes::{DataType, Field, FieldRef, Fields},
    error::ArrowError,
};
use gsf2arrow_core::{BeamColumn, BeamIntensity};

pub fn timestamp_array(times: impl IntoIterator<Item = i64>) -> ArrayRef {
    Arc::new(
        times
            .into_iter()
            .map(Some)
            .collect::<TimestampNanosecondArray>()
            .with_timezone(crate::TIMESTAMP_TZ),
    )
}

/// Child field used for list and fixed-size-list columns.
pub fn item_field(data_type: DataType) -> FieldRef {
    Arc::new(Field::new("item", data_type, true))
}

fn intensity_fields() -> Fields {
    vec![
        Field::new("sample_count", DataType::UInt16, false),
        Field::new("detect_sample", DataType::UInt16, false),
        Field::new("start_range_samples", DataType::UInt16, false),
        Field::new(
            "samples",
            DataType::List(item_field(DataType::Float32)),
            false,
        ),
    ]
    .into()
}

/// Struct array of per-beam intensity time series.
pub fn intensity_array(beams: &[BeamIntensity]) -> Result<ArrayRef, ArrowError> {
    let samples: Float32Array = beams
        .iter()
        .flat_map(|b| b.samples.iter().copied())
        .collect::<Vec<f32>>()
        .into();
    let samples = ListArray::try_new(
        item_field(DataType::Float32),
        OffsetBuffer::from_lengths(beams.iter().map(|b| b.samples.len())),
        Arc::new(samples),
        None,
    )?;
    let arrays: Vec<ArrayRef> = vec![
        Arc::new(UInt16Array::from_iter_values(
            beams.iter().map(|b| b.sample_count),
        )),
        Arc::new(UInt16Array::from_iter_values(
            beams.iter().map(|b| b.detect_sample),
        )),
        Arc::new(UInt16Array::from_iter_values(
            beams.iter().map(|b| b.start_range_samples),
        )),
        Arc::new(samples),
    ];
    Ok(Arc::new(StructArray::try_new(intensity_fields(), arrays, None)?))
}

/// Flat array of every beam slot of one column.
pub fn beam_column_array(column: &BeamColumn) -> Result<ArrayRef, ArrowError> {
    Ok(match column {
        BeamColumn::Values(values) => Arc::new(Float64Array::from(values.clone())),
        BeamColumn::Flags(flags) => Arc::new(UInt8Array::from(flags.clone())),
        BeamColumn::Intensity(beams) => intensity_array(beams)?,
    })
}
