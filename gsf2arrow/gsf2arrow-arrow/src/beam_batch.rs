//! One row per beam.

use std::sync::Arc;

use arrow::{
    array::{Array, ArrayRef, Float64Array, UInt16Array, UInt32Array, UInt64Array, UInt8Array},
    datatypes::{Field, Schema},
    record_batch::RecordBatch,
};
use gsf2arrow_core::{BeamColumn, PingChunk};

use crate::{ArrowConvertError, TIME_COLUMN, columns::timestamp_array};

/// Converts a reconciled chunk into a `RecordBatch` with one row per real beam.
///
/// Padding slots of a fixed-width chunk are dropped. Intensity series are
/// reduced to their sample count (`intensity_series_sample_count`) so every column
/// is a flat scalar.
pub fn beam_chunk_to_record_batch(chunk: &PingChunk) -> Result<RecordBatch, ArrowConvertError> {
    if chunk.is_empty() {
        return Err(ArrowConvertError::EmptyChunk);
    }

    // Flat slot index of every real beam, in ping then beam order.
    let offsets = chunk.row_offsets();
    let slots: Vec<usize> = chunk
        .beam_counts
        .iter()
        .enumerate()
        .flat_map(|(ping, &count)| offsets[ping]..offsets[ping] + count)
        .collect();
    let ping_of_slot: Vec<usize> = chunk
        .beam_counts
        .iter()
        .enumerate()
        .flat_map(|(ping, &count)| std::iter::repeat_n(ping, count))
        .collect();

    let p = &chunk.pings;
    let mut columns: Vec<(String, ArrayRef)> = vec![
        (
            TIME_COLUMN.to_string(),
            timestamp_array(ping_of_slot.iter().map(|&i| p.time[i])),
        ),
        (
            "ping_index".to_string(),
            Arc::new(UInt64Array::from_iter_values(
                ping_of_slot.iter().map(|&i| p.index[i]),
            )),
        ),
        (
            "beam".to_string(),
            Arc::new(UInt32Array::from_iter_values(
                chunk
                    .beam_counts
                    .iter()
                    .flat_map(|&count| 0..count as u32),
            )),
        ),
    ];

    for (field, column) in chunk.beams.columns() {
        let (name, array): (String, ArrayRef) = match column {
            BeamColumn::Values(values) => (
                field.name().to_string(),
                Arc::new(Float64Array::from_iter_values(slots.iter().map(|&s| values[s]))),
            ),
            BeamColumn::Flags(flags) => (
                field.name().to_string(),
                Arc::new(UInt8Array::from_iter_values(slots.iter().map(|&s| flags[s]))),
            ),
            BeamColumn::Intensity(beams) => (
                format!("{}_sample_count", field.name()),
                Arc::new(UInt16Array::from_iter_values(
                    slots.iter().map(|&s| beams[s].sample_count),
                )),
            ),
        };
        columns.push((name, array));
    }

    if let Some(position) = &chunk.position {
        columns.push((
            "beam_longitude".to_string(),
            Arc::new(Float64Array::from_iter_values(
                slots.iter().map(|&s| position.longitude[s]),
            )),
        ));
        columns.push((
            "beam_latitude".to_string(),
            Arc::new(Float64Array::from_iter_values(
                slots.iter().map(|&s| position.latitude[s]),
            )),
        ));
    }

    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, array)| Field::new(name, array.data_type().clone(), false))
        .collect();
    let arrays = columns.into_iter().map(|(_, array)| array).collect();
    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}
