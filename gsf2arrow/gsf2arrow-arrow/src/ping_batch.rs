//! One row per ping.

use std::sync::Arc;

use arrow::{
    array::{
        Array, ArrayRef, FixedSizeListArray, Float64Array, Float64Builder, ListArray, MapBuilder,
        StringArray, StringBuilder, UInt16Array, UInt64Array, UInt8Array,
    },
    buffer::OffsetBuffer,
    datatypes::{Field, Schema},
    error::ArrowError,
    record_batch::RecordBatch,
};
use gsf2arrow_core::{BeamLayout, PingChunk, SensorMetadata};

use crate::{
    ArrowConvertError, TIME_COLUMN,
    columns::{beam_column_array, item_field, timestamp_array},
};

/// Converts a reconciled chunk into a `RecordBatch` with one row per ping.
///
/// Column order: `@time`, ping-header scalars, one list column per beam field
/// in chunk order, `beam_longitude`/`beam_latitude` when positions were
/// projected, then `sensor_id`, `sensor_family` and a `sensor` map of the
/// numeric sensor fields. Ping-header values equal to their format null are
/// Arrow nulls.
pub fn ping_chunk_to_record_batch(chunk: &PingChunk) -> Result<RecordBatch, ArrowConvertError> {
    if chunk.is_empty() {
        return Err(ArrowConvertError::EmptyChunk);
    }

    let p = &chunk.pings;
    let mut columns: Vec<(&str, ArrayRef, bool)> = vec![
        (TIME_COLUMN, timestamp_array(p.time.iter().copied()), false),
        ("ping_index", Arc::new(UInt64Array::from(p.index.clone())), false),
        ("longitude", Arc::new(Float64Array::from(p.longitude.clone())), false),
        ("latitude", Arc::new(Float64Array::from(p.latitude.clone())), false),
        ("number_beams", Arc::new(UInt16Array::from(p.number_beams.clone())), false),
        ("centre_beam", Arc::new(UInt16Array::from(p.centre_beam.clone())), false),
        ("ping_flags", Arc::new(UInt16Array::from(p.ping_flags.clone())), false),
        ("tide_corrector", optional(&p.tide_corrector), true),
        ("depth_corrector", optional(&p.depth_corrector), true),
        ("heading", optional(&p.heading), true),
        ("pitch", optional(&p.pitch), true),
        ("roll", optional(&p.roll), true),
        ("heave", optional(&p.heave), true),
        ("course", optional(&p.course), true),
        ("speed", optional(&p.speed), true),
        ("height", optional(&p.height), true),
        ("separation", optional(&p.separation), true),
        ("gps_tide_corrector", optional(&p.gps_tide_corrector), true),
    ];

    for (field, column) in chunk.beams.columns() {
        let values = beam_column_array(column)?;
        columns.push((field.name(), per_ping(chunk, values)?, false));
    }

    if let Some(position) = &chunk.position {
        let lon: ArrayRef = Arc::new(Float64Array::from(position.longitude.clone()));
        let lat: ArrayRef = Arc::new(Float64Array::from(position.latitude.clone()));
        columns.push(("beam_longitude", per_ping(chunk, lon)?, false));
        columns.push(("beam_latitude", per_ping(chunk, lat)?, false));
    }

    let sensor_ids: UInt8Array = chunk
        .sensors
        .iter()
        .map(|s| s.as_ref().map(SensorMetadata::sensor_id))
        .collect();
    let families: StringArray = chunk
        .sensors
        .iter()
        .map(|s| s.as_ref().map(SensorMetadata::family))
        .collect();
    columns.push(("sensor_id", Arc::new(sensor_ids), true));
    columns.push(("sensor_family", Arc::new(families), true));
    columns.push(("sensor", sensor_map(&chunk.sensors)?, true));

    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, array, nullable)| Field::new(*name, array.data_type().clone(), *nullable))
        .collect();
    let arrays = columns.into_iter().map(|(_, array, _)| array).collect();
    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

fn optional(values: &[Option<f64>]) -> ArrayRef {
    Arc::new(Float64Array::from(values.to_vec()))
}

/// Groups flat beam-slot values into one list per ping.
fn per_ping(chunk: &PingChunk, values: ArrayRef) -> Result<ArrayRef, ArrowConvertError> {
    let item = item_field(values.data_type().clone());
    match chunk.layout() {
        BeamLayout::FixedWidth(width) if width > 0 => {
            let size = i32::try_from(width).map_err(|_| ArrowConvertError::WidthOverflow(width))?;
            Ok(Arc::new(FixedSizeListArray::try_new(item, size, values, None)?))
        }
        // A zero-width axis cannot be expressed as a fixed-size list with rows.
        BeamLayout::FixedWidth(_) | BeamLayout::Ragged => {
            let offsets = OffsetBuffer::from_lengths(chunk.row_widths.iter().copied());
            Ok(Arc::new(ListArray::try_new(item, offsets, values, None)?))
        }
    }
}

fn sensor_map(sensors: &[Option<SensorMetadata>]) -> Result<ArrayRef, ArrowError> {
    let mut builder = MapBuilder::new(None, StringBuilder::new(), Float64Builder::new());
    for sensor in sensors {
        match sensor {
            Some(sensor) => {
                for (name, value) in sensor.fields() {
                    builder.keys().append_value(name);
                    builder.values().append_value(value);
                }
                builder.append(true)?;
            }
            None => builder.append(false)?,
        }
    }
    Ok(Arc::new(builder.finish()))
}
