//! Merging decoded pings into one contiguous struct-of-arrays block.
//!
//! Pings of one file do not always carry the same beam arrays. A [`PingChunk`]
//! keeps the union of every field seen so far: fields a ping lacks are filled
//! with that field's null value, and fields that first appear late are
//! backfilled for the pings already merged. With [`BeamLayout::FixedWidth`]
//! every ping is further padded to the same number of beam slots.

use crate::{
    beam::{BeamArrays, BeamColumn},
    geodetic::LonLat,
    ping::DecodedPing,
    ping_header::PingHeader,
    sensor::{ImageryMetadata, SensorMetadata},
    subrecord::BeamField,
};

/// Shape of the beam axis in a merged chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BeamLayout {
    /// Each ping keeps its own beam count.
    #[default]
    Ragged,
    /// Each ping is padded with null beams up to the given width.
    FixedWidth(usize),
}

/// A ping had more beams than the fixed beam-axis width.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("ping {ping_index} has {beam_count} beams, more than the fixed width of {width}")]
pub struct BeamWidthExceeded {
    pub ping_index: usize,
    pub beam_count: usize,
    pub width: usize,
}

/// Ping-header scalars, one entry per merged ping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PingColumns {
    pub index: Vec<u64>,
    pub time: Vec<i64>,
    pub longitude: Vec<f64>,
    pub latitude: Vec<f64>,
    pub number_beams: Vec<u16>,
    pub centre_beam: Vec<u16>,
    pub ping_flags: Vec<u16>,
    pub tide_corrector: Vec<Option<f64>>,
    pub depth_corrector: Vec<Option<f64>>,
    pub heading: Vec<Option<f64>>,
    pub pitch: Vec<Option<f64>>,
    pub roll: Vec<Option<f64>>,
    pub heave: Vec<Option<f64>>,
    pub course: Vec<Option<f64>>,
    pub speed: Vec<Option<f64>>,
    pub height: Vec<Option<f64>>,
    pub separation: Vec<Option<f64>>,
    pub gps_tide_corrector: Vec<Option<f64>>,
}

impl PingColumns {
    fn push(&mut self, index: usize, header: &PingHeader) {
        self.index.push(index as u64);
        self.time.push(header.time);
        self.longitude.push(header.longitude);
        self.latitude.push(header.latitude);
        self.number_beams.push(header.number_beams);
        self.centre_beam.push(header.centre_beam);
        self.ping_flags.push(header.ping_flags);
        self.tide_corrector.push(header.tide_corrector_value());
        self.depth_corrector.push(header.depth_corrector_value());
        self.heading.push(header.heading_value());
        self.pitch.push(header.pitch_value());
        self.roll.push(header.roll_value());
        self.heave.push(header.heave_value());
        self.course.push(header.course_value());
        self.speed.push(header.speed_value());
        self.height.push(header.height);
        self.separation.push(header.separation);
        self.gps_tide_corrector.push(header.gps_tide_corrector);
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Contiguous block of merged pings in file order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PingChunk {
    layout: BeamLayout,
    pub pings: PingColumns,
    /// Real beam count of each ping.
    pub beam_counts: Vec<usize>,
    /// Beam slots each ping occupies in [`PingChunk::beams`].
    pub row_widths: Vec<usize>,
    pub beams: BeamArrays,
    pub position: Option<LonLat>,
    pub sensors: Vec<Option<SensorMetadata>>,
    pub imagery: Vec<Option<ImageryMetadata>>,
}

impl PingChunk {
    pub fn new(layout: BeamLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Creates an empty chunk whose beam columns start with `fields`, in that
    /// order. Chunks built from the same field list share one column order.
    pub fn with_fields(layout: BeamLayout, fields: impl IntoIterator<Item = BeamField>) -> Self {
        let mut chunk = Self::new(layout);
        for field in fields {
            chunk.beams.ensure_field(field);
        }
        chunk
    }

    pub fn layout(&self) -> BeamLayout {
        self.layout
    }

    /// Number of merged pings.
    pub fn len(&self) -> usize {
        self.beam_counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beam_counts.is_empty()
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.beams.field_names()
    }

    /// Start offset of every ping in the flattened beam arrays, plus the end.
    pub fn row_offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(self.row_widths.len() + 1);
        let mut acc = 0;
        offsets.push(acc);
        for width in &self.row_widths {
            acc += width;
            offsets.push(acc);
        }
        offsets
    }

    /// Appends a ping, reconciling its fields against the chunk.
    pub fn push(&mut self, ping: DecodedPing) -> Result<(), BeamWidthExceeded> {
        let beam_count = ping.beam_count();
        let slots = match self.layout {
            BeamLayout::Ragged => beam_count,
            BeamLayout::FixedWidth(width) if beam_count <= width => width,
            BeamLayout::FixedWidth(width) => {
                return Err(BeamWidthExceeded {
                    ping_index: ping.index,
                    beam_count,
                    width,
                });
            }
        };

        self.pings.push(ping.index, &ping.header);
        self.merge_beams(ping.beams);
        self.merge_position(ping.position, beam_count);
        self.pad_beams(slots - beam_count);

        self.beam_counts.push(beam_count);
        self.row_widths.push(slots);
        self.sensors.push(ping.sensor);
        self.imagery.push(ping.imagery);
        Ok(())
    }

    /// Restricts the chunk to the named beam fields, adding null columns for
    /// named fields never observed. Unknown names are ignored.
    pub fn select_fields(&mut self, names: &[&str]) {
        let wanted: Vec<BeamField> = names
            .iter()
            .filter_map(|name| BeamField::from_name(name))
            .collect();
        let len = self.beams.len();
        let mut selected = BeamArrays::new(len);
        for field in wanted {
            let column = self
                .beams
                .take_column(field)
                .unwrap_or_else(|| BeamColumn::nulls(field, len));
            selected.insert(field, column);
        }
        self.beams = selected;
    }

    fn merge_beams(&mut self, mut incoming: BeamArrays) {
        let n = incoming.len();
        let before = self.beams.len();

        for field in incoming.fields().collect::<Vec<_>>() {
            if !self.beams.contains(field) {
                if before > 0 {
                    log::debug!("field {field} first seen after {before} beam slots; backfilling");
                }
                self.beams.ensure_field(field);
            }
        }

        for field in self.beams.fields().collect::<Vec<_>>() {
            let column = incoming
                .take_column(field)
                .unwrap_or_else(|| BeamColumn::nulls(field, n));
            if let Some(existing) = self.beams.get_mut(field) {
                existing.append(field, column);
            }
        }
        self.beams.set_len(before + n);
    }

    fn merge_position(&mut self, incoming: Option<LonLat>, beam_count: usize) {
        match (&mut self.position, incoming) {
            (Some(position), Some(lonlat)) => position.append(lonlat),
            (Some(position), None) => position.extend_null(beam_count),
            (None, Some(lonlat)) => {
                let mut position = LonLat::nulls(self.beams.len() - beam_count);
                position.append(lonlat);
                self.position = Some(position);
            }
            (None, None) => {}
        }
    }

    /// Appends `n` null beam slots to every beam column and to the positions.
    fn pad_beams(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        self.beams.extend_null(n);
        if let Some(position) = &mut self.position {
            position.extend_null(n);
        }
    }
}
