//! GSF file reader with pluggable sensor decoder support.

use std::{fs, io::Cursor, path::Path, sync::Arc};

use arrow::record_batch::RecordBatch;
use gsf2arrow_arrow::ping_chunk_to_record_batch;
use gsf2arrow_core::{
    BeamField, BeamLayout, DecodedPing, FileIndex, FileIndexBuilder, PingChunk, PingDecoder,
    PingInfo, SensorDecoder, SensorRegistry,
};
use memmap2::Mmap;
use rayon::prelude::*;

use crate::error::GsfReaderError;

type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Beam-axis layout of the chunks a [`GsfReader`] emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BeamAxis {
    /// Each ping keeps its own beam count.
    #[default]
    Ragged,
    /// Every ping is padded to the largest beam count in the file.
    FixedWidth,
}

/// Reads a GSF file and decodes pings using registered [`SensorDecoder`]s.
pub struct GsfReader {
    sensors: SensorRegistry,
    chunk_size: usize,
    beam_axis: BeamAxis,
    projection: bool,
    verify_checksums: bool,
    fields: Option<Vec<String>>,
}

/// Builder for configuring [`GsfReader`].
pub struct GsfReaderBuilder {
    decoders: Vec<Arc<dyn SensorDecoder>>,
    chunk_size: usize,
    beam_axis: BeamAxis,
    projection: bool,
    verify_checksums: bool,
    fields: Option<Vec<String>>,
}

/// A memory-mapped GSF file together with its index.
pub struct GsfFile {
    data: Mmap,
    index: FileIndex,
}

impl GsfFile {
    pub fn index(&self) -> &FileIndex {
        &self.index
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

impl GsfReader {
    /// Create a builder for [`GsfReader`].
    pub fn builder() -> GsfReaderBuilder {
        GsfReaderBuilder {
            decoders: Vec::new(),
            chunk_size: 1024,
            beam_axis: BeamAxis::Ragged,
            projection: true,
            verify_checksums: false,
            fields: None,
        }
    }

    pub fn new() -> Self {
        Self {
            sensors: SensorRegistry::new(),
            chunk_size: 1024,
            beam_axis: BeamAxis::Ragged,
            projection: true,
            verify_checksums: false,
            fields: None,
        }
    }

    /// Register a sensor decoder for every subrecord id it claims.
    pub fn register_sensor_decoder(&mut self, decoder: Box<dyn SensorDecoder>) {
        self.register_shared_sensor_decoder(Arc::from(decoder));
    }

    /// Register a shared sensor decoder for every subrecord id it claims.
    pub fn register_shared_sensor_decoder(&mut self, decoder: Arc<dyn SensorDecoder>) {
        self.sensors.register(decoder);
    }

    pub fn sensors(&self) -> &SensorRegistry {
        &self.sensors
    }

    fn mmap_file(&self, path: &Path) -> Result<Mmap, GsfReaderError> {
        let file = fs::File::open(path)?;
        Ok(unsafe { Mmap::map(&file) }?)
    }

    /// Memory-map `path` and run the index pass over it.
    pub fn open(&self, path: &Path) -> Result<GsfFile, GsfReaderError> {
        let data = self.mmap_file(path)?;
        let index = self.index_bytes(&data)?;
        Ok(GsfFile { data, index })
    }

    /// Run the index pass over an in-memory byte stream.
    pub fn index_bytes(&self, data: &[u8]) -> Result<FileIndex, GsfReaderError> {
        let index = FileIndexBuilder::new()
            .with_verify_checksums(self.verify_checksums)
            .build(&mut Cursor::new(data))?;
        Ok(index)
    }

    /// Return the number of pings that passed the index pass.
    pub fn ping_count(&self, path: &Path) -> Result<usize, GsfReaderError> {
        Ok(self.open(path)?.index.ping_count())
    }

    fn ping_decoder<'a>(&'a self, index: &FileIndex) -> PingDecoder<'a> {
        PingDecoder::new(index.version, &self.sensors).with_projection(self.projection)
    }

    /// Fully decode the `ping`-th indexed ping of `data`.
    pub fn decode_ping(
        &self,
        data: &[u8],
        index: &FileIndex,
        ping: usize,
    ) -> Result<DecodedPing, GsfReaderError> {
        let info = index
            .pings
            .get(ping)
            .ok_or(GsfReaderError::PingNotFound {
                ping,
                count: index.ping_count(),
            })?;
        let decoded = self.ping_decoder(index).decode(info, ping_bytes(data, info)?)?;
        Ok(decoded)
    }

    fn beam_layout(&self, index: &FileIndex) -> BeamLayout {
        match self.beam_axis {
            BeamAxis::Ragged => BeamLayout::Ragged,
            BeamAxis::FixedWidth => BeamLayout::FixedWidth(index.quality.max_beams),
        }
    }

    /// Decode one slice of pings in parallel and merge them in file order.
    ///
    /// Pings failing with a recoverable error are logged and left out.
    fn decode_chunk(
        &self,
        data: &[u8],
        decoder: PingDecoder<'_>,
        layout: BeamLayout,
        fields: &[BeamField],
        pings: &[PingInfo],
    ) -> Result<PingChunk, GsfReaderError> {
        let decoded: Vec<Result<DecodedPing, GsfReaderError>> = pings
            .par_iter()
            .map(|info| -> Result<DecodedPing, GsfReaderError> {
                Ok(decoder.decode(info, ping_bytes(data, info)?)?)
            })
            .collect();

        let mut chunk = PingChunk::with_fields(layout, fields.iter().copied());
        for (info, result) in pings.iter().zip(decoded) {
            match result {
                Ok(ping) => chunk.push(ping)?,
                Err(GsfReaderError::Gsf(error)) if error.is_recoverable() => {
                    log::warn!(
                        "skipping ping {} at offset {}: {error}",
                        info.index,
                        info.record_offset
                    );
                }
                Err(error) => return Err(error),
            }
        }

        if let Some(fields) = &self.fields {
            let names: Vec<&str> = fields.iter().map(String::as_str).collect();
            chunk.select_fields(&names);
        }
        Ok(chunk)
    }

    /// Decode the indexed pings of `data` chunk by chunk, skipping chunks in
    /// which every ping failed.
    ///
    /// Every chunk carries the beam fields of the whole file in catalog order,
    /// so batches built from them share one schema.
    fn chunks<'a>(
        &'a self,
        data: &'a [u8],
        index: &'a FileIndex,
    ) -> impl Iterator<Item = Result<PingChunk, GsfReaderError>> + 'a {
        let decoder = self.ping_decoder(index);
        let layout = self.beam_layout(index);
        let fields = index.beam_fields();
        index
            .pings
            .chunks(self.chunk_size.max(1))
            .map(move |pings| self.decode_chunk(data, decoder, layout, &fields, pings))
            .filter(|chunk| !matches!(chunk, Ok(chunk) if chunk.is_empty()))
    }

    /// Decode every indexed ping of `data` and emit reconciled chunks of at
    /// most `chunk_size` pings to callback.
    pub fn for_each_ping_chunk_in(
        &self,
        data: &[u8],
        index: &FileIndex,
        mut callback: impl FnMut(PingChunk) -> Result<(), CallbackError>,
    ) -> Result<(), GsfReaderError> {
        for chunk in self.chunks(data, index) {
            let chunk = chunk?;
            log::debug!(
                "decoded pings {}..={} into {} beam slots",
                chunk.pings.index[0],
                chunk.pings.index[chunk.len() - 1],
                chunk.beams.len()
            );
            callback(chunk).map_err(GsfReaderError::Callback)?;
        }
        Ok(())
    }

    /// Read all pings of a file and emit reconciled chunks to callback.
    pub fn for_each_ping_chunk(
        &self,
        path: &Path,
        callback: impl FnMut(PingChunk) -> Result<(), CallbackError>,
    ) -> Result<(), GsfReaderError> {
        let file = self.open(path)?;
        self.for_each_ping_chunk_in(file.bytes(), file.index(), callback)
    }

    /// Read all pings of a file and emit one-row-per-ping Arrow RecordBatches to callback.
    pub fn for_each_record_batch(
        &self,
        path: &Path,
        mut callback: impl FnMut(RecordBatch) -> Result<(), CallbackError>,
    ) -> Result<(), GsfReaderError> {
        let file = self.open(path)?;
        for chunk in self.chunks(file.bytes(), file.index()) {
            let batch = ping_chunk_to_record_batch(&chunk?)?;
            callback(batch).map_err(GsfReaderError::Callback)?;
        }
        Ok(())
    }
}

impl Default for GsfReader {
    fn default() -> Self {
        Self::new()
    }
}

impl GsfReaderBuilder {
    /// Register a sensor decoder.
    pub fn with_sensor_decoder(mut self, decoder: Box<dyn SensorDecoder>) -> Self {
        self.decoders.push(Arc::from(decoder));
        self
    }

    /// Set the number of pings per emitted chunk (default: 1024).
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Set the beam-axis layout (default: [`BeamAxis::Ragged`]).
    pub fn with_beam_layout(mut self, axis: BeamAxis) -> Self {
        self.beam_axis = axis;
        self
    }

    /// Compute per-beam longitude and latitude (default: on).
    pub fn with_projection(mut self, projection: bool) -> Self {
        self.projection = projection;
        self
    }

    /// Verify stored record checksums during the index pass (default: off).
    pub fn with_verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    /// Restrict emitted beam columns to the named fields, in the given order.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Register a shared sensor decoder.
    pub fn with_shared_sensor_decoder(mut self, decoder: Arc<dyn SensorDecoder>) -> Self {
        self.decoders.push(decoder);
        self
    }

    /// Register all bundled sensor decoders (Kongsberg, Reson, R2Sonic, Echotrac).
    pub fn with_default_sensors(self) -> Self {
        let s = self;
        #[cfg(feature = "sensors")]
        let s = gsf2arrow_sensors::default_decoders()
            .into_iter()
            .fold(s, Self::with_shared_sensor_decoder);
        s
    }

    /// Build the reader.
    pub fn build(self) -> GsfReader {
        let mut reader = GsfReader::new();
        reader.chunk_size = self.chunk_size;
        reader.beam_axis = self.beam_axis;
        reader.projection = self.projection;
        reader.verify_checksums = self.verify_checksums;
        reader.fields = self.fields;
        for decoder in self.decoders {
            reader.register_shared_sensor_decoder(decoder);
        }
        reader
    }
}

fn ping_bytes<'a>(data: &'a [u8], info: &PingInfo) -> Result<&'a [u8], GsfReaderError> {
    let range = info.data_range();
    let out_of_bounds = || GsfReaderError::PingOutOfBounds {
        ping: info.index,
        start: range.start,
        end: range.end,
        len: data.len(),
    };
    let start = usize::try_from(range.start).map_err(|_| out_of_bounds())?;
    let end = usize::try_from(range.end).map_err(|_| out_of_bounds())?;
    data.get(start..end).ok_or_else(out_of_bounds)
}
