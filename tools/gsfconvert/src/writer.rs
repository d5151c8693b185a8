//! Sinks for the record batches produced by `convert`.
//!
//! Every sink pins the schema of the first batch it receives. A later batch
//! with different columns is an error instead of rows landing under the
//! wrong header.

use std::{
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Result, bail};
use arrow::{datatypes::SchemaRef, record_batch::RecordBatch};
use parquet::{arrow::ArrowWriter, file::properties::WriterProperties};

pub trait RecordBatchWriter {
    fn write_batch(&mut self, batch: RecordBatch) -> Result<()>;
    fn finish(&mut self) -> Result<()>;
}

/// Schema of the first batch written to a sink.
#[derive(Debug, Default)]
struct PinnedSchema(Option<SchemaRef>);

impl PinnedSchema {
    /// Pins the schema of the first batch and returns `true` for it.
    fn check(&mut self, batch: &RecordBatch) -> Result<bool> {
        let schema = batch.schema();
        match &self.0 {
            None => {
                self.0 = Some(schema);
                Ok(true)
            }
            Some(pinned) if *pinned == schema => Ok(false),
            Some(pinned) => bail!(
                "batch columns [{}] differ from the first batch [{}]",
                column_names(&schema),
                column_names(pinned)
            ),
        }
    }

    fn is_pinned(&self) -> bool {
        self.0.is_some()
    }
}

fn column_names(schema: &SchemaRef) -> String {
    schema
        .fields()
        .iter()
        .map(|f| f.name().as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextEncoding {
    Jsonl,
    Csv,
}

/// JSON Lines or CSV written to a file or stdout.
pub struct TextWriter {
    dest: Box<dyn Write>,
    encoding: TextEncoding,
    schema: PinnedSchema,
    flush_each_batch: bool,
}

impl TextWriter {
    pub fn jsonl(output: Option<&Path>) -> Result<Self> {
        Self::new(output, TextEncoding::Jsonl)
    }

    pub fn csv(output: Option<&Path>) -> Result<Self> {
        Self::new(output, TextEncoding::Csv)
    }

    fn new(output: Option<&Path>, encoding: TextEncoding) -> Result<Self> {
        let dest: Box<dyn Write> = match output {
            Some(path) => Box::new(BufWriter::new(fs::File::create(path)?)),
            None => Box::new(BufWriter::new(io::stdout().lock())),
        };
        Ok(Self {
            dest,
            encoding,
            schema: PinnedSchema::default(),
            flush_each_batch: output.is_none(),
        })
    }
}

impl RecordBatchWriter for TextWriter {
    fn write_batch(&mut self, batch: RecordBatch) -> Result<()> {
        let first = self.schema.check(&batch)?;
        match self.encoding {
            TextEncoding::Jsonl => {
                let mut json = arrow::json::LineDelimitedWriter::new(&mut self.dest);
                json.write(&batch)?;
                json.finish()?;
            }
            TextEncoding::Csv => {
                // The header row goes out with the first batch only.
                let mut csv = arrow::csv::WriterBuilder::new()
                    .with_header(first)
                    .build(&mut self.dest);
                csv.write(&batch)?;
            }
        }
        if self.flush_each_batch {
            self.dest.flush()?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.dest.flush()?;
        Ok(())
    }
}

/// Parquet file, created when the first batch arrives.
pub struct ParquetWriter {
    output_path: PathBuf,
    inner: Option<ArrowWriter<fs::File>>,
    schema: PinnedSchema,
}

impl ParquetWriter {
    pub fn new(output: &Path) -> Self {
        Self {
            output_path: output.to_path_buf(),
            inner: None,
            schema: PinnedSchema::default(),
        }
    }
}

impl RecordBatchWriter for ParquetWriter {
    fn write_batch(&mut self, batch: RecordBatch) -> Result<()> {
        if self.schema.check(&batch)? {
            let file = fs::File::create(&self.output_path)?;
            let props = WriterProperties::builder().build();
            self.inner = Some(ArrowWriter::try_new(file, batch.schema(), Some(props))?);
        }
        if let Some(writer) = self.inner.as_mut() {
            writer.write(&batch)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if !self.schema.is_pinned() {
            bail!("No pings could be decoded");
        }
        if let Some(writer) = self.inner.take() {
            writer.close()?;
            eprintln!("Written to {}", self.output_path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::{
        array::{ArrayRef, Float64Array, UInt64Array},
        record_batch::RecordBatch,
    };
    use tempfile::TempDir;

    use super::*;

    fn batch(columns: &[&str], rows: u64) -> RecordBatch {
        let mut arrays: Vec<(&str, ArrayRef)> = vec![(
            "ping_index",
            Arc::new(UInt64Array::from_iter_values(0..rows)),
        )];
        for name in columns {
            let values = (0..rows).map(|r| -(r as f64));
            arrays.push((*name, Arc::new(Float64Array::from_iter_values(values))));
        }
        RecordBatch::try_from_iter(arrays).unwrap()
    }

    #[test]
    fn csv_header_is_written_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("beams.csv");
        let mut writer = TextWriter::csv(Some(&path)).unwrap();
        writer.write_batch(batch(&["depth"], 2)).unwrap();
        writer.write_batch(batch(&["depth"], 1)).unwrap();
        writer.finish().unwrap();
        drop(writer);

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ping_index,depth");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn text_writer_rejects_changed_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pings.jsonl");
        let mut writer = TextWriter::jsonl(Some(&path)).unwrap();
        writer.write_batch(batch(&["depth"], 1)).unwrap();

        let err = writer
            .write_batch(batch(&["depth", "across_track"], 1))
            .unwrap_err();
        assert!(err.to_string().contains("across_track"));
    }

    #[test]
    fn parquet_writer_accepts_matching_batches_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pings.parquet");
        let mut writer = ParquetWriter::new(&path);
        writer.write_batch(batch(&["depth"], 2)).unwrap();
        writer.write_batch(batch(&["depth"], 3)).unwrap();
        assert!(writer.write_batch(batch(&["along_track"], 1)).is_err());
        writer.finish().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn parquet_writer_without_batches_fails() {
        let dir = TempDir::new().unwrap();
        let mut writer = ParquetWriter::new(&dir.path().join("empty.parquet"));
        assert!(writer.finish().is_err());
    }
}
