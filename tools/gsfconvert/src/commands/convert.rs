use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use gsf2arrow::{
    BeamAxis, GsfReader,
    arrow::{beam_chunk_to_record_batch, ping_chunk_to_record_batch},
};
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    format::{OutputFormat, RowLayout},
    writer::{ParquetWriter, RecordBatchWriter, TextWriter},
};

#[derive(Args)]
pub struct ConvertArgs {
    /// Path to the gsf file
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Jsonl)]
    format: OutputFormat,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of pings per record batch
    #[arg(long, default_value_t = 1024)]
    chunk_size: usize,

    /// Pad every ping to the largest beam count in the file
    #[arg(long)]
    fixed_width: bool,

    /// Skip per-beam longitude/latitude
    #[arg(long)]
    no_projection: bool,

    /// Emit one row per beam even for formats with nested types
    #[arg(long)]
    beam_rows: bool,

    /// Comma-separated beam fields to keep (e.g. depth,across_track)
    #[arg(long, value_delimiter = ',')]
    fields: Option<Vec<String>>,

    /// Verify stored record checksums
    #[arg(long)]
    verify_checksums: bool,
}

impl ConvertArgs {
    pub fn run(self) -> Result<()> {
        let mut builder = GsfReader::builder()
            .with_default_sensors()
            .with_chunk_size(self.chunk_size)
            .with_projection(!self.no_projection)
            .with_verify_checksums(self.verify_checksums);
        if self.fixed_width {
            builder = builder.with_beam_layout(BeamAxis::FixedWidth);
        }
        if let Some(fields) = &self.fields {
            builder = builder.with_fields(fields.iter().map(|f| f.trim().to_string()));
        }
        let reader = builder.build();

        let file = reader.open(&self.input)?;
        let index = file.index();
        if !index.failed_pings.is_empty() {
            eprintln!(
                "Warning: {} ping records could not be indexed and are skipped",
                index.failed_pings.len()
            );
        }

        let pb = ProgressBar::new(index.ping_count() as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pings ({per_sec}, ETA: {eta})",
            )?
            .progress_chars("=>-"),
        );

        let mut writer: Box<dyn RecordBatchWriter> = match self.format {
            OutputFormat::Jsonl => Box::new(TextWriter::jsonl(self.output.as_deref())?),
            OutputFormat::Csv => Box::new(TextWriter::csv(self.output.as_deref())?),
            OutputFormat::Parquet => {
                let path = self
                    .output
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("Parquet output requires -o <file>"))?;
                Box::new(ParquetWriter::new(path))
            }
        };
        let layout = if self.beam_rows {
            RowLayout::Beam
        } else {
            self.format.row_layout()
        };

        let mut decoded = 0u64;
        let mut processed = 0u64;
        reader.for_each_ping_chunk_in(file.bytes(), index, |chunk| {
            let batch = match layout {
                RowLayout::Ping => ping_chunk_to_record_batch(&chunk)?,
                RowLayout::Beam => beam_chunk_to_record_batch(&chunk)?,
            };
            writer.write_batch(batch)?;
            decoded += chunk.len() as u64;
            // Pings dropped at decode time still advance the bar.
            let reached = chunk.pings.index.last().map_or(processed, |&i| i + 1);
            pb.inc(reached - processed);
            processed = reached;
            Ok(())
        })?;

        writer.finish()?;
        pb.finish_with_message("done");
        let skipped = index.ping_count() as u64 - decoded;
        if skipped > 0 {
            eprintln!("Warning: {skipped} pings failed to decode and were skipped");
        }
        Ok(())
    }
}
