use std::{fs, path::PathBuf};

use anyhow::Result;
use clap::Args;
use gsf2arrow::{
    GsfReader,
    core::{FileIndex, subrecord_name},
};

#[derive(Args)]
pub struct InfoArgs {
    /// Path to the gsf file
    input: PathBuf,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verify stored record checksums
    #[arg(long)]
    verify_checksums: bool,
}

impl InfoArgs {
    pub fn run(self) -> Result<()> {
        let reader = GsfReader::builder()
            .with_verify_checksums(self.verify_checksums)
            .build();
        let file = reader.open(&self.input)?;
        let text = format_index(file.index());

        match self.output {
            Some(path) => fs::write(path, text)?,
            None => print!("{text}"),
        }
        Ok(())
    }
}

fn format_time(nanos: i64) -> String {
    format!(
        "{}.{:09}",
        nanos.div_euclid(1_000_000_000),
        nanos.rem_euclid(1_000_000_000)
    )
}

fn format_index(index: &FileIndex) -> String {
    let mut out = format!("version: {}\n\nrecords:\n", index.version);
    for (record_type, stats) in index.records.all_stats() {
        out += &format!(
            "  {:<28} {:>8} records {:>10} measurements\n",
            record_type.to_string(),
            stats.records,
            stats.measurements
        );
    }

    out += &format!("\nping groups: {}\n", index.groups.len());
    for group in &index.groups {
        out += &format!(
            "  pings {:>6}..{:<6} {:>10} beams {:>3} scale factors\n",
            group.start,
            group.stop,
            group.beam_count,
            group.scale_factors.as_ref().map_or(0, |t| t.len())
        );
    }

    let q = &index.quality;
    out += &format!(
        "\nquality:\n  beams per ping: {}..={} (consistent: {})\n  duplicate timestamps: {} (coincident: {}, duplicate pings: {})\n  consistent schema: {}\n",
        q.min_beams,
        q.max_beams,
        q.consistent_beam_count,
        q.duplicate_count,
        q.coincident_pings,
        q.duplicate_pings,
        q.consistent_schema
    );
    out += "\nsubrecords:\n";
    for (id, count) in &q.subrecord_counts {
        out += &format!("  {:>3} {:<28} {:>8} pings\n", id, subrecord_name(*id), count);
    }

    if let Some(summary) = index.swath_summary() {
        out += &format!(
            "\nswath summary:\n  time: {} .. {}\n  lon: {} .. {}\n  lat: {} .. {}\n  depth: {} .. {}\n",
            format_time(summary.start_time),
            format_time(summary.end_time),
            summary.min_longitude,
            summary.max_longitude,
            summary.min_latitude,
            summary.max_latitude,
            summary.min_depth,
            summary.max_depth
        );
    }

    let comments: Vec<_> = index.comments().collect();
    if !comments.is_empty() {
        out += "\ncomments:\n";
        for comment in comments {
            out += &format!("  [{}] {}\n", format_time(comment.time), comment.text);
        }
    }

    if !index.failed_pings.is_empty() {
        out += &format!("\nfailed pings: {}\n", index.failed_pings.len());
        for failed in &index.failed_pings {
            out += &format!(
                "  ping {} at offset {}: {}\n",
                failed.ping_number, failed.record_offset, failed.error
            );
        }
    }
    out
}
