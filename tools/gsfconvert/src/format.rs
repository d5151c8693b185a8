use clap::ValueEnum;

#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    Jsonl,
    Csv,
    Parquet,
}

/// Row granularity of the emitted batches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowLayout {
    /// One row per ping with list-valued beam columns.
    Ping,
    /// One row per beam with scalar columns only.
    Beam,
}

impl OutputFormat {
    pub fn row_layout(&self) -> RowLayout {
        match self {
            OutputFormat::Jsonl | OutputFormat::Parquet => RowLayout::Ping,
            OutputFormat::Csv => RowLayout::Beam,
        }
    }
}
