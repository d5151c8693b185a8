use arrow::error::ArrowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArrowConvertError {
    #[error("Cannot create RecordBatch from an empty ping chunk")]
    EmptyChunk,
    #[error("fixed beam width {0} does not fit an Arrow list size")]
    WidthOverflow(usize),
    #[error(transparent)]
    Arrow(#[from] ArrowError),
}
