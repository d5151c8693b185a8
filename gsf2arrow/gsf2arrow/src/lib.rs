mod error;
mod reader;

pub use error::GsfReaderError;
pub use gsf2arrow_arrow as arrow;
pub use gsf2arrow_core as core;
pub use reader::{BeamAxis, GsfFile, GsfReader, GsfReaderBuilder};
