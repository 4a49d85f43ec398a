//! Data model types shared across the pipeline.

mod label;
mod search;

pub use label::{RawAcquisition, RawFragment};
pub use search::SearchResult;
