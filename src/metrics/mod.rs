//! Benchmark report metrics

pub mod extractor;

pub use extractor::{extract_decode_time, read_decode_time};
