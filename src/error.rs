//! Error handling for GeoCSV reading and conversion.
//!
//! Every variant here aborts the whole read. Cell-level geometry problems
//! (bad WKT, non-numeric coordinates) are never errors; they are counted in
//! the resolver diagnostics instead.

use std::path::PathBuf;
use thiserror::Error;

use crate::encoding::DecodeError;

/// Record numbers are zero-based tokenizer record indices; record 0 is the header.
#[derive(Error, Debug)]
pub enum GeoCsvError {
    #[error("Unsupported cell encoding at record {record}, column {column}: {source}")]
    Encoding {
        record: u64,
        column: usize,
        #[source]
        source: DecodeError,
    },

    #[error("Malformed CSV at record {record}: {source}")]
    Read {
        record: u64,
        #[source]
        source: csv::Error,
    },

    #[error("Cannot open input file {path}: {source}")]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GeoCsvError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Wrap a tokenizer error, using the tokenizer's own position when it has one
    pub fn read(source: csv::Error, fallback_record: u64) -> Self {
        let record = source
            .position()
            .map(|p| p.record())
            .unwrap_or(fallback_record);
        Self::Read { record, source }
    }

    /// True for errors raised while tokenizing or decoding the input
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Encoding { .. } | Self::Read { .. })
    }
}

pub type Result<T> = std::result::Result<T, GeoCsvError>;
