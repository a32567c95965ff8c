//! GeoCSV Library
//!
//! Converts CSV tables into geospatial features. Geometry comes either from
//! a WKT column or from a pair of numeric X/Y columns; every column is also
//! kept as a string property.
//!
//! This library provides tools for:
//! - Decoding cells whose encoding is UTF-8 or GBK, classified per cell
//! - Reading a CSV stream into a header row and decoded data rows
//! - Resolving each row to a geometry, WKT first, then X/Y
//! - Assembling ordered feature collections and exporting them as GeoJSON
//!
//! ```no_run
//! use geocsv::{GeoCsv, GeoCsvOptions};
//!
//! # fn main() -> geocsv::Result<()> {
//! let gc = GeoCsv::read("points.csv", GeoCsvOptions::xy("lon", "lat"))?;
//! let features = gc.to_feature_collection();
//! println!("{}", features.to_geojson_string(true)?);
//! # Ok(())
//! # }
//! ```

pub mod collection;
pub mod config;
pub mod constants;
pub mod encoding;
pub mod error;
pub mod models;
pub mod reader;
pub mod resolver;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use collection::{ConversionResult, ConversionStats};
pub use config::{GeoCsvOptions, GeometryMode};
pub use encoding::{DecodeError, TextEncoding};
pub use error::{GeoCsvError, Result};
pub use models::{Feature, FeatureCollection, Properties};
pub use reader::{GeoCsv, Table, read_table};
pub use resolver::{ResolvedRow, RowDiagnostics, resolve_row};
