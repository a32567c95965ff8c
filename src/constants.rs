//! Application constants for GeoCSV conversion
//!
//! Byte ranges for the encoding heuristic, file naming conventions and
//! logging defaults used throughout the crate.

// =============================================================================
// Encoding Heuristic
// =============================================================================

/// Byte order mark as it appears after decoding
pub const BOM_CHAR: char = '\u{FEFF}';

/// GBK double-byte lead byte range
pub const GBK_LEAD_BYTES: std::ops::RangeInclusive<u8> = 0x81..=0xFE;

/// GBK double-byte trail byte range (0x7F is excluded separately)
pub const GBK_TRAIL_BYTES: std::ops::RangeInclusive<u8> = 0x40..=0xFE;

/// The one byte inside [`GBK_TRAIL_BYTES`] that never trails a lead byte
pub const GBK_TRAIL_EXCLUDED: u8 = 0x7F;

// =============================================================================
// Files
// =============================================================================

/// Extension of input files discovered when walking directories
pub const CSV_EXTENSION: &str = "csv";

/// Extension of written output files
pub const GEOJSON_EXTENSION: &str = "geojson";

// =============================================================================
// Logging
// =============================================================================

/// Crate target used to build the default log filter
pub const LOG_TARGET: &str = "geocsv";

/// Log level when neither `--verbose` nor `--quiet` is given
pub const DEFAULT_LOG_LEVEL: &str = "info";
