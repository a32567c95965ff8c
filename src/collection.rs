//! Feature collection assembly.
//!
//! Drives the resolver over every row of a [`GeoCsv`] in order. Rows that
//! produce no geometry are skipped; everything else keeps source row order.
//! Nothing is cached: each call re-derives features from the table.

use tracing::debug;

use crate::models::{Feature, FeatureCollection};
use crate::reader::GeoCsv;
use crate::resolver::{RowDiagnostics, resolve_row};

/// Conversion result with features and statistics
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub collection: FeatureCollection,
    pub stats: ConversionStats,
}

/// Counts gathered while converting a table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionStats {
    /// Data rows examined
    pub total_rows: usize,

    /// Rows that produced a feature
    pub features_emitted: usize,

    /// Rows skipped for lack of geometry
    pub rows_without_geometry: usize,

    /// WKT cells that failed to parse
    pub wkt_parse_failures: usize,

    /// X or Y cells that failed to parse as numbers
    pub coordinate_parse_failures: usize,
}

impl ConversionStats {
    fn record(&mut self, diagnostics: &RowDiagnostics, emitted: bool) {
        self.total_rows += 1;
        if emitted {
            self.features_emitted += 1;
        } else {
            self.rows_without_geometry += 1;
        }
        self.wkt_parse_failures += diagnostics.wkt_failures;
        self.coordinate_parse_failures += diagnostics.x_failures + diagnostics.y_failures;
    }

    /// Share of rows that produced a feature, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            (self.features_emitted as f64 / self.total_rows as f64) * 100.0
        }
    }
}

impl GeoCsv {
    /// Feature for the row at `index`
    ///
    /// `None` when the index is out of range or the row has no geometry.
    pub fn feature(&self, index: usize) -> Option<Feature> {
        let row = self.table().row(index)?;
        resolve_row(self.headers(), row, self.options()).into_feature()
    }

    /// All features in row order, geometry-less rows omitted
    pub fn to_feature_collection(&self) -> FeatureCollection {
        self.convert().collection
    }

    /// Convert every row, collecting features and statistics
    pub fn convert(&self) -> ConversionResult {
        let mut stats = ConversionStats::default();
        let mut features = Vec::with_capacity(self.row_count());

        for (index, row) in self.rows().iter().enumerate() {
            let resolved = resolve_row(self.headers(), row, self.options());
            let diagnostics = resolved.diagnostics;

            match resolved.into_feature() {
                Some(feature) => {
                    features.push(feature);
                    stats.record(&diagnostics, true);
                }
                None => {
                    debug!("Row {} has no geometry, skipping", index);
                    stats.record(&diagnostics, false);
                }
            }
        }

        debug!(
            "Converted {} of {} rows to features",
            stats.features_emitted, stats.total_rows
        );

        ConversionResult {
            collection: FeatureCollection { features },
            stats,
        }
    }
}
