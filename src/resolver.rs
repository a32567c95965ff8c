//! Row to geometry resolution.
//!
//! A row's geometry comes from the WKT column when that parses, otherwise
//! from the X/Y columns when both parse, otherwise the row has none.
//! Parse failures never abort: they are counted in [`RowDiagnostics`] and
//! the column simply contributes no geometry.
//!
//! Header names match configured fields exactly. With duplicate header
//! names the last column wins, both for the property value and for the
//! geometry role, though a later column that fails to parse does not
//! erase a value an earlier column already supplied.

use geo_types::{Geometry, Point};
use tracing::trace;
use wkt::TryFromWkt;

use crate::config::GeoCsvOptions;
use crate::models::{Feature, Properties};

/// Parse failures absorbed while resolving one row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowDiagnostics {
    pub wkt_failures: usize,
    pub x_failures: usize,
    pub y_failures: usize,
}

impl RowDiagnostics {
    pub fn total(&self) -> usize {
        self.wkt_failures + self.x_failures + self.y_failures
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

/// Geometry and properties derived from one row
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRow {
    pub geometry: Option<Geometry<f64>>,
    pub properties: Properties,
    pub diagnostics: RowDiagnostics,
}

impl ResolvedRow {
    /// The row as a feature, if it produced a geometry
    pub fn into_feature(self) -> Option<Feature> {
        let properties = self.properties;
        self.geometry.map(|g| Feature::new(g, properties))
    }
}

/// Derive geometry and properties for one row
///
/// `headers` and `row` are aligned by position.
pub fn resolve_row(headers: &[String], row: &[String], options: &GeoCsvOptions) -> ResolvedRow {
    let wkt_field = options.wkt_field();
    let x_field = options.x_field();
    let y_field = options.y_field();

    let mut geometry: Option<Geometry<f64>> = None;
    let mut x: Option<f64> = None;
    let mut y: Option<f64> = None;
    let mut properties = Properties::new();
    let mut diagnostics = RowDiagnostics::default();

    for (name, cell) in headers.iter().zip(row) {
        let name = name.as_str();

        if Some(name) == wkt_field {
            match Geometry::<f64>::try_from_wkt_str(cell) {
                Ok(parsed) => geometry = Some(parsed),
                Err(e) => {
                    trace!("Ignoring unparseable WKT in column '{}': {}", name, e);
                    diagnostics.wkt_failures += 1;
                }
            }
        } else if Some(name) == x_field {
            match parse_coordinate(cell) {
                Some(v) => x = Some(v),
                None => diagnostics.x_failures += 1,
            }
        } else if Some(name) == y_field {
            match parse_coordinate(cell) {
                Some(v) => y = Some(v),
                None => diagnostics.y_failures += 1,
            }
        }

        properties.insert(name.to_string(), cell.clone());
    }

    if geometry.is_none() {
        if let (Some(x), Some(y)) = (x, y) {
            geometry = Some(Geometry::Point(Point::new(x, y)));
        }
    }

    ResolvedRow {
        geometry,
        properties,
        diagnostics,
    }
}

/// NaN and infinities parse as floats but are not coordinates
fn parse_coordinate(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{LineString, line_string};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn point_of(geometry: &Option<Geometry<f64>>) -> (f64, f64) {
        match geometry {
            Some(Geometry::Point(p)) => (p.x(), p.y()),
            other => panic!("Expected a point, got {:?}", other),
        }
    }

    #[test]
    fn test_xy_point() {
        let headers = strings(&["id", "name", "x", "y"]);
        let row = strings(&["1", "a", "2", "49"]);

        let resolved = resolve_row(&headers, &row, &GeoCsvOptions::xy("x", "y"));

        assert_eq!(point_of(&resolved.geometry), (2.0, 49.0));
        assert!(resolved.diagnostics.is_clean());
        assert_eq!(resolved.properties.len(), 4);
        assert_eq!(resolved.properties["x"], "2");
        assert_eq!(resolved.properties["name"], "a");
    }

    #[test]
    fn test_non_numeric_y_drops_geometry() {
        let headers = strings(&["id", "x", "y"]);
        let row = strings(&["1", "2.5", "north"]);

        let resolved = resolve_row(&headers, &row, &GeoCsvOptions::xy("x", "y"));

        assert!(resolved.geometry.is_none());
        assert_eq!(resolved.diagnostics.y_failures, 1);
        assert_eq!(resolved.diagnostics.x_failures, 0);
        assert_eq!(resolved.properties["y"], "north");
        assert!(resolved.into_feature().is_none());
    }

    #[test]
    fn test_wkt_takes_precedence_over_xy() {
        let headers = strings(&["x", "y", "wkt"]);
        let row = strings(&["2", "49", "LINESTRING (0 0, 1 1)"]);
        let options = GeoCsvOptions::xy("x", "y").with_wkt_field("wkt");

        let resolved = resolve_row(&headers, &row, &options);

        let expected: LineString<f64> = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)];
        assert_eq!(resolved.geometry, Some(Geometry::LineString(expected)));
    }

    #[test]
    fn test_bad_wkt_falls_back_to_xy() {
        let headers = strings(&["x", "y", "wkt"]);
        let row = strings(&["2", "49", "POINT (nope)"]);
        let options = GeoCsvOptions::xy("x", "y").with_wkt_field("wkt");

        let resolved = resolve_row(&headers, &row, &options);

        assert_eq!(point_of(&resolved.geometry), (2.0, 49.0));
        assert_eq!(resolved.diagnostics.wkt_failures, 1);
    }

    #[test]
    fn test_minus_9999_is_a_real_coordinate() {
        let headers = strings(&["x", "y"]);
        let row = strings(&["-9999", "-9999"]);

        let resolved = resolve_row(&headers, &row, &GeoCsvOptions::xy("x", "y"));

        assert_eq!(point_of(&resolved.geometry), (-9999.0, -9999.0));
    }

    #[test]
    fn test_non_finite_coordinates_are_rejected() {
        let headers = strings(&["x", "y"]);
        let options = GeoCsvOptions::xy("x", "y");

        for (x, y) in [("NaN", "1"), ("1", "inf"), ("-infinity", "2"), ("NaN", "inf")] {
            let resolved = resolve_row(&headers, &strings(&[x, y]), &options);
            assert!(resolved.geometry.is_none(), "{} {} produced a geometry", x, y);
            assert!(resolved.diagnostics.total() >= 1);
        }

        let resolved = resolve_row(&headers, &strings(&["NaN", "inf"]), &options);
        assert_eq!(resolved.diagnostics.x_failures, 1);
        assert_eq!(resolved.diagnostics.y_failures, 1);
    }

    #[test]
    fn test_duplicate_headers_last_wins() {
        let headers = strings(&["x", "y", "x", "name", "name"]);
        let row = strings(&["1", "2", "3", "first", "second"]);

        let resolved = resolve_row(&headers, &row, &GeoCsvOptions::xy("x", "y"));

        assert_eq!(point_of(&resolved.geometry), (3.0, 2.0));
        assert_eq!(resolved.properties["x"], "3");
        assert_eq!(resolved.properties["name"], "second");
        assert_eq!(resolved.properties.len(), 3);
    }

    #[test]
    fn test_duplicate_header_failed_parse_keeps_earlier_value() {
        let headers = strings(&["x", "y", "x"]);
        let row = strings(&["1", "2", "n/a"]);

        let resolved = resolve_row(&headers, &row, &GeoCsvOptions::xy("x", "y"));

        assert_eq!(point_of(&resolved.geometry), (1.0, 2.0));
        assert_eq!(resolved.diagnostics.x_failures, 1);
        assert_eq!(resolved.properties["x"], "n/a");
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let headers = strings(&["X", "Y"]);
        let row = strings(&["1", "2"]);

        let resolved = resolve_row(&headers, &row, &GeoCsvOptions::xy("x", "y"));

        assert!(resolved.geometry.is_none());
        assert!(resolved.diagnostics.is_clean());
    }

    #[test]
    fn test_unconfigured_options_yield_no_geometry() {
        let headers = strings(&["wkt", "x", "y"]);
        let row = strings(&["POINT (1 2)", "1", "2"]);

        let resolved = resolve_row(&headers, &row, &GeoCsvOptions::default());

        assert!(resolved.geometry.is_none());
        assert_eq!(resolved.properties.len(), 3);
    }
}
