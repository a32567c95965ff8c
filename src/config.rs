//! Conversion options and validation.
//!
//! [`GeoCsvOptions`] names the columns that carry geometry. Options can be
//! built in code, deserialized from a JSON options file, or layered from
//! CLI flags over a file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{GeoCsvError, Result};

/// Which columns supply geometry
///
/// Empty strings are treated the same as unset fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoCsvOptions {
    /// Reserved; has no effect on conversion
    #[serde(rename = "Fields", alias = "fields")]
    pub fields: Vec<String>,

    /// Header of the longitude / X column
    #[serde(rename = "XField", alias = "x_field", skip_serializing_if = "Option::is_none")]
    pub x_field: Option<String>,

    /// Header of the latitude / Y column
    #[serde(rename = "YField", alias = "y_field", skip_serializing_if = "Option::is_none")]
    pub y_field: Option<String>,

    /// Header of the WKT geometry column
    #[serde(
        rename = "WKTField",
        alias = "wkt_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub wkt_field: Option<String>,
}

/// The geometry source a header row can support
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryMode {
    /// Geometry parsed from the WKT column
    Wkt,
    /// Point built from the X and Y columns
    XY,
}

impl GeoCsvOptions {
    /// Options for a pair of coordinate columns
    pub fn xy(x_field: impl Into<String>, y_field: impl Into<String>) -> Self {
        Self {
            x_field: Some(x_field.into()),
            y_field: Some(y_field.into()),
            ..Default::default()
        }
    }

    /// Options for a WKT column
    pub fn wkt(wkt_field: impl Into<String>) -> Self {
        Self {
            wkt_field: Some(wkt_field.into()),
            ..Default::default()
        }
    }

    /// Add a WKT column to existing options
    pub fn with_wkt_field(mut self, wkt_field: impl Into<String>) -> Self {
        self.wkt_field = Some(wkt_field.into());
        self
    }

    pub fn x_field(&self) -> Option<&str> {
        configured(&self.x_field)
    }

    pub fn y_field(&self) -> Option<&str> {
        configured(&self.y_field)
    }

    pub fn wkt_field(&self) -> Option<&str> {
        configured(&self.wkt_field)
    }

    /// Load options from a JSON file
    ///
    /// Accepts both `{"XField": "lon"}` and `{"x_field": "lon"}` spellings.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GeoCsvError::Resource {
            path: path.to_path_buf(),
            source: e,
        })?;
        let options: Self = serde_json::from_str(&content)?;
        debug!("Loaded options from {}: {:?}", path.display(), options);
        Ok(options)
    }

    /// Overlay another set of options; fields set in `other` win
    pub fn merge(mut self, other: GeoCsvOptions) -> Self {
        let GeoCsvOptions {
            fields,
            x_field,
            y_field,
            wkt_field,
        } = other;

        if configured(&x_field).is_some() {
            self.x_field = x_field;
        }
        if configured(&y_field).is_some() {
            self.y_field = y_field;
        }
        if configured(&wkt_field).is_some() {
            self.wkt_field = wkt_field;
        }
        if !fields.is_empty() {
            self.fields = fields;
        }
        self
    }

    /// Check that at least one geometry source is fully configured
    pub fn validate(&self) -> Result<()> {
        match (self.x_field(), self.y_field()) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(GeoCsvError::configuration(
                    "XField and YField must be configured together",
                ));
            }
            (None, None) if self.wkt_field().is_none() => {
                return Err(GeoCsvError::configuration(
                    "No geometry source configured: set WKTField or both XField and YField",
                ));
            }
            _ => {}
        }
        Ok(())
    }

    /// Geometry mode the given headers support, WKT taking precedence
    ///
    /// Only configured field names are considered, and matching is exact.
    pub fn geometry_mode(&self, headers: &[String]) -> Option<GeometryMode> {
        let has = |name: Option<&str>| name.is_some_and(|n| headers.iter().any(|h| h == n));

        if has(self.wkt_field()) {
            Some(GeometryMode::Wkt)
        } else if has(self.x_field()) && has(self.y_field()) {
            Some(GeometryMode::XY)
        } else {
            None
        }
    }
}

fn configured(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|f| !f.is_empty())
}
