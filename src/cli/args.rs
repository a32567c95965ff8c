//! Command-line argument definitions for geocsv
//!
//! Defines the CLI interface using the clap derive API. Field flags are
//! layered over an optional JSON options file.

use crate::config::GeoCsvOptions;
use crate::constants::DEFAULT_LOG_LEVEL;
use crate::{GeoCsvError, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the CSV to GeoJSON converter
#[derive(Debug, Clone, Parser)]
#[command(
    name = "geocsv",
    version,
    about = "Convert CSV tables with WKT or X/Y columns into GeoJSON",
    long_about = "Reads CSV files whose cells may be UTF-8 or GBK encoded, derives one geometry \
                  per row from a WKT column or a pair of X/Y columns, and writes the rows that \
                  have a geometry as GeoJSON feature collections. Every column is kept as a \
                  string property."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: debug, -vv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Convert CSV files to GeoJSON
    Convert(ConvertArgs),
    /// Report headers, validity and conversion statistics for a CSV file
    Inspect(InspectArgs),
}

/// Geometry field selection shared by all commands
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct FieldArgs {
    /// Header of the X / longitude column
    #[arg(short = 'x', long = "x-field", value_name = "NAME")]
    pub x_field: Option<String>,

    /// Header of the Y / latitude column
    #[arg(short = 'y', long = "y-field", value_name = "NAME")]
    pub y_field: Option<String>,

    /// Header of the WKT geometry column
    #[arg(short = 'w', long = "wkt-field", value_name = "NAME")]
    pub wkt_field: Option<String>,

    /// JSON options file, e.g. {"XField": "lon", "YField": "lat"}
    ///
    /// Flags given on the command line override values from the file.
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,
}

/// Arguments for the convert command
#[derive(Debug, Clone, Parser)]
pub struct ConvertArgs {
    /// CSV files or directories to convert
    ///
    /// Directories are searched recursively for .csv files.
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub fields: FieldArgs,

    /// Directory for the generated .geojson files
    ///
    /// Defaults to writing each output next to its input. Files found in a
    /// directory keep their subdirectory under DIR.
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Pretty-print the GeoJSON output
    #[arg(long = "pretty")]
    pub pretty: bool,

    /// Overwrite existing output files
    #[arg(short = 'f', long = "force")]
    pub force_overwrite: bool,
}

/// Arguments for the inspect command
#[derive(Debug, Clone, Parser)]
pub struct InspectArgs {
    /// CSV file to inspect
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[command(flatten)]
    pub fields: FieldArgs,
}

impl Args {
    /// Log level implied by `--verbose` / `--quiet`
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => DEFAULT_LOG_LEVEL,
                1 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl FieldArgs {
    /// Build options from the options file (if any) with flag overrides
    pub fn to_options(&self) -> Result<GeoCsvOptions> {
        let base = match &self.config_file {
            Some(path) => GeoCsvOptions::from_file(path)?,
            None => GeoCsvOptions::default(),
        };

        let overrides = GeoCsvOptions {
            fields: Vec::new(),
            x_field: self.x_field.clone(),
            y_field: self.y_field.clone(),
            wkt_field: self.wkt_field.clone(),
        };

        let options = base.merge(overrides);
        options.validate()?;
        Ok(options)
    }
}

impl ConvertArgs {
    /// Validate arguments before any file is read
    pub fn validate(&self) -> Result<()> {
        for input in &self.inputs {
            if !input.exists() {
                return Err(GeoCsvError::configuration(format!(
                    "Input path does not exist: {}",
                    input.display()
                )));
            }
        }

        if let Some(dir) = &self.output_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(GeoCsvError::configuration(format!(
                    "Output path is not a directory: {}",
                    dir.display()
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_convert() {
        let args = Args::parse_from([
            "geocsv", "-v", "convert", "a.csv", "b.csv", "-x", "lon", "-y", "lat", "--pretty",
        ]);

        assert_eq!(args.get_log_level(), "debug");
        match args.command {
            Some(Commands::Convert(convert)) => {
                assert_eq!(convert.inputs.len(), 2);
                assert_eq!(convert.fields.x_field.as_deref(), Some("lon"));
                assert!(convert.pretty);
                assert!(!convert.force_overwrite);
            }
            other => panic!("Expected convert command, got {:?}", other),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["geocsv", "-q", "-v", "inspect", "a.csv"]).is_err());

        let args = Args::parse_from(["geocsv", "inspect", "a.csv", "-q"]);
        assert_eq!(args.get_log_level(), "error");
        assert!(!args.show_progress());
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"XField": "lon", "YField": "lat"}}"#).unwrap();

        let fields = FieldArgs {
            y_field: Some("latitude".to_string()),
            config_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };

        let options = fields.to_options().unwrap();
        assert_eq!(options.x_field(), Some("lon"));
        assert_eq!(options.y_field(), Some("latitude"));
    }

    #[test]
    fn test_missing_geometry_fields_rejected() {
        let fields = FieldArgs {
            x_field: Some("lon".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            fields.to_options(),
            Err(GeoCsvError::Configuration { .. })
        ));
    }

    #[test]
    fn test_convert_validate_missing_input() {
        let args = ConvertArgs {
            inputs: vec![PathBuf::from("/nonexistent/input.csv")],
            fields: FieldArgs::default(),
            output_dir: None,
            pretty: false,
            force_overwrite: false,
        };
        assert!(args.validate().is_err());
    }
}
