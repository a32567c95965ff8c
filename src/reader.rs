//! Table reading from CSV input.
//!
//! The input is tokenized once into byte records; the first record becomes
//! the header row and every later record a data row. Each cell is decoded
//! individually (see [`crate::encoding`]), so files mixing UTF-8 and GBK
//! cells read correctly.
//!
//! Any tokenizer or decoding failure aborts the read; no partial table is
//! returned.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::config::GeoCsvOptions;
use crate::encoding::decode_cell;
use crate::error::{GeoCsvError, Result};

/// Decoded header names and rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn header_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Read and decode a whole CSV stream
///
/// Records whose length differs from the header's are rejected by the
/// tokenizer and reported as [`GeoCsvError::Read`].
pub fn read_table<R: Read>(reader: R) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(reader);

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    let mut record = csv::ByteRecord::new();
    let mut record_index: u64 = 0;

    loop {
        let more = csv_reader
            .read_byte_record(&mut record)
            .map_err(|e| GeoCsvError::read(e, record_index))?;
        if !more {
            break;
        }

        let values = decode_record(&record, record_index)?;
        if headers.is_none() {
            headers = Some(values);
        } else {
            rows.push(values);
        }
        record_index += 1;
    }

    let headers = headers.unwrap_or_default();
    debug!("Read {} headers and {} rows", headers.len(), rows.len());

    Ok(Table::new(headers, rows))
}

fn decode_record(record: &csv::ByteRecord, record_index: u64) -> Result<Vec<String>> {
    record
        .iter()
        .enumerate()
        .map(|(column, field)| {
            decode_cell(field).map_err(|source| GeoCsvError::Encoding {
                record: record_index,
                column,
                source,
            })
        })
        .collect()
}

/// A decoded CSV table together with the options used to derive features
///
/// Built once per read and immutable afterwards; feature derivation
/// borrows it read-only.
#[derive(Debug, Clone)]
pub struct GeoCsv {
    table: Table,
    options: GeoCsvOptions,
}

impl GeoCsv {
    /// Wrap an already decoded table
    pub fn new(table: Table, options: GeoCsvOptions) -> Self {
        Self { table, options }
    }

    /// Read a CSV file
    ///
    /// The file is opened here and closed before this returns, whether the
    /// read succeeds or fails.
    pub fn read(path: impl AsRef<Path>, options: GeoCsvOptions) -> Result<Self> {
        let path = path.as_ref();
        info!("Reading CSV file: {}", path.display());

        let file = File::open(path).map_err(|e| GeoCsvError::Resource {
            path: path.to_path_buf(),
            source: e,
        })?;
        let table = read_table(BufReader::new(file))?;

        Ok(Self::new(table, options))
    }

    /// Read from a caller-supplied stream
    ///
    /// Pass `&mut reader` to keep using the stream afterwards; the caller
    /// stays responsible for closing it.
    pub fn from_reader<R: Read>(reader: R, options: GeoCsvOptions) -> Result<Self> {
        let table = read_table(reader)?;
        Ok(Self::new(table, options))
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn options(&self) -> &GeoCsvOptions {
        &self.options
    }

    pub fn headers(&self) -> &[String] {
        self.table.headers()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        self.table.rows()
    }

    pub fn header_count(&self) -> usize {
        self.table.header_count()
    }

    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    /// Whether the table can yield features at all
    ///
    /// True when there are headers and rows, and the configured WKT field or
    /// both coordinate fields appear among the headers. Row contents are not
    /// inspected, so a valid table may still produce no features.
    pub fn is_valid(&self) -> bool {
        !self.table.headers.is_empty()
            && !self.table.rows.is_empty()
            && self.options.geometry_mode(&self.table.headers).is_some()
    }
}
