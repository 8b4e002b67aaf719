//! This module reads flat comparison files (spectra, tgas, eden) back in, be
//! they ours or written by another code following the same convention.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::debug;
use nalgebra::DMatrix;

use crate::errors::ReadError;

/// A flat comparison file, parsed.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatFile {
  /// The times in the `#TIMES[d]` header.
  pub times: Vec<f64>,
  /// Name of the first column ("WAVE" or "VEL").
  pub first_column_name: String,
  /// The column description comment line, including the '#'.
  pub column_description: String,
  /// The body: first column is the grid, then one column per time.
  pub table: DMatrix<f64>,
}

/// Splits a "#KEY: value" line.
fn split_header(line: &str) -> Option<(&str, &str)> {
  let (key, value) = line.strip_prefix('#')?.split_once(':')?;
  return Some((key.trim(), value.trim()));
}

/// Parses a single number, with a useful error.
fn parse_number(s: &str) -> Result<f64, ReadError> {
  return s.trim().parse::<f64>().map_err(|_| ReadError::BadNumber(s.to_owned()));
}

/// Parses a count header value.
fn parse_count(line: &str, value: &str) -> Result<usize, ReadError> {
  return value.parse::<usize>().map_err(|_| ReadError::BadHeader(line.to_owned()));
}

impl FlatFile {
  /// Reads and parses a file.
  pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ReadError> {
    let mut contents = String::new();
    BufReader::new(File::open(path.as_ref())?).read_to_string(&mut contents)?;
    debug!("Parsing {}...", path.as_ref().display());
    return Self::parse(&contents);
  }

  /// Parses the contents of a file.
  pub fn parse(contents: &str) -> Result<Self, ReadError> {
    let mut ntimes: Option<usize> = None;
    let mut nrows: Option<(String, usize)> = None;
    let mut times: Option<Vec<f64>> = None;
    let mut description: Option<String> = None;
    for line in contents.lines().take_while(|l| l.starts_with('#')) {
      match split_header(line) {
        Some(("NTIMES", v)) => ntimes = Some(parse_count(line, v)?),
        Some(("TIMES[d]", v)) => {
          times = Some(
            v.split_whitespace()
              .map(parse_number)
              .collect::<Result<Vec<_>, _>>()?
          );
        }
        Some((k, v)) if k.starts_with('N') && !k.contains(' ') => {
          nrows = Some((k[1..].to_owned(), parse_count(line, v)?));
        }
        _ => description = description.or(Some(line.to_owned())),
      }
    }
    let ntimes = ntimes.ok_or(ReadError::MissingHeader("#NTIMES"))?;
    let (first_column_name, nrows) = nrows
      .ok_or(ReadError::MissingHeader("#NWAVE/#NVEL"))?;
    let times = times.ok_or(ReadError::MissingHeader("#TIMES[d]"))?;
    let column_description = description
      .ok_or(ReadError::MissingHeader("column description"))?;
    if times.len() != ntimes {
      return Err(ReadError::CountMismatch {
        what: "times",
        declared: ntimes,
        found: times.len(),
      });
    }
    // the header lines are comments as far as the body is concerned
    let mut rdr = csv::ReaderBuilder::new()
      .delimiter(b' ')
      .has_headers(false)
      .comment(Some(b'#'))
      .from_reader(contents.as_bytes());
    let ncols = ntimes + 1;
    let mut values: Vec<f64> = Vec::with_capacity(nrows * ncols);
    let mut found_rows = 0;
    for record in rdr.records() {
      let record = record?;
      let row = record
        .iter()
        .filter(|f| !f.is_empty())
        .map(parse_number)
        .collect::<Result<Vec<_>, _>>()?;
      if row.len() != ncols {
        return Err(ReadError::CountMismatch {
          what: "columns",
          declared: ncols,
          found: row.len(),
        });
      }
      values.extend(row);
      found_rows += 1;
    }
    if found_rows != nrows {
      return Err(ReadError::CountMismatch {
        what: "rows",
        declared: nrows,
        found: found_rows,
      });
    }
    return Ok(Self {
      times,
      first_column_name,
      column_description,
      table: DMatrix::from_row_slice(nrows, ncols, &values),
    });
  }

  /// The grid column (wavelengths or velocities).
  pub fn first_column(&self) -> Vec<f64> {
    return self.table.column(0).iter().copied().collect();
  }

  /// The column for the i-th time.
  pub fn time_column(&self, i: usize) -> Option<Vec<f64>> {
    if i >= self.times.len() {
      return None;
    }
    return Some(self.table.column(i + 1).iter().copied().collect());
  }
}
