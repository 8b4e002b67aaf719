//! This submodule implements the general layout of comparison files and the
//! code that writes them out.
//!
//! Every file starts with a few `#KEY: value` header lines. After that, the
//! body is either one flat table (first column is the shared grid, then one
//! column per time) or one block per time, each with its own small header.

use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use itertools::Itertools;
use log::info;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use sn_results::prelude::*;

use crate::errors::ExportError;
use crate::formatting::*;

/// Suffix shared by every file name.
pub const FILE_SUFFIX: &str = "tardis.txt";

/// The kinds of comparison files.
#[derive(
  Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
  Hash, ValueEnum
)]
#[clap(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
  /// Integrated spectra, one column per time.
  Spectra,
  /// Electron (gas) temperatures on the shared velocity grid.
  Tgas,
  /// Electron densities on the shared velocity grid.
  Eden,
  /// Ionisation fractions of one species, one block per time.
  Ionfrac,
  /// Bulk physical properties, one block per time.
  Phys,
}

impl DataKind {
  /// Returns all the kinds, in the order they're usually written.
  pub const fn all() -> &'static [Self] {
    return &[Self::Spectra, Self::Tgas, Self::Eden, Self::Ionfrac, Self::Phys];
  }

  /// The name used as a file name prefix.
  pub const fn name(&self) -> &'static str {
    return match self {
      Self::Spectra => "spectra",
      Self::Tgas => "tgas",
      Self::Eden => "eden",
      Self::Ionfrac => "ionfrac",
      Self::Phys => "phys",
    };
  }

  /// Name of the first column, as it appears in the `#N<...>` header.
  pub const fn first_column_name(&self) -> &'static str {
    return match self {
      Self::Spectra => "WAVE",
      _ => "VEL",
    };
  }

  /// The fixed comment line describing the columns. Ionisation fraction
  /// files get the species columns appended to this.
  pub const fn column_description(&self) -> &'static str {
    return match self {
      Self::Spectra => concat!(
        "#wavelength[Ang] flux_t0[erg/s/Ang] flux_t1[erg/s/Ang] ... ",
        "flux_tn[erg/s/Ang]"
      ),
      Self::Tgas => "#vel_mid[km/s] Tgas_t0[K] Tgas_t1[K] ... Tgas_tn[K]",
      Self::Eden => {
        "#vel_mid[km/s] ne_t0[/cm^3] ne_t1[/cm^3] ... ne_tn[/cm^3]"
      }
      Self::Ionfrac => "#vel_mid[km/s]",
      Self::Phys => {
        "#vel_mid[km/s] temp[K] rho[gcc] ne[/cm^3] natom[/cm^3]"
      }
    };
  }
}

impl Display for DataKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(f, "{}", self.name());
  }
}

/// A chemical species, already resolved to its atomic number.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Species {
  /// Canonical element symbol.
  pub symbol: &'static str,
  /// Atomic number.
  pub z: u8,
}

impl Species {
  /// The species used when none is asked for.
  pub const DEFAULT_SYMBOL: &'static str = "Ca";

  /// Looks a species up by symbol.
  pub fn lookup(symbol: &str) -> Result<Self, NuclideError> {
    let z = atomic_number(symbol)?;
    return Ok(Self { symbol: sn_results::nuclides::symbol(z)?, z });
  }

  /// Number of ionisation stages, neutral to fully ionised.
  pub fn n_stages(&self) -> usize {
    return usize::from(self.z) + 1;
  }

  /// Column names for each stage ("Ca0", "Ca1", ...).
  pub fn stage_columns(&self) -> impl Iterator<Item = String> + '_ {
    return (0..self.n_stages()).map(|i| format!("{}{}", self.symbol, i));
  }
}

impl Display for Species {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(f, "{}", self.symbol);
  }
}

/// How the body of a file is laid out.
#[derive(Clone, Debug, PartialEq)]
pub enum Layout {
  /// A single table. The first column is the shared grid (wavelengths or
  /// velocities), then one column per time.
  Flat(DMatrix<f64>),
  /// One table per time, each with the velocity as its first column.
  Blocks(Vec<DMatrix<f64>>),
}

/// A comparison file, ready to be written.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputFile {
  /// What's in the file.
  pub kind: DataKind,
  /// Name of the model, goes into the file name.
  pub model_name: String,
  /// Time since explosion of each input simulation, in days.
  pub times: Vec<f64>,
  /// The species, for ionisation fraction files.
  pub species: Option<Species>,
  /// The comment line describing the columns.
  pub column_description: String,
  /// The body.
  pub layout: Layout,
  /// How body values are printed.
  pub format: FloatFormat,
}

impl OutputFile {
  /// The file name this will be written as.
  pub fn file_name(&self) -> String {
    return match self.species {
      Some(sp) if self.kind == DataKind::Ionfrac => format!(
        "{}_{}_{}_{}", self.kind, sp, self.model_name, FILE_SUFFIX
      ),
      _ => format!("{}_{}_{}", self.kind, self.model_name, FILE_SUFFIX),
    };
  }

  /// The times, space-separated, as in the `#TIMES[d]` header.
  pub fn times_str(&self) -> String {
    return self.times.iter().map(|t| fmt_time(*t)).join(" ");
  }

  /// Number of rows in the body (per block, for block layouts).
  pub fn row_counts(&self) -> Vec<usize> {
    return match &self.layout {
      Layout::Flat(table) => vec![table.nrows()],
      Layout::Blocks(blocks) => blocks.iter().map(|b| b.nrows()).collect(),
    };
  }

  /// Switches the number format.
  pub fn with_format(mut self, format: FloatFormat) -> Self {
    self.format = format;
    return self;
  }

  /// Writes the file into a directory, replacing any previous one. Returns
  /// the path written to.
  pub fn write<P: AsRef<Path>>(&self, dest: P) -> Result<PathBuf, ExportError> {
    let path = dest.as_ref().join(self.file_name());
    let mut out = BufWriter::new(File::create(&path)?);
    self.write_to(&mut out)?;
    out.flush()?;
    info!("Wrote {}.", path.display());
    return Ok(path);
  }

  /// Writes the whole file into any writer.
  pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
    writeln!(out, "#NTIMES: {}", self.times.len())?;
    match &self.layout {
      Layout::Flat(table) => {
        writeln!(
          out,
          "#N{}: {}",
          self.kind.first_column_name(),
          table.nrows()
        )?;
        writeln!(out, "#TIMES[d]: {}", self.times_str())?;
        writeln!(out, "{}", self.column_description)?;
        self.write_table(out, table)?;
      }
      Layout::Blocks(blocks) => {
        if let Some(sp) = self.species {
          writeln!(out, "#NSTAGES: {}", sp.n_stages())?;
        }
        writeln!(out, "#TIMES[d]: {}", self.times_str())?;
        writeln!(out, "#")?;
        for (t, block) in self.times.iter().zip(blocks.iter()) {
          writeln!(out, "#TIME: {}", fmt_time(*t))?;
          writeln!(out, "#NVEL: {}", block.nrows())?;
          writeln!(out, "{}", self.column_description)?;
          self.write_table(out, block)?;
        }
      }
    }
    return Ok(());
  }

  /// Writes a table as space-separated records, no header, no index.
  fn write_table<W: Write>(
    &self,
    out: &mut W,
    table: &DMatrix<f64>,
  ) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
      .delimiter(b' ')
      .has_headers(false)
      .from_writer(&mut *out);
    for row in table.row_iter() {
      wtr.write_record(row.iter().map(|x| self.format.to_string(*x)))?;
    }
    wtr.flush()?;
    return Ok(());
  }
}
