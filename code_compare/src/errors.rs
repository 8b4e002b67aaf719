//! Error types for building, writing and reading comparison files.

use std::error::Error;
use std::fmt::Display;
use std::io;

use sn_results::prelude::*;

/// Everything that can stop an export. None of these are recovered from:
/// they're handed straight back to whoever asked for the export.
#[derive(Debug, derive_more::From)]
#[non_exhaustive]
pub enum ExportError {
  /// Couldn't create or write the output file.
  Io(io::Error),
  /// The requested species doesn't exist.
  Nuclide(NuclideError),
  /// No simulations were passed in.
  #[from(ignore)]
  NoSimulations,
  /// A simulation has too few shells to define a velocity spacing.
  #[from(ignore)]
  TooFewShells {
    /// Position of the simulation in the input list.
    sim: usize,
    /// How many shells it has.
    shells: usize,
  },
  /// A simulation's shell velocities aren't strictly increasing.
  #[from(ignore)]
  NotIncreasing {
    /// Position of the simulation in the input list.
    sim: usize,
    /// First shell that isn't faster than the one before it.
    shell: usize,
  },
  /// A per-shell (or per-wavelength) array has the wrong length.
  #[from(ignore)]
  LengthMismatch {
    /// Position of the simulation in the input list.
    sim: usize,
    /// Which array is off.
    what: &'static str,
    /// The length it should have.
    expected: usize,
    /// The length it has.
    got: usize,
  },
  /// A simulation has an empty spectrum.
  #[from(ignore)]
  EmptySpectrum {
    /// Position of the simulation in the input list.
    sim: usize,
  },
  /// A simulation's wavelength grid differs from the first simulation's.
  #[from(ignore)]
  WavelengthMismatch {
    /// Position of the simulation in the input list.
    sim: usize,
  },
  /// A simulation has no ion populations for the requested species.
  #[from(ignore)]
  MissingSpecies {
    /// Position of the simulation in the input list.
    sim: usize,
    /// Symbol of the species.
    species: &'static str,
  },
}

impl Display for ExportError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return match self {
      Self::Io(e) => write!(f, "I/O error: {}", e),
      Self::Nuclide(e) => e.fmt(f),
      Self::NoSimulations => write!(f, "no simulations to export"),
      Self::TooFewShells { sim, shells } => write!(
        f,
        "simulation #{} has {} shell(s), need at least two",
        sim, shells
      ),
      Self::NotIncreasing { sim, shell } => write!(
        f,
        "shell velocities of simulation #{} stop increasing at shell {}",
        sim, shell
      ),
      Self::LengthMismatch { sim, what, expected, got } => write!(
        f,
        "{} of simulation #{} has {} values, expected {}",
        what, sim, got, expected
      ),
      Self::EmptySpectrum { sim } => {
        write!(f, "simulation #{} has an empty spectrum", sim)
      }
      Self::WavelengthMismatch { sim } => write!(
        f,
        "wavelength grid of simulation #{} differs from simulation #0",
        sim
      ),
      Self::MissingSpecies { sim, species } => write!(
        f,
        "simulation #{} has no ion populations for {}",
        sim, species
      ),
    };
  }
}

impl Error for ExportError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    return match self {
      Self::Io(e) => Some(e),
      Self::Nuclide(e) => Some(e),
      _ => None,
    };
  }
}

/// Errors when parsing a comparison file back in.
#[derive(Debug, derive_more::From)]
#[non_exhaustive]
pub enum ReadError {
  /// Couldn't read the file.
  Io(io::Error),
  /// The body couldn't be split into records.
  Csv(csv::Error),
  /// A mandatory header line is absent.
  #[from(ignore)]
  MissingHeader(&'static str),
  /// A header line is there but unreadable.
  #[from(ignore)]
  BadHeader(String),
  /// A field isn't a number.
  #[from(ignore)]
  BadNumber(String),
  /// A count announced in the headers doesn't match the data.
  #[from(ignore)]
  CountMismatch {
    /// What was counted.
    what: &'static str,
    /// What the header says.
    declared: usize,
    /// What was actually there.
    found: usize,
  },
}

impl Display for ReadError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return match self {
      Self::Io(e) => write!(f, "I/O error: {}", e),
      Self::Csv(e) => write!(f, "malformed body: {}", e),
      Self::MissingHeader(h) => write!(f, "missing {} header", h),
      Self::BadHeader(l) => write!(f, "unreadable header line \"{}\"", l),
      Self::BadNumber(s) => write!(f, "\"{}\" is not a number", s),
      Self::CountMismatch { what, declared, found } => write!(
        f,
        "header declares {} {} but found {}",
        declared, what, found
      ),
    };
  }
}

impl Error for ReadError {}
