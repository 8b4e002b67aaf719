//! This module implements the in-memory form of a finished simulation run: the
//! ejecta model, the plasma state in each shell, and the emergent spectrum.
//!
//! A run is usually dumped to JSON by the radiative transfer code and loaded
//! back here. Per-element tables are keyed by atomic number.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::units::*;

/// The ejecta model at the time the run finished.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Model {
  /// Time since explosion.
  pub time_explosion: Time,
  /// Velocity at the middle of each shell.
  pub v_middle: Velocities,
  /// Mass density in each shell, in g/cm^3.
  pub density: Vec<f64>,
}

/// The plasma state in each shell.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Plasma {
  /// Electron temperature, in K.
  pub t_electrons: Vec<f64>,
  /// Electron number density, in 1/cm^3.
  pub electron_densities: Vec<f64>,
  /// Atom number densities (1/cm^3). Outer key is the atomic number, inner
  /// vector goes over shells.
  #[serde(default)]
  pub number_densities: BTreeMap<u8, Vec<f64>>,
  /// Ion number densities (1/cm^3). Outer key is the atomic number, then
  /// ionisation stage (0 is neutral), then shell.
  #[serde(default)]
  pub ion_number_densities: BTreeMap<u8, Vec<Vec<f64>>>,
}

/// The integrated emergent spectrum.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Spectrum {
  /// Wavelength bins, in Angstrom.
  pub wavelength: Vec<f64>,
  /// Luminosity density at each wavelength, in erg/s/Angstrom.
  pub luminosity_density: Vec<f64>,
}

/// A finished simulation run.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SimulationResult {
  /// The ejecta model.
  pub model: Model,
  /// The plasma state.
  pub plasma: Plasma,
  /// The integrated spectrum.
  pub spectrum: Spectrum,
}

/// Describes the first inconsistency found in a simulation result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShapeError {
  /// There are no shells at all.
  NoShells,
  /// A per-shell array doesn't have one value per shell.
  WrongShellCount {
    /// Name of the array.
    what: String,
    /// Number of shells.
    expected: usize,
    /// Length of the array.
    got: usize,
  },
  /// An ion table doesn't have Z+1 stages.
  WrongStageCount {
    /// Atomic number of the table.
    z: u8,
    /// Number of stages found.
    got: usize,
  },
  /// The spectrum has no wavelengths.
  EmptySpectrum,
  /// The spectrum arrays differ in length.
  SpectrumLength {
    /// Number of wavelengths.
    wavelengths: usize,
    /// Number of luminosity densities.
    luminosities: usize,
  },
}

impl Display for ShapeError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return match self {
      Self::NoShells => write!(f, "model has no shells"),
      Self::WrongShellCount { what, expected, got } => write!(
        f,
        "{} has {} values but the model has {} shells",
        what, got, expected
      ),
      Self::WrongStageCount { z, got } => write!(
        f,
        "ion table for Z = {} has {} stages (expected {})",
        z, got, usize::from(*z) + 1
      ),
      Self::EmptySpectrum => write!(f, "spectrum is empty"),
      Self::SpectrumLength { wavelengths, luminosities } => write!(
        f,
        "spectrum has {} wavelengths but {} luminosity densities",
        wavelengths, luminosities
      ),
    };
  }
}

impl Error for ShapeError {}

/// Things that can go wrong when loading a simulation dump.
#[derive(Debug, derive_more::From)]
pub enum LoadError {
  /// Couldn't read the file.
  Io(io::Error),
  /// The JSON was malformed or had an unknown unit.
  Json(serde_json::Error),
  /// The data was read fine but is inconsistent.
  Shape(ShapeError),
}

impl Display for LoadError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return match self {
      Self::Io(e) => write!(f, "I/O error: {}", e),
      Self::Json(e) => write!(f, "bad simulation dump: {}", e),
      Self::Shape(e) => write!(f, "inconsistent simulation: {}", e),
    };
  }
}

impl Error for LoadError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    return match self {
      Self::Io(e) => Some(e),
      Self::Json(e) => Some(e),
      Self::Shape(e) => Some(e),
    };
  }
}

impl SimulationResult {
  /// Parses a simulation dump from a JSON string and validates it.
  pub fn from_json_str(s: &str) -> Result<Self, LoadError> {
    let sim: Self = serde_json::from_str(s)?;
    sim.validate()?;
    return Ok(sim);
  }

  /// Reads a simulation dump from a JSON file and validates it.
  pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
    let file = File::open(path.as_ref())?;
    let sim: Self = serde_json::from_reader(BufReader::new(file))?;
    sim.validate()?;
    debug!(
      "Loaded {} ({} shells, t = {}).",
      path.as_ref().display(),
      sim.n_shells(),
      sim.model.time_explosion
    );
    return Ok(sim);
  }

  /// Number of shells in the model.
  pub fn n_shells(&self) -> usize {
    return self.model.v_middle.len();
  }

  /// Time since explosion, in days.
  pub fn time_explosion_days(&self) -> f64 {
    return self.model.time_explosion.in_days();
  }

  /// Shell middle velocities, in km/s.
  pub fn v_middle_km_per_s(&self) -> Vec<f64> {
    return self.model.v_middle.km_per_s();
  }

  /// The ion number density table for an element, stage by shell.
  pub fn ion_number_densities(&self, z: u8) -> Option<&Vec<Vec<f64>>> {
    return self.plasma.ion_number_densities.get(&z);
  }

  /// Checks that every per-shell array agrees with the number of shells,
  /// that ion tables have one row per stage, and that the spectrum is
  /// there and its arrays line up.
  pub fn validate(&self) -> Result<(), ShapeError> {
    let n = self.n_shells();
    if n == 0 {
      return Err(ShapeError::NoShells);
    }
    let check = |what: &str, got: usize| -> Result<(), ShapeError> {
      if got != n {
        return Err(ShapeError::WrongShellCount {
          what: what.to_owned(),
          expected: n,
          got,
        });
      }
      return Ok(());
    };
    check("density", self.model.density.len())?;
    check("t_electrons", self.plasma.t_electrons.len())?;
    check("electron_densities", self.plasma.electron_densities.len())?;
    for (z, nd) in self.plasma.number_densities.iter() {
      check(&format!("number_densities[{}]", z), nd.len())?;
    }
    for (z, table) in self.plasma.ion_number_densities.iter() {
      if table.len() != usize::from(*z) + 1 {
        return Err(ShapeError::WrongStageCount { z: *z, got: table.len() });
      }
      for (stage, row) in table.iter().enumerate() {
        check(&format!("ion_number_densities[{}][{}]", z, stage), row.len())?;
      }
    }
    let spectrum = &self.spectrum;
    if spectrum.wavelength.is_empty() {
      return Err(ShapeError::EmptySpectrum);
    }
    if spectrum.wavelength.len() != spectrum.luminosity_density.len() {
      return Err(ShapeError::SpectrumLength {
        wavelengths: spectrum.wavelength.len(),
        luminosities: spectrum.luminosity_density.len(),
      });
    }
    return Ok(());
  }
}
