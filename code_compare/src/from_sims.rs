//! This module contains the builders that turn a list of finished simulations
//! into comparison files, one builder per kind of file.
//!
//! Everything is built in memory first. Nothing touches the disk until
//! [`OutputFile::write`] is called, so a bad input never leaves half an export
//! behind.

use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::{debug, warn};
use nalgebra::DMatrix;
use sn_results::prelude::*;

use crate::from_sims::quantity_fns::*;
use crate::from_sims::templates::*;
use crate::prelude::*;

pub mod quantity_fns;
pub mod templates;

/// Functions used to pull a per-shell quantity out of a simulation.
pub type QuantityFn = fn(&SimulationResult) -> &[f64];

/// Relative tolerance when checking that two wavelength grids are the same.
pub const WAVELENGTH_RTOL: f64 = 1e-9;

/// Time since explosion of each simulation, in days.
pub fn times_from_simulations(sims: &[SimulationResult]) -> Vec<f64> {
  return sims.iter().map(|s| s.time_explosion_days()).collect();
}

/// The shared velocity grid (km/s) for a set of simulations.
pub fn velocity_grid_from_simulations(
  sims: &[SimulationResult],
) -> Result<Vec<f64>, ExportError> {
  let v_middles = sims
    .iter()
    .map(|s| s.v_middle_km_per_s())
    .collect::<Vec<_>>();
  return velocity_grid(&v_middles);
}

/// Packs equal-length columns into a table.
fn table_from_columns(columns: &[Vec<f64>]) -> DMatrix<f64> {
  let nrows = columns.first().map(|c| c.len()).unwrap_or(0);
  return DMatrix::from_fn(nrows, columns.len(), |r, c| columns[c][r]);
}

/// A template for a file holding one per-shell quantity, resampled onto the
/// shared velocity grid, with one column per simulation.
#[derive(Copy, Clone, Debug)]
pub struct VelocityTemplate {
  /// The kind of file this produces.
  pub kind: DataKind,
  /// Name of the quantity, for error messages.
  pub quantity_name: &'static str,
  /// Pulls the quantity out of a simulation.
  pub quantity: QuantityFn,
}

impl VelocityTemplate {
  /// Builds the file from a list of simulations.
  pub fn from_simulations(
    &self,
    sims: &[SimulationResult],
    model_name: &str,
  ) -> Result<OutputFile, ExportError> {
    let v_middles = sims
      .iter()
      .map(|s| s.v_middle_km_per_s())
      .collect::<Vec<_>>();
    let grid = velocity_grid(&v_middles)?;
    let mut columns = Vec::with_capacity(sims.len() + 1);
    for (i, (sim, v)) in sims.iter().zip(v_middles.iter()).enumerate() {
      let values = (self.quantity)(sim);
      columns.push(resample(&grid, v, values, i, self.quantity_name)?);
    }
    columns.insert(0, grid);
    return Ok(OutputFile {
      kind: self.kind,
      model_name: model_name.to_owned(),
      times: times_from_simulations(sims),
      species: None,
      column_description: self.kind.column_description().to_owned(),
      layout: Layout::Flat(table_from_columns(&columns)),
      format: FloatFormat::default(),
    });
  }
}

/// Do two wavelength grids agree?
fn same_wavelengths(a: &[f64], b: &[f64]) -> bool {
  return a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| {
    (x - y).abs() <= WAVELENGTH_RTOL * x.abs().max(y.abs())
  });
}

/// Builds the spectra file. The wavelength column comes from the first
/// simulation, and every other simulation must share that grid: spectra are
/// not resampled.
pub fn spectra_from_simulations(
  sims: &[SimulationResult],
  model_name: &str,
) -> Result<OutputFile, ExportError> {
  let first = sims.first().ok_or(ExportError::NoSimulations)?;
  let wavelength = &first.spectrum.wavelength;
  if wavelength.is_empty() {
    return Err(ExportError::EmptySpectrum { sim: 0 });
  }
  let mut columns = vec![wavelength.clone()];
  for (i, sim) in sims.iter().enumerate() {
    if !same_wavelengths(wavelength, &sim.spectrum.wavelength) {
      return Err(ExportError::WavelengthMismatch { sim: i });
    }
    let lum = &sim.spectrum.luminosity_density;
    if lum.len() != wavelength.len() {
      return Err(ExportError::LengthMismatch {
        sim: i,
        what: "luminosity_density",
        expected: wavelength.len(),
        got: lum.len(),
      });
    }
    columns.push(lum.clone());
  }
  return Ok(OutputFile {
    kind: DataKind::Spectra,
    model_name: model_name.to_owned(),
    times: times_from_simulations(sims),
    species: None,
    column_description: DataKind::Spectra.column_description().to_owned(),
    layout: Layout::Flat(table_from_columns(&columns)),
    format: FloatFormat::default(),
  });
}

/// Turns an ion number density table (stage by shell) into fractions of the
/// species' total in each shell. Shells where the species is absent get all
/// zeroes. Every stage must have `n_shells` values.
pub fn ion_fractions(
  stages: &[Vec<f64>],
  n_shells: usize,
  sim: usize,
) -> Result<Vec<Vec<f64>>, ExportError> {
  if let Some(bad) = stages.iter().find(|s| s.len() != n_shells) {
    return Err(ExportError::LengthMismatch {
      sim,
      what: "ion_number_densities",
      expected: n_shells,
      got: bad.len(),
    });
  }
  let totals = (0..n_shells)
    .map(|shell| stages.iter().map(|s| s[shell]).sum::<f64>())
    .collect::<Vec<_>>();
  let empty = totals.iter().filter(|t| **t == 0.0).count();
  if empty > 0 {
    warn!(
      "Simulation #{} has {} shell(s) with no ions of the species.",
      sim, empty
    );
  }
  return Ok(stages.iter().map(|stage| {
    stage.iter().zip(totals.iter()).map(|(n, total)| {
      if *total == 0.0 { 0.0 } else { n / total }
    }).collect()
  }).collect());
}

/// Builds the ionisation fraction file for one species. The species is
/// resolved before anything else is looked at.
pub fn ion_fractions_from_simulations(
  sims: &[SimulationResult],
  model_name: &str,
  species: &str,
) -> Result<OutputFile, ExportError> {
  let species = Species::lookup(species)?;
  let v_middles = sims
    .iter()
    .map(|s| s.v_middle_km_per_s())
    .collect::<Vec<_>>();
  let grid = velocity_grid(&v_middles)?;
  let mut blocks = Vec::with_capacity(sims.len());
  for (i, (sim, v)) in sims.iter().zip(v_middles.iter()).enumerate() {
    let table = sim.ion_number_densities(species.z).ok_or(
      ExportError::MissingSpecies { sim: i, species: species.symbol }
    )?;
    if table.len() != species.n_stages() {
      return Err(ExportError::LengthMismatch {
        sim: i,
        what: "ion stages",
        expected: species.n_stages(),
        got: table.len(),
      });
    }
    let mut columns = vec![grid.clone()];
    for stage in ion_fractions(table, v.len(), i)? {
      columns.push(resample(&grid, v, &stage, i, "ion fractions")?);
    }
    blocks.push(table_from_columns(&columns));
  }
  debug!("Built {} {} ion fraction block(s).", blocks.len(), species);
  let column_description = format!(
    "{} {}",
    DataKind::Ionfrac.column_description(),
    species.stage_columns().join(" ")
  );
  return Ok(OutputFile {
    kind: DataKind::Ionfrac,
    model_name: model_name.to_owned(),
    times: times_from_simulations(sims),
    species: Some(species),
    column_description,
    layout: Layout::Blocks(blocks),
    format: FloatFormat::default(),
  });
}

/// The bulk physical properties of one simulation, on its own shells.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicalProfile {
  /// Time since explosion, in days.
  pub time: f64,
  /// Shell middle velocities, in km/s.
  pub v_middle: Vec<f64>,
  /// Gas temperature, in K.
  pub temperature: Vec<f64>,
  /// Mass density, in g/cm^3.
  pub density: Vec<f64>,
  /// Electron number density, in 1/cm^3.
  pub electron_density: Vec<f64>,
  /// Atom number densities, one row per species, one column per shell.
  pub number_densities: DMatrix<f64>,
}

impl PhysicalProfile {
  /// Pulls the profile out of a simulation. `sim` labels errors.
  pub fn from_simulation(
    s: &SimulationResult,
    sim: usize,
  ) -> Result<Self, ExportError> {
    let n = s.n_shells();
    let rows = s.plasma.number_densities.values().collect::<Vec<_>>();
    if let Some(bad) = rows.iter().find(|r| r.len() != n) {
      return Err(ExportError::LengthMismatch {
        sim,
        what: "number_densities",
        expected: n,
        got: bad.len(),
      });
    }
    return Ok(Self {
      time: s.time_explosion_days(),
      v_middle: s.v_middle_km_per_s(),
      temperature: qfn_t_electrons(s).to_vec(),
      density: qfn_density(s).to_vec(),
      electron_density: qfn_electron_densities(s).to_vec(),
      number_densities: DMatrix::from_fn(rows.len(), n, |r, c| rows[r][c]),
    });
  }

  /// Total atom number density in each shell, summed over species.
  pub fn natom(&self) -> Vec<f64> {
    return self.number_densities.column_iter().map(|c| c.sum()).collect();
  }

  /// Lays the profile out as a block: velocity, temperature, density,
  /// electron density, atom density.
  fn to_block(&self, sim: usize) -> Result<DMatrix<f64>, ExportError> {
    let n = self.v_middle.len();
    let natom = self.natom();
    let checks: [(&'static str, usize); 4] = [
      ("temperature", self.temperature.len()),
      ("density", self.density.len()),
      ("electron_density", self.electron_density.len()),
      ("number_densities", natom.len()),
    ];
    for (what, got) in checks {
      if got != n {
        return Err(ExportError::LengthMismatch { sim, what, expected: n, got });
      }
    }
    return Ok(table_from_columns(&[
      self.v_middle.clone(),
      self.temperature.clone(),
      self.density.clone(),
      self.electron_density.clone(),
      natom,
    ]));
  }
}

/// Builds the physical property file from ready-made profiles, one per time.
/// Nothing is resampled; each block keeps its own shells.
pub fn physical_properties_from_profiles(
  profiles: &[PhysicalProfile],
  model_name: &str,
) -> Result<OutputFile, ExportError> {
  if profiles.is_empty() {
    return Err(ExportError::NoSimulations);
  }
  let blocks = profiles
    .iter()
    .enumerate()
    .map(|(i, p)| p.to_block(i))
    .collect::<Result<Vec<_>, _>>()?;
  return Ok(OutputFile {
    kind: DataKind::Phys,
    model_name: model_name.to_owned(),
    times: profiles.iter().map(|p| p.time).collect(),
    species: None,
    column_description: DataKind::Phys.column_description().to_owned(),
    layout: Layout::Blocks(blocks),
    format: FloatFormat::default(),
  });
}

/// Builds the physical property file from a list of simulations.
pub fn physical_properties_from_simulations(
  sims: &[SimulationResult],
  model_name: &str,
) -> Result<OutputFile, ExportError> {
  let profiles = sims
    .iter()
    .enumerate()
    .map(|(i, s)| PhysicalProfile::from_simulation(s, i))
    .collect::<Result<Vec<_>, _>>()?;
  return physical_properties_from_profiles(&profiles, model_name);
}

/// Builds a single file of any kind. `species` only matters for ionisation
/// fraction files.
pub fn build_output(
  kind: DataKind,
  sims: &[SimulationResult],
  model_name: &str,
  species: &str,
) -> Result<OutputFile, ExportError> {
  return match kind {
    DataKind::Spectra => spectra_from_simulations(sims, model_name),
    DataKind::Tgas => VT_TGAS.from_simulations(sims, model_name),
    DataKind::Eden => VT_EDEN.from_simulations(sims, model_name),
    DataKind::Ionfrac => {
      ion_fractions_from_simulations(sims, model_name, species)
    }
    DataKind::Phys => physical_properties_from_simulations(sims, model_name),
  };
}

/// Builds every requested kind of file, with one ionisation fraction file per
/// species. Nothing is written; if any of them fails, none are returned.
pub fn build_outputs<S: AsRef<str>>(
  kinds: &[DataKind],
  sims: &[SimulationResult],
  model_name: &str,
  species: &[S],
) -> Result<Vec<OutputFile>, ExportError> {
  let mut outputs = Vec::new();
  for kind in kinds.iter().copied() {
    if kind == DataKind::Ionfrac {
      for sp in species.iter() {
        outputs.push(build_output(kind, sims, model_name, sp.as_ref())?);
      }
    } else {
      outputs.push(build_output(kind, sims, model_name, "")?);
    }
  }
  return Ok(outputs);
}

/// Builds and writes every kind of file into `dest`. All files are built
/// before the first one is written. Returns the paths written, in order.
pub fn export_all<S: AsRef<str>, P: AsRef<Path>>(
  sims: &[SimulationResult],
  model_name: &str,
  species: &[S],
  dest: P,
) -> Result<Vec<PathBuf>, ExportError> {
  let outputs = build_outputs(DataKind::all(), sims, model_name, species)?;
  return outputs.iter().map(|o| o.write(dest.as_ref())).collect();
}
