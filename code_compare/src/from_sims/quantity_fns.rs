//! Contains the functions that pull a per-shell quantity out of a simulation.

use sn_results::prelude::*;

/// Electron (gas) temperature in each shell.
pub fn qfn_t_electrons(sim: &SimulationResult) -> &[f64] {
  return &sim.plasma.t_electrons;
}

/// Electron number density in each shell.
pub fn qfn_electron_densities(sim: &SimulationResult) -> &[f64] {
  return &sim.plasma.electron_densities;
}

/// Mass density in each shell.
pub fn qfn_density(sim: &SimulationResult) -> &[f64] {
  return &sim.model.density;
}
