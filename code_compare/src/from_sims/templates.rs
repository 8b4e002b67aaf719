//! This submodule implements templates for the files that hold one per-shell
//! quantity resampled onto the shared velocity grid.

use crate::prelude::*;
use crate::from_sims::quantity_fns::*;

/// Template for the gas temperature file.
pub const VT_TGAS: VelocityTemplate = VelocityTemplate {
  kind: DataKind::Tgas,
  quantity_name: "t_electrons",
  quantity: qfn_t_electrons,
};

/// Template for the electron density file.
pub const VT_EDEN: VelocityTemplate = VelocityTemplate {
  kind: DataKind::Eden,
  quantity_name: "electron_densities",
  quantity: qfn_electron_densities,
};
