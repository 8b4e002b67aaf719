//! This library implements the data model for finished runs of a supernova
//! radiative transfer code: the ejecta model, the per-shell plasma state and
//! the integrated spectrum, plus the physical units they come in.
//!
//! It exists so the code comparison exporters have something typed to read
//! from. Runs are normally dumped to JSON by the simulation and loaded here.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![allow(clippy::needless_return)]

pub mod nuclides;
pub mod simulation;
pub mod units;


/// Imports the most relevant exports from the library.
pub mod prelude {
  pub use crate::nuclides::*;
  pub use crate::simulation::*;
  pub use crate::units::*;
}
