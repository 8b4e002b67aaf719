//! This library turns finished supernova radiative transfer runs into the
//! fixed-format text files used to compare results between codes.
//!
//! Shell quantities from every run are resampled onto one shared velocity
//! grid, then written as space-separated tables with descriptive headers.
//! Spectra keep their own wavelength grid.

#![allow(clippy::needless_return)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

pub mod errors;
pub mod formatting;
pub mod from_sims;
pub mod grid;
pub mod layout;
pub mod reading;

#[cfg(test)]
mod tests;

/// Imports the most relevant exports from the library.
pub mod prelude {
  pub use super::errors::*;
  pub use super::formatting::*;
  pub use super::from_sims::*;
  pub use super::grid::*;
  pub use super::layout::*;
  pub use super::reading::*;
}
