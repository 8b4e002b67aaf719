//! This module implements job files: TOML files that say which simulation
//! dumps to export, under which model name, and where to.
//!
//! ```toml
//! model = "w7"
//! dest = "out"
//! species = ["Ca", "Si"]
//! kinds = ["spectra", "tgas", "ionfrac"]
//! simulations = ["runs/day10.json", "runs/day15.json"]
//! ```

use std::error::Error;
use std::path::{Path, PathBuf};

use code_compare::prelude::*;
use serde::{Deserialize, Serialize};

/// For inputs that can take a single value or a list of them.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
  /// A single value.
  One(T),
  /// A list of values.
  Many(Vec<T>),
}

impl<T> Default for OneOrMany<T> {
  fn default() -> Self {
    return Self::Many(Vec::new());
  }
}

impl<T> From<OneOrMany<T>> for Vec<T> {
  fn from(value: OneOrMany<T>) -> Self {
    return match value {
      OneOrMany::One(x) => vec![x],
      OneOrMany::Many(v) => v,
    };
  }
}

/// An export job, as read from a file.
#[derive(Default, Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct Job {
  /// Model name, goes into every file name.
  pub(crate) model: Option<String>,
  /// Directory to write files into.
  pub(crate) dest: Option<PathBuf>,
  /// Species for ionisation fraction files.
  pub(crate) species: OneOrMany<String>,
  /// Kinds of files to write. All of them if empty.
  #[serde(alias = "kind")]
  pub(crate) kinds: OneOrMany<DataKind>,
  /// Simulation dumps, in time order.
  #[serde(alias = "simulation")]
  pub(crate) simulations: Vec<PathBuf>,
}

impl Job {
  /// Parses a job from TOML text. Relative paths are taken relative to
  /// `base`.
  pub(crate) fn from_toml_str(
    contents: &str,
    base: &Path,
  ) -> Result<Self, Box<dyn Error>> {
    let mut job: Job = toml::from_str(contents)?;
    job.dest = job.dest.map(|d| base.join(d));
    job.simulations = job.simulations
      .into_iter()
      .map(|s| base.join(s))
      .collect();
    return Ok(job);
  }

  /// Reads a job file.
  pub(crate) fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let base = path.as_ref().parent().unwrap_or(Path::new("."));
    return Self::from_toml_str(&contents, base);
  }
}
