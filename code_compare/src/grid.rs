//! This module builds the shared velocity grid all simulations get resampled
//! onto, and does the resampling.
//!
//! The grid spans every input simulation, and its spacing is never coarser
//! than the finest shell spacing found in any of them.

use log::debug;

use crate::errors::ExportError;

/// Value written where a simulation has no shells covering a grid velocity.
pub const NO_COVERAGE: f64 = 1e-99;

/// Returns the smallest gap between successive values, checking on the way
/// that there are at least two of them and that they strictly increase.
/// `sim` is only used to label errors.
pub fn min_spacing(v: &[f64], sim: usize) -> Result<f64, ExportError> {
  if v.len() < 2 {
    return Err(ExportError::TooFewShells { sim, shells: v.len() });
  }
  let mut min_delta = f64::INFINITY;
  for (i, pair) in v.windows(2).enumerate() {
    let delta = pair[1] - pair[0];
    // written this way so NaNs fail too
    if !(delta > 0.0) || !delta.is_finite() {
      return Err(ExportError::NotIncreasing { sim, shell: i + 1 });
    }
    min_delta = min_delta.min(delta);
  }
  return Ok(min_delta);
}

/// `n` evenly spaced values from `start` to `stop`, both included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
  return match n {
    0 => Vec::new(),
    1 => vec![start],
    _ => {
      let step = (stop - start) / (n - 1) as f64;
      let mut values = (0..n)
        .map(|i| start + step * i as f64)
        .collect::<Vec<_>>();
      values[n - 1] = stop;
      values
    }
  };
}

/// Builds the shared grid from each simulation's shell middle velocities.
///
/// The number of points is the span divided by the finest spacing, rounded
/// half-to-even, plus two.
pub fn velocity_grid(v_middles: &[Vec<f64>]) -> Result<Vec<f64>, ExportError> {
  if v_middles.is_empty() {
    return Err(ExportError::NoSimulations);
  }
  let mut min_delta = f64::INFINITY;
  let mut v_min = f64::INFINITY;
  let mut v_max = f64::NEG_INFINITY;
  for (sim, v) in v_middles.iter().enumerate() {
    min_delta = min_delta.min(min_spacing(v, sim)?);
    // increasing, so the ends are the extremes
    v_min = v_min.min(v[0]);
    v_max = v_max.max(v[v.len() - 1]);
  }
  let num_points = ((v_max - v_min) / min_delta).round_ties_even() as usize + 2;
  debug!(
    "Velocity grid: {} points from {} to {} km/s (finest input spacing {}).",
    num_points, v_min, v_max, min_delta
  );
  return Ok(linspace(v_min, v_max, num_points));
}

/// Piecewise-linear interpolation of `(xp, fp)` at each of `x`. Points outside
/// `[xp[0], xp[last]]` get `fill`. Only reached through [`resample`], which
/// checks that `xp` and `fp` have the same length.
pub(crate) fn interp(x: &[f64], xp: &[f64], fp: &[f64], fill: f64) -> Vec<f64> {
  debug_assert_eq!(xp.len(), fp.len());
  if xp.is_empty() {
    return vec![fill; x.len()];
  }
  let last = xp.len() - 1;
  return x.iter().map(|&xi| {
    // negated so NaN falls out as uncovered
    if !(xi >= xp[0] && xi <= xp[last]) {
      return fill;
    }
    let hi = xp.partition_point(|&v| v <= xi);
    if hi > last {
      return fp[last];
    }
    let lo = hi - 1;
    let t = (xi - xp[lo]) / (xp[hi] - xp[lo]);
    return fp[lo] + t * (fp[hi] - fp[lo]);
  }).collect();
}

/// Resamples one simulation's per-shell quantity onto the shared grid, with
/// [`NO_COVERAGE`] outside its own shells. Fails if the quantity doesn't have
/// one value per shell.
pub fn resample(
  grid: &[f64],
  v_middle: &[f64],
  values: &[f64],
  sim: usize,
  what: &'static str,
) -> Result<Vec<f64>, ExportError> {
  if values.len() != v_middle.len() {
    return Err(ExportError::LengthMismatch {
      sim,
      what,
      expected: v_middle.len(),
      got: values.len(),
    });
  }
  return Ok(interp(grid, v_middle, values, NO_COVERAGE));
}
