//! This module implements the number formatting used in comparison files.
//!
//! Body values go out in C-style scientific notation (`%.6E`, which looks like
//! `1.234560E+03`), times go out the way a human would type them.

use std::fmt::Write;

use clap::Args;
use serde::{Deserialize, Serialize};

/// How body values should be formatted.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, Args, PartialEq, Eq)]
pub struct FloatFormat {
  /// Number of decimal places in the mantissa.
  #[arg(long = "decimals", default_value = "6")]
  pub dec_places: usize,
  /// Minimum number of exponent digits (zero-padded).
  #[arg(long = "exp-digits", default_value = "2")]
  pub exp_digits: usize,
  /// Use a small 'e' for exponents instead of a capital 'E'.
  #[arg(long = "small-e", verbatim_doc_comment)]
  pub small_e: bool,
  /// Print a plus sign for non-negative values.
  #[arg(long = "plus", verbatim_doc_comment)]
  pub plus: bool,
}

impl Default for FloatFormat {
  fn default() -> Self {
    return Self {
      dec_places: 6,
      exp_digits: 2,
      small_e: false,
      plus: false,
    };
  }
}

impl FloatFormat {
  /// Writes an f64 into a formatter.
  pub fn fmt_f64<W: Write>(&self, f: &mut W, x: f64) -> std::fmt::Result {
    return fmt_sci(
      f,
      x,
      self.dec_places,
      self.exp_digits,
      !self.small_e,
      self.plus,
    );
  }

  /// Turns an f64 into a string using this format.
  pub fn to_string(&self, x: f64) -> String {
    let mut buf = String::new();
    self.fmt_f64(&mut buf, x)
      .expect("writing into a String returned an error unexpectedly");
    return buf;
  }
}

/// Writes a number in scientific notation with a fixed number of decimals, a
/// signed exponent and zero-padding on the exponent, like C's printf does.
pub fn fmt_sci<W: Write>(
  f: &mut W,
  x: f64,
  decimals: usize,
  exp_digits: usize,
  capital: bool,
  plus: bool,
) -> std::fmt::Result {
  let sign = if plus && x.is_sign_positive() { "+" } else { "" };
  if x.is_nan() {
    return write!(f, "{}", if capital { "NAN" } else { "nan" });
  }
  if x.is_infinite() {
    let s = if x.is_sign_negative() { "-" } else { sign };
    return write!(f, "{}{}", s, if capital { "INF" } else { "inf" });
  }
  let rust_fmt = format!("{:.prec$e}", x, prec = decimals);
  let (mantissa, exponent) = match rust_fmt.split_once('e') {
    Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
    None => (rust_fmt.as_str(), 0),
  };
  return write!(
    f,
    "{}{}{}{}{:0width$}",
    sign,
    mantissa,
    if capital { 'E' } else { 'e' },
    if exponent < 0 { '-' } else { '+' },
    exponent.unsigned_abs(),
    width = exp_digits
  );
}

/// Formats a time for the `#TIMES[d]` and `#TIME` headers: shortest decimal
/// form that reads back to the same value, with a trailing ".0" on whole
/// numbers.
pub fn fmt_time(t: f64) -> String {
  if t.is_finite() && t.fract() == 0.0 && t.abs() < 1e16 {
    return format!("{:.1}", t);
  }
  return format!("{}", t);
}
