//! This module implements the handful of physical units simulation results
//! come with. Values are stored alongside their unit and only converted when
//! someone asks for a specific one.

use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Seconds in a day.
pub const SECONDS_PER_DAY: f64 = 86400.0;

/// Seconds in an hour.
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// This error is returned when a unit symbol can't be understood.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitError {
  /// What kind of quantity we were trying to get a unit for.
  pub quantity: &'static str,
  /// The offending symbol.
  pub symbol: String,
}

impl Display for UnitError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(f, "unknown {} unit \"{}\"", self.quantity, self.symbol);
  }
}

impl Error for UnitError {}

/// Units of time.
#[derive(
  Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord
)]
#[serde(try_from = "String", into = "String")]
pub enum TimeUnit {
  /// SI seconds.
  Second,
  /// Hours.
  Hour,
  /// Days of 86400 seconds.
  Day,
}

impl TimeUnit {
  /// Returns all the variants.
  pub const fn all() -> &'static [Self] {
    return &[Self::Second, Self::Hour, Self::Day];
  }

  /// Returns the usual symbol for this unit.
  pub const fn symbol(&self) -> &'static str {
    return match self {
      Self::Second => "s",
      Self::Hour => "h",
      Self::Day => "d",
    };
  }

  /// Accepted spellings when parsing.
  const fn aliases(&self) -> &'static [&'static str] {
    return match self {
      Self::Second => &["s", "sec", "second", "seconds"],
      Self::Hour => &["h", "hr", "hour", "hours"],
      Self::Day => &["d", "day", "days"],
    };
  }

  /// How many seconds one of this unit is.
  pub const fn in_seconds(&self) -> f64 {
    return match self {
      Self::Second => 1.0,
      Self::Hour => SECONDS_PER_HOUR,
      Self::Day => SECONDS_PER_DAY,
    };
  }
}

impl Display for TimeUnit {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(f, "{}", self.symbol());
  }
}

impl FromStr for TimeUnit {
  type Err = UnitError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let t = s.trim();
    return Self::all()
      .iter()
      .copied()
      .find(|u| u.aliases().iter().any(|a| t.eq_ignore_ascii_case(a)))
      .ok_or(UnitError { quantity: "time", symbol: s.to_owned() });
  }
}

impl TryFrom<String> for TimeUnit {
  type Error = UnitError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    return value.parse();
  }
}

impl From<TimeUnit> for String {
  fn from(value: TimeUnit) -> Self {
    return value.symbol().to_owned();
  }
}

/// Units of velocity.
#[derive(
  Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord
)]
#[serde(try_from = "String", into = "String")]
pub enum VelocityUnit {
  /// Centimetres per second, what the radiative transfer code uses.
  CmPerS,
  /// Metres per second.
  MPerS,
  /// Kilometres per second, what the comparison files use.
  KmPerS,
}

impl VelocityUnit {
  /// Returns all the variants.
  pub const fn all() -> &'static [Self] {
    return &[Self::CmPerS, Self::MPerS, Self::KmPerS];
  }

  /// Returns the usual symbol for this unit.
  pub const fn symbol(&self) -> &'static str {
    return match self {
      Self::CmPerS => "cm/s",
      Self::MPerS => "m/s",
      Self::KmPerS => "km/s",
    };
  }

  /// Accepted spellings when parsing.
  const fn aliases(&self) -> &'static [&'static str] {
    return match self {
      Self::CmPerS => &["cm/s", "cm s-1", "cm / s"],
      Self::MPerS => &["m/s", "m s-1", "m / s"],
      Self::KmPerS => &["km/s", "km s-1", "km / s"],
    };
  }

  /// How many cm/s one of this unit is.
  pub const fn in_cm_per_s(&self) -> f64 {
    return match self {
      Self::CmPerS => 1.0,
      Self::MPerS => 1e2,
      Self::KmPerS => 1e5,
    };
  }
}

impl Display for VelocityUnit {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(f, "{}", self.symbol());
  }
}

impl FromStr for VelocityUnit {
  type Err = UnitError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let t = s.trim();
    return Self::all()
      .iter()
      .copied()
      .find(|u| u.aliases().iter().any(|a| t.eq_ignore_ascii_case(a)))
      .ok_or(UnitError { quantity: "velocity", symbol: s.to_owned() });
  }
}

impl TryFrom<String> for VelocityUnit {
  type Error = UnitError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    return value.parse();
  }
}

impl From<VelocityUnit> for String {
  fn from(value: VelocityUnit) -> Self {
    return value.symbol().to_owned();
  }
}

/// A time with its unit attached.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Time {
  /// The magnitude.
  pub value: f64,
  /// The unit the magnitude is in.
  pub unit: TimeUnit,
}

impl Time {
  /// Makes a new time.
  pub const fn new(value: f64, unit: TimeUnit) -> Self {
    return Self { value, unit };
  }

  /// Shorthand for a time in days.
  pub const fn days(value: f64) -> Self {
    return Self::new(value, TimeUnit::Day);
  }

  /// Converts into another unit, returning just the magnitude.
  pub fn to(&self, unit: TimeUnit) -> f64 {
    if self.unit == unit {
      return self.value;
    }
    return self.value * self.unit.in_seconds() / unit.in_seconds();
  }

  /// The magnitude in days.
  pub fn in_days(&self) -> f64 {
    return self.to(TimeUnit::Day);
  }
}

impl Display for Time {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(f, "{} {}", self.value, self.unit);
  }
}

/// An array of velocities sharing a unit.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Velocities {
  /// The magnitudes.
  pub values: Vec<f64>,
  /// The unit they're in.
  pub unit: VelocityUnit,
}

impl Velocities {
  /// Makes a new velocity array.
  pub fn new(values: Vec<f64>, unit: VelocityUnit) -> Self {
    return Self { values, unit };
  }

  /// Number of values.
  pub fn len(&self) -> usize {
    return self.values.len();
  }

  /// Are there no values at all?
  pub fn is_empty(&self) -> bool {
    return self.values.is_empty();
  }

  /// Converts every value into another unit.
  pub fn to(&self, unit: VelocityUnit) -> Vec<f64> {
    if self.unit == unit {
      return self.values.clone();
    }
    let (from, to) = (self.unit.in_cm_per_s(), unit.in_cm_per_s());
    return self.values.iter().map(|v| v * from / to).collect();
  }

  /// The magnitudes in km/s.
  pub fn km_per_s(&self) -> Vec<f64> {
    return self.to(VelocityUnit::KmPerS);
  }
}
