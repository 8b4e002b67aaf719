//! Element symbol lookup. Only what the exporters need: going from a species
//! symbol to its atomic number and back.

use std::error::Error;
use std::fmt::Display;

/// Element symbols, indexed by atomic number minus one.
const SYMBOLS: [&str; 118] = [
  "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne",
  "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca",
  "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
  "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr",
  "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
  "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd",
  "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
  "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
  "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th",
  "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm",
  "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds",
  "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Highest atomic number we know about.
pub const MAX_ATOMIC_NUMBER: u8 = SYMBOLS.len() as u8;

/// Errors from looking up nuclides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NuclideError {
  /// No element has this symbol.
  UnknownSymbol(String),
  /// No element has this atomic number.
  UnknownAtomicNumber(u8),
}

impl Display for NuclideError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return match self {
      Self::UnknownSymbol(s) => write!(f, "unknown element symbol \"{}\"", s),
      Self::UnknownAtomicNumber(z) => write!(f, "no element with Z = {}", z),
    };
  }
}

impl Error for NuclideError {}

/// Gets the atomic number for an element symbol. Case doesn't matter, so
/// "Ca", "ca" and "CA" are all calcium.
pub fn atomic_number(symbol: &str) -> Result<u8, NuclideError> {
  let s = symbol.trim();
  return SYMBOLS
    .iter()
    .position(|k| k.eq_ignore_ascii_case(s))
    .map(|i| (i + 1) as u8)
    .ok_or(NuclideError::UnknownSymbol(symbol.to_owned()));
}

/// Gets the canonical symbol for an atomic number.
pub fn symbol(z: u8) -> Result<&'static str, NuclideError> {
  if z == 0 || z > MAX_ATOMIC_NUMBER {
    return Err(NuclideError::UnknownAtomicNumber(z));
  }
  return Ok(SYMBOLS[usize::from(z) - 1]);
}

/// Normalises a symbol into its canonical spelling ("ca" -> "Ca").
pub fn canonical_symbol(symbol: &str) -> Result<&'static str, NuclideError> {
  return self::symbol(atomic_number(symbol)?);
}
