use std::collections::BTreeMap;

use sn_results::prelude::*;

use crate::from_sims::templates::*;
use crate::grid::interp;
use crate::prelude::*;

/// Makes a consistent simulation with calcium split 3:1 between its first two
/// ionised stages and two species for the atom density.
fn make_sim(days: f64, v_kms: &[f64], t: &[f64]) -> SimulationResult {
  let n = v_kms.len();
  let ca = (0..21)
    .map(|stage| match stage {
      1 => vec![3.0; n],
      2 => vec![1.0; n],
      _ => vec![0.0; n],
    })
    .collect::<Vec<_>>();
  let mut ion_number_densities = BTreeMap::new();
  ion_number_densities.insert(20u8, ca);
  let mut number_densities = BTreeMap::new();
  number_densities.insert(20u8, vec![4.0; n]);
  number_densities.insert(26u8, (0..n).map(|i| i as f64).collect());
  return SimulationResult {
    model: Model {
      time_explosion: Time::days(days),
      v_middle: Velocities::new(v_kms.to_vec(), VelocityUnit::KmPerS),
      density: vec![1e-13; n],
    },
    plasma: Plasma {
      t_electrons: t.to_vec(),
      electron_densities: t.iter().map(|x| x * 1e4).collect(),
      number_densities,
      ion_number_densities,
    },
    spectrum: Spectrum {
      wavelength: vec![3000.0, 4000.0, 5000.0],
      luminosity_density: vec![1e38 * days, 2.5e38, 3.3333333e38],
    },
  };
}

/// The two runs used by most tests.
fn two_sims() -> Vec<SimulationResult> {
  return vec![
    make_sim(10.0, &[1000.0, 2000.0], &[10000.0, 8000.0]),
    make_sim(12.5, &[1000.0, 2000.0, 3000.0], &[9000.0, 7000.0, 5000.0]),
  ];
}

/// Asserts two numbers agree to a relative tolerance.
fn assert_close(a: f64, b: f64, rtol: f64) {
  assert!(
    (a - b).abs() <= rtol * a.abs().max(b.abs()),
    "{} and {} differ by more than {}",
    a, b, rtol
  );
}

#[test]
fn test_fmt_sci() {
  let f = FloatFormat::default();
  assert_eq!(f.to_string(1234.56), "1.234560E+03");
  assert_eq!(f.to_string(-0.5), "-5.000000E-01");
  assert_eq!(f.to_string(NO_COVERAGE), "1.000000E-99");
  assert_eq!(f.to_string(0.0), "0.000000E+00");
  assert_eq!(f.to_string(1e100), "1.000000E+100");
  assert_eq!(f.to_string(f64::NAN), "NAN");
  assert_eq!(f.to_string(f64::NEG_INFINITY), "-INF");
  let g = FloatFormat { dec_places: 3, exp_digits: 3, small_e: true, plus: true };
  assert_eq!(g.to_string(12.0), "+1.200e+001");
  assert_eq!(g.to_string(-0.012), "-1.200e-002");
}

#[test]
fn test_fmt_time() {
  assert_eq!(fmt_time(10.0), "10.0");
  assert_eq!(fmt_time(12.5), "12.5");
  assert_eq!(fmt_time(0.1 + 0.2), "0.30000000000000004");
}

#[test]
fn test_grid_properties() {
  let sets: Vec<Vec<Vec<f64>>> = vec![
    vec![vec![1000.0, 2000.0, 3000.0]],
    vec![vec![1000.0, 2000.0, 3000.0], vec![1500.0, 2500.0, 3500.0, 4500.0]],
    vec![vec![5000.0, 5100.0, 5300.0, 6000.0], vec![4000.0, 9000.0]],
    vec![vec![0.0, 0.3, 0.7], vec![10.0, 10.25], vec![-3.0, 1.0, 4.0]],
    vec![vec![11000.0, 11000.5]],
  ];
  for vs in sets.iter() {
    let grid = velocity_grid(vs).unwrap();
    let min_delta = vs
      .iter()
      .map(|v| min_spacing(v, 0).unwrap())
      .fold(f64::INFINITY, f64::min);
    let v_min = vs.iter().map(|v| v[0]).fold(f64::INFINITY, f64::min);
    let v_max = vs
      .iter()
      .map(|v| v[v.len() - 1])
      .fold(f64::NEG_INFINITY, f64::max);
    assert!(grid.len() >= 2);
    assert!(grid.windows(2).all(|w| w[1] > w[0]));
    assert_eq!(grid[0], v_min);
    assert_eq!(grid[grid.len() - 1], v_max);
    assert!((v_max - v_min) / (grid.len() - 1) as f64 <= min_delta);
  }
}

#[test]
fn test_grid_scenario() {
  let grid = velocity_grid(&[
    vec![1000.0, 2000.0, 3000.0],
    vec![1500.0, 2500.0, 3500.0, 4500.0],
  ]).unwrap();
  // 3500 / 1000 rounds (half to even) to 4, plus two
  assert_eq!(grid.len(), 6);
  assert_eq!(grid[0], 1000.0);
  assert_eq!(grid[5], 4500.0);
  assert_close(grid[1] - grid[0], 700.0, 1e-12);
}

#[test]
fn test_grid_errors() {
  assert!(matches!(velocity_grid(&[]), Err(ExportError::NoSimulations)));
  assert!(matches!(
    velocity_grid(&[vec![1.0, 2.0], vec![3.0]]),
    Err(ExportError::TooFewShells { sim: 1, shells: 1 })
  ));
  assert!(matches!(
    velocity_grid(&[vec![1.0, 2.0, 2.0]]),
    Err(ExportError::NotIncreasing { sim: 0, shell: 2 })
  ));
  assert!(matches!(
    velocity_grid(&[vec![1.0, f64::NAN]]),
    Err(ExportError::NotIncreasing { .. })
  ));
}

#[test]
fn test_interp() {
  let xp = [1.0, 2.0, 4.0];
  let fp = [10.0, 20.0, 0.0];
  let got = interp(&[0.5, 1.0, 1.5, 2.0, 3.0, 4.0, 4.5], &xp, &fp, NO_COVERAGE);
  assert_eq!(got, vec![NO_COVERAGE, 10.0, 15.0, 20.0, 10.0, 0.0, NO_COVERAGE]);
  assert_eq!(interp(&[f64::NAN], &xp, &fp, -1.0), vec![-1.0]);
  assert!(matches!(
    resample(&[1.0], &xp, &fp[..2], 3, "t_electrons"),
    Err(ExportError::LengthMismatch { sim: 3, expected: 3, got: 2, .. })
  ));
  // too many values is just as wrong as too few
  assert!(matches!(
    resample(&[1.0], &xp, &[1.0, 2.0, 3.0, 4.0], 0, "t_electrons"),
    Err(ExportError::LengthMismatch { expected: 3, got: 4, .. })
  ));
}

#[test]
fn test_tgas_exact_output() {
  let file = VT_TGAS.from_simulations(&two_sims(), "toy").unwrap();
  assert_eq!(file.file_name(), "tgas_toy_tardis.txt");
  let mut buf: Vec<u8> = Vec::new();
  file.write_to(&mut buf).unwrap();
  let expected = concat!(
    "#NTIMES: 2\n",
    "#NVEL: 4\n",
    "#TIMES[d]: 10.0 12.5\n",
    "#vel_mid[km/s] Tgas_t0[K] Tgas_t1[K] ... Tgas_tn[K]\n",
    "1.000000E+03 1.000000E+04 9.000000E+03\n",
    "1.666667E+03 8.666667E+03 7.666667E+03\n",
    "2.333333E+03 1.000000E-99 6.333333E+03\n",
    "3.000000E+03 1.000000E-99 5.000000E+03\n",
  );
  assert_eq!(String::from_utf8(buf).unwrap(), expected);
}

#[test]
fn test_eden_sentinel_on_disjoint_ranges() {
  let sims = vec![
    make_sim(5.0, &[1000.0, 1500.0], &[1.0, 2.0]),
    make_sim(6.0, &[4000.0, 4500.0, 5000.0], &[3.0, 4.0, 5.0]),
  ];
  let file = VT_EDEN.from_simulations(&sims, "gap").unwrap();
  let table = match &file.layout {
    Layout::Flat(t) => t.clone(),
    _ => panic!("eden should be flat"),
  };
  assert_eq!(table.ncols(), 3);
  assert_eq!(table[(0, 0)], 1000.0);
  assert_eq!(table[(table.nrows() - 1, 0)], 5000.0);
  for r in 0..table.nrows() {
    let v = table[(r, 0)];
    if v > 1500.0 {
      assert_eq!(table[(r, 1)], NO_COVERAGE);
    }
    if v < 4000.0 {
      assert_eq!(table[(r, 2)], NO_COVERAGE);
    } else {
      assert!(table[(r, 2)] >= 3e4);
    }
  }
}

#[test]
fn test_quantity_length_mismatch() {
  let mut sims = two_sims();
  sims[1].plasma.t_electrons.pop();
  assert!(matches!(
    VT_TGAS.from_simulations(&sims, "bad"),
    Err(ExportError::LengthMismatch { sim: 1, what: "t_electrons", .. })
  ));
}

#[test]
fn test_spectra_round_trip() {
  let sims = two_sims();
  let dir = tempfile::tempdir().unwrap();
  let file = spectra_from_simulations(&sims, "toy").unwrap();
  let path = file.write(dir.path()).unwrap();
  assert_eq!(path, dir.path().join("spectra_toy_tardis.txt"));
  let read = FlatFile::read(&path).unwrap();
  assert_eq!(read.first_column_name, "WAVE");
  assert_eq!(read.times, vec![10.0, 12.5]);
  assert_eq!(read.column_description, DataKind::Spectra.column_description());
  assert_eq!(read.first_column(), sims[0].spectrum.wavelength);
  for (i, sim) in sims.iter().enumerate() {
    let col = read.time_column(i).unwrap();
    let lum = &sim.spectrum.luminosity_density;
    assert_eq!(col.len(), lum.len());
    for (a, b) in col.iter().zip(lum.iter()) {
      assert_close(*a, *b, 1e-6);
    }
  }
  assert!(read.time_column(2).is_none());
}

#[test]
fn test_spectra_wavelength_mismatch() {
  let mut sims = two_sims();
  sims[1].spectrum.wavelength[1] = 4001.0;
  assert!(matches!(
    spectra_from_simulations(&sims, "x"),
    Err(ExportError::WavelengthMismatch { sim: 1 })
  ));
  let mut sims = two_sims();
  sims[0].spectrum = Spectrum::default();
  assert!(matches!(
    spectra_from_simulations(&sims, "x"),
    Err(ExportError::EmptySpectrum { sim: 0 })
  ));
  assert!(matches!(
    spectra_from_simulations(&[], "x"),
    Err(ExportError::NoSimulations)
  ));
}

#[test]
fn test_ionfrac() {
  let sims = two_sims();
  let file = ion_fractions_from_simulations(&sims, "toy", "ca").unwrap();
  assert_eq!(file.file_name(), "ionfrac_Ca_toy_tardis.txt");
  let mut buf: Vec<u8> = Vec::new();
  file.write_to(&mut buf).unwrap();
  let text = String::from_utf8(buf).unwrap();
  let lines = text.lines().collect::<Vec<_>>();
  assert_eq!(lines[0], "#NTIMES: 2");
  assert_eq!(lines[1], "#NSTAGES: 21");
  assert_eq!(lines[2], "#TIMES[d]: 10.0 12.5");
  assert_eq!(lines[3], "#");
  assert_eq!(lines[4], "#TIME: 10.0");
  assert_eq!(lines[5], "#NVEL: 4");
  // velocity plus Ca0..Ca20
  let header = lines[6].split_whitespace().collect::<Vec<_>>();
  assert_eq!(header.len(), 20 + 1 + 1);
  assert_eq!(header[0], "#vel_mid[km/s]");
  assert_eq!(header[1], "Ca0");
  assert_eq!(header[21], "Ca20");
  assert_eq!(text.matches("#TIME: ").count(), 2);
  assert_eq!(text.matches(lines[6]).count(), 2);
  let blocks = match &file.layout {
    Layout::Blocks(b) => b.clone(),
    _ => panic!("ionfrac should be in blocks"),
  };
  assert_eq!(blocks.len(), 2);
  for block in blocks.iter() {
    assert_eq!(block.ncols(), 22);
    assert_eq!(block.nrows(), 4);
  }
  // first run only covers the first two grid points
  assert_close(blocks[0][(1, 2)], 0.75, 1e-12);
  assert_close(blocks[0][(1, 3)], 0.25, 1e-12);
  assert_eq!(blocks[0][(1, 1)], 0.0);
  assert_eq!(blocks[0][(3, 2)], NO_COVERAGE);
  assert_close(blocks[1][(3, 2)], 0.75, 1e-12);
}

#[test]
fn test_ion_fractions_empty_shell() {
  let stages = vec![vec![1.0, 0.0], vec![3.0, 0.0]];
  let fr = ion_fractions(&stages, 2, 0).unwrap();
  assert_eq!(fr, vec![vec![0.25, 0.0], vec![0.75, 0.0]]);
}

#[test]
fn test_ion_fractions_ragged_stages() {
  let ragged = vec![vec![1.0, 2.0], vec![3.0]];
  assert!(matches!(
    ion_fractions(&ragged, 2, 4),
    Err(ExportError::LengthMismatch {
      sim: 4,
      what: "ion_number_densities",
      expected: 2,
      got: 1
    })
  ));
  // first stage shorter than the rest
  let ragged = vec![vec![1.0], vec![3.0, 4.0]];
  assert!(ion_fractions(&ragged, 2, 0).is_err());
  // the same table coming from a simulation
  let mut sims = two_sims();
  sims[1].plasma.ion_number_densities.get_mut(&20).unwrap()[5].pop();
  assert!(matches!(
    ion_fractions_from_simulations(&sims, "toy", "Ca"),
    Err(ExportError::LengthMismatch { sim: 1, expected: 3, got: 2, .. })
  ));
}

#[test]
fn test_ionfrac_missing_species() {
  let sims = two_sims();
  assert!(matches!(
    ion_fractions_from_simulations(&sims, "toy", "Fe"),
    Err(ExportError::MissingSpecies { sim: 0, species: "Fe" })
  ));
  assert!(matches!(
    ion_fractions_from_simulations(&sims, "toy", "Qq"),
    Err(ExportError::Nuclide(NuclideError::UnknownSymbol(_)))
  ));
}

#[test]
fn test_unknown_species_writes_nothing() {
  let dir = tempfile::tempdir().unwrap();
  let res = export_all(&two_sims(), "toy", &["Ca", "Zz"], dir.path());
  assert!(matches!(res, Err(ExportError::Nuclide(_))));
  assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_export_all() {
  let dir = tempfile::tempdir().unwrap();
  let paths = export_all(&two_sims(), "toy", &["Ca"], dir.path()).unwrap();
  let names = paths
    .iter()
    .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
    .collect::<Vec<_>>();
  assert_eq!(names, vec![
    "spectra_toy_tardis.txt",
    "tgas_toy_tardis.txt",
    "eden_toy_tardis.txt",
    "ionfrac_Ca_toy_tardis.txt",
    "phys_toy_tardis.txt",
  ]);
  for p in paths.iter() {
    assert!(p.is_file());
  }
  // the flat ones read back
  let eden = FlatFile::read(&paths[2]).unwrap();
  assert_eq!(eden.first_column_name, "VEL");
  assert_eq!(eden.table.nrows(), 4);
  assert_eq!(eden.table.ncols(), 3);
  assert_close(eden.table[(0, 1)], 1e8, 1e-6);
}

#[test]
fn test_phys() {
  let file = physical_properties_from_simulations(&two_sims(), "toy").unwrap();
  assert_eq!(file.file_name(), "phys_toy_tardis.txt");
  // each block keeps its own shells
  assert_eq!(file.row_counts(), vec![2, 3]);
  let mut buf: Vec<u8> = Vec::new();
  file.write_to(&mut buf).unwrap();
  let text = String::from_utf8(buf).unwrap();
  let expected_start = concat!(
    "#NTIMES: 2\n",
    "#TIMES[d]: 10.0 12.5\n",
    "#\n",
    "#TIME: 10.0\n",
    "#NVEL: 2\n",
    "#vel_mid[km/s] temp[K] rho[gcc] ne[/cm^3] natom[/cm^3]\n",
    "1.000000E+03 1.000000E+04 1.000000E-13 1.000000E+08 4.000000E+00\n",
    "2.000000E+03 8.000000E+03 1.000000E-13 8.000000E+07 5.000000E+00\n",
    "#TIME: 12.5\n",
    "#NVEL: 3\n",
  );
  assert!(text.starts_with(expected_start), "got:\n{}", text);
  assert!(!text.contains("NSTAGES"));
  assert!(text.ends_with("3.000000E+03 5.000000E+03 1.000000E-13 5.000000E+07 6.000000E+00\n"));
}

#[test]
fn test_phys_from_profiles() {
  let profile = PhysicalProfile {
    time: 3.0,
    v_middle: vec![100.0, 200.0],
    temperature: vec![1.0, 2.0],
    density: vec![3.0, 4.0],
    electron_density: vec![5.0, 6.0],
    number_densities: nalgebra::DMatrix::from_row_slice(2, 2, &[
      1.0, 2.0,
      10.0, 20.0,
    ]),
  };
  assert_eq!(profile.natom(), vec![11.0, 22.0]);
  let file = physical_properties_from_profiles(&[profile.clone()], "p").unwrap();
  assert_eq!(file.times, vec![3.0]);
  let mut short = profile;
  short.density.pop();
  assert!(matches!(
    physical_properties_from_profiles(&[short], "p"),
    Err(ExportError::LengthMismatch { sim: 0, what: "density", .. })
  ));
  assert!(matches!(
    physical_properties_from_profiles(&[], "p"),
    Err(ExportError::NoSimulations)
  ));
}

#[test]
fn test_write_to_missing_directory() {
  let dir = tempfile::tempdir().unwrap();
  let file = VT_TGAS.from_simulations(&two_sims(), "toy").unwrap();
  let res = file.write(dir.path().join("does").join("not").join("exist"));
  assert!(matches!(res, Err(ExportError::Io(_))));
}

#[test]
fn test_read_errors() {
  let good = concat!(
    "#NTIMES: 1\n",
    "#NVEL: 2\n",
    "#TIMES[d]: 4.0\n",
    "#vel_mid[km/s] Tgas_t0[K] Tgas_t1[K] ... Tgas_tn[K]\n",
    "1.000000E+03 2.000000E+00\n",
    "2.000000E+03 3.000000E+00\n",
  );
  let parsed = FlatFile::parse(good).unwrap();
  assert_eq!(parsed.first_column(), vec![1000.0, 2000.0]);
  assert_eq!(parsed.time_column(0), Some(vec![2.0, 3.0]));
  let short = good.replace("#NVEL: 2", "#NVEL: 3");
  assert!(matches!(
    FlatFile::parse(&short),
    Err(ReadError::CountMismatch { what: "rows", declared: 3, found: 2 })
  ));
  let no_times = good.replace("#TIMES[d]: 4.0\n", "");
  assert!(matches!(
    FlatFile::parse(&no_times),
    Err(ReadError::MissingHeader(_))
  ));
  let garbage = good.replace("3.000000E+00", "three");
  assert!(matches!(FlatFile::parse(&garbage), Err(ReadError::BadNumber(_))));
}

#[test]
fn test_build_outputs_per_species() {
  let mut sims = two_sims();
  for s in sims.iter_mut() {
    let n = s.n_shells();
    s.plasma.ion_number_densities.insert(1, vec![vec![1.0; n], vec![1.0; n]]);
  }
  let outputs = build_outputs(&[DataKind::Ionfrac], &sims, "m", &["Ca", "H"])
    .unwrap();
  let names = outputs.iter().map(|o| o.file_name()).collect::<Vec<_>>();
  assert_eq!(names, vec!["ionfrac_Ca_m_tardis.txt", "ionfrac_H_m_tardis.txt"]);
  assert_eq!(outputs[1].column_description, "#vel_mid[km/s] H0 H1");
}

#[test]
fn test_build_output_kinds() {
  let sims = two_sims();
  for kind in DataKind::all().iter().copied() {
    let file = build_output(kind, &sims, "k", "Ca").unwrap();
    assert_eq!(file.kind, kind);
    assert!(file.file_name().starts_with(kind.name()));
  }
}
