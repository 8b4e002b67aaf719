//! A command-line application to export supernova radiative transfer runs to
//! code comparison files.

#![allow(clippy::needless_return)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

mod job;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use code_compare::prelude::*;
use log::*;
use sn_results::prelude::*;

use crate::job::{Job, OneOrMany};

/// The arguments passed to the exporter.
#[derive(Clone, Debug, Parser)]
#[command(author, version, about)]
struct Cli {
  /// Model name, used in every file name. Overrides the job file.
  #[arg(short = 'm', long = "model")]
  model: Option<String>,
  /// Directory to write the files into. Overrides the job file. If absent
  /// here and there, writes to the current directory.
  #[arg(short = 'o', long = "dest")]
  dest: Option<PathBuf>,
  /// Species to write ionisation fractions for. Can be specified more than
  /// once, or comma-separated. Overrides the job file. If absent here and
  /// there, calcium is used.
  #[arg(short = 's', long = "species", num_args = 0.., value_delimiter = ',')]
  species: Vec<String>,
  /// Kinds of files to write. Can be specified more than once, or
  /// comma-separated. Overrides the job file. If absent here and there, all
  /// kinds are written.
  #[arg(short = 'k', long = "kinds", num_args = 0.., value_delimiter = ',')]
  kinds: Vec<DataKind>,
  /// A TOML job file with any of the above, plus a list of simulations.
  #[arg(short = 'j', long = "job")]
  job: Option<PathBuf>,
  /// Output extra/debug info while loading and exporting.
  #[arg(short = 'v', long = "verbose")]
  verbose: bool,
  /// How body values are formatted.
  #[command(flatten)]
  format: FloatFormat,
  /// Simulation dumps (JSON), in time order. Appended to the job file's.
  inputs: Vec<PathBuf>,
}

impl Cli {
  /// Merges the command-line arguments over a job.
  fn merge_into(self, job: Job) -> Job {
    let mut species: Vec<String> = job.species.into();
    if !self.species.is_empty() {
      species = self.species;
    }
    let mut kinds: Vec<DataKind> = job.kinds.into();
    if !self.kinds.is_empty() {
      kinds = self.kinds;
    }
    let mut simulations = job.simulations;
    simulations.extend(self.inputs);
    return Job {
      model: self.model.or(job.model),
      dest: self.dest.or(job.dest),
      species: OneOrMany::Many(species),
      kinds: OneOrMany::Many(kinds),
      simulations,
    };
  }
}

/// Does the actual work.
fn run(args: Cli) -> Result<(), Box<dyn Error>> {
  let format = args.format;
  let job = match args.job {
    Some(ref path) => {
      info!("Reading job file {}...", path.display());
      Job::load(path)?
    }
    None => Job::default(),
  };
  let job = args.merge_into(job);
  let model = job.model
    .ok_or("no model name given (use -m or the job file)")?;
  let dest = job.dest.unwrap_or_else(|| PathBuf::from("."));
  let mut species: Vec<String> = job.species.into();
  if species.is_empty() {
    species.push(Species::DEFAULT_SYMBOL.to_owned());
  }
  let mut kinds: Vec<DataKind> = job.kinds.into();
  if kinds.is_empty() {
    kinds.extend_from_slice(DataKind::all());
  }
  if job.simulations.is_empty() {
    return Err("no simulations given".into());
  }
  // load everything
  let mut sims: Vec<SimulationResult> = Vec::new();
  for path in job.simulations.iter() {
    info!("Loading {}...", path.display());
    sims.push(SimulationResult::from_json_file(path)?);
  }
  info!("Loaded {} simulations.", sims.len());
  // build everything before writing anything
  let outputs = build_outputs(&kinds, &sims, &model, &species)?;
  for output in outputs {
    output.with_format(format).write(&dest)?;
  }
  info!("All done.");
  return Ok(());
}

fn main() {
  // init cli stuff
  let args = Cli::parse();
  let log_level = if args.verbose {
    LevelFilter::Debug
  } else {
    LevelFilter::Info
  };
  env_logger::builder().filter_level(log_level).init();
  if let Err(e) = run(args) {
    error!("{}", e);
    std::process::exit(1);
  }
}
