use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "gammafit - fits pairwise residue-interaction energy weights by Z-score optimization \
             against sequence-decoy ensembles.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fit a gamma weight vector for one training configuration.
    Solve(SolveArgs),
    /// Score phi artifacts against a fitted gamma vector.
    Inspect(InspectArgs),
}

/// Arguments for the `solve` subcommand.
#[derive(Args, Debug)]
pub struct SolveArgs {
    /// Path to a run-configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Training-set listing (whitespace-delimited protein identifiers).
    #[arg(short, long, value_name = "PATH")]
    pub training_set: Option<PathBuf>,

    /// Phi list (one functional + parameter tuple per line).
    #[arg(short, long, value_name = "PATH")]
    pub phi_list: Option<PathBuf>,

    /// Directory holding native phi vectors and decoy feature matrices.
    #[arg(long, value_name = "DIR")]
    pub phis_dir: Option<PathBuf>,

    /// Directory receiving the fitted gamma artifact family.
    #[arg(long, value_name = "DIR")]
    pub gammas_dir: Option<PathBuf>,

    /// Fixed eigenvalue cutoff (clamped to [1, num_features - 1]).
    #[arg(long, value_name = "N", conflicts_with = "dynamic_cutoff")]
    pub cutoff: Option<usize>,

    /// Estimate the cutoff by noise injection instead of a fixed index.
    #[arg(long)]
    pub dynamic_cutoff: bool,

    /// Number of noise-injection trials for the dynamic cutoff.
    #[arg(long, value_name = "N", requires = "dynamic_cutoff")]
    pub noise_trials: Option<usize>,

    /// Relative-deviation threshold for the dynamic cutoff.
    #[arg(long, value_name = "FLOAT", requires = "dynamic_cutoff")]
    pub relative_error_threshold: Option<f64>,

    /// Rows accumulated per batch by the moment aggregator.
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Permit multi-protein training sets despite the single-representative
    /// decoy-resolution assumption.
    #[arg(long)]
    pub allow_multi_protein: bool,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Fitted gamma vector artifact.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub gamma: PathBuf,

    /// Decoy phi matrix to score.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub decoys: PathBuf,

    /// Native phi vector; enables the Z-score report.
    #[arg(short, long, value_name = "PATH")]
    pub native: Option<PathBuf>,

    /// Print every decoy energy instead of the summary only.
    #[arg(long)]
    pub all_energies: bool,
}
