//! Command-line parsing for the `ff` binary.
//!
//! Argument parsing and validation only; `app` does the dispatch.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Channel, Direction, TagCandidate, WorkingPoint};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ff", version, about = "Jet-to-tau fake factors and b-tag veto weights")]
pub struct Cli {
    /// Log verbosity (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load and validate the curve artifacts of a channel.
    Check(StoreArgs),
    /// Evaluate the fake factor for one kinematic vector.
    Eval(EvalArgs),
    /// Weight every event of a CSV table.
    Apply(ApplyArgs),
    /// Compute the b-tag veto weight for two candidate jets.
    Bveto(BvetoArgs),
}

/// Where to find the curves.
#[derive(Debug, Args, Clone)]
pub struct StoreArgs {
    /// Directory with the curve artifacts (falls back to FF_ARTIFACT_DIR).
    #[arg(short = 'a', long)]
    pub artifacts: Option<PathBuf>,

    #[arg(short = 'c', long, value_enum)]
    pub channel: Channel,
}

#[derive(Debug, Args, Clone)]
pub struct EvalArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// pt,mt,mvis,lpt,dr,met,njets,xtrg,frac_tt,frac_qcd,frac_w
    #[arg(long, value_delimiter = ',', num_args = 1.., allow_negative_numbers = true)]
    pub kin: Vec<f64>,

    /// Systematic key, e.g. ff_w_0jet_unc1 (nominal if omitted or unknown).
    #[arg(long, default_value = "")]
    pub syst: String,

    #[arg(long, value_enum)]
    pub dir: Option<Direction>,
}

#[derive(Debug, Args, Clone)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Event CSV.
    #[arg(short = 'e', long)]
    pub events: PathBuf,

    /// Fake-fraction JSON, used for rows without frac_* columns.
    #[arg(short = 'f', long)]
    pub fractions: Option<PathBuf>,

    /// Also compute every systematic shift (up and down).
    #[arg(short = 's', long)]
    pub systematics: bool,

    /// Write per-event weights to this CSV.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct BvetoArgs {
    #[arg(long)]
    pub year: i32,

    #[arg(long, value_enum)]
    pub wp: WorkingPoint,

    /// Leading candidate as pt,flavour,score.
    #[arg(long, allow_hyphen_values = true)]
    pub jet1: CandidateArg,

    /// Subleading candidate as pt,flavour,score.
    #[arg(long, allow_hyphen_values = true)]
    pub jet2: CandidateArg,

    /// none, up or down.
    #[arg(long, default_value = "none")]
    pub shift: String,
}

/// `pt,flavour,score` triple from the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateArg(pub TagCandidate);

impl FromStr for CandidateArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>().map_err(|e| format!("'{part}': {e}")))
            .collect::<Result<Vec<_>, _>>()?;
        let [pt, flavor, score] = values[..] else {
            return Err(format!("expected pt,flavour,score, got '{s}'"));
        };
        Ok(CandidateArg(TagCandidate::new(pt, flavor, score)))
    }
}
