//! Top-level application orchestration.
//!
//! `src/main.rs` only maps the result to an exit code; this module:
//! - parses CLI arguments and sets up logging
//! - resolves the artifact directory (flag, then `FF_ARTIFACT_DIR`)
//! - runs the requested command and prints its report

use std::path::PathBuf;

use clap::Parser;

use crate::btag::VetoWeighter;
use crate::cli::{ApplyArgs, BvetoArgs, Cli, Command, EvalArgs, StoreArgs};
use crate::curves::{ArtifactPaths, CurveStore};
use crate::domain::{Direction, KinematicInput, SystematicSelector};
use crate::error::AppError;
use crate::ff::FakeFactorEngine;

pub mod pipeline;

/// Entry point for the `ff` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Check(args) => handle_check(args),
        Command::Eval(args) => handle_eval(args),
        Command::Apply(args) => handle_apply(args),
        Command::Bveto(args) => handle_bveto(args),
    }
}

fn artifact_paths(args: &StoreArgs) -> Result<ArtifactPaths, AppError> {
    let dir: PathBuf = match &args.artifacts {
        Some(dir) => dir.clone(),
        None => ArtifactPaths::dir_from_env()?,
    };
    Ok(ArtifactPaths::in_dir(&dir, args.channel))
}

fn load_engine(args: &StoreArgs) -> Result<FakeFactorEngine, AppError> {
    let paths = artifact_paths(args)?;
    Ok(FakeFactorEngine::load(args.channel, &paths)?)
}

fn handle_check(args: StoreArgs) -> Result<(), AppError> {
    let paths = artifact_paths(&args)?;
    let store = CurveStore::load(args.channel, &paths)?;
    // resolves every handle the evaluators need
    let engine = FakeFactorEngine::new(store)?;
    println!("{}", crate::report::format_store_summary(engine.store()));
    Ok(())
}

fn handle_eval(args: EvalArgs) -> Result<(), AppError> {
    let engine = load_engine(&args.store)?;
    let input = KinematicInput::from_slice(&args.kin)?;
    let direction = args.dir.map_or("", |d| d.tag());
    let selector = SystematicSelector::from_strings(&args.syst, direction);
    if !args.syst.is_empty() && selector.is_nominal() {
        tracing::warn!(key = %args.syst, "systematic not applied, evaluating nominal");
    }

    let weight = engine.evaluate(&input, &selector);
    let factors = engine.components(&input, &selector);
    println!("{}", crate::report::format_eval(weight, &factors));
    Ok(())
}

fn handle_apply(args: ApplyArgs) -> Result<(), AppError> {
    let engine = load_engine(&args.store)?;
    let config = pipeline::ApplyConfig {
        events: args.events,
        fractions: args.fractions,
        systematics: args.systematics,
        output: args.output,
    };
    let output = pipeline::run_apply(&engine, &config)?;
    println!("{}", crate::report::format_apply_summary(&output));
    Ok(())
}

fn handle_bveto(args: BvetoArgs) -> Result<(), AppError> {
    let weighter = VetoWeighter::new(args.year, args.wp)?;
    let shift = match args.shift.as_str() {
        "none" => None,
        other => Some(Direction::parse(other).ok_or_else(|| {
            AppError::new(3, format!("shift must be 'none', 'up' or 'down', got '{other}'"))
        })?),
    };
    let weight = weighter.find_weight(&args.jet1.0, &args.jet2.0, shift);
    tracing::debug!(
        year = ?weighter.year(),
        working_point = ?weighter.working_point(),
        threshold = weighter.threshold(),
        "b-tag veto weight"
    );
    println!("{weight:.6}");
    Ok(())
}
