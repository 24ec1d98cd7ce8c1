//! fsmkit - demonstration runner
//!
//! Replays the reference scenarios against the transition engine and reports
//! each check. Exits non-zero if any check fails.

use clap::{Parser, ValueEnum};
use fsmkit_core::{EngineConfig, EngineError, FallbackReason, TransitionEngine};
use std::fmt::Debug;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fsmkit")]
#[command(about = "Run the fsmkit demonstration scenarios")]
#[command(version)]
struct Cli {
    /// Scenario to run
    #[arg(short, long, value_enum, default_value_t = Scenario::All)]
    scenario: Scenario,

    /// Engine config file (YAML), overriding FSMKIT_CONFIG
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scenario {
    /// Run every scenario
    All,
    /// String states, char inputs
    Strings,
    /// Opaque handle states, integer inputs
    Handles,
    /// Invalid state references and unmatched inputs
    Invalid,
}

/// Opaque state handle; the engine only compares and hashes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Handle(u32);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // An explicit --config wins; otherwise FSMKIT_CONFIG is honored by load().
    let config = match &cli.config {
        Some(path) => {
            let mut config = EngineConfig::from_file(path)?;
            config.apply_env_overrides();
            tracing::info!("Loaded config from {}", path.display());
            config
        }
        None => EngineConfig::load()?,
    };
    tracing::info!("Invoke policy: {:?}", config.invoke_policy);

    let mut checks = Checks::default();
    if matches!(cli.scenario, Scenario::All | Scenario::Strings) {
        run_strings(&config, &mut checks)?;
    }
    if matches!(cli.scenario, Scenario::All | Scenario::Handles) {
        run_handles(&config, &mut checks)?;
    }
    if matches!(cli.scenario, Scenario::All | Scenario::Invalid) {
        run_invalid(&config, &mut checks)?;
    }

    tracing::info!("{} checks passed, {} failed", checks.passed, checks.failed);
    if checks.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

#[derive(Default)]
struct Checks {
    passed: usize,
    failed: usize,
}

impl Checks {
    fn expect<T: PartialEq + Debug>(&mut self, what: &str, actual: T, expected: T) {
        if actual == expected {
            self.passed += 1;
            tracing::info!("SUCCESS: {}", what);
        } else {
            self.failed += 1;
            tracing::error!(
                "FAILURE: {} (expected {:?}, got {:?})",
                what,
                expected,
                actual
            );
        }
    }
}

fn log_fallback<S: Debug, I: Debug>(reason: &FallbackReason<S, I>) {
    tracing::info!("fallback is called: {}", reason);
}

fn callback1() {
    tracing::info!("callback1 is called");
}

fn callback2() {
    tracing::info!("callback2 is called");
}

fn run_strings(config: &EngineConfig, checks: &mut Checks) -> Result<(), EngineError> {
    tracing::info!("Scenario 'strings' starts");
    let engine =
        TransitionEngine::<String, char>::with_config(config.clone().with_name("strings"));
    let (s1, s2, s3) = ("s1".to_string(), "s2".to_string(), "s3".to_string());

    engine.set_fallback(log_fallback);
    engine.add_state(s1.clone());
    engine.add_state(s2.clone());
    engine.add_state(s3.clone());

    engine.add_transition(s1.clone(), s2.clone(), 'i', callback1)?;
    engine.add_transition(s2.clone(), s3.clone(), 'j', callback2)?;

    engine.reset(s1.clone())?;
    checks.expect("initial state is s1", engine.state()?, s1);

    engine.step('i')?;
    checks.expect("'i' moves s1 to s2", engine.state()?, s2.clone());

    engine.step('j')?;
    checks.expect("'j' moves s2 to s3", engine.state()?, s3.clone());

    let outcome = engine.step('j')?;
    checks.expect("'j' from s3 falls back", outcome.is_fallback(), true);
    checks.expect("state stays s3", engine.state()?, s3);

    engine.reset(s2.clone())?;
    checks.expect("reset sets s2 directly", engine.state()?, s2);

    tracing::info!("Scenario 'strings' ends");
    Ok(())
}

fn run_handles(config: &EngineConfig, checks: &mut Checks) -> Result<(), EngineError> {
    tracing::info!("Scenario 'handles' starts");
    let engine = TransitionEngine::<Handle, i32>::with_config(config.clone().with_name("handles"));
    let (s1, s2, s3) = (Handle(1), Handle(2), Handle(3));

    engine.set_fallback(log_fallback);
    engine.add_state(s1);
    engine.add_state(s2);
    engine.add_state(s3);

    engine.add_transition(s1, s2, 4, callback1)?;
    engine.add_transition(s2, s3, 5, callback2)?;

    engine.reset(s1)?;
    checks.expect("initial state is handle 1", engine.state()?, s1);

    engine.step(4)?;
    checks.expect("4 moves handle 1 to handle 2", engine.state()?, s2);

    engine.step(5)?;
    checks.expect("5 moves handle 2 to handle 3", engine.state()?, s3);

    let outcome = engine.step(5)?;
    checks.expect("5 from handle 3 falls back", outcome.is_fallback(), true);
    checks.expect("state stays handle 3", engine.state()?, s3);

    engine.reset(s2)?;
    checks.expect("reset sets handle 2 directly", engine.state()?, s2);

    tracing::info!("Scenario 'handles' ends");
    Ok(())
}

fn run_invalid(config: &EngineConfig, checks: &mut Checks) -> Result<(), EngineError> {
    tracing::info!("Scenario 'invalid' starts");
    let engine =
        TransitionEngine::<String, char>::with_config(config.clone().with_name("invalid"));
    let (s1, s2, s3) = ("s1".to_string(), "s2".to_string(), "s3".to_string());

    engine.set_fallback(log_fallback);
    engine.add_state(s1.clone());
    engine.add_state(s2.clone());

    engine.add_transition(s1.clone(), s2.clone(), 'i', callback1)?;

    // s3 was never registered.
    let outcome = engine.add_transition(s2.clone(), s3.clone(), 'j', callback2)?;
    checks.expect("transition to s3 falls back", outcome.is_fallback(), true);

    engine.reset(s1.clone())?;
    checks.expect("initial state is s1", engine.state()?, s1.clone());

    let outcome = engine.reset(s3)?;
    checks.expect("reset to s3 falls back", outcome.is_fallback(), true);
    checks.expect("state stays s1", engine.state()?, s1);

    engine.step('i')?;
    checks.expect("'i' moves s1 to s2", engine.state()?, s2.clone());

    let outcome = engine.step('j')?;
    checks.expect("'j' from s2 falls back", outcome.is_fallback(), true);
    checks.expect("state stays s2", engine.state()?, s2);

    tracing::info!("Scenario 'invalid' ends");
    Ok(())
}
