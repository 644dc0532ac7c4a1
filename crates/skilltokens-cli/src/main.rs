//! skill-tokens CLI
//!
//! Reports how many tokens each skill's SKILL.md and reference files cost,
//! optionally compared against a git ref:
//! - `skill-tokens [TARGET]`: local breakdown
//! - `skill-tokens [TARGET] --compare[=REF]`: local vs REF with deltas
//! - `--json`: machine-readable report on stdout, warnings suppressed

mod config;
mod paths;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use config::{load_config, Config, CounterBackend};
use skilltokens_analyzer::{DifferentialReporter, SkillAnalyzer};
use skilltokens_core::FatalError;
use skilltokens_snapshot::{resolve_path, GitSnapshot, LiveSnapshot, SnapshotAccessor};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose logs follow `--log-level`; everything else stays at warn
const LOG_TARGETS: &[&str] = &[
    "skill_tokens",
    "skilltokens",
    "skilltokens_core",
    "skilltokens_snapshot",
    "skilltokens_counter",
    "skilltokens_analyzer",
];

#[derive(Parser)]
#[command(name = "skill-tokens")]
#[command(about = "Measure the context budget consumed by agent skills", long_about = None)]
#[command(version)]
struct Cli {
    /// Skill directory, or a directory containing skills (defaults to config `target`)
    target: Option<PathBuf>,

    /// Compare against a git ref (bare flag uses config `compare_ref`, default "main")
    #[arg(long, value_name = "REF", num_args = 0..=1)]
    compare: Option<Option<String>>,

    /// JSON output
    #[arg(long)]
    json: bool,

    /// Config file path (defaults to system config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Token counter backend (overrides config)
    #[arg(long, value_enum, env = "SKILL_TOKENS_COUNTER")]
    counter: Option<CounterBackend>,

    /// Model used for counting (overrides config)
    #[arg(long, env = "SKILL_TOKENS_MODEL")]
    model: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

/// Settings after applying CLI > env > config > defaults
#[derive(Debug)]
struct Settings {
    target: PathBuf,
    compare_ref: Option<String>,
    config: Config,
}

fn resolve_settings(cli: &Cli, mut config: Config) -> Settings {
    if let Some(backend) = cli.counter {
        config.counter.backend = backend;
    }
    if let Some(ref model) = cli.model {
        config.counter.model = model.clone();
    }

    let target = cli.target.clone().unwrap_or_else(|| config.target.clone());
    let compare_ref = cli
        .compare
        .as_ref()
        .map(|r| r.clone().unwrap_or_else(|| config.compare_ref.clone()));

    Settings {
        target,
        compare_ref,
        config,
    }
}

/// Initialize logging on stderr; machine output mode silences it entirely
fn init_logging(level: &str, quiet: bool) {
    let filter = if quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let directives: Vec<String> = LOG_TARGETS
                .iter()
                .map(|target| format!("{}={}", target, level))
                .collect();
            format!("warn,{}", directives.join(",")).into()
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false),
        )
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = paths::config_file(cli.config.as_deref())?;
    let config = load_config(&config_path)?;
    let settings = resolve_settings(&cli, config);
    debug!("Resolved settings: {:?}", settings);

    // Constructed once, before any analysis
    let meter = settings.config.counter.build_meter()?;
    info!("Counting tokens with {}", meter.counter_name());

    let target = resolve_path(&settings.target)
        .with_context(|| format!("Cannot resolve target {}", settings.target.display()))?;

    let reference = match settings.compare_ref {
        Some(ref compare_ref) => {
            let cwd = std::env::current_dir().context("Cannot read current directory")?;
            let snapshot = GitSnapshot::discover(&cwd, compare_ref.clone()).map_err(|e| {
                debug!("Repository discovery failed: {}", e);
                FatalError::NotARepository {
                    path: cwd.clone(),
                    compare_ref: compare_ref.clone(),
                }
            })?;
            Some(snapshot)
        }
        None => None,
    };

    let live = LiveSnapshot::new();
    let analyzer = SkillAnalyzer::new(meter);
    let reporter = DifferentialReporter::new(
        &analyzer,
        &live,
        reference.as_ref().map(|r| r as &dyn SnapshotAccessor),
    );

    let report = reporter.run(&target).await?;

    if cli.json {
        println!("{}", report.to_json_pretty()?);
    } else {
        print!("{}", render::render_report(&report));
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.json);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
