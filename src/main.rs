//! sequoia-check CLI — the runner entry point (§6).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::FmtSubscriber;

use sequoia_check::config::RunnerConfig;
use sequoia_check::report::ConsoleReporter;
use sequoia_check::runner::{ConcurrencyMode, OutputMode, Runner};

#[derive(Parser)]
#[command(name = "sequoia-check")]
#[command(about = "Value-comparison check runner", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the runner config file.
    #[arg(long, default_value = "sequoia.toml")]
    config: PathBuf,

    /// Add a family name to the selection set. Repeatable.
    #[arg(long = "test", value_name = "FAMILY")]
    families: Vec<String>,

    /// Add a source file stem to the selection set. Repeatable.
    #[arg(long = "source", value_name = "PATH")]
    sources: Vec<String>,

    /// Run with at least `family`-level concurrency.
    #[arg(long = "async")]
    run_async: bool,

    /// Set concurrency explicitly: 0 = family, 1 = test, 2 = deep.
    #[arg(long = "async-depth", value_name = "0-2")]
    async_depth: Option<u8>,

    /// Emit per-test detail.
    #[arg(short, long)]
    verbose: bool,

    /// Enable the recovery file (forbidden under concurrent execution).
    #[arg(short, long)]
    recovery: bool,

    /// Enable the dump file (forbidden under concurrent execution).
    #[arg(long)]
    dump: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Update predictive materials from obtained output instead of checking.
    UpdateMaterials {
        /// Overwrite materials even for tests that are currently passing.
        #[arg(long)]
        hard: bool,
    },

    /// Bootstrap a new project (trait hook only; this core has no scaffolder).
    Init {
        copyright: String,
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Some(Commands::UpdateMaterials { hard }) => update_materials(hard),
        Some(Commands::Init { copyright, path }) => init_project(&copyright, &path),
        None => run(&cli),
    }
}

fn resolve_concurrency(cli: &Cli) -> Result<Option<ConcurrencyMode>> {
    if let Some(depth) = cli.async_depth {
        return Ok(Some(ConcurrencyMode::from_async_depth(depth)?));
    }
    if cli.run_async {
        return Ok(Some(ConcurrencyMode::Family));
    }
    Ok(None)
}

fn run(cli: &Cli) -> Result<()> {
    let concurrency_override = resolve_concurrency(cli)?;
    let config = RunnerConfig::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?
        .with_overrides(None, concurrency_override, cli.verbose, cli.recovery, cli.dump);

    let mut runner = Runner::new(".", &config.output_dir)
        .with_concurrency(config.concurrency)
        .with_output_mode(OutputMode {
            verbose: config.verbose,
            write_files: true,
        });

    for family in &cli.families {
        runner.selection_mut().add_family(family.clone());
    }
    for source in &cli.sources {
        runner.selection_mut().add_source(source.clone());
    }

    // Families are registered by whatever embeds this runner as a library;
    // this binary ships no bundled test families of its own.

    let outcome = runner.execute()?;
    let reporter = ConsoleReporter::new(config.verbose, config.concurrency);
    let bar = reporter.start(outcome.families.len());
    for (name, summary) in &outcome.families {
        reporter.report_family(bar.as_ref(), name, summary);
    }
    let exit_code = reporter.finish(bar, &outcome);

    std::process::exit(exit_code);
}

fn update_materials(hard: bool) -> Result<()> {
    println!("update-materials requested (hard = {hard})");
    println!("this core defines the selection/execution machinery only;");
    println!("materials are overwritten by the embedding project's test bodies.");
    Ok(())
}

/// No-op default scaffolder: project bootstrapping is explicitly out of
/// scope for this core (§1), but the command surface stays so an embedder
/// can supply its own scaffolder behind the same subcommand.
fn init_project(copyright: &str, path: &std::path::Path) -> Result<()> {
    println!(
        "init requested for '{}' (copyright holder: {copyright}); no scaffolder is bundled",
        path.display()
    );
    Ok(())
}
