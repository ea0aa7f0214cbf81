//! Dexforge CLI
//!
//! Command-line interface for:
//! - Converting sectioned text data files into JSON arrays
//! - Merging form variants into their base species
//! - Annotating species with canonical evolution lines
//! - Cross-checking converted JSON against its source text
//! - Summarizing stat totals of fully evolved species
//! - Running the whole pipeline over every game under a directory

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use dexforge_evolution::DEFAULT_EXCLUDED_TOP;
use dexforge_ingest_pbs::DataKind;

mod pipeline;
mod steps;

use pipeline::{PipelineConfig, DEFAULT_BASE_DIR};
use steps::Check;

#[derive(Parser)]
#[command(name = "dexforge")]
#[command(
    author,
    version,
    about = "Dexforge: game data text files to merged, evolution-annotated JSON"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one text data file into a JSON array
    Ingest {
        /// Which file format the input is
        #[arg(value_enum)]
        kind: KindArg,
        /// Input text file
        input: PathBuf,
        /// Output JSON file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Attach forms to their base species, assigning form identifiers
    Merge {
        /// Base species JSON (`pokemon.json`)
        #[arg(long)]
        base: PathBuf,
        /// Forms JSON (`pokemon_forms.json`)
        #[arg(long)]
        forms: Option<PathBuf>,
        /// Output merged JSON
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Add an `EvolutionLine` to every species that belongs to a chain
    Evolve {
        /// Input species JSON (usually the merged file)
        input: PathBuf,
        /// Output JSON
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Average stat total of final-stage species and their forms
    Stats {
        /// Merged species JSON (`pokemon_master.json`)
        input: PathBuf,
        /// Leave out this many of the highest totals
        #[arg(long, default_value_t = DEFAULT_EXCLUDED_TOP)]
        exclude_top: usize,
    },

    /// Cross-check a JSON file against its source text
    ///
    /// Exits non-zero when any mismatch is found. The `forms` check reads a
    /// merged file and needs no text file.
    Validate {
        #[arg(value_enum)]
        kind: CheckArg,
        /// Converted JSON file
        #[arg(long)]
        json: PathBuf,
        /// Source text file
        #[arg(long)]
        txt: Option<PathBuf>,
    },

    /// Run the full pipeline for each game under a base directory
    Run {
        /// Directory holding one sub-directory per game
        #[arg(long, default_value = DEFAULT_BASE_DIR)]
        base_dir: PathBuf,
        /// Only these games (repeatable); default is every game directory
        #[arg(long = "game")]
        games: Vec<String>,
        /// Skip the txt-vs-JSON cross-checks
        #[arg(long)]
        skip_validate: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Pokemon,
    Forms,
    Moves,
    Abilities,
    Types,
    Encounters,
}

impl From<KindArg> for DataKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Pokemon => DataKind::Pokemon,
            KindArg::Forms => DataKind::Forms,
            KindArg::Moves => DataKind::Moves,
            KindArg::Abilities => DataKind::Abilities,
            KindArg::Types => DataKind::Types,
            KindArg::Encounters => DataKind::Encounters,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CheckArg {
    Pokemon,
    Forms,
    Moves,
    Abilities,
}

impl From<CheckArg> for Check {
    fn from(kind: CheckArg) -> Self {
        match kind {
            CheckArg::Pokemon => Check::Pokemon,
            CheckArg::Forms => Check::Forms,
            CheckArg::Moves => Check::Moves,
            CheckArg::Abilities => Check::Abilities,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest { kind, input, out } => cmd_ingest(kind.into(), &input, &out),
        Commands::Merge { base, forms, out } => cmd_merge(&base, forms.as_ref(), &out),
        Commands::Evolve { input, out } => cmd_evolve(&input, &out),
        Commands::Stats { input, exclude_top } => cmd_stats(&input, exclude_top),
        Commands::Validate { kind, json, txt } => cmd_validate(kind.into(), &json, txt.as_ref()),
        Commands::Run {
            base_dir,
            games,
            skip_validate,
        } => cmd_run(PipelineConfig {
            base_dir,
            games,
            validate: !skip_validate,
        }),
    }
}

fn cmd_ingest(kind: DataKind, input: &PathBuf, out: &PathBuf) -> Result<()> {
    println!(
        "{} {} ({})",
        "Ingesting".green().bold(),
        input.display(),
        kind.label()
    );
    let count = steps::ingest(kind, input, out)?;
    println!("  {} {} ({} records)", "→".cyan(), out.display(), count);
    Ok(())
}

fn cmd_merge(base: &PathBuf, forms: Option<&PathBuf>, out: &PathBuf) -> Result<()> {
    println!("{} {}", "Merging".green().bold(), base.display());
    let outcome = steps::merge(base, forms.map(PathBuf::as_path), out)?;
    println!("  Forms merged: {}", outcome.merged);
    println!("  Already present: {}", outcome.unchanged);
    if !outcome.skipped.is_empty() {
        println!("  Skipped: {}", outcome.skipped.len().to_string().yellow());
        for error in &outcome.skipped {
            println!("    - {error}");
        }
    }
    println!("  {} {}", "→".cyan(), out.display());
    Ok(())
}

fn cmd_evolve(input: &PathBuf, out: &PathBuf) -> Result<()> {
    println!("{} {}", "Resolving evolutions".green().bold(), input.display());
    let report = steps::evolve(input, out)?;
    println!("  Families: {}", report.chains.families().len());
    println!("  Records annotated: {}", report.annotated);
    println!("  {} {}", "→".cyan(), out.display());
    Ok(())
}

fn cmd_stats(input: &PathBuf, exclude_top: usize) -> Result<()> {
    println!("{} {}", "Stat totals".green().bold(), input.display());
    let summary = steps::stats(input, exclude_top)?;
    println!("  Final-stage entries: {}", summary.totals.len());
    println!("  Highest left out: {}", summary.excluded);
    for entry in &summary.totals[..summary.excluded] {
        println!("    - {} ({})", entry.label, entry.total);
    }
    println!("  Average: {:.2}", summary.average);
    Ok(())
}

fn cmd_validate(check: Check, json: &PathBuf, txt: Option<&PathBuf>) -> Result<()> {
    println!("{} {}", "Validating".green().bold(), json.display());
    let mismatches = steps::validate(check, json, txt.map(PathBuf::as_path))?;
    pipeline::print_mismatches(json, &mismatches);
    if !mismatches.is_empty() {
        bail!("{} mismatches found", mismatches.len());
    }
    println!("{}", "Valid.".green());
    Ok(())
}

fn cmd_run(config: PipelineConfig) -> Result<()> {
    let summary = pipeline::run(&config)?;
    let failed: Vec<&str> = summary.failed().collect();
    if !failed.is_empty() {
        bail!(
            "{} of {} games failed: {}",
            failed.len(),
            summary.games.len(),
            failed.join(", ")
        );
    }
    println!(
        "{} {} games",
        "Done.".green().bold(),
        summary.games.len()
    );
    Ok(())
}
