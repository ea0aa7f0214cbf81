//! The per-game runner behind `dexforge run`.
//!
//! Each game lives under `<base_dir>/<game>/data/`. Games are independent: a
//! game that fails (unreadable file, undecodable JSON) is reported and the run
//! moves on to the next one.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use colored::Colorize;
use dexforge_ingest_pbs::{DataKind, Mismatch};
use walkdir::WalkDir;

use crate::steps::{self, Check};

pub const DEFAULT_BASE_DIR: &str = "games";

/// Converted files that are optional inputs for a game.
const OPTIONAL_TABLES: [DataKind; 4] = [
    DataKind::Moves,
    DataKind::Abilities,
    DataKind::Types,
    DataKind::Encounters,
];

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub base_dir: PathBuf,
    /// Explicit games; empty means every directory under `base_dir`.
    pub games: Vec<String>,
    pub validate: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            games: Vec::new(),
            validate: true,
        }
    }
}

/// Fixed file names under one game's `data/` directory.
#[derive(Debug, Clone)]
pub struct GameLayout {
    pub game: String,
    pub data_dir: PathBuf,
}

impl GameLayout {
    pub fn new(base_dir: &Path, game: &str) -> Self {
        Self {
            game: game.to_string(),
            data_dir: base_dir.join(game).join("data"),
        }
    }

    pub fn text(&self, kind: DataKind) -> PathBuf {
        self.data_dir.join(kind.text_file())
    }

    pub fn json(&self, kind: DataKind) -> PathBuf {
        self.data_dir.join(kind.json_file())
    }

    /// Base species with their forms attached.
    pub fn master(&self) -> PathBuf {
        self.data_dir.join("pokemon_master.json")
    }

    /// [`Self::master`] plus evolution lines.
    pub fn master_evo(&self) -> PathBuf {
        self.data_dir.join("pokemon_master_evo.json")
    }
}

/// Every directory directly under `base_dir`, sorted by name.
pub fn discover_games(base_dir: &Path) -> Result<Vec<String>> {
    let mut games = Vec::new();
    for entry in WalkDir::new(base_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("listing games in {}", base_dir.display()))?;
        if entry.file_type().is_dir() {
            games.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(games)
}

#[derive(Debug, Default)]
pub struct GameReport {
    pub converted: Vec<(DataKind, usize)>,
    /// Optional inputs that were not present.
    pub missing: Vec<DataKind>,
    pub forms_merged: usize,
    pub forms_skipped: usize,
    pub annotated: usize,
    pub mismatches: usize,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub games: Vec<(String, Result<GameReport>)>,
}

impl RunSummary {
    pub fn failed(&self) -> impl Iterator<Item = &str> {
        self.games
            .iter()
            .filter(|(_, result)| result.is_err())
            .map(|(game, _)| game.as_str())
    }
}

/// Run every configured game. Only failing to enumerate games is an error;
/// per-game failures are recorded in the summary.
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    let games = if config.games.is_empty() {
        discover_games(&config.base_dir)?
    } else {
        config.games.clone()
    };
    if games.is_empty() {
        tracing::warn!(base_dir = %config.base_dir.display(), "no games found");
    }

    let mut summary = RunSummary::default();
    for game in games {
        println!("{} {}", "Processing".green().bold(), game.cyan());
        let layout = GameLayout::new(&config.base_dir, &game);
        let result = run_game(&layout, config.validate);
        match &result {
            Ok(report) => println!(
                "{} {} ({} forms merged, {} evolution lines, {} mismatches)",
                "Finished".green().bold(),
                game,
                report.forms_merged,
                report.annotated,
                report.mismatches
            ),
            Err(error) => {
                tracing::error!(game = %game, error = %format!("{error:#}"), "game failed");
                eprintln!("{} {}: {:#}", "Failed".red().bold(), game, error);
            }
        }
        summary.games.push((game, result));
    }
    Ok(summary)
}

/// Convert, merge, annotate and (optionally) cross-check one game.
pub fn run_game(layout: &GameLayout, validate: bool) -> Result<GameReport> {
    let species_txt = layout.text(DataKind::Pokemon);
    if !species_txt.is_file() {
        bail!("{} not found", species_txt.display());
    }

    let mut report = GameReport::default();
    convert(layout, DataKind::Pokemon, &mut report)?;
    let has_forms = convert_optional(layout, DataKind::Forms, &mut report)?;

    let forms_json = layout.json(DataKind::Forms);
    let merged = steps::merge(
        &layout.json(DataKind::Pokemon),
        has_forms.then_some(forms_json.as_path()),
        &layout.master(),
    )?;
    report.forms_merged = merged.merged;
    report.forms_skipped = merged.skipped.len();
    println!(
        "  {} {} ({} forms merged, {} skipped)",
        "→".cyan(),
        layout.master().display(),
        merged.merged,
        merged.skipped.len()
    );

    for kind in OPTIONAL_TABLES {
        convert_optional(layout, kind, &mut report)?;
    }

    let evolved = steps::evolve(&layout.master(), &layout.master_evo())?;
    report.annotated = evolved.annotated;
    println!(
        "  {} {} ({} families)",
        "→".cyan(),
        layout.master_evo().display(),
        evolved.chains.families().len()
    );

    if validate {
        report.mismatches = cross_check(layout, &report)?;
    }
    Ok(report)
}

fn convert(layout: &GameLayout, kind: DataKind, report: &mut GameReport) -> Result<usize> {
    let out = layout.json(kind);
    let count = steps::ingest(kind, &layout.text(kind), &out)?;
    println!("  {} {} ({} records)", "→".cyan(), out.display(), count);
    report.converted.push((kind, count));
    Ok(count)
}

/// Returns whether the input existed.
fn convert_optional(layout: &GameLayout, kind: DataKind, report: &mut GameReport) -> Result<bool> {
    let input = layout.text(kind);
    if !input.is_file() {
        println!("  {} no {}; skipping {}", "!".yellow(), kind.text_file(), kind.label());
        tracing::info!(game = %layout.game, path = %input.display(), "optional input missing");
        report.missing.push(kind);
        return Ok(false);
    }
    convert(layout, kind, report)?;
    Ok(true)
}

fn cross_check(layout: &GameLayout, report: &GameReport) -> Result<usize> {
    let was_converted = |kind: DataKind| report.converted.iter().any(|(k, _)| *k == kind);

    let mut checks = vec![(
        Check::Pokemon,
        layout.json(DataKind::Pokemon),
        Some(layout.text(DataKind::Pokemon)),
    )];
    checks.push((Check::Forms, layout.master(), None));
    for (check, kind) in [(Check::Moves, DataKind::Moves), (Check::Abilities, DataKind::Abilities)] {
        if was_converted(kind) {
            checks.push((check, layout.json(kind), Some(layout.text(kind))));
        }
    }

    let mut total = 0;
    for (check, json, txt) in checks {
        let mismatches = steps::validate(check, &json, txt.as_deref())?;
        print_mismatches(&json, &mismatches);
        total += mismatches.len();
    }
    Ok(total)
}

pub fn print_mismatches(json: &Path, mismatches: &[Mismatch]) {
    if mismatches.is_empty() {
        println!("  {} {}", "✓".green(), json.display());
        return;
    }
    println!(
        "  {} {} ({} mismatches)",
        "✗".red(),
        json.display(),
        mismatches.len()
    );
    for mismatch in mismatches {
        println!("    - {mismatch}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_game(base: &Path, game: &str, files: &[(&str, &str)]) {
        let data = base.join(game).join("data");
        fs::create_dir_all(&data).unwrap();
        for (name, text) in files {
            fs::write(data.join(name), text).unwrap();
        }
    }

    #[test]
    fn discovers_game_directories_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("vanguard")).unwrap();
        fs::create_dir_all(dir.path().join("ss2")).unwrap();
        fs::write(dir.path().join("README.txt"), "not a game").unwrap();
        assert_eq!(discover_games(dir.path()).unwrap(), vec!["ss2", "vanguard"]);
    }

    #[test]
    fn game_with_only_species_still_runs() {
        let dir = tempfile::tempdir().unwrap();
        write_game(dir.path(), "mini", &[("pokemon.txt", "[PIKACHU]\nName = Pikachu\nEvolutions = RAICHU,THUNDERSTONE,Item\n[RAICHU]\nName = Raichu\n")]);

        let report = run_game(&GameLayout::new(dir.path(), "mini"), true).unwrap();
        assert_eq!(report.converted, vec![(DataKind::Pokemon, 2)]);
        assert_eq!(report.missing.len(), 5);
        assert_eq!(report.annotated, 2);
        assert_eq!(report.mismatches, 0);
        assert!(GameLayout::new(dir.path(), "mini").master_evo().is_file());
    }

    #[test]
    fn failing_game_does_not_stop_the_run() {
        let dir = tempfile::tempdir().unwrap();
        write_game(dir.path(), "broken", &[]);
        write_game(dir.path(), "good", &[("pokemon.txt", "[EEVEE]\nName = Eevee\n")]);

        let config = PipelineConfig {
            base_dir: dir.path().to_path_buf(),
            games: Vec::new(),
            validate: false,
        };
        let summary = run(&config).unwrap();
        assert_eq!(summary.games.len(), 2);
        assert_eq!(summary.failed().collect::<Vec<_>>(), vec!["broken"]);
    }
}
