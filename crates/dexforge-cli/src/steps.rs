//! File-level operations shared by the subcommands and the game runner.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use dexforge_evolution::{
    merge_variants, resolve_evolutions, stat_summary, EvolutionReport, MergeOutcome, StatSummary,
};
use dexforge_ingest_pbs::compare::{check_forms, compare_abilities, compare_moves, compare_pokemon};
use dexforge_ingest_pbs::{DataKind, Mismatch};
use dexforge_records::persist::{read_objects, read_records, write_json, write_records};
use dexforge_records::{Record, RecordError, RecordStore};
use serde_json::{Map, Value};

/// Which cross-check `validate` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Pokemon,
    /// Every variant in a merged file has a `FormName`.
    Forms,
    Moves,
    Abilities,
}

/// Convert one text file and write the JSON array. Returns the object count.
pub fn ingest(kind: DataKind, input: &Path, out: &Path) -> Result<usize> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let objects = dexforge_ingest_pbs::convert(kind, &text)
        .with_context(|| format!("converting {}", input.display()))?;
    write_json(out, &objects)?;
    tracing::debug!(kind = kind.label(), count = objects.len(), path = %out.display(), "wrote converted file");
    Ok(objects.len())
}

/// Read a record array, logging and dropping objects that do not form a
/// record. Only file-level problems are errors.
fn read_batch(path: &Path) -> Result<Vec<Record>> {
    let (records, problems) = read_records(path)?;
    log_rejected(path, &problems);
    Ok(records)
}

/// Load a base array leniently: malformed, id-less or duplicate records are
/// logged and the rest of the file still loads.
fn load_store(path: &Path) -> Result<RecordStore> {
    let (store, problems) = RecordStore::load_lenient(read_batch(path)?);
    log_rejected(path, &problems);
    Ok(store)
}

fn log_rejected(path: &Path, problems: &[RecordError]) {
    for error in problems {
        tracing::warn!(path = %path.display(), %error, "record rejected while loading");
    }
}

/// Merge the forms file (when given) into the base file and write the result.
pub fn merge(base: &Path, forms: Option<&Path>, out: &Path) -> Result<MergeOutcome> {
    let store = load_store(base)?;
    let variants = match forms {
        Some(path) => read_batch(path)?,
        None => Vec::new(),
    };
    let outcome = merge_variants(store, variants);
    write_records(out, outcome.store.all())?;
    Ok(outcome)
}

/// Annotate every record of `input` with its evolution line and write `out`.
pub fn evolve(input: &Path, out: &Path) -> Result<EvolutionReport> {
    let mut store = load_store(input)?;
    let report = resolve_evolutions(&mut store);
    write_records(out, store.all())?;
    Ok(report)
}

/// Stat-total summary of a merged file.
pub fn stats(input: &Path, exclude_top: usize) -> Result<StatSummary> {
    let store = load_store(input)?;
    Ok(stat_summary(&store, exclude_top))
}

/// Cross-check a JSON file. `txt` is ignored by [`Check::Forms`].
pub fn validate(check: Check, json: &Path, txt: Option<&Path>) -> Result<Vec<Mismatch>> {
    let compare: fn(&[Map<String, Value>], &str) -> Vec<Mismatch> = match check {
        Check::Forms => return Ok(check_forms(&read_batch(json)?)),
        Check::Pokemon => compare_pokemon,
        Check::Moves => compare_moves,
        Check::Abilities => compare_abilities,
    };

    let txt = txt.context("this check needs the source text file")?;
    let text = fs::read_to_string(txt).with_context(|| format!("reading {}", txt.display()))?;
    let objects = read_objects(json)?;
    Ok(compare(&objects, &text))
}
