//! Base stat totals for fully evolved species.
//!
//! A quick balance figure for a merged dataset: the mean stat total of every
//! final-stage species and its forms, leaving out the strongest few so a
//! handful of legendaries do not drag the number up.

use dexforge_records::{Record, RecordStore};

use crate::transitions::parse_transitions;

/// How many of the highest totals [`stat_summary`] leaves out by default.
pub const DEFAULT_EXCLUDED_TOP: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatTotal {
    /// `Name`, or `Name (FormName)` for a form.
    pub label: String,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatSummary {
    /// Highest first.
    pub totals: Vec<StatTotal>,
    pub excluded: usize,
    /// Mean over `totals` after the excluded ones; 0 when none remain.
    pub average: f64,
}

/// Stat totals of every species with no outgoing transitions, followed by its
/// forms, in store order. Entries whose stats are missing or not integers are
/// skipped with a warning.
pub fn final_stage_totals(store: &RecordStore) -> Vec<StatTotal> {
    let mut totals = Vec::new();
    for record in store.iter() {
        if !parse_transitions(record.evolutions.as_deref()).is_empty() {
            continue;
        }
        let name = record.name.as_deref().unwrap_or(record.label());
        push_total(&mut totals, record, name.to_string());
        for form in &record.variants {
            let label = match form.form_name.as_deref() {
                Some(form_name) => format!("{name} ({form_name})"),
                None => form.label().to_string(),
            };
            push_total(&mut totals, form, label);
        }
    }
    totals
}

fn push_total(totals: &mut Vec<StatTotal>, record: &Record, label: String) {
    match record.stat_total() {
        Some(total) => totals.push(StatTotal { label, total }),
        None => tracing::warn!(record = %label, "no usable BaseStats; left out of the totals"),
    }
}

/// Sort the final-stage totals highest first and average all but the top
/// `exclude_top`.
pub fn stat_summary(store: &RecordStore, exclude_top: usize) -> StatSummary {
    let mut totals = final_stage_totals(store);
    totals.sort_by(|a, b| b.total.cmp(&a.total));

    let rest = totals.get(exclude_top..).unwrap_or_default();
    let average = if rest.is_empty() {
        0.0
    } else {
        rest.iter().map(|t| t.total as f64).sum::<f64>() / rest.len() as f64
    };
    StatSummary {
        excluded: exclude_top.min(totals.len()),
        average,
        totals,
    }
}
