//! Folding form records into their base records.
//!
//! Forms arrive as a separate list, each naming its base through `BaseName`.
//! The merger gives every form its own `InternalName` (`BASE_1`, `BASE_2`,
//! ...), fills absent fields from the base and appends it to the base's
//! `Forms` list.

use std::collections::{HashMap, HashSet};

use dexforge_records::{Record, RecordError, RecordStore};
use serde_json::{Map, Value};

/// A form label containing this (case-insensitive) takes the `_1` slot.
pub const PRIMARY_VARIANT_MARKER: &str = "mega";

#[derive(Debug)]
pub struct MergeOutcome {
    pub store: RecordStore,
    /// Forms attached in this run.
    pub merged: usize,
    /// Forms already present on their base and left alone.
    pub unchanged: usize,
    /// Forms dropped, with the reason. None of these stop the merge.
    pub skipped: Vec<RecordError>,
}

fn is_primary(variant: &Record) -> bool {
    variant
        .form_name
        .as_deref()
        .is_some_and(|label| label.to_lowercase().contains(PRIMARY_VARIANT_MARKER))
}

/// The variant's own identifier, unless it is missing or just echoes the base.
fn own_id<'a>(variant: &'a Record, base_id: &str) -> Option<&'a str> {
    variant
        .internal_name
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty() && *id != base_id)
}

/// Content equality ignoring the identifier, for spotting re-fed forms.
fn same_form(a: &Record, b: &Record) -> bool {
    let strip = |record: &Record| {
        let mut map: Map<String, Value> = record.clone().into();
        map.remove("InternalName");
        map
    };
    strip(a) == strip(b)
}

/// Merge `variants` into `store`.
///
/// Identifier rules, in order:
/// 1. a form carrying its own identifier keeps it;
/// 2. a primary form (label contains [`PRIMARY_VARIANT_MARKER`]) takes
///    `BASE_1` while that slot is free;
/// 3. anything else takes the lowest free `BASE_N`, N counting from 1.
///
/// "Free" means not used by any store record, by any form already attached,
/// by any form assigned earlier in this call, and not the `_1` slot of a base
/// whose primary form is still waiting to be merged.
pub fn merge_variants(
    mut store: RecordStore,
    variants: impl IntoIterator<Item = Record>,
) -> MergeOutcome {
    let variants: Vec<Record> = variants.into_iter().collect();

    let mut taken: HashSet<String> = HashSet::new();
    for record in store.iter() {
        taken.extend(record.internal_name.iter().cloned());
        for form in &record.variants {
            taken.extend(form.internal_name.iter().cloned());
        }
    }

    let mut reserved: HashSet<String> = HashSet::new();
    for variant in &variants {
        let Some(base_id) = variant.base_name.as_deref() else {
            continue;
        };
        if is_primary(variant)
            && variant.base_stats.is_some()
            && store.contains(base_id)
            && own_id(variant, base_id).is_none()
        {
            let slot = format!("{base_id}_1");
            if !taken.contains(&slot) {
                reserved.insert(slot);
            }
        }
    }

    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut outcome_skipped = Vec::new();
    let mut merged = 0;
    let mut unchanged = 0;

    for mut variant in variants {
        let Some(base_id) = variant.base_name.clone() else {
            tracing::warn!(form = %variant.label(), "form has no BaseName; skipping");
            outcome_skipped.push(RecordError::malformed(variant.label(), "missing BaseName"));
            continue;
        };

        let base = match store.get_mut(&base_id) {
            Ok(base) => base,
            Err(_) => {
                tracing::warn!(form = %variant.label(), base = %base_id, "base record not found; skipping form");
                outcome_skipped.push(RecordError::not_found("base record", base_id));
                continue;
            }
        };

        if variant.base_stats.is_none() {
            tracing::warn!(form = %variant.label(), base = %base_id, "form has no BaseStats; skipping");
            outcome_skipped.push(RecordError::malformed(
                variant.label(),
                format!("missing BaseStats (base {base_id})"),
            ));
            continue;
        }

        variant.inherit_from(base);

        let id = match own_id(&variant, &base_id).map(str::to_string) {
            Some(id) => {
                if base.variants.iter().any(|f| f.internal_name.as_deref() == Some(&id)) {
                    unchanged += 1;
                    continue;
                }
                if taken.contains(&id) {
                    tracing::warn!(form = %id, base = %base_id, "form identifier already in use; skipping");
                    outcome_skipped.push(RecordError::Duplicate { id });
                    continue;
                }
                id
            }
            None => {
                if base.variants.iter().any(|f| same_form(f, &variant)) {
                    unchanged += 1;
                    continue;
                }
                let slot = format!("{base_id}_1");
                if is_primary(&variant) && reserved.remove(&slot) {
                    slot
                } else {
                    next_free_id(&base_id, &mut counters, &taken, &reserved)
                }
            }
        };

        tracing::debug!(form = %id, base = %base_id, "attaching form");
        taken.insert(id.clone());
        variant.internal_name = Some(id);
        base.variants.push(variant);
        merged += 1;
    }

    MergeOutcome {
        store,
        merged,
        unchanged,
        skipped: outcome_skipped,
    }
}

fn next_free_id(
    base_id: &str,
    counters: &mut HashMap<String, usize>,
    taken: &HashSet<String>,
    reserved: &HashSet<String>,
) -> String {
    let counter = counters.entry(base_id.to_string()).or_insert(1);
    loop {
        let candidate = format!("{base_id}_{counter}");
        *counter += 1;
        if !taken.contains(&candidate) && !reserved.contains(&candidate) {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        serde_json::from_value(value).expect("record")
    }

    fn form(base: &str, label: &str) -> Record {
        record(json!({
            "BaseName": base,
            "FormName": label,
            "BaseStats": ["1", "2", "3", "4", "5", "6"]
        }))
    }

    fn ids(store: &RecordStore, base: &str) -> Vec<String> {
        store
            .get(base)
            .unwrap()
            .variants
            .iter()
            .filter_map(|f| f.internal_name.clone())
            .collect()
    }

    fn rocka_store() -> RecordStore {
        RecordStore::load([record(json!({
            "InternalName": "ROCKA",
            "Name": "Rocka",
            "Type1": "ROCK",
            "BaseStats": ["9", "9", "9", "9", "9", "9"]
        }))])
        .unwrap()
    }

    #[test]
    fn mega_takes_first_slot() {
        let out = merge_variants(rocka_store(), [form("ROCKA", "Mega Rocka"), form("ROCKA", "")]);
        assert_eq!(ids(&out.store, "ROCKA"), vec!["ROCKA_1", "ROCKA_2"]);
        assert_eq!(out.merged, 2);
        assert!(out.skipped.is_empty());
    }

    #[test]
    fn mega_slot_is_reserved_even_when_listed_last() {
        let out = merge_variants(
            rocka_store(),
            [form("ROCKA", "Alt"), form("ROCKA", "Other"), form("ROCKA", "MEGA ROCKA")],
        );
        assert_eq!(ids(&out.store, "ROCKA"), vec!["ROCKA_2", "ROCKA_3", "ROCKA_1"]);
    }

    #[test]
    fn second_mega_falls_back_to_counter() {
        let out = merge_variants(
            rocka_store(),
            [form("ROCKA", "Mega Rocka X"), form("ROCKA", "Mega Rocka Y")],
        );
        assert_eq!(ids(&out.store, "ROCKA"), vec!["ROCKA_1", "ROCKA_2"]);
    }

    #[test]
    fn generic_forms_count_without_gaps() {
        let out = merge_variants(
            rocka_store(),
            [form("ROCKA", "A"), form("ROCKA", "B"), form("ROCKA", "C")],
        );
        assert_eq!(ids(&out.store, "ROCKA"), vec!["ROCKA_1", "ROCKA_2", "ROCKA_3"]);
    }

    #[test]
    fn counter_skips_identifiers_used_elsewhere() {
        let mut store = rocka_store();
        store.insert(Record::new("ROCKA_1")).unwrap();
        let out = merge_variants(store, [form("ROCKA", "A"), form("ROCKA", "B")]);
        assert_eq!(ids(&out.store, "ROCKA"), vec!["ROCKA_2", "ROCKA_3"]);
    }

    #[test]
    fn unknown_base_and_missing_stats_are_skipped() {
        let mut statless = form("ROCKA", "Statless");
        statless.base_stats = None;

        let out = merge_variants(
            rocka_store(),
            [form("NOBODY", "Ghost"), statless, form("ROCKA", "Kept")],
        );

        assert_eq!(ids(&out.store, "ROCKA"), vec!["ROCKA_1"]);
        assert_eq!(out.skipped.len(), 2);
        assert!(matches!(out.skipped[0], RecordError::NotFound { .. }));
        assert!(matches!(out.skipped[1], RecordError::Malformed { .. }));
    }

    #[test]
    fn form_inherits_absent_fields_only() {
        let mut steel = form("ROCKA", "Steel");
        steel.extra.insert("Type1".to_string(), json!("STEEL"));
        let out = merge_variants(rocka_store(), [steel]);

        let base = out.store.get("ROCKA").unwrap();
        let merged = &base.variants[0];
        assert_eq!(merged.extra.get("Type1"), Some(&json!("STEEL")));
        assert_eq!(merged.name.as_deref(), Some("Rocka"));
        assert_eq!(merged.base_stats.as_ref().unwrap()[0], "1");
    }

    #[test]
    fn identifier_echoing_the_base_is_replaced() {
        let mut echo = form("ROCKA", "Alt");
        echo.internal_name = Some("ROCKA".to_string());
        let out = merge_variants(rocka_store(), [echo]);
        assert_eq!(ids(&out.store, "ROCKA"), vec!["ROCKA_1"]);
    }

    #[test]
    fn refeeding_the_same_forms_changes_nothing() {
        let forms = vec![form("ROCKA", "Mega Rocka"), form("ROCKA", "Alt")];
        let first = merge_variants(rocka_store(), forms.clone());
        let snapshot = first.store.clone();

        let second = merge_variants(first.store, forms);
        assert_eq!(second.merged, 0);
        assert_eq!(second.unchanged, 2);
        assert_eq!(second.store, snapshot);
    }

    #[test]
    fn own_identifier_is_kept() {
        let mut named = form("ROCKA", "Alt");
        named.internal_name = Some("ROCKA_ALOLA".to_string());
        let out = merge_variants(rocka_store(), [named, form("ROCKA", "Other")]);
        assert_eq!(ids(&out.store, "ROCKA"), vec!["ROCKA_ALOLA", "ROCKA_1"]);
    }
}
