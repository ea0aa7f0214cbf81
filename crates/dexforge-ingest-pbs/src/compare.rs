//! Cross-validation of converted JSON against its source text.
//!
//! Every check returns the full list of [`Mismatch`]es; an empty list means
//! the JSON faithfully reflects the text.

use std::collections::HashMap;
use std::fmt;

use dexforge_records::record::{FORMS, INTERNAL_NAME, NAME};
use dexforge_records::Record;
use serde_json::{Map, Value};

use crate::pokemon::section_id;
use crate::sections::{parse_sections, Section};
use crate::values::value_text;

/// Keys a merged/annotated species may carry that the text never has.
const OPTIONAL_SPECIES_KEYS: [&str; 2] = [FORMS, "EvolutionLine"];
const SKIPPED_MOVE_PREFIXES: [&str; 2] = ["hiddenpower", "balancerchange"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// A JSON record has no section in the text.
    MissingInText { record: String },
    /// A text section has no JSON record.
    MissingInJson { record: String },
    Field {
        record: String,
        key: String,
        json: String,
        text: String,
    },
    OnlyInJson { record: String, key: String },
    OnlyInText { record: String, key: String },
    MissingFormName { record: String },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::MissingInText { record } => {
                write!(f, "'{record}' is present in JSON but not found in the text file")
            }
            Mismatch::MissingInJson { record } => {
                write!(f, "'{record}' is present in the text file but not found in JSON")
            }
            Mismatch::Field {
                record,
                key,
                json,
                text,
            } => write!(f, "{record}: '{key}' differs (json: {json}, txt: {text})"),
            Mismatch::OnlyInJson { record, key } => {
                write!(f, "{record}: '{key}' is present in JSON but missing in the text file")
            }
            Mismatch::OnlyInText { record, key } => {
                write!(f, "{record}: '{key}' is present in the text file but missing in JSON")
            }
            Mismatch::MissingFormName { record } => write!(f, "form '{record}' has no FormName"),
        }
    }
}

/// Lowercase and keep only `[a-z0-9]`.
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

// ---------------------------------------------------------------------------
// Species
// ---------------------------------------------------------------------------

pub fn compare_pokemon(json: &[Map<String, Value>], text: &str) -> Vec<Mismatch> {
    let sections = parse_sections(text);
    let by_id: HashMap<String, &Section> = sections
        .iter()
        .filter_map(|s| section_id(s).map(|id| (id, s)))
        .collect();

    let mut mismatches = Vec::new();
    for record in json {
        let Some(id) = record.get(INTERNAL_NAME).and_then(Value::as_str) else {
            mismatches.push(Mismatch::MissingInText {
                record: "<no InternalName>".to_string(),
            });
            continue;
        };
        let Some(section) = by_id.get(id) else {
            mismatches.push(Mismatch::MissingInText {
                record: id.to_string(),
            });
            continue;
        };
        compare_species(id, record, section, &mut mismatches);
    }
    mismatches
}

fn compare_species(id: &str, json: &Map<String, Value>, section: &Section, out: &mut Vec<Mismatch>) {
    let field = |key: &str, json: &Value, text: &str| Mismatch::Field {
        record: id.to_string(),
        key: key.to_string(),
        json: value_text(json),
        text: text.to_string(),
    };

    for (key, value) in json {
        let key = key.as_str();
        if key == "Type1" || key == "Type2" {
            continue;
        }
        if OPTIONAL_SPECIES_KEYS.contains(&key) || (key == INTERNAL_NAME && !section.has(key)) {
            continue;
        }
        match section.get(key) {
            Some(text) if !species_field_matches(key, value, text) => out.push(field(key, value, text)),
            Some(_) => {}
            None => out.push(Mismatch::OnlyInJson {
                record: id.to_string(),
                key: key.to_string(),
            }),
        }
    }

    match (section.get("Types"), json_types(json)) {
        (Some(text), Some(types)) => {
            let mut expected: Vec<&str> = text.split(',').map(str::trim).filter(|t| !t.is_empty()).collect();
            let mut actual: Vec<&str> = types.iter().map(String::as_str).collect();
            expected.sort_unstable();
            actual.sort_unstable();
            if expected != actual {
                out.push(Mismatch::Field {
                    record: id.to_string(),
                    key: "Types".to_string(),
                    json: types.join(","),
                    text: text.to_string(),
                });
            }
        }
        (Some(_), None) => out.push(Mismatch::OnlyInText {
            record: id.to_string(),
            key: "Types".to_string(),
        }),
        (None, Some(_)) => out.push(Mismatch::OnlyInJson {
            record: id.to_string(),
            key: "Type1".to_string(),
        }),
        (None, None) => {}
    }

    let mut seen = Vec::new();
    for (key, _) in &section.fields {
        let key = key.as_str();
        if key == "Types" || seen.contains(&key) {
            continue;
        }
        seen.push(key);
        if !json.contains_key(key) && !OPTIONAL_SPECIES_KEYS.contains(&key) {
            out.push(Mismatch::OnlyInText {
                record: id.to_string(),
                key: key.to_string(),
            });
        }
    }
}

fn json_types(json: &Map<String, Value>) -> Option<Vec<String>> {
    let types: Vec<String> = ["Type1", "Type2"]
        .iter()
        .filter_map(|k| json.get(*k))
        .map(value_text)
        .collect();
    (!types.is_empty()).then_some(types)
}

fn species_field_matches(key: &str, json: &Value, text: &str) -> bool {
    let text = text.trim();
    match json {
        _ if key == NAME => value_text(json).trim().eq_ignore_ascii_case(text),
        Value::Array(items) => {
            let text_items: Vec<&str> = text.split(',').map(str::trim).collect();
            items.len() == text_items.len()
                && items
                    .iter()
                    .zip(&text_items)
                    .all(|(j, t)| value_text(j).trim() == *t)
        }
        Value::Number(n) => match (n.as_f64(), text.parse::<f64>()) {
            (Some(j), Ok(t)) => j == t,
            _ => false,
        },
        _ => value_text(json).trim() == text,
    }
}

/// Every variant of every record must carry a non-empty `FormName`.
pub fn check_forms(records: &[Record]) -> Vec<Mismatch> {
    records
        .iter()
        .flat_map(|r| r.variants.iter())
        .filter(|v| v.form_name.as_deref().map_or(true, |n| n.trim().is_empty()))
        .map(|v| Mismatch::MissingFormName {
            record: v.label().to_string(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Moves and abilities
// ---------------------------------------------------------------------------

/// A value reduced to what both sides can agree on.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Normalized {
    Int(i64),
    Text(String),
    List(Vec<String>),
    Missing,
}

impl fmt::Display for Normalized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalized::Int(n) => write!(f, "{n}"),
            Normalized::Text(s) => write!(f, "{s}"),
            Normalized::List(items) => write!(f, "[{}]", items.join(", ")),
            Normalized::Missing => write!(f, "<missing>"),
        }
    }
}

fn normalize_text(raw: &str) -> Normalized {
    match raw.trim().parse::<i64>() {
        Ok(n) => Normalized::Int(n),
        Err(_) => Normalized::Text(normalize_name(raw)),
    }
}

fn normalize_list<'a>(items: impl Iterator<Item = &'a str>) -> Normalized {
    let mut items: Vec<String> = items
        .map(normalize_name)
        .filter(|i| !i.is_empty())
        .collect();
    items.sort();
    Normalized::List(items)
}

fn normalize_json(value: Option<&Value>) -> Normalized {
    match value {
        None | Some(Value::Null) => Normalized::Missing,
        Some(Value::String(s)) => normalize_text(s),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Normalized::Int)
            .unwrap_or_else(|| Normalized::Text(n.to_string())),
        Some(Value::Array(items)) => {
            let texts: Vec<String> = items.iter().map(value_text).collect();
            normalize_list(texts.iter().map(String::as_str))
        }
        Some(other) => Normalized::Text(normalize_name(&other.to_string())),
    }
}

struct NamedComparison<'a> {
    list_keys: &'a [&'a str],
    /// Keys whose absence on the JSON side reads as `0`.
    zero_default_keys: &'a [&'a str],
    skipped_prefixes: &'a [&'a str],
}

impl NamedComparison<'_> {
    fn run(&self, json: &[Map<String, Value>], text: &str) -> Vec<Mismatch> {
        let json_by_name: HashMap<String, &Map<String, Value>> = json
            .iter()
            .filter_map(|m| m.get(NAME).and_then(Value::as_str).map(|n| (normalize_name(n), m)))
            .collect();

        let mut mismatches = Vec::new();
        for section in parse_sections(text) {
            let Some(header) = section.header.as_deref() else {
                continue;
            };
            let name = normalize_name(header);
            if self.skipped_prefixes.iter().any(|p| name.starts_with(p)) {
                continue;
            }
            let Some(record) = json_by_name.get(&name) else {
                mismatches.push(Mismatch::MissingInJson {
                    record: header.to_string(),
                });
                continue;
            };

            for (key, raw) in &section.fields {
                let key = key.as_str();
                let text_value = if self.list_keys.contains(&key) {
                    normalize_list(raw.split(','))
                } else {
                    normalize_text(raw)
                };
                let mut json_value = normalize_json(record.get(key));
                if json_value == Normalized::Missing && self.zero_default_keys.contains(&key) {
                    json_value = Normalized::Int(0);
                }
                if json_value != text_value {
                    mismatches.push(Mismatch::Field {
                        record: header.to_string(),
                        key: key.to_string(),
                        json: json_value.to_string(),
                        text: text_value.to_string(),
                    });
                }
            }
        }
        mismatches
    }
}

/// Moves are matched by normalized name. `Flags` compare as a set and a
/// missing `Priority` reads as `0`.
pub fn compare_moves(json: &[Map<String, Value>], text: &str) -> Vec<Mismatch> {
    NamedComparison {
        list_keys: &["Flags"],
        zero_default_keys: &["Priority"],
        skipped_prefixes: &SKIPPED_MOVE_PREFIXES,
    }
    .run(json, text)
}

pub fn compare_abilities(json: &[Map<String, Value>], text: &str) -> Vec<Mismatch> {
    NamedComparison {
        list_keys: &[],
        zero_default_keys: &[],
        skipped_prefixes: &[],
    }
    .run(json, text)
}
