//! Structured entity record.
//!
//! The converted JSON objects carry dozens of format-specific keys. Only a
//! handful matter to the merge/evolution passes; those are lifted into named
//! fields, everything else rides along untouched in [`Record::extra`].
//!
//! Key order is part of the output contract. A record remembers the order its
//! keys arrived in and writes them back in that order; named fields that were
//! absent on input and set later (an assigned `InternalName`, `Forms`,
//! `EvolutionLine`) are appended after the original keys.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RecordError;

pub const INTERNAL_NAME: &str = "InternalName";
pub const NAME: &str = "Name";
pub const BASE_NAME: &str = "BaseName";
pub const FORM_NAME: &str = "FormName";
pub const EVOLUTIONS: &str = "Evolutions";
pub const BASE_STATS: &str = "BaseStats";
pub const FORMS: &str = "Forms";
pub const EVOLUTION_LINE: &str = "EvolutionLine";

/// Named keys in the order they are appended when absent from the input.
const NAMED_KEYS: [&str; 8] = [
    INTERNAL_NAME,
    NAME,
    BASE_NAME,
    FORM_NAME,
    EVOLUTIONS,
    BASE_STATS,
    FORMS,
    EVOLUTION_LINE,
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Record {
    /// Unique identifier. Immutable once the record is in a store.
    pub internal_name: Option<String>,
    pub name: Option<String>,
    /// Variants only: `InternalName` of the base entity.
    pub base_name: Option<String>,
    /// Variants only: display label, e.g. "Mega Rocka".
    pub form_name: Option<String>,
    /// Raw transition encoding: `TARGET,param,Method,TARGET,param,Method,...`
    pub evolutions: Option<String>,
    /// Stat vector exactly as it arrived: an array of numbers or numeric
    /// strings, or one comma-separated string. See [`Record::stat_values`].
    pub base_stats: Option<Value>,
    pub variants: Vec<Record>,
    pub evolution_line: Option<String>,
    /// Every key not lifted into a named field, in input order.
    pub extra: Map<String, Value>,
    key_order: Vec<String>,
}

impl Record {
    pub fn new(internal_name: impl Into<String>) -> Self {
        Self {
            internal_name: Some(internal_name.into()),
            ..Self::default()
        }
    }

    /// Best human-readable handle for diagnostics.
    pub fn label(&self) -> &str {
        self.internal_name
            .as_deref()
            .or(self.form_name.as_deref())
            .or(self.name.as_deref())
            .unwrap_or("<unnamed>")
    }

    pub fn has_field(&self, key: &str) -> bool {
        match key {
            INTERNAL_NAME => self.internal_name.is_some(),
            NAME => self.name.is_some(),
            BASE_NAME => self.base_name.is_some(),
            FORM_NAME => self.form_name.is_some(),
            EVOLUTIONS => self.evolutions.is_some(),
            BASE_STATS => self.base_stats.is_some(),
            FORMS => !self.variants.is_empty(),
            EVOLUTION_LINE => self.evolution_line.is_some(),
            _ => self.extra.contains_key(key),
        }
    }

    /// Field-level fallback: copy every field `base` has and `self` lacks.
    ///
    /// Values are copied whole (no deep merge). The identifier, the variant
    /// list and the rendered chain are never inherited.
    pub fn inherit_from(&mut self, base: &Record) {
        if self.name.is_none() {
            self.name.clone_from(&base.name);
        }
        if self.base_name.is_none() {
            self.base_name.clone_from(&base.base_name);
        }
        if self.form_name.is_none() {
            self.form_name.clone_from(&base.form_name);
        }
        if self.evolutions.is_none() {
            self.evolutions.clone_from(&base.evolutions);
        }
        if self.base_stats.is_none() {
            self.base_stats.clone_from(&base.base_stats);
        }

        for (key, value) in &base.extra {
            if !self.extra.contains_key(key) {
                self.extra.insert(key.clone(), value.clone());
            }
        }
    }

    /// `BaseStats` as text entries, whichever representation the input used.
    pub fn stat_values(&self) -> Option<Vec<String>> {
        match self.base_stats.as_ref()? {
            Value::String(s) => Some(s.split(',').map(|v| v.trim().to_string()).collect()),
            Value::Array(items) => Some(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.trim().to_string(),
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Sum of the stat vector; `None` when absent or not all entries are
    /// integers.
    pub fn stat_total(&self) -> Option<u64> {
        self.stat_values()?
            .iter()
            .map(|v| v.parse::<u64>().ok())
            .sum()
    }

    fn named_value(&self, key: &str) -> Option<Value> {
        match key {
            INTERNAL_NAME => self.internal_name.clone().map(Value::String),
            NAME => self.name.clone().map(Value::String),
            BASE_NAME => self.base_name.clone().map(Value::String),
            FORM_NAME => self.form_name.clone().map(Value::String),
            EVOLUTIONS => self.evolutions.clone().map(Value::String),
            BASE_STATS => self.base_stats.clone(),
            FORMS => {
                if self.variants.is_empty() {
                    None
                } else {
                    Some(Value::Array(
                        self.variants
                            .iter()
                            .cloned()
                            .map(|v| Value::Object(v.into()))
                            .collect(),
                    ))
                }
            }
            EVOLUTION_LINE => self.evolution_line.clone().map(Value::String),
            _ => None,
        }
    }
}

impl TryFrom<Map<String, Value>> for Record {
    type Error = RecordError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let context = map
            .get(INTERNAL_NAME)
            .or_else(|| map.get(FORM_NAME))
            .or_else(|| map.get(NAME))
            .and_then(Value::as_str)
            .unwrap_or("<unnamed>")
            .to_string();

        let mut record = Record::default();
        for (key, value) in map {
            match key.as_str() {
                INTERNAL_NAME => record.internal_name = string_field(&context, &key, value)?,
                NAME => record.name = string_field(&context, &key, value)?,
                BASE_NAME => record.base_name = string_field(&context, &key, value)?,
                FORM_NAME => record.form_name = string_field(&context, &key, value)?,
                EVOLUTIONS => record.evolutions = string_field(&context, &key, value)?,
                EVOLUTION_LINE => record.evolution_line = string_field(&context, &key, value)?,
                BASE_STATS => record.base_stats = stats_field(&context, value)?,
                FORMS => record.variants = variants_field(&context, value)?,
                _ => {
                    record.key_order.push(key.clone());
                    record.extra.insert(key, value);
                    continue;
                }
            }
            record.key_order.push(key);
        }
        Ok(record)
    }
}

impl From<Record> for Map<String, Value> {
    fn from(record: Record) -> Self {
        let mut out = Map::new();
        for key in &record.key_order {
            if NAMED_KEYS.contains(&key.as_str()) {
                if let Some(value) = record.named_value(key) {
                    out.insert(key.clone(), value);
                }
            } else if let Some(value) = record.extra.get(key) {
                out.insert(key.clone(), value.clone());
            }
        }
        for key in NAMED_KEYS {
            if out.contains_key(key) {
                continue;
            }
            if let Some(value) = record.named_value(key) {
                out.insert(key.to_string(), value);
            }
        }
        for (key, value) in record.extra {
            if !out.contains_key(&key) {
                out.insert(key, value);
            }
        }
        out
    }
}

fn string_field(context: &str, key: &str, value: Value) -> Result<Option<String>, RecordError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        other => Err(RecordError::malformed(
            context,
            format!("'{key}' must be a string, got {other}"),
        )),
    }
}

fn stats_field(context: &str, value: Value) -> Result<Option<Value>, RecordError> {
    match &value {
        Value::Null => return Ok(None),
        // Some exports keep the raw comma-separated line.
        Value::String(_) => return Ok(Some(value)),
        Value::Array(items) => {
            if let Some(bad) = items
                .iter()
                .find(|item| !matches!(item, Value::String(_) | Value::Number(_)))
            {
                return Err(RecordError::malformed(
                    context,
                    format!("'{BASE_STATS}' entries must be numbers, got {bad}"),
                ));
            }
        }
        other => {
            return Err(RecordError::malformed(
                context,
                format!("'{BASE_STATS}' must be a list, got {other}"),
            ))
        }
    }
    Ok(Some(value))
}

fn variants_field(context: &str, value: Value) -> Result<Vec<Record>, RecordError> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => {
            return Err(RecordError::malformed(
                context,
                format!("'{FORMS}' must be a list, got {other}"),
            ))
        }
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => Record::try_from(map),
            other => Err(RecordError::malformed(
                context,
                format!("'{FORMS}' entries must be objects, got {other}"),
            )),
        })
        .collect()
}
