//! `pokemon_forms.txt` → variant objects.
//!
//! Each section is headed `[BASE,N]`. The output carries `BaseName` and
//! `FormName` first; everything else goes through the species coercions.
//! Inheritance from the base species happens later, in the merger.

use serde_json::{Map, Value};

use crate::pokemon::coerce_species_field;
use crate::sections::{parse_sections, Section};

pub fn convert(text: &str) -> Vec<Map<String, Value>> {
    parse_sections(text)
        .iter()
        .filter_map(convert_section)
        .collect()
}

fn convert_section(section: &Section) -> Option<Map<String, Value>> {
    let Some(header) = section.header.as_deref() else {
        tracing::warn!(line = section.line, "form section has no [BASE,N] header; skipping");
        return None;
    };
    let (base, number) = match header.split_once(',') {
        Some((base, number)) => (base.trim(), Some(number.trim())),
        None => (header.trim(), None),
    };

    let mut out = Map::new();
    out.insert("BaseName".to_string(), Value::String(base.to_string()));
    out.insert("FormName".to_string(), Value::String(default_form_name(base, number)));

    for (key, value) in &section.fields {
        coerce_species_field(&mut out, header, key, value);
    }
    Some(out)
}

fn default_form_name(base: &str, number: Option<&str>) -> String {
    match number.filter(|n| !n.is_empty()) {
        Some(n) => format!("{base} Form {n}"),
        None => format!("{base} Form"),
    }
}
