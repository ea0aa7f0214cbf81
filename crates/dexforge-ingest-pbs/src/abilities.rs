//! `abilities.txt` → ability objects. All values stay text.

use serde_json::{Map, Value};

use crate::sections::parse_sections;

pub fn convert(text: &str) -> Vec<Map<String, Value>> {
    let mut abilities = Vec::new();
    for section in parse_sections(text) {
        let Some(header) = section.header else {
            tracing::warn!(line = section.line, "ability section has no header; skipping");
            continue;
        };
        let mut out = Map::new();
        out.insert("Name".to_string(), Value::String(header));
        for (key, value) in section.fields {
            out.insert(key, Value::String(value));
        }
        abilities.push(out);
    }
    abilities
}
