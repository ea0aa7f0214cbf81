//! `moves.txt` → move objects.

use serde_json::{Map, Value};

use crate::sections::{parse_sections, Section};
use crate::values::{int_or_text, token_list};

const INT_FIELDS: [&str; 5] = ["Power", "Accuracy", "TotalPP", "Priority", "EffectChance"];

pub fn convert(text: &str) -> Vec<Map<String, Value>> {
    parse_sections(text)
        .iter()
        .filter_map(convert_section)
        .collect()
}

fn convert_section(section: &Section) -> Option<Map<String, Value>> {
    let Some(header) = section.header.as_deref() else {
        tracing::warn!(line = section.line, "move section has no header; skipping");
        return None;
    };

    let mut out = Map::new();
    for (key, value) in &section.fields {
        let converted = if INT_FIELDS.contains(&key.as_str()) {
            int_or_text(header, key, value)
        } else if key == "Flags" {
            token_list(value)
        } else {
            Value::String(value.clone())
        };
        out.insert(key.clone(), converted);
    }
    // The header is the move's identifier; a `Name` key keeps its position.
    out.insert("Name".to_string(), Value::String(header.to_string()));
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TACKLE: &str = "#-------------------------------
[TACKLE]
Name = Tackle
Type = NORMAL
Category = Physical
Power = 40
Accuracy = 100
TotalPP = 35
Flags = Contact, CanProtect,,CanMirrorMove
";

    #[test]
    fn converts_numbers_and_flags() {
        let out = convert(TACKLE);
        assert_eq!(
            Value::Object(out[0].clone()),
            json!({
                "Name": "TACKLE",
                "Type": "NORMAL",
                "Category": "Physical",
                "Power": 40,
                "Accuracy": 100,
                "TotalPP": 35,
                "Flags": ["Contact", "CanProtect", "CanMirrorMove"]
            })
        );
        assert_eq!(out[0].keys().next().map(String::as_str), Some("Name"));
    }

    #[test]
    fn name_is_appended_when_absent() {
        let out = convert("[GROWL]\nPower = 0\n");
        let keys: Vec<&str> = out[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Power", "Name"]);
    }

    #[test]
    fn headerless_section_is_skipped() {
        assert!(convert("Power = 10\n").is_empty());
    }
}
