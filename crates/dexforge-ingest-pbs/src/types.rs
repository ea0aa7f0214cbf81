//! `types.txt` → type objects.

use serde_json::{Map, Value};

use crate::sections::{parse_sections, Section};
use crate::values::{int_or_text, token_list};

const INT_FIELDS: [&str; 2] = ["TypeID", "Effectiveness"];
const LIST_FIELDS: [&str; 3] = ["Weaknesses", "Resistances", "Immunities"];
const DROPPED: [&str; 1] = ["IconPosition"];

pub fn convert(text: &str) -> Vec<Map<String, Value>> {
    parse_sections(text).iter().map(convert_section).collect()
}

fn convert_section(section: &Section) -> Map<String, Value> {
    let context = section.header.as_deref().unwrap_or("<unnamed type>");
    let mut out = Map::new();
    if !section.has("Name") {
        if let Some(header) = &section.header {
            out.insert("Name".to_string(), Value::String(header.to_uppercase()));
        }
    }
    for (key, value) in &section.fields {
        let key = key.as_str();
        if DROPPED.contains(&key) {
            continue;
        }
        let converted = if key == "Name" {
            Value::String(value.to_uppercase())
        } else if INT_FIELDS.contains(&key) {
            int_or_text(context, key, value)
        } else if LIST_FIELDS.contains(&key) {
            token_list(value)
        } else {
            Value::String(value.clone())
        };
        out.insert(key.to_string(), converted);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_type_relationships() {
        let text = "[FIRE]
Name = Fire
IconPosition = 10
SpecialType = true
Weaknesses = WATER, GROUND,ROCK
Resistances = BUG,STEEL,FIRE,GRASS,ICE,FAIRY
";
        let out = convert(text);
        assert_eq!(
            Value::Object(out[0].clone()),
            json!({
                "Name": "FIRE",
                "SpecialType": "true",
                "Weaknesses": ["WATER", "GROUND", "ROCK"],
                "Resistances": ["BUG", "STEEL", "FIRE", "GRASS", "ICE", "FAIRY"]
            })
        );
    }

    #[test]
    fn header_is_the_name_when_absent() {
        let out = convert("[water]\nTypeID = 11\n");
        assert_eq!(out[0].get("Name"), Some(&json!("WATER")));
        assert_eq!(out[0].get("TypeID"), Some(&json!(11)));
    }

    #[test]
    fn empty_immunities_list() {
        let out = convert("[NORMAL]\nImmunities = \n");
        assert_eq!(out[0].get("Immunities"), Some(&json!([])));
    }
}
