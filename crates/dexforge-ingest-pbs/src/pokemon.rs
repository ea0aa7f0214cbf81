//! `pokemon.txt` → species objects.

use serde_json::{Map, Value};

use crate::sections::{parse_sections, Section};
use crate::values::{comma_list, float_or_text, int_or_text, split_types};

pub(crate) const LIST_FIELDS: [&str; 5] = ["BaseStats", "EffortPoints", "Moves", "TutorMoves", "EggMoves"];
pub(crate) const FLOAT_FIELDS: [&str; 2] = ["Height", "Weight"];
pub(crate) const INT_FIELDS: [&str; 4] = ["BaseEXP", "Rareness", "Happiness", "Generation"];

pub fn convert(text: &str) -> Vec<Map<String, Value>> {
    parse_sections(text)
        .iter()
        .filter_map(convert_section)
        .collect()
}

/// The species identifier: the `InternalName` key when present (older files
/// number their headers), otherwise the header.
pub(crate) fn section_id(section: &Section) -> Option<String> {
    section
        .get("InternalName")
        .or(section.header.as_deref())
        .map(str::to_string)
        .filter(|id| !id.is_empty())
}

fn convert_section(section: &Section) -> Option<Map<String, Value>> {
    let Some(id) = section_id(section) else {
        tracing::warn!(line = section.line, "species section has no identifier; skipping");
        return None;
    };

    let mut out = Map::new();
    if !section.has("InternalName") {
        out.insert("InternalName".to_string(), Value::String(id.clone()));
    }
    for (key, value) in &section.fields {
        coerce_species_field(&mut out, &id, key, value);
    }
    Some(out)
}

/// Field coercions shared with the forms converter.
pub(crate) fn coerce_species_field(out: &mut Map<String, Value>, id: &str, key: &str, value: &str) {
    if key == "Types" {
        split_types(out, value);
        return;
    }

    let converted = if key == "Name" {
        Value::String(value.to_uppercase())
    } else if LIST_FIELDS.contains(&key) {
        comma_list(value)
    } else if FLOAT_FIELDS.contains(&key) {
        float_or_text(id, key, value)
    } else if INT_FIELDS.contains(&key) {
        int_or_text(id, key, value)
    } else {
        Value::String(value.to_string())
    };
    out.insert(key.to_string(), converted);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_species_with_coercions() {
        let text = "#-------------------------------
[BULBASAUR]
Name = Bulbasaur
Types = GRASS,POISON
BaseStats = 45,49,49,45,65,65
Height = 0.7
Generation = 1
Evolutions = IVYSAUR,,Level
";
        let out = convert(text);
        assert_eq!(out.len(), 1);
        assert_eq!(
            Value::Object(out[0].clone()),
            json!({
                "InternalName": "BULBASAUR",
                "Name": "BULBASAUR",
                "Type1": "GRASS",
                "Type2": "POISON",
                "BaseStats": ["45", "49", "49", "45", "65", "65"],
                "Height": 0.7,
                "Generation": 1,
                "Evolutions": "IVYSAUR,,Level"
            })
        );
    }

    #[test]
    fn numbered_header_uses_internal_name_key() {
        let out = convert("[1]\nName = Bulbasaur\nInternalName = BULBASAUR\n");
        assert_eq!(out[0].get("InternalName"), Some(&json!("BULBASAUR")));
        let keys: Vec<&str> = out[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Name", "InternalName"]);
    }

    #[test]
    fn single_type_has_no_type2() {
        let out = convert("[PIDGEY]\nTypes = NORMAL\n");
        assert!(out[0].get("Type2").is_none());
    }

    #[test]
    fn bad_number_is_kept_as_text() {
        let out = convert("[X]\nHeight = tall\n");
        assert_eq!(out[0].get("Height"), Some(&json!("tall")));
    }
}
