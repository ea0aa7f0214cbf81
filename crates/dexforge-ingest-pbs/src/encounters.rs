//! `encounters.txt` → per-map encounter tables.
//!
//! ```text
//! [003] # Route 1
//! Land,21
//! 20,PIDGEY,2,4
//! 20,RATTATA,3
//! OldRod
//! 100,MAGIKARP,5
//! ```
//!
//! becomes
//!
//! ```json
//! {"MapID": "003", "MapName": "Route 1",
//!  "Encounters": {"Land": {"Rate": 21, "Pokemon": [...]},
//!                 "OldRod": {"Rate": null, "Pokemon": [...]}}}
//! ```

use anyhow::{Context, Result};
use regex::Regex;
use serde_json::{Map, Value};

use crate::sections::{parse_sections, Section};

const UNKNOWN_MAP_ID: &str = "UNKNOWN";
const UNNAMED_MAP: &str = "Unnamed Map";

pub fn convert(text: &str) -> Result<Vec<Map<String, Value>>> {
    let type_line = Regex::new(r"^([A-Za-z]+)(?:,\s*(\d+))?$")
        .context("compiling encounter type pattern")?;

    Ok(parse_sections(text)
        .iter()
        .map(|section| convert_map(section, &type_line))
        .collect())
}

fn convert_map(section: &Section, type_line: &Regex) -> Map<String, Value> {
    let map_id = section
        .header
        .clone()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| UNKNOWN_MAP_ID.to_string());
    let map_name = section
        .header_comment
        .clone()
        .unwrap_or_else(|| UNNAMED_MAP.to_string());

    let mut encounters = Map::new();
    let mut current: Option<String> = None;

    for line in &section.body {
        if let Some(caps) = type_line.captures(line) {
            let kind = caps[1].to_string();
            let rate = caps
                .get(2)
                .and_then(|m| m.as_str().parse::<i64>().ok())
                .map(Value::from)
                .unwrap_or(Value::Null);
            let mut table = Map::new();
            table.insert("Rate".to_string(), rate);
            table.insert("Pokemon".to_string(), Value::Array(Vec::new()));
            encounters.insert(kind.clone(), Value::Object(table));
            current = Some(kind);
            continue;
        }

        let Some(kind) = current.as_deref() else {
            tracing::warn!(map = %map_id, line = %line, "slot before any encounter type; skipping");
            continue;
        };
        let Some(slot) = parse_slot(line) else {
            tracing::warn!(map = %map_id, line = %line, "unparsable encounter slot; skipping");
            continue;
        };
        if let Some(Value::Array(slots)) = encounters
            .get_mut(kind)
            .and_then(|table| table.get_mut("Pokemon"))
        {
            slots.push(Value::Object(slot));
        }
    }

    let mut out = Map::new();
    out.insert("MapID".to_string(), Value::String(map_id));
    out.insert("MapName".to_string(), Value::String(map_name));
    out.insert("Encounters".to_string(), Value::Object(encounters));
    out
}

/// `chance,SPECIES,level[,maxlevel]`
fn parse_slot(line: &str) -> Option<Map<String, Value>> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if !(3..=4).contains(&parts.len()) || parts[1].is_empty() {
        return None;
    }
    let chance: i64 = parts[0].parse().ok()?;
    let level: i64 = parts[2].parse().ok()?;

    let mut slot = Map::new();
    slot.insert("Chance".to_string(), Value::from(chance));
    slot.insert("Species".to_string(), Value::String(parts[1].to_string()));
    slot.insert("Level".to_string(), Value::from(level));
    if let Some(max) = parts.get(3) {
        slot.insert("MaxLevel".to_string(), Value::from(max.parse::<i64>().ok()?));
    }
    Some(slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ROUTE: &str = "#-------------------------------
[003] # Route 1
Land,21
20,PIDGEY,2,4
20,RATTATA,3
OldRod
100,MAGIKARP,5
#-------------------------------
[004] # Route 2
Water,2
60,TENTACOOL,14,19
";

    #[test]
    fn converts_maps_and_tables() {
        let maps = convert(ROUTE).unwrap();
        assert_eq!(maps.len(), 2);
        assert_eq!(
            Value::Object(maps[0].clone()),
            json!({
                "MapID": "003",
                "MapName": "Route 1",
                "Encounters": {
                    "Land": {"Rate": 21, "Pokemon": [
                        {"Chance": 20, "Species": "PIDGEY", "Level": 2, "MaxLevel": 4},
                        {"Chance": 20, "Species": "RATTATA", "Level": 3}
                    ]},
                    "OldRod": {"Rate": null, "Pokemon": [
                        {"Chance": 100, "Species": "MAGIKARP", "Level": 5}
                    ]}
                }
            })
        );
        assert_eq!(maps[1]["MapName"], json!("Route 2"));
    }

    #[test]
    fn missing_header_parts_use_placeholders() {
        let maps = convert("Land,10\n50,ZUBAT,8\n").unwrap();
        assert_eq!(maps[0]["MapID"], json!(UNKNOWN_MAP_ID));
        assert_eq!(maps[0]["MapName"], json!(UNNAMED_MAP));
    }

    #[test]
    fn bad_slots_are_skipped() {
        let maps = convert("[1] # Cave\n40,ZUBAT,8\nLand,10\n40,ZUBAT\nx,GEODUDE,7\n30,GEODUDE,7\n").unwrap();
        let land = &maps[0]["Encounters"]["Land"]["Pokemon"];
        assert_eq!(land, &json!([{"Chance": 30, "Species": "GEODUDE", "Level": 7}]));
    }
}
