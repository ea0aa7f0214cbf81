//! Text format ingestion for dexforge
//!
//! The game data files are plain text, one entity per section:
//!
//! ```text
//! #-------------------------------
//! [BULBASAUR]
//! Name = Bulbasaur
//! Types = GRASS,POISON
//! BaseStats = 45,49,49,45,65,65
//! Evolutions = IVYSAUR,,Level
//! ```
//!
//! This crate converts each file kind into a JSON array of objects and
//! cross-checks converted JSON against its source text:
//! - [`sections`]: the shared section/`key = value` reader
//! - one converter module per file kind
//! - [`compare`]: mismatch reports between a text file and its JSON
//!
//! Converters are lenient: a value that should be numeric but isn't is kept
//! as text (and logged) rather than failing the file.

use anyhow::Result;
use serde_json::{Map, Value};

pub mod abilities;
pub mod compare;
pub mod encounters;
pub mod forms;
pub mod moves;
pub mod pokemon;
pub mod sections;
pub mod types;
mod values;

pub use compare::Mismatch;
pub use sections::{parse_sections, Section};

/// The file kinds the converters understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Pokemon,
    Forms,
    Moves,
    Abilities,
    Types,
    Encounters,
}

impl DataKind {
    pub const ALL: [DataKind; 6] = [
        DataKind::Pokemon,
        DataKind::Forms,
        DataKind::Moves,
        DataKind::Abilities,
        DataKind::Types,
        DataKind::Encounters,
    ];

    /// Conventional source file name under a game's `data/` directory.
    pub fn text_file(self) -> &'static str {
        match self {
            DataKind::Pokemon => "pokemon.txt",
            DataKind::Forms => "pokemon_forms.txt",
            DataKind::Moves => "moves.txt",
            DataKind::Abilities => "abilities.txt",
            DataKind::Types => "types.txt",
            DataKind::Encounters => "encounters.txt",
        }
    }

    /// Conventional converted file name.
    pub fn json_file(self) -> &'static str {
        match self {
            DataKind::Pokemon => "pokemon.json",
            DataKind::Forms => "pokemon_forms.json",
            DataKind::Moves => "moves.json",
            DataKind::Abilities => "abilities.json",
            DataKind::Types => "types.json",
            DataKind::Encounters => "encounters.json",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DataKind::Pokemon => "pokemon",
            DataKind::Forms => "forms",
            DataKind::Moves => "moves",
            DataKind::Abilities => "abilities",
            DataKind::Types => "types",
            DataKind::Encounters => "encounters",
        }
    }
}

/// Convert one file's text into JSON objects.
pub fn convert(kind: DataKind, text: &str) -> Result<Vec<Map<String, Value>>> {
    match kind {
        DataKind::Pokemon => Ok(pokemon::convert(text)),
        DataKind::Forms => Ok(forms::convert(text)),
        DataKind::Moves => Ok(moves::convert(text)),
        DataKind::Abilities => Ok(abilities::convert(text)),
        DataKind::Types => Ok(types::convert(text)),
        DataKind::Encounters => encounters::convert(text),
    }
}
