//! Reading and writing record arrays.
//!
//! Output is a JSON array of objects indented with four spaces, keys in
//! record order, so regenerated files diff cleanly against earlier runs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::RecordError;
use crate::record::Record;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{}: expected a JSON array of objects", .path.display())]
    Shape { path: PathBuf },
}

/// Read a JSON array of raw objects.
pub fn read_objects(path: &Path) -> Result<Vec<Map<String, Value>>, PersistError> {
    let text = fs::read_to_string(path).map_err(|source| PersistError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|source| PersistError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let Value::Array(items) = value else {
        return Err(PersistError::Shape {
            path: path.to_path_buf(),
        });
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => Ok(map),
            _ => Err(PersistError::Shape {
                path: path.to_path_buf(),
            }),
        })
        .collect()
}

/// Read a JSON array of records.
///
/// Only file-level problems (unreadable, undecodable, not an array of
/// objects) fail the read. An object whose named fields have the wrong JSON
/// type is left out and returned alongside the records that did load.
pub fn read_records(path: &Path) -> Result<(Vec<Record>, Vec<RecordError>), PersistError> {
    let mut records = Vec::new();
    let mut problems = Vec::new();
    for map in read_objects(path)? {
        match Record::try_from(map) {
            Ok(record) => records.push(record),
            Err(problem) => problems.push(problem),
        }
    }
    Ok((records, problems))
}

pub fn write_records(path: &Path, records: &[Record]) -> Result<(), PersistError> {
    write_json(path, records)
}

/// Serialize any value with the four-space layout used for all outputs.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only ever emits UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PersistError> {
    let text = to_pretty_json(value).map_err(|source| PersistError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PersistError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, text).map_err(|source| PersistError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn records_round_trip_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("pokemon.json");
        let text = r#"[
    {
        "Name": "FOO",
        "InternalName": "FOO",
        "Kind": "Seed"
    }
]"#;
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, text).unwrap();

        let (records, problems) = read_records(&path).unwrap();
        assert!(problems.is_empty());
        write_records(&path, &records).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn numeric_stats_survive_a_rewrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pokemon.json");
        let text = r#"[
    {
        "InternalName": "A",
        "BaseStats": [
            45,
            49
        ]
    },
    {
        "InternalName": "B",
        "BaseStats": "1,2"
    }
]"#;
        fs::write(&path, text).unwrap();

        let (records, _) = read_records(&path).unwrap();
        write_records(&path, &records).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn malformed_record_is_left_out_of_the_batch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("p.json");
        fs::write(
            &path,
            r#"[{"InternalName":"A"},{"InternalName":"B","Evolutions":7},{"InternalName":"C"}]"#,
        )
        .unwrap();

        let (records, problems) = read_records(&path).unwrap();
        let ids: Vec<&str> = records.iter().map(Record::label).collect();
        assert_eq!(ids, vec!["A", "C"]);
        assert_eq!(problems.len(), 1);
        assert!(matches!(&problems[0], RecordError::Malformed { record, .. } if record == "B"));
    }

    #[test]
    fn non_object_entry_is_a_shape_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mixed.json");
        fs::write(&path, r#"[{"InternalName": "A"}, 3]"#).unwrap();
        assert!(matches!(
            read_records(&path).unwrap_err(),
            PersistError::Shape { .. }
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempdir().unwrap();
        let err = read_records(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, PersistError::Read { .. }));
    }

    #[test]
    fn non_array_is_a_shape_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("obj.json");
        fs::write(&path, r#"{"InternalName": "A"}"#).unwrap();
        assert!(matches!(
            read_records(&path).unwrap_err(),
            PersistError::Shape { .. }
        ));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "[{").unwrap();
        assert!(matches!(
            read_records(&path).unwrap_err(),
            PersistError::Decode { .. }
        ));
    }
}
