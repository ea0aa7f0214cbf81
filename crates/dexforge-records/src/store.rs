//! In-memory record store keyed by `InternalName`.

use std::collections::HashMap;

use crate::error::RecordError;
use crate::record::Record;

/// Records keyed by identifier; iteration follows load order.
///
/// Identifiers must not be rewritten through [`RecordStore::get_mut`] or
/// [`RecordStore::iter_mut`]: the index is built once, at insertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStore {
    records: Vec<Record>,
    index: HashMap<String, usize>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strict load: the first record without an identifier, or the first
    /// repeated identifier, fails the whole load.
    pub fn load(records: impl IntoIterator<Item = Record>) -> Result<Self, RecordError> {
        let mut store = Self::new();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    /// Batch load: bad records are reported and skipped.
    ///
    /// A repeated identifier replaces the earlier record in place, so the
    /// surviving record keeps the first occurrence's position.
    pub fn load_lenient(records: impl IntoIterator<Item = Record>) -> (Self, Vec<RecordError>) {
        let mut store = Self::new();
        let mut problems = Vec::new();
        for record in records {
            let Some(id) = record.internal_name.clone() else {
                problems.push(RecordError::malformed(
                    record.label(),
                    "missing InternalName",
                ));
                continue;
            };
            if let Some(&slot) = store.index.get(&id) {
                store.records[slot] = record;
                problems.push(RecordError::Duplicate { id });
                continue;
            }
            store.index.insert(id, store.records.len());
            store.records.push(record);
        }
        (store, problems)
    }

    pub fn insert(&mut self, record: Record) -> Result<(), RecordError> {
        let Some(id) = record.internal_name.clone() else {
            return Err(RecordError::malformed(record.label(), "missing InternalName"));
        };
        if self.index.contains_key(&id) {
            return Err(RecordError::Duplicate { id });
        }
        self.index.insert(id, self.records.len());
        self.records.push(record);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&Record, RecordError> {
        self.index
            .get(id)
            .map(|&slot| &self.records[slot])
            .ok_or_else(|| RecordError::not_found("record", id))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut Record, RecordError> {
        match self.index.get(id) {
            Some(&slot) => Ok(&mut self.records[slot]),
            None => Err(RecordError::not_found("record", id)),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn all(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Record> {
        self.records.iter_mut()
    }

    /// Identifiers in load order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter_map(|record| record.internal_name.as_deref())
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}
