//! Decoding the raw `Evolutions` field.
//!
//! The encoding is a flat comma list of triples:
//! `TARGET,parameter,Method,TARGET,parameter,Method,...`. The parameter slot
//! (a level, an item, ...) is not needed for chains and is ignored.

use std::collections::HashMap;

use dexforge_records::RecordStore;

/// One decoded successor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub target: String,
    /// Empty when the source encoding leaves the method blank.
    pub method: String,
}

impl Transition {
    pub fn new(target: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            method: method.into(),
        }
    }
}

/// Target identifier → method label used to reach it.
pub type MethodMap = HashMap<String, String>;

/// Decode a raw transition string. Never fails.
///
/// A trailing incomplete triple is dropped, as is any triple whose target is
/// blank. Absent or empty input yields no transitions.
pub fn parse_transitions(raw: Option<&str>) -> Vec<Transition> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Vec::new();
    };

    let tokens: Vec<&str> = raw.split(',').map(str::trim).collect();
    tokens
        .chunks_exact(3)
        .filter(|triple| !triple[0].is_empty())
        .map(|triple| Transition::new(triple[0], triple[2]))
        .collect()
}

/// Successor lists for one dataset, in store order.
#[derive(Debug, Clone, Default)]
pub struct TransitionGraph {
    ids: Vec<String>,
    successors: HashMap<String, Vec<String>>,
    methods: MethodMap,
}

impl TransitionGraph {
    /// Decode every record's transitions.
    ///
    /// When several predecessors name different methods for the same target,
    /// the last one in store order wins (an empty method included).
    pub fn from_store(store: &RecordStore) -> Self {
        let mut graph = Self::default();
        for record in store.iter() {
            let Some(id) = record.internal_name.as_deref() else {
                continue;
            };
            let transitions = parse_transitions(record.evolutions.as_deref());
            let mut targets = Vec::with_capacity(transitions.len());
            for transition in transitions {
                graph
                    .methods
                    .insert(transition.target.clone(), transition.method);
                targets.push(transition.target);
            }
            graph.ids.push(id.to_string());
            graph.successors.insert(id.to_string(), targets);
        }
        graph
    }

    /// Store identifiers, in store order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Direct successors. Identifiers that are not store records have none.
    pub fn successors(&self, id: &str) -> &[String] {
        self.successors.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_record(&self, id: &str) -> bool {
        self.successors.contains_key(id)
    }

    pub fn methods(&self) -> &MethodMap {
        &self.methods
    }

    pub fn into_methods(self) -> MethodMap {
        self.methods
    }
}
