//! Evolution chains.
//!
//! Two steps:
//! 1. [`build_chains`]: for every store record, everything reachable from it
//!    (itself first, then depth-first pre-order, duplicates dropped).
//! 2. [`canonicalize`]: every identifier in one connected family gets the
//!    same chain, shared as one `Arc`, so a middle or final stage reports the
//!    full family rather than its own suffix.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::transitions::TransitionGraph;

/// Ordered, duplicate-free identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chain(Vec<String>);

impl Chain {
    pub fn members(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|m| m == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Chain {
    /// Collects in order, keeping the first occurrence of each identifier.
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let mut members = Vec::new();
        for id in iter {
            let id = id.into();
            if seen.insert(id.clone()) {
                members.push(id);
            }
        }
        Chain(members)
    }
}

impl TransitionGraph {
    /// Everything reachable from `start`, `start` first.
    ///
    /// Explicit stack walk. A successor already on the current path is
    /// skipped, which keeps cyclic data finite. A node is expanded once: by
    /// the time its frame pops, everything reachable from it has been emitted,
    /// so expanding it again could not add anything.
    pub fn chain_from<'a>(&'a self, start: &'a str) -> Chain {
        let mut members: Vec<String> = vec![start.to_string()];
        let mut on_path: HashSet<&str> = HashSet::from([start]);
        let mut expanded: HashSet<&str> = HashSet::new();

        // (node, index of the next successor to visit)
        let mut stack: Vec<(&str, usize)> = vec![(start, 0)];

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            let Some(child) = self.successors(node).get(next) else {
                on_path.remove(node);
                expanded.insert(node);
                stack.pop();
                continue;
            };
            frame.1 += 1;

            let child = child.as_str();
            if on_path.contains(child) || expanded.contains(child) {
                continue;
            }
            // Neither on the path nor expanded means never pushed before.
            members.push(child.to_string());
            on_path.insert(child);
            stack.push((child, 0));
        }

        Chain(members)
    }
}

/// Per-entity chains, in store order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainMap {
    entries: Vec<(String, Chain)>,
}

impl ChainMap {
    pub fn get(&self, id: &str) -> Option<&Chain> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, chain)| chain)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Chain)> {
        self.entries.iter().map(|(key, chain)| (key.as_str(), chain))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn build_chains(graph: &TransitionGraph) -> ChainMap {
    ChainMap {
        entries: graph
            .ids()
            .iter()
            .map(|id| (id.clone(), graph.chain_from(id)))
            .collect(),
    }
}

/// Canonical chain per identifier.
///
/// Covers every identifier that appears in any chain, including successors
/// that are not store records.
#[derive(Debug, Clone, Default)]
pub struct CanonicalChains {
    by_id: HashMap<String, Arc<Chain>>,
    families: Vec<Arc<Chain>>,
}

impl CanonicalChains {
    pub fn get(&self, id: &str) -> Option<&Arc<Chain>> {
        self.by_id.get(id)
    }

    /// One chain per connected family, in the order the families were first reached.
    pub fn families(&self) -> &[Arc<Chain>] {
        &self.families
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Union-find over identifiers; path halving, union by attach-to-first.
struct Families<'a> {
    slot: HashMap<&'a str, usize>,
    parent: Vec<usize>,
}

impl<'a> Families<'a> {
    fn new() -> Self {
        Self {
            slot: HashMap::new(),
            parent: Vec::new(),
        }
    }

    fn add(&mut self, id: &'a str) -> usize {
        if let Some(&slot) = self.slot.get(id) {
            return slot;
        }
        let slot = self.parent.len();
        self.parent.push(slot);
        self.slot.insert(id, slot);
        slot
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: &'a str, b: &'a str) {
        let (a, b) = (self.add(a), self.add(b));
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb] = ra;
        }
    }

    fn family_of(&mut self, id: &str) -> usize {
        let slot = self.slot[id];
        self.find(slot)
    }
}

#[derive(Default)]
struct FamilyBuilder {
    members: Vec<String>,
    seen: HashSet<String>,
}

fn extend_family(
    building: &mut HashMap<usize, FamilyBuilder>,
    order: &mut Vec<usize>,
    family: usize,
    ids: &[String],
) {
    let builder = building.entry(family).or_insert_with(|| {
        order.push(family);
        FamilyBuilder::default()
    });
    for id in ids {
        if builder.seen.insert(id.clone()) {
            builder.members.push(id.clone());
        }
    }
}

/// Make chains canonical per connected family.
///
/// For each family, the chains of its roots (store records that do not appear
/// inside another record's chain) are concatenated in store order, keeping the
/// first occurrence of each identifier. A family without roots (pure cycle)
/// starts from its first store record. Any member still missing is appended
/// in first-seen order. A record with no transitions in either direction gets
/// a chain of just itself.
///
/// This is a union over the whole family, not "the first chain that contains
/// the record": with convergent roots (`A -> C`, `B -> C`) every member gets
/// `[A, C, B]`, so membership stays symmetric.
pub fn canonicalize(graph: &TransitionGraph, chains: &ChainMap) -> CanonicalChains {
    let mut families = Families::new();
    for (id, chain) in chains.iter() {
        families.add(id);
        for member in chain.iter() {
            families.union(id, member);
        }
    }

    let mut non_roots: HashSet<&str> = HashSet::new();
    for (id, chain) in chains.iter() {
        for member in chain.iter().skip(1) {
            if member != id {
                non_roots.insert(member);
            }
        }
    }

    let mut order: Vec<usize> = Vec::new();
    let mut building: HashMap<usize, FamilyBuilder> = HashMap::new();

    for (id, chain) in chains.iter() {
        if !non_roots.contains(id) {
            let family = families.family_of(id);
            extend_family(&mut building, &mut order, family, chain.members());
        }
    }
    for (id, chain) in chains.iter() {
        let family = families.family_of(id);
        if !building.contains_key(&family) {
            extend_family(&mut building, &mut order, family, chain.members());
        }
    }
    for (id, chain) in chains.iter() {
        let family = families.family_of(id);
        extend_family(&mut building, &mut order, family, chain.members());
    }

    let mut canonical = CanonicalChains::default();
    for family in order {
        let Some(builder) = building.remove(&family) else {
            continue;
        };
        let shared = Arc::new(Chain(builder.members));
        for id in shared.members() {
            canonical.by_id.insert(id.clone(), Arc::clone(&shared));
        }
        canonical.families.push(shared);
    }

    debug_assert!(graph.ids().iter().all(|id| canonical.by_id.contains_key(id)));
    canonical
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexforge_records::{Record, RecordStore};

    fn graph(entries: &[(&str, &str)]) -> TransitionGraph {
        let records = entries.iter().map(|(id, evos)| {
            let mut record = Record::new(*id);
            if !evos.is_empty() {
                record.evolutions = Some(evos.to_string());
            }
            record
        });
        TransitionGraph::from_store(&RecordStore::load(records).unwrap())
    }

    fn ids(chain: &Chain) -> Vec<&str> {
        chain.iter().collect()
    }

    #[test]
    fn linear_chain_from_each_stage() {
        let g = graph(&[("A", "B,16,Level"), ("B", "C,36,Level"), ("C", "")]);
        assert_eq!(ids(&g.chain_from("A")), vec!["A", "B", "C"]);
        assert_eq!(ids(&g.chain_from("B")), vec!["B", "C"]);
        assert_eq!(ids(&g.chain_from("C")), vec!["C"]);
    }

    #[test]
    fn branches_are_both_included_depth_first() {
        let g = graph(&[
            ("EEVEE", "VAPOREON,WATERSTONE,Item,JOLTEON,THUNDERSTONE,Item"),
            ("VAPOREON", ""),
            ("JOLTEON", ""),
        ]);
        assert_eq!(
            ids(&g.chain_from("EEVEE")),
            vec!["EEVEE", "VAPOREON", "JOLTEON"]
        );
    }

    #[test]
    fn diamond_visits_shared_descendant_once() {
        let g = graph(&[
            ("A", "B,,Level,C,,Level"),
            ("B", "D,,Level"),
            ("C", "D,,Level,E,,Level"),
            ("D", ""),
            ("E", ""),
        ]);
        assert_eq!(ids(&g.chain_from("A")), vec!["A", "B", "D", "C", "E"]);
    }

    #[test]
    fn cycles_terminate() {
        let g = graph(&[("A", "B,,Level"), ("B", "A,,Level,C,,Item"), ("C", "")]);
        assert_eq!(ids(&g.chain_from("A")), vec!["A", "B", "C"]);
        assert_eq!(ids(&g.chain_from("B")), vec!["B", "A", "C"]);
    }

    #[test]
    fn self_transition_is_ignored() {
        let g = graph(&[("A", "A,,Level")]);
        assert_eq!(ids(&g.chain_from("A")), vec!["A"]);
    }

    #[test]
    fn unknown_targets_stay_in_the_chain() {
        let g = graph(&[("A", "GHOST,,Trade")]);
        assert_eq!(ids(&g.chain_from("A")), vec!["A", "GHOST"]);
    }

    #[test]
    fn every_stage_shares_the_root_chain() {
        let g = graph(&[("C", ""), ("B", "C,,Level"), ("A", "B,,Level")]);
        let canonical = canonicalize(&g, &build_chains(&g));

        let a = canonical.get("A").unwrap();
        assert_eq!(ids(a), vec!["A", "B", "C"]);
        assert!(Arc::ptr_eq(a, canonical.get("B").unwrap()));
        assert!(Arc::ptr_eq(a, canonical.get("C").unwrap()));
        assert_eq!(canonical.families().len(), 1);
    }

    #[test]
    fn single_stage_maps_to_itself() {
        let g = graph(&[("LONE", ""), ("A", "B,,Level"), ("B", "")]);
        let canonical = canonicalize(&g, &build_chains(&g));
        assert_eq!(ids(canonical.get("LONE").unwrap()), vec!["LONE"]);
        assert_eq!(canonical.families().len(), 2);
    }

    #[test]
    fn convergent_roots_share_one_family() {
        let g = graph(&[("A", "C,,Level"), ("B", "C,,Item"), ("C", "")]);
        let canonical = canonicalize(&g, &build_chains(&g));
        let a = canonical.get("A").unwrap();
        assert_eq!(ids(a), vec!["A", "C", "B"]);
        assert!(Arc::ptr_eq(a, canonical.get("B").unwrap()));
        assert!(Arc::ptr_eq(a, canonical.get("C").unwrap()));
    }

    #[test]
    fn pure_cycle_starts_from_first_store_record() {
        let g = graph(&[("B", "A,,Level"), ("A", "B,,Level")]);
        let canonical = canonicalize(&g, &build_chains(&g));
        assert_eq!(ids(canonical.get("A").unwrap()), vec!["B", "A"]);
    }

    #[test]
    fn chain_collects_without_duplicates() {
        let chain: Chain = ["A", "B", "A", "C", "B"].into_iter().collect();
        assert_eq!(ids(&chain), vec!["A", "B", "C"]);
    }
}
