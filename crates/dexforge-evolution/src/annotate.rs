//! Rendering canonical chains back onto records.

use dexforge_records::RecordStore;

use crate::chain::{build_chains, canonicalize, CanonicalChains, Chain};
use crate::transitions::{MethodMap, TransitionGraph};

/// `"BULBASAUR, IVYSAUR(Level), VENUSAUR(Level)"`
///
/// A member gets a `(Method)` suffix when the method map has a non-empty
/// method for it.
pub fn render_chain(chain: &Chain, methods: &MethodMap) -> String {
    chain
        .iter()
        .map(|id| match methods.get(id).filter(|m| !m.is_empty()) {
            Some(method) => format!("{id}({method})"),
            None => id.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Set `EvolutionLine` on every record whose chain has more than one member.
///
/// Returns how many records were annotated. Records in single-member chains
/// are left exactly as they were.
pub fn annotate(store: &mut RecordStore, chains: &CanonicalChains, methods: &MethodMap) -> usize {
    let mut annotated = 0;
    for record in store.iter_mut() {
        let Some(id) = record.internal_name.as_deref() else {
            continue;
        };
        let Some(chain) = chains.get(id).filter(|chain| chain.len() > 1) else {
            continue;
        };
        record.evolution_line = Some(render_chain(chain, methods));
        annotated += 1;
    }
    annotated
}

#[derive(Debug)]
pub struct EvolutionReport {
    pub annotated: usize,
    pub chains: CanonicalChains,
    pub methods: MethodMap,
}

/// Resolve, canonicalize and annotate one dataset.
pub fn resolve_evolutions(store: &mut RecordStore) -> EvolutionReport {
    let graph = TransitionGraph::from_store(store);
    let chains = canonicalize(&graph, &build_chains(&graph));
    let methods = graph.into_methods();
    let annotated = annotate(store, &chains, &methods);
    tracing::debug!(
        records = store.len(),
        families = chains.families().len(),
        annotated,
        "resolved evolution chains"
    );
    EvolutionReport {
        annotated,
        chains,
        methods,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexforge_records::Record;

    fn store(entries: &[(&str, &str)]) -> RecordStore {
        RecordStore::load(entries.iter().map(|(id, evos)| {
            let mut record = Record::new(*id);
            if !evos.is_empty() {
                record.evolutions = Some(evos.to_string());
            }
            record
        }))
        .unwrap()
    }

    #[test]
    fn two_stage_family() {
        let mut s = store(&[("FOO", ""), ("BAR", "FOO,,Level")]);
        let report = resolve_evolutions(&mut s);

        assert_eq!(report.annotated, 2);
        let chain: Vec<&str> = report.chains.get("FOO").unwrap().iter().collect();
        assert_eq!(chain, vec!["BAR", "FOO"]);
        assert_eq!(
            s.get("BAR").unwrap().evolution_line.as_deref(),
            Some("BAR, FOO(Level)")
        );
        assert_eq!(
            s.get("FOO").unwrap().evolution_line.as_deref(),
            Some("BAR, FOO(Level)")
        );
    }

    #[test]
    fn single_stage_gets_no_line() {
        let mut s = store(&[("LONE", "")]);
        let report = resolve_evolutions(&mut s);
        assert_eq!(report.annotated, 0);
        assert_eq!(s.get("LONE").unwrap().evolution_line, None);
    }

    #[test]
    fn blank_method_renders_bare() {
        let mut s = store(&[("A", "B,,"), ("B", "")]);
        resolve_evolutions(&mut s);
        assert_eq!(s.get("A").unwrap().evolution_line.as_deref(), Some("A, B"));
    }

    #[test]
    fn branches_render_in_walk_order() {
        let mut s = store(&[
            ("EEVEE", "VAPOREON,WATERSTONE,Item,JOLTEON,THUNDERSTONE,Item,ESPEON,,Happiness"),
            ("VAPOREON", ""),
            ("JOLTEON", ""),
            ("ESPEON", ""),
        ]);
        resolve_evolutions(&mut s);
        assert_eq!(
            s.get("JOLTEON").unwrap().evolution_line.as_deref(),
            Some("EEVEE, VAPOREON(Item), JOLTEON(Item), ESPEON(Happiness)")
        );
    }

    #[test]
    fn rerun_is_stable() {
        let mut s = store(&[("A", "B,16,Level"), ("B", "C,36,Level"), ("C", "")]);
        resolve_evolutions(&mut s);
        let once = s.clone();
        resolve_evolutions(&mut s);
        assert_eq!(s, once);
    }
}
