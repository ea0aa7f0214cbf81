//! Variant merging and evolution chains
//!
//! Data flows one way through this crate:
//!
//! ```text
//!   RecordStore ──► merge ──► transitions ──► chain ──► annotate ──► RecordStore
//!   (+ variants)     ids       (target,        dfs +      EvolutionLine
//!                   + fallback  method)        canonical
//! ```
//!
//! - [`merge`] folds form records into their base (`Forms`), assigning
//!   `BASE_N` identifiers that never collide
//! - [`transitions`] decodes the raw `Evolutions` field into a graph plus the
//!   per-target method labels
//! - [`chain`] walks the graph from every entity and canonicalizes so every
//!   member of a connected family shares one chain
//! - [`annotate`] renders the shared chain into `EvolutionLine`
//! - [`stats`] summarizes stat totals of final-stage species
//!
//! Everything is scoped to a single dataset: no state survives between calls.

pub mod annotate;
pub mod chain;
pub mod merge;
pub mod stats;
pub mod transitions;

pub use annotate::{annotate, render_chain, resolve_evolutions, EvolutionReport};
pub use chain::{build_chains, canonicalize, CanonicalChains, Chain, ChainMap};
pub use merge::{merge_variants, MergeOutcome, PRIMARY_VARIANT_MARKER};
pub use stats::{stat_summary, StatSummary, StatTotal, DEFAULT_EXCLUDED_TOP};
pub use transitions::{parse_transitions, MethodMap, Transition, TransitionGraph};
