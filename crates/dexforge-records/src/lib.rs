//! Entity records for dexforge
//!
//! Every data file the pipeline touches is a JSON array of objects, one object
//! per game entity (a creature, a move, an ability, ...). This crate provides:
//! - [`Record`]: a structured view over one object, with the fields the merge
//!   and evolution passes care about lifted into named slots and everything
//!   else kept verbatim in a passthrough side-table
//! - [`RecordStore`]: records keyed by `InternalName`, iterated in load order
//! - [`persist`]: reading/writing record arrays with stable key order
//!
//! Record order and key order are both significant: the downstream diff tools
//! compare files line-by-line, so the same input must always serialize to the
//! same bytes.

pub mod error;
pub mod persist;
pub mod record;
pub mod store;

pub use error::RecordError;
pub use persist::PersistError;
pub use record::Record;
pub use store::RecordStore;
