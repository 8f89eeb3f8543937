//! Time-range query layer — the only path between aggregators and the
//! record stores. Each read is bounded by an inclusive [start, end] window
//! plus optional typed predicates; a failing read surfaces a typed error
//! that callers degrade into an empty-data envelope. No retries happen at
//! this layer; retry policy belongs to the store client.

pub mod error;
pub mod filter;
pub mod memory;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use filter::{AssessmentFilter, EventFilter, VisitFilter};
pub use memory::InMemoryStore;
pub use store::{FailingStore, RecordStore};
