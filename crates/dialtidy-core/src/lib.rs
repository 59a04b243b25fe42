pub mod domain;
pub mod error;
pub mod reconcile;

pub use domain::*;
pub use error::CoreError;
pub use reconcile::{reconcile, MemoryStore, ReconcileReport, RecordOutcome, RecordStore};
