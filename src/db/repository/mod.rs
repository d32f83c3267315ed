//! Repository layer: entity-scoped database operations.

mod symptom_log;

pub use symptom_log::*;
