pub mod enums;
pub mod symptom_log;
pub mod triage;

pub use enums::*;
pub use symptom_log::*;
pub use triage::*;
