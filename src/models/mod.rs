pub mod care_plan;
pub mod case;
pub mod document;
pub mod symptom;
pub mod triage;
pub mod voice;

pub use care_plan::*;
pub use case::*;
pub use document::*;
pub use symptom::*;
pub use triage::*;
pub use voice::*;
