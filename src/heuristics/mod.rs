//! Deterministic rules that run around the reasoning calls: voice urgency
//! scoring, document field extraction, red flags, contradiction checks and
//! the care-plan rule book.

pub mod care_rules;
pub mod contradictions;
pub mod document_fields;
pub mod red_flags;
pub mod triage_rules;
pub mod voice_urgency;

pub use care_rules::*;
pub use contradictions::*;
pub use document_fields::*;
pub use red_flags::*;
pub use triage_rules::*;
pub use voice_urgency::*;
