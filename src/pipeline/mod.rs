//! Case orchestration: registry, progress reporting, stage adapters and the
//! orchestrator that drives a case through the stages.

pub mod adapters;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod registry;
pub mod summary;

pub use adapters::*;
pub use config::*;
pub use error::*;
pub use orchestrator::*;
pub use progress::*;
pub use registry::*;
pub use summary::*;
