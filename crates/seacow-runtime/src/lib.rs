//! Chat orchestrator: one request in, one normalized reply out.
//!
//! Optionally augments the conversation with statistics or web search
//! results, then hands it to the provider dispatcher.

pub mod orchestrator;
pub mod types;

pub use orchestrator::Orchestrator;
pub use types::*;
