//! Four-stage design wizard driven by schema-constrained LLM calls:
//! idea parsing, requirement analysis, interaction/visual design (with
//! refinement) and Nano Pro visual-prompt synthesis.

pub mod config;
pub mod errors;
pub mod log;
pub mod prompt;
pub mod provider;
pub mod schema;
pub mod wire;
pub mod workflow;

pub use errors::{GenerationError, WorkflowError};
pub use provider::GenerationClient;
pub use workflow::{Checkpoint, Event, Step, Workflow};
