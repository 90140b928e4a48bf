use thiserror::Error;

use crate::workflow::Step;

/// Failure of a single schema-constrained generation call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("empty response from {0}")]
    EmptyResponse(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl GenerationError {
    /// A missing credential cannot be fixed by resubmitting the form.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GenerationError::Configuration(_))
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        GenerationError::Transport(e.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("event '{event}' is not accepted in step {step:?}")]
    InvalidTransition { step: Step, event: &'static str },
    #[error("a generation call is already in flight ({0:?})")]
    Busy(Step),
    #[error("idea text is empty")]
    EmptyIdea,
    #[error("no {0} available for this transition")]
    MissingData(&'static str),
    #[error("outcome '{outcome}' does not belong to step {step:?}")]
    UnexpectedOutcome { step: Step, outcome: &'static str },
}
