use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;

use super::Provider;
use crate::errors::GenerationError;
use crate::wire::GenerationRequest;

/// Deterministic in-process provider: replays queued replies in order and
/// records every request it receives. Clones share the same queue.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, text: impl Into<String>) {
        self.inner.replies.lock().push_back(Ok(text.into()));
    }

    pub fn push_json<T: Serialize>(&self, value: &T) {
        let text = serde_json::to_string(value).unwrap_or_default();
        self.push_reply(text);
    }

    pub fn push_error(&self, err: GenerationError) {
        self.inner.replies.lock().push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.inner.requests.lock().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, req: &GenerationRequest) -> Result<String, GenerationError> {
        self.inner.requests.lock().push(req.clone());
        self.inner
            .replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Transport("script exhausted".into())))
    }
}
