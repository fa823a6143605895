//! Scripted model gateway for tests.
//!
//! Replays queued replies in order and records every request it receives.
//! Clones share the same script, so one instance can back a whole agent
//! graph and the recorded requests show the order agents were consulted.

use crate::model::{FinishReason, Message, Model, ModelError, Request, Response, ToolCall};
use parking_lot::Mutex;
use std::{collections::VecDeque, sync::Arc};

/// A deterministic [`Model`] that answers from a script.
///
/// When the queue is empty the fallback reply is used; without a fallback
/// the call fails with [`ModelError::Incomplete`].
#[derive(Clone, Default)]
pub struct ScriptedModel {
    script: Arc<Mutex<Script>>,
}

#[derive(Default)]
struct Script {
    replies: VecDeque<Result<Response, ModelError>>,
    fallback: Option<Result<Response, ModelError>>,
    requests: Vec<Request>,
}

impl ScriptedModel {
    /// Create an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a final text answer.
    pub fn reply(self, content: impl Into<String>) -> Self {
        self.push(Ok(Response::from_message(Message::assistant(content, None))))
    }

    /// Queue a request to call one tool with the given JSON arguments.
    pub fn call(self, id: &str, tool: &str, arguments: impl Into<String>) -> Self {
        let calls = [ToolCall::function(id, tool, arguments)];
        self.push(Ok(Response::from_message(Message::assistant(
            "",
            Some(&calls),
        ))))
    }

    /// Queue a text answer that stopped for `reason`.
    pub fn reply_with_reason(self, content: impl Into<String>, reason: FinishReason) -> Self {
        let mut response = Response::from_message(Message::assistant(content, None));
        for choice in &mut response.choices {
            choice.finish_reason = Some(reason);
        }
        self.push(Ok(response))
    }

    /// Queue a failed call.
    pub fn fail(self, error: ModelError) -> Self {
        self.push(Err(error))
    }

    /// Answer with this text whenever the queue is empty.
    pub fn always_reply(self, content: impl Into<String>) -> Self {
        self.script.lock().fallback =
            Some(Ok(Response::from_message(Message::assistant(content, None))));
        self
    }

    /// Fail with this error whenever the queue is empty.
    pub fn always_fail(self, error: ModelError) -> Self {
        self.script.lock().fallback = Some(Err(error));
        self
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.script.lock().requests.clone()
    }

    fn push(self, reply: Result<Response, ModelError>) -> Self {
        self.script.lock().replies.push_back(reply);
        self
    }
}

impl Model for ScriptedModel {
    async fn send(&self, request: &Request) -> Result<Response, ModelError> {
        let mut script = self.script.lock();
        script.requests.push(request.clone());
        match script.replies.pop_front() {
            Some(reply) => reply,
            None => script
                .fallback
                .clone()
                .unwrap_or_else(|| Err(ModelError::Incomplete("script exhausted".into()))),
        }
    }
}
