//! Test doubles for code that talks to a [`ChatClient`].

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use replidocs_shared::{RepliDocsError, Result};

use crate::client::{ChatClient, CompletionRequest};

/// Replays a fixed script of answers and records every request it receives.
///
/// Once the script runs out, further calls fail with a model error.
pub struct ScriptedClient {
    answers: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new(answers: Vec<Result<String>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests seen so far, in call order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.requests.lock().expect("requests lock").push(request);
        self.answers
            .lock()
            .expect("answers lock")
            .pop_front()
            .unwrap_or_else(|| Err(RepliDocsError::Model("script exhausted".into())))
    }
}
