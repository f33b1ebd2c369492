use shared::{AskRequest, AskResponse};
use std::sync::Arc;
use tracing::debug;

use crate::application::ports::{CompletionError, CompletionPort};

/// Relays a user question to the language model and returns its answer
pub struct AskHandler {
    completion: Arc<dyn CompletionPort>,
}

impl AskHandler {
    pub fn new(completion: Arc<dyn CompletionPort>) -> Self {
        Self { completion }
    }

    pub async fn handle(&self, request: AskRequest) -> Result<AskResponse, CompletionError> {
        debug!(chars = request.message.len(), "Forwarding question to completion endpoint");
        let answer = self.completion.complete(&request.message).await?;
        Ok(AskResponse {
            answer: answer.trim().to_string(),
        })
    }
}
