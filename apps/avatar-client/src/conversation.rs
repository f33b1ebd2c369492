use shared::TaskMode;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::controller::{SayOutcome, SessionController, SessionError, SkipReason};
use crate::gateway_client::{AnswerSource, AskError};

#[derive(Debug, Error)]
pub enum ConversationError {
    #[error(transparent)]
    Ask(#[from] AskError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Question/answer loop on top of a session: questions go to the language
/// model and the avatar speaks the answer.
pub struct Conversation {
    controller: SessionController,
    answers: Arc<dyn AnswerSource>,
}

impl Conversation {
    pub fn new(controller: SessionController, answers: Arc<dyn AnswerSource>) -> Self {
        Self { controller, answers }
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SessionController {
        &mut self.controller
    }

    /// Ask the language model and have the avatar talk the answer
    pub async fn ask(&self, question: &str) -> Result<SayOutcome, ConversationError> {
        if question.trim().is_empty() {
            return Ok(SayOutcome::Skipped(SkipReason::EmptyText));
        }

        let answer = self.answers.ask(question).await?;
        debug!(chars = answer.len(), "Answer received");
        Ok(self.controller.say(&answer, TaskMode::Talk).await?)
    }

    /// Have the avatar read the text back verbatim
    pub async fn repeat(&self, text: &str) -> Result<SayOutcome, SessionError> {
        self.controller.say(text, TaskMode::Repeat).await
    }
}
