pub mod openai;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use self::openai::OpenAIChatClient;
use super::LlmConfig;
use crate::models::chat::ChatMessage;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("OpenAI API key is not configured (set OPENAI_API_KEY)")]
    MissingApiKey,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("OpenAI API returned {status}: {message}")]
    Status {
        status: u16,
        message: String,
    },
    #[error("No response from OpenAI API")]
    EmptyResponse,
}

/// A chat-completion provider. One call per conversation turn; the returned
/// text is the content of the first completion choice.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, ChatError> {
    let client = OpenAIChatClient::from_config(config)?;
    Ok(Arc::new(client))
}
