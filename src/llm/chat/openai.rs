use async_trait::async_trait;
use log::debug;
use reqwest::{Client as HttpClient, header::{HeaderMap, HeaderValue, CONTENT_TYPE}};
use serde::{Deserialize, Serialize};

use super::{ChatClient, ChatError};
use crate::llm::LlmConfig;
use crate::models::chat::ChatMessage;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const COMPLETIONS_ROUTE: &str = "/v1/chat/completions";

pub struct OpenAIChatClient {
    http: HttpClient,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Deserialize)]
struct OpenAIMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIErrorBody {
    error: OpenAIErrorDetail,
}

#[derive(Deserialize)]
struct OpenAIErrorDetail {
    message: String,
}

impl OpenAIChatClient {
    pub fn new(
        api_key: Option<String>,
        model: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self, ChatError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = HttpClient::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ChatError> {
        Self::new(
            config.api_key.clone(),
            config.completion_model.clone(),
            config.base_url.clone(),
        )
    }

    fn completions_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/chat/completions") {
            base.to_string()
        } else if base.ends_with("/v1") {
            format!("{}/chat/completions", base)
        } else {
            format!("{}{}", base, COMPLETIONS_ROUTE)
        }
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let api_key = self.api_key.as_deref().ok_or(ChatError::MissingApiKey)?;
        let url = self.completions_url();
        debug!("Sending {} messages to {} (model {})", messages.len(), url, self.model);

        let req = OpenAIChatRequest {
            model: &self.model,
            messages,
        };

        let resp = self.http.post(&url)
            .bearer_auth(api_key)
            .json(&req)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAIErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("request failed").to_string());
            return Err(ChatError::Status { status: status.as_u16(), message });
        }

        let body = resp.json::<OpenAIResponse>().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ChatError::EmptyResponse)
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> OpenAIChatClient {
        OpenAIChatClient::new(None, None, Some(base_url.to_string())).unwrap()
    }

    #[test]
    fn defaults_to_gpt_4o_on_openai() {
        let c = OpenAIChatClient::new(Some("sk-test".into()), None, None).unwrap();
        assert_eq!(c.get_model(), "gpt-4o");
        assert_eq!(c.completions_url(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn completions_url_accepts_several_base_forms() {
        assert_eq!(client("http://localhost:8080/").completions_url(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(client("http://localhost:8080/v1").completions_url(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(
            client("http://proxy/v1/chat/completions").completions_url(),
            "http://proxy/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let c = client("http://127.0.0.1:9");
        let err = c.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, ChatError::MissingApiKey));
    }
}
