use reqwest::Client as HttpClient;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::models::chat::{ ChatMessage, ChatResponse, ErrorResponse };

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid proxy URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Proxy returned {status}: {message}")]
    Status {
        status: u16,
        message: String,
    },
}

#[derive(Serialize)]
struct OutgoingChat<'a> {
    messages: &'a [ChatMessage],
}

/// Talks to the proxy's chat endpoint on behalf of the UI.
#[derive(Clone)]
pub struct ProxyClient {
    http: HttpClient,
    endpoint: Url,
}

impl ProxyClient {
    /// `base_url` is the proxy origin, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base_url)?;
        let endpoint = base.join(crate::server::CHAT_ROUTE)?;
        Ok(Self { http: HttpClient::new(), endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn send(&self, messages: &[ChatMessage]) -> Result<String, ClientError> {
        let resp = self.http
            .post(self.endpoint.clone())
            .json(&OutgoingChat { messages })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = match resp.json::<ErrorResponse>().await {
                Ok(body) => match body.error {
                    Some(detail) => format!("{} ({})", body.message, detail),
                    None => body.message,
                },
                Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
            };
            return Err(ClientError::Status { status: status.as_u16(), message });
        }

        Ok(resp.json::<ChatResponse>().await?.content)
    }
}
