#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use std::net::SocketAddr;
use std::sync::atomic::{ AtomicUsize, Ordering };
use std::sync::{ Arc, Mutex };
use tour_guide_chat::llm::chat::{ ChatClient, ChatError };
use tour_guide_chat::models::chat::ChatMessage;
use tour_guide_chat::server::api::{ router, AppState };

pub const TEST_PROMPT: &str = "You are a test guide for Cork.";

/// Upstream stand-in that records every conversation it is asked to complete.
pub struct FakeChatClient {
    reply: Result<String, (u16, String)>,
    calls: AtomicUsize,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeChatClient {
    pub fn replying(content: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(content.to_string()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(status: u16, message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err((status, message.to_string())),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<Vec<ChatMessage>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for FakeChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(messages.to_vec());
        match &self.reply {
            Ok(content) => Ok(content.clone()),
            Err((status, message)) => Err(ChatError::Status {
                status: *status,
                message: message.clone(),
            }),
        }
    }

    fn get_model(&self) -> String {
        "fake".to_string()
    }

    fn get_base_url(&self) -> Option<String> {
        None
    }
}

pub fn app_with(client: Arc<FakeChatClient>) -> Router {
    router(AppState::new(client, TEST_PROMPT))
}

/// Serves `app` on an ephemeral local port for the lifetime of the test.
pub async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.expect("serve");
    });
    addr
}
