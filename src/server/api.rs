use std::sync::Arc;
use axum::{
    routing::post,
    Router,
    Json,
    body::Bytes,
    extract::{ Request, State },
    http::{ header, Method },
    middleware::{ self, Next },
    response::{ IntoResponse, Response },
};
use tower_http::cors::{ Any, CorsLayer };
use log::{ debug, error, info };

use crate::llm::chat::ChatClient;
use crate::models::chat::{ with_system_prompt, ChatRequest, ChatResponse };
use super::error::ApiError;

pub const CHAT_ROUTE: &str = "/api/chat";

/// Immutable per-process configuration shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub chat_client: Arc<dyn ChatClient>,
    pub system_prompt: Arc<str>,
}

impl AppState {
    pub fn new(chat_client: Arc<dyn ChatClient>, system_prompt: impl Into<Arc<str>>) -> Self {
        Self {
            chat_client,
            system_prompt: system_prompt.into(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(CHAT_ROUTE, post(chat_handler).fallback(method_not_allowed))
        .layer(cors)
        .layer(middleware::from_fn(reject_bare_options))
        .with_state(state)
}

/// The CORS layer answers every OPTIONS request itself. Only a browser
/// preflight (one naming `Access-Control-Request-Method`) gets through; any
/// other OPTIONS is an unsupported verb like GET or PUT.
async fn reject_bare_options(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS
        && !request.headers().contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
    {
        debug!("Rejecting OPTIONS {} without a preflight header", request.uri().path());
        return ApiError::MethodNotAllowed.into_response();
    }
    next.run(request).await
}

/// Validates the body before anything leaves the process; a rejected request
/// never reaches the upstream provider.
pub fn parse_chat_request(body: &[u8]) -> Result<ChatRequest, ApiError> {
    serde_json::from_slice::<ChatRequest>(body).map_err(|e| {
        debug!("Rejecting chat request body: {}", e);
        ApiError::BadRequest
    })
}

pub async fn chat_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    let request = parse_chat_request(&body)?;
    let conversation = with_system_prompt(&state.system_prompt, &request.messages);
    info!("Forwarding conversation of {} client messages", request.messages.len());

    match state.chat_client.complete(&conversation).await {
        Ok(content) => Ok(Json(ChatResponse { content })),
        Err(e) => {
            error!("Error calling OpenAI API: {}", e);
            Err(ApiError::Upstream(e.to_string()))
        }
    }
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
