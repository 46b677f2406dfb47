//! Errors returned by the chat endpoint, mapped onto the JSON bodies the
//! chat widget expects.

use axum::{
    Json,
    http::{ header, StatusCode },
    response::{ IntoResponse, Response },
};
use thiserror::Error;

use crate::models::chat::ErrorResponse;

pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";
pub const BAD_REQUEST_MESSAGE: &str = "Bad request. 'messages' is required.";
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Error calling OpenAI API";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}", METHOD_NOT_ALLOWED_MESSAGE)]
    MethodNotAllowed,

    #[error("{}", BAD_REQUEST_MESSAGE)]
    BadRequest,

    /// The upstream call failed; carries the underlying error text.
    #[error("{}: {}", UPSTREAM_FAILURE_MESSAGE, .0)]
    Upstream(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MethodNotAllowed => {
                let body = Json(ErrorResponse {
                    message: METHOD_NOT_ALLOWED_MESSAGE.to_string(),
                    error: None,
                });
                (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "POST")], body).into_response()
            }
            ApiError::BadRequest => {
                let body = Json(ErrorResponse {
                    message: BAD_REQUEST_MESSAGE.to_string(),
                    error: None,
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Upstream(error) => {
                let body = Json(ErrorResponse {
                    message: UPSTREAM_FAILURE_MESSAGE.to_string(),
                    error: Some(error),
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}
