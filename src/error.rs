//! Error types shared by the stores, gateways, orchestrator and handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::views;

/// Notice shown whenever an operation needs a Spotify token the session lacks.
pub const AUTH_MISSING_NOTICE: &str =
    "You have not been authorised...try going to the home page to login?";

#[derive(Error, Debug)]
pub enum AppError {
    /// No token, or the token was rejected and could not be refreshed
    #[error("{}", AUTH_MISSING_NOTICE)]
    AuthMissing,

    /// The music service answered 401 for the token that was sent
    #[error("{service} rejected the access token")]
    TokenRejected { service: &'static str },

    /// Non-2xx answer or transport failure from Spotify or the weather provider
    #[error("{service} request failed{}: {message}", status_suffix(.status))]
    ExternalService {
        service: &'static str,
        status: Option<u16>,
        message: String,
    },

    /// Reading or writing one of the JSON stores failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Malformed request input, rejected before anything is stored
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Playlist selection needs at least one weather reading
    #[error("No weather reading has been recorded yet")]
    InsufficientData,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn external(service: &'static str, status: Option<u16>, message: impl Into<String>) -> Self {
        AppError::ExternalService {
            service,
            status,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthMissing | AppError::TokenRejected { .. } => StatusCode::UNAUTHORIZED,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::ExternalService { .. } => StatusCode::BAD_GATEWAY,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientData => StatusCode::CONFLICT,
            AppError::Storage(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::AuthMissing | AppError::TokenRejected { .. } => {
                views::notice(AUTH_MISSING_NOTICE)
            }
            other => views::error_page(&other.to_string()),
        };
        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
