use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

use crate::{config::Settings, error::AppError, info};

pub const SERVICE: &str = "spotify";

/// reqwest-backed Spotify client configured from [`Settings`].
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    pub(super) http: Client,
    pub(super) client_id: String,
    pub(super) client_secret: String,
    pub(super) redirect_uri: String,
    pub(super) scope: String,
    pub(super) auth_url: String,
    pub(super) token_url: String,
    pub(super) api_url: String,
}

impl SpotifyClient {
    pub fn new(settings: &Settings) -> Self {
        Self::with_client(Client::new(), settings)
    }

    pub fn with_client(http: Client, settings: &Settings) -> Self {
        Self {
            http,
            client_id: settings.spotify_client_id.clone(),
            client_secret: settings.spotify_client_secret.clone(),
            redirect_uri: settings.spotify_redirect_uri.clone(),
            scope: settings.spotify_scope.clone(),
            auth_url: settings.spotify_auth_url.clone(),
            token_url: settings.spotify_token_url.clone(),
            api_url: settings.spotify_api_url.trim_end_matches('/').to_string(),
        }
    }

    pub(super) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path)
    }
}

/// Logs the outcome of an outbound call and maps failures.
///
/// With `token_in_use` a 401 means the bearer token was refused; on the
/// accounts service a 401 only means bad client credentials.
pub(super) async fn check(
    method: &str,
    url: &str,
    response: Response,
    token_in_use: bool,
) -> Result<Response, AppError> {
    let status = response.status();
    info!("{} @ {} with response: {}", method, url, status.as_u16());

    if status.is_success() {
        return Ok(response);
    }
    if token_in_use && status == StatusCode::UNAUTHORIZED {
        return Err(AppError::TokenRejected { service: SERVICE });
    }

    let body = response.text().await.unwrap_or_default();
    Err(AppError::external(
        SERVICE,
        Some(status.as_u16()),
        error_message(&body, status),
    ))
}

pub(super) fn transport_error(err: reqwest::Error) -> AppError {
    AppError::external(SERVICE, err.status().map(|s| s.as_u16()), err.to_string())
}

/// Pulls the human readable message out of a Spotify error body. The Web API
/// nests it under `error.message`, the accounts service uses
/// `error_description`.
fn error_message(body: &str, status: StatusCode) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|json| {
        json["error"]["message"]
            .as_str()
            .or_else(|| json["error_description"].as_str())
            .or_else(|| json["error"].as_str())
            .map(String::from)
    });

    message.unwrap_or_else(|| {
        if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        } else {
            body.trim().to_string()
        }
    })
}
