//! # Spotify Integration Module
//!
//! Every outbound call to the Spotify Web API and the Spotify accounts
//! service goes through the [`MusicGateway`] trait. [`SpotifyClient`] is the
//! reqwest implementation; tests substitute their own.
//!
//! ## Layout
//!
//! ```text
//! Orchestrator
//!      ↓
//! MusicGateway (trait)
//!      ↓
//! SpotifyClient
//!     ├── auth      authorize URL, code exchange, token refresh
//!     ├── player    profile, player state, history, transport commands
//!     └── playlist  playlist metadata
//!      ↓
//! reqwest
//! ```
//!
//! ## Error Handling
//!
//! Calls are never retried here. A 401 from the Web API becomes
//! [`AppError::TokenRejected`] so the orchestrator can refresh the token;
//! every other non-2xx answer and every transport failure becomes
//! [`AppError::ExternalService`] carrying the provider's message.

mod auth;
mod client;
mod player;
mod playlist;

use async_trait::async_trait;
use reqwest::Method;

pub use client::SERVICE;
pub use client::SpotifyClient;

use crate::{
    error::AppError,
    types::{PlayHistoryItem, PlayerState, Profile, RepeatState, SelectedPlaylist, Token},
};

/// A single playback command sent to `me/player/*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Play,
    Pause,
    Next,
    Previous,
    Repeat(RepeatState),
    Shuffle(bool),
}

impl PlayerAction {
    pub fn method(&self) -> Method {
        match self {
            PlayerAction::Next | PlayerAction::Previous => Method::POST,
            _ => Method::PUT,
        }
    }

    /// Path below the API base URL, including the query string.
    pub fn path(&self) -> String {
        match self {
            PlayerAction::Play => "me/player/play".to_string(),
            PlayerAction::Pause => "me/player/pause".to_string(),
            PlayerAction::Next => "me/player/next".to_string(),
            PlayerAction::Previous => "me/player/previous".to_string(),
            PlayerAction::Repeat(state) => format!("me/player/repeat?state={}", state),
            PlayerAction::Shuffle(on) => format!("me/player/shuffle?state={}", on),
        }
    }
}

#[async_trait]
pub trait MusicGateway: Send + Sync {
    /// URL the browser is redirected to for the authorization-code grant.
    ///
    /// # Arguments
    ///
    /// * `state` - Opaque value Spotify echoes back on the callback
    ///
    /// # Errors
    ///
    /// [`AppError::Config`] when the configured accounts URL is invalid.
    fn authorize_url(&self, state: &str) -> Result<String, AppError>;

    /// Trades an authorization code for an access and refresh token.
    ///
    /// # Arguments
    ///
    /// * `code` - Code received on the callback
    ///
    /// # Returns
    ///
    /// A [`Token`] stamped with the time it was obtained.
    ///
    /// # Errors
    ///
    /// [`AppError::ExternalService`] when the accounts service refuses the
    /// code or cannot be reached.
    async fn exchange_code(&self, code: &str) -> Result<Token, AppError>;

    /// Gets a new access token. The returned token has `refresh_token: None`
    /// when Spotify did not rotate it.
    ///
    /// # Errors
    ///
    /// [`AppError::ExternalService`] when the refresh is refused.
    async fn refresh_token(&self, refresh_token: &str) -> Result<Token, AppError>;

    /// # Errors
    ///
    /// [`AppError::TokenRejected`] on a 401, [`AppError::ExternalService`]
    /// for any other failure. The same holds for every call below that
    /// takes a token.
    async fn profile(&self, token: &str) -> Result<Profile, AppError>;

    /// `None` when no device is active.
    async fn player(&self, token: &str) -> Result<Option<PlayerState>, AppError>;

    /// Most recent first.
    async fn recently_played(
        &self,
        token: &str,
        limit: usize,
    ) -> Result<Vec<PlayHistoryItem>, AppError>;

    /// # Arguments
    ///
    /// * `token` - Valid access token
    /// * `action` - Command to send, mapped to its method and path by
    ///   [`PlayerAction`]
    async fn send(&self, token: &str, action: PlayerAction) -> Result<(), AppError>;

    /// Name, link and cover of a playlist.
    async fn playlist(&self, token: &str, id: &str) -> Result<SelectedPlaylist, AppError>;
}

#[async_trait]
impl MusicGateway for SpotifyClient {
    fn authorize_url(&self, state: &str) -> Result<String, AppError> {
        self.build_authorize_url(state)
    }

    async fn exchange_code(&self, code: &str) -> Result<Token, AppError> {
        self.exchange_authorization_code(code).await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<Token, AppError> {
        self.refresh_access_token(refresh_token).await
    }

    async fn profile(&self, token: &str) -> Result<Profile, AppError> {
        self.get_profile(token).await
    }

    async fn player(&self, token: &str) -> Result<Option<PlayerState>, AppError> {
        self.get_player(token).await
    }

    async fn recently_played(
        &self,
        token: &str,
        limit: usize,
    ) -> Result<Vec<PlayHistoryItem>, AppError> {
        self.get_recently_played(token, limit).await
    }

    async fn send(&self, token: &str, action: PlayerAction) -> Result<(), AppError> {
        self.send_player_action(token, action).await
    }

    async fn playlist(&self, token: &str, id: &str) -> Result<SelectedPlaylist, AppError> {
        self.get_playlist(token, id).await
    }
}
