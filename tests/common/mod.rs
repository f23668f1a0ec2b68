//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::Utc;
use tempfile::TempDir;
use tokio::sync::watch;

use weathertune::{
    error::AppError,
    management::WeatherStore,
    orchestrator::Orchestrator,
    playlist::Catalog,
    spotify::{MusicGateway, PlayerAction},
    types::{ArtistRef, PlayHistoryItem, PlayerState, Profile, RepeatState, SelectedPlaylist, Token, Track},
};

pub const FRESH_TOKEN: &str = "fresh-access";

/// Call held back until a playlist lookup has been seen, then failed with 503.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Profile,
    Player,
}

/// In-memory music service that records every call it receives.
pub struct FakeMusic {
    calls: Mutex<Vec<String>>,
    playlists: Mutex<Vec<String>>,
    sent: Mutex<Vec<PlayerAction>>,
    rejected: Mutex<HashSet<String>>,
    history_status: Option<u16>,
    refresh_fails: bool,
    gate: Option<Gate>,
    playlist_seen: watch::Sender<bool>,
}

impl Default for FakeMusic {
    fn default() -> Self {
        Self {
            calls: Mutex::default(),
            playlists: Mutex::default(),
            sent: Mutex::default(),
            rejected: Mutex::default(),
            history_status: None,
            refresh_fails: false,
            gate: None,
            playlist_seen: watch::channel(false).0,
        }
    }
}

impl FakeMusic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recently-played answers with this status instead of tracks.
    pub fn failing_history(status: u16) -> Self {
        Self {
            history_status: Some(status),
            ..Self::default()
        }
    }

    pub fn failing_refresh() -> Self {
        Self {
            refresh_fails: true,
            ..Self::default()
        }
    }

    pub fn gated(gate: Gate) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    /// Answers 401 for every call made with `token`.
    pub fn reject(self, token: &str) -> Self {
        self.rejected.lock().unwrap().insert(token.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == name).count()
    }

    pub fn requested_playlists(&self) -> Vec<String> {
        self.playlists.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<PlayerAction> {
        self.sent.lock().unwrap().clone()
    }

    /// Waits for the first playlist lookup when `gate` is held back, then
    /// fails the call.
    async fn hold(&self, gate: Gate) -> Result<(), AppError> {
        if self.gate != Some(gate) {
            return Ok(());
        }
        let mut seen = self.playlist_seen.subscribe();
        let _ = seen.wait_for(|seen| *seen).await;
        Err(AppError::external("spotify", Some(503), format!("{:?} down", gate)))
    }

    fn record(&self, name: &str, token: Option<&str>) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(name.to_string());
        match token {
            Some(token) if self.rejected.lock().unwrap().contains(token) => {
                Err(AppError::TokenRejected { service: "spotify" })
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl MusicGateway for FakeMusic {
    fn authorize_url(&self, state: &str) -> Result<String, AppError> {
        Ok(format!("https://accounts.test/authorize?state={}", state))
    }

    async fn exchange_code(&self, code: &str) -> Result<Token, AppError> {
        self.record("exchange_code", None)?;
        if code == "bad-code" {
            return Err(AppError::external("spotify", Some(400), "invalid_grant"));
        }
        Ok(token("access", Some("refresh")))
    }

    async fn refresh_token(&self, _refresh_token: &str) -> Result<Token, AppError> {
        self.record("refresh_token", None)?;
        if self.refresh_fails {
            return Err(AppError::external("spotify", Some(400), "invalid_grant"));
        }
        Ok(token(FRESH_TOKEN, None))
    }

    async fn profile(&self, token: &str) -> Result<Profile, AppError> {
        self.record("profile", Some(token))?;
        self.hold(Gate::Profile).await?;
        Ok(Profile {
            id: "listener".to_string(),
            display_name: Some("Listener".to_string()),
            email: None,
        })
    }

    async fn player(&self, token: &str) -> Result<Option<PlayerState>, AppError> {
        self.record("player", Some(token))?;
        self.hold(Gate::Player).await?;
        Ok(Some(PlayerState {
            is_playing: true,
            item: Some(track("Now Playing")),
            device: None,
            repeat_state: RepeatState::Off,
            shuffle_state: false,
        }))
    }

    async fn recently_played(
        &self,
        token: &str,
        _limit: usize,
    ) -> Result<Vec<PlayHistoryItem>, AppError> {
        self.record("recently_played", Some(token))?;
        if let Some(status) = self.history_status {
            return Err(AppError::external("spotify", Some(status), "history unavailable"));
        }
        // more than asked for, the session keeps the newest five
        Ok((0..7)
            .map(|i| PlayHistoryItem {
                track: track(&format!("Track {}", i)),
                played_at: String::new(),
            })
            .collect())
    }

    async fn send(&self, token: &str, action: PlayerAction) -> Result<(), AppError> {
        self.record("send", Some(token))?;
        self.sent.lock().unwrap().push(action);
        Ok(())
    }

    async fn playlist(&self, token: &str, id: &str) -> Result<SelectedPlaylist, AppError> {
        self.record("playlist", Some(token))?;
        self.playlists.lock().unwrap().push(id.to_string());
        self.playlist_seen.send_replace(true);
        Ok(SelectedPlaylist {
            id: id.to_string(),
            name: format!("Playlist {}", id),
            owner: "Spotify".to_string(),
            image_url: None,
            external_url: None,
        })
    }
}

pub fn token(access: &str, refresh: Option<&str>) -> Token {
    Token {
        access_token: access.to_string(),
        refresh_token: refresh.map(String::from),
        scope: String::new(),
        expires_in: 3600,
        obtained_at: Utc::now().timestamp() as u64,
    }
}

/// A token handed out two hours ago with a one hour lifetime.
pub fn expired_token(access: &str, refresh: Option<&str>) -> Token {
    Token {
        obtained_at: (Utc::now().timestamp() - 7200) as u64,
        ..token(access, refresh)
    }
}

pub fn track(name: &str) -> Track {
    Track {
        id: None,
        name: name.to_string(),
        uri: String::new(),
        artists: vec![ArtistRef {
            name: "Artist".to_string(),
        }],
        album: None,
    }
}

pub async fn weather_store(dir: &TempDir) -> Arc<WeatherStore> {
    Arc::new(
        WeatherStore::open(dir.path().join("weather.json"))
            .await
            .expect("open weather store"),
    )
}

pub fn orchestrator(music: Arc<FakeMusic>, store: Arc<WeatherStore>) -> Orchestrator {
    Orchestrator::new(music, store, Catalog::default())
}
