use serde::Serialize;

use crate::playlist::Mood;
use crate::types::{
    Device, PlayHistoryItem, PlayerState, Profile, RepeatState, SelectedPlaylist, Token, Track,
    WeatherReading,
};

/// Maximum number of recently played tracks kept on the dashboard.
pub const RECENT_TRACKS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum AuthStatus {
    #[default]
    Unauthenticated,
    AuthPending,
    Authenticated,
}

/// Everything the dashboard knows about one browser session.
///
/// `token` and `auth` are private so that `Authenticated` always comes with a
/// token and losing the token always drops the selected playlist.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    auth: AuthStatus,
    token: Option<Token>,
    oauth_state: Option<String>,
    pub operator: Option<String>,
    pub profile: Option<Profile>,
    pub current_track: Option<Track>,
    pub current_device: Option<Device>,
    pub recent_tracks: Vec<PlayHistoryItem>,
    pub playing: bool,
    pub shuffle: bool,
    pub repeat: RepeatState,
    pub selected_playlist: Option<SelectedPlaylist>,
    pub selected_mood: Option<Mood>,
    pub weather: Vec<WeatherReading>,
    pub last_error: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auth_status(&self) -> AuthStatus {
        self.auth
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth == AuthStatus::Authenticated
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.access_token.as_str())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.token.as_ref().and_then(|t| t.refresh_token.as_deref())
    }

    /// `Unauthenticated -> AuthPending`, remembering the OAuth `state` nonce.
    /// A previous token is dropped.
    pub fn begin_authorization(&mut self, oauth_state: String) {
        self.token = None;
        self.clear_selection();
        self.auth = AuthStatus::AuthPending;
        self.oauth_state = Some(oauth_state);
    }

    /// Consumes the pending nonce and reports whether `returned` matches it.
    pub fn take_oauth_state(&mut self, returned: Option<&str>) -> bool {
        match (self.oauth_state.take(), returned) {
            (Some(expected), Some(returned)) => expected == returned,
            _ => false,
        }
    }

    /// `AuthPending -> Authenticated`.
    pub fn complete_authorization(&mut self, token: Token) {
        self.auth = AuthStatus::Authenticated;
        self.token = Some(token);
        self.last_error = None;
    }

    /// Replaces a refreshed token. A refresh answer without a new refresh
    /// token keeps the previous one.
    pub fn replace_token(&mut self, mut token: Token) {
        if token.refresh_token.is_none() {
            token.refresh_token = self.refresh_token().map(String::from);
        }
        self.token = Some(token);
        self.auth = AuthStatus::Authenticated;
    }

    /// Any rejected or unrefreshable token lands here.
    pub fn expire(&mut self) {
        self.auth = AuthStatus::Unauthenticated;
        self.token = None;
        self.oauth_state = None;
        self.clear_selection();
    }

    pub fn clear_selection(&mut self) {
        self.selected_playlist = None;
        self.selected_mood = None;
    }

    /// Back to a fresh session.
    pub fn logout(&mut self) {
        *self = Self::default();
    }

    pub fn apply_player(&mut self, player: Option<PlayerState>) {
        match player {
            Some(player) => {
                self.playing = player.is_playing;
                self.current_track = player.item;
                self.current_device = player.device;
                self.repeat = player.repeat_state;
                self.shuffle = player.shuffle_state;
            }
            // no active device
            None => {
                self.playing = false;
                self.current_track = None;
                self.current_device = None;
            }
        }
    }

    pub fn apply_history(&mut self, mut items: Vec<PlayHistoryItem>) {
        items.truncate(RECENT_TRACKS);
        self.recent_tracks = items;
    }

    /// Flips shuffle and returns the new value.
    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffle = !self.shuffle;
        self.shuffle
    }

    /// Advances the repeat cycle and returns the new value.
    pub fn toggle_repeat(&mut self) -> RepeatState {
        self.repeat = self.repeat.next();
        self.repeat
    }

    pub fn display_name(&self) -> Option<&str> {
        self.profile
            .as_ref()
            .map(|p| p.display_name.as_deref().unwrap_or(p.id.as_str()))
    }
}
