//! Sequencing of external calls around one session's state.
//!
//! A refresh runs two independent branches at the same time:
//!
//! ```text
//! ┌ profile ─┐
//! ├ player  ─┤                      (results applied, errors reported)
//! └ history ─→ weather step: latest readings → select playlist → metadata
//! ```
//!
//! The weather step waits for the history fetch only. A failed history fetch
//! skips it entirely, while profile and player results are still applied.
//!
//! Every operation takes the session by `&mut`, so the caller holds the
//! session lock for the whole sequence.

use std::sync::Arc;

use crate::{
    error::{AppError, Result},
    info,
    management::{RECENT_READINGS, WeatherStore},
    playlist::{Catalog, Mood},
    session::{RECENT_TRACKS, SessionState},
    spotify::{MusicGateway, PlayerAction},
    success,
    types::{PlayHistoryItem, PlayerState, Profile, SelectedPlaylist, WeatherReading},
    utils, warning,
};

pub const CALLBACK_FAILED: &str = "Something went wrong during Spotify callback...Try again";

/// Transport buttons of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCommand {
    Play,
    Pause,
    PlayPause,
    Next,
    Previous,
    Repeat,
    Shuffle,
}

/// Where the browser goes once a transport command succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterCommand {
    /// Render the dashboard from the state already held
    Home,
    /// Run a full state refresh first
    Refresh,
}

impl TransportCommand {
    pub fn after(&self) -> AfterCommand {
        match self {
            TransportCommand::Play | TransportCommand::Pause | TransportCommand::PlayPause => {
                AfterCommand::Home
            }
            TransportCommand::Next
            | TransportCommand::Previous
            | TransportCommand::Repeat
            | TransportCommand::Shuffle => AfterCommand::Refresh,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistPick {
    Selected {
        mood: Mood,
        playlist: SelectedPlaylist,
    },
    /// No weather reading recorded yet, nothing was selected
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    pub pick: PlaylistPick,
}

struct Cycle {
    profile: Result<Profile>,
    player: Result<Option<PlayerState>>,
    history: Result<Vec<PlayHistoryItem>>,
    /// `None` when the history fetch failed and the step never ran
    weather: Option<(Vec<WeatherReading>, Result<PlaylistPick>)>,
}

impl Cycle {
    fn token_rejected(&self) -> bool {
        is_rejected(&self.profile)
            || is_rejected(&self.player)
            || is_rejected(&self.history)
            || self
                .weather
                .as_ref()
                .is_some_and(|(_, pick)| is_rejected(pick))
    }
}

fn is_rejected<T>(result: &Result<T>) -> bool {
    matches!(result, Err(AppError::TokenRejected { .. }))
}

pub struct Orchestrator {
    music: Arc<dyn MusicGateway>,
    store: Arc<WeatherStore>,
    catalog: Catalog,
}

impl Orchestrator {
    pub fn new(music: Arc<dyn MusicGateway>, store: Arc<WeatherStore>, catalog: Catalog) -> Self {
        Self {
            music,
            store,
            catalog,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &WeatherStore {
        &self.store
    }

    /// Moves the session to `AuthPending` and returns the URL to redirect to.
    ///
    /// # Arguments
    ///
    /// * `session` - Session that receives the freshly generated OAuth state
    ///
    /// # Returns
    ///
    /// The Spotify authorize URL carrying the same state value.
    ///
    /// # Errors
    ///
    /// [`AppError::Config`] when the gateway cannot build the URL. The
    /// session is left untouched in that case.
    pub fn begin_authorization(&self, session: &mut SessionState) -> Result<String> {
        let oauth_state = utils::generate_oauth_state();
        let url = self.music.authorize_url(&oauth_state)?;
        session.begin_authorization(oauth_state);
        info!("Spotify authorization started, redirecting to provider");
        Ok(url)
    }

    /// Finishes the authorization-code grant started by
    /// [`Orchestrator::begin_authorization`].
    ///
    /// # Arguments
    ///
    /// * `session` - Session holding the pending OAuth state
    /// * `code` - Authorization code from the callback query, if any
    /// * `state` - OAuth state echoed back by Spotify
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] when the code is missing or the state does
    ///   not match the pending request
    /// - whatever the token exchange returned when it failed
    ///
    /// On any error the session is back in `Unauthenticated`.
    pub async fn complete_authorization(
        &self,
        session: &mut SessionState,
        code: Option<&str>,
        state: Option<&str>,
    ) -> Result<()> {
        let state_matches = session.take_oauth_state(state);

        let Some(code) = code.filter(|c| !c.is_empty()) else {
            warning!("Code returned null from authorisation endpoint");
            session.expire();
            return Err(AppError::Validation(CALLBACK_FAILED.to_string()));
        };
        if !state_matches {
            warning!("Authorization callback state does not match the pending request");
            session.expire();
            return Err(AppError::Validation(CALLBACK_FAILED.to_string()));
        }

        match self.music.exchange_code(code).await {
            Ok(token) => {
                session.complete_authorization(token);
                success!("Successfully retrieved access token!");
                Ok(())
            }
            Err(e) => {
                warning!("Token exchange failed: {}", e);
                session.expire();
                Err(e)
            }
        }
    }

    /// Full state refresh: profile, player, history, then weather and
    /// playlist once history is in.
    ///
    /// Every successful result is stored in the session even when a sibling
    /// call failed. The first failure is returned in the order history,
    /// weather step, profile, player.
    ///
    /// # Arguments
    ///
    /// * `session` - Authenticated session to refresh in place
    ///
    /// # Returns
    ///
    /// A [`RefreshReport`] with the playlist pick of the weather step.
    ///
    /// # Errors
    ///
    /// [`AppError::AuthMissing`] without a usable token, otherwise the first
    /// failure in the order above.
    pub async fn refresh(&self, session: &mut SessionState) -> Result<RefreshReport> {
        let token = self.access_token(session).await?;
        let mut cycle = self.run_cycle(&token).await;

        if cycle.token_rejected() {
            let token = self.recover(session).await?;
            cycle = self.run_cycle(&token).await;
            if cycle.token_rejected() {
                warning!("Refreshed token was rejected as well");
                session.expire();
                return Err(AppError::AuthMissing);
            }
        }

        self.apply_cycle(session, cycle)
    }

    /// Weather step on its own: latest readings, selection, playlist lookup.
    ///
    /// # Arguments
    ///
    /// * `session` - Authenticated session that receives readings and pick
    ///
    /// # Returns
    ///
    /// The [`PlaylistPick`], which is `InsufficientData` when nothing was
    /// recorded.
    ///
    /// # Errors
    ///
    /// [`AppError::AuthMissing`] without a usable token, or the playlist
    /// lookup failure after one token refresh on a 401.
    pub async fn refresh_weather(&self, session: &mut SessionState) -> Result<PlaylistPick> {
        let token = self.access_token(session).await?;
        let (readings, mut pick) = self.weather_step(&token).await;
        session.weather = readings;

        if is_rejected(&pick) {
            let token = self.recover(session).await?;
            let (readings, retry) = self.weather_step(&token).await;
            session.weather = readings;
            pick = retry;
        }

        match pick {
            Ok(pick) => {
                apply_pick(session, &pick);
                Ok(pick)
            }
            Err(e) => Err(self.fail(session, e)),
        }
    }

    /// Sends one transport command and updates the mirrored state once the
    /// service accepted it.
    ///
    /// # Arguments
    ///
    /// * `session` - Session whose player flags are mirrored
    /// * `command` - Transport button that was pressed
    ///
    /// # Returns
    ///
    /// Where the browser goes next, see [`TransportCommand::after`].
    ///
    /// # Errors
    ///
    /// Without a token this fails with [`AppError::AuthMissing`] before any
    /// external call is made. A rejected call is retried once after a token
    /// refresh; any other service error is returned as is.
    pub async fn command(
        &self,
        session: &mut SessionState,
        command: TransportCommand,
    ) -> Result<AfterCommand> {
        let token = self.access_token(session).await?;
        let action = match command {
            TransportCommand::Play => PlayerAction::Play,
            TransportCommand::Pause => PlayerAction::Pause,
            TransportCommand::PlayPause if session.playing => PlayerAction::Pause,
            TransportCommand::PlayPause => PlayerAction::Play,
            TransportCommand::Next => PlayerAction::Next,
            TransportCommand::Previous => PlayerAction::Previous,
            TransportCommand::Repeat => PlayerAction::Repeat(session.repeat.next()),
            TransportCommand::Shuffle => PlayerAction::Shuffle(!session.shuffle),
        };

        let sent = match self.music.send(&token, action).await {
            Err(AppError::TokenRejected { .. }) => {
                let token = self.recover(session).await?;
                self.music.send(&token, action).await
            }
            other => other,
        };
        if let Err(e) = sent {
            return Err(self.fail(session, e));
        }

        match action {
            PlayerAction::Play => session.playing = true,
            PlayerAction::Pause => session.playing = false,
            PlayerAction::Repeat(_) => {
                session.toggle_repeat();
            }
            PlayerAction::Shuffle(_) => {
                session.toggle_shuffle();
            }
            PlayerAction::Next | PlayerAction::Previous => {}
        }
        session.last_error = None;
        Ok(command.after())
    }

    async fn run_cycle(&self, token: &str) -> Cycle {
        let status = async { tokio::join!(self.music.profile(token), self.music.player(token)) };

        let history_then_weather = async {
            let history = self.music.recently_played(token, RECENT_TRACKS).await;
            let weather = match history {
                Ok(_) => Some(self.weather_step(token).await),
                Err(_) => None,
            };
            (history, weather)
        };

        let ((profile, player), (history, weather)) = tokio::join!(status, history_then_weather);
        Cycle {
            profile,
            player,
            history,
            weather,
        }
    }

    /// Reads the latest readings and, when there is at least one, selects a
    /// playlist for the newest and fetches its metadata.
    async fn weather_step(&self, token: &str) -> (Vec<WeatherReading>, Result<PlaylistPick>) {
        let readings = self.store.recent_readings(RECENT_READINGS).await;
        let Some(latest) = readings.first() else {
            info!("No weather reading yet, skipping playlist selection");
            return (readings, Ok(PlaylistPick::InsufficientData));
        };

        let choice = self.catalog.select(latest);
        info!(
            "Latest reading {:.1} °C / {:.1} % is {}, picked playlist {}",
            latest.temperature, latest.humidity, choice.mood, choice.id
        );

        let pick = self
            .music
            .playlist(token, &choice.id)
            .await
            .map(|playlist| PlaylistPick::Selected {
                mood: choice.mood,
                playlist,
            });
        (readings, pick)
    }

    fn apply_cycle(&self, session: &mut SessionState, cycle: Cycle) -> Result<RefreshReport> {
        let Cycle {
            profile,
            player,
            history,
            weather,
        } = cycle;
        let mut failures: Vec<(&str, AppError)> = Vec::new();

        match history {
            Ok(items) => session.apply_history(items),
            Err(e) => failures.push(("recently-played", e)),
        }

        let mut pick = None;
        if let Some((readings, result)) = weather {
            session.weather = readings;
            match result {
                Ok(p) => {
                    apply_pick(session, &p);
                    pick = Some(p);
                }
                Err(e) => failures.push(("playlist", e)),
            }
        }

        match profile {
            Ok(profile) => session.profile = Some(profile),
            Err(e) => failures.push(("me", e)),
        }

        match player {
            Ok(player) => session.apply_player(player),
            Err(e) => failures.push(("player", e)),
        }

        for (step, e) in &failures {
            warning!("Refresh step {} failed: {}", step, e);
        }

        match (failures.into_iter().next(), pick) {
            (Some((_, e)), _) => Err(self.fail(session, e)),
            (None, Some(pick)) => {
                session.last_error = None;
                success!("Refreshed player state and playlist");
                Ok(RefreshReport { pick })
            }
            // unreachable: no failure means history succeeded and the weather step ran
            (None, None) => Ok(RefreshReport {
                pick: PlaylistPick::InsufficientData,
            }),
        }
    }

    /// Current access token, refreshed first when it is known to be stale.
    async fn access_token(&self, session: &mut SessionState) -> Result<String> {
        let Some(token) = session.token() else {
            warning!("Access token is null");
            return Err(AppError::AuthMissing);
        };
        if token.is_expired() {
            info!("Access token expired, refreshing");
            return self.recover(session).await;
        }
        Ok(token.access_token.clone())
    }

    /// Trades the stored refresh token for a new access token. Without a
    /// refresh token, or when the exchange fails, the session falls back to
    /// `Unauthenticated`.
    async fn recover(&self, session: &mut SessionState) -> Result<String> {
        let Some(refresh_token) = session.refresh_token().map(String::from) else {
            warning!("Token rejected and no refresh token stored, re-authorization needed");
            session.expire();
            return Err(AppError::AuthMissing);
        };

        match self.music.refresh_token(&refresh_token).await {
            Ok(token) => {
                let access_token = token.access_token.clone();
                session.replace_token(token);
                success!("Access token refreshed");
                Ok(access_token)
            }
            Err(e) => {
                warning!("Token refresh failed: {}", e);
                session.expire();
                Err(AppError::AuthMissing)
            }
        }
    }

    /// Records a failure on the session. A token rejected even after a
    /// refresh ends the authorization.
    fn fail(&self, session: &mut SessionState, err: AppError) -> AppError {
        if matches!(err, AppError::TokenRejected { .. }) {
            session.expire();
            return AppError::AuthMissing;
        }
        session.last_error = Some(err.to_string());
        err
    }
}

fn apply_pick(session: &mut SessionState, pick: &PlaylistPick) {
    match pick {
        PlaylistPick::Selected { mood, playlist } => {
            session.selected_mood = Some(*mood);
            session.selected_playlist = Some(playlist.clone());
        }
        PlaylistPick::InsufficientData => session.clear_selection(),
    }
}
