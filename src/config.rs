//! Configuration management for the weather dashboard.
//!
//! Configuration comes from environment variables, optionally loaded from a
//! `.env` file. The lookup order is:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory (`weathertune/.env`)
//! 3. `.env` file in the working directory
//! 4. Application defaults (where applicable)
//!
//! Everything is read once into [`Settings`] at startup so request handlers
//! never touch the process environment.

use std::{env, path::PathBuf, time::Duration};

use crate::error::AppError;

pub const APP_DIR: &str = "weathertune";

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:3000";
pub const DEFAULT_SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_SCOPE: &str = "user-modify-playback-state user-read-email \
user-read-playback-state user-read-private user-read-recently-played user-read-currently-playing";
pub const DEFAULT_OPENWEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_WEATHER_CITY: &str = "Manchester";

/// Loads environment variables from a `.env` file.
///
/// The file in the local data directory wins over one in the working
/// directory. A missing file is not an error: the variables may already be
/// set in the environment.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/weathertune/.env`
/// - macOS: `~/Library/Application Support/weathertune/.env`
/// - Windows: `%LOCALAPPDATA%/weathertune/.env`
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = default_data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    let in_data_dir = async_fs::metadata(&path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if in_data_dir {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    } else if let Err(e) = dotenv::dotenv() {
        if !e.not_found() {
            return Err(e.to_string());
        }
    }
    Ok(())
}

/// Platform-specific data directory used when `WEATHERTUNE_DATA_DIR` is unset.
pub fn default_data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Runtime settings read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// `SERVER_ADDRESS`, the address the dashboard binds to
    pub server_addr: String,
    /// `SPOTIFY_API_AUTH_CLIENT_ID`
    pub spotify_client_id: String,
    /// `SPOTIFY_API_AUTH_CLIENT_SECRET`, sent as HTTP Basic credentials
    pub spotify_client_secret: String,
    /// `SPOTIFY_API_REDIRECT_URI`, must match the one registered with Spotify
    pub spotify_redirect_uri: String,
    /// `SPOTIFY_API_AUTH_SCOPE`
    pub spotify_scope: String,
    /// `SPOTIFY_API_AUTH_URL`
    pub spotify_auth_url: String,
    /// `SPOTIFY_API_TOKEN_URL`
    pub spotify_token_url: String,
    /// `SPOTIFY_API_URL`
    pub spotify_api_url: String,
    /// `OPENWEATHER_API_KEY`; the provider is unavailable without it
    pub openweather_api_key: Option<String>,
    /// `OPENWEATHER_API_URL`
    pub openweather_url: String,
    /// `WEATHER_CITY`
    pub weather_city: String,
    /// `WEATHER_POLL_INTERVAL_SECS`; polling is disabled when unset or zero
    pub weather_poll_interval: Option<Duration>,
    /// `PLAYLISTS_SUNNY`, comma separated playlist ids
    pub sunny_playlists: Option<Vec<String>>,
    /// `PLAYLISTS_RAINY`, comma separated playlist ids
    pub rainy_playlists: Option<Vec<String>>,
    /// `WEATHERTUNE_DATA_DIR`
    pub data_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_addr: DEFAULT_SERVER_ADDRESS.to_string(),
            spotify_client_id: String::new(),
            spotify_client_secret: String::new(),
            spotify_redirect_uri: callback_url(DEFAULT_SERVER_ADDRESS),
            spotify_scope: DEFAULT_SPOTIFY_SCOPE.to_string(),
            spotify_auth_url: DEFAULT_SPOTIFY_AUTH_URL.to_string(),
            spotify_token_url: DEFAULT_SPOTIFY_TOKEN_URL.to_string(),
            spotify_api_url: DEFAULT_SPOTIFY_API_URL.to_string(),
            openweather_api_key: None,
            openweather_url: DEFAULT_OPENWEATHER_URL.to_string(),
            weather_city: DEFAULT_WEATHER_CITY.to_string(),
            weather_poll_interval: None,
            sunny_playlists: None,
            rainy_playlists: None,
            data_dir: default_data_dir(),
        }
    }
}

impl Settings {
    /// Builds the settings from the process environment.
    ///
    /// # Errors
    ///
    /// Fails when a numeric variable cannot be parsed. Missing Spotify
    /// credentials are only reported by [`Settings::require_spotify`].
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();
        let server_addr = var_or("SERVER_ADDRESS", &defaults.server_addr);
        let spotify_redirect_uri = var_or(
            "SPOTIFY_API_REDIRECT_URI",
            &callback_url(&server_addr),
        );

        let weather_poll_interval = match optional_var("WEATHER_POLL_INTERVAL_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| {
                    AppError::Config(format!("WEATHER_POLL_INTERVAL_SECS '{}': {}", raw, e))
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            server_addr,
            spotify_client_id: var_or("SPOTIFY_API_AUTH_CLIENT_ID", ""),
            spotify_client_secret: var_or("SPOTIFY_API_AUTH_CLIENT_SECRET", ""),
            spotify_redirect_uri,
            spotify_scope: var_or("SPOTIFY_API_AUTH_SCOPE", &defaults.spotify_scope),
            spotify_auth_url: var_or("SPOTIFY_API_AUTH_URL", &defaults.spotify_auth_url),
            spotify_token_url: var_or("SPOTIFY_API_TOKEN_URL", &defaults.spotify_token_url),
            spotify_api_url: var_or("SPOTIFY_API_URL", &defaults.spotify_api_url),
            openweather_api_key: optional_var("OPENWEATHER_API_KEY"),
            openweather_url: var_or("OPENWEATHER_API_URL", &defaults.openweather_url),
            weather_city: var_or("WEATHER_CITY", &defaults.weather_city),
            weather_poll_interval,
            sunny_playlists: optional_var("PLAYLISTS_SUNNY").map(|v| split_ids(&v)),
            rainy_playlists: optional_var("PLAYLISTS_RAINY").map(|v| split_ids(&v)),
            data_dir: optional_var("WEATHERTUNE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
        })
    }

    /// The dashboard cannot authorize without client credentials.
    pub fn require_spotify(&self) -> Result<(), AppError> {
        if self.spotify_client_id.is_empty() {
            return Err(AppError::Config("SPOTIFY_API_AUTH_CLIENT_ID must be set".to_string()));
        }
        if self.spotify_client_secret.is_empty() {
            return Err(AppError::Config(
                "SPOTIFY_API_AUTH_CLIENT_SECRET must be set".to_string(),
            ));
        }
        Ok(())
    }

    /// Replaces the bind address. A redirect URI derived from the old
    /// address follows the new one; an explicitly configured one is kept.
    pub fn override_server_addr(&mut self, addr: String) {
        if self.spotify_redirect_uri == callback_url(&self.server_addr) {
            self.spotify_redirect_uri = callback_url(&addr);
        }
        self.server_addr = addr;
    }

    pub fn weather_store_path(&self) -> PathBuf {
        self.data_dir.join("weather.json")
    }

    pub fn user_store_path(&self) -> PathBuf {
        self.data_dir.join("users.json")
    }

    /// Address a browser should open to reach the dashboard.
    pub fn dashboard_url(&self) -> String {
        format!("http://{}/", self.server_addr)
    }
}

/// Splits a comma separated list, dropping blanks.
pub fn split_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn callback_url(addr: &str) -> String {
    format!("http://{}/auth/callback", addr)
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn var_or(key: &str, default: &str) -> String {
    optional_var(key).unwrap_or_else(|| default.to_string())
}
