use std::sync::Arc;

use crate::{
    config::Settings,
    error,
    management::{UserStore, WeatherStore},
    server::{self, AppState},
    spotify::{MusicGateway, SpotifyClient},
    success, warning,
    weather::{self, OpenWeatherClient},
};

/// Starts the dashboard.
///
/// Opens both stores under the data directory, wires the Spotify gateway
/// and, when `WEATHER_POLL_INTERVAL_SECS` and `OPENWEATHER_API_KEY` are both
/// set, a background weather poller. With `open` the dashboard URL is
/// opened in the default browser once the address is bound.
pub async fn serve(settings: Settings, open: bool) {
    if let Err(e) = settings.require_spotify() {
        error!("Cannot start dashboard. Err: {}", e);
    }

    let weather = match WeatherStore::open(settings.weather_store_path()).await {
        Ok(store) => Arc::new(store),
        Err(e) => error!("Cannot open weather store. Err: {}", e),
    };
    let users = match UserStore::open(settings.user_store_path()).await {
        Ok(store) => store,
        Err(e) => error!("Cannot open user store. Err: {}", e),
    };

    if let Some(every) = settings.weather_poll_interval {
        match OpenWeatherClient::from_settings(&settings) {
            Some(provider) => {
                success!(
                    "Polling weather for {} every {}s",
                    provider.city(),
                    every.as_secs()
                );
                weather::spawn_poller(Arc::new(provider), Arc::clone(&weather), every);
            }
            None => warning!("WEATHER_POLL_INTERVAL_SECS is set but OPENWEATHER_API_KEY is not, polling disabled"),
        }
    }

    let listener = match server::bind(&settings).await {
        Ok(listener) => listener,
        Err(e) => error!("Cannot start dashboard. Err: {}", e),
    };

    let url = settings.dashboard_url();
    let music: Arc<dyn MusicGateway> = Arc::new(SpotifyClient::new(&settings));
    let state = AppState::new(settings, users, weather, music);

    if open {
        if let Err(e) = webbrowser::open(&url) {
            warning!("Failed to open browser, visit {} manually. Err: {}", url, e);
        }
    }

    if let Err(e) = server::serve(listener, state).await {
        error!("Server failed. Err: {}", e);
    }
}
