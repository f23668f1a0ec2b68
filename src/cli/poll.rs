use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config::Settings,
    error,
    management::WeatherStore,
    success,
    weather::{OpenWeatherClient, WeatherProvider},
};

/// Fetches the current conditions once and appends them to the store.
pub async fn poll(settings: &Settings) {
    let Some(provider) = OpenWeatherClient::from_settings(settings) else {
        error!("OPENWEATHER_API_KEY is not set.");
    };
    let store = match WeatherStore::open(settings.weather_store_path()).await {
        Ok(store) => store,
        Err(e) => error!("Cannot open weather store. Err: {}", e),
    };

    let pb = ProgressBar::new_spinner();
    pb.set_message(format!("Fetching weather for {}...", provider.city()));
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let reading = match provider.current_conditions().await {
        Ok(reading) => reading,
        Err(e) => {
            pb.finish_and_clear();
            error!("Weather poll failed. Err: {}", e);
        }
    };
    pb.finish_and_clear();

    if let Err(e) = store.record(reading.clone()).await {
        error!("Failed to store reading. Err: {}", e);
    }
    success!(
        "Recorded {:.1} °C, {:.1} % at {}",
        reading.temperature,
        reading.humidity,
        reading.timestamp
    );
}
