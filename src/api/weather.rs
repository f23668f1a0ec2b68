use axum::{
    Extension, Form, Json,
    extract::{Query, State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    api::views,
    error::AppError,
    management::RECENT_READINGS,
    server::AppState,
    session::Session,
    success,
    types::WeatherReading,
    utils, warning,
};

/// Sensor payload. Fields are strings so malformed numbers surface as a
/// validation error instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct WeatherForm {
    pub temperature: Option<String>,
    pub humidity: Option<String>,
}

impl WeatherForm {
    /// Validates the payload into a reading stamped with the server's time.
    pub fn into_reading(self) -> Result<WeatherReading, AppError> {
        let temperature = self
            .temperature
            .ok_or_else(|| AppError::Validation("temperature is required".to_string()))?;
        let humidity = self
            .humidity
            .ok_or_else(|| AppError::Validation("humidity is required".to_string()))?;

        let temperature =
            utils::parse_measurement("temperature", &temperature).map_err(AppError::Validation)?;
        let humidity =
            utils::parse_measurement("humidity", &humidity).map_err(AppError::Validation)?;
        if !(0.0..=100.0).contains(&humidity) {
            return Err(AppError::Validation(format!(
                "humidity must be between 0 and 100, got {}",
                humidity
            )));
        }

        Ok(utils::reading_now(temperature, humidity))
    }
}

/// Stores a sensor reading. The body is a urlencoded form; the query string
/// is accepted too for sensors that send their values as parameters.
pub async fn record(
    State(app): State<AppState>,
    Query(query): Query<WeatherForm>,
    body: Result<Form<WeatherForm>, FormRejection>,
) -> Result<Response, AppError> {
    let form = match body {
        Ok(Form(form)) => WeatherForm {
            temperature: form.temperature.or(query.temperature),
            humidity: form.humidity.or(query.humidity),
        },
        Err(_) => query,
    };

    let reading = form.into_reading().inspect_err(|e| {
        warning!("Rejected weather reading: {}", e);
    })?;
    app.weather.record(reading.clone()).await?;
    success!("Weather data have been successfully added to database!");
    Ok((StatusCode::CREATED, Json(reading)).into_response())
}

/// Latest readings. With a Spotify token the playlist selection runs as well.
pub async fn show(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Response, AppError> {
    let mut state = session.state.lock().await;
    if state.is_authenticated() {
        let pick = app.orchestrator.refresh_weather(&mut state).await?;
        return Ok(views::weather_page(&state.weather, Some(&pick)).into_response());
    }

    let readings = app.weather.recent_readings(RECENT_READINGS).await;
    Ok(views::weather_page(&readings, None).into_response())
}
