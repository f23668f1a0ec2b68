//! Weather provider gateway.
//!
//! The sensor normally posts readings itself; the provider is a fallback
//! source used by the `poll` command and the optional background poller.

mod poller;

use async_trait::async_trait;
use reqwest::{Client, Url};

pub use poller::spawn_poller;

use crate::{
    config::Settings, error::AppError, info, types::CurrentConditionsResponse,
    types::WeatherReading, utils,
};

pub const SERVICE: &str = "openweather";

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions for the configured city, stamped with local time.
    ///
    /// # Errors
    ///
    /// [`AppError::ExternalService`] with the HTTP status when the provider
    /// answers with an error, without a status when it cannot be reached or
    /// the body does not decode.
    async fn current_conditions(&self) -> Result<WeatherReading, AppError>;
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    http: Client,
    url: String,
    api_key: String,
    city: String,
}

impl OpenWeatherClient {
    /// `None` when no API key is configured.
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        let api_key = settings.openweather_api_key.clone()?;
        Some(Self {
            http: Client::new(),
            url: settings.openweather_url.clone(),
            api_key,
            city: settings.weather_city.clone(),
        })
    }

    pub fn city(&self) -> &str {
        &self.city
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current_conditions(&self) -> Result<WeatherReading, AppError> {
        let url = Url::parse_with_params(
            &self.url,
            &[
                ("q", self.city.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ],
        )
        .map_err(|e| AppError::Config(format!("invalid OPENWEATHER_API_URL: {}", e)))?;

        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AppError::external(SERVICE, None, e.to_string()))?;

        let status = response.status();
        // the key is part of the query string, keep it out of the log
        info!("GET @ {} ({}) with response: {}", self.url, self.city, status.as_u16());
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::external(SERVICE, Some(status.as_u16()), body));
        }

        let body = response
            .json::<CurrentConditionsResponse>()
            .await
            .map_err(|e| AppError::external(SERVICE, None, e.to_string()))?;
        Ok(utils::reading_now(body.main.temp, body.main.humidity))
    }
}
