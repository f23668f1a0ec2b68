use std::path::PathBuf;

use crate::{error::AppError, management::JsonLog, types::WeatherReading};

/// Number of readings the dashboard shows and the selector looks at.
pub const RECENT_READINGS: usize = 5;

/// Append-only log of weather readings.
///
/// "Latest" means last inserted. Timestamps are display strings and are
/// never compared.
pub struct WeatherStore {
    log: JsonLog<WeatherReading>,
}

impl WeatherStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        Ok(Self {
            log: JsonLog::open(path).await?,
        })
    }

    pub async fn record(&self, reading: WeatherReading) -> Result<(), AppError> {
        self.log.append(reading).await
    }

    /// Up to `limit` readings, most recent first.
    pub async fn recent_readings(&self, limit: usize) -> Vec<WeatherReading> {
        self.log.newest(limit).await
    }

    pub async fn latest(&self) -> Option<WeatherReading> {
        self.log.newest(1).await.into_iter().next()
    }

    pub async fn len(&self) -> usize {
        self.log.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.log.is_empty().await
    }
}
