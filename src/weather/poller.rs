use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::{management::WeatherStore, success, warning, weather::WeatherProvider};

/// Records the provider's current conditions every `every`.
///
/// Failures are logged and the next tick tries again; nothing is retried
/// within a tick.
pub fn spawn_poller(
    provider: Arc<dyn WeatherProvider>,
    store: Arc<WeatherStore>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            match provider.current_conditions().await {
                Ok(reading) => match store.record(reading.clone()).await {
                    Ok(()) => success!(
                        "Polled weather: {:.1} °C, {:.1} %",
                        reading.temperature,
                        reading.humidity
                    ),
                    Err(e) => warning!("Failed to store polled reading: {}", e),
                },
                Err(e) => warning!("Weather poll failed: {}", e),
            }
        }
    })
}
