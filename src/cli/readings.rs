use tabled::Table;

use crate::{
    config::Settings,
    error, info,
    management::WeatherStore,
    playlist::Mood,
    types::ReadingTableRow,
    warning,
};

/// Prints up to `limit` stored readings, most recent first.
pub async fn readings(settings: &Settings, limit: usize) {
    let store = match WeatherStore::open(settings.weather_store_path()).await {
        Ok(store) => store,
        Err(e) => error!("Cannot open weather store. Err: {}", e),
    };

    let readings = store.recent_readings(limit).await;
    let Some(latest) = readings.first() else {
        warning!("No weather readings recorded yet.");
        return;
    };
    info!("Latest reading calls for a {} playlist.", Mood::for_reading(latest));

    let rows: Vec<ReadingTableRow> = readings.iter().map(ReadingTableRow::from).collect();
    println!("{}", Table::new(rows));
}
