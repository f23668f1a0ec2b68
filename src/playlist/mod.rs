//! # Playlist Selection
//!
//! Maps the latest weather reading to a mood and picks a playlist for it.
//!
//! ## Rule
//!
//! A reading is **sunny** when `temperature >= 10` °C and `humidity <= 76` %.
//! Anything else is **rainy**. The playlist is drawn uniformly at random from
//! the catalog entry for that mood.
//!
//! The selector is never run without a reading; callers report
//! [`crate::error::AppError::InsufficientData`] instead.

use std::fmt;

use rand::Rng;
use serde::Serialize;

use crate::{config::Settings, types::WeatherReading};

pub const SUNNY_MIN_TEMPERATURE: f64 = 10.0;
pub const SUNNY_MAX_HUMIDITY: f64 = 76.0;

pub const SUNNY_PLAYLISTS: [&str; 3] = [
    "37i9dQZF1DX843Qf4lrFtZ", // Young, Wild & Free
    "37i9dQZF1DX1H4LbvY4OJi", // Happy Pop
    "37i9dQZF1DXeby79pVadGa", // Get Home Happy!
];

pub const RAINY_PLAYLISTS: [&str; 3] = [
    "37i9dQZF1DXaw68inx4UiN", // Sounds of the Rainforest
    "37i9dQZF1DX4PP3DA4J0N8", // Nature Sounds
    "37i9dQZF1DX4aYNO8X5RpR", // Nightstorms
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Sunny,
    Rainy,
}

impl Mood {
    pub fn for_reading(reading: &WeatherReading) -> Self {
        if reading.temperature >= SUNNY_MIN_TEMPERATURE && reading.humidity <= SUNNY_MAX_HUMIDITY
        {
            Mood::Sunny
        } else {
            Mood::Rainy
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mood::Sunny => f.write_str("sunny"),
            Mood::Rainy => f.write_str("rainy"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistChoice {
    pub mood: Mood,
    pub id: String,
}

/// Two fixed lists of playlist ids, one per mood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    sunny: Vec<String>,
    rainy: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            sunny: SUNNY_PLAYLISTS.iter().map(|s| s.to_string()).collect(),
            rainy: RAINY_PLAYLISTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Catalog {
    /// Builds a catalog; an empty list falls back to the built-in ids for
    /// that mood so selection always has a candidate.
    pub fn new(sunny: Vec<String>, rainy: Vec<String>) -> Self {
        let defaults = Self::default();
        Self {
            sunny: if sunny.is_empty() { defaults.sunny } else { sunny },
            rainy: if rainy.is_empty() { defaults.rainy } else { rainy },
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.sunny_playlists.clone().unwrap_or_default(),
            settings.rainy_playlists.clone().unwrap_or_default(),
        )
    }

    pub fn playlists(&self, mood: Mood) -> &[String] {
        match mood {
            Mood::Sunny => &self.sunny,
            Mood::Rainy => &self.rainy,
        }
    }

    /// Picks a playlist for `reading` using the thread-local RNG.
    pub fn select(&self, reading: &WeatherReading) -> PlaylistChoice {
        self.select_with(reading, &mut rand::rng())
    }

    pub fn select_with<R: Rng + ?Sized>(&self, reading: &WeatherReading, rng: &mut R) -> PlaylistChoice {
        let mood = Mood::for_reading(reading);
        let candidates = self.playlists(mood);
        // both lists are non-empty, see `new`
        let id = candidates[rng.random_range(0..candidates.len())].clone();
        PlaylistChoice { mood, id }
    }
}
