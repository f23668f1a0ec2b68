//! # API Module
//!
//! HTTP handlers of the dashboard, built on [axum](https://docs.rs/axum).
//!
//! ## Endpoints
//!
//! ### Operator accounts
//!
//! - `GET|POST /login`, `GET|POST /register`, `GET /logout`
//!
//! ### Spotify authorization
//!
//! - `GET /auth/start` - redirects to Spotify's authorize page
//! - `GET /auth/callback` - exchanges the authorization code for a token
//!
//! ### Dashboard and playback
//!
//! - `GET /` and `GET /refresh`
//! - `POST /play`, `/pause`, `/play_pause`, `/next`, `/previous`, `/repeat`,
//!   `/shuffle`
//!
//! ### Weather
//!
//! - `POST /weather` - sensor readings
//! - `GET /weather` - latest readings and, when authorized, a playlist pick
//!
//! ### Monitoring
//!
//! - `GET /health`
//!
//! Every handler that needs session state receives it from the
//! [`session::attach_session`] middleware as `Extension<Session>`.
//! Failures render through [`crate::error::AppError`]'s `IntoResponse`.

mod auth;
mod health;
mod player;
pub mod session;
pub mod views;
mod weather;

pub use auth::{callback, login, login_page, logout, register, register_page, start};
pub use health::health;
pub use player::{home, next, pause, play, play_pause, previous, refresh, repeat, shuffle};
pub use weather::{WeatherForm, record as record_weather, show as show_weather};
