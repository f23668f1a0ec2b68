mod json_log;
mod users;
mod weather;

pub use json_log::JsonLog;
pub use users::MIN_PASSWORD_LEN;
pub use users::UserStore;
pub use weather::RECENT_READINGS;
pub use weather::WeatherStore;
