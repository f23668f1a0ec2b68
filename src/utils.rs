use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Local, TimeZone};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::WeatherReading;

pub fn generate_token(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Random id stored in the session cookie.
pub fn generate_session_id() -> String {
    generate_token(48)
}

/// Random nonce sent as the OAuth `state` parameter.
pub fn generate_oauth_state() -> String {
    generate_token(32)
}

pub fn generate_salt() -> String {
    generate_token(16)
}

pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    STANDARD.encode(hasher.finalize())
}

/// Checks `password` against a stored hash without exiting early on the
/// first differing byte.
pub fn verify_password(salt: &str, password: &str, expected_hash: &str) -> bool {
    constant_time_eq(hash_password(salt, password).as_bytes(), expected_hash.as_bytes())
}

/// Byte-wise comparison whose running time depends only on the length.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Formats a reading time the way the dashboard shows it, e.g.
/// `Tue, 17-Oct-2026 @ 10:04:11 (GMT+0100)`.
pub fn display_timestamp<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%a, %d-%b-%Y @ %H:%M:%S (GMT%z)").to_string()
}

/// Builds a reading stamped with the current local time.
pub fn reading_now(temperature: f64, humidity: f64) -> WeatherReading {
    WeatherReading {
        timestamp: display_timestamp(&Local::now()),
        temperature,
        humidity,
    }
}

/// Parses a numeric form field, rejecting blanks, NaN and infinities.
pub fn parse_measurement(field: &str, raw: &str) -> Result<f64, String> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("{} must be a number, got '{}'", field, raw))?;
    if !value.is_finite() {
        return Err(format!("{} must be a finite number", field));
    }
    Ok(value)
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
