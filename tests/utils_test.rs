use chrono::{FixedOffset, TimeZone, Utc};
use weathertune::types::{RepeatState, Token, TokenResponse, TOKEN_EXPIRY_MARGIN};
use weathertune::utils::*;

fn token_obtained(seconds_ago: i64, expires_in: u64) -> Token {
    Token {
        access_token: "access".to_string(),
        refresh_token: Some("refresh".to_string()),
        scope: String::new(),
        expires_in,
        obtained_at: (Utc::now().timestamp() - seconds_ago) as u64,
    }
}

#[test]
fn test_generate_token() {
    let token = generate_token(40);

    assert_eq!(token.len(), 40);
    assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(token, generate_token(40));
}

#[test]
fn test_generated_identifier_lengths() {
    assert_eq!(generate_session_id().len(), 48);
    assert_eq!(generate_oauth_state().len(), 32);
    assert_eq!(generate_salt().len(), 16);
}

#[test]
fn test_hash_password() {
    let hash = hash_password("salt", "hunter22");

    // Deterministic for the same salt and password
    assert_eq!(hash, hash_password("salt", "hunter22"));
    // SHA-256 digest in standard base64 is 44 characters
    assert_eq!(hash.len(), 44);
    assert_ne!(hash, hash_password("other", "hunter22"));
    assert_ne!(hash, hash_password("salt", "hunter23"));
}

#[test]
fn test_display_timestamp() {
    let offset = FixedOffset::east_opt(3600).expect("valid offset");
    let time = offset
        .with_ymd_and_hms(2024, 3, 5, 9, 7, 2)
        .single()
        .expect("valid time");

    assert_eq!(display_timestamp(&time), "Tue, 05-Mar-2024 @ 09:07:02 (GMT+0100)");
}

#[test]
fn test_reading_now() {
    let reading = reading_now(12.5, 60.0);

    assert_eq!(reading.temperature, 12.5);
    assert_eq!(reading.humidity, 60.0);
    assert!(reading.timestamp.contains(" @ "));
    assert!(reading.timestamp.contains("(GMT"));
}

#[test]
fn test_parse_measurement() {
    assert_eq!(parse_measurement("temperature", "21.5"), Ok(21.5));
    assert_eq!(parse_measurement("temperature", " -3 "), Ok(-3.0));
    assert!(parse_measurement("temperature", "").is_err());
    assert!(parse_measurement("temperature", "warm").is_err());
    assert!(parse_measurement("humidity", "NaN").is_err());
    assert!(parse_measurement("humidity", "inf").is_err());
}

#[test]
fn test_escape_html() {
    assert_eq!(
        escape_html("<b>\"Rock & Roll\"</b> isn't dead"),
        "&lt;b&gt;&quot;Rock &amp; Roll&quot;&lt;/b&gt; isn&#39;t dead"
    );
    assert_eq!(escape_html("plain"), "plain");
}

#[test]
fn test_token_expiry_margin() {
    assert!(!token_obtained(0, 3600).is_expired());
    // Inside the margin counts as expired
    assert!(token_obtained(3600 - TOKEN_EXPIRY_MARGIN as i64 + 1, 3600).is_expired());
    assert!(token_obtained(7200, 3600).is_expired());
}

#[test]
fn test_token_response_into_token() {
    let response: TokenResponse =
        serde_json::from_str(r#"{"access_token":"abc","token_type":"Bearer"}"#)
            .expect("valid token response");
    let token = response.into_token();

    assert_eq!(token.access_token, "abc");
    assert_eq!(token.refresh_token, None);
    assert_eq!(token.expires_in, 3600);
    assert!(!token.is_expired());
}

#[test]
fn test_repeat_state_cycle() {
    let start = RepeatState::default();
    assert_eq!(start, RepeatState::Off);

    let track = start.next();
    let context = track.next();
    assert_eq!(track, RepeatState::Track);
    assert_eq!(context, RepeatState::Context);
    assert_eq!(context.next(), RepeatState::Off);
    assert_eq!(context.to_string(), "context");
}

#[test]
fn test_verify_password() {
    let stored = hash_password("salt", "hunter22");

    assert!(verify_password("salt", "hunter22", &stored));
    assert!(!verify_password("salt", "hunter23", &stored));
    assert!(!verify_password("pepper", "hunter22", &stored));
    assert!(!verify_password("salt", "hunter22", ""));
}

#[test]
fn test_constant_time_eq() {
    assert!(constant_time_eq(b"abcdef", b"abcdef"));
    assert!(!constant_time_eq(b"abcdef", b"abcdeg"));
    assert!(!constant_time_eq(b"abcdef", b"abcde"));
    assert!(constant_time_eq(b"", b""));
}
