use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use weathertune::{
    config::Settings,
    error::AppError,
    management::WeatherStore,
    weather::{OpenWeatherClient, WeatherProvider},
};

type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

async fn current(State(seen): State<Seen>, Query(query): Query<HashMap<String, String>>) -> Response {
    seen.lock().unwrap().push(query.clone());

    if query.get("appid").map(String::as_str) != Some("secret-key") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"cod": 401, "message": "Invalid API key"})),
        )
            .into_response();
    }
    if query.get("q").map(String::as_str) == Some("Atlantis") {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"cod": "404", "message": "city not found"})),
        )
            .into_response();
    }
    Json(json!({
        "name": "Manchester",
        "main": {"temp": 14.2, "feels_like": 13.1, "humidity": 71, "pressure": 1012}
    }))
    .into_response()
}

async fn start_mock(api_key: &str, city: &str) -> (OpenWeatherClient, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/data/2.5/weather", get(current))
        .with_state(Arc::clone(&seen));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let settings = Settings {
        openweather_api_key: Some(api_key.to_string()),
        openweather_url: format!("http://{}/data/2.5/weather", addr),
        weather_city: city.to_string(),
        ..Settings::default()
    };
    let client = OpenWeatherClient::from_settings(&settings).expect("api key configured");
    (client, seen)
}

#[test]
fn test_client_needs_api_key() {
    assert!(OpenWeatherClient::from_settings(&Settings::default()).is_none());
}

#[tokio::test]
async fn test_current_conditions_request_and_mapping() {
    let (client, seen) = start_mock("secret-key", "Manchester").await;

    let reading = client.current_conditions().await.unwrap();

    assert_eq!(reading.temperature, 14.2);
    assert_eq!(reading.humidity, 71.0);
    assert!(reading.timestamp.contains("(GMT"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].get("q").map(String::as_str), Some("Manchester"));
    assert_eq!(seen[0].get("appid").map(String::as_str), Some("secret-key"));
    assert_eq!(seen[0].get("units").map(String::as_str), Some("metric"));
}

#[tokio::test]
async fn test_rejected_api_key_is_external_error() {
    let (client, _) = start_mock("wrong-key", "Manchester").await;

    match client.current_conditions().await {
        Err(AppError::ExternalService {
            service,
            status,
            message,
        }) => {
            assert_eq!(service, "openweather");
            assert_eq!(status, Some(401));
            assert!(message.contains("Invalid API key"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_city_is_external_error() {
    let (client, _) = start_mock("secret-key", "Atlantis").await;

    let result = client.current_conditions().await;

    assert!(matches!(
        result,
        Err(AppError::ExternalService {
            status: Some(404),
            ..
        })
    ));
}

#[tokio::test]
async fn test_polled_reading_is_stored() {
    let (client, _) = start_mock("secret-key", "Manchester").await;
    let dir = tempfile::tempdir().unwrap();
    let store = WeatherStore::open(dir.path().join("weather.json"))
        .await
        .unwrap();

    let reading = client.current_conditions().await.unwrap();
    store.record(reading.clone()).await.unwrap();

    assert_eq!(store.latest().await, Some(reading));
}
