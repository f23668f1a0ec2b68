mod common;

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use common::FakeMusic;
use weathertune::{
    api::session::SESSION_COOKIE,
    config::Settings,
    error::AUTH_MISSING_NOTICE,
    management::{UserStore, WeatherStore},
    playlist::SUNNY_PLAYLISTS,
    server::{AppState, build_router},
    session::SessionStore,
};

struct TestApp {
    router: Router,
    music: Arc<FakeMusic>,
    weather: Arc<WeatherStore>,
    sessions: Arc<SessionStore>,
    _dir: TempDir,
}

async fn setup() -> TestApp {
    setup_with(FakeMusic::new()).await
}

async fn setup_with(music: FakeMusic) -> TestApp {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings = Settings {
        data_dir: dir.path().to_path_buf(),
        ..Settings::default()
    };
    let users = UserStore::open(settings.user_store_path())
        .await
        .expect("user store");
    let weather = Arc::new(
        WeatherStore::open(settings.weather_store_path())
            .await
            .expect("weather store"),
    );
    let music = Arc::new(music);
    let state = AppState::new(settings, users, Arc::clone(&weather), music.clone());
    let sessions = Arc::clone(&state.sessions);

    TestApp {
        router: build_router(state),
        music,
        weather,
        sessions,
        _dir: dir,
    }
}

async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    form: Option<&str>,
) -> Response {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, format!("{}={}", SESSION_COOKIE, cookie));
    }
    let body = match form {
        Some(form) => {
            request = request.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            Body::from(form.to_string())
        }
        None => Body::empty(),
    };

    app.router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn session_id(response: &Response) -> Option<String> {
    let cookie = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    let (pair, _) = cookie.split_once(';')?;
    let (name, value) = pair.split_once('=')?;
    (name == SESSION_COOKIE).then(|| value.to_string())
}

/// Registers an operator and completes the Spotify authorization, returning
/// the session id.
async fn authorize(app: &TestApp) -> String {
    let response = send(
        app,
        "POST",
        "/register",
        None,
        Some("username=alice&password=correct-horse"),
    )
    .await;
    let id = session_id(&response).expect("session cookie");

    let response = send(app, "GET", "/auth/start", Some(&id), None).await;
    let authorize = location(&response);
    let state = authorize.split("state=").nth(1).expect("state parameter");

    let callback = format!("/auth/callback?code=good-code&state={}", state);
    let response = send(app, "GET", &callback, Some(&id), None).await;
    assert_eq!(location(&response), "/refresh");
    id
}

#[tokio::test]
async fn test_browser_route_issues_session_cookie() {
    let app = setup().await;

    let response = send(&app, "GET", "/login", None, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let id = session_id(&response).expect("session cookie");
    assert_eq!(id.len(), 48);
    assert_eq!(app.sessions.len().await, 1);
}

#[tokio::test]
async fn test_known_session_gets_no_new_cookie() {
    let app = setup().await;
    let first = send(&app, "GET", "/login", None, None).await;
    let id = session_id(&first).unwrap();

    let second = send(&app, "GET", "/login", Some(&id), None).await;

    assert!(second.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(app.sessions.len().await, 1);
}

#[tokio::test]
async fn test_health_reports_without_session() {
    let app = setup().await;

    let response = send(&app, "GET", "/health", None, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["readings"], 0);
    assert_eq!(json["sessions"], 0);
}

#[tokio::test]
async fn test_sensor_posts_create_no_sessions() {
    let app = setup().await;

    for i in 0..50 {
        let form = format!("temperature={}&humidity=50", i);
        let response = send(&app, "POST", "/weather", None, Some(&form)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    assert_eq!(app.weather.len().await, 50);
    assert!(app.sessions.is_empty().await);
}

#[tokio::test]
async fn test_transport_without_token_is_unauthorized() {
    let app = setup().await;

    let response = send(&app, "POST", "/next", None, None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_text(response).await.contains(AUTH_MISSING_NOTICE));
    assert!(app.music.calls().is_empty());
}

#[tokio::test]
async fn test_home_requires_login() {
    let app = setup().await;

    let response = send(&app, "GET", "/", None, None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_record_weather_from_form_and_query() {
    let app = setup().await;

    let response = send(
        &app,
        "POST",
        "/weather",
        None,
        Some("temperature=21.5&humidity=40"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["temperature"], 21.5);

    let response = send(&app, "POST", "/weather?temperature=4&humidity=88", None, None).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let latest = app.weather.latest().await.unwrap();
    assert_eq!(latest.temperature, 4.0);
    assert_eq!(app.weather.len().await, 2);
}

#[tokio::test]
async fn test_record_weather_rejects_bad_input() {
    let app = setup().await;

    for form in [
        "temperature=20",
        "humidity=50",
        "temperature=warm&humidity=50",
        "temperature=20&humidity=150",
    ] {
        let response = send(&app, "POST", "/weather", None, Some(form)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "form: {}", form);
    }
    assert!(app.weather.is_empty().await);
}

#[tokio::test]
async fn test_show_weather_without_token_lists_readings() {
    let app = setup().await;
    send(&app, "POST", "/weather", None, Some("temperature=18&humidity=60")).await;

    let response = send(&app, "GET", "/weather", None, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("18.0"));
    assert!(html.contains("Connect Spotify"));
    assert!(app.music.requested_playlists().is_empty());
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = setup().await;
    let response = send(&app, "POST", "/register", None, Some("username=alice&password=correct-horse")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = send(&app, "POST", "/login", None, Some("username=alice&password=nope-nope")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_text(response).await.contains("Invalid username or password"));
}

#[tokio::test]
async fn test_authorize_then_weather_selects_sunny_playlist() {
    let app = setup().await;

    let response = send(
        &app,
        "POST",
        "/register",
        None,
        Some("username=alice&password=correct-horse"),
    )
    .await;
    let id = session_id(&response).expect("session cookie");
    assert_eq!(location(&response), "/");

    let response = send(&app, "GET", "/", Some(&id), None).await;
    assert_eq!(location(&response), "/auth/start");

    let response = send(&app, "GET", "/auth/start", Some(&id), None).await;
    let authorize = location(&response);
    let state = authorize.split("state=").nth(1).expect("state parameter");

    let callback = format!("/auth/callback?code=good-code&state={}", state);
    let response = send(&app, "GET", &callback, Some(&id), None).await;
    assert_eq!(location(&response), "/refresh");

    send(&app, "POST", "/weather", None, Some("temperature=20&humidity=50")).await;
    let response = send(&app, "GET", "/weather", Some(&id), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let requested = app.music.requested_playlists();
    assert_eq!(requested.len(), 1);
    assert!(SUNNY_PLAYLISTS.contains(&requested[0].as_str()));
    assert!(body_text(response).await.contains("sunny"));

    let response = send(&app, "POST", "/next", Some(&id), None).await;
    assert_eq!(location(&response), "/refresh");
    let response = send(&app, "POST", "/play", Some(&id), None).await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_callback_with_forged_state_fails() {
    let app = setup().await;
    let response = send(
        &app,
        "POST",
        "/register",
        None,
        Some("username=alice&password=correct-horse"),
    )
    .await;
    let id = session_id(&response).unwrap();
    send(&app, "GET", "/auth/start", Some(&id), None).await;

    let response = send(
        &app,
        "GET",
        "/auth/callback?code=good-code&state=forged",
        Some(&id),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Something went wrong during Spotify callback"));
    assert_eq!(app.music.call_count("exchange_code"), 0);
}

#[tokio::test]
async fn test_failed_history_renders_error_view() {
    let app = setup_with(FakeMusic::failing_history(500)).await;
    let id = authorize(&app).await;
    send(&app, "POST", "/weather", None, Some("temperature=20&humidity=50")).await;

    let response = send(&app, "GET", "/refresh", Some(&id), None).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_text(response).await.contains("Something went wrong"));
    assert!(app.music.requested_playlists().is_empty());

    // profile and player landed before the failure was reported
    let response = send(&app, "GET", "/", Some(&id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Listener"));
}
