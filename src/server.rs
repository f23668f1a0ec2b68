use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;

use crate::{
    api,
    config::Settings,
    error::AppError,
    info,
    management::{UserStore, WeatherStore},
    orchestrator::Orchestrator,
    playlist::Catalog,
    session::SessionStore,
    spotify::MusicGateway,
};

/// Shared handler state. Cloning is cheap, everything sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub sessions: Arc<SessionStore>,
    pub users: Arc<UserStore>,
    pub weather: Arc<WeatherStore>,
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        users: UserStore,
        weather: Arc<WeatherStore>,
        music: Arc<dyn MusicGateway>,
    ) -> Self {
        let catalog = Catalog::from_settings(&settings);
        let orchestrator = Orchestrator::new(music, Arc::clone(&weather), catalog);
        Self {
            settings: Arc::new(settings),
            sessions: Arc::new(SessionStore::new()),
            users: Arc::new(users),
            weather,
            orchestrator: Arc::new(orchestrator),
        }
    }
}

/// Browser routes run behind the session middleware. The sensor endpoint
/// and the health check carry no cookie and never create a session.
pub fn build_router(state: AppState) -> Router {
    let browser = Router::new()
        .route("/", get(api::home))
        .route("/login", get(api::login_page).post(api::login))
        .route("/register", get(api::register_page).post(api::register))
        .route("/logout", get(api::logout))
        .route("/auth/start", get(api::start))
        .route("/auth/callback", get(api::callback))
        .route("/refresh", get(api::refresh))
        .route("/play", post(api::play))
        .route("/pause", post(api::pause))
        .route("/play_pause", post(api::play_pause))
        .route("/next", post(api::next))
        .route("/previous", post(api::previous))
        .route("/repeat", post(api::repeat))
        .route("/shuffle", post(api::shuffle))
        .route("/weather", get(api::show_weather))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::session::attach_session,
        ));

    let sensor = Router::new()
        .route("/weather", post(api::record_weather))
        .route("/health", get(api::health));

    browser
        .merge(sensor)
        .layer(middleware::from_fn(api::session::log_request))
        .with_state(state)
}

/// Binds the configured address without serving yet.
pub async fn bind(settings: &Settings) -> Result<TcpListener, AppError> {
    let addr = SocketAddr::from_str(&settings.server_addr).map_err(|e| {
        AppError::Config(format!(
            "Failed to parse server address '{}': {}",
            settings.server_addr, e
        ))
    })?;

    TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", addr, e)))
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), AppError> {
    if let Ok(addr) = listener.local_addr() {
        info!("Server listening at: http://{}/", addr);
    }
    axum::serve(listener, build_router(state))
        .await
        .map_err(|e| AppError::Config(format!("server stopped: {}", e)))
}
