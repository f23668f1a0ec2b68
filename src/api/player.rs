use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    api::views,
    error::AppError,
    orchestrator::{AfterCommand, TransportCommand},
    server::AppState,
    session::Session,
};

/// Dashboard, or the next step towards it: operator login, then Spotify.
pub async fn home(Extension(session): Extension<Session>) -> Response {
    let state = session.state.lock().await;
    if state.operator.is_none() {
        return Redirect::to("/login").into_response();
    }
    if !state.is_authenticated() {
        return Redirect::to("/auth/start").into_response();
    }
    views::dashboard(&state).into_response()
}

pub async fn refresh(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Redirect, AppError> {
    let mut state = session.state.lock().await;
    app.orchestrator.refresh(&mut state).await?;
    Ok(Redirect::to("/"))
}

async fn transport(
    app: AppState,
    session: Session,
    command: TransportCommand,
) -> Result<Redirect, AppError> {
    let mut state = session.state.lock().await;
    let after = app.orchestrator.command(&mut state, command).await?;
    Ok(match after {
        AfterCommand::Home => Redirect::to("/"),
        AfterCommand::Refresh => Redirect::to("/refresh"),
    })
}

pub async fn play(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Redirect, AppError> {
    transport(app, session, TransportCommand::Play).await
}

pub async fn pause(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Redirect, AppError> {
    transport(app, session, TransportCommand::Pause).await
}

pub async fn play_pause(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Redirect, AppError> {
    transport(app, session, TransportCommand::PlayPause).await
}

pub async fn next(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Redirect, AppError> {
    transport(app, session, TransportCommand::Next).await
}

pub async fn previous(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Redirect, AppError> {
    transport(app, session, TransportCommand::Previous).await
}

pub async fn repeat(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Redirect, AppError> {
    transport(app, session, TransportCommand::Repeat).await
}

pub async fn shuffle(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Redirect, AppError> {
    transport(app, session, TransportCommand::Shuffle).await
}
