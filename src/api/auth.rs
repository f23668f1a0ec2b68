use axum::{
    Extension, Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::{
    api::views, error::AppError, server::AppState, session::Session, success, warning,
};

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

pub async fn login_page(Extension(session): Extension<Session>) -> Response {
    if session.state.lock().await.operator.is_some() {
        return Redirect::to("/").into_response();
    }
    views::login_form(None).into_response()
}

pub async fn login(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<CredentialsForm>,
) -> Response {
    match app.users.verify(&form.username, &form.password).await {
        Ok(username) => {
            success!("Operator {} logged in", username);
            session.state.lock().await.operator = Some(username);
            Redirect::to("/").into_response()
        }
        Err(e) => {
            warning!("Login failed for {}: {}", form.username, e);
            (e.status_code(), views::login_form(Some(&e.to_string()))).into_response()
        }
    }
}

pub async fn register_page() -> Response {
    views::register_form(None).into_response()
}

pub async fn register(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<CredentialsForm>,
) -> Response {
    match app.users.register(&form.username, &form.password).await {
        Ok(()) => {
            let username = form.username.trim().to_string();
            success!("Operator {} registered", username);
            session.state.lock().await.operator = Some(username);
            Redirect::to("/").into_response()
        }
        Err(e @ AppError::Validation(_)) => {
            (e.status_code(), views::register_form(Some(&e.to_string()))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn logout(Extension(session): Extension<Session>) -> Redirect {
    session.state.lock().await.logout();
    Redirect::to("/login")
}

/// `Unauthenticated -> AuthPending`: sends the browser to Spotify.
pub async fn start(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Redirect, AppError> {
    let mut state = session.state.lock().await;
    if state.operator.is_none() {
        return Ok(Redirect::to("/login"));
    }
    let url = app.orchestrator.begin_authorization(&mut state)?;
    Ok(Redirect::to(&url))
}

/// `AuthPending -> Authenticated`: exchanges the code and refreshes.
pub async fn callback(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect, AppError> {
    if let Some(error) = &params.error {
        warning!("Spotify authorization returned error: {}", error);
    }
    let mut state = session.state.lock().await;
    app.orchestrator
        .complete_authorization(&mut state, params.code.as_deref(), params.state.as_deref())
        .await?;
    Ok(Redirect::to("/refresh"))
}
