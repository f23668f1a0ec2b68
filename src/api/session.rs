use axum::{
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
    },
    middleware::Next,
    response::Response,
};

use crate::{info, server::AppState, warning};

pub const SESSION_COOKIE: &str = "weathertune_session";

/// Resolves the session named by the cookie, creating one when needed, and
/// hands it to the handler as an `Extension<Session>`.
pub async fn attach_session(
    State(app): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie = session_cookie(request.headers());
    let (session, created) = app.sessions.resolve(cookie.as_deref()).await;
    let id = session.id.clone();
    request.extensions_mut().insert(session);

    let mut response = next.run(request).await;
    if created {
        match HeaderValue::from_str(&format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, id
        )) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => warning!("Cannot build session cookie: {}", e),
        }
    }
    response
}

/// One line per request: method, path and status.
pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    // path only, the callback query carries the authorization code
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    info!("{} @ {} with response: {}", method, path, response.status().as_u16());
    response
}

pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
}
