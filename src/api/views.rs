//! Minimal server-rendered HTML pages.

use axum::response::Html;

use crate::{
    orchestrator::PlaylistPick,
    session::SessionState,
    types::{RepeatState, WeatherReading},
    utils::escape_html as esc,
};

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>{title} · weathertune</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        title = esc(title),
        body = body
    ))
}

pub fn error_page(message: &str) -> Html<String> {
    layout(
        "Error",
        &format!(
            "<h2>Something went wrong</h2>\n<p class=\"error\">{}</p>\n<p><a href=\"/\">Back home</a></p>",
            esc(message)
        ),
    )
}

pub fn notice(message: &str) -> Html<String> {
    layout(
        "Not authorised",
        &format!(
            "<h3>{}</h3>\n<p><a href=\"/\">Home</a></p>",
            esc(message)
        ),
    )
}

fn credentials_form(title: &str, action: &str, error: Option<&str>, alternative: &str) -> Html<String> {
    let error = error
        .map(|e| format!("<p class=\"error\">{}</p>\n", esc(e)))
        .unwrap_or_default();
    layout(
        title,
        &format!(
            "<h2>{title}</h2>\n{error}<form method=\"post\" action=\"{action}\">\n\
<label>Username <input name=\"username\" required></label>\n\
<label>Password <input name=\"password\" type=\"password\" required></label>\n\
<button type=\"submit\">{title}</button>\n</form>\n<p>{alternative}</p>",
            title = esc(title),
            error = error,
            action = action,
            alternative = alternative
        ),
    )
}

pub fn login_form(error: Option<&str>) -> Html<String> {
    credentials_form(
        "Log in",
        "/login",
        error,
        "No account yet? <a href=\"/register\">Register</a>",
    )
}

pub fn register_form(error: Option<&str>) -> Html<String> {
    credentials_form(
        "Register",
        "/register",
        error,
        "Already registered? <a href=\"/login\">Log in</a>",
    )
}

fn button(action: &str, label: &str) -> String {
    format!(
        "<form method=\"post\" action=\"{}\" style=\"display:inline\"><button>{}</button></form>",
        action,
        esc(label)
    )
}

fn readings_table(readings: &[WeatherReading]) -> String {
    if readings.is_empty() {
        return "<p>No weather reading recorded yet.</p>".to_string();
    }
    let rows: String = readings
        .iter()
        .map(|r| {
            format!(
                "<tr><td>{}</td><td>{:.1} °C</td><td>{:.1} %</td></tr>\n",
                esc(&r.timestamp),
                r.temperature,
                r.humidity
            )
        })
        .collect();
    format!(
        "<table>\n<tr><th>Time</th><th>Temperature</th><th>Humidity</th></tr>\n{}</table>",
        rows
    )
}

fn playlist_section(state: &SessionState) -> String {
    match (&state.selected_playlist, state.selected_mood) {
        (Some(playlist), mood) => {
            let mood = mood.map(|m| format!(" for {} weather", m)).unwrap_or_default();
            let cover = playlist
                .image_url
                .as_deref()
                .map(|url| format!("<img src=\"{}\" alt=\"\" width=\"160\">\n", esc(url)))
                .unwrap_or_default();
            let name = match playlist.external_url.as_deref() {
                Some(url) => format!("<a href=\"{}\">{}</a>", esc(url), esc(&playlist.name)),
                None => esc(&playlist.name),
            };
            format!(
                "<h3>Suggested playlist{}</h3>\n{}<p>{} by {}</p>",
                mood,
                cover,
                name,
                esc(&playlist.owner)
            )
        }
        (None, _) => "<h3>Suggested playlist</h3>\n<p>Waiting for a weather reading.</p>".to_string(),
    }
}

pub fn dashboard(state: &SessionState) -> Html<String> {
    let user = state.display_name().unwrap_or("Spotify user");

    let now_playing = match &state.current_track {
        Some(track) => format!(
            "<p>{} {} – {}</p>",
            if state.playing { "Playing" } else { "Paused" },
            esc(&track.name),
            esc(&track.artist_names())
        ),
        None => "<p>Nothing playing. Open Spotify on a device to start.</p>".to_string(),
    };
    let device = state
        .current_device
        .as_ref()
        .map(|d| format!("<p>Device: {} ({})</p>", esc(&d.name), esc(&d.device_type)))
        .unwrap_or_default();

    let repeat_label = match state.repeat {
        RepeatState::Off => "Repeat: off",
        RepeatState::Track => "Repeat: track",
        RepeatState::Context => "Repeat: context",
    };
    let shuffle_label = if state.shuffle { "Shuffle: on" } else { "Shuffle: off" };
    let controls = [
        button("/previous", "Previous"),
        button("/play_pause", if state.playing { "Pause" } else { "Play" }),
        button("/next", "Next"),
        button("/shuffle", shuffle_label),
        button("/repeat", repeat_label),
    ]
    .join("\n");

    let recent: String = state
        .recent_tracks
        .iter()
        .map(|item| {
            format!(
                "<li>{} – {}</li>\n",
                esc(&item.track.name),
                esc(&item.track.artist_names())
            )
        })
        .collect();

    let last_error = state
        .last_error
        .as_deref()
        .map(|e| format!("<p class=\"error\">{}</p>\n", esc(e)))
        .unwrap_or_default();

    layout(
        "Dashboard",
        &format!(
            "<h2>Hello {user}</h2>\n{last_error}{now_playing}\n{device}\n<div>{controls}</div>\n\
<p><a href=\"/refresh\">Refresh</a> · <a href=\"/weather\">Weather</a> · <a href=\"/logout\">Log out</a></p>\n\
{playlist}\n<h3>Recently played</h3>\n<ol>\n{recent}</ol>\n<h3>Weather</h3>\n{weather}",
            user = esc(user),
            last_error = last_error,
            now_playing = now_playing,
            device = device,
            controls = controls,
            playlist = playlist_section(state),
            recent = recent,
            weather = readings_table(&state.weather)
        ),
    )
}

pub fn weather_page(readings: &[WeatherReading], pick: Option<&PlaylistPick>) -> Html<String> {
    let selection = match pick {
        Some(PlaylistPick::Selected { mood, playlist }) => format!(
            "<p>Latest reading looks {}: <strong>{}</strong> by {}</p>",
            mood,
            esc(&playlist.name),
            esc(&playlist.owner)
        ),
        Some(PlaylistPick::InsufficientData) => {
            "<p>Not enough data to pick a playlist yet.</p>".to_string()
        }
        None => "<p><a href=\"/\">Connect Spotify</a> to get a playlist suggestion.</p>".to_string(),
    };
    layout(
        "Weather",
        &format!(
            "<h2>Latest readings</h2>\n{}\n{}\n<p><a href=\"/\">Home</a></p>",
            readings_table(readings),
            selection
        ),
    )
}
