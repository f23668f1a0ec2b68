use reqwest::StatusCode;

use crate::{
    error::AppError,
    spotify::{
        PlayerAction, SpotifyClient,
        client::{check, transport_error},
    },
    types::{PlayHistoryItem, PlayerState, Profile, RecentlyPlayedResponse},
};

impl SpotifyClient {
    pub(super) async fn get_profile(&self, token: &str) -> Result<Profile, AppError> {
        let url = self.endpoint("me");
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;

        let response = check("GET", &url, response, true).await?;
        response.json::<Profile>().await.map_err(transport_error)
    }

    /// Current playback. Spotify answers 204 when nothing is playing on any
    /// device, which maps to `None`.
    pub(super) async fn get_player(&self, token: &str) -> Result<Option<PlayerState>, AppError> {
        let url = self.endpoint("me/player");
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;

        let response = check("GET", &url, response, true).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response.bytes().await.map_err(transport_error)?;
        if body.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice::<PlayerState>(&body)
            .map(Some)
            .map_err(|e| AppError::external(super::SERVICE, None, e.to_string()))
    }

    pub(super) async fn get_recently_played(
        &self,
        token: &str,
        limit: usize,
    ) -> Result<Vec<PlayHistoryItem>, AppError> {
        let url = self.endpoint(&format!("me/player/recently-played?limit={}", limit));
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;

        let response = check("GET", &url, response, true).await?;
        let mut body = response
            .json::<RecentlyPlayedResponse>()
            .await
            .map_err(transport_error)?;
        body.items.truncate(limit);
        Ok(body.items)
    }

    /// Issues exactly one playback request. Spotify answers these with 204
    /// (or 202 while a device wakes up), so the body is ignored.
    pub(super) async fn send_player_action(
        &self,
        token: &str,
        action: PlayerAction,
    ) -> Result<(), AppError> {
        let url = self.endpoint(&action.path());
        let method = action.method();
        let response = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(token)
            .header("Content-Length", "0")
            .send()
            .await
            .map_err(transport_error)?;

        check(method.as_str(), &url, response, true).await?;
        Ok(())
    }
}
