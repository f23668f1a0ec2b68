use crate::{
    error::AppError,
    spotify::{
        SpotifyClient,
        client::{check, transport_error},
    },
    types::{PlaylistResponse, SelectedPlaylist},
};

impl SpotifyClient {
    /// Fetches name, owner, cover and link of a catalog playlist.
    pub(super) async fn get_playlist(
        &self,
        token: &str,
        id: &str,
    ) -> Result<SelectedPlaylist, AppError> {
        let url = self.endpoint(&format!(
            "playlists/{}?fields=id,name,owner(display_name),images(url),external_urls",
            id
        ));
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;

        let response = check("GET", &url, response, true).await?;
        let body = response
            .json::<PlaylistResponse>()
            .await
            .map_err(transport_error)?;
        Ok(body.into())
    }
}
