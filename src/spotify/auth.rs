use reqwest::Url;

use crate::{
    error::AppError,
    spotify::{
        SpotifyClient,
        client::{check, transport_error},
    },
    types::{Token, TokenResponse},
};

impl SpotifyClient {
    /// Builds the authorization URL for the authorization-code grant.
    ///
    /// The browser is redirected here from `/auth/start`; Spotify sends the
    /// user back to the configured redirect URI with `code` and `state`.
    pub(super) fn build_authorize_url(&self, state: &str) -> Result<String, AppError> {
        let url = Url::parse_with_params(
            &self.auth_url,
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("scope", self.scope.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| AppError::Config(format!("invalid SPOTIFY_API_AUTH_URL: {}", e)))?;
        Ok(url.into())
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// Client credentials travel as HTTP Basic auth; the redirect URI must be
    /// the same one used in the authorization request.
    pub(super) async fn exchange_authorization_code(&self, code: &str) -> Result<Token, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let response = check("POST", &self.token_url, response, false).await?;
        let body: TokenResponse = response.json().await.map_err(transport_error)?;
        Ok(body.into_token())
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// Spotify may or may not rotate the refresh token; the returned token has
    /// `refresh_token: None` when it does not.
    pub(super) async fn refresh_access_token(&self, refresh_token: &str) -> Result<Token, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let response = check("POST", &self.token_url, response, false).await?;
        let body: TokenResponse = response.json().await.map_err(transport_error)?;
        Ok(body.into_token())
    }
}
