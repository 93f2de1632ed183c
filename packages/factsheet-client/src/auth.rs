//! OAuth2 client-credentials exchange against the MTM token endpoint.

use reqwest::{header, Client, RequestBuilder};

use crate::config::Credentials;
use crate::error::{FactsheetError, Result};
use crate::types::TokenResponse;

/// Basic-auth user name the token endpoint expects alongside an API token.
const API_TOKEN_USER: &str = "apitoken";

/// Headers attached to every API call.
#[derive(Clone)]
pub struct AuthHeader {
    authorization: Option<String>,
    content_type: &'static str,
}

impl std::fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthHeader")
            .field("authenticated", &self.is_authenticated())
            .field("content_type", &self.content_type)
            .finish()
    }
}

impl AuthHeader {
    pub fn bearer(access_token: &str) -> Self {
        Self {
            authorization: Some(format!("Bearer {}", access_token)),
            content_type: "application/json",
        }
    }

    /// Header set without credentials. Requests made with it are rejected by
    /// the API with 401.
    pub fn unauthenticated() -> Self {
        Self {
            authorization: None,
            content_type: "application/json",
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authorization.is_some()
    }

    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(header::CONTENT_TYPE, self.content_type);
        match &self.authorization {
            Some(value) => request.header(header::AUTHORIZATION, value),
            None => request,
        }
    }
}

pub struct AuthClient<'a> {
    http: &'a Client,
    credentials: &'a Credentials,
}

impl<'a> AuthClient<'a> {
    pub fn new(http: &'a Client, credentials: &'a Credentials) -> Self {
        Self { http, credentials }
    }

    /// Exchange the API token for a short-lived access token.
    pub async fn request_token(&self) -> Result<String> {
        let resp = self
            .http
            .post(self.credentials.token_url())
            .basic_auth(API_TOKEN_USER, Some(&self.credentials.api_token))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FactsheetError::Auth(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| FactsheetError::Auth(format!("unreadable token response: {}", e)))?;
        Ok(token.access_token)
    }

    /// Obtain the header for API calls. A failed exchange is logged and yields
    /// an unauthenticated header; no retry.
    pub async fn authenticate(&self) -> AuthHeader {
        match self.request_token().await {
            Ok(token) => {
                tracing::info!(base_url = %self.credentials.base_url, "Obtained access token");
                AuthHeader::bearer(&token)
            }
            Err(e) => {
                tracing::error!(error = %e, "Obtaining access token failed");
                AuthHeader::unauthenticated()
            }
        }
    }
}
