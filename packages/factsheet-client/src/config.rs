use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

use crate::error::{FactsheetError, Result};

/// Default credentials file name, resolved next to the executable.
pub const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";

pub const API_TOKEN_VAR: &str = "FACTSHEET_API_TOKEN";
pub const BASE_URL_VAR: &str = "FACTSHEET_BASE_URL";

/// Workspace credentials, loaded once at startup.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub api_token: String,
    pub base_url: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Credentials {
    pub fn new(api_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: base_url.into(),
        }
    }

    /// Read credentials from a JSON file with `api_token` and `base_url` fields.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            FactsheetError::Config(format!(
                "failed to read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;

        let credentials: Credentials = serde_json::from_str(&content).map_err(|e| {
            FactsheetError::Config(format!(
                "malformed credentials file {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::debug!(path = %path.display(), base_url = %credentials.base_url, "Loaded credentials");
        credentials.validate()
    }

    /// Load the file, then apply `FACTSHEET_API_TOKEN` / `FACTSHEET_BASE_URL`
    /// overrides (a `.env` in the working directory is honoured).
    pub fn load_with_env(path: impl AsRef<Path>) -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        Self::load(path)?
            .with_overrides(env::var(API_TOKEN_VAR).ok(), env::var(BASE_URL_VAR).ok())
            .validate()
    }

    pub fn with_overrides(mut self, api_token: Option<String>, base_url: Option<String>) -> Self {
        if let Some(token) = api_token {
            self.api_token = token;
        }
        if let Some(url) = base_url {
            self.base_url = url;
        }
        self
    }

    fn validate(self) -> Result<Self> {
        if self.api_token.trim().is_empty() {
            return Err(FactsheetError::Config("api_token must not be empty".into()));
        }
        if self.base_url.trim().is_empty() {
            return Err(FactsheetError::Config("base_url must not be empty".into()));
        }
        Ok(self)
    }

    /// Root URL of the workspace. A bare host gets `https://`; an explicit
    /// scheme is kept as is.
    pub fn origin(&self) -> String {
        let base = self.base_url.trim().trim_end_matches('/');
        if base.starts_with("http://") || base.starts_with("https://") {
            base.to_string()
        } else {
            format!("https://{}", base)
        }
    }

    pub fn token_url(&self) -> String {
        format!("{}/services/mtm/v1/oauth2/token", self.origin())
    }

    pub fn graphql_url(&self) -> String {
        format!("{}/services/pathfinder/v1/graphql", self.origin())
    }

    pub fn factsheet_url(&self, id: &str) -> String {
        format!("{}/services/pathfinder/v1/factSheets/{}", self.origin(), id)
    }
}
