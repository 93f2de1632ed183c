//! Pure Factsheet GraphQL API client.
//!
//! Authenticates with a workspace API token, reads factsheets of one type
//! through `allFactSheets`, and archives them in combined mutations of at most
//! [`MAX_BATCH_SIZE`] `updateFactSheet` calls.
//!
//! # Example
//!
//! ```rust,ignore
//! use factsheet_client::{BatchArchiver, Credentials, FactsheetClient, FactsheetQuery};
//!
//! let credentials = Credentials::load("credentials.json")?;
//! let client = FactsheetClient::connect(credentials).await;
//!
//! let table = client.fetch(&FactsheetQuery::new("Application")).await?;
//! let report = BatchArchiver::new(&client)
//!     .archive_all("Application", &table.ids())
//!     .await?;
//! println!("{} archived in {} requests", report.attempted, report.batches_sent);
//! ```

pub mod archive;
pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod query;
pub mod types;

pub use archive::{batches, ArchiveReport, BatchArchiver, BatchOutcome};
pub use auth::{AuthClient, AuthHeader};
pub use config::Credentials;
pub use error::{FactsheetError, Result};
pub use query::{
    build_delete_mutation, build_query, ArchiveMutation, FactsheetQuery, MAX_BATCH_SIZE,
};
pub use types::{FactsheetRecord, FactsheetTable, GraphQlRequest, Patch};

use reqwest::{Client, Response, StatusCode};

/// Client bound to one workspace and one access token.
#[derive(Clone)]
pub struct FactsheetClient {
    http: Client,
    credentials: Credentials,
    auth: AuthHeader,
}

impl FactsheetClient {
    pub fn new(credentials: Credentials, auth: AuthHeader) -> Self {
        Self {
            http: Client::new(),
            credentials,
            auth,
        }
    }

    /// Authenticate and build a client. When the token exchange fails the
    /// client still comes back, carrying an unauthenticated header.
    pub async fn connect(credentials: Credentials) -> Self {
        let http = Client::new();
        let auth = AuthClient::new(&http, &credentials).authenticate().await;
        Self {
            http,
            credentials,
            auth,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn auth(&self) -> &AuthHeader {
        &self.auth
    }

    /// POST a document to the GraphQL endpoint. Status handling is left to
    /// the caller.
    pub async fn execute(&self, request: &GraphQlRequest) -> Result<Response> {
        let resp = self
            .auth
            .apply(self.http.post(self.credentials.graphql_url()))
            .json(request)
            .send()
            .await?;
        Ok(resp)
    }

    /// Hard-delete one factsheet through the REST endpoint. Returns `true`
    /// when the server answers 204.
    pub async fn delete_factsheet(&self, id: &str) -> Result<bool> {
        query::validate_id(id)?;
        if id.contains(['/', '?', '#']) {
            return Err(FactsheetError::InvalidQuery(format!(
                "factsheet id {:?} is not a valid path segment",
                id
            )));
        }
        let resp = self
            .auth
            .apply(self.http.delete(self.credentials.factsheet_url(id)))
            .send()
            .await?;

        let deleted = resp.status() == StatusCode::NO_CONTENT;
        if !deleted {
            tracing::warn!(id, status = resp.status().as_u16(), "Factsheet was not deleted");
        }
        Ok(deleted)
    }
}
