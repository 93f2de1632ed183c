//! Batched soft-delete: chunks of ids, one combined `updateFactSheet`
//! mutation per chunk, executed strictly in input order.

use serde_json::Value;
use std::slice::Chunks;

use crate::error::{FactsheetError, Result};
use crate::query::{self, ArchiveMutation, DEFAULT_ARCHIVE_COMMENT, MAX_BATCH_SIZE};
use crate::types::{GraphQlRequest, GraphQlResponse};
use crate::FactsheetClient;

/// Fixed-size chunks over an immutable id list. `size` is clamped to
/// `1..=MAX_BATCH_SIZE`.
pub fn batches<S>(ids: &[S], size: usize) -> Chunks<'_, S> {
    ids.chunks(size.clamp(1, MAX_BATCH_SIZE))
}

/// Result of one mutation round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Archived { count: usize },
    Failed { count: usize, reason: String },
}

impl BatchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, BatchOutcome::Failed { .. })
    }
}

/// Totals for one `archive_all` run. A failed batch may still have archived
/// some of its ids; the API does not say which.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    pub attempted: usize,
    pub batches_sent: usize,
    pub failed_batches: usize,
    /// Ids in batches that came back without errors.
    pub archived: usize,
}

pub struct BatchArchiver<'a> {
    client: &'a FactsheetClient,
    batch_size: usize,
    comment: String,
}

impl<'a> BatchArchiver<'a> {
    pub fn new(client: &'a FactsheetClient) -> Self {
        Self {
            client,
            batch_size: MAX_BATCH_SIZE,
            comment: DEFAULT_ARCHIVE_COMMENT.to_string(),
        }
    }

    /// Smaller batches than the API limit. Values above the limit are capped.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Archive every id, one mutation per batch.
    ///
    /// Failed batches are logged and counted, and the run moves on. Blank ids
    /// reject the whole run before anything is sent; transport failures stop
    /// it where it is.
    pub async fn archive_all<S: AsRef<str>>(
        &self,
        entity_type: &str,
        ids: &[S],
    ) -> Result<ArchiveReport> {
        query::validate_name("entity type", entity_type)?;
        if let Some(pos) = ids.iter().position(|id| id.as_ref().trim().is_empty()) {
            return Err(FactsheetError::InvalidQuery(format!(
                "empty factsheet id at position {}",
                pos
            )));
        }

        let mut report = ArchiveReport::default();
        if ids.is_empty() {
            tracing::info!(entity_type, "Nothing to archive");
            return Ok(report);
        }

        let total_batches = ids.len().div_ceil(self.batch_size);
        for (index, batch) in batches(ids, self.batch_size).enumerate() {
            let outcome = self.archive_batch(entity_type, batch).await?;

            report.attempted += batch.len();
            report.batches_sent += 1;
            match &outcome {
                BatchOutcome::Archived { count } => {
                    report.archived += count;
                    tracing::info!(
                        entity_type,
                        batch = index + 1,
                        of = total_batches,
                        size = count,
                        "Archived batch"
                    );
                }
                BatchOutcome::Failed { count, reason } => {
                    report.failed_batches += 1;
                    tracing::error!(
                        entity_type,
                        batch = index + 1,
                        of = total_batches,
                        size = count,
                        error = %reason,
                        "GraphQL executed with errors"
                    );
                }
            }
        }

        Ok(report)
    }

    /// Send one combined mutation for up to [`MAX_BATCH_SIZE`] ids.
    pub async fn archive_batch<S: AsRef<str>>(
        &self,
        entity_type: &str,
        ids: &[S],
    ) -> Result<BatchOutcome> {
        let mutation = ArchiveMutation::build(entity_type, ids, &self.comment)?;
        let count = mutation.aliases.len();
        let request = GraphQlRequest::with_variables(mutation.document, mutation.variables);

        let resp = self.client.execute(&request).await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Ok(BatchOutcome::Failed {
                count,
                reason: format!("HTTP {}: {}", status.as_u16(), body),
            });
        }

        let payload: GraphQlResponse<Value> = match resp.json().await {
            Ok(payload) => payload,
            Err(e) => {
                return Ok(BatchOutcome::Failed {
                    count,
                    reason: format!("unreadable mutation response: {}", e),
                })
            }
        };

        match payload.error_messages() {
            Some(messages) => Ok(BatchOutcome::Failed {
                count,
                reason: messages,
            }),
            None => Ok(BatchOutcome::Archived { count }),
        }
    }
}
