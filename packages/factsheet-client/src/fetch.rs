//! Read path: run the `allFactSheets` query and materialize a result table.

use std::collections::HashSet;

use reqwest::StatusCode;
use serde_json::Value;

use crate::error::{FactsheetError, Result};
use crate::query::FactsheetQuery;
use crate::types::{
    AllFactSheets, AllFactSheetsData, FactsheetRecord, FactsheetTable, GraphQlRequest,
    GraphQlResponse,
};
use crate::FactsheetClient;

impl FactsheetClient {
    /// Fetch every factsheet matched by `query`, in server order.
    ///
    /// Without a page size this is a single request. With one, the cursor is
    /// followed until the server reports no further page.
    pub async fn fetch(&self, query: &FactsheetQuery) -> Result<FactsheetTable> {
        let mut table = FactsheetTable::new(query.columns());
        let mut current = query.clone();
        let mut pages = 0usize;
        let mut seen_cursors = HashSet::new();

        loop {
            let page = self.fetch_page(&current).await?;
            pages += 1;

            if table.total_count.is_none() {
                table.total_count = page.total_count;
            }
            let page_len = page.edges.len();
            for edge in page.edges {
                table.records.push(FactsheetRecord::from_node(edge.node)?);
            }

            let next_cursor = match (&current.page, page.page_info) {
                (Some(_), Some(info)) if info.has_next_page => info.end_cursor,
                _ => None,
            };
            let Some(cursor) = next_cursor else { break };
            if page_len == 0 {
                tracing::warn!(%cursor, "Empty page reported a next page, stopping pagination");
                break;
            }
            if !seen_cursors.insert(cursor.clone()) {
                tracing::warn!(%cursor, "Server returned a cursor already followed, stopping pagination");
                break;
            }
            current = query.after(cursor);
        }

        tracing::info!(
            entity_type = %query.entity_type,
            count = table.len(),
            total_count = ?table.total_count,
            pages,
            "Fetched factsheets"
        );
        if table.is_truncated() {
            tracing::warn!(
                entity_type = %query.entity_type,
                fetched = table.len(),
                total_count = ?table.total_count,
                "Server reports more factsheets than were fetched; rerun with --page-size to page through all of them"
            );
        }
        Ok(table)
    }

    async fn fetch_page(&self, query: &FactsheetQuery) -> Result<AllFactSheets> {
        let document = query.build()?;
        tracing::debug!(query = %document, "Executing factsheet query");

        let resp = self.execute(&GraphQlRequest::query(document)).await?;
        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(FactsheetError::Connection {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GraphQlResponse<Value> = resp
            .json()
            .await
            .map_err(|e| FactsheetError::Parse(format!("Failed to decode query response: {}", e)))?;

        if let Some(messages) = payload.error_messages() {
            return Err(FactsheetError::GraphQl {
                context: format!("retrieving {} data", query.entity_type),
                messages,
            });
        }

        let data = payload
            .data
            .ok_or_else(|| FactsheetError::Parse("query response carried no data".into()))?;
        let data: AllFactSheetsData = serde_json::from_value(data)?;
        Ok(data.all_fact_sheets)
    }
}
