use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FactsheetError, Result};

/// Variables attached to a GraphQL document.
pub type Variables = Map<String, Value>;

/// GraphQL request body
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Variables>,
}

impl GraphQlRequest {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: None,
        }
    }

    pub fn with_variables(query: impl Into<String>, variables: Variables) -> Self {
        Self {
            query: query.into(),
            variables: Some(variables),
        }
    }
}

/// GraphQL response wrapper
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQlError>>,
}

impl<T> GraphQlResponse<T> {
    /// Joined error messages, if the payload carried any. Each message is
    /// prefixed with its response path, so a failed alias reads `fs3: ...`.
    pub fn error_messages(&self) -> Option<String> {
        match &self.errors {
            Some(errors) if !errors.is_empty() => Some(
                errors
                    .iter()
                    .map(GraphQlError::describe)
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            _ => None,
        }
    }
}

/// GraphQL error
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub path: Option<Vec<Value>>,
}

impl GraphQlError {
    /// Dotted response path, e.g. `fs3` or `allFactSheets.edges.0`.
    pub fn path_string(&self) -> Option<String> {
        let segments: Vec<String> = self
            .path
            .as_deref()?
            .iter()
            .map(|segment| match segment {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        (!segments.is_empty()).then(|| segments.join("."))
    }

    fn describe(&self) -> String {
        match self.path_string() {
            Some(path) => format!("{}: {}", path, self.message),
            None => self.message.clone(),
        }
    }
}

/// Operation of a JSON patch sent to `updateFactSheet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Patch {
    pub op: PatchOp,
    pub path: String,
    pub value: String,
}

impl Patch {
    /// The single-field transition that soft-deletes a factsheet.
    pub fn archive() -> Self {
        Self {
            op: PatchOp::Replace,
            path: "/status".to_string(),
            value: "ARCHIVED".to_string(),
        }
    }
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// `allFactSheets` connection as returned by the read query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllFactSheets {
    pub total_count: Option<u64>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    pub page_info: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
pub struct Edge {
    pub node: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllFactSheetsData {
    pub all_fact_sheets: AllFactSheets,
}

/// A single factsheet row.
#[derive(Debug, Clone, PartialEq)]
pub struct FactsheetRecord {
    pub id: String,
    pub name: String,
    pub external_id: Option<String>,
    /// Remaining requested fields, keyed by top-level field name.
    pub fields: Map<String, Value>,
}

impl FactsheetRecord {
    /// Build a record from a GraphQL node, flattening `externalId { externalId }`.
    pub fn from_node(node: Value) -> Result<Self> {
        let Value::Object(mut map) = node else {
            return Err(FactsheetError::Parse("factsheet node is not an object".into()));
        };

        let id = match map.remove("id") {
            Some(Value::String(id)) if !id.is_empty() => id,
            _ => return Err(FactsheetError::Parse("factsheet node without id".into())),
        };
        let name = match map.remove("name") {
            Some(Value::String(name)) => name,
            _ => String::new(),
        };
        let external_id = match map.remove("externalId") {
            Some(Value::Object(mut inner)) => match inner.remove("externalId") {
                Some(Value::String(s)) => Some(s),
                _ => None,
            },
            Some(Value::String(s)) => Some(s),
            _ => None,
        };

        Ok(Self {
            id,
            name,
            external_id,
            fields: map,
        })
    }

    /// Look up a column. Dotted paths walk into nested objects.
    pub fn get(&self, column: &str) -> Option<Value> {
        match column {
            "id" => return Some(Value::String(self.id.clone())),
            "name" => return Some(Value::String(self.name.clone())),
            "externalId" | "externalId.externalId" => {
                return self.external_id.clone().map(Value::String)
            }
            _ => {}
        }

        let mut segments = column.split('.');
        let mut current = self.fields.get(segments.next()?)?;
        for segment in segments {
            current = current.get(segment)?;
        }
        Some(current.clone())
    }
}

/// Ordered result of a fetch, in server order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactsheetTable {
    pub columns: Vec<String>,
    pub records: Vec<FactsheetRecord>,
    /// `totalCount` reported by the server for the first page.
    pub total_count: Option<u64>,
}

impl FactsheetTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
            total_count: None,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }

    pub fn column(&self, column: &str) -> Vec<Option<Value>> {
        self.records.iter().map(|r| r.get(column)).collect()
    }

    /// True when the server's `totalCount` exceeds the rows fetched.
    pub fn is_truncated(&self) -> bool {
        matches!(self.total_count, Some(total) if total > self.records.len() as u64)
    }
}
