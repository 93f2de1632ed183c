//! Typed construction of the GraphQL documents sent to the pathfinder API.
//!
//! Names (entity types, fields, aliases, variables) are validated against the
//! GraphQL `Name` grammar; every string value is emitted as an escaped string
//! literal, so caller-supplied lists cannot inject fragments into a document.

use serde_json::Value;

use crate::error::{FactsheetError, Result};
use crate::types::{Patch, Variables};

/// Upper bound on aliased `updateFactSheet` calls in one mutation.
pub const MAX_BATCH_SIZE: usize = 50;

/// Audit comment attached to every archive patch.
pub const DEFAULT_ARCHIVE_COMMENT: &str = "Archived in bulk by archive-factsheets";

/// Columns every fetch returns, whatever the caller asked for.
const REQUIRED_PATHS: [&str; 3] = ["id", "name", "externalId.externalId"];

/// Check a GraphQL name: `[_A-Za-z][_0-9A-Za-z]*`.
pub fn validate_name(kind: &str, name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(FactsheetError::InvalidQuery(format!(
            "{} {:?} is not a valid GraphQL name",
            kind, name
        )))
    }
}

/// Factsheet ids are opaque, but never blank.
pub fn validate_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(FactsheetError::InvalidQuery("empty factsheet id".into()));
    }
    Ok(())
}

/// Quote a value as a GraphQL string literal. JSON string escaping is a
/// subset of GraphQL's.
pub fn string_literal(value: &str) -> String {
    Value::String(value.to_owned()).to_string()
}

/// Ordered, de-duplicated tree of selected fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSet {
    fields: Vec<(String, SelectionSet)>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dotted field path (`lifecycle.asString`). Existing prefixes are
    /// reused, so repeated paths are selected once.
    pub fn insert_path(&mut self, path: &str) -> Result<()> {
        let mut node = self;
        for segment in path.split('.') {
            validate_name("field", segment)?;
            let idx = match node.fields.iter().position(|(name, _)| name == segment) {
                Some(idx) => idx,
                None => {
                    node.fields.push((segment.to_string(), SelectionSet::new()));
                    node.fields.len() - 1
                }
            };
            node = &mut node.fields[idx].1;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn render_into(&self, out: &mut String) {
        for (i, (name, children)) in self.fields.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(name);
            if !children.is_empty() {
                out.push_str(" { ");
                children.render_into(out);
                out.push_str(" }");
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }
}

/// Cursor window for a paginated read.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub first: u32,
    pub after: Option<String>,
}

/// Read query over `allFactSheets` for one factsheet type.
#[derive(Debug, Clone, PartialEq)]
pub struct FactsheetQuery {
    pub entity_type: String,
    pub fields: Vec<String>,
    pub categories: Vec<String>,
    pub page: Option<Page>,
}

impl FactsheetQuery {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            fields: Vec::new(),
            categories: Vec::new(),
            page: None,
        }
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn page_size(mut self, first: u32) -> Self {
        self.page = Some(Page { first, after: None });
        self
    }

    /// Same query, positioned after `cursor`. Only meaningful with a page size.
    pub fn after(&self, cursor: impl Into<String>) -> Self {
        let mut next = self.clone();
        if let Some(page) = next.page.as_mut() {
            page.after = Some(cursor.into());
        }
        next
    }

    /// Result-table columns: caller fields first, then `id`, `name`, `externalId`.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for field in &self.fields {
            let is_required = matches!(
                field.as_str(),
                "id" | "name" | "externalId" | "externalId.externalId"
            );
            if !is_required && !columns.contains(field) {
                columns.push(field.clone());
            }
        }
        columns.extend(["id", "name", "externalId"].map(String::from));
        columns
    }

    pub fn selection(&self) -> Result<SelectionSet> {
        let mut selection = SelectionSet::new();
        for path in REQUIRED_PATHS {
            selection.insert_path(path)?;
        }
        for field in &self.fields {
            selection.insert_path(field)?;
        }
        Ok(selection)
    }

    fn filter_clause(&self) -> String {
        let mut facets = vec![format!(
            "{{facetKey: \"FactSheetTypes\", keys: [{}]}}",
            string_literal(&self.entity_type)
        )];
        if !self.categories.is_empty() {
            let keys = self
                .categories
                .iter()
                .map(|c| string_literal(c))
                .collect::<Vec<_>>()
                .join(", ");
            facets.push(format!("{{facetKey: \"category\", keys: [{}]}}", keys));
        }
        format!("{{facetFilters: [{}]}}", facets.join(", "))
    }

    /// Render the query document.
    pub fn build(&self) -> Result<String> {
        validate_name("entity type", &self.entity_type)?;
        let selection = self.selection()?;

        let mut arguments = Vec::new();
        if let Some(page) = &self.page {
            if page.first == 0 {
                return Err(FactsheetError::InvalidQuery(
                    "page size must be at least 1".into(),
                ));
            }
            arguments.push(format!("first: {}", page.first));
            if let Some(cursor) = &page.after {
                arguments.push(format!("after: {}", string_literal(cursor)));
            }
        }
        arguments.push(format!("filter: {}", self.filter_clause()));

        let page_info = if self.page.is_some() {
            "pageInfo { hasNextPage endCursor } "
        } else {
            ""
        };

        Ok(format!(
            "{{ allFactSheets({}) {{ totalCount {}edges {{ node {{ ... on {} {{ {} }} }} }} }} }}",
            arguments.join(", "),
            page_info,
            self.entity_type,
            selection.render()
        ))
    }
}

/// Build the read query for `entity_type`, selecting `fields` and filtering
/// by `categories` (empty means all categories).
pub fn build_query(entity_type: &str, fields: &[String], categories: &[String]) -> Result<String> {
    FactsheetQuery::new(entity_type)
        .fields(fields.iter().cloned())
        .categories(categories.iter().cloned())
        .build()
}

/// One combined archive mutation for a batch of ids.
#[derive(Debug, Clone)]
pub struct ArchiveMutation {
    pub document: String,
    pub variables: Variables,
    /// `fs1`..`fsN`, aligned with the input ids.
    pub aliases: Vec<String>,
}

impl ArchiveMutation {
    pub fn build<S: AsRef<str>>(entity_type: &str, ids: &[S], comment: &str) -> Result<Self> {
        validate_name("entity type", entity_type)?;
        if ids.is_empty() {
            return Err(FactsheetError::InvalidQuery(
                "archive batch must contain at least one id".into(),
            ));
        }
        if ids.len() > MAX_BATCH_SIZE {
            return Err(FactsheetError::InvalidQuery(format!(
                "archive batch of {} ids exceeds the limit of {}",
                ids.len(),
                MAX_BATCH_SIZE
            )));
        }

        let patch = serde_json::to_value(vec![Patch::archive()])?;
        let mut parameters = Vec::with_capacity(ids.len());
        let mut calls = Vec::with_capacity(ids.len());
        let mut variables = Variables::new();
        let mut aliases = Vec::with_capacity(ids.len());

        for (i, id) in ids.iter().enumerate() {
            let id = id.as_ref();
            validate_id(id).map_err(|_| {
                FactsheetError::InvalidQuery(format!("empty factsheet id at batch position {}", i))
            })?;

            let n = i + 1;
            let alias = format!("fs{}", n);
            let variable = format!("patches{}", n);

            parameters.push(format!("${}: [Patch]!", variable));
            calls.push(format!(
                "{}: updateFactSheet(id: {}, patches: ${}, validateOnly: false, comment: {}) {{ factSheet {{ ... on {} {{ id status }} }} }}",
                alias,
                string_literal(id),
                variable,
                string_literal(comment),
                entity_type
            ));
            variables.insert(variable, patch.clone());
            aliases.push(alias);
        }

        Ok(Self {
            document: format!("mutation ({}) {{ {} }}", parameters.join(", "), calls.join(" ")),
            variables,
            aliases,
        })
    }
}

/// Build the combined archive mutation and its variables for up to
/// [`MAX_BATCH_SIZE`] ids.
pub fn build_delete_mutation<S: AsRef<str>>(
    entity_type: &str,
    ids: &[S],
) -> Result<(String, Variables)> {
    let mutation = ArchiveMutation::build(entity_type, ids, DEFAULT_ARCHIVE_COMMENT)?;
    Ok((mutation.document, mutation.variables))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn query_for_all_categories() {
        let query = build_query("Application", &[], &[]).unwrap();
        assert_eq!(
            query,
            "{ allFactSheets(filter: {facetFilters: [{facetKey: \"FactSheetTypes\", keys: [\"Application\"]}]}) \
             { totalCount edges { node { ... on Application { id name externalId { externalId } } } } } }"
        );
    }

    #[test]
    fn query_with_categories_and_fields() {
        let query = build_query(
            "Process",
            &strings(&["description", "lifecycle.asString"]),
            &strings(&["organizationalProcess", "systemProcess"]),
        )
        .unwrap();

        assert!(query.contains(
            "{facetKey: \"category\", keys: [\"organizationalProcess\", \"systemProcess\"]}"
        ));
        assert!(query.contains(
            "... on Process { id name externalId { externalId } description lifecycle { asString } }"
        ));
    }

    #[test]
    fn required_fields_appear_once() {
        let query = build_query(
            "Application",
            &strings(&["id", "name", "externalId.externalId", "externalId", "name"]),
            &[],
        )
        .unwrap();

        assert_eq!(query.matches(" id ").count(), 1);
        assert_eq!(query.matches(" name ").count(), 1);
        assert_eq!(query.matches("externalId { externalId }").count(), 1);
    }

    #[test]
    fn columns_put_caller_fields_first() {
        let query = FactsheetQuery::new("Application").fields(["description", "id", "description"]);
        assert_eq!(query.columns(), strings(&["description", "id", "name", "externalId"]));
    }

    #[test]
    fn rejects_injected_names() {
        assert!(build_query("Application { id } x", &[], &[]).is_err());
        assert!(build_query("Application", &strings(&["name } evil {"]), &[]).is_err());
        assert!(build_query("Application", &strings(&["lifecycle..asString"]), &[]).is_err());
        assert!(validate_name("field", "9lives").is_err());
        assert!(validate_name("field", "_ok9").is_ok());
    }

    #[test]
    fn category_keys_are_escaped() {
        let query = build_query("Process", &[], &strings(&["a\"] evil"])).unwrap();
        assert!(query.contains(r#"keys: ["a\"] evil"]"#));
    }

    #[test]
    fn paginated_query_selects_page_info() {
        let query = FactsheetQuery::new("Application").page_size(100);
        let first = query.build().unwrap();
        assert!(first.contains("allFactSheets(first: 100, filter:"));
        assert!(first.contains("totalCount pageInfo { hasNextPage endCursor } edges"));

        let next = query.after("abc==").build().unwrap();
        assert!(next.contains("allFactSheets(first: 100, after: \"abc==\", filter:"));

        assert!(FactsheetQuery::new("Application").page_size(0).build().is_err());
    }

    #[test]
    fn mutation_for_three_ids() {
        let (document, variables) = build_delete_mutation("Application", &["1", "2", "3"]).unwrap();

        assert!(document.starts_with(
            "mutation ($patches1: [Patch]!, $patches2: [Patch]!, $patches3: [Patch]!) {"
        ));
        for n in 1..=3 {
            assert!(document.contains(&format!(
                "fs{n}: updateFactSheet(id: \"{n}\", patches: $patches{n}, validateOnly: false"
            )));
        }
        assert!(document.contains("factSheet { ... on Application { id status } }"));

        assert_eq!(variables.len(), 3);
        for key in ["patches1", "patches2", "patches3"] {
            assert_eq!(
                variables[key],
                json!([{"op": "replace", "path": "/status", "value": "ARCHIVED"}])
            );
        }
    }

    #[test]
    fn mutation_aliases_follow_input_order() {
        let mutation = ArchiveMutation::build("Application", &["b", "a"], "note").unwrap();
        assert_eq!(mutation.aliases, strings(&["fs1", "fs2"]));
        let first = mutation.document.find("id: \"b\"").unwrap();
        let second = mutation.document.find("id: \"a\"").unwrap();
        assert!(first < second);
        assert!(mutation.document.contains("comment: \"note\""));
    }

    #[test]
    fn mutation_rejects_bad_batches() {
        let empty: [&str; 0] = [];
        assert!(build_delete_mutation("Application", &empty).is_err());
        assert!(build_delete_mutation("Application", &["ok", ""]).is_err());

        let too_many: Vec<String> = (0..=MAX_BATCH_SIZE).map(|i| i.to_string()).collect();
        assert!(build_delete_mutation("Application", &too_many).is_err());

        let full: Vec<String> = (0..MAX_BATCH_SIZE).map(|i| i.to_string()).collect();
        assert!(build_delete_mutation("Application", &full).is_ok());
    }

    #[test]
    fn mutation_escapes_ids() {
        let (document, _) = build_delete_mutation("Application", &["x\") { hack"]).unwrap();
        assert!(document.contains(r#"id: "x\") { hack""#));
    }
}
