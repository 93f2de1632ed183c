use factsheet_client::FactsheetQuery;

/// A factsheet type to archive, optionally narrowed to some categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub entity_type: &'static str,
    /// Empty means every category.
    pub categories: &'static [&'static str],
}

impl Target {
    pub fn query(&self, page_size: Option<u32>) -> FactsheetQuery {
        let query = FactsheetQuery::new(self.entity_type).categories(self.categories.iter().copied());
        match page_size {
            Some(size) => query.page_size(size),
            None => query,
        }
    }
}

/// Types processed by a run, in order. Narrow a type to categories with e.g.
/// `Target { entity_type: "Process", categories: &["organizationalProcess", "systemProcess"] }`.
pub const TARGETS: &[Target] = &[Target {
    entity_type: "Application",
    categories: &[],
}];
