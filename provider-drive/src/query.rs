//! Drive query expression builder
//!
//! Accumulates filter clauses and joins them with `and`, producing the
//! backend's `q` parameter syntax. Free text is escaped before being
//! embedded in string literals so user input cannot break the expression.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::types::FOLDER_MIME_TYPE;

/// Fluent builder for Drive filter expressions
///
/// # Example
///
/// ```
/// use provider_drive::Query;
///
/// let q = Query::new().in_parent("F").not_trashed().build();
/// assert_eq!(q.as_deref(), Some("'F' in parents and trashed=false"));
/// ```
#[derive(Debug, Default, Clone)]
pub struct Query {
    clauses: Vec<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to direct children of a folder
    pub fn in_parent(mut self, parent_id: &str) -> Self {
        self.clauses
            .push(format!("'{}' in parents", escape(parent_id)));
        self
    }

    /// Exclude trashed files
    pub fn not_trashed(mut self) -> Self {
        self.clauses.push("trashed=false".to_string());
        self
    }

    /// Exact name match
    pub fn name_equals(mut self, name: &str) -> Self {
        self.clauses.push(format!("name = '{}'", escape(name)));
        self
    }

    /// Substring name match
    pub fn name_contains(mut self, text: &str) -> Self {
        self.clauses
            .push(format!("name contains '{}'", escape(text)));
        self
    }

    /// Restrict by MIME type
    pub fn mime_type(mut self, mime_type: &str) -> Self {
        self.clauses
            .push(format!("mimeType='{}'", escape(mime_type)));
        self
    }

    /// Restrict to folders
    pub fn is_folder(self) -> Self {
        self.mime_type(FOLDER_MIME_TYPE)
    }

    /// Restrict to files modified after a point in time
    pub fn modified_after(mut self, after: DateTime<Utc>) -> Self {
        self.clauses.push(format!(
            "modifiedTime > '{}'",
            after.to_rfc3339_opts(SecondsFormat::Millis, true)
        ));
        self
    }

    /// Join the accumulated clauses with logical AND.
    ///
    /// Returns `None` when no clauses were added, so callers can omit the
    /// `q` parameter entirely.
    pub fn build(self) -> Option<String> {
        if self.clauses.is_empty() {
            None
        } else {
            Some(self.clauses.join(" and "))
        }
    }
}

/// Escape single quotes in a string literal embedded in a query.
fn escape(text: &str) -> String {
    text.replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_query_builds_none() {
        assert_eq!(Query::new().build(), None);
    }

    #[test]
    fn test_clauses_joined_with_and() {
        let q = Query::new()
            .in_parent("folder1")
            .not_trashed()
            .build()
            .unwrap();

        assert_eq!(q, "'folder1' in parents and trashed=false");
    }

    #[test]
    fn test_apostrophes_are_escaped() {
        let q = Query::new()
            .in_parent("F")
            .not_trashed()
            .name_contains("a's file")
            .build()
            .unwrap();

        assert!(q.contains("name contains 'a\\'s file'"));
        assert!(q.contains(" and "));
    }

    #[test]
    fn test_name_equals_escaped() {
        let q = Query::new().name_equals("it's").build().unwrap();
        assert_eq!(q, "name = 'it\\'s'");
    }

    #[test]
    fn test_folder_predicate() {
        let q = Query::new().is_folder().build().unwrap();
        assert_eq!(q, "mimeType='application/vnd.google-apps.folder'");
    }

    #[test]
    fn test_modified_after() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let q = Query::new().modified_after(ts).build().unwrap();
        assert_eq!(q, "modifiedTime > '2024-03-01T12:00:00.000Z'");
    }
}
