//! Client-side document list filtering.

use crate::document::Document;

/// Conjunctive title/category filter for the document list.
///
/// Linear over the in-memory list; the set is a personal workspace, small
/// enough to recompute on every keystroke.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    /// Case-insensitive substring match on the title. Empty matches all.
    pub query: String,
    /// Exact case-insensitive category match. `None` matches all.
    pub category: Option<String>,
}

impl DocumentFilter {
    pub fn matches(&self, doc: &Document) -> bool {
        if !self.query.is_empty() {
            let title = doc.title.to_lowercase();
            if !title.contains(&self.query.to_lowercase()) {
                return false;
            }
        }

        if let Some(category) = &self.category {
            let doc_category = doc.category.as_deref().unwrap_or("");
            if doc_category.to_lowercase() != category.to_lowercase() {
                return false;
            }
        }

        true
    }

    pub fn apply<'a>(&self, docs: &'a [Document]) -> Vec<&'a Document> {
        docs.iter().filter(|d| self.matches(d)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(title: &str, category: Option<&str>) -> Document {
        Document {
            id: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            content: json!({}),
            category: category.map(|c| c.to_string()),
            category_color: None,
            preview_image: None,
            created_at: None,
            updated_at: None,
            user_id: "user-1".to_string(),
        }
    }

    fn fixtures() -> Vec<Document> {
        vec![
            doc("Cat Sketch", Some("sketches")),
            doc("Dog Diagram", Some("diagrams")),
            doc("Cat Diagram", Some("diagrams")),
        ]
    }

    #[test]
    fn test_query_and_category_are_conjunctive() {
        let docs = fixtures();
        let filter = DocumentFilter {
            query: "cat".to_string(),
            category: Some("diagrams".to_string()),
        };

        let visible = filter.apply(&docs);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Cat Diagram");
    }

    #[test]
    fn test_query_is_case_insensitive_substring() {
        let docs = fixtures();
        let filter = DocumentFilter {
            query: "CAT".to_string(),
            ..DocumentFilter::default()
        };

        let titles: Vec<&str> = filter.apply(&docs).iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Cat Sketch", "Cat Diagram"]);
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let docs = fixtures();
        assert_eq!(DocumentFilter::default().apply(&docs).len(), 3);
    }

    #[test]
    fn test_absent_category_does_not_match_a_label() {
        let uncategorized = doc("Loose Sketch", None);
        let filter = DocumentFilter {
            category: Some("all".to_string()),
            ..DocumentFilter::default()
        };

        // A missing category is absent, not the literal label "all".
        assert!(!filter.matches(&uncategorized));
        assert!(DocumentFilter::default().matches(&uncategorized));
    }

    #[test]
    fn test_category_match_ignores_case_beyond_ascii() {
        let d = doc("Exercise Sheet", Some("études"));
        let filter = DocumentFilter {
            category: Some("ÉTUDES".to_string()),
            ..DocumentFilter::default()
        };
        assert!(filter.matches(&d));
    }

    #[test]
    fn test_category_match_is_exact_not_substring() {
        let d = doc("Plan", Some("diagrams"));
        let filter = DocumentFilter {
            category: Some("diagram".to_string()),
            ..DocumentFilter::default()
        };
        assert!(!filter.matches(&d));
    }
}
