//! Category reference table and keyword-based suggestion.

use crate::domain::Category;
use crate::sheet::{schema, Sheet};

/// Immutable, explicitly-passed snapshot of the category reference table.
#[derive(Debug, Clone, Default)]
pub struct CategoryTable {
    categories: Vec<Category>,
}

impl CategoryTable {
    pub fn new(categories: Vec<Category>) -> Self {
        CategoryTable { categories }
    }

    pub fn from_sheet(sheet: &Sheet) -> Self {
        CategoryTable::new(schema::parse_categories(sheet))
    }

    pub fn get(&self, category_id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.category_id == category_id)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Suggests the category whose keywords occur most often as substrings of
    /// the lowercased event name. Ties break to the first-seen category in
    /// the table; zero matches means no suggestion.
    pub fn suggest(&self, event_name: &str) -> Option<&str> {
        let name = event_name.to_lowercase();
        let mut best: Option<&Category> = None;
        let mut best_count = 0usize;

        for category in &self.categories {
            let count = category
                .keywords
                .iter()
                .filter(|kw| !kw.is_empty() && name.contains(&kw.to_lowercase()))
                .count();
            if count > best_count {
                best_count = count;
                best = Some(category);
            }
        }

        best.map(|c| c.category_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CategoryTable {
        CategoryTable::new(vec![
            Category {
                category_id: "concert".into(),
                category_name: "Concert".into(),
                keywords: vec!["concert".into(), "gig".into(), "live music".into()],
                default_image_url: "https://img.example/concert.jpg".into(),
            },
            Category {
                category_id: "sports".into(),
                category_name: "Sports".into(),
                keywords: vec!["match".into(), "vs".into(), "boxing".into()],
                default_image_url: String::new(),
            },
        ])
    }

    #[test]
    fn suggests_highest_keyword_count() {
        assert_eq!(table().suggest("Boxing match: Smith vs Jones"), Some("sports"));
        assert_eq!(table().suggest("Live Music Gig"), Some("concert"));
    }

    #[test]
    fn zero_matches_means_no_suggestion() {
        assert_eq!(table().suggest("Annual General Meeting"), None);
    }

    #[test]
    fn ties_break_to_first_seen_category() {
        // One keyword hit each; "concert" is first in the table.
        assert_eq!(table().suggest("Gig of the match"), Some("concert"));
    }
}
