/// Last search, kept in memory only.

use crate::types::Product;

/// Keyword and results of the last search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub keyword: String,
    pub results: Vec<Product>,
}

impl SearchState {
    /// Changes the keyword and keeps the current results.
    pub fn set_keyword(&mut self, keyword: impl Into<String>) {
        self.keyword = keyword.into();
    }

    /// Replaces the results and keeps the keyword.
    pub fn set_results(&mut self, results: Vec<Product>) {
        self.results = results;
    }

    /// Forgets both keyword and results.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CategorySummary;
    use chrono::Utc;
    use uuid::Uuid;

    fn dress() -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Yellow Dress".to_string(),
            slug: "yellow-dress".to_string(),
            description: "Summer".to_string(),
            price: 25.0,
            quantity: 3,
            category: CategorySummary {
                id: Uuid::new_v4(),
                name: "Clothing".to_string(),
                slug: "clothing".to_string(),
            },
            shipping: true,
            has_photo: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_starts_empty() {
        let state = SearchState::default();
        assert_eq!(state.keyword, "");
        assert!(state.results.is_empty());
    }

    #[test]
    fn test_keyword_change_keeps_results() {
        let mut state = SearchState::default();
        state.set_results(vec![dress()]);
        state.set_keyword("dress");

        assert_eq!(state.keyword, "dress");
        assert_eq!(state.results.len(), 1);

        state.clear();
        assert_eq!(state, SearchState::default());
    }
}
