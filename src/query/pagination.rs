/// Result window of a query: skip `first_result` rows, return at
/// most `max_results`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub first_result: Option<u32>,
    pub max_results: Option<u32>,
}

impl Pagination {
    /// Create pagination with page number (1-indexed) and per-page count
    pub fn page(page: u32, per_page: u32) -> Self {
        let first_result = if page > 1 {
            Some((page - 1).saturating_mul(per_page))
        } else {
            None
        };
        Self {
            first_result,
            max_results: Some(per_page),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.first_result.is_none() && self.max_results.is_none()
    }

    /// Convert to SQL string. SQLite only accepts OFFSET after a LIMIT, and a
    /// negative LIMIT means no limit.
    pub fn to_sql(&self) -> String {
        match (self.max_results, self.first_result) {
            (Some(max), Some(first)) => format!(" LIMIT {max} OFFSET {first}"),
            (Some(max), None) => format!(" LIMIT {max}"),
            (None, Some(first)) => format!(" LIMIT -1 OFFSET {first}"),
            (None, None) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_based_pagination() {
        let pagination = Pagination::page(2, 10); // Page 2, 10 per page
        assert_eq!(pagination.max_results, Some(10));
        assert_eq!(pagination.first_result, Some(10));
        assert_eq!(pagination.to_sql(), " LIMIT 10 OFFSET 10");
    }

    #[test]
    fn test_page_offset_saturates() {
        let pagination = Pagination::page(u32::MAX, u32::MAX);
        assert_eq!(pagination.first_result, Some(u32::MAX));
        assert_eq!(pagination.max_results, Some(u32::MAX));
    }

    #[test]
    fn test_first_page_pagination() {
        let pagination = Pagination::page(1, 20);
        assert_eq!(pagination.first_result, None);
        assert_eq!(pagination.to_sql(), " LIMIT 20");
    }

    #[test]
    fn test_offset_only_needs_unbounded_limit() {
        let pagination = Pagination {
            first_result: Some(15),
            max_results: None,
        };
        assert_eq!(pagination.to_sql(), " LIMIT -1 OFFSET 15");
    }

    #[test]
    fn test_unbounded() {
        let pagination = Pagination::default();
        assert!(pagination.is_unbounded());
        assert_eq!(pagination.to_sql(), "");
    }
}
