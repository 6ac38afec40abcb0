//! Page selection for list endpoints that can grow large (customers, products).

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;

/// 1-based page number and page size as requested by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    /// Missing query values fall back to the first page of `DEFAULT_PAGE_SIZE`.
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self { page: page.unwrap_or(1), per_page: per_page.unwrap_or(DEFAULT_PAGE_SIZE) }
    }

    /// Zero-based page index and a page size clamped to `1..=MAX_PAGE_SIZE`,
    /// in the shape SeaORM's paginator takes.
    pub fn bounds(self) -> (u64, u64) {
        let index = self.page.saturating_sub(1);
        let size = self.per_page.clamp(1, MAX_PAGE_SIZE);
        (u64::from(index), u64::from(size))
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_zero_means_first_page() {
        assert_eq!(Pagination { page: 0, per_page: 0 }.bounds(), (0, 1));
    }

    #[test]
    fn oversized_pages_are_capped() {
        assert_eq!(Pagination::new(Some(5), Some(1000)).bounds(), (4, 100));
    }

    #[test]
    fn missing_values_use_defaults() {
        assert_eq!(Pagination::new(None, Some(10)), Pagination { page: 1, per_page: 10 });
        assert_eq!(Pagination::default().bounds(), (0, 50));
    }
}
