use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
/// Highest page whose offset still fits in an i64 at the largest page size.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

/// 1-based page selection. Bounds are enforced by the validation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    pub fn from_query(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self::new(page.unwrap_or(1), page_size.unwrap_or(DEFAULT_PAGE_SIZE))
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> Paged<T> {
    pub fn new(items: Vec<T>, total: i64, request: &PageRequest) -> Self {
        let total_pages = if request.page_size > 0 {
            (total + request.page_size - 1) / request.page_size
        } else {
            0
        };
        Self {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(PageRequest::new(1, 20).offset(), 0);
        assert_eq!(PageRequest::new(3, 25).offset(), 50);
    }

    #[test]
    fn offset_saturates_instead_of_overflowing() {
        assert_eq!(PageRequest::new(i64::MAX, MAX_PAGE_SIZE).offset(), i64::MAX);
        assert!(PageRequest::new(MAX_PAGE, MAX_PAGE_SIZE).offset() > 0);
    }

    #[test]
    fn defaults_apply_when_query_is_empty() {
        let page = PageRequest::from_query(None, None);
        assert_eq!(page, PageRequest::new(1, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn total_pages_rounds_up() {
        let paged = Paged::new(vec![1, 2, 3], 41, &PageRequest::new(1, 20));
        assert_eq!(paged.total_pages, 3);

        let exact = Paged::<i32>::new(vec![], 40, &PageRequest::new(2, 20));
        assert_eq!(exact.total_pages, 2);

        let empty = Paged::<i32>::new(vec![], 0, &PageRequest::new(1, 20));
        assert_eq!(empty.total_pages, 0);
    }
}
