//! Offset pagination for list endpoints.
//!
//! Pages are 1-based. A request is normalized before use: page 0 becomes
//! page 1 and the limit is clamped to `1..=MAX_PAGE_SIZE`.

use serde::{Deserialize, Serialize};

use crate::config::MAX_PAGE_SIZE;

/// A page request as received from a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Number of items to skip before this page starts.
    pub fn offset(&self) -> usize {
        (self.page.max(1) as usize - 1) * self.limit as usize
    }

    pub fn total_pages(&self, total: usize) -> usize {
        if self.limit == 0 {
            return 0;
        }
        total.div_ceil(self.limit as usize)
    }

    /// Cut one page out of an already filtered and sorted list.
    pub fn slice<T>(&self, items: Vec<T>) -> Paginated<T> {
        let total = items.len();
        let items = items
            .into_iter()
            .skip(self.offset())
            .take(self.limit as usize)
            .collect();
        Paginated {
            items,
            page: self.page,
            limit: self.limit,
            total,
            total_pages: self.total_pages(total),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

/// One page of results plus the totals needed to render navigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub total_pages: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page() {
        let page = PageRequest::new(1, 5).slice((0..12).collect::<Vec<_>>());
        assert_eq!(page.items, vec![0, 1, 2, 3, 4]);
        assert_eq!(page.total, 12);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_last_partial_page() {
        let page = PageRequest::new(3, 5).slice((0..12).collect::<Vec<_>>());
        assert_eq!(page.items, vec![10, 11]);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let page = PageRequest::new(9, 5).slice((0..12).collect::<Vec<_>>());
        assert!(page.items.is_empty());
        assert_eq!(page.total, 12);
    }

    #[test]
    fn test_normalizes_bounds() {
        let req = PageRequest::new(0, 0);
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 1);

        let req = PageRequest::new(2, 10_000);
        assert_eq!(req.limit, MAX_PAGE_SIZE);
        assert_eq!(req.offset(), MAX_PAGE_SIZE as usize);
    }

    #[test]
    fn test_empty_list() {
        let page = PageRequest::default().slice(Vec::<u8>::new());
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
    }
}
