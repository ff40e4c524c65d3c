//! Page math for catalog navigation.
//!
//! Pages are 1-based. An out-of-range page yields an empty slice with the
//! correct total count — never an error.

use serde::{Deserialize, Serialize};

/// Returns the highest valid page number for a list.
pub fn max_page(total: u64, page_size: u64) -> u64 {
    if total == 0 { 1 } else { (total - 1) / page_size + 1 }
}

/// Returns the zero-based offset of the first item on a page.
pub fn offset(page: u64, page_size: u64) -> u64 {
    page.saturating_sub(1) * page_size
}

/// One page of items plus the navigation metadata the renderer needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number as requested.
    pub number: u64,
    pub page_size: u64,
    /// Total item count across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, number: u64, page_size: u64, total: u64) -> Self {
        Self {
            items,
            number,
            page_size,
            total,
        }
    }

    pub fn max_page(&self) -> u64 {
        max_page(self.total, self.page_size)
    }

    /// A "previous" affordance is shown iff this holds.
    pub fn has_prev(&self) -> bool {
        self.number > 1
    }

    /// A "next" affordance is shown iff this holds.
    pub fn has_next(&self) -> bool {
        self.number < self.max_page()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_page_rounds_up() {
        assert_eq!(max_page(0, 5), 1);
        assert_eq!(max_page(1, 5), 1);
        assert_eq!(max_page(5, 5), 1);
        assert_eq!(max_page(6, 5), 2);
        assert_eq!(max_page(11, 5), 3);
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(offset(1, 5), 0);
        assert_eq!(offset(2, 5), 5);
        assert_eq!(offset(4, 3), 9);
    }

    #[test]
    fn nav_affordances() {
        let first: Page<u32> = Page::new(vec![1, 2, 3, 4, 5], 1, 5, 12);
        assert!(!first.has_prev());
        assert!(first.has_next());

        let middle: Page<u32> = Page::new(vec![6, 7, 8, 9, 10], 2, 5, 12);
        assert!(middle.has_prev());
        assert!(middle.has_next());

        let last: Page<u32> = Page::new(vec![11, 12], 3, 5, 12);
        assert!(last.has_prev());
        assert!(!last.has_next());
    }

    #[test]
    fn out_of_range_page_is_empty_with_correct_total() {
        // Page 5 of a 3-item list at 5 per page.
        let page: Page<u32> = Page::new(vec![], 5, 5, 3);
        assert!(page.is_empty());
        assert_eq!(page.total, 3);
        assert_eq!(page.max_page(), 1);
    }

    #[test]
    fn pages_partition_the_list() {
        // Count of items across pages 1..=max equals the total, and no
        // page exceeds the page size.
        let total = 23u64;
        let page_size = 5u64;
        let items: Vec<u64> = (0..total).collect();

        let mut seen = 0u64;
        for page in 1..=max_page(total, page_size) {
            let start = offset(page, page_size) as usize;
            let slice = &items[start..(start + page_size as usize).min(items.len())];
            assert!(slice.len() as u64 <= page_size);
            seen += slice.len() as u64;
        }
        assert_eq!(seen, total);
    }
}
