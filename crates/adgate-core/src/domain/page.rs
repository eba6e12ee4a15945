//! In-memory pagination over fully-fetched listings
//!
//! Directory searches return the full result set; paging is applied after
//! the fact. An out-of-range page number clamps to the nearest valid page
//! instead of erroring, so a listing never 404s because rows were deleted
//! between two requests.

use serde::{Deserialize, Serialize};

/// One page of a listing, with enough metadata to render pager controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// The page actually served, after clamping. 1-based.
    pub page: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Slices `items` into the requested page.
///
/// `total_pages` is the ceiling of `total_count / page_size`. The requested
/// page is clamped into `[1, max(total_pages, 1)]`; a page size of zero is
/// treated as one.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_count = items.len();
    let total_pages = total_count.div_ceil(page_size);
    let page = page.clamp(1, total_pages.max(1));

    let start = (page - 1) * page_size;
    let items: Vec<T> = items
        .into_iter()
        .skip(start)
        .take(page_size)
        .collect();

    Page {
        items,
        page,
        page_size,
        total_count,
        total_pages,
        has_next: page < total_pages,
        has_prev: page > 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_multiple() {
        let page = paginate((0..20).collect(), 2, 10);
        assert_eq!(page.items, (10..20).collect::<Vec<_>>());
        assert_eq!(page.total_pages, 2);
        assert!(!page.has_next);
        assert!(page.has_prev);
    }

    #[test]
    fn test_partial_last_page() {
        let page = paginate((0..23).collect(), 3, 10);
        assert_eq!(page.items, (20..23).collect::<Vec<_>>());
        assert_eq!(page.total_count, 23);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next);
    }

    #[test]
    fn test_out_of_range_page_clamps_to_last() {
        let page = paginate((0..23).collect(), 5, 10);
        assert_eq!(page.page, 3);
        assert_eq!(page.items, (20..23).collect::<Vec<_>>());
    }

    #[test]
    fn test_page_zero_clamps_to_first() {
        let page = paginate((0..5).collect(), 0, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 5);
        assert!(!page.has_prev);
    }

    #[test]
    fn test_empty_listing() {
        let page = paginate(Vec::<i32>::new(), 1, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
        assert!(!page.has_next && !page.has_prev);
    }

    #[test]
    fn test_zero_page_size_is_treated_as_one() {
        let page = paginate(vec![1, 2, 3], 2, 0);
        assert_eq!(page.page_size, 1);
        assert_eq!(page.items, vec![2]);
    }
}
