//! Page window arithmetic for paginated vendor listings.

use serde::{Deserialize, Serialize};

/// Number of vendor rows shown per page, on both the public search and the
/// admin listing.
pub const PAGE_SIZE: u64 = 10;

/// An inclusive row range `[start, end]`, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRange {
    pub start: u64,
    pub end: u64,
}

impl RowRange {
    /// Rows covered by a 1-based page: `[(page-1)*size, page*size - 1]`.
    ///
    /// Page `0` is treated as page `1`.
    #[must_use]
    pub const fn for_page(page: u64, page_size: u64) -> Self {
        let page = if page == 0 { 1 } else { page };
        let start = (page - 1).saturating_mul(page_size);
        Self {
            start,
            end: start.saturating_add(page_size).saturating_sub(1),
        }
    }

    /// Number of rows the range covers.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always false; a range covers at least one row.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

/// The current page of a listing together with its totals.
///
/// The page is kept inside `[1, total_pages]`, or at `1` when nothing matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    page: u64,
    page_size: u64,
    total_count: u64,
    total_pages: u64,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::first()
    }
}

impl PageWindow {
    /// The first page, before any totals are known.
    #[must_use]
    pub const fn first() -> Self {
        Self {
            page: 1,
            page_size: PAGE_SIZE,
            total_count: 0,
            total_pages: 0,
        }
    }

    /// A window positioned at `page` with the given totals, clamped.
    #[must_use]
    pub const fn new(page: u64, total_count: u64) -> Self {
        let total_pages = Self::total_pages_for(total_count, PAGE_SIZE);
        Self {
            page: Self::clamp_page(page, total_pages),
            page_size: PAGE_SIZE,
            total_count,
            total_pages,
        }
    }

    /// `ceil(count / page_size)`.
    #[must_use]
    pub const fn total_pages_for(count: u64, page_size: u64) -> u64 {
        if page_size == 0 {
            return 0;
        }
        count.div_ceil(page_size)
    }

    /// Clamp a requested page into `[1, total_pages]` (or `1` if there are no pages).
    #[must_use]
    pub const fn clamp_page(page: u64, total_pages: u64) -> u64 {
        if total_pages == 0 || page <= 1 {
            1
        } else if page > total_pages {
            total_pages
        } else {
            page
        }
    }

    /// Move to another page, clamped against the totals already known.
    ///
    /// Before the first result arrives (no totals yet) the only valid page is `1`.
    #[must_use]
    pub const fn with_page(self, page: u64) -> Self {
        Self {
            page: Self::clamp_page(page, self.total_pages),
            ..self
        }
    }

    /// Move to a page without clamping; used when the caller knows the totals
    /// are about to be refreshed by a fetch of exactly this page.
    #[must_use]
    pub const fn requesting(self, page: u64) -> Self {
        Self {
            page: if page == 0 { 1 } else { page },
            ..self
        }
    }

    /// Record a fresh total count, clamping the current page against it.
    #[must_use]
    pub const fn with_total(self, total_count: u64) -> Self {
        Self::new(self.page, total_count)
    }

    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    #[must_use]
    pub const fn total_count(&self) -> u64 {
        self.total_count
    }

    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// Rows to request for the current page.
    #[must_use]
    pub const fn row_range(&self) -> RowRange {
        RowRange::for_page(self.page, self.page_size)
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_range_for_page() {
        assert_eq!(RowRange::for_page(1, 10), RowRange { start: 0, end: 9 });
        assert_eq!(RowRange::for_page(3, 10), RowRange { start: 20, end: 29 });
        assert_eq!(RowRange::for_page(0, 10), RowRange { start: 0, end: 9 });
        assert_eq!(RowRange::for_page(2, 10).len(), 10);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(PageWindow::total_pages_for(0, 10), 0);
        assert_eq!(PageWindow::total_pages_for(1, 10), 1);
        assert_eq!(PageWindow::total_pages_for(10, 10), 1);
        assert_eq!(PageWindow::total_pages_for(11, 10), 2);
        assert_eq!(PageWindow::total_pages_for(95, 10), 10);
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(PageWindow::clamp_page(0, 5), 1);
        assert_eq!(PageWindow::clamp_page(3, 5), 3);
        assert_eq!(PageWindow::clamp_page(9, 5), 5);
        assert_eq!(PageWindow::clamp_page(4, 0), 1);
    }

    #[test]
    fn test_with_total_clamps_current_page() {
        let window = PageWindow::first().requesting(7).with_total(25);
        assert_eq!(window.page(), 3);
        assert_eq!(window.total_pages(), 3);
        assert!(window.has_previous());
        assert!(!window.has_next());

        let empty = window.with_total(0);
        assert_eq!(empty.page(), 1);
        assert_eq!(empty.total_pages(), 0);
    }

    #[test]
    fn test_with_page_uses_known_totals() {
        let window = PageWindow::new(1, 42);
        assert_eq!(window.with_page(4).page(), 4);
        assert_eq!(window.with_page(12).page(), 5);
        assert_eq!(PageWindow::first().with_page(3).page(), 1);
    }
}
