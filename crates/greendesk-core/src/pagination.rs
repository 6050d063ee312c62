//! Page arithmetic for paged list endpoints. Pages are 1-based.

/// Position within a paged result set. Built through [`Pagination::new`] so
/// the page is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32, total: u64) -> Self {
        Self {
            page,
            page_size: page_size.max(1),
            total,
        }
        .clamp()
    }

    /// At least one page, even when there are no items.
    pub fn total_pages(&self) -> u32 {
        let size = self.page_size.max(1) as u64;
        let pages = self.total.div_ceil(size).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Pull `page` into `1..=total_pages`.
    pub fn clamp(mut self) -> Self {
        self.page = self.page.clamp(1, self.total_pages());
        self
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Zero-based index of the first item on this page.
    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1) as u64) * self.page_size as u64
    }

    /// Up to `width` page numbers centred on the current page.
    pub fn window(&self, width: u32) -> Vec<u32> {
        let last = self.total_pages();
        let width = width.clamp(1, last);
        let half = width / 2;
        let start = self
            .page
            .saturating_sub(half)
            .max(1)
            .min(last - width + 1);
        (start..start + width).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(Pagination::new(1, 10, 0).total_pages(), 1);
        assert_eq!(Pagination::new(1, 10, 10).total_pages(), 1);
        assert_eq!(Pagination::new(1, 10, 11).total_pages(), 2);
    }

    #[test]
    fn zero_page_size_is_raised() {
        let p = Pagination::new(3, 0, 2);
        assert_eq!(p.page_size, 1);
        assert_eq!(p.total_pages(), 2);
        assert_eq!(p.page, 2);
    }

    #[test]
    fn page_is_clamped() {
        assert_eq!(Pagination::new(0, 10, 35).page, 1);
        assert_eq!(Pagination::new(9, 10, 35).page, 4);
    }

    #[test]
    fn prev_next_and_offset() {
        let p = Pagination::new(2, 25, 60);
        assert!(p.has_prev());
        assert!(p.has_next());
        assert_eq!(p.offset(), 25);
        let last = Pagination::new(3, 25, 60);
        assert!(!last.has_next());
    }

    #[test]
    fn window_stays_in_range() {
        assert_eq!(Pagination::new(1, 10, 100).window(5), vec![1, 2, 3, 4, 5]);
        assert_eq!(Pagination::new(5, 10, 100).window(5), vec![3, 4, 5, 6, 7]);
        assert_eq!(Pagination::new(10, 10, 100).window(5), vec![6, 7, 8, 9, 10]);
        assert_eq!(Pagination::new(1, 10, 20).window(5), vec![1, 2]);
    }
}
