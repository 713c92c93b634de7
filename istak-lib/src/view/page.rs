//! Pagination window and projection output

use crate::model::CanonicalRecord;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A page index and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub(crate) index: usize,
    pub(crate) size: usize,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            index: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageWindow {
    /// Creates a window at page 0. A size of zero is raised to one.
    pub fn new(size: usize) -> Self {
        Self {
            index: 0,
            size: size.max(1),
        }
    }

    /// Returns the zero-based page index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the number of rows per page.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Clamps the index into `[0, page_count(row_count) - 1]`.
    pub fn clamp(&mut self, row_count: usize) {
        self.index = self.index.min(page_count(row_count, self.size) - 1);
    }
}

/// Number of pages needed for `row_count` rows; at least one.
pub fn page_count(row_count: usize, size: usize) -> usize {
    row_count.div_ceil(size.max(1)).max(1)
}

/// The rows a table displays, plus counts over the filtered set.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection<'a> {
    rows: Vec<&'a CanonicalRecord>,
    row_count: usize,
    page_count: usize,
    page_index: usize,
}

impl<'a> Projection<'a> {
    pub(crate) fn new(
        rows: Vec<&'a CanonicalRecord>,
        row_count: usize,
        page_count: usize,
        page_index: usize,
    ) -> Self {
        Self {
            rows,
            row_count,
            page_count,
            page_index,
        }
    }

    /// Rows on the current page, in display order.
    pub fn rows(&self) -> &[&'a CanonicalRecord] {
        &self.rows
    }

    /// Number of rows after filtering and query, before pagination.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of pages; at least one.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// The page actually shown, after clamping.
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Returns `true` if there is a page after this one.
    pub fn has_next(&self) -> bool {
        self.page_index + 1 < self.page_count
    }

    /// Returns `true` if there is a page before this one.
    pub fn has_previous(&self) -> bool {
        self.page_index > 0
    }

    /// Identifiers of the rows on this page.
    pub fn ids(&self) -> Vec<crate::model::RecordId> {
        self.rows.iter().map(|r| r.id().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(5, 0), 5);
    }

    #[test]
    fn test_clamp() {
        let mut window = PageWindow { index: 7, size: 10 };
        window.clamp(25);
        assert_eq!(window.index(), 2);
        window.clamp(0);
        assert_eq!(window.index(), 0);
    }
}
