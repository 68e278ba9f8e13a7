//! Paginate stage
//!
//! `total_pages = max(1, ceil(total_items / page_size))` and the current
//! page is clamped into `[1, total_pages]`. Pages are 1-indexed.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Page size and position over the filtered, sorted rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    page_size: usize,
    current_page: usize,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PageWindow {
    /// Start on page 1; a page size of 0 is treated as 1
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Number of pages for `total_items`, never less than 1
    pub fn total_pages(&self, total_items: usize) -> usize {
        total_items.div_ceil(self.page_size).max(1)
    }

    /// The current page clamped for `total_items`, without mutating
    pub fn clamped_page(&self, total_items: usize) -> usize {
        self.current_page.clamp(1, self.total_pages(total_items))
    }

    /// Clamp the current page for `total_items`; returns the new page
    pub fn clamp(&mut self, total_items: usize) -> usize {
        let clamped = self.clamped_page(total_items);
        if clamped != self.current_page {
            tracing::debug!(
                "Clamping page {} to {} ({} items)",
                self.current_page,
                clamped,
                total_items
            );
            self.current_page = clamped;
        }
        clamped
    }

    /// Index range of the visible slice for `total_items`
    pub fn range(&self, total_items: usize) -> Range<usize> {
        let page = self.clamped_page(total_items);
        let start = ((page - 1) * self.page_size).min(total_items);
        let end = (page * self.page_size).min(total_items);
        start..end
    }

    /// The visible slice of `items`
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range(items.len())]
    }

    /// Change the page size; returns to page 1
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.current_page = 1;
    }

    /// Jump to a page; values below 1 become 1, the upper bound is
    /// applied by the next clamp
    pub fn go_to(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    pub fn first(&mut self) {
        self.current_page = 1;
    }

    pub fn last(&mut self, total_items: usize) {
        self.current_page = self.total_pages(total_items);
    }

    pub fn next(&mut self, total_items: usize) {
        let page = self.clamped_page(total_items);
        self.current_page = (page + 1).min(self.total_pages(total_items));
    }

    pub fn prev(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }

    /// Summary of the window for `total_items`
    pub fn info(&self, total_items: usize) -> PageInfo {
        let range = self.range(total_items);
        let current_page = self.clamped_page(total_items);
        let total_pages = self.total_pages(total_items);
        PageInfo {
            current_page,
            total_pages,
            total_items,
            page_size: self.page_size,
            start: range.start,
            end: range.end,
        }
    }
}

/// What the pager displays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize,
    /// Index of the first visible item
    pub start: usize,
    /// One past the last visible item
    pub end: usize,
}

impl PageInfo {
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

impl std::fmt::Display for PageInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.total_items == 0 {
            return write!(f, "Page 1 of 1 (0 items)");
        }
        write!(
            f,
            "Page {} of {} (showing {}-{} of {} items)",
            self.current_page,
            self.total_pages,
            self.start + 1,
            self.end,
            self.total_items
        )
    }
}
