//! The tabular data pipeline
//!
//! [`GridState`] owns everything a person screen's table derives from and
//! recomputes the visible page on demand:
//!
//! 1. flatten every record (redone whenever records or reference data change)
//! 2. filter with the structured filter set
//! 3. free-text search across the search fields
//! 4. stable sort by the single active key
//! 5. project the visible columns
//! 6. paginate, clamping the current page
//!
//! Changing filters, search text, sort or page size returns to page 1.
//! Replacing records keeps the page and lets the clamp pull it back into
//! range. Nothing here performs I/O or fails.

use crate::filter::FilterSet;
use crate::flatten::{Flattener, flatten_all};
use crate::paginate::{PageInfo, PageWindow};
use crate::project::{ColumnSet, HeaderCell, RenderedRow, headers, render_rows};
use crate::search::{default_search_fields, matches_search};
use crate::sort::{SortSpec, sort_rows};
use roster_model::{FlatRow, Record, ReferenceData};
use serde::Serialize;

// ============================================================================
// GridView
// ============================================================================

/// One computed page, ready to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridView {
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<RenderedRow>,
    pub page: PageInfo,
}

impl GridView {
    pub fn total_items(&self) -> usize {
        self.page.total_items
    }

    pub fn total_pages(&self) -> usize {
        self.page.total_pages
    }

    pub fn current_page(&self) -> usize {
        self.page.current_page
    }

    /// Cells of one column, in row order
    pub fn column(&self, id: &str) -> Vec<&str> {
        match self.headers.iter().position(|h| h.id == id) {
            Some(i) => self.rows.iter().map(|r| r.cells[i].as_str()).collect(),
            None => Vec::new(),
        }
    }
}

// ============================================================================
// GridState
// ============================================================================

/// Inputs and UI state of one screen's table
#[derive(Debug)]
pub struct GridState {
    flattener: Box<dyn Flattener>,
    columns: ColumnSet,
    search_fields: Vec<String>,

    records: Vec<Record>,
    reference: ReferenceData,
    rows: Vec<FlatRow>,

    filters: FilterSet,
    search: String,
    sort: Option<SortSpec>,
    page: PageWindow,
    visible_columns: Option<Vec<String>>,
}

impl GridState {
    /// Create an empty grid
    pub fn new(flattener: impl Flattener + 'static, columns: ColumnSet) -> Self {
        Self {
            flattener: Box::new(flattener),
            columns,
            search_fields: default_search_fields(),
            records: Vec::new(),
            reference: ReferenceData::empty(),
            rows: Vec::new(),
            filters: FilterSet::new(),
            search: String::new(),
            sort: None,
            page: PageWindow::default(),
            visible_columns: None,
        }
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Override the free-text search fields
    pub fn with_search_fields(mut self, fields: Vec<String>) -> Self {
        self.search_fields = fields;
        self
    }

    /// Set the initial sort
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Set the initial page size
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page = PageWindow::new(page_size);
        self
    }

    // ========================================================================
    // Inputs
    // ========================================================================

    /// Replace the fetched records
    pub fn set_records(&mut self, records: Vec<Record>) {
        self.records = records;
        self.reflatten();
    }

    /// Replace the reference lookup tables
    pub fn set_reference_data(&mut self, reference: ReferenceData) {
        self.reference = reference;
        self.reflatten();
    }

    fn reflatten(&mut self) {
        self.rows = flatten_all(self.flattener.as_ref(), &self.records, &self.reference);
        tracing::debug!("Flattened {} records", self.rows.len());
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    /// All flattened rows in backend order
    pub fn rows(&self) -> &[FlatRow] {
        &self.rows
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Replace the structured filters; returns to page 1
    pub fn set_filters(&mut self, filters: FilterSet) {
        self.filters = filters;
        self.page.first();
    }

    /// Replace the search text; returns to page 1
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page.first();
    }

    /// Click a sortable header; returns to page 1
    pub fn toggle_sort(&mut self, key: &str) {
        self.sort = Some(SortSpec::toggle(self.sort.as_ref(), key));
        self.page.first();
    }

    /// Set or clear the sort; returns to page 1
    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sort = sort;
        self.page.first();
    }

    /// Change rows per page; returns to page 1
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page.set_page_size(page_size);
    }

    /// Jump to a page; clamped on the next view
    pub fn go_to_page(&mut self, page: usize) {
        self.page.go_to(page);
    }

    pub fn next_page(&mut self) {
        let total = self.filtered_rows().len();
        self.page.next(total);
    }

    pub fn prev_page(&mut self) {
        self.page.prev();
    }

    /// Load or clear the visible-column set
    pub fn set_visible_columns(&mut self, ids: Option<Vec<String>>) {
        self.visible_columns = ids;
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn page_window(&self) -> PageWindow {
        self.page
    }

    pub fn visible_columns(&self) -> Option<&[String]> {
        self.visible_columns.as_deref()
    }

    // ========================================================================
    // Derivation
    // ========================================================================

    /// Every row surviving filter and search, sorted
    pub fn filtered_rows(&self) -> Vec<&FlatRow> {
        let mut rows: Vec<&FlatRow> = self
            .rows
            .iter()
            .filter(|row| self.filters.matches(row))
            .filter(|row| matches_search(row, &self.search, &self.search_fields))
            .collect();
        if let Some(sort) = &self.sort {
            sort_rows(&mut rows, sort);
        }
        rows
    }

    /// Compute the visible page, clamping the stored current page
    pub fn view(&mut self) -> GridView {
        let total = self.filtered_rows().len();
        self.page.clamp(total);
        self.peek()
    }

    /// Compute the visible page without touching state
    pub fn peek(&self) -> GridView {
        let rows = self.filtered_rows();
        let page = self.page.info(rows.len());
        let columns = self.columns.visible(self.visible_columns.as_deref());

        tracing::debug!(
            "Grid page {}/{}: {} of {} rows match",
            page.current_page,
            page.total_pages,
            page.total_items,
            self.rows.len()
        );

        GridView {
            headers: headers(&columns, self.sort.as_ref()),
            rows: render_rows(&columns, self.page.slice(&rows).iter().copied()),
            page,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
