//! Pagination.

use serde::Deserialize;
use serde::Serialize;

use crate::model::RowData;
use crate::state::Updater;
use crate::table::Table;

/// The current page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    /// Zero-based page index.
    pub page_index: usize,
    /// Rows per page.
    pub page_size: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: 10,
        }
    }
}

impl<T: RowData> Table<T> {
    /// Effective pagination slice.
    pub fn pagination_state(&self) -> PaginationState {
        let options = self.options();
        if let Some(controlled) = options.state.pagination {
            return controlled;
        }
        self.internal_state().pagination
    }

    /// Proposes a new pagination slice through the update protocol.
    pub fn set_pagination(&self, updater: Updater<PaginationState>) {
        let options = self.options();
        let new = updater.resolve(self.pagination_state());
        if let Some(on_change) = &options.on_pagination_change {
            on_change(&new);
        }
        if options.state.pagination.is_none() {
            self.write_internal_state(|state| state.pagination = new);
        }
    }

    /// Number of pages: the host override when one is configured,
    /// otherwise `ceil(total / page_size)` over the expanded rows.
    pub fn page_count(&self) -> usize {
        let options = self.options();
        if options.page_count >= 0 {
            return options.page_count as usize;
        }
        let total = self.expanded_row_model().rows.len();
        let page_size = self.pagination_state().page_size.max(1);
        total.div_ceil(page_size)
    }

    /// Every valid page index, for page pickers.
    pub fn page_options(&self) -> Vec<usize> {
        (0..self.page_count()).collect()
    }

    /// The requested page index clamped into the valid range.
    pub fn page_index(&self) -> usize {
        self.pagination_state()
            .page_index
            .min(self.page_count().saturating_sub(1))
    }

    /// Moves to a page, clamped into the valid range.
    pub fn set_page_index(&self, page_index: usize) {
        let clamped = page_index.min(self.page_count().saturating_sub(1));
        self.set_pagination(Updater::apply(move |mut pagination: PaginationState| {
            pagination.page_index = clamped;
            pagination
        }));
    }

    /// Changes the page size, re-anchoring on the first row of the
    /// current page so the view does not jump.
    pub fn set_page_size(&self, page_size: usize) {
        let page_size = page_size.max(1);
        self.set_pagination(Updater::apply(move |pagination: PaginationState| {
            let top_row = pagination.page_index * pagination.page_size.max(1);
            PaginationState {
                page_index: top_row / page_size,
                page_size,
            }
        }));
    }

    /// Returns `true` when a previous page exists.
    pub fn can_previous_page(&self) -> bool {
        self.page_index() > 0
    }

    /// Returns `true` when a next page exists.
    pub fn can_next_page(&self) -> bool {
        self.page_index() + 1 < self.page_count()
    }

    /// Moves to the next page, if any.
    pub fn next_page(&self) {
        if self.can_next_page() {
            self.set_page_index(self.page_index() + 1);
        }
    }

    /// Moves to the previous page, if any.
    pub fn previous_page(&self) {
        if self.can_previous_page() {
            self.set_page_index(self.page_index() - 1);
        }
    }
}
