//! Pagination stage: slice the visible sequence into one page window.

use std::sync::Arc;

use crate::model::{RowData, RowModel};
use crate::table::Table;

impl<T: RowData> Table<T> {
    /// The model pagination starts from.
    pub fn pre_paginated_row_model(&self) -> Arc<RowModel<T>> {
        self.expanded_row_model()
    }

    /// The final page window over the expanded sequence.
    ///
    /// The page index is clamped into `[0, page_count - 1]`; the page
    /// count is `ceil(total / page_size)` unless the host supplied an
    /// override for server-driven data.
    pub fn paginated_row_model(&self) -> Arc<RowModel<T>> {
        let expanded = self.expanded_row_model();
        let options = self.options();
        let pagination = self.pagination_state();
        let deps = (
            Arc::as_ptr(&expanded) as usize,
            pagination,
            options.page_count,
            options.enable_pagination,
        );
        self.caches.paginated.get(deps, |_| {
            if !options.enable_pagination {
                return expanded.clone();
            }
            let page_size = pagination.page_size.max(1);
            let total = expanded.rows.len();
            let page_count = if options.page_count >= 0 {
                options.page_count as usize
            } else {
                total.div_ceil(page_size)
            };
            let page_index = pagination.page_index.min(page_count.saturating_sub(1));
            let start = (page_index * page_size).min(total);
            let end = (start + page_size).min(total);
            let rows: Vec<_> = expanded.rows[start..end].to_vec();
            Arc::new(RowModel {
                flat_rows: rows.clone(),
                rows_by_id: rows
                    .iter()
                    .map(|row| (row.id().to_string(), row.clone()))
                    .collect(),
                rows,
            })
        })
    }
}
