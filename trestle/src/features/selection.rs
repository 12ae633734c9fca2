//! Row selection.

use std::collections::HashSet;
use std::sync::Arc;

use crate::model::RowData;
use crate::model::RowModel;
use crate::state::Updater;
use crate::table::Table;

/// Selected row ids.
///
/// Selection is id-based so it stays stable while rows move, and ids that
/// fall out of the current filtered model simply read as unselected.
pub type RowSelectionState = HashSet<String>;

impl<T: RowData> Table<T> {
    /// Effective selection slice.
    pub fn row_selection_state(&self) -> RowSelectionState {
        let options = self.options();
        if let Some(controlled) = &options.state.row_selection {
            return controlled.clone();
        }
        self.internal_state().row_selection
    }

    /// Proposes a new selection slice through the update protocol.
    pub fn set_row_selection(&self, updater: Updater<RowSelectionState>) {
        let options = self.options();
        let new = updater.resolve(self.row_selection_state());
        if let Some(on_change) = &options.on_row_selection_change {
            on_change(&new);
        }
        if options.state.row_selection.is_none() {
            self.write_internal_state(|state| state.row_selection = new);
        }
    }

    /// Effective selected flag of one row: it must both be marked and
    /// still exist in the current filtered model.
    pub fn is_row_selected(&self, row_id: &str) -> bool {
        self.row_selection_state().contains(row_id)
            && self.filtered_row_model().rows_by_id.contains_key(row_id)
    }

    /// Selects or deselects one row. `selected: None` toggles.
    pub fn toggle_row_selected(&self, row_id: &str, selected: Option<bool>) {
        if !self.options().enable_row_selection {
            return;
        }
        let target = selected.unwrap_or(!self.is_row_selected(row_id));
        let id = row_id.to_string();
        self.set_row_selection(Updater::apply(move |mut selection: RowSelectionState| {
            if target {
                selection.insert(id);
            } else {
                selection.remove(&id);
            }
            selection
        }));
    }

    /// Returns `true` when every row in the filtered model is selected.
    pub fn is_all_rows_selected(&self) -> bool {
        let filtered = self.filtered_row_model();
        let selection = self.row_selection_state();
        !filtered.flat_rows.is_empty()
            && filtered
                .flat_rows
                .iter()
                .all(|row| selection.contains(row.id()))
    }

    /// Returns `true` when at least one visible row is selected.
    pub fn is_some_rows_selected(&self) -> bool {
        let filtered = self.filtered_row_model();
        let selection = self.row_selection_state();
        filtered
            .flat_rows
            .iter()
            .any(|row| selection.contains(row.id()))
    }

    /// Selects or clears every row in the filtered model.
    /// `selected: None` toggles based on [`is_all_rows_selected`](Table::is_all_rows_selected).
    pub fn toggle_all_rows_selected(&self, selected: Option<bool>) {
        if !self.options().enable_row_selection {
            return;
        }
        let target = selected.unwrap_or(!self.is_all_rows_selected());
        let selection: RowSelectionState = if target {
            self.filtered_row_model()
                .flat_rows
                .iter()
                .map(|row| row.id().to_string())
                .collect()
        } else {
            HashSet::new()
        };
        self.set_row_selection(Updater::set(selection));
    }

    /// The effective selected ids, sorted for deterministic ordering.
    pub fn selected_row_ids(&self) -> Vec<String> {
        let filtered = self.filtered_row_model();
        let mut ids: Vec<String> = self
            .row_selection_state()
            .into_iter()
            .filter(|id| filtered.rows_by_id.contains_key(id))
            .collect();
        ids.sort();
        ids
    }

    /// A flat model of the currently selected rows, in filtered order.
    pub fn selected_row_model(&self) -> Arc<RowModel<T>> {
        let filtered = self.filtered_row_model();
        let selection = self.row_selection_state();
        let deps = (Arc::as_ptr(&filtered) as usize, selection.clone());
        self.caches.selected.get(deps, |_| {
            let rows: Vec<_> = filtered
                .flat_rows
                .iter()
                .filter(|row| selection.contains(row.id()))
                .map(|row| Arc::new(row.with_sub_rows(Vec::new())))
                .collect();
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
