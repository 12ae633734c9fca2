//! Column visibility.

use std::collections::HashMap;
use std::sync::Arc;

use crate::column::Column;
use crate::model::RowData;
use crate::state::Updater;
use crate::table::Table;

/// Visibility by column id. Columns without an entry are visible.
pub type VisibilityState = HashMap<String, bool>;

impl<T: RowData> Table<T> {
    /// Effective visibility slice.
    pub fn column_visibility_state(&self) -> VisibilityState {
        let options = self.options();
        if let Some(controlled) = &options.state.column_visibility {
            return controlled.clone();
        }
        self.internal_state().column_visibility
    }

    /// Proposes a new visibility slice through the update protocol.
    pub fn set_column_visibility(&self, updater: Updater<VisibilityState>) {
        let options = self.options();
        let new = updater.resolve(self.column_visibility_state());
        if let Some(on_change) = &options.on_column_visibility_change {
            on_change(&new);
        }
        if options.state.column_visibility.is_none() {
            self.write_internal_state(|state| state.column_visibility = new);
        }
    }

    /// Returns `true` when the column can be hidden at all.
    pub fn can_hide_column(&self, column: &Column<T>) -> bool {
        column.def().enable_hiding && self.options().enable_hiding
    }

    /// Effective visibility of one column.
    ///
    /// A leaf's visibility comes from its own state entry only, never from
    /// its group's.
    pub fn is_column_visible(&self, column_id: &str) -> bool {
        let columns = self.column_model();
        let Some(column) = columns.column(column_id) else {
            return false;
        };
        if !self.can_hide_column(column) {
            return true;
        }
        self.column_visibility_state()
            .get(column_id)
            .copied()
            .unwrap_or(true)
    }

    /// Shows or hides a single column.
    pub fn toggle_column_visibility(&self, column_id: &str) {
        let visible = self.is_column_visible(column_id);
        let id = column_id.to_string();
        self.set_column_visibility(Updater::apply(move |mut state: VisibilityState| {
            state.insert(id, !visible);
            state
        }));
    }

    /// Shows or hides every hideable leaf column at once.
    pub fn toggle_all_columns_visible(&self, visible: bool) {
        let columns = self.column_model();
        let mut state = VisibilityState::new();
        for leaf in &columns.leaf_columns {
            if self.can_hide_column(leaf) {
                state.insert(leaf.id().to_string(), visible);
            }
        }
        self.set_column_visibility(Updater::set(state));
    }

    /// The visible leaf columns in final display order
    /// (left region, then center, then right).
    pub fn visible_leaf_columns(&self) -> Vec<Arc<Column<T>>> {
        self.leaf_model().all()
    }
}
