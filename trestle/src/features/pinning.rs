//! Column pinning into left/right regions.

use serde::Deserialize;
use serde::Serialize;

use crate::column::Column;
use crate::model::RowData;
use crate::state::Updater;
use crate::table::Table;

/// Which edge a column is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pinned {
    /// Pinned to the left region.
    Left,
    /// Pinned to the right region.
    Right,
}

/// Pinned column ids per edge, in pin order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPinningState {
    /// Ids pinned left, leftmost first.
    pub left: Vec<String>,
    /// Ids pinned right, rightmost last.
    pub right: Vec<String>,
}

impl ColumnPinningState {
    /// Returns `true` when nothing is pinned.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    fn unpin(&mut self, column_id: &str) {
        self.left.retain(|id| id != column_id);
        self.right.retain(|id| id != column_id);
    }
}

impl<T: RowData> Table<T> {
    /// Effective pinning slice.
    pub fn column_pinning_state(&self) -> ColumnPinningState {
        let options = self.options();
        if let Some(controlled) = &options.state.column_pinning {
            return controlled.clone();
        }
        self.internal_state().column_pinning
    }

    /// Proposes a new pinning slice through the update protocol.
    pub fn set_column_pinning(&self, updater: Updater<ColumnPinningState>) {
        let options = self.options();
        let new = updater.resolve(self.column_pinning_state());
        if let Some(on_change) = &options.on_column_pinning_change {
            on_change(&new);
        }
        if options.state.column_pinning.is_none() {
            self.write_internal_state(|state| state.column_pinning = new);
        }
    }

    /// Returns `true` when the column may be pinned.
    pub fn can_pin_column(&self, column: &Column<T>) -> bool {
        column.def().enable_pinning && self.options().enable_pinning
    }

    /// Pins a column to an edge, or unpins it with `None`.
    pub fn pin_column(&self, column_id: &str, position: Option<Pinned>) {
        let columns = self.column_model();
        match columns.column(column_id) {
            Some(column) if self.can_pin_column(column) => {}
            _ => return,
        }
        let id = column_id.to_string();
        self.set_column_pinning(Updater::apply(move |mut state: ColumnPinningState| {
            state.unpin(&id);
            match position {
                Some(Pinned::Left) => state.left.push(id),
                Some(Pinned::Right) => state.right.push(id),
                None => {}
            }
            state
        }));
    }

    /// The edge a column is currently pinned to, if any.
    pub fn column_pin_position(&self, column_id: &str) -> Option<Pinned> {
        let state = self.column_pinning_state();
        if state.left.iter().any(|id| id == column_id) {
            Some(Pinned::Left)
        } else if state.right.iter().any(|id| id == column_id) {
            Some(Pinned::Right)
        } else {
            None
        }
    }
}
