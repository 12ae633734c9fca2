//! Column sizing and interactive resizing.

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::column::Column;
use crate::model::RowData;
use crate::state::Updater;
use crate::table::Table;

/// Explicit sizes by column id. Columns without an entry use their
/// definition's size, or the default.
pub type ColumnSizingState = HashMap<String, f32>;

/// Size assigned to columns that configure nothing.
pub const DEFAULT_COLUMN_SIZE: f32 = 150.0;

/// Bookkeeping for an in-progress drag resize.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnResizeInfo {
    /// The column being resized, when a drag is active.
    pub is_resizing_column: Option<String>,
    /// The column's size when the drag started.
    pub start_size: f32,
    /// Pointer movement since the drag started.
    pub delta_offset: f32,
}

impl<T: RowData> Table<T> {
    /// Effective sizing slice.
    pub fn column_sizing_state(&self) -> ColumnSizingState {
        let options = self.options();
        if let Some(controlled) = &options.state.column_sizing {
            return controlled.clone();
        }
        self.internal_state().column_sizing
    }

    /// Proposes a new sizing slice through the update protocol.
    pub fn set_column_sizing(&self, updater: Updater<ColumnSizingState>) {
        let options = self.options();
        let new = updater.resolve(self.column_sizing_state());
        if let Some(on_change) = &options.on_column_sizing_change {
            on_change(&new);
        }
        if options.state.column_sizing.is_none() {
            self.write_internal_state(|state| state.column_sizing = new);
        }
    }

    /// Effective resize-in-progress slice.
    pub fn column_resize_info(&self) -> ColumnResizeInfo {
        let options = self.options();
        if let Some(controlled) = &options.state.column_resize_info {
            return controlled.clone();
        }
        self.internal_state().column_resize_info
    }

    /// Proposes new resize-in-progress bookkeeping.
    pub fn set_column_resize_info(&self, updater: Updater<ColumnResizeInfo>) {
        let options = self.options();
        let new = updater.resolve(self.column_resize_info());
        if let Some(on_change) = &options.on_column_resize_info_change {
            on_change(&new);
        }
        if options.state.column_resize_info.is_none() {
            self.write_internal_state(|state| state.column_resize_info = new);
        }
    }

    /// Returns `true` when the column can be resized.
    pub fn can_resize_column(&self, column: &Column<T>) -> bool {
        column.def().enable_resizing && self.options().enable_column_resizing
    }

    /// Current size of a column: the state entry, the definition's size,
    /// or the default, clamped into the definition's min/max bounds.
    pub fn column_size(&self, column_id: &str) -> f32 {
        let columns = self.column_model();
        let Some(column) = columns.column(column_id) else {
            return DEFAULT_COLUMN_SIZE;
        };
        let def = column.def();
        let size = self
            .column_sizing_state()
            .get(column_id)
            .copied()
            .or(def.size)
            .unwrap_or(DEFAULT_COLUMN_SIZE);
        size.clamp(def.min_size, def.max_size)
    }

    /// Sets one column's size (clamped into its bounds).
    pub fn set_column_size(&self, column_id: &str, size: f32) {
        let columns = self.column_model();
        let Some(column) = columns.column(column_id) else {
            return;
        };
        if !self.can_resize_column(column) {
            return;
        }
        let clamped = size.clamp(column.def().min_size, column.def().max_size);
        let id = column_id.to_string();
        self.set_column_sizing(Updater::apply(move |mut sizing: ColumnSizingState| {
            sizing.insert(id, clamped);
            sizing
        }));
    }

    /// Drops every explicit size, restoring definition sizes.
    pub fn reset_column_sizing(&self) {
        self.set_column_sizing(Updater::set(ColumnSizingState::new()));
    }

    /// Starts a drag resize on a column.
    pub fn begin_column_resize(&self, column_id: &str) {
        let columns = self.column_model();
        let Some(column) = columns.column(column_id) else {
            return;
        };
        if !self.can_resize_column(column) {
            return;
        }
        let info = ColumnResizeInfo {
            is_resizing_column: Some(column_id.to_string()),
            start_size: self.column_size(column_id),
            delta_offset: 0.0,
        };
        self.set_column_resize_info(Updater::set(info));
    }

    /// Applies pointer movement to the active drag, updating the live size.
    pub fn update_column_resize(&self, delta_offset: f32) {
        let info = self.column_resize_info();
        let Some(column_id) = info.is_resizing_column.clone() else {
            return;
        };
        self.set_column_resize_info(Updater::apply(move |mut info: ColumnResizeInfo| {
            info.delta_offset = delta_offset;
            info
        }));
        self.set_column_size(&column_id, info.start_size + delta_offset);
    }

    /// Ends the active drag.
    pub fn end_column_resize(&self) {
        self.set_column_resize_info(Updater::set(ColumnResizeInfo::default()));
    }

    /// Total size of the visible leaf columns.
    pub fn total_size(&self) -> f32 {
        self.visible_leaf_columns()
            .iter()
            .map(|column| self.column_size(column.id()))
            .sum()
    }
}
