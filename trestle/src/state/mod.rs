//! Table state: every feature's slice merged into one snapshot, plus the
//! controlled/uncontrolled update protocol types.

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::features::expanding::ExpandedState;
use crate::features::filtering::{ColumnFiltersState, FilterValue};
use crate::features::grouping::GroupingState;
use crate::features::ordering::ColumnOrderState;
use crate::features::pagination::PaginationState;
use crate::features::pinning::ColumnPinningState;
use crate::features::selection::RowSelectionState;
use crate::features::sizing::{ColumnResizeInfo, ColumnSizingState};
use crate::features::sorting::SortingState;
use crate::features::visibility::VisibilityState;

/// A proposed slice value: either a replacement or a function of the
/// current effective value.
///
/// Every feature setter accepts one of these, mirroring how hosts update
/// state they control: the engine resolves the updater against the current
/// effective value and emits the result, whether or not the slice is
/// host-controlled.
pub enum Updater<T> {
    /// Replace the slice with this value.
    Set(T),
    /// Derive the new value from the current one.
    Apply(Box<dyn FnOnce(T) -> T + Send>),
}

impl<T> Updater<T> {
    /// Proposes a replacement value.
    pub fn set(value: T) -> Self {
        Updater::Set(value)
    }

    /// Proposes a derivation from the current value.
    pub fn apply(f: impl FnOnce(T) -> T + Send + 'static) -> Self {
        Updater::Apply(Box::new(f))
    }

    /// Resolves the proposal against the current effective value.
    pub fn resolve(self, current: T) -> T {
        match self {
            Updater::Set(value) => value,
            Updater::Apply(f) => f(current),
        }
    }
}

/// A per-slice change callback supplied by the host.
pub type OnChangeFn<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// The union of every feature's state slice.
///
/// Treated as an immutable snapshot: setters replace whole slices, never
/// mutate them in place, so a host can hold onto a snapshot safely.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableState {
    /// Column visibility by id.
    pub column_visibility: VisibilityState,
    /// Explicit column order.
    pub column_order: ColumnOrderState,
    /// Pinned columns per edge.
    pub column_pinning: ColumnPinningState,
    /// Active per-column filters.
    pub column_filters: ColumnFiltersState,
    /// The global filter value, if active.
    pub global_filter: Option<FilterValue>,
    /// The sort chain.
    pub sorting: SortingState,
    /// Grouped column ids, outermost first.
    pub grouping: GroupingState,
    /// Expanded rows.
    pub expanded: ExpandedState,
    /// Explicit column sizes.
    pub column_sizing: ColumnSizingState,
    /// In-progress resize bookkeeping.
    pub column_resize_info: ColumnResizeInfo,
    /// The page window.
    pub pagination: PaginationState,
    /// Selected row ids.
    pub row_selection: RowSelectionState,
}

/// The host-controlled subset of [`TableState`].
///
/// A present slice makes that slice controlled: the engine reads it as the
/// effective value and never writes its own copy. Absent slices are
/// self-managed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartialTableState {
    /// Controlled visibility slice.
    pub column_visibility: Option<VisibilityState>,
    /// Controlled column order slice.
    pub column_order: Option<ColumnOrderState>,
    /// Controlled pinning slice.
    pub column_pinning: Option<ColumnPinningState>,
    /// Controlled column filters slice.
    pub column_filters: Option<ColumnFiltersState>,
    /// Controlled global filter slice.
    pub global_filter: Option<Option<FilterValue>>,
    /// Controlled sorting slice.
    pub sorting: Option<SortingState>,
    /// Controlled grouping slice.
    pub grouping: Option<GroupingState>,
    /// Controlled expansion slice.
    pub expanded: Option<ExpandedState>,
    /// Controlled sizing slice.
    pub column_sizing: Option<ColumnSizingState>,
    /// Controlled resize-info slice.
    pub column_resize_info: Option<ColumnResizeInfo>,
    /// Controlled pagination slice.
    pub pagination: Option<PaginationState>,
    /// Controlled selection slice.
    pub row_selection: Option<RowSelectionState>,
}

impl PartialTableState {
    /// Overlays every present slice onto a base snapshot.
    pub fn overlay_into(&self, state: &mut TableState) {
        if let Some(v) = &self.column_visibility {
            state.column_visibility = v.clone();
        }
        if let Some(v) = &self.column_order {
            state.column_order = v.clone();
        }
        if let Some(v) = &self.column_pinning {
            state.column_pinning = v.clone();
        }
        if let Some(v) = &self.column_filters {
            state.column_filters = v.clone();
        }
        if let Some(v) = &self.global_filter {
            state.global_filter = v.clone();
        }
        if let Some(v) = &self.sorting {
            state.sorting = v.clone();
        }
        if let Some(v) = &self.grouping {
            state.grouping = v.clone();
        }
        if let Some(v) = &self.expanded {
            state.expanded = v.clone();
        }
        if let Some(v) = &self.column_sizing {
            state.column_sizing = v.clone();
        }
        if let Some(v) = &self.column_resize_info {
            state.column_resize_info = v.clone();
        }
        if let Some(v) = &self.pagination {
            state.pagination = *v;
        }
        if let Some(v) = &self.row_selection {
            state.row_selection = v.clone();
        }
    }
}
