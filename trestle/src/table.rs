//! The table instance: option snapshot, fallback state and stage caches.

use std::sync::Arc;
use std::sync::RwLock;

use log::debug;

use crate::column::{Column, ColumnModel};
use crate::error::TableError;
use crate::features::expanding::ExpandedState;
use crate::features::filtering::{ColumnFiltersState, FilterValue};
use crate::features::grouping::GroupingState;
use crate::features::ordering::{self, ColumnOrderState};
use crate::features::pagination::PaginationState;
use crate::features::pinning::ColumnPinningState;
use crate::features::selection::RowSelectionState;
use crate::features::sorting::SortingState;
use crate::features::visibility::VisibilityState;
use crate::header::{HeaderModel, build_header_groups};
use crate::memo::Memo;
use crate::model::{CellValue, Row, RowData, RowModel};
use crate::options::Options;
use crate::state::TableState;

/// The visible leaf columns, ordered and split into pin regions.
pub struct VisibleLeafColumns<T: RowData> {
    /// Leaves pinned left, in pin order.
    pub left: Vec<Arc<Column<T>>>,
    /// Unpinned leaves, in display order.
    pub center: Vec<Arc<Column<T>>>,
    /// Leaves pinned right, in pin order.
    pub right: Vec<Arc<Column<T>>>,
}

impl<T: RowData> VisibleLeafColumns<T> {
    /// Every visible leaf: left, then center, then right.
    pub fn all(&self) -> Vec<Arc<Column<T>>> {
        self.left
            .iter()
            .chain(&self.center)
            .chain(&self.right)
            .cloned()
            .collect()
    }
}

/// One renderable cell: a visible leaf column paired with a row's accessed
/// value.
pub struct Cell<T: RowData> {
    /// The cell's column.
    pub column: Arc<Column<T>>,
    /// The owning row's id.
    pub row_id: String,
    /// The accessed (or aggregated) value.
    pub value: CellValue,
}

impl<T: RowData> Cell<T> {
    /// Unique cell id.
    pub fn id(&self) -> String {
        format!("{}_{}", self.row_id, self.column.id())
    }

    /// Display text: the column's formatter applied to the value, or the
    /// value's plain rendering.
    pub fn render(&self) -> String {
        match &self.column.def().formatter {
            Some(formatter) => formatter(&self.value),
            None => self.value.to_string(),
        }
    }
}

type LeafDeps = (usize, VisibilityState, ColumnOrderState, ColumnPinningState);

pub(crate) struct Caches<T: RowData> {
    pub(crate) leaf_model: Memo<LeafDeps, Arc<VisibleLeafColumns<T>>>,
    pub(crate) header_model: Memo<usize, Arc<HeaderModel<T>>>,
    pub(crate) core: Memo<(usize, usize, usize, usize), Arc<RowModel<T>>>,
    pub(crate) column_filtered: Memo<(usize, ColumnFiltersState, bool), Arc<RowModel<T>>>,
    pub(crate) filtered: Memo<(usize, Option<FilterValue>, bool), Arc<RowModel<T>>>,
    pub(crate) grouped: Memo<(usize, GroupingState, bool), Arc<RowModel<T>>>,
    pub(crate) sorted: Memo<(usize, SortingState, bool), Arc<RowModel<T>>>,
    pub(crate) expanded: Memo<(usize, ExpandedState, bool), Arc<RowModel<T>>>,
    pub(crate) paginated: Memo<(usize, PaginationState, i64, bool), Arc<RowModel<T>>>,
    pub(crate) selected: Memo<(usize, RowSelectionState), Arc<RowModel<T>>>,
}

impl<T: RowData> Caches<T> {
    fn new() -> Self {
        Self {
            leaf_model: Memo::new("visible leaf columns"),
            header_model: Memo::new("header groups"),
            core: Memo::new("core row model"),
            column_filtered: Memo::new("column filtered row model"),
            filtered: Memo::new("filtered row model"),
            grouped: Memo::new("grouped row model"),
            sorted: Memo::new("sorted row model"),
            expanded: Memo::new("expanded row model"),
            paginated: Memo::new("paginated row model"),
            selected: Memo::new("selected row model"),
        }
    }
}

/// A table instance.
///
/// Holds the current option snapshot, the self-managed fallback state for
/// uncontrolled slices, the resolved column tree, and one memoized cache
/// per derived computation. Everything it exposes is pull-based: setters
/// only publish state, and the next query performs (at most) the affected
/// recomputation.
///
/// # Example
///
/// ```
/// use trestle::column::ColumnDef;
/// use trestle::model::CellValue;
/// use trestle::options::Options;
/// use trestle::table::Table;
///
/// let data = vec![
///     serde_json::json!({ "name": "Ada", "age": 36 }),
///     serde_json::json!({ "name": "Grace", "age": 45 }),
/// ];
/// let table = Table::new(Options::new(
///     data,
///     vec![ColumnDef::accessor("name"), ColumnDef::accessor("age")],
/// ))
/// .unwrap();
///
/// assert_eq!(table.row_model().rows.len(), 2);
/// ```
pub struct Table<T: RowData> {
    pub(crate) options: RwLock<Arc<Options<T>>>,
    pub(crate) state: RwLock<TableState>,
    pub(crate) columns: RwLock<Arc<ColumnModel<T>>>,
    pub(crate) caches: Caches<T>,
}

impl<T: RowData> Table<T> {
    /// Builds an instance, resolving the column tree and validating the
    /// configuration.
    pub fn new(options: Options<T>) -> Result<Self, TableError> {
        let columns = Arc::new(ColumnModel::build(&options.columns)?);
        options.validate(&columns)?;
        let state = options.initial_state.clone();
        Ok(Self {
            options: RwLock::new(Arc::new(options)),
            state: RwLock::new(state),
            columns: RwLock::new(columns),
            caches: Caches::new(),
        })
    }

    /// Replaces the option snapshot.
    ///
    /// The host calls this on every external change (new data, new
    /// callbacks, new controlled state) so queries always run against the
    /// latest snapshot. The column tree is only rebuilt when the
    /// definitions themselves changed.
    pub fn set_options(&self, options: Options<T>) -> Result<(), TableError> {
        let current = self.options();
        let columns = if Arc::ptr_eq(&current.columns, &options.columns) {
            self.column_model()
        } else {
            Arc::new(ColumnModel::build(&options.columns)?)
        };
        options.validate(&columns)?;
        debug!("options snapshot replaced");
        {
            let mut slot = self.columns.write().unwrap_or_else(|p| p.into_inner());
            *slot = columns;
        }
        let mut slot = self.options.write().unwrap_or_else(|p| p.into_inner());
        *slot = Arc::new(options);
        Ok(())
    }

    /// Replaces the raw records, keeping every other option.
    pub fn set_data(&self, data: Vec<T>) {
        let mut options = (*self.options()).clone();
        options.data = Arc::new(data);
        let mut slot = self.options.write().unwrap_or_else(|p| p.into_inner());
        *slot = Arc::new(options);
    }

    /// The current option snapshot.
    pub fn options(&self) -> Arc<Options<T>> {
        self.options
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// The resolved column tree.
    pub fn column_model(&self) -> Arc<ColumnModel<T>> {
        self.columns
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// The effective state snapshot: the self-managed fallback overlaid
    /// with every host-controlled slice.
    pub fn state(&self) -> TableState {
        let mut state = self.internal_state();
        self.options().state.overlay_into(&mut state);
        state
    }

    pub(crate) fn internal_state(&self) -> TableState {
        self.state
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub(crate) fn write_internal_state(&self, f: impl FnOnce(&mut TableState)) {
        let mut guard = self.state.write().unwrap_or_else(|p| p.into_inner());
        f(&mut guard);
    }

    /// The visible leaf columns, ordered and pin-split.
    pub fn leaf_model(&self) -> Arc<VisibleLeafColumns<T>> {
        let columns = self.column_model();
        let deps = (
            Arc::as_ptr(&columns) as usize,
            self.column_visibility_state(),
            self.column_order_state(),
            self.column_pinning_state(),
        );
        self.caches.leaf_model.get(deps, |(_, visibility, order, pinning)| {
            let visible: Vec<_> = columns
                .leaf_columns
                .iter()
                .filter(|leaf| {
                    if !self.can_hide_column(leaf) {
                        return true;
                    }
                    visibility.get(leaf.id()).copied().unwrap_or(true)
                })
                .cloned()
                .collect();
            let mut center = ordering::order_columns(visible, order);
            let mut left = Vec::new();
            for id in &pinning.left {
                if let Some(pos) = center.iter().position(|c| c.id() == id) {
                    left.push(center.remove(pos));
                }
            }
            let mut right = Vec::new();
            for id in &pinning.right {
                if let Some(pos) = center.iter().position(|c| c.id() == id) {
                    right.push(center.remove(pos));
                }
            }
            Arc::new(VisibleLeafColumns {
                left,
                center,
                right,
            })
        })
    }

    /// The header rows for the current column state: combined plus the
    /// three pin regions, sharing one logical tree shape.
    pub fn header_model(&self) -> Arc<HeaderModel<T>> {
        let columns = self.column_model();
        let leaves = self.leaf_model();
        let deps = Arc::as_ptr(&leaves) as usize;
        self.caches.header_model.get(deps, |_| {
            Arc::new(HeaderModel {
                header_groups: build_header_groups("", &leaves.all(), &columns),
                left: build_header_groups("left_", &leaves.left, &columns),
                center: build_header_groups("center_", &leaves.center, &columns),
                right: build_header_groups("right_", &leaves.right, &columns),
            })
        })
    }

    /// One cell per visible leaf column for a row, in display order.
    pub fn visible_cells(&self, row: &Row<T>) -> Vec<Cell<T>> {
        let columns = self.column_model();
        self.visible_leaf_columns()
            .into_iter()
            .map(|column| Cell {
                row_id: row.id().to_string(),
                value: row.value(column.id(), &columns),
                column,
            })
            .collect()
    }

    /// The final row model: every pipeline stage applied.
    pub fn row_model(&self) -> Arc<RowModel<T>> {
        self.paginated_row_model()
    }
}
