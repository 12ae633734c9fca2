//! Instance options: data, column definitions, controlled state, change
//! callbacks, function registries and feature switches.

use std::collections::HashMap;
use std::sync::Arc;

use crate::column::{ColumnDef, ColumnModel};
use crate::error::TableError;
use crate::features::expanding::ExpandedState;
use crate::features::filtering::{ColumnFiltersState, FilterFn, FilterPredicate, FilterValue};
use crate::features::grouping::{AggregationFn, AggregatorFn, GroupingState};
use crate::features::ordering::ColumnOrderState;
use crate::features::pagination::PaginationState;
use crate::features::pinning::ColumnPinningState;
use crate::features::selection::RowSelectionState;
use crate::features::sizing::{ColumnResizeInfo, ColumnSizingState};
use crate::features::sorting::{SortComparator, SortingFn, SortingState};
use crate::features::visibility::VisibilityState;
use crate::model::RowData;
use crate::state::{OnChangeFn, PartialTableState, TableState};

/// Derives a stable row id from a record, its index within its parent
/// sequence, and the parent row id.
pub type RowIdFn<T> = Arc<dyn Fn(&T, usize, Option<&str>) -> String + Send + Sync>;

/// Discovers a record's children for tree data.
pub type SubRowsFn<T> = Arc<dyn Fn(&T) -> Vec<T> + Send + Sync>;

/// The merged configuration of a table instance.
///
/// Replaced wholesale through
/// [`Table::set_options`](crate::table::Table::set_options); derived
/// computations always re-read the current snapshot, never a cached copy.
///
/// # Example
///
/// ```
/// use trestle::column::ColumnDef;
/// use trestle::model::CellValue;
/// use trestle::options::Options;
///
/// type Record = std::collections::HashMap<String, CellValue>;
///
/// let options: Options<Record> = Options::new(
///     Vec::new(),
///     vec![ColumnDef::accessor("name"), ColumnDef::accessor("age")],
/// )
/// .with_page_count(-1);
/// ```
#[derive(Clone)]
pub struct Options<T: RowData> {
    pub(crate) data: Arc<Vec<T>>,
    pub(crate) columns: Arc<Vec<ColumnDef<T>>>,
    pub(crate) state: PartialTableState,
    pub(crate) initial_state: TableState,
    pub(crate) get_row_id: Option<RowIdFn<T>>,
    pub(crate) get_sub_rows: Option<SubRowsFn<T>>,

    pub(crate) enable_hiding: bool,
    pub(crate) enable_pinning: bool,
    pub(crate) enable_column_filters: bool,
    pub(crate) enable_global_filter: bool,
    pub(crate) enable_sorting: bool,
    pub(crate) enable_multi_sort: bool,
    pub(crate) enable_grouping: bool,
    pub(crate) enable_expanding: bool,
    pub(crate) enable_pagination: bool,
    pub(crate) enable_row_selection: bool,
    pub(crate) enable_column_resizing: bool,

    pub(crate) filter_fns: HashMap<String, FilterPredicate>,
    pub(crate) sorting_fns: HashMap<String, SortComparator>,
    pub(crate) aggregation_fns: HashMap<String, AggregatorFn>,
    pub(crate) global_filter_fn: FilterFn,

    /// `-1` means engine-computed from the expanded row count; any other
    /// value is a host override for server-driven data.
    pub(crate) page_count: i64,

    pub(crate) on_column_visibility_change: Option<OnChangeFn<VisibilityState>>,
    pub(crate) on_column_order_change: Option<OnChangeFn<ColumnOrderState>>,
    pub(crate) on_column_pinning_change: Option<OnChangeFn<ColumnPinningState>>,
    pub(crate) on_column_filters_change: Option<OnChangeFn<ColumnFiltersState>>,
    pub(crate) on_global_filter_change: Option<OnChangeFn<Option<FilterValue>>>,
    pub(crate) on_sorting_change: Option<OnChangeFn<SortingState>>,
    pub(crate) on_grouping_change: Option<OnChangeFn<GroupingState>>,
    pub(crate) on_expanded_change: Option<OnChangeFn<ExpandedState>>,
    pub(crate) on_column_sizing_change: Option<OnChangeFn<ColumnSizingState>>,
    pub(crate) on_column_resize_info_change: Option<OnChangeFn<ColumnResizeInfo>>,
    pub(crate) on_pagination_change: Option<OnChangeFn<PaginationState>>,
    pub(crate) on_row_selection_change: Option<OnChangeFn<RowSelectionState>>,
}

impl<T: RowData> Options<T> {
    /// Creates options over the given records and column definitions, with
    /// every feature enabled and nothing controlled.
    pub fn new(data: Vec<T>, columns: Vec<ColumnDef<T>>) -> Self {
        Self {
            data: Arc::new(data),
            columns: Arc::new(columns),
            state: PartialTableState::default(),
            initial_state: TableState::default(),
            get_row_id: None,
            get_sub_rows: None,
            enable_hiding: true,
            enable_pinning: true,
            enable_column_filters: true,
            enable_global_filter: true,
            enable_sorting: true,
            enable_multi_sort: true,
            enable_grouping: true,
            enable_expanding: true,
            enable_pagination: true,
            enable_row_selection: true,
            enable_column_resizing: true,
            filter_fns: HashMap::new(),
            sorting_fns: HashMap::new(),
            aggregation_fns: HashMap::new(),
            global_filter_fn: FilterFn::IncludesString,
            page_count: -1,
            on_column_visibility_change: None,
            on_column_order_change: None,
            on_column_pinning_change: None,
            on_column_filters_change: None,
            on_global_filter_change: None,
            on_sorting_change: None,
            on_grouping_change: None,
            on_expanded_change: None,
            on_column_sizing_change: None,
            on_column_resize_info_change: None,
            on_pagination_change: None,
            on_row_selection_change: None,
        }
    }

    /// Replaces the raw records.
    pub fn with_data(mut self, data: Vec<T>) -> Self {
        self.data = Arc::new(data);
        self
    }

    /// Sets the controlled state slices.
    pub fn with_state(mut self, state: PartialTableState) -> Self {
        self.state = state;
        self
    }

    /// Seeds the self-managed state for uncontrolled slices.
    pub fn with_initial_state(mut self, state: TableState) -> Self {
        self.initial_state = state;
        self
    }

    /// Derives row ids from records instead of index paths.
    pub fn with_row_id(
        mut self,
        f: impl Fn(&T, usize, Option<&str>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.get_row_id = Some(Arc::new(f));
        self
    }

    /// Discovers sub-rows for tree data.
    pub fn with_sub_rows(mut self, f: impl Fn(&T) -> Vec<T> + Send + Sync + 'static) -> Self {
        self.get_sub_rows = Some(Arc::new(f));
        self
    }

    /// Enables or disables column hiding.
    pub fn enable_hiding(mut self, enabled: bool) -> Self {
        self.enable_hiding = enabled;
        self
    }

    /// Enables or disables column pinning.
    pub fn enable_pinning(mut self, enabled: bool) -> Self {
        self.enable_pinning = enabled;
        self
    }

    /// Enables or disables per-column filtering.
    pub fn enable_column_filters(mut self, enabled: bool) -> Self {
        self.enable_column_filters = enabled;
        self
    }

    /// Enables or disables the global filter.
    pub fn enable_global_filter(mut self, enabled: bool) -> Self {
        self.enable_global_filter = enabled;
        self
    }

    /// Enables or disables sorting.
    pub fn enable_sorting(mut self, enabled: bool) -> Self {
        self.enable_sorting = enabled;
        self
    }

    /// Enables or disables multi-column sorting.
    pub fn enable_multi_sort(mut self, enabled: bool) -> Self {
        self.enable_multi_sort = enabled;
        self
    }

    /// Enables or disables grouping.
    pub fn enable_grouping(mut self, enabled: bool) -> Self {
        self.enable_grouping = enabled;
        self
    }

    /// Enables or disables row expansion.
    pub fn enable_expanding(mut self, enabled: bool) -> Self {
        self.enable_expanding = enabled;
        self
    }

    /// Enables or disables pagination. When disabled the final row model
    /// is the expanded model.
    pub fn enable_pagination(mut self, enabled: bool) -> Self {
        self.enable_pagination = enabled;
        self
    }

    /// Enables or disables row selection.
    pub fn enable_row_selection(mut self, enabled: bool) -> Self {
        self.enable_row_selection = enabled;
        self
    }

    /// Enables or disables column resizing.
    pub fn enable_column_resizing(mut self, enabled: bool) -> Self {
        self.enable_column_resizing = enabled;
        self
    }

    /// Registers a named filter predicate for [`FilterFn::Named`].
    pub fn with_filter_fn(
        mut self,
        name: impl Into<String>,
        predicate: impl Fn(&crate::model::CellValue, &FilterValue) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.filter_fns.insert(name.into(), Arc::new(predicate));
        self
    }

    /// Registers a named comparator for [`SortingFn::Named`].
    pub fn with_sorting_fn(
        mut self,
        name: impl Into<String>,
        comparator: impl Fn(&crate::model::CellValue, &crate::model::CellValue) -> std::cmp::Ordering
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.sorting_fns.insert(name.into(), Arc::new(comparator));
        self
    }

    /// Registers a named aggregator for [`AggregationFn::Named`].
    pub fn with_aggregation_fn(
        mut self,
        name: impl Into<String>,
        aggregator: impl Fn(&[crate::model::CellValue]) -> crate::model::CellValue
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.aggregation_fns.insert(name.into(), Arc::new(aggregator));
        self
    }

    /// Sets the predicate the global filter applies per column.
    pub fn with_global_filter_fn(mut self, f: FilterFn) -> Self {
        self.global_filter_fn = f;
        self
    }

    /// Overrides the page count for server-paginated data. `-1` restores
    /// engine-computed pagination.
    pub fn with_page_count(mut self, page_count: i64) -> Self {
        self.page_count = page_count;
        self
    }

    /// Notifies on visibility changes.
    pub fn on_column_visibility_change(
        mut self,
        f: impl Fn(&VisibilityState) + Send + Sync + 'static,
    ) -> Self {
        self.on_column_visibility_change = Some(Arc::new(f));
        self
    }

    /// Notifies on column order changes.
    pub fn on_column_order_change(
        mut self,
        f: impl Fn(&ColumnOrderState) + Send + Sync + 'static,
    ) -> Self {
        self.on_column_order_change = Some(Arc::new(f));
        self
    }

    /// Notifies on pinning changes.
    pub fn on_column_pinning_change(
        mut self,
        f: impl Fn(&ColumnPinningState) + Send + Sync + 'static,
    ) -> Self {
        self.on_column_pinning_change = Some(Arc::new(f));
        self
    }

    /// Notifies on column filter changes.
    pub fn on_column_filters_change(
        mut self,
        f: impl Fn(&ColumnFiltersState) + Send + Sync + 'static,
    ) -> Self {
        self.on_column_filters_change = Some(Arc::new(f));
        self
    }

    /// Notifies on global filter changes.
    pub fn on_global_filter_change(
        mut self,
        f: impl Fn(&Option<FilterValue>) + Send + Sync + 'static,
    ) -> Self {
        self.on_global_filter_change = Some(Arc::new(f));
        self
    }

    /// Notifies on sorting changes.
    pub fn on_sorting_change(mut self, f: impl Fn(&SortingState) + Send + Sync + 'static) -> Self {
        self.on_sorting_change = Some(Arc::new(f));
        self
    }

    /// Notifies on grouping changes.
    pub fn on_grouping_change(
        mut self,
        f: impl Fn(&GroupingState) + Send + Sync + 'static,
    ) -> Self {
        self.on_grouping_change = Some(Arc::new(f));
        self
    }

    /// Notifies on expansion changes.
    pub fn on_expanded_change(
        mut self,
        f: impl Fn(&ExpandedState) + Send + Sync + 'static,
    ) -> Self {
        self.on_expanded_change = Some(Arc::new(f));
        self
    }

    /// Notifies on sizing changes.
    pub fn on_column_sizing_change(
        mut self,
        f: impl Fn(&ColumnSizingState) + Send + Sync + 'static,
    ) -> Self {
        self.on_column_sizing_change = Some(Arc::new(f));
        self
    }

    /// Notifies on resize-info changes.
    pub fn on_column_resize_info_change(
        mut self,
        f: impl Fn(&ColumnResizeInfo) + Send + Sync + 'static,
    ) -> Self {
        self.on_column_resize_info_change = Some(Arc::new(f));
        self
    }

    /// Notifies on pagination changes.
    pub fn on_pagination_change(
        mut self,
        f: impl Fn(&PaginationState) + Send + Sync + 'static,
    ) -> Self {
        self.on_pagination_change = Some(Arc::new(f));
        self
    }

    /// Notifies on selection changes.
    pub fn on_row_selection_change(
        mut self,
        f: impl Fn(&RowSelectionState) + Send + Sync + 'static,
    ) -> Self {
        self.on_row_selection_change = Some(Arc::new(f));
        self
    }

    /// The current raw records.
    pub fn data(&self) -> &Arc<Vec<T>> {
        &self.data
    }

    /// Validates this configuration against a resolved column model.
    ///
    /// Checks the page-count override sentinel and that every named
    /// sorting/filter/aggregation function a column references exists in
    /// its registry.
    pub(crate) fn validate(&self, columns: &ColumnModel<T>) -> Result<(), TableError> {
        if self.page_count < -1 {
            return Err(TableError::InvalidPageCount(self.page_count));
        }
        for column in &columns.flat_columns {
            let def = column.def();
            if let SortingFn::Named(name) = &def.sorting_fn {
                if !self.sorting_fns.contains_key(name) {
                    return Err(TableError::unknown_sorting_fn(name, column.id()));
                }
            }
            if let FilterFn::Named(name) = &def.filter_fn {
                if !self.filter_fns.contains_key(name) {
                    return Err(TableError::unknown_filter_fn(name, column.id()));
                }
            }
            if let Some(AggregationFn::Named(name)) = &def.aggregation_fn {
                if !self.aggregation_fns.contains_key(name) {
                    return Err(TableError::unknown_aggregation_fn(name, column.id()));
                }
            }
        }
        if let FilterFn::Named(name) = &self.global_filter_fn {
            if !self.filter_fns.contains_key(name) {
                return Err(TableError::unknown_filter_fn(name, "<global>"));
            }
        }
        Ok(())
    }
}
