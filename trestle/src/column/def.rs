//! Column definitions and the column construction API.

use std::sync::Arc;

use crate::features::filtering::FilterFn;
use crate::features::grouping::AggregationFn;
use crate::features::sorting::SortingFn;
use crate::model::CellValue;
use crate::model::RowData;

/// Function accessor: record plus its index within the raw data.
pub type AccessorFn<T> = Arc<dyn Fn(&T, usize) -> CellValue + Send + Sync>;

/// Optional cell formatter turning an accessed value into display text.
///
/// Anything richer than text (framework nodes, widgets) belongs to the
/// host's rendering adapter, which consumes the raw value itself.
pub type CellFormatter = Arc<dyn Fn(&CellValue) -> String + Send + Sync>;

/// How a data column reads its value out of a record.
#[derive(Clone)]
pub enum Accessor<T: RowData> {
    /// Read the named field through [`RowData::field`].
    Key(String),
    /// Compute the value with a function.
    Fn(AccessorFn<T>),
}

/// What kind of column a definition declares.
#[derive(Clone)]
pub enum ColumnKind<T: RowData> {
    /// A data column with an accessor.
    Accessor(Accessor<T>),
    /// A group column nesting other columns, used purely for headers.
    Group {
        /// Ordered child definitions.
        columns: Vec<ColumnDef<T>>,
    },
    /// A renderer-only column with no accessor (checkboxes, actions).
    Display,
}

/// A declarative column description.
///
/// Definitions are built through the constructors below and refined with
/// consuming builder methods, then resolved into a
/// [`Column`](crate::column::Column) tree at table construction.
///
/// # Example
///
/// ```
/// use trestle::column::ColumnDef;
/// use trestle::model::CellValue;
///
/// type Record = std::collections::HashMap<String, CellValue>;
///
/// let columns: Vec<ColumnDef<Record>> = vec![
///     ColumnDef::group("Name", vec![
///         ColumnDef::accessor("first_name"),
///         ColumnDef::accessor("last_name").header("Last Name"),
///     ]),
///     ColumnDef::accessor("age").sort_descending_first(true),
/// ];
/// ```
#[derive(Clone)]
pub struct ColumnDef<T: RowData> {
    pub(crate) id: String,
    pub(crate) kind: ColumnKind<T>,
    pub(crate) header: Option<String>,
    pub(crate) footer: Option<String>,
    pub(crate) formatter: Option<CellFormatter>,
    pub(crate) enable_sorting: bool,
    pub(crate) enable_column_filter: bool,
    pub(crate) enable_global_filter: bool,
    pub(crate) enable_hiding: bool,
    pub(crate) enable_grouping: bool,
    pub(crate) enable_pinning: bool,
    pub(crate) enable_resizing: bool,
    pub(crate) sort_descending_first: bool,
    pub(crate) invert_sorting: bool,
    pub(crate) sorting_fn: SortingFn,
    pub(crate) filter_fn: FilterFn,
    pub(crate) aggregation_fn: Option<AggregationFn>,
    pub(crate) size: Option<f32>,
    pub(crate) min_size: f32,
    pub(crate) max_size: f32,
}

impl<T: RowData> ColumnDef<T> {
    fn base(id: String, kind: ColumnKind<T>) -> Self {
        Self {
            id,
            kind,
            header: None,
            footer: None,
            formatter: None,
            enable_sorting: true,
            enable_column_filter: true,
            enable_global_filter: true,
            enable_hiding: true,
            enable_grouping: true,
            enable_pinning: true,
            enable_resizing: true,
            sort_descending_first: false,
            invert_sorting: false,
            sorting_fn: SortingFn::Basic,
            filter_fn: FilterFn::Auto,
            aggregation_fn: None,
            size: None,
            min_size: 20.0,
            max_size: f32::MAX,
        }
    }

    /// Declares a data column reading the named record field.
    ///
    /// The field key doubles as the column id unless overridden with
    /// [`id`](ColumnDef::id).
    pub fn accessor(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::base(key.clone(), ColumnKind::Accessor(Accessor::Key(key)))
    }

    /// Declares a data column computing its value with a function.
    ///
    /// Function accessors have no field name to derive an id from, so one
    /// must be supplied explicitly.
    pub fn accessor_fn(
        id: impl Into<String>,
        accessor: impl Fn(&T, usize) -> CellValue + Send + Sync + 'static,
    ) -> Self {
        Self::base(
            id.into(),
            ColumnKind::Accessor(Accessor::Fn(Arc::new(accessor))),
        )
    }

    /// Declares a group column nesting the given children under one header.
    ///
    /// The header text doubles as the group id unless overridden with
    /// [`id`](ColumnDef::id).
    pub fn group(header: impl Into<String>, columns: Vec<ColumnDef<T>>) -> Self {
        let header = header.into();
        let mut def = Self::base(header.clone(), ColumnKind::Group { columns });
        def.header = Some(header);
        def
    }

    /// Declares a display column: no accessor, renderer-only.
    pub fn display(id: impl Into<String>) -> Self {
        Self::base(id.into(), ColumnKind::Display)
    }

    /// Overrides the column id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the header text.
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Sets the footer text.
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Sets a formatter used by [`Cell::render`](crate::table::Cell::render).
    pub fn formatter(mut self, f: impl Fn(&CellValue) -> String + Send + Sync + 'static) -> Self {
        self.formatter = Some(Arc::new(f));
        self
    }

    /// Enables or disables sorting for this column.
    pub fn enable_sorting(mut self, enabled: bool) -> Self {
        self.enable_sorting = enabled;
        self
    }

    /// Enables or disables per-column filtering for this column.
    pub fn enable_column_filter(mut self, enabled: bool) -> Self {
        self.enable_column_filter = enabled;
        self
    }

    /// Enables or disables participation in the global filter.
    pub fn enable_global_filter(mut self, enabled: bool) -> Self {
        self.enable_global_filter = enabled;
        self
    }

    /// Enables or disables hiding for this column.
    pub fn enable_hiding(mut self, enabled: bool) -> Self {
        self.enable_hiding = enabled;
        self
    }

    /// Enables or disables grouping by this column.
    pub fn enable_grouping(mut self, enabled: bool) -> Self {
        self.enable_grouping = enabled;
        self
    }

    /// Enables or disables pinning for this column.
    pub fn enable_pinning(mut self, enabled: bool) -> Self {
        self.enable_pinning = enabled;
        self
    }

    /// Enables or disables resizing for this column.
    pub fn enable_resizing(mut self, enabled: bool) -> Self {
        self.enable_resizing = enabled;
        self
    }

    /// First toggle on an unsorted column sorts descending.
    pub fn sort_descending_first(mut self, desc_first: bool) -> Self {
        self.sort_descending_first = desc_first;
        self
    }

    /// Inverts the comparator result for this column (inverted scales).
    pub fn invert_sorting(mut self, invert: bool) -> Self {
        self.invert_sorting = invert;
        self
    }

    /// Sets the sorting function.
    pub fn sorting_fn(mut self, f: SortingFn) -> Self {
        self.sorting_fn = f;
        self
    }

    /// Sets the column filter function.
    pub fn filter_fn(mut self, f: FilterFn) -> Self {
        self.filter_fn = f;
        self
    }

    /// Sets the aggregation used for this column on grouped rows.
    pub fn aggregation_fn(mut self, f: AggregationFn) -> Self {
        self.aggregation_fn = Some(f);
        self
    }

    /// Sets the preferred size.
    pub fn size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the minimum size.
    pub fn min_size(mut self, min: f32) -> Self {
        self.min_size = min;
        self
    }

    /// Sets the maximum size.
    pub fn max_size(mut self, max: f32) -> Self {
        self.max_size = max;
        self
    }

    /// The resolved id of this definition.
    pub fn def_id(&self) -> &str {
        &self.id
    }

    /// Header text, if any.
    pub fn header_text(&self) -> Option<&str> {
        self.header.as_deref()
    }

    /// Footer text, if any.
    pub fn footer_text(&self) -> Option<&str> {
        self.footer.as_deref()
    }

    /// Returns `true` if this definition declares a group column.
    pub fn is_group(&self) -> bool {
        matches!(self.kind, ColumnKind::Group { .. })
    }
}
