//! Error types

/// Errors raised while resolving column definitions or validating options.
///
/// Everything here is a configuration mistake on the host's side, detected
/// at construction or [`set_options`](crate::table::Table::set_options)
/// time. State inconsistencies that can legitimately lag a data change
/// (stale selection ids, out-of-range page indexes) are never errors; they
/// are clamped or ignored by the affected getter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// Two columns in the definition tree resolved to the same id.
    #[error("duplicate column id: {0}")]
    DuplicateColumnId(String),

    /// A data column has neither a usable field key nor an accessor function.
    #[error("column {0} has no usable accessor")]
    InvalidAccessor(String),

    /// A column referenced a sorting function name missing from the registry.
    #[error("unknown sorting function {name} on column {column}")]
    UnknownSortingFn {
        /// The missing registry name.
        name: String,
        /// The column that referenced it.
        column: String,
    },

    /// A column referenced a filter function name missing from the registry.
    #[error("unknown filter function {name} on column {column}")]
    UnknownFilterFn {
        /// The missing registry name.
        name: String,
        /// The column that referenced it.
        column: String,
    },

    /// A column referenced an aggregation function name missing from the registry.
    #[error("unknown aggregation function {name} on column {column}")]
    UnknownAggregationFn {
        /// The missing registry name.
        name: String,
        /// The column that referenced it.
        column: String,
    },

    /// A page-count override other than the `-1` auto-compute sentinel
    /// was negative.
    #[error("invalid page count override: {0} (only -1 means engine-computed)")]
    InvalidPageCount(i64),
}

impl TableError {
    /// Creates an unknown-sorting-function error.
    pub fn unknown_sorting_fn(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownSortingFn {
            name: name.into(),
            column: column.into(),
        }
    }

    /// Creates an unknown-filter-function error.
    pub fn unknown_filter_fn(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownFilterFn {
            name: name.into(),
            column: column.into(),
        }
    }

    /// Creates an unknown-aggregation-function error.
    pub fn unknown_aggregation_fn(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownAggregationFn {
            name: name.into(),
            column: column.into(),
        }
    }
}
