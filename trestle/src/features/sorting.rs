//! Sorting state and comparators.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::column::Column;
use crate::model::CellValue;
use crate::model::RowData;
use crate::state::Updater;
use crate::table::Table;

/// One sort entry: a column and a direction.
///
/// Multiple entries chain for secondary, tertiary, etc. sorting.
///
/// # Example
///
/// ```
/// use trestle::features::sorting::ColumnSort;
///
/// let sorting = vec![ColumnSort::desc("revenue"), ColumnSort::asc("name")];
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSort {
    /// The sorted column.
    pub id: String,
    /// `true` for descending.
    pub desc: bool,
}

impl ColumnSort {
    /// Creates an ascending entry.
    pub fn asc(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desc: false,
        }
    }

    /// Creates a descending entry.
    pub fn desc(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desc: true,
        }
    }
}

/// The ordered sort entries.
pub type SortingState = Vec<ColumnSort>;

/// A custom comparator over two accessed values.
pub type SortComparator = Arc<dyn Fn(&CellValue, &CellValue) -> Ordering + Send + Sync>;

/// How a column compares two accessed values.
///
/// Direction and null placement are applied by the sorting stage around
/// the comparator, so comparators only ever order concrete values
/// ascending.
#[derive(Clone)]
pub enum SortingFn {
    /// [`CellValue::compare`]: natural per-type ordering with numeric
    /// coercion.
    Basic,
    /// Natural sort over rendered text: digit runs compare numerically,
    /// the rest case-insensitively, so "item9" sorts before "item10".
    Alphanumeric,
    /// Case-sensitive comparison of the rendered text.
    Text,
    /// Chronological comparison; falls back to [`CellValue::compare`] for
    /// non-datetime values.
    Datetime,
    /// A comparator registered by name in the options.
    Named(String),
    /// An inline comparator.
    Custom(SortComparator),
}

impl SortingFn {
    /// Compares two accessed values ascending.
    pub fn compare(
        &self,
        a: &CellValue,
        b: &CellValue,
        registry: &HashMap<String, SortComparator>,
    ) -> Ordering {
        match self {
            SortingFn::Basic => a.compare(b),
            SortingFn::Alphanumeric => alphanumeric_compare(&a.to_string(), &b.to_string()),
            SortingFn::Text => a.to_string().cmp(&b.to_string()),
            SortingFn::Datetime => match (a, b) {
                (CellValue::DateTime(a), CellValue::DateTime(b)) => a.cmp(b),
                _ => a.compare(b),
            },
            // Registry membership is validated when options are applied.
            SortingFn::Named(name) => registry
                .get(name)
                .map(|comparator| comparator(a, b))
                .unwrap_or_else(|| a.compare(b)),
            SortingFn::Custom(comparator) => comparator(a, b),
        }
    }
}

/// Natural ("alphanumeric") string comparison: consecutive digit runs are
/// compared as numbers, everything else case-insensitively.
fn alphanumeric_compare(a: &str, b: &str) -> Ordering {
    let a_chunks = split_chunks(a);
    let b_chunks = split_chunks(b);
    for (a_chunk, b_chunk) in a_chunks.iter().zip(&b_chunks) {
        let ord = match (a_chunk.parse::<u128>(), b_chunk.parse::<u128>()) {
            (Ok(a_num), Ok(b_num)) => a_num.cmp(&b_num),
            _ => a_chunk.to_lowercase().cmp(&b_chunk.to_lowercase()),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a_chunks.len().cmp(&b_chunks.len())
}

fn split_chunks(s: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut numeric = None;
    for (i, c) in s.char_indices() {
        let is_digit = c.is_ascii_digit();
        if numeric != Some(is_digit) {
            if i > start {
                chunks.push(&s[start..i]);
            }
            start = i;
            numeric = Some(is_digit);
        }
    }
    if start < s.len() {
        chunks.push(&s[start..]);
    }
    chunks
}

impl<T: RowData> Table<T> {
    /// Effective sorting slice.
    pub fn sorting_state(&self) -> SortingState {
        let options = self.options();
        if let Some(controlled) = &options.state.sorting {
            return controlled.clone();
        }
        self.internal_state().sorting
    }

    /// Proposes a new sorting slice through the update protocol.
    pub fn set_sorting(&self, updater: Updater<SortingState>) {
        let options = self.options();
        let new = updater.resolve(self.sorting_state());
        if let Some(on_change) = &options.on_sorting_change {
            on_change(&new);
        }
        if options.state.sorting.is_none() {
            self.write_internal_state(|state| state.sorting = new);
        }
    }

    /// Removes every sort entry.
    pub fn clear_sorting(&self) {
        self.set_sorting(Updater::set(Vec::new()));
    }

    /// Returns `true` when the column can be sorted.
    pub fn can_sort_column(&self, column: &Column<T>) -> bool {
        column.is_data() && column.def().enable_sorting && self.options().enable_sorting
    }

    /// The column's current direction in the sort chain: `Some(true)` for
    /// descending, `None` when unsorted.
    pub fn column_sort_direction(&self, column_id: &str) -> Option<bool> {
        self.sorting_state()
            .iter()
            .find(|entry| entry.id == column_id)
            .map(|entry| entry.desc)
    }

    /// The column's position in the sort chain.
    pub fn column_sort_index(&self, column_id: &str) -> Option<usize> {
        self.sorting_state()
            .iter()
            .position(|entry| entry.id == column_id)
    }

    /// Cycles or sets a column's sort direction.
    ///
    /// With `desc: None` the column cycles: unsorted, its preferred first
    /// direction, the other direction, unsorted again. `multi: true`
    /// appends to the existing chain instead of replacing it (when
    /// multi-sort is enabled).
    pub fn toggle_column_sorting(&self, column_id: &str, desc: Option<bool>, multi: bool) {
        let columns = self.column_model();
        let Some(column) = columns.column(column_id) else {
            return;
        };
        if !self.can_sort_column(column) {
            return;
        }
        let first_desc = column.def().sort_descending_first;
        let multi = multi && self.options().enable_multi_sort;
        let id = column_id.to_string();
        self.set_sorting(Updater::apply(move |mut sorting: SortingState| {
            let existing = sorting.iter().position(|entry| entry.id == id);
            let next = match desc {
                Some(direction) => Some(direction),
                None => match existing {
                    None => Some(first_desc),
                    Some(i) if sorting[i].desc == first_desc => Some(!first_desc),
                    Some(_) => None,
                },
            };
            if multi {
                match (existing, next) {
                    (Some(i), Some(direction)) => sorting[i].desc = direction,
                    (Some(i), None) => {
                        sorting.remove(i);
                    }
                    (None, Some(direction)) => sorting.push(ColumnSort {
                        id,
                        desc: direction,
                    }),
                    (None, None) => {}
                }
                sorting
            } else {
                match next {
                    Some(direction) => vec![ColumnSort {
                        id,
                        desc: direction,
                    }],
                    None => Vec::new(),
                }
            }
        }));
    }
}
