//! Column and global filtering.

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

/// The host-supplied value a filter tests cells against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
    /// A single scalar to match.
    Value(CellValue),
    /// A numeric range, inclusive on both ends; `None` is unbounded.
    Range {
        /// Lower bound.
        min: Option<f64>,
        /// Upper bound.
        max: Option<f64>,
    },
    /// A set of candidate values.
    Set(Vec<CellValue>),
}

impl FilterValue {
    /// Creates an inclusive numeric range filter value.
    pub fn range(min: impl Into<Option<f64>>, max: impl Into<Option<f64>>) -> Self {
        FilterValue::Range {
            min: min.into(),
            max: max.into(),
        }
    }
}

impl From<CellValue> for FilterValue {
    fn from(value: CellValue) -> Self {
        FilterValue::Value(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Value(CellValue::from(value))
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Value(CellValue::from(value))
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Value(CellValue::from(value))
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Value(CellValue::from(value))
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Value(CellValue::from(value))
    }
}

/// One active per-column filter entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilter {
    /// The filtered column.
    pub id: String,
    /// The value its predicate tests against.
    pub value: FilterValue,
}

/// Active column filters, combined with logical AND.
pub type ColumnFiltersState = Vec<ColumnFilter>;

/// A custom filter predicate: accessed cell value and filter value in,
/// keep-or-drop out.
pub type FilterPredicate = Arc<dyn Fn(&CellValue, &FilterValue) -> bool + Send + Sync>;

/// How a column decides whether a cell satisfies its filter entry.
#[derive(Clone)]
pub enum FilterFn {
    /// Dispatch on the filter value's shape: ranges filter numerically,
    /// sets by membership, strings by substring, anything else by equality.
    Auto,
    /// Case-insensitive substring match on the rendered value.
    IncludesString,
    /// Case-insensitive whole-string equality.
    EqualsString,
    /// Equality under [`CellValue::compare`].
    Equals,
    /// Numeric containment in an inclusive range.
    InNumberRange,
    /// Membership in the filter's candidate set.
    OneOf,
    /// A predicate registered by name in the options.
    Named(String),
    /// An inline predicate.
    Custom(FilterPredicate),
}

impl FilterFn {
    /// Tests one accessed value against a filter entry.
    pub fn evaluate(
        &self,
        value: &CellValue,
        filter: &FilterValue,
        registry: &HashMap<String, FilterPredicate>,
    ) -> bool {
        match self {
            FilterFn::Auto => match filter {
                FilterValue::Range { .. } => in_number_range(value, filter),
                FilterValue::Set(_) => one_of(value, filter),
                FilterValue::Value(CellValue::String(_)) => includes_string(value, filter),
                FilterValue::Value(_) => equals(value, filter),
            },
            FilterFn::IncludesString => includes_string(value, filter),
            FilterFn::EqualsString => equals_string(value, filter),
            FilterFn::Equals => equals(value, filter),
            FilterFn::InNumberRange => in_number_range(value, filter),
            FilterFn::OneOf => one_of(value, filter),
            // Registry membership is validated when options are applied;
            // a missing entry keeps the row rather than corrupting output.
            FilterFn::Named(name) => registry
                .get(name)
                .map(|predicate| predicate(value, filter))
                .unwrap_or(true),
            FilterFn::Custom(predicate) => predicate(value, filter),
        }
    }
}

fn filter_text(filter: &FilterValue) -> Option<String> {
    match filter {
        FilterValue::Value(CellValue::Null) => None,
        FilterValue::Value(v) => Some(v.to_string()),
        _ => None,
    }
}

fn includes_string(value: &CellValue, filter: &FilterValue) -> bool {
    let Some(needle) = filter_text(filter) else {
        return true;
    };
    if value.is_null() {
        return false;
    }
    value
        .to_string()
        .to_lowercase()
        .contains(&needle.to_lowercase())
}

fn equals_string(value: &CellValue, filter: &FilterValue) -> bool {
    let Some(expected) = filter_text(filter) else {
        return true;
    };
    value.to_string().eq_ignore_ascii_case(&expected)
}

fn equals(value: &CellValue, filter: &FilterValue) -> bool {
    match filter {
        FilterValue::Value(expected) => value.compare(expected) == Ordering::Equal,
        _ => true,
    }
}

fn in_number_range(value: &CellValue, filter: &FilterValue) -> bool {
    let FilterValue::Range { min, max } = filter else {
        return true;
    };
    let Some(v) = value.as_f64() else {
        return false;
    };
    if let Some(min) = min {
        if v < *min {
            return false;
        }
    }
    if let Some(max) = max {
        if v > *max {
            return false;
        }
    }
    true
}

fn one_of(value: &CellValue, filter: &FilterValue) -> bool {
    match filter {
        FilterValue::Set(candidates) => candidates
            .iter()
            .any(|candidate| value.compare(candidate) == Ordering::Equal),
        _ => true,
    }
}

impl<T: RowData> Table<T> {
    /// Effective column-filters slice.
    pub fn column_filters_state(&self) -> ColumnFiltersState {
        let options = self.options();
        if let Some(controlled) = &options.state.column_filters {
            return controlled.clone();
        }
        self.internal_state().column_filters
    }

    /// Proposes a new column-filters slice through the update protocol.
    pub fn set_column_filters(&self, updater: Updater<ColumnFiltersState>) {
        let options = self.options();
        let new = updater.resolve(self.column_filters_state());
        if let Some(on_change) = &options.on_column_filters_change {
            on_change(&new);
        }
        if options.state.column_filters.is_none() {
            self.write_internal_state(|state| state.column_filters = new);
        }
    }

    /// Sets, replaces or removes (`None`) one column's filter entry.
    pub fn set_column_filter(&self, column_id: &str, value: Option<FilterValue>) {
        let id = column_id.to_string();
        self.set_column_filters(Updater::apply(move |mut filters: ColumnFiltersState| {
            filters.retain(|f| f.id != id);
            if let Some(value) = value {
                filters.push(ColumnFilter { id, value });
            }
            filters
        }));
    }

    /// The active filter entry for a column, if any.
    pub fn column_filter_value(&self, column_id: &str) -> Option<FilterValue> {
        self.column_filters_state()
            .into_iter()
            .find(|f| f.id == column_id)
            .map(|f| f.value)
    }

    /// Effective global-filter slice.
    pub fn global_filter_state(&self) -> Option<FilterValue> {
        let options = self.options();
        if let Some(controlled) = &options.state.global_filter {
            return controlled.clone();
        }
        self.internal_state().global_filter
    }

    /// Proposes a new global filter through the update protocol.
    pub fn set_global_filter(&self, updater: Updater<Option<FilterValue>>) {
        let options = self.options();
        let new = updater.resolve(self.global_filter_state());
        if let Some(on_change) = &options.on_global_filter_change {
            on_change(&new);
        }
        if options.state.global_filter.is_none() {
            self.write_internal_state(|state| state.global_filter = new);
        }
    }

    /// Returns `true` when the column participates in per-column filtering.
    pub fn can_filter_column(&self, column: &Column<T>) -> bool {
        column.is_data() && column.def().enable_column_filter && self.options().enable_column_filters
    }

    /// Returns `true` when the column participates in the global filter.
    pub fn can_global_filter_column(&self, column: &Column<T>) -> bool {
        column.is_data() && column.def().enable_global_filter && self.options().enable_global_filter
    }

    /// Distinct accessed values of a column in the pre-filtered model,
    /// with occurrence counts, ordered by value. Feeds filter pickers.
    pub fn column_unique_values(&self, column_id: &str) -> Vec<(CellValue, usize)> {
        let core = self.core_row_model();
        let columns = self.column_model();
        let mut uniques: Vec<(CellValue, usize)> = Vec::new();
        for row in &core.flat_rows {
            let value = row.value(column_id, &columns);
            match uniques
                .iter()
                .position(|(v, _)| v.compare(&value) == Ordering::Equal)
            {
                Some(i) => uniques[i].1 += 1,
                None => uniques.push((value, 1)),
            }
        }
        uniques.sort_by(|a, b| a.0.compare(&b.0));
        uniques
    }

    /// Smallest and largest accessed value of a column in the pre-filtered
    /// model. Feeds range filter inputs.
    pub fn column_min_max(&self, column_id: &str) -> Option<(CellValue, CellValue)> {
        let core = self.core_row_model();
        let columns = self.column_model();
        let mut extent: Option<(CellValue, CellValue)> = None;
        for row in &core.flat_rows {
            let value = row.value(column_id, &columns);
            if value.is_unordered() {
                continue;
            }
            extent = Some(match extent {
                None => (value.clone(), value),
                Some((min, max)) => {
                    let min = if value.compare(&min) == Ordering::Less {
                        value.clone()
                    } else {
                        min
                    };
                    let max = if value.compare(&max) == Ordering::Greater {
                        value
                    } else {
                        max
                    };
                    (min, max)
                }
            });
        }
        extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> HashMap<String, FilterPredicate> {
        HashMap::new()
    }

    #[test]
    fn test_includes_string_is_case_insensitive() {
        let f = FilterValue::from("con");
        assert!(FilterFn::IncludesString.evaluate(&CellValue::from("Contoso"), &f, &registry()));
        assert!(!FilterFn::IncludesString.evaluate(&CellValue::from("Fabrikam"), &f, &registry()));
        assert!(!FilterFn::IncludesString.evaluate(&CellValue::Null, &f, &registry()));
    }

    #[test]
    fn test_in_number_range_bounds_are_inclusive() {
        let f = FilterValue::range(30.0, None);
        assert!(FilterFn::InNumberRange.evaluate(&CellValue::Int(30), &f, &registry()));
        assert!(FilterFn::InNumberRange.evaluate(&CellValue::Int(45), &f, &registry()));
        assert!(!FilterFn::InNumberRange.evaluate(&CellValue::Int(24), &f, &registry()));
        assert!(!FilterFn::InNumberRange.evaluate(&CellValue::Null, &f, &registry()));
    }

    #[test]
    fn test_auto_dispatches_on_filter_shape() {
        assert!(FilterFn::Auto.evaluate(
            &CellValue::Int(40),
            &FilterValue::range(None, 41.0),
            &registry()
        ));
        assert!(FilterFn::Auto.evaluate(
            &CellValue::from("Alice Johnson"),
            &FilterValue::from("john"),
            &registry()
        ));
        assert!(FilterFn::Auto.evaluate(
            &CellValue::Int(7),
            &FilterValue::Set(vec![CellValue::Int(7), CellValue::Int(9)]),
            &registry()
        ));
        assert!(!FilterFn::Auto.evaluate(&CellValue::Int(7), &FilterValue::from(8i64), &registry()));
    }
}
